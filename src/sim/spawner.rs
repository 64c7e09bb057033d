//! Procedural item field generation
//!
//! Types come from a weighted pool (roulette wheel), sizes from the level's size
//! distribution, and positions from rejection sampling inside the spawn band.

use glam::Vec2;
use rand::Rng;

use super::difficulty::{item_counts, item_pool, size_distribution, size_ratios, tnt_bonus};
use super::state::{GameState, Item, ItemId, ItemKind, ItemSize, ItemSpec, PlayArea};
use crate::consts::*;
use crate::tuning::{OverlapFallback, Tuning};

/// Outcome of one field generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnReport {
    /// Items inserted into the active set
    pub placed: usize,
    /// Items placed by the fallback policy after exhausting attempts
    pub fallback_ids: Vec<ItemId>,
    /// Items dropped by [`OverlapFallback::SkipItem`]
    pub skipped: usize,
}

impl SpawnReport {
    pub fn fallback_placements(&self) -> usize {
        self.fallback_ids.len()
    }
}

/// Roulette-wheel selection: one uniform draw over the cumulative weight
pub fn pick_weighted<R: Rng>(pool: &[(ItemKind, f32)], rng: &mut R) -> Option<ItemKind> {
    let total: f32 = pool.iter().map(|&(_, weight)| weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.random::<f32>() * total;
    for &(kind, weight) in pool {
        let weight = weight.max(0.0);
        if roll < weight {
            return Some(kind);
        }
        roll -= weight;
    }
    // Rounding left a sliver past the last bucket
    pool.iter().rev().find(|&&(_, w)| w > 0.0).map(|&(kind, _)| kind)
}

/// Uniform draw in [lo, hi], collapsing to `lo` when the range is empty
#[inline]
fn sample_range<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        lo + rng.random::<f32>() * (hi - lo)
    }
}

/// Sample a top-left position for an item of the given footprint
fn sample_position<R: Rng>(rng: &mut R, area: &PlayArea, spec: &ItemSpec) -> Vec2 {
    let x_lo = BAND_SIDE_MARGIN;
    let x_hi = area.width - spec.width - BAND_SIDE_MARGIN;
    let y_lo = area.band_top() + BAND_SAMPLE_INSET;
    let y_hi = area.band_bottom() - BAND_SAMPLE_INSET;
    Vec2::new(sample_range(rng, x_lo, x_hi), sample_range(rng, y_lo, y_hi))
}

/// Minimum center distance between two items of the given larger dimensions
#[inline]
pub fn required_spacing(max_dim_a: f32, max_dim_b: f32, gap: f32) -> f32 {
    (max_dim_a + max_dim_b) / 2.0 + gap
}

/// True if a candidate is farther than the required spacing from every placed item
fn is_clear<'a>(
    candidate: Vec2,
    spec: &ItemSpec,
    placed: impl IntoIterator<Item = &'a Item>,
    gap: f32,
) -> bool {
    let center = candidate + Vec2::new(spec.width, spec.height) * 0.5;
    let max_dim = spec.width.max(spec.height);
    placed
        .into_iter()
        .all(|other| center.distance(other.center()) > required_spacing(max_dim, other.max_dim(), gap))
}

/// Populate the active set for the state's level and canvas.
///
/// Placement only falls back to an overlapping spot once every attempt has
/// failed. The band of a 1280x960 canvas has room for the densest level, so
/// fully spaced fields are the norm there. Smaller canvases (800x600 and below)
/// run out of room from around level 10 and lean on the fallback policy.
pub fn spawn_items(state: &mut GameState, tuning: &Tuning) -> SpawnReport {
    let level = state.level;
    let area = state.area;
    let pool = item_pool(level);
    let sizes = size_distribution(&size_ratios(level));

    // Regular slots draw from the pool, bonus slots are always TNT
    let regular = item_counts(level).total();
    let bonus = tnt_bonus(level);
    let mut kinds = Vec::with_capacity((regular + bonus) as usize);
    for _ in 0..regular {
        if let Some(kind) = pick_weighted(&pool, &mut state.rng) {
            kinds.push(kind);
        }
    }
    kinds.extend(std::iter::repeat_n(ItemKind::Tnt, bonus as usize));

    let mut report = SpawnReport::default();
    for kind in kinds {
        let size = if sizes.is_empty() {
            ItemSize::Small
        } else {
            sizes[state.rng.random_range(0..sizes.len())]
        };
        let spec = kind.spec(size);

        let mut candidate = sample_position(&mut state.rng, &area, &spec);
        let mut clear = is_clear(candidate, &spec, state.items.iter(), tuning.item_spacing);
        let mut attempts = 1;
        while !clear && attempts < tuning.placement_attempts {
            candidate = sample_position(&mut state.rng, &area, &spec);
            clear = is_clear(candidate, &spec, state.items.iter(), tuning.item_spacing);
            attempts += 1;
        }

        if !clear && tuning.overlap_fallback == OverlapFallback::SkipItem {
            log::debug!("No room for {} ({:?}) after {} attempts, skipped", kind.as_str(), size, attempts);
            report.skipped += 1;
            continue;
        }

        let id = state.next_entity_id();
        if !clear {
            log::debug!(
                "No room for {} ({:?}) after {} attempts, keeping overlapping spot",
                kind.as_str(),
                size,
                attempts
            );
            report.fallback_ids.push(id);
        }
        state.items.insert(Item::new(id, kind, size, candidate));
        report.placed += 1;
    }

    log::info!(
        "Level {}: spawned {} items on {}x{} ({} overlapping, {} skipped)",
        level,
        report.placed,
        area.width,
        area.height,
        report.fallback_placements(),
        report.skipped
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn fresh(seed: u64, level: u32, w: f32, h: f32) -> GameState {
        let mut state = GameState::new(seed, w, h, &Tuning::default());
        state.level = level;
        state
    }

    fn spaced(a: &Item, b: &Item, gap: f32) -> bool {
        a.center().distance(b.center()) > required_spacing(a.max_dim(), b.max_dim(), gap)
    }

    #[test]
    fn test_spawns_full_count_with_unique_ids() {
        let tuning = Tuning::default();
        for level in [1, 3, 7, 12] {
            let mut state = fresh(42, level, 1280.0, 960.0);
            let report = spawn_items(&mut state, &tuning);
            let expected = (item_counts(level).total() + tnt_bonus(level)) as usize;
            assert_eq!(report.placed, expected);
            assert_eq!(state.items.len(), expected);

            let ids: HashSet<_> = state.items.iter().map(|i| i.id).collect();
            assert_eq!(ids.len(), expected);
            assert_eq!(state.items.count_kind(ItemKind::Mouse), 0);
            assert!(state.items.count_kind(ItemKind::Tnt) >= tnt_bonus(level) as usize);
        }
    }

    #[test]
    fn test_no_tnt_before_level_three() {
        let tuning = Tuning::default();
        for seed in 0..20 {
            let mut state = fresh(seed, 2, 1280.0, 960.0);
            spawn_items(&mut state, &tuning);
            assert_eq!(state.items.count_kind(ItemKind::Tnt), 0);
        }
    }

    #[test]
    fn test_items_stay_inside_band() {
        let tuning = Tuning::default();
        let mut state = fresh(7, 6, 1024.0, 768.0);
        spawn_items(&mut state, &tuning);
        let area = state.area;
        for item in state.items.iter() {
            assert!(item.pos.x >= BAND_SIDE_MARGIN);
            assert!(item.pos.x + item.width <= area.width - BAND_SIDE_MARGIN + 1e-3);
            assert!(item.pos.y >= area.band_top());
            assert!(item.pos.y <= area.band_bottom());
        }
    }

    #[test]
    fn test_spacing_holds_for_most_sets() {
        let tuning = Tuning::default();
        let mut total = 0;
        let mut fully_spaced = 0;
        for level in 1..=20 {
            for seed in 0..10u64 {
                let mut state = fresh(seed * 31 + level as u64, level, 1280.0, 960.0);
                spawn_items(&mut state, &tuning);
                let items: Vec<_> = state.items.iter().cloned().collect();
                let ok = items.iter().enumerate().all(|(i, a)| {
                    items[i + 1..].iter().all(|b| spaced(a, b, tuning.item_spacing))
                });
                total += 1;
                if ok {
                    fully_spaced += 1;
                }
            }
        }
        assert!(fully_spaced * 100 >= total * 95, "{fully_spaced}/{total} sets spaced");
    }

    #[test]
    fn test_non_fallback_placements_are_always_spaced() {
        let tuning = Tuning::default();
        for seed in 0..10 {
            let mut state = fresh(seed, 10, 800.0, 600.0);
            let report = spawn_items(&mut state, &tuning);
            let items: Vec<_> = state.items.iter().cloned().collect();
            for (j, later) in items.iter().enumerate() {
                if report.fallback_ids.contains(&later.id) {
                    continue;
                }
                for earlier in &items[..j] {
                    assert!(spaced(earlier, later, tuning.item_spacing));
                }
            }
        }
    }

    #[test]
    fn test_cramped_canvas_falls_back_to_overlap() {
        let tuning = Tuning::default();
        let mut state = fresh(3, 10, 200.0, 300.0);
        let report = spawn_items(&mut state, &tuning);
        let expected = (item_counts(10).total() + tnt_bonus(10)) as usize;
        assert!(report.fallback_placements() > 0);
        assert_eq!(state.items.len(), expected);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_skip_policy_drops_unplaceable_items() {
        let tuning = Tuning {
            overlap_fallback: OverlapFallback::SkipItem,
            ..Tuning::default()
        };
        let mut state = fresh(3, 10, 200.0, 300.0);
        let report = spawn_items(&mut state, &tuning);
        let expected = (item_counts(10).total() + tnt_bonus(10)) as usize;
        assert!(report.skipped > 0);
        assert_eq!(report.placed + report.skipped, expected);
        assert!(report.fallback_ids.is_empty());
    }

    #[test]
    fn test_pick_weighted_respects_weights() {
        let mut rng = Pcg32::seed_from_u64(9);
        let pool = [(ItemKind::Gold, 90.0), (ItemKind::Stone, 10.0), (ItemKind::Tnt, 0.0)];
        let mut gold = 0;
        for _ in 0..2000 {
            match pick_weighted(&pool, &mut rng) {
                Some(ItemKind::Gold) => gold += 1,
                Some(ItemKind::Stone) => {}
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert!(gold > 1600 && gold < 1990, "gold picked {gold} times");
        assert_eq!(pick_weighted(&[], &mut rng), None);
        assert_eq!(pick_weighted(&[(ItemKind::Bag, 0.0)], &mut rng), None);
    }

    #[test]
    fn test_candidate_at_exact_spacing_is_rejected() {
        let spec = ItemKind::Stone.spec(ItemSize::Large);
        let placed = Item::new(ItemId(1), ItemKind::Stone, ItemSize::Large, Vec2::ZERO);
        let gap = 35.0;
        // Both 60x60: required center distance is 60 + 35
        let exact = Vec2::new(95.0, 0.0);
        assert!(!is_clear(exact, &spec, [&placed], gap));
        assert!(is_clear(exact + Vec2::new(1.0, 0.0), &spec, [&placed], gap));
    }
}
