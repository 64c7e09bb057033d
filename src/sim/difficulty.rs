//! Difficulty curve
//!
//! Pure functions from a level number to the parameters of that level. Level 0
//! is treated as level 1, so every function is total.

use serde::{Deserialize, Serialize};

use super::state::{ItemKind, ItemSize};

/// Hand-tuned targets for the first five levels
const TARGET_SCORES: [u64; 5] = [1000, 2000, 3500, 5500, 8000];
/// Base of the exponential target curve after level 5
const TARGET_BASE: f64 = 8000.0;
/// Growth factor of the target curve (must stay above 1)
const TARGET_GROWTH: f64 = 1.5;
/// Every level lasts this long
const TIME_LIMIT_SECS: u32 = 60;

/// Number of entries in a size distribution array
pub const SIZE_SLOTS: usize = 100;

#[inline]
fn clamp_level(level: u32) -> u32 {
    level.max(1)
}

/// Score required to pass `level`
pub fn target_score(level: u32) -> u64 {
    let level = clamp_level(level);
    if let Some(&score) = TARGET_SCORES.get(level as usize - 1) {
        return score;
    }
    // Float-to-int casts saturate, so very high levels pin at u64::MAX
    let exponent = (level - 5).min(i32::MAX as u32) as i32;
    (TARGET_BASE * TARGET_GROWTH.powi(exponent)).floor() as u64
}

/// Seconds available for `level`
pub fn time_limit_secs(_level: u32) -> u32 {
    TIME_LIMIT_SECS
}

/// Per-type item counts for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub gold: u32,
    pub diamond: u32,
    pub stone: u32,
    pub bone: u32,
    pub bag: u32,
}

impl ItemCounts {
    pub fn total(&self) -> u32 {
        self.gold + self.diamond + self.stone + self.bone + self.bag
    }
}

/// Item counts: low-value clutter grows, gold and bags thin out, all clamped
pub fn item_counts(level: u32) -> ItemCounts {
    let steps = (clamp_level(level) - 1) as f32;

    let stone_mult = (1.0 + steps * 0.4).min(4.0);
    let bone_mult = (1.0 + steps * 0.3).min(3.0);
    let gold_mult = (1.0 - steps * 0.1).max(0.5);
    let diamond_mult = (1.0 + steps * 0.2).min(2.5);
    let bag_mult = (1.0 - steps * 0.05).max(0.6);

    ItemCounts {
        gold: ((4.0 * gold_mult).floor() as u32).max(2),
        diamond: ((3.0 * diamond_mult).floor() as u32).max(3),
        stone: ((3.0 * stone_mult).floor() as u32).min(12),
        bone: ((2.0 * bone_mult).floor() as u32).min(8),
        bag: ((2.0 * bag_mult).floor() as u32).max(1),
    }
}

/// Forced extra TNT slots on top of the regular count
pub fn tnt_bonus(level: u32) -> u32 {
    let level = clamp_level(level);
    if level < 3 {
        0
    } else {
        (1 + (level - 3) / 3).min(4)
    }
}

/// Small/medium/large ratios (sum to 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRatios {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

/// Size ratios drift slightly toward small items as levels climb
pub fn size_ratios(level: u32) -> SizeRatios {
    let steps = (clamp_level(level) - 1) as f32;
    let small = (0.6 + steps * 0.02).min(0.7);
    let large = (0.2 - steps * 0.01).max(0.15);
    SizeRatios {
        small,
        medium: 1.0 - small - large,
        large,
    }
}

/// Expand ratios into a fixed-size array to draw sizes from uniformly
pub fn size_distribution(ratios: &SizeRatios) -> Vec<ItemSize> {
    let small = ((SIZE_SLOTS as f32 * ratios.small).floor() as usize).min(SIZE_SLOTS);
    let medium = ((SIZE_SLOTS as f32 * ratios.medium).floor() as usize).min(SIZE_SLOTS - small);
    let large = SIZE_SLOTS - small - medium;

    let mut slots = Vec::with_capacity(SIZE_SLOTS);
    slots.extend(std::iter::repeat_n(ItemSize::Small, small));
    slots.extend(std::iter::repeat_n(ItemSize::Medium, medium));
    slots.extend(std::iter::repeat_n(ItemSize::Large, large));
    slots
}

/// Spawn probability of a kind at a level (0 = never spawned by the pool)
pub fn spawn_probability(kind: ItemKind, level: u32) -> f32 {
    let steps = (clamp_level(level) - 1) as f32;
    let base = kind.rarity();
    match kind {
        ItemKind::Diamond => (base + steps * 0.02).min(0.25),
        ItemKind::Gold => base,
        ItemKind::Stone => (base + steps * 0.015).min(0.4),
        ItemKind::Bone => base,
        ItemKind::Bag => (base + steps * 0.01).min(0.3),
        ItemKind::Tnt => {
            if level >= 3 {
                ((level - 2) as f32 * 0.03).min(0.15)
            } else {
                0.0
            }
        }
        // Rats are released by the rat pool, never by the spawner
        ItemKind::Mouse => 0.0,
    }
}

/// Weighted type pool for a level, zero-weight kinds removed
pub fn item_pool(level: u32) -> Vec<(ItemKind, f32)> {
    ItemKind::SPAWNABLE
        .iter()
        .map(|&kind| (kind, spawn_probability(kind, level) * 100.0))
        .filter(|&(_, weight)| weight > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_early_targets_are_tabled() {
        assert_eq!(target_score(1), 1000);
        assert_eq!(target_score(5), 8000);
        assert_eq!(target_score(6), 12000);
        assert_eq!(target_score(7), 18000);
        // Level 0 behaves like level 1
        assert_eq!(target_score(0), 1000);
    }

    #[test]
    fn test_targets_and_time_never_decrease() {
        for level in 1..100 {
            assert!(target_score(level + 1) >= target_score(level), "target dropped at {level}");
            assert!(time_limit_secs(level + 1) >= time_limit_secs(level));
        }
    }

    #[test]
    fn test_item_counts_respect_clamps() {
        let first = item_counts(1);
        assert_eq!(
            first,
            ItemCounts {
                gold: 4,
                diamond: 3,
                stone: 3,
                bone: 2,
                bag: 2
            }
        );

        let late = item_counts(50);
        assert_eq!(late.gold, 2);
        assert_eq!(late.stone, 12);
        assert_eq!(late.bone, 6);
        assert_eq!(late.diamond, 7);
        assert_eq!(late.bag, 1);
        // Total converges instead of diverging
        assert_eq!(item_counts(500).total(), late.total());
    }

    #[test]
    fn test_tnt_bonus_is_gated() {
        assert_eq!(tnt_bonus(1), 0);
        assert_eq!(tnt_bonus(2), 0);
        assert_eq!(tnt_bonus(3), 1);
        assert_eq!(tnt_bonus(6), 2);
        assert_eq!(tnt_bonus(100), 4);
    }

    #[test]
    fn test_pool_excludes_tnt_early_and_mice_always() {
        let early = item_pool(1);
        assert!(early.iter().all(|(k, _)| *k != ItemKind::Tnt && *k != ItemKind::Mouse));
        let late = item_pool(8);
        assert!(late.iter().any(|(k, _)| *k == ItemKind::Tnt));
        assert!(late.iter().all(|(k, _)| *k != ItemKind::Mouse));
    }

    #[test]
    fn test_size_distribution_has_fixed_length() {
        let slots = size_distribution(&size_ratios(1));
        assert_eq!(slots.len(), SIZE_SLOTS);
        let small = slots.iter().filter(|s| **s == ItemSize::Small).count();
        assert!((59..=60).contains(&small));
    }

    proptest! {
        #[test]
        fn prop_size_ratios_sum_to_one(level in 1u32..500) {
            let r = size_ratios(level);
            prop_assert!((r.small + r.medium + r.large - 1.0).abs() < 1e-4);
            prop_assert!(r.small <= 0.7 + 1e-6 && r.large >= 0.15 - 1e-6);
            prop_assert!(r.medium > 0.0);
        }

        #[test]
        fn prop_difficulty_is_idempotent(level in 0u32..1000) {
            prop_assert_eq!(target_score(level), target_score(level));
            prop_assert_eq!(item_counts(level), item_counts(level));
            prop_assert_eq!(item_pool(level), item_pool(level));
        }

        #[test]
        fn prop_target_score_monotone(level in 1u32..u32::MAX) {
            prop_assert!(target_score(level + 1) >= target_score(level));
        }
    }
}
