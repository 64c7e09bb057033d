//! Rat agents
//!
//! From the mid levels on, a small wave of rats enters from the left edge
//! halfway through a level. Each rat walks to the nearest diamond, gnaws at it
//! for a while, then carries it off the right edge. A rat's body is a
//! [`ItemKind::Mouse`] item in the active set, so the hook can catch it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, SoundEffect};
use super::state::{GameState, Item, ItemId, ItemKind, ItemSet, ItemSize};
use crate::tuning::Tuning;

/// Rats spawn somewhere in this vertical slice (fractions of the height)
const SPAWN_Y_TOP: f32 = 0.5;
const SPAWN_Y_SPAN: f32 = 0.3;
/// A stolen item is worth this much more on the rat
const STOLEN_VALUE_MULTIPLIER: i32 = 10;
/// Where the carried item sits relative to the rat's top-left (fractions of its size)
const CARRY_OFFSET: Vec2 = Vec2::new(0.7, 0.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatPhase {
    /// Walking toward the nearest diamond
    Seeking,
    /// Next to a diamond, filling the steal meter
    Stealing,
    /// Running off with a diamond
    Carrying,
    /// Gave up waiting for a diamond, leaving empty-handed
    Fleeing,
}

#[derive(Debug, Clone)]
pub struct Rat {
    /// The rat's body in the item set
    pub item_id: ItemId,
    /// px/tick
    pub speed: f32,
    pub phase: RatPhase,
    pub target: Option<ItemId>,
    /// 0..1 while stealing
    pub steal_progress: f32,
    /// Snapshot of the stolen diamond
    pub carried: Option<Item>,
    /// Consecutive ticks spent seeking with no diamond on the field
    pub idle_ticks: u32,
}

impl Rat {
    fn new(item_id: ItemId, speed: f32) -> Self {
        Self {
            item_id,
            speed,
            phase: RatPhase::Seeking,
            target: None,
            steal_progress: 0.0,
            carried: None,
            idle_ticks: 0,
        }
    }

    pub fn is_stealing(&self) -> bool {
        self.phase == RatPhase::Stealing
    }

    pub fn has_diamond(&self) -> bool {
        self.carried.is_some()
    }

    /// Original id of the diamond this rat is running off with
    pub fn carrying_diamond_id(&self) -> Option<ItemId> {
        self.carried.as_ref().map(|item| item.id)
    }
}

/// Live rats, in release order
#[derive(Debug, Clone, Default)]
pub struct RatPool {
    rats: Vec<Rat>,
}

impl RatPool {
    pub fn iter(&self) -> impl Iterator<Item = &Rat> {
        self.rats.iter()
    }

    /// Rat whose body is the given item
    pub fn get(&self, item_id: ItemId) -> Option<&Rat> {
        self.rats.iter().find(|rat| rat.item_id == item_id)
    }

    pub fn len(&self) -> usize {
        self.rats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rats.is_empty()
    }

    pub fn clear(&mut self) {
        self.rats.clear();
    }
}

/// Rats released at `level` (0 below the first rat level)
pub fn rat_count(level: u32, tuning: &Tuning) -> u32 {
    if level < tuning.rat_min_level {
        return 0;
    }
    (1 + (level - tuning.rat_min_level) / 2).min(tuning.rat_max_count)
}

/// Nearest diamond to `from`, ignoring `exclude` (the item on the hook)
pub fn nearest_diamond(items: &ItemSet, from: Vec2, exclude: Option<ItemId>) -> Option<ItemId> {
    items
        .iter()
        .filter(|item| item.kind == ItemKind::Diamond && Some(item.id) != exclude)
        .min_by(|a, b| {
            from.distance_squared(a.center())
                .total_cmp(&from.distance_squared(b.center()))
        })
        .map(|item| item.id)
}

/// Release this level's rats once the gate opens. Returns how many were released.
pub fn try_release(state: &mut GameState, tuning: &Tuning) -> u32 {
    if state.rats_released
        || state.level < tuning.rat_min_level
        || state.level_elapsed_secs() < tuning.rat_spawn_delay_secs
        || state.items.count_kind(ItemKind::Mouse) > 0
    {
        return 0;
    }
    state.rats_released = true;

    let count = rat_count(state.level, tuning);
    let height = state.area.height;
    let speed_span = (tuning.rat_speed_max - tuning.rat_speed_min).max(0.0);
    for _ in 0..count {
        let size = if state.rng.random_bool(0.5) {
            ItemSize::Small
        } else {
            ItemSize::Medium
        };
        let speed = tuning.rat_speed_min + state.rng.random::<f32>() * speed_span;
        let y = height * SPAWN_Y_TOP + state.rng.random::<f32>() * height * SPAWN_Y_SPAN;

        let id = state.next_entity_id();
        let mut body = Item::new(id, ItemKind::Mouse, size, Vec2::ZERO);
        body.pos = Vec2::new(-body.width, y);
        state.items.insert(body);
        state.rats.rats.push(Rat::new(id, speed));
    }

    log::info!("Level {}: released {} rats", state.level, count);
    count
}

/// Advance every rat by one tick. `hooked` is the item currently on the hook.
pub fn advance_rats(state: &mut GameState, tuning: &Tuning, hooked: Option<ItemId>) {
    if state.rats.is_empty() {
        return;
    }

    let mut rats = std::mem::take(&mut state.rats.rats);
    rats.retain_mut(|rat| {
        if Some(rat.item_id) == hooked {
            log::debug!("Rat {:?} caught by the hook", rat.item_id);
            return false;
        }
        step_rat(state, tuning, rat, hooked)
    });
    state.rats.rats = rats;
}

/// Returns false once the rat has left the field
fn step_rat(state: &mut GameState, tuning: &Tuning, rat: &mut Rat, hooked: Option<ItemId>) -> bool {
    let Some(body) = state.items.get(rat.item_id) else {
        return false;
    };
    let (pos, size, center) = (body.pos, Vec2::new(body.width, body.height), body.center());

    match rat.phase {
        RatPhase::Seeking => {
            let target_alive = rat
                .target
                .is_some_and(|t| Some(t) != hooked && state.items.contains(t));
            if !target_alive {
                rat.target = nearest_diamond(&state.items, center, hooked);
                rat.steal_progress = 0.0;
            }

            let Some(goal) = rat.target.and_then(|t| state.items.get(t)).map(Item::center) else {
                rat.idle_ticks += 1;
                if rat.idle_ticks >= tuning.rat_give_up_ticks {
                    log::debug!("Rat {:?} found no diamond, fleeing", rat.item_id);
                    rat.phase = RatPhase::Fleeing;
                }
                return true;
            };
            rat.idle_ticks = 0;

            let bounds = (Vec2::new(state.area.width, state.area.height) - size).max(Vec2::ZERO);
            let next = (pos + (goal - center).normalize_or_zero() * rat.speed).clamp(Vec2::ZERO, bounds);
            if let Some(body) = state.items.get_mut(rat.item_id) {
                body.pos = next;
            }

            if (next + size * 0.5).distance(goal) < tuning.rat_steal_distance {
                rat.phase = RatPhase::Stealing;
            }
            true
        }
        RatPhase::Stealing => {
            let target = rat.target.filter(|&t| Some(t) != hooked && state.items.contains(t));
            let Some(target) = target else {
                rat.target = None;
                rat.steal_progress = 0.0;
                rat.phase = RatPhase::Seeking;
                return true;
            };

            rat.steal_progress += tuning.rat_steal_increment;
            if rat.steal_progress >= 1.0 {
                steal(state, rat, target);
            }
            true
        }
        RatPhase::Carrying | RatPhase::Fleeing => {
            let next = pos + Vec2::new(rat.speed, 0.0);
            if next.x > state.area.width {
                state.items.remove(rat.item_id);
                log::debug!("Rat {:?} escaped", rat.item_id);
                return false;
            }
            if let Some(body) = state.items.get_mut(rat.item_id) {
                body.pos = next;
            }
            if let Some(carried) = rat.carried.as_mut() {
                carried.set_center(next + size * CARRY_OFFSET);
            }
            true
        }
    }
}

fn steal(state: &mut GameState, rat: &mut Rat, target: ItemId) {
    let Some(diamond) = state.items.remove(target) else {
        return;
    };
    let original_value = diamond.value;

    if let Some(body) = state.items.get_mut(rat.item_id) {
        body.value = original_value.saturating_mul(STOLEN_VALUE_MULTIPLIER);
    }
    rat.carried = Some(diamond);
    rat.target = None;
    rat.steal_progress = 0.0;
    rat.phase = RatPhase::Carrying;

    log::info!("Rat {:?} stole a diamond worth {}", rat.item_id, original_value);
    state.emit(GameEvent::ItemStolen { original_value });
    state.emit(GameEvent::Sound(SoundEffect::Steal));
}
