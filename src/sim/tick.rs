//! Simulation tick
//!
//! Core game loop. Each tick runs the subsystems in a fixed order: hook, rats,
//! retrieval effects (including level completion), deferred effects.

use super::collision::contact_radius;
use super::difficulty::{target_score, time_limit_secs};
use super::events::{GameEvent, ParticleKind, ParticleRequest, SoundEffect};
use super::hook::{advance_hook, fire};
use super::rats::{advance_rats, try_release};
use super::schedule::Deferred;
use super::spawner::{SpawnReport, spawn_items};
use super::state::{GameState, HookPhase, Item, SessionPhase};
use crate::hook_direction;
use crate::tuning::Tuning;

const COLLECT_PARTICLES: u32 = 8;
const LEVEL_UP_PARTICLES: u32 = 20;
const LEVEL_UP_COLOR: u32 = 0xFFD700;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Fire the hook (click/tap/space)
    pub fire: bool,
    /// Demo mode - fire whenever the swinging hook points at an item
    pub autoplay: bool,
}

/// Clamp an externally supplied level number
fn clamp_level(level: i64) -> u32 {
    let clamped = level.clamp(1, u32::MAX as i64) as u32;
    if clamped as i64 != level {
        log::warn!("Level {} out of range, using {}", level, clamped);
    }
    clamped
}

/// Set up `level`: fresh item field, no rats, nothing pending
pub fn configure_level(state: &mut GameState, level: i64, tuning: &Tuning) -> SpawnReport {
    state.level = clamp_level(level);
    state.items.clear();
    state.rats.clear();
    state.scheduler.cancel_all();
    state.level_elapsed_ms = 0.0;
    state.level_cleared = false;
    state.rats_released = false;
    state.hook.rewind(tuning);

    let report = spawn_items(state, tuning);
    log::info!(
        "Level {} ready: target {} in {}s",
        state.level,
        target_score(state.level),
        time_limit_secs(state.level)
    );
    report
}

/// True if an item lies along the hook's current aim
pub fn aim_is_on_item(state: &GameState, tuning: &Tuning) -> bool {
    let origin = state.hook.pivot;
    let dir = hook_direction(state.hook.angle);
    state.items.iter().any(|item| {
        let to_item = item.center() - origin;
        let along = to_item.dot(dir);
        if along <= 0.0 || along > state.hook.max_length {
            return false;
        }
        let off_axis = (to_item - dir * along).length();
        off_axis < contact_radius(item, tuning.collision_padding)
    })
}

/// Advance the game state by one tick of `delta_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f32, tuning: &Tuning) {
    if state.phase != SessionPhase::Running {
        return;
    }

    let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
    state.time_ticks += 1;
    state.level_elapsed_ms += delta_ms as f64;

    let wants_fire = input.fire
        || (input.autoplay
            && state.hook.phase == HookPhase::Swinging
            && aim_is_on_item(state, tuning));
    if wants_fire {
        fire(state, tuning);
    }

    // Hook
    let retrieved = advance_hook(state, tuning);

    // Rats
    try_release(state, tuning);
    let hooked = state.hook.attached;
    advance_rats(state, tuning, hooked);

    // Effects
    if let Some(item) = retrieved {
        collect(state, item);
        if state.items.is_empty() && !state.level_cleared {
            complete_level(state, tuning);
        }
    }

    // Deferred
    for action in state.scheduler.advance(delta_ms as f64) {
        match action {
            Deferred::PlaySound(sound) => state.emit(GameEvent::Sound(sound)),
            Deferred::AdvanceLevel => {
                let next = state.level.saturating_add(1);
                configure_level(state, next as i64, tuning);
                // Anything else due this tick belonged to the old level
                break;
            }
        }
    }
}

/// Score an item wound in by the hook
fn collect(state: &mut GameState, item: Item) {
    let points = item.value.max(0) as i64;
    log::debug!("Collected {} {:?} for {}", item.kind.as_str(), item.size, points);

    state.emit(GameEvent::ScoreDelta(points));
    state.emit(GameEvent::Particles(ParticleRequest {
        pos: state.hook.pivot,
        count: COLLECT_PARTICLES,
        kind: ParticleKind::Collect,
        color: item.kind.color(),
    }));
    state.emit(GameEvent::Sound(SoundEffect::Collect));
}

fn complete_level(state: &mut GameState, tuning: &Tuning) {
    state.level_cleared = true;
    log::info!("Level {} cleared", state.level);

    state.emit(GameEvent::LevelComplete);
    state.emit(GameEvent::Sound(SoundEffect::LevelUp));
    state.emit(GameEvent::Particles(ParticleRequest {
        pos: state.area.center(),
        count: LEVEL_UP_PARTICLES,
        kind: ParticleKind::Explosion,
        color: LEVEL_UP_COLOR,
    }));

    if let Some(delay) = tuning.level_advance_delay_ms {
        state.scheduler.schedule(delay, Deferred::AdvanceLevel);
    }
}
