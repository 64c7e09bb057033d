//! Hook controller
//!
//! Swing, extend and retract. The hook grabs the first item its tip touches,
//! detonates TNT on contact, and hands a retrieved item back to the caller once
//! the rope is fully wound in.

use glam::Vec2;

use super::collision::first_collision;
use super::events::{GameEvent, ParticleKind, ParticleRequest, SoundEffect};
use super::schedule::Deferred;
use super::state::{GameState, Hook, HookPhase, Item, ItemId, ItemKind, PlayArea, SessionPhase};
use crate::tuning::Tuning;

/// Swing amplitude never reaches horizontal
const MAX_SWING_ANGLE: f32 = 85.0 * std::f32::consts::PI / 180.0;

const EXPLOSION_PARTICLES: u32 = 15;
const HIT_PARTICLES: u32 = 5;

impl Hook {
    /// Re-anchor on a new pivot and recompute reach from the spawn band
    pub fn fit_to_area(&mut self, pivot: Vec2, area: &PlayArea, margin: f32) {
        self.pivot = pivot;

        let mut widest = 0.0f32;
        let mut farthest = 0.0f32;
        for corner in area.band_corners() {
            let offset = corner - pivot;
            farthest = farthest.max(offset.length());
            let angle = if offset.y > 0.0 {
                (offset.x.abs() / offset.y).atan()
            } else {
                MAX_SWING_ANGLE
            };
            widest = widest.max(angle);
        }

        self.max_angle = (widest * margin).min(MAX_SWING_ANGLE);
        self.max_length = farthest.max(area.band_bottom());
        self.angle = self.angle.clamp(-self.max_angle, self.max_angle);
        self.length = self.length.min(self.max_length);
    }

    /// Back to swinging with an empty claw
    pub fn rewind(&mut self, tuning: &Tuning) {
        self.phase = HookPhase::Swinging;
        self.length = 0.0;
        self.speed = tuning.hook_base_speed;
        self.attached = None;
    }

    fn swing(&mut self) {
        self.angle += self.direction * self.swing_speed;
        if self.angle.abs() > self.max_angle {
            self.angle = self.angle.clamp(-self.max_angle, self.max_angle);
            self.direction = -self.direction;
        }
    }
}

/// Sound played shortly after an item is hooked
fn pickup_sound(kind: ItemKind) -> SoundEffect {
    match kind {
        ItemKind::Gold => SoundEffect::Gold,
        ItemKind::Diamond => SoundEffect::Diamond,
        ItemKind::Stone => SoundEffect::Stone,
        _ => SoundEffect::Collect,
    }
}

/// Fire the hook. Only a swinging hook in a running session responds.
pub fn fire(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.phase != SessionPhase::Running || state.hook.phase != HookPhase::Swinging {
        return false;
    }

    state.hook.phase = HookPhase::Extending;
    state.hook.length = 0.0;
    state.hook.speed = tuning.hook_base_speed;
    state.emit(GameEvent::Sound(SoundEffect::Shoot));
    true
}

/// Advance the hook by one tick. Returns the item wound all the way in, if any.
pub fn advance_hook(state: &mut GameState, tuning: &Tuning) -> Option<Item> {
    match state.hook.phase {
        HookPhase::Swinging => {
            state.hook.swing();
            None
        }
        HookPhase::Extending => {
            extend(state, tuning);
            None
        }
        HookPhase::Retracting => retract(state, tuning),
    }
}

fn extend(state: &mut GameState, tuning: &Tuning) {
    let hook = &mut state.hook;
    hook.length = (hook.length + hook.speed).min(hook.max_length);
    let tip = hook.tip();

    if let Some(id) = first_collision(tip, state.items.iter(), tuning.collision_padding, None) {
        grab(state, id, tuning);
    } else if state.hook.length >= state.hook.max_length || !state.area.contains(tip) {
        state.hook.phase = HookPhase::Retracting;
    }
}

fn grab(state: &mut GameState, id: ItemId, tuning: &Tuning) {
    let Some(item) = state.items.get(id) else {
        return;
    };
    let (kind, center, color) = (item.kind, item.center(), item.kind.color());
    let speed = tuning.retract_speed(item.weight, item.width, item.height);

    state.hook.phase = HookPhase::Retracting;

    if kind == ItemKind::Tnt {
        state.items.remove(id);
        state.hook.attached = None;
        log::debug!("TNT {:?} detonated on the hook", id);
        state.emit(GameEvent::Particles(ParticleRequest {
            pos: center,
            count: EXPLOSION_PARTICLES,
            kind: ParticleKind::Explosion,
            color,
        }));
        state.emit(GameEvent::Sound(SoundEffect::Explosion));
        return;
    }

    state.hook.attached = Some(id);
    state.hook.speed = speed;
    state.emit(GameEvent::Sound(SoundEffect::Hit));
    state.emit(GameEvent::Particles(ParticleRequest {
        pos: center,
        count: HIT_PARTICLES,
        kind: ParticleKind::Sparkle,
        color,
    }));
    state
        .scheduler
        .schedule(tuning.collect_sound_delay_ms, Deferred::PlaySound(pickup_sound(kind)));
}

fn retract(state: &mut GameState, tuning: &Tuning) -> Option<Item> {
    let hook = &mut state.hook;
    hook.length = (hook.length - hook.speed).max(0.0);
    let tip = hook.tip();

    if let Some(id) = state.hook.attached {
        match state.items.get_mut(id) {
            Some(item) => item.set_center(tip),
            None => {
                log::warn!("Hooked item {:?} vanished during retraction", id);
                state.hook.attached = None;
                state.hook.speed = tuning.hook_base_speed;
            }
        }
    }

    if state.hook.length > 0.0 {
        return None;
    }

    let retrieved = state.hook.attached.and_then(|id| state.items.remove(id));
    state.hook.rewind(tuning);
    retrieved
}
