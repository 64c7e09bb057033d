//! Outbound events
//!
//! The simulation never draws or plays anything itself. It describes what
//! happened as [`GameEvent`]s and hands them to an [`EventSink`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sound requests understood by the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Hook fired
    Shoot,
    /// Hook grabbed an item
    Hit,
    /// Generic pickup / item delivered to the miner
    Collect,
    /// Gold hooked
    Gold,
    /// Diamond hooked
    Diamond,
    /// Stone hooked
    Stone,
    /// TNT detonated on the hook
    Explosion,
    /// A rat got away with a diamond
    Steal,
    /// Field cleared
    LevelUp,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    /// Name the audio collaborator keys its sound bank by
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Hit => "hit",
            SoundEffect::Collect => "collect",
            SoundEffect::Gold => "gold",
            SoundEffect::Diamond => "diamond",
            SoundEffect::Stone => "stone",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Steal => "steal",
            SoundEffect::LevelUp => "levelUp",
            SoundEffect::GameOver => "gameOver",
        }
    }
}

/// Particle effect flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Sparkle,
    Explosion,
    Collect,
}

/// Request to spawn a burst of particles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRequest {
    pub pos: Vec2,
    pub count: u32,
    pub kind: ParticleKind,
    /// 0xRRGGBB
    pub color: u32,
}

/// Everything the core tells its collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreDelta(i64),
    LevelComplete,
    ItemStolen { original_value: i32 },
    Particles(ParticleRequest),
    Sound(SoundEffect),
}

/// Collaborator interface for the simulation's outbound events.
///
/// Every method defaults to a no-op so a collaborator only implements what it
/// cares about.
pub trait EventSink {
    fn on_score_delta(&mut self, _points: i64) {}
    fn on_level_complete(&mut self) {}
    fn on_item_stolen(&mut self, _original_value: i32) {}
    fn on_particle_request(&mut self, _request: ParticleRequest) {}
    fn on_sound_request(&mut self, _sound: SoundEffect) {}

    /// Route a single event to the matching callback
    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::ScoreDelta(points) => self.on_score_delta(points),
            GameEvent::LevelComplete => self.on_level_complete(),
            GameEvent::ItemStolen { original_value } => self.on_item_stolen(original_value),
            GameEvent::Particles(request) => self.on_particle_request(request),
            GameEvent::Sound(sound) => self.on_sound_request(sound),
        }
    }
}

/// Discards everything
impl EventSink for () {}

/// Records every event in order
impl EventSink for Vec<GameEvent> {
    fn dispatch(&mut self, event: GameEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_score_delta(&mut self, points: i64) {
        (**self).on_score_delta(points)
    }
    fn on_level_complete(&mut self) {
        (**self).on_level_complete()
    }
    fn on_item_stolen(&mut self, original_value: i32) {
        (**self).on_item_stolen(original_value)
    }
    fn on_particle_request(&mut self, request: ParticleRequest) {
        (**self).on_particle_request(request)
    }
    fn on_sound_request(&mut self, sound: SoundEffect) {
        (**self).on_sound_request(sound)
    }
    fn dispatch(&mut self, event: GameEvent) {
        (**self).dispatch(event)
    }
}
