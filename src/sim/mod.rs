//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-driven ticks only
//! - Seeded RNG only
//! - Stable iteration order (item insertion order)
//! - No rendering or audio dependencies

pub mod collision;
pub mod difficulty;
pub mod events;
pub mod hook;
pub mod rats;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{first_collision, hook_item_collision};
pub use difficulty::{item_counts, item_pool, size_ratios, target_score, time_limit_secs};
pub use events::{EventSink, GameEvent, ParticleKind, ParticleRequest, SoundEffect};
pub use hook::{advance_hook, fire};
pub use rats::{Rat, RatPhase, RatPool, advance_rats, try_release};
pub use schedule::{Deferred, EventHandle, Scheduler};
pub use spawner::{SpawnReport, spawn_items};
pub use state::{
    GameState, Hook, HookPhase, Item, ItemId, ItemKind, ItemSet, ItemSize, Miner, PlayArea,
    SessionPhase,
};
pub use tick::{TickInput, configure_level, tick};
