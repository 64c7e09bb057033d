//! Claw Machine - simulation core for an arcade hook-and-claw game
//!
//! Core modules:
//! - `sim`: Per-tick simulation (hook, collisions, item spawning, rats)
//! - `simulation`: Session facade with the inbound API and event dispatch
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio playback and the score/timer UI live outside this crate
//! and observe the simulation through [`sim::EventSink`].

pub mod sim;
pub mod simulation;
pub mod tuning;

pub use simulation::Simulation;
pub use tuning::{OverlapFallback, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame delta (one animation frame at ~60 Hz)
    pub const FRAME_MS: f32 = 16.0;

    /// Miner anchor dimensions
    pub const MINER_WIDTH: f32 = 60.0;
    pub const MINER_HEIGHT: f32 = 60.0;
    /// Distance from the top of the canvas to the miner
    pub const MINER_TOP: f32 = 50.0;

    /// Spawn band: items live between 40% of the height and 100px above the bottom
    pub const BAND_TOP_RATIO: f32 = 0.4;
    pub const BAND_BOTTOM_INSET: f32 = 100.0;
    /// Horizontal margin kept free on both sides of the band
    pub const BAND_SIDE_MARGIN: f32 = 30.0;
    /// Extra vertical inset applied when sampling positions inside the band
    pub const BAND_SAMPLE_INSET: f32 = 20.0;

    /// Smallest accepted canvas dimension
    pub const MIN_CANVAS_DIM: f32 = 1.0;
}

/// Direction vector for a hook angle.
///
/// Angle 0 points straight down, positive angles swing toward +x.
#[inline]
pub fn hook_direction(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), angle.cos())
}

/// Sanitize a canvas dimension (NaN, infinite and tiny values collapse to the minimum)
#[inline]
pub fn sanitize_dim(value: f32) -> f32 {
    if value.is_finite() {
        value.max(consts::MIN_CANVAS_DIM)
    } else {
        consts::MIN_CANVAS_DIM
    }
}
