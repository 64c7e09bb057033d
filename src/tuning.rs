//! Game balance and tuning constants
//!
//! Every gameplay number the simulation uses lives here so a level designer can
//! override it from JSON without recompiling.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// What the spawner does when it cannot find a non-overlapping spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapFallback {
    /// Keep the last sampled candidate even if it overlaps a neighbour
    #[default]
    AcceptLastCandidate,
    /// Drop the item from the field
    SkipItem,
}

impl OverlapFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapFallback::AcceptLastCandidate => "accept_last_candidate",
            OverlapFallback::SkipItem => "skip_item",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accept" | "accept_last_candidate" => Some(OverlapFallback::AcceptLastCandidate),
            "skip" | "skip_item" => Some(OverlapFallback::SkipItem),
            _ => None,
        }
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Hook ===
    /// Extension speed and empty-handed retraction speed (px/tick)
    pub hook_base_speed: f32,
    /// Slowest possible retraction (px/tick)
    pub hook_min_speed: f32,
    /// Retraction slowdown per unit of item weight
    pub hook_weight_factor: f32,
    /// Item (width + height) is divided by this to get the size slowdown
    pub hook_size_divisor: f32,
    /// Swing speed (radians/tick)
    pub swing_speed: f32,
    /// Margin applied to the computed maximum swing angle
    pub swing_angle_margin: f32,
    /// Extra radius added to an item's bounding circle for hook contact
    pub collision_padding: f32,

    // === Spawner ===
    /// Minimum free gap between spawned items (px)
    pub item_spacing: f32,
    /// Placement attempts before the fallback policy kicks in
    pub placement_attempts: u32,
    /// Fallback policy after exhausting placement attempts
    pub overlap_fallback: OverlapFallback,

    // === Rats ===
    /// First level with rats
    pub rat_min_level: u32,
    /// Seconds into a level before rats show up
    pub rat_spawn_delay_secs: f32,
    /// Upper bound on simultaneous rats
    pub rat_max_count: u32,
    /// Rat speed range (px/tick)
    pub rat_speed_min: f32,
    pub rat_speed_max: f32,
    /// Center distance at which a rat starts stealing
    pub rat_steal_distance: f32,
    /// Steal progress gained per tick
    pub rat_steal_increment: f32,
    /// Ticks a rat waits without any diamond before fleeing
    pub rat_give_up_ticks: u32,

    // === Deferred effects ===
    /// Delay between hooking an item and its type-specific sound
    pub collect_sound_delay_ms: f32,
    /// Advance to the next level automatically after this delay (None = caller decides)
    pub level_advance_delay_ms: Option<f32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            // Hook
            hook_base_speed: 8.0,
            hook_min_speed: 1.0,
            hook_weight_factor: 0.5,
            hook_size_divisor: 80.0,
            swing_speed: 0.01,
            swing_angle_margin: 1.1,
            collision_padding: 10.0,

            // Spawner
            item_spacing: 35.0,
            placement_attempts: 100,
            overlap_fallback: OverlapFallback::AcceptLastCandidate,

            // Rats
            rat_min_level: 5,
            rat_spawn_delay_secs: 30.0,
            rat_max_count: 5,
            rat_speed_min: 0.15,
            rat_speed_max: 0.30,
            rat_steal_distance: 20.0,
            rat_steal_increment: 0.05,
            rat_give_up_ticks: 600,

            // Deferred effects
            collect_sound_delay_ms: 100.0,
            level_advance_delay_ms: None,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON (handy for dumping a starting file)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    return tuning;
                }
                Err(e) => log::warn!("Invalid tuning file {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read tuning file {}: {}", path.display(), e),
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Retraction speed for an item of the given weight and footprint
    pub fn retract_speed(&self, weight: f32, width: f32, height: f32) -> f32 {
        let weight_slowdown = weight * self.hook_weight_factor;
        let size_slowdown = (width + height) / self.hook_size_divisor;
        (self.hook_base_speed - weight_slowdown - size_slowdown).max(self.hook_min_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "hook_base_speed": 10.0 }"#).unwrap();
        assert_eq!(tuning.hook_base_speed, 10.0);
        assert_eq!(tuning.placement_attempts, 100);
        assert_eq!(tuning.overlap_fallback, OverlapFallback::AcceptLastCandidate);
        assert!(tuning.level_advance_delay_ms.is_none());
    }

    #[test]
    fn test_fallback_policy_parses() {
        let tuning = Tuning::from_json(r#"{ "overlap_fallback": "skip_item" }"#).unwrap();
        assert_eq!(tuning.overlap_fallback, OverlapFallback::SkipItem);
        assert_eq!(OverlapFallback::from_str("Accept"), Some(OverlapFallback::AcceptLastCandidate));
        assert_eq!(OverlapFallback::from_str("nope"), None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let tuning = Tuning::load(Path::new("/definitely/not/here/tuning.json"));
        assert_eq!(tuning.hook_base_speed, Tuning::default().hook_base_speed);
    }

    #[test]
    fn test_round_trip_through_json() {
        let json = Tuning::default().to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.rat_give_up_ticks, 600);
    }

    #[test]
    fn test_retract_speed_slows_with_weight_and_size() {
        let tuning = Tuning::default();
        let stone = tuning.retract_speed(5.0, 60.0, 60.0);
        let bone = tuning.retract_speed(1.0, 30.0, 15.0);
        assert!(stone < bone);
        assert!((stone - 4.0).abs() < 1e-5);
        // Floor speed
        assert_eq!(tuning.retract_speed(100.0, 500.0, 500.0), tuning.hook_min_speed);
    }
}
