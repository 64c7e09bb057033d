//! Game state and core simulation types
//!
//! Everything a tick mutates lives in [`GameState`]. Items are owned by a single
//! [`ItemSet`] arena and referenced elsewhere only through [`ItemId`] handles.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::rats::RatPool;
use super::schedule::Scheduler;
use crate::consts::*;
use crate::sanitize_dim;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Level configured, waiting for start
    Idle,
    /// Ticks advance the simulation
    Running,
    /// Ticks are ignored, deferred effects are cancelled
    Paused,
    /// Run finished (time out or explicit stop)
    Ended,
}

/// Item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Gold,
    Stone,
    Diamond,
    Bone,
    Bag,
    Tnt,
    /// A rat on the field; only ever created by the rat pool
    Mouse,
}

/// Item size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

/// Fixed dimensions and economy of one (kind, size) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpec {
    pub width: f32,
    pub height: f32,
    pub value: i32,
    pub weight: f32,
}

const fn spec(width: f32, height: f32, value: i32, weight: f32) -> ItemSpec {
    ItemSpec {
        width,
        height,
        value,
        weight,
    }
}

impl ItemKind {
    /// Kinds the spawner may place (mice come from the rat pool)
    pub const SPAWNABLE: [ItemKind; 6] = [
        ItemKind::Gold,
        ItemKind::Diamond,
        ItemKind::Stone,
        ItemKind::Bone,
        ItemKind::Bag,
        ItemKind::Tnt,
    ];

    /// Catalog lookup
    pub fn spec(self, size: ItemSize) -> ItemSpec {
        use ItemSize::*;
        match (self, size) {
            (ItemKind::Gold, Small) => spec(25.0, 20.0, 100, 2.0),
            (ItemKind::Gold, Medium) => spec(40.0, 30.0, 200, 3.0),
            (ItemKind::Gold, Large) => spec(60.0, 45.0, 350, 5.0),
            (ItemKind::Diamond, Small) => spec(20.0, 25.0, 300, 2.0),
            (ItemKind::Diamond, Medium) => spec(30.0, 35.0, 600, 3.0),
            (ItemKind::Diamond, Large) => spec(45.0, 55.0, 1000, 4.0),
            (ItemKind::Stone, Small) => spec(25.0, 25.0, 20, 3.0),
            (ItemKind::Stone, Medium) => spec(40.0, 40.0, 35, 4.0),
            (ItemKind::Stone, Large) => spec(60.0, 60.0, 50, 5.0),
            (ItemKind::Bone, Small) => spec(30.0, 15.0, 10, 1.0),
            (ItemKind::Bone, Medium) => spec(45.0, 22.0, 15, 2.0),
            (ItemKind::Bone, Large) => spec(60.0, 30.0, 25, 3.0),
            (ItemKind::Bag, Small) => spec(25.0, 25.0, 50, 1.0),
            (ItemKind::Bag, Medium) => spec(35.0, 35.0, 75, 2.0),
            (ItemKind::Bag, Large) => spec(50.0, 50.0, 100, 3.0),
            (ItemKind::Tnt, Small) => spec(20.0, 25.0, -100, 5.0),
            (ItemKind::Tnt, Medium) => spec(30.0, 35.0, -200, 7.0),
            (ItemKind::Tnt, Large) => spec(40.0, 50.0, -350, 10.0),
            // Mice are worth nothing until they steal something
            (ItemKind::Mouse, Small) => spec(25.0, 15.0, 0, 1.0),
            (ItemKind::Mouse, Medium) => spec(35.0, 20.0, 0, 2.0),
            (ItemKind::Mouse, Large) => spec(45.0, 25.0, 0, 3.0),
        }
    }

    /// Base rarity (higher = more common in the pool)
    pub fn rarity(self) -> f32 {
        match self {
            ItemKind::Gold => 0.3,
            ItemKind::Stone => 0.4,
            ItemKind::Diamond => 0.15,
            ItemKind::Bone => 0.15,
            ItemKind::Bag => 0.2,
            ItemKind::Tnt => 0.1,
            ItemKind::Mouse => 0.08,
        }
    }

    /// Primary display color (0xRRGGBB), forwarded with particle requests
    pub fn color(self) -> u32 {
        match self {
            ItemKind::Gold => 0xFFD700,
            ItemKind::Stone => 0x696969,
            ItemKind::Diamond => 0xE6E6FA,
            ItemKind::Bone => 0xF5F5DC,
            ItemKind::Bag => 0x8B4513,
            ItemKind::Tnt => 0xDC143C,
            ItemKind::Mouse => 0x808080,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Gold => "gold",
            ItemKind::Stone => "stone",
            ItemKind::Diamond => "diamond",
            ItemKind::Bone => "bone",
            ItemKind::Bag => "bag",
            ItemKind::Tnt => "tnt",
            ItemKind::Mouse => "mouse",
        }
    }
}

/// Stable handle into the [`ItemSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// A collectible or hazardous object on the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Top-left corner in play-area coordinates
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: ItemKind,
    pub value: i32,
    pub weight: f32,
    pub size: ItemSize,
}

impl Item {
    /// Build an item from the catalog entry for `kind`/`size`
    pub fn new(id: ItemId, kind: ItemKind, size: ItemSize, pos: Vec2) -> Self {
        let spec = kind.spec(size);
        Self {
            id,
            pos,
            width: spec.width,
            height: spec.height,
            kind,
            value: spec.value,
            weight: spec.weight,
            size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width, self.height) * 0.5
    }

    /// Larger of width and height
    #[inline]
    pub fn max_dim(&self) -> f32 {
        self.width.max(self.height)
    }

    /// Move so the center lands on `center`
    #[inline]
    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - Vec2::new(self.width, self.height) * 0.5;
    }
}

/// The active item set, kept in insertion order for stable iteration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSet {
    items: Vec<Item>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert an item; returns false (and leaves the set untouched) on a duplicate id
    pub fn insert(&mut self, item: Item) -> bool {
        if self.contains(item.id) {
            log::warn!("Refusing duplicate item id {:?}", item.id);
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove an item, preserving the order of the rest
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn count_kind(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Canvas-relative play area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_dim(width),
            height: sanitize_dim(height),
        }
    }

    /// Top edge of the spawn band
    pub fn band_top(&self) -> f32 {
        self.height * BAND_TOP_RATIO
    }

    /// Bottom edge of the spawn band (never above the top edge)
    pub fn band_bottom(&self) -> f32 {
        (self.height - BAND_BOTTOM_INSET).max(self.band_top())
    }

    /// Corners of the spawn band: top-left, top-right, bottom-left, bottom-right
    pub fn band_corners(&self) -> [Vec2; 4] {
        let left = BAND_SIDE_MARGIN.min(self.width / 2.0);
        let right = (self.width - BAND_SIDE_MARGIN).max(left);
        let (top, bottom) = (self.band_top(), self.band_bottom());
        [
            Vec2::new(left, top),
            Vec2::new(right, top),
            Vec2::new(left, bottom),
            Vec2::new(right, bottom),
        ]
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }
}

/// The miner sprite anchor; the hook hangs from its bottom-center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Miner {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Miner {
    /// Center the miner horizontally near the top of the area
    pub fn for_area(area: &PlayArea) -> Self {
        Self {
            pos: Vec2::new(area.width / 2.0 - MINER_WIDTH / 2.0, MINER_TOP),
            width: MINER_WIDTH,
            height: MINER_HEIGHT,
        }
    }

    /// Hook pivot point
    pub fn pivot(&self) -> Vec2 {
        self.pos + Vec2::new(self.width / 2.0, self.height)
    }
}

/// Hook phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookPhase {
    Swinging,
    Extending,
    Retracting,
}

/// The player's hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hook {
    /// Rope origin (miner bottom-center)
    pub pivot: Vec2,
    /// Radians from straight down, positive toward +x
    pub angle: f32,
    pub length: f32,
    /// Current extension/retraction speed (px/tick)
    pub speed: f32,
    pub phase: HookPhase,
    /// Swing direction, -1 or +1
    pub direction: f32,
    /// Swing speed (radians/tick)
    pub swing_speed: f32,
    pub max_length: f32,
    /// Largest swing magnitude, derived from the spawn band geometry
    pub max_angle: f32,
    pub attached: Option<ItemId>,
}

impl Hook {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pivot: Vec2::ZERO,
            angle: 0.0,
            length: 0.0,
            speed: tuning.hook_base_speed,
            phase: HookPhase::Swinging,
            direction: 1.0,
            swing_speed: tuning.swing_speed,
            max_length: 400.0,
            max_angle: std::f32::consts::FRAC_PI_3,
            attached: None,
        }
    }

    /// Current tip position
    pub fn tip(&self) -> Vec2 {
        self.pivot + crate::hook_direction(self.angle) * self.length
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    pub phase: SessionPhase,
    /// Ticks simulated while running
    pub time_ticks: u64,
    /// Simulated milliseconds spent in the current level
    pub level_elapsed_ms: f64,
    pub area: PlayArea,
    pub miner: Miner,
    pub hook: Hook,
    pub items: ItemSet,
    pub rats: RatPool,
    pub scheduler: Scheduler,
    /// Level completion was already signalled for this level
    pub level_cleared: bool,
    /// Rats were already released this level
    pub rats_released: bool,
    /// Events produced this tick, flushed to the sink by the caller
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an empty level-1 state for the given canvas
    pub fn new(seed: u64, width: f32, height: f32, tuning: &Tuning) -> Self {
        let area = PlayArea::new(width, height);
        let miner = Miner::for_area(&area);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            phase: SessionPhase::Idle,
            time_ticks: 0,
            level_elapsed_ms: 0.0,
            area,
            miner,
            hook: Hook::new(tuning),
            items: ItemSet::new(),
            rats: RatPool::default(),
            scheduler: Scheduler::default(),
            level_cleared: false,
            rats_released: false,
            events: Vec::new(),
            next_id: 1,
        };
        state.apply_layout(width, height, tuning);
        state
    }

    /// Allocate a new entity ID (never reused)
    pub fn next_entity_id(&mut self) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        ItemId(id)
    }

    /// Recompute miner, pivot and reach for a canvas size
    pub fn apply_layout(&mut self, width: f32, height: f32, tuning: &Tuning) {
        self.area = PlayArea::new(width, height);
        self.miner = Miner::for_area(&self.area);
        self.hook.fit_to_area(self.miner.pivot(), &self.area, tuning.swing_angle_margin);
    }

    /// Seconds spent in the current level
    pub fn level_elapsed_secs(&self) -> f32 {
        (self.level_elapsed_ms / 1000.0) as f32
    }

    /// Queue an outbound event
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
