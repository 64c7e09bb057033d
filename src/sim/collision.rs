//! Collision detection between the hook tip and items
//!
//! Items are approximated by a bounding circle centered on the item with a
//! radius of half its larger dimension, padded so the claw feels generous.

use glam::Vec2;

use super::state::{Item, ItemId};

/// Default contact padding around an item's bounding circle (px)
pub const DEFAULT_PADDING: f32 = 10.0;

/// Contact radius of an item for the given padding
#[inline]
pub fn contact_radius(item: &Item, padding: f32) -> f32 {
    item.max_dim() / 2.0 + padding
}

/// True if the hook tip touches the item
pub fn hook_item_collision(tip: Vec2, item: &Item, padding: f32) -> bool {
    tip.distance(item.center()) < contact_radius(item, padding)
}

/// First item (in iteration order) touched by the tip.
///
/// Items whose id is `skip` are ignored. Later items are never tested once a
/// hit is found, so the hook can grab at most one item per tick.
pub fn first_collision<'a, I>(tip: Vec2, items: I, padding: f32, skip: Option<ItemId>) -> Option<ItemId>
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .filter(|item| Some(item.id) != skip)
        .find(|item| hook_item_collision(tip, item, padding))
        .map(|item| item.id)
}
