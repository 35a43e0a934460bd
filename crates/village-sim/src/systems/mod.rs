//! ECS Systems
//!
//! Per-tick systems for activities, perception, pairing, the trade runner,
//! movement, and thrown items.

pub mod activity;
pub mod behavior;
pub mod items;
pub mod movement;
pub mod pairing;
pub mod perception;

pub use activity::update_activities;
pub use behavior::run_trade_behaviors;
pub use items::{pickup_thrown_items, update_item_entities};
pub use movement::move_toward_walk_targets;
pub use pairing::assign_interaction_targets;
pub use perception::update_nearest_visible;
