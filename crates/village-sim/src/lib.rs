//! Village Trade Simulation Library
//!
//! Villagers pair up, walk to each other, gossip, and hand over surplus items.
//! The trade behavior-tree leaf lives in [`behavior::trade`]; everything else
//! is the ECS world it runs in.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod behavior;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;

pub use behavior::{Behavior, BehaviorSlot, BehaviorStatus, TradeEpisode, TradeWithVillager};
pub use config::SimConfig;
pub use error::{ConfigError, Result, SimError};
pub use events::EventLogger;
pub use simulation::Simulation;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
