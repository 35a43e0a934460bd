//! Villager Components
//!
//! Identity, entity kind, profession, and current activity of living entities.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as a villager
#[derive(Component, Debug, Clone, Default)]
pub struct Villager;

/// Unique identifier for a villager
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VillagerId(pub String);

/// Kind of living entity. Every living entity in the world carries one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Villager,
    WanderingTrader,
    IronGolem,
    Cat,
    Player,
}

/// A villager's profession, keyed into the `RoleTable`
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profession(pub String);

impl Profession {
    pub const NONE: &'static str = "none";
    pub const FARMER: &'static str = "farmer";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl Default for Profession {
    fn default() -> Self {
        Self(Self::NONE.to_string())
    }
}

/// What a simulated villager is currently busy with.
///
/// Only villagers driven by the full agent AI carry this component; plain
/// villagers never report being busy.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    Fishing,
    TradingWithPlayer,
    Following,
    Sleeping,
    Fighting,
}

impl Activity {
    /// True when not engaged in any other scripted activity
    pub fn is_doing_nothing(&self) -> bool {
        matches!(self, Activity::Idle)
    }
}

/// Whether `entity` is a simulated agent currently busy with something else
pub fn is_busy(world: &World, entity: Entity) -> bool {
    world
        .get::<Activity>(entity)
        .map_or(false, |activity| !activity.is_doing_nothing())
}
