//! Brain Components
//!
//! Per-villager memory store: keyed slots that behaviors and sensors read,
//! write, and erase.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Keys of the memory slots a brain can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    InteractionTarget,
    NearestVisibleLivingEntities,
    LookTarget,
    WalkTarget,
}

/// Required state of a memory slot for a behavior to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStatus {
    ValuePresent,
    ValueAbsent,
    Registered,
}

/// Snapshot of nearby living entities the owner can currently see,
/// closest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NearestVisibleLivingEntities {
    entities: Vec<Entity>,
}

impl NearestVisibleLivingEntities {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Membership test
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Where an entity wants to walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkTarget {
    pub entity: Entity,
    pub speed: f64,
    pub close_enough: f64,
}

/// Component: the memory store of a villager
#[derive(Component, Debug, Clone, Default)]
pub struct Brain {
    interaction_target: Option<Entity>,
    nearest_visible: Option<NearestVisibleLivingEntities>,
    look_target: Option<Entity>,
    walk_target: Option<WalkTarget>,
}

impl Brain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the slot currently holds a value
    pub fn has_memory(&self, kind: MemoryKind) -> bool {
        match kind {
            MemoryKind::InteractionTarget => self.interaction_target.is_some(),
            MemoryKind::NearestVisibleLivingEntities => self.nearest_visible.is_some(),
            MemoryKind::LookTarget => self.look_target.is_some(),
            MemoryKind::WalkTarget => self.walk_target.is_some(),
        }
    }

    /// Whether the slot satisfies a required status
    pub fn check_memory(&self, kind: MemoryKind, status: MemoryStatus) -> bool {
        match status {
            MemoryStatus::ValuePresent => self.has_memory(kind),
            MemoryStatus::ValueAbsent => !self.has_memory(kind),
            MemoryStatus::Registered => true,
        }
    }

    pub fn erase_memory(&mut self, kind: MemoryKind) {
        match kind {
            MemoryKind::InteractionTarget => self.interaction_target = None,
            MemoryKind::NearestVisibleLivingEntities => self.nearest_visible = None,
            MemoryKind::LookTarget => self.look_target = None,
            MemoryKind::WalkTarget => self.walk_target = None,
        }
    }

    pub fn interaction_target(&self) -> Option<Entity> {
        self.interaction_target
    }

    pub fn set_interaction_target(&mut self, target: Entity) {
        self.interaction_target = Some(target);
    }

    pub fn nearest_visible(&self) -> Option<&NearestVisibleLivingEntities> {
        self.nearest_visible.as_ref()
    }

    pub fn set_nearest_visible(&mut self, visible: NearestVisibleLivingEntities) {
        self.nearest_visible = Some(visible);
    }

    pub fn look_target(&self) -> Option<Entity> {
        self.look_target
    }

    pub fn set_look_target(&mut self, target: Entity) {
        self.look_target = Some(target);
    }

    pub fn walk_target(&self) -> Option<WalkTarget> {
        self.walk_target
    }

    pub fn set_walk_target(&mut self, target: WalkTarget) {
        self.walk_target = Some(target);
    }
}
