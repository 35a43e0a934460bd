//! Event Types
//!
//! Everything observable that happens between villagers, in the shape written
//! to the event log.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::inventory::ItemKind;
use crate::components::villager::VillagerId;

/// Primary event type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    EpisodeStarted,
    EpisodeStopped,
    Gossip,
    ItemThrown,
    ItemPickedUp,
}

/// Which exchange rule moved an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferRule {
    Food,
    Wheat,
    TradeSet,
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ConditionsFailed,
    TimedOut,
}

/// Type-specific payload of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    EpisodeStarted {
        trade_set: Option<Vec<ItemKind>>,
    },
    EpisodeStopped {
        reason: StopReason,
        duration_ticks: u64,
    },
    Gossip {
        actor_exchanges: u32,
        target_exchanges: u32,
    },
    ItemThrown {
        rule: TransferRule,
        item: ItemKind,
        amount: u32,
        slot: usize,
    },
    ItemPickedUp {
        item: ItemKind,
        amount: u32,
        thrower: Option<String>,
    },
}

impl EventDetails {
    pub fn event_type(&self) -> EventType {
        match self {
            EventDetails::EpisodeStarted { .. } => EventType::EpisodeStarted,
            EventDetails::EpisodeStopped { .. } => EventType::EpisodeStopped,
            EventDetails::Gossip { .. } => EventType::Gossip,
            EventDetails::ItemThrown { .. } => EventType::ItemThrown,
            EventDetails::ItemPickedUp { .. } => EventType::ItemPickedUp,
        }
    }
}

/// A single logged event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub tick: u64,
    pub event_type: EventType,
    pub actor: String,
    pub target: Option<String>,
    pub details: EventDetails,
}

impl Event {
    pub fn new(
        event_id: impl Into<String>,
        tick: u64,
        actor: impl Into<String>,
        target: Option<String>,
        details: EventDetails,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            tick,
            event_type: details.event_type(),
            actor: actor.into(),
            target,
            details,
        }
    }
}

/// Human-readable label for an entity: its villager id, or the raw entity
pub fn entity_label(world: &World, entity: Entity) -> String {
    world
        .get::<VillagerId>(entity)
        .map(|id| id.0.clone())
        .unwrap_or_else(|| format!("entity_{}", entity.index()))
}

/// Resource storing events generated this tick
#[derive(Resource, Debug)]
pub struct TickEvents {
    pub events: Vec<Event>,
    next_event_id: u64,
}

impl Default for TickEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl TickEvents {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_event_id: 1,
        }
    }

    pub fn generate_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    /// Build an event with a fresh id and queue it
    pub fn record(&mut self, tick: u64, actor: String, target: Option<String>, details: EventDetails) {
        let event_id = self.generate_id();
        self.events.push(Event::new(event_id, tick, actor, target, details));
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Queue an event if the world has a `TickEvents` resource
pub fn record_event(
    world: &mut World,
    tick: u64,
    actor: Entity,
    target: Option<Entity>,
    details: EventDetails,
) {
    let actor = entity_label(world, actor);
    let target = target.map(|t| entity_label(world, t));
    if let Some(mut events) = world.get_resource_mut::<TickEvents>() {
        events.record(tick, actor, target, details);
    }
}
