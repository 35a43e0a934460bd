//! Behavior Runner System
//!
//! Drives every villager's trade slot once per tick.

use bevy_ecs::prelude::*;

use crate::behavior::{BehaviorSlot, TradeWithVillager};
use crate::components::brain::Brain;
use crate::components::villager::VillagerId;
use crate::components::world::SimulationState;
use crate::events::types::{record_event, EventDetails};

/// Exclusive system to start, tick, or stop each villager's trade behavior.
///
/// Villagers are processed in id order. The slot is taken out of the entity
/// while it runs so the behavior can freely touch the rest of the world.
pub fn run_trade_behaviors(world: &mut World) {
    let time = world.get_resource::<SimulationState>().map_or(0, |s| s.current_tick);

    let mut agents: Vec<(VillagerId, Entity)> = world
        .query_filtered::<(Entity, &VillagerId), With<BehaviorSlot<TradeWithVillager>>>()
        .iter(world)
        .map(|(entity, id)| (id.clone(), entity))
        .collect();
    agents.sort();

    for (id, agent) in agents {
        let Some(mut slot) = world.entity_mut(agent).take::<BehaviorSlot<TradeWithVillager>>() else {
            continue;
        };
        let target = world.get::<Brain>(agent).and_then(|brain| brain.interaction_target());

        if let Some(reason) = slot.update(world, agent, time) {
            let duration_ticks = time.saturating_sub(slot.started_at());
            tracing::info!(villager = %id.0, ?reason, duration_ticks, "trade episode stopped");
            record_event(
                world,
                time,
                agent,
                target,
                EventDetails::EpisodeStopped { reason, duration_ticks },
            );
        }

        world.entity_mut(agent).insert(slot);
    }
}
