//! Simulation Harness
//!
//! Builds the ECS world and the per-tick schedule, and steps it.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::inventory::{Inventory, ItemEntity};
use crate::components::profession::{FoodPolicy, RoleTable};
use crate::components::world::SimulationState;
use crate::config::SimConfig;
use crate::events::types::{Event, TickEvents};
use crate::setup::{self, SpawnSummary};
use crate::systems::{
    assign_interaction_targets, move_toward_walk_targets, pickup_thrown_items, run_trade_behaviors,
    update_activities, update_item_entities, update_nearest_visible,
};
use crate::SimRng;

/// A seeded village with its schedule
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    /// Create a world from the configuration and spawn the village
    pub fn new(config: &SimConfig, seed: u64) -> Self {
        let mut world = Self::empty_world(config, seed);

        // Take the RNG out to avoid borrow conflicts
        if let Some(mut sim_rng) = world.remove_resource::<SimRng>() {
            setup::spawn_all(&mut world, &mut sim_rng.0, config);
            world.insert_resource(sim_rng);
        }

        Self {
            world,
            schedule: build_schedule(),
        }
    }

    /// A world with every resource in place but nobody in it
    pub fn empty_world(config: &SimConfig, seed: u64) -> World {
        let mut world = World::new();
        world.insert_resource(SimulationState::default());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
        world.insert_resource(TickEvents::new());
        world.insert_resource(RoleTable::from_config(&config.roles));
        world.insert_resource(FoodPolicy::from_config(&config.food));
        world.insert_resource(config.simulation.clone());
        world.insert_resource(config.trade.clone());
        world.insert_resource(config.gossip.clone());
        world.insert_resource(config.perception.clone());
        world.insert_resource(config.pairing.clone());
        world.insert_resource(config.movement.clone());
        world.insert_resource(config.items.clone());
        world
    }

    pub fn current_tick(&self) -> u64 {
        self.world
            .get_resource::<SimulationState>()
            .map_or(0, |s| s.current_tick)
    }

    /// Run one tick and return the events it produced
    pub fn step(&mut self) -> Vec<Event> {
        self.schedule.run(&mut self.world);
        if let Some(mut state) = self.world.get_resource_mut::<SimulationState>() {
            state.advance_tick();
        }
        self.world
            .get_resource_mut::<TickEvents>()
            .map(|mut events| events.drain())
            .unwrap_or_default()
    }

    /// Run `ticks` ticks, handing each tick's events to `on_events`
    pub fn run<E>(
        &mut self,
        ticks: u64,
        mut on_events: impl FnMut(u64, &[Event]) -> Result<(), E>,
    ) -> Result<(), E> {
        if let Some(mut state) = self.world.get_resource_mut::<SimulationState>() {
            state.max_ticks = state.current_tick + ticks;
        }
        for _ in 0..ticks {
            let tick = self.current_tick();
            let events = self.step();
            on_events(tick, &events)?;
        }
        Ok(())
    }

    /// Items held by villagers plus items lying around
    pub fn total_items(&mut self) -> u64 {
        let held: u64 = self
            .world
            .query::<&Inventory>()
            .iter(&self.world)
            .map(|inventory| u64::from(inventory.total_count()))
            .sum();
        let loose: u64 = self
            .world
            .query::<&ItemEntity>()
            .iter(&self.world)
            .map(|item| u64::from(item.stack.count))
            .sum();
        held + loose
    }

    pub fn spawn_summary(&mut self) -> SpawnSummary {
        setup::get_spawn_summary(&mut self.world)
    }
}

/// The per-tick system order
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            update_activities,
            update_nearest_visible,
            assign_interaction_targets,
            run_trade_behaviors,
            move_toward_walk_targets,
            update_item_entities,
            pickup_thrown_items,
        )
            .chain(),
    );
    schedule
}
