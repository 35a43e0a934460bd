//! Villager Spawning
//!
//! Functions to spawn villagers with random professions and starting
//! inventories, plus a few non-villager bystanders.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::BTreeMap;

use crate::behavior::{BehaviorSlot, TradeWithVillager};
use crate::components::brain::Brain;
use crate::components::inventory::{Inventory, ItemKind, ItemStack};
use crate::components::profession::RoleTable;
use crate::components::social::GossipState;
use crate::components::villager::{Activity, EntityKind, Profession, Villager, VillagerId};
use crate::components::world::{EyeHeight, Position};
use crate::config::SimConfig;

/// Item kinds villagers start with, weighted toward food and farm produce
const STARTING_ITEMS: &[(ItemKind, u32)] = &[
    (ItemKind::Wheat, 6),
    (ItemKind::Bread, 5),
    (ItemKind::Potato, 4),
    (ItemKind::Carrot, 4),
    (ItemKind::Beetroot, 3),
    (ItemKind::WheatSeeds, 3),
    (ItemKind::BeetrootSeeds, 2),
    (ItemKind::BoneMeal, 2),
    (ItemKind::Emerald, 2),
    (ItemKind::Paper, 1),
    (ItemKind::Coal, 1),
    (ItemKind::Leather, 1),
    (ItemKind::Wool, 1),
    (ItemKind::EnderPearl, 1),
];

/// Non-villagers that wander through the village
const BYSTANDERS: [EntityKind; 2] = [EntityKind::IronGolem, EntityKind::Cat];

fn pick_weighted(rng: &mut SmallRng) -> ItemKind {
    let total: u32 = STARTING_ITEMS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (kind, weight) in STARTING_ITEMS {
        if roll < *weight {
            return *kind;
        }
        roll -= weight;
    }
    ItemKind::Wheat
}

/// Generate a starting inventory that fills about half its slots
pub fn generate_inventory(rng: &mut SmallRng, size: usize) -> Inventory {
    let stack_count = rng.gen_range(0..=size.div_ceil(2));
    let stacks: Vec<ItemStack> = (0..stack_count)
        .map(|_| {
            let kind = pick_weighted(rng);
            ItemStack::new(kind, rng.gen_range(1..=kind.max_stack_size()))
        })
        .collect();
    Inventory::with_stacks(size, stacks)
}

fn random_position(rng: &mut SmallRng, radius: f64) -> Position {
    if radius <= 0.0 {
        return Position::default();
    }
    Position::new(rng.gen_range(-radius..=radius), 0.0, rng.gen_range(-radius..=radius))
}

/// Spawn the configured number of villagers. Returns their entities in id order.
pub fn spawn_villagers(world: &mut World, rng: &mut SmallRng, config: &SimConfig) -> Vec<Entity> {
    let professions: Vec<String> = match world.get_resource::<RoleTable>() {
        Some(roles) if !roles.role_ids().is_empty() => {
            roles.role_ids().into_iter().map(str::to_string).collect()
        }
        _ => vec![Profession::NONE.to_string()],
    };

    let sim = &config.simulation;
    (0..sim.villager_count)
        .map(|i| {
            let profession = professions[rng.gen_range(0..professions.len())].clone();
            let inventory = generate_inventory(rng, sim.inventory_size);
            let position = random_position(rng, sim.spawn_radius);
            let simulated = rng.gen::<f64>() < sim.simulated_agent_ratio;

            let mut entity = world.spawn((
                Villager,
                VillagerId(format!("villager_{:03}", i + 1)),
                EntityKind::Villager,
                Profession::new(profession),
                inventory,
                position,
                EyeHeight::default(),
                Brain::new(),
                GossipState::new(),
                BehaviorSlot::new(TradeWithVillager::new(config.trade.walk_speed))
                    .with_max_duration(config.trade.max_duration_ticks),
            ));
            if simulated {
                entity.insert(Activity::Idle);
            }
            entity.id()
        })
        .collect()
}

/// Spawn one of each bystander kind somewhere in the village
pub fn spawn_bystanders(world: &mut World, rng: &mut SmallRng, config: &SimConfig) -> Vec<Entity> {
    BYSTANDERS
        .iter()
        .map(|kind| {
            let position = random_position(rng, config.simulation.spawn_radius);
            world.spawn((*kind, position, EyeHeight::default())).id()
        })
        .collect()
}

/// Spawn villagers and bystanders
pub fn spawn_all(world: &mut World, rng: &mut SmallRng, config: &SimConfig) {
    spawn_villagers(world, rng, config);
    spawn_bystanders(world, rng, config);
}

/// Summary of spawned villagers
#[derive(Debug, Default)]
pub struct SpawnSummary {
    pub total_villagers: u32,
    pub simulated_agents: u32,
    pub total_items: u32,
    pub by_profession: BTreeMap<String, u32>,
}

impl std::fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total villagers: {}", self.total_villagers)?;
        writeln!(f, "Simulated agents: {}", self.simulated_agents)?;
        writeln!(f, "Items held: {}", self.total_items)?;
        writeln!(f, "By profession:")?;
        for (profession, count) in &self.by_profession {
            writeln!(f, "  {}: {}", profession, count)?;
        }
        Ok(())
    }
}

/// Count spawned villagers by profession
pub fn get_spawn_summary(world: &mut World) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    let mut query = world.query_filtered::<(&Profession, &Inventory, Option<&Activity>), With<Villager>>();

    for (profession, inventory, activity) in query.iter(world) {
        summary.total_villagers += 1;
        if activity.is_some() {
            summary.simulated_agents += 1;
        }
        summary.total_items += inventory.total_count();
        *summary.by_profession.entry(profession.id().to_string()).or_insert(0) += 1;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_roles;
    use rand::SeedableRng;

    #[test]
    fn test_inventory_generation() {
        let mut rng = SmallRng::seed_from_u64(12345);
        for _ in 0..50 {
            let inventory = generate_inventory(&mut rng, 8);
            assert_eq!(inventory.container_size(), 8);
            assert!(inventory.stacks().count() <= 4);
            assert!(inventory
                .stacks()
                .all(|(_, s)| s.count >= 1 && s.count <= s.max_stack_size));
        }
    }

    #[test]
    fn test_spawn_villagers() {
        let mut world = World::new();
        world.insert_resource(RoleTable::from_config(&default_roles()));
        let mut rng = SmallRng::seed_from_u64(42);
        let mut config = SimConfig::default();
        config.simulation.villager_count = 20;
        config.simulation.simulated_agent_ratio = 1.0;

        let villagers = spawn_villagers(&mut world, &mut rng, &config);
        assert_eq!(villagers.len(), 20);
        assert_eq!(
            world.get::<VillagerId>(villagers[0]).map(|id| id.0.as_str()),
            Some("villager_001")
        );

        let summary = get_spawn_summary(&mut world);
        assert_eq!(summary.total_villagers, 20);
        assert_eq!(summary.simulated_agents, 20);
        assert!(summary
            .by_profession
            .keys()
            .all(|p| config.roles.contains_key(p)));
    }

    #[test]
    fn test_bystanders_are_not_villagers() {
        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(42);
        let bystanders = spawn_bystanders(&mut world, &mut rng, &SimConfig::default());

        assert_eq!(bystanders.len(), 2);
        for entity in bystanders {
            assert!(world.get::<Villager>(entity).is_none());
            assert_ne!(world.get::<EntityKind>(entity), Some(&EntityKind::Villager));
        }
    }
}
