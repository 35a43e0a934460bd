//! Pairing System
//!
//! Idle villagers occasionally pick the closest visible villager as their
//! interaction target.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::behavior::{BehaviorSlot, TradeWithVillager};
use crate::components::brain::{Brain, MemoryKind};
use crate::components::villager::{EntityKind, Villager, VillagerId};
use crate::components::world::Position;
use crate::config::PairingConfig;
use crate::SimRng;

/// System to assign interaction targets.
///
/// A target that did not lead to a running trade is forgotten first, then
/// with the configured chance the closest visible villager within reach is
/// remembered instead. Villagers are visited in id order so the random draws
/// are reproducible.
pub fn assign_interaction_targets(
    config: Option<Res<PairingConfig>>,
    mut rng: ResMut<SimRng>,
    living: Query<(&EntityKind, &Position)>,
    mut villagers: Query<
        (Entity, &VillagerId, &Position, &mut Brain, Option<&BehaviorSlot<TradeWithVillager>>),
        With<Villager>,
    >,
) {
    let defaults = PairingConfig::default();
    let config = config.as_deref().unwrap_or(&defaults);
    let max_distance_sqr = config.max_distance * config.max_distance;

    let mut order: Vec<(VillagerId, Entity)> = villagers
        .iter()
        .map(|(entity, id, _, _, _)| (id.clone(), entity))
        .collect();
    order.sort();

    for (_, entity) in order {
        let Ok((_, _, position, mut brain, slot)) = villagers.get_mut(entity) else {
            continue;
        };
        if slot.map_or(false, |s| s.is_running()) {
            continue;
        }
        if brain.interaction_target().is_some() {
            brain.erase_memory(MemoryKind::InteractionTarget);
        }

        if rng.0.gen::<f64>() >= config.chance {
            continue;
        }

        let partner = brain.nearest_visible().and_then(|visible| {
            visible.iter().find(|other| {
                living.get(*other).map_or(false, |(kind, other_position)| {
                    *kind == EntityKind::Villager
                        && position.distance_sqr(other_position) <= max_distance_sqr
                })
            })
        });
        if let Some(partner) = partner {
            tracing::trace!(?entity, ?partner, "paired for interaction");
            brain.set_interaction_target(partner);
        }
    }
}
