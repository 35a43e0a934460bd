//! Item Systems
//!
//! Flight of thrown items and pickup by nearby villagers.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::inventory::{Inventory, ItemEntity};
use crate::components::villager::{Villager, VillagerId};
use crate::components::world::{Position, SimulationState, Vec3, Velocity};
use crate::config::ItemConfig;
use crate::events::types::{EventDetails, TickEvents};

/// System to move thrown items under gravity until they land, and count down
/// their pickup delay
pub fn update_item_entities(
    config: Option<Res<ItemConfig>>,
    mut items: Query<(&mut Position, &mut Velocity, &mut ItemEntity)>,
) {
    let defaults = ItemConfig::default();
    let config = config.as_deref().unwrap_or(&defaults);

    for (mut position, mut velocity, mut item) in items.iter_mut() {
        item.pickup_delay = item.pickup_delay.saturating_sub(1);

        if velocity.0 == Vec3::ZERO && position.0.y <= config.ground_level {
            continue;
        }

        velocity.0.y -= config.gravity;
        position.0 = position.0 + velocity.0;

        if position.0.y <= config.ground_level {
            position.0.y = config.ground_level;
            velocity.0 = Vec3::ZERO;
        } else {
            velocity.0 = velocity.0 * config.drag;
        }
    }
}

/// System to let villagers pick up items lying within reach.
///
/// Each item goes to the closest villager in range other than its thrower.
/// Whatever does not fit stays on the ground.
pub fn pickup_thrown_items(
    mut commands: Commands,
    config: Option<Res<ItemConfig>>,
    state: Option<Res<SimulationState>>,
    mut tick_events: ResMut<TickEvents>,
    mut items: Query<(Entity, &Position, &mut ItemEntity)>,
    mut villagers: Query<(Entity, &VillagerId, &Position, &mut Inventory), With<Villager>>,
) {
    let range = config.map_or_else(|| ItemConfig::default().pickup_range, |c| c.pickup_range);
    let range_sqr = range * range;
    let tick = state.map_or(0, |s| s.current_tick);

    let labels: HashMap<Entity, String> = villagers.iter().map(|(e, id, _, _)| (e, id.0.clone())).collect();

    let mut ready: Vec<Entity> = items
        .iter()
        .filter(|(_, _, item)| item.can_be_picked_up())
        .map(|(e, _, _)| e)
        .collect();
    ready.sort();

    for item_entity in ready {
        let Ok((_, item_position, mut item)) = items.get_mut(item_entity) else {
            continue;
        };

        let mut candidates: Vec<(f64, &String, Entity)> = villagers
            .iter()
            .filter(|(e, _, _, _)| Some(*e) != item.thrower)
            .map(|(e, id, p, _)| (p.distance_sqr(item_position), &id.0, e))
            .filter(|(distance_sqr, _, _)| *distance_sqr <= range_sqr)
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(b.1)));
        let order: Vec<Entity> = candidates.into_iter().map(|(_, _, e)| e).collect();

        for villager in order {
            let Ok((_, _, _, mut inventory)) = villagers.get_mut(villager) else {
                continue;
            };
            let offered = item.stack.count;
            let rest = inventory.add_item(item.stack.clone());
            let taken = offered - rest.as_ref().map_or(0, |r| r.count);
            if taken == 0 {
                continue;
            }

            let actor = labels.get(&villager).cloned().unwrap_or_default();
            let thrower = item.thrower.and_then(|t| labels.get(&t).cloned());
            tracing::debug!(villager = %actor, item = ?item.stack.kind, amount = taken, "picked up item");
            tick_events.record(
                tick,
                actor,
                None,
                EventDetails::ItemPickedUp {
                    item: item.stack.kind,
                    amount: taken,
                    thrower,
                },
            );

            match rest {
                Some(rest) => item.stack = rest,
                None => {
                    commands.entity(item_entity).despawn();
                    break;
                }
            }
        }
    }
}
