//! Behavior Utilities
//!
//! Shared effects behaviors trigger on other entities: facing and walking to a
//! partner, gossiping, and throwing items.

use bevy_ecs::prelude::*;

use crate::components::brain::{Brain, WalkTarget};
use crate::components::inventory::{ItemEntity, ItemStack};
use crate::components::social::GossipState;
use crate::components::world::{EyeHeight, Position, Vec3, Velocity};
use crate::config::{GossipConfig, ItemConfig};
use crate::events::types::{record_event, EventDetails};

/// Thrown items leave from this far below the thrower's eyes
pub const THROW_Y_OFFSET: f64 = 0.3;

/// Per-axis scale applied to the unit direction of a throw
pub const THROW_VELOCITY_SCALE: Vec3 = Vec3 { x: 0.3, y: 1.0, z: 0.3 };

/// Make two entities look at each other
pub fn look_at_each_other(world: &mut World, a: Entity, b: Entity) {
    for (who, other) in [(a, b), (b, a)] {
        if let Some(mut brain) = world.get_mut::<Brain>(who) {
            brain.set_look_target(other);
        }
    }
}

/// Make two entities walk toward each other until they are `close_enough` apart
pub fn set_walk_target_of_each_other(world: &mut World, a: Entity, b: Entity, speed: f64, close_enough: f64) {
    for (who, other) in [(a, b), (b, a)] {
        if let Some(mut brain) = world.get_mut::<Brain>(who) {
            brain.set_walk_target(WalkTarget {
                entity: other,
                speed,
                close_enough,
            });
        }
    }
}

/// Lock both entities' gaze on each other and have them converge
pub fn lock_gaze_and_walk_to_each_other(
    world: &mut World,
    a: Entity,
    b: Entity,
    speed: f64,
    close_enough: f64,
) {
    look_at_each_other(world, a, b);
    set_walk_target_of_each_other(world, a, b, speed, close_enough);
}

/// Exchange gossip if neither villager talked within the cooldown window.
/// Returns whether an exchange happened.
pub fn gossip(world: &mut World, villager: Entity, target: Entity, time: u64) -> bool {
    let cooldown = world
        .get_resource::<GossipConfig>()
        .map_or_else(|| GossipConfig::default().cooldown_ticks, |c| c.cooldown_ticks);

    let ready = |entity: Entity| {
        world
            .get::<GossipState>(entity)
            .map_or(false, |state| state.can_gossip(time, cooldown))
    };
    if !ready(villager) || !ready(target) {
        return false;
    }

    let mut exchanges = [0u32; 2];
    for (i, entity) in [villager, target].into_iter().enumerate() {
        if let Some(mut state) = world.get_mut::<GossipState>(entity) {
            state.record(time);
            exchanges[i] = state.exchanges;
        }
    }

    tracing::trace!(?villager, ?target, time, "gossip exchanged");
    record_event(
        world,
        time,
        villager,
        Some(target),
        EventDetails::Gossip {
            actor_exchanges: exchanges[0],
            target_exchanges: exchanges[1],
        },
    );
    true
}

/// Spawn a thrown item stack at the thrower's eye level, moving toward `target`.
/// Returns `None` (and spawns nothing) when the thrower has no position.
pub fn throw_item(world: &mut World, thrower: Entity, stack: ItemStack, target: Vec3) -> Option<Entity> {
    let origin = world.get::<Position>(thrower)?.0;
    let eye_height = world.get::<EyeHeight>(thrower).copied().unwrap_or_default().0;
    let pickup_delay = world
        .get_resource::<ItemConfig>()
        .map_or_else(|| ItemConfig::default().pickup_delay_ticks, |c| c.pickup_delay_ticks);

    let spawn_at = Vec3::new(origin.x, origin.y + eye_height - THROW_Y_OFFSET, origin.z);
    let velocity = (target - origin).normalize().scale(THROW_VELOCITY_SCALE);

    let item = world
        .spawn((
            ItemEntity {
                stack,
                thrower: Some(thrower),
                pickup_delay,
            },
            Position(spawn_at),
            Velocity(velocity),
        ))
        .id();
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::inventory::ItemKind;
    use crate::events::types::{EventType, TickEvents};

    #[test]
    fn test_lock_gaze_sets_both_brains() {
        let mut world = World::new();
        let a = world.spawn(Brain::new()).id();
        let b = world.spawn(Brain::new()).id();

        lock_gaze_and_walk_to_each_other(&mut world, a, b, 0.5, 2.0);

        let brain_a = world.get::<Brain>(a).unwrap();
        assert_eq!(brain_a.look_target(), Some(b));
        assert_eq!(
            brain_a.walk_target(),
            Some(WalkTarget { entity: b, speed: 0.5, close_enough: 2.0 })
        );
        let brain_b = world.get::<Brain>(b).unwrap();
        assert_eq!(brain_b.look_target(), Some(a));
        assert_eq!(brain_b.walk_target().map(|w| w.entity), Some(a));
    }

    #[test]
    fn test_gossip_respects_cooldown() {
        let mut world = World::new();
        world.insert_resource(TickEvents::new());
        world.insert_resource(GossipConfig { cooldown_ticks: 1200 });
        let a = world.spawn(GossipState::new()).id();
        let b = world.spawn(GossipState::new()).id();

        assert!(gossip(&mut world, a, b, 100));
        assert!(!gossip(&mut world, a, b, 200));
        assert!(!gossip(&mut world, b, a, 1299));
        assert!(gossip(&mut world, b, a, 1300));

        assert_eq!(world.get::<GossipState>(a).unwrap().exchanges, 2);
        let events = world.resource::<TickEvents>();
        assert_eq!(events.len(), 2);
        assert!(events.events.iter().all(|e| e.event_type == EventType::Gossip));
    }

    #[test]
    fn test_gossip_needs_both_ready() {
        let mut world = World::new();
        let a = world.spawn(GossipState::new()).id();
        let mut busy = GossipState::new();
        busy.record(50);
        let b = world.spawn(busy).id();
        let mute = world.spawn_empty().id();

        assert!(!gossip(&mut world, a, b, 100));
        assert!(!gossip(&mut world, a, mute, 100));
        assert_eq!(world.get::<GossipState>(a).unwrap().exchanges, 0);
    }

    #[test]
    fn test_throw_item_direction_and_height() {
        let mut world = World::new();
        let thrower = world.spawn((Position::new(0.0, 0.0, 0.0), EyeHeight(1.62))).id();

        let item = throw_item(
            &mut world,
            thrower,
            ItemStack::new(ItemKind::Bread, 3),
            Vec3::new(4.0, 0.0, 0.0),
        )
        .unwrap();

        let position = world.get::<Position>(item).unwrap().0;
        assert!((position.y - 1.32).abs() < 1e-9);
        let velocity = world.get::<Velocity>(item).unwrap().0;
        assert!((velocity.x - 0.3).abs() < 1e-9);
        assert_eq!(velocity.z, 0.0);
        let entity = world.get::<ItemEntity>(item).unwrap();
        assert_eq!(entity.stack.count, 3);
        assert_eq!(entity.thrower, Some(thrower));
        assert_eq!(entity.pickup_delay, 10);
    }

    #[test]
    fn test_throw_without_position_spawns_nothing() {
        let mut world = World::new();
        let thrower = world.spawn_empty().id();
        let before = world.entities().len();

        assert!(throw_item(&mut world, thrower, ItemStack::new(ItemKind::Coal, 1), Vec3::ZERO).is_none());
        assert_eq!(world.entities().len(), before);
    }
}
