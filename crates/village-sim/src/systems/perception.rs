//! Perception System
//!
//! Rebuilds each villager's snapshot of nearby living entities.

use bevy_ecs::prelude::*;

use crate::components::brain::{Brain, NearestVisibleLivingEntities};
use crate::components::villager::{EntityKind, Villager};
use crate::components::world::Position;
use crate::config::PerceptionConfig;

/// System to refresh every villager's nearest-visible snapshot.
/// Living entities within the sensor range are listed closest first, the
/// villager itself excluded.
pub fn update_nearest_visible(
    config: Option<Res<PerceptionConfig>>,
    living: Query<(Entity, &Position), With<EntityKind>>,
    mut villagers: Query<(Entity, &Position, &mut Brain), With<Villager>>,
) {
    let range = config.map_or_else(|| PerceptionConfig::default().range, |c| c.range);
    let range_sqr = range * range;
    let everyone: Vec<(Entity, Position)> = living.iter().map(|(e, p)| (e, *p)).collect();

    for (entity, position, mut brain) in villagers.iter_mut() {
        let mut seen: Vec<(f64, Entity)> = everyone
            .iter()
            .filter(|(other, _)| *other != entity)
            .map(|(other, other_position)| (position.distance_sqr(other_position), *other))
            .filter(|(distance_sqr, _)| *distance_sqr <= range_sqr)
            .collect();
        seen.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        brain.set_nearest_visible(NearestVisibleLivingEntities::new(
            seen.into_iter().map(|(_, e)| e).collect(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perception_sorted_and_in_range() {
        let mut world = World::new();
        world.insert_resource(PerceptionConfig { range: 5.0 });

        let me = world
            .spawn((Villager, EntityKind::Villager, Position::new(0.0, 0.0, 0.0), Brain::new()))
            .id();
        let far = world
            .spawn((EntityKind::Villager, Position::new(4.0, 0.0, 0.0)))
            .id();
        let near = world.spawn((EntityKind::Cat, Position::new(1.0, 0.0, 0.0))).id();
        let out_of_range = world
            .spawn((EntityKind::IronGolem, Position::new(10.0, 0.0, 0.0)))
            .id();
        // Items have a position but are not living
        world.spawn(Position::new(0.5, 0.0, 0.0));

        let mut schedule = Schedule::default();
        schedule.add_systems(update_nearest_visible);
        schedule.run(&mut world);

        let brain = world.get::<Brain>(me).unwrap();
        let visible: Vec<Entity> = brain.nearest_visible().unwrap().iter().collect();
        assert_eq!(visible, vec![near, far]);
        assert!(!visible.contains(&out_of_range));
        assert!(!visible.contains(&me));
    }
}
