//! Movement System
//!
//! Straight-line walking toward remembered walk targets.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::brain::{Brain, MemoryKind};
use crate::components::world::{Position, Vec3};
use crate::config::MovementConfig;

/// System to step every walker toward its walk target.
/// The walk target is forgotten once the walker is within `close_enough`.
pub fn move_toward_walk_targets(
    config: Option<Res<MovementConfig>>,
    mut queries: ParamSet<(Query<(Entity, &Position)>, Query<(&mut Position, &mut Brain)>)>,
) {
    let scale = config.map_or_else(|| MovementConfig::default().movement_scale, |c| c.movement_scale);

    // Goals are read from positions as of the start of the step
    let positions: HashMap<Entity, Vec3> = queries.p0().iter().map(|(e, p)| (e, p.0)).collect();

    let mut walkers = queries.p1();
    for (mut position, mut brain) in walkers.iter_mut() {
        let Some(walk) = brain.walk_target() else {
            continue;
        };
        let Some(&goal) = positions.get(&walk.entity) else {
            brain.erase_memory(MemoryKind::WalkTarget);
            continue;
        };

        let offset = goal - position.0;
        let distance = offset.length();
        if distance <= walk.close_enough {
            brain.erase_memory(MemoryKind::WalkTarget);
            continue;
        }

        let step = (walk.speed * scale).min(distance - walk.close_enough);
        position.0 = position.0 + offset.normalize() * step;
        if distance - step <= walk.close_enough {
            brain.erase_memory(MemoryKind::WalkTarget);
        }
    }
}
