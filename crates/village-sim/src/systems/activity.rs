//! Activity System
//!
//! Simulated agents drift in and out of unrelated activities, which makes
//! them unavailable for trading while busy.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::villager::{Activity, VillagerId};
use crate::config::SimulationConfig;
use crate::SimRng;

/// Activities a simulated agent can be busy with
const BUSY_ACTIVITIES: [Activity; 5] = [
    Activity::Fishing,
    Activity::TradingWithPlayer,
    Activity::Following,
    Activity::Sleeping,
    Activity::Fighting,
];

/// System to toggle simulated agents between idle and a random busy activity
pub fn update_activities(
    config: Option<Res<SimulationConfig>>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&VillagerId, &mut Activity)>,
) {
    let chance = config.map_or_else(
        || SimulationConfig::default().activity_change_chance,
        |c| c.activity_change_chance,
    );

    let mut agents: Vec<_> = query.iter_mut().collect();
    agents.sort_by(|a, b| a.0.cmp(b.0));

    for (id, mut activity) in agents {
        if rng.0.gen::<f64>() >= chance {
            continue;
        }
        let next = if activity.is_doing_nothing() {
            BUSY_ACTIVITIES[rng.0.gen_range(0..BUSY_ACTIVITIES.len())]
        } else {
            Activity::Idle
        };
        tracing::trace!(villager = %id.0, from = ?*activity, to = ?next, "activity changed");
        *activity = next;
    }
}
