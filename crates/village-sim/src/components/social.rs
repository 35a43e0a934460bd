//! Social Components
//!
//! Gossip bookkeeping. What villagers actually say to each other is not modelled,
//! only when they last talked and how often.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Component: when this villager last gossiped and how many exchanges it had
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GossipState {
    pub last_gossip_time: Option<u64>,
    pub exchanges: u32,
}

impl GossipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `time` lies outside the cooldown window of the last exchange.
    /// A time earlier than the last exchange (clock reset) also counts as outside.
    pub fn can_gossip(&self, time: u64, cooldown: u64) -> bool {
        match self.last_gossip_time {
            None => true,
            Some(last) => time < last || time >= last.saturating_add(cooldown),
        }
    }

    pub fn record(&mut self, time: u64) {
        self.last_gossip_time = Some(time);
        self.exchanges += 1;
    }
}
