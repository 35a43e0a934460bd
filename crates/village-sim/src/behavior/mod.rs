//! Behavior Tree Leaves
//!
//! The lifecycle every behavior-tree leaf implements, and the per-agent slot
//! that drives it. The scheduler deciding *which* leaf runs lives elsewhere;
//! a slot only knows how to start, tick, and stop the leaf it owns.

pub mod trade;
pub mod util;

use bevy_ecs::prelude::*;

use crate::components::brain::{Brain, MemoryKind, MemoryStatus};
use crate::events::types::StopReason;

pub use trade::{TradeEpisode, TradeWithVillager};

/// A behavior-tree leaf.
///
/// All entry points receive the whole world so a leaf can read its partner's
/// components and spawn entities; they run on the simulation thread inside
/// the owning agent's update.
pub trait Behavior: Send + Sync + 'static {
    /// Memory slots that must be in the given state before the leaf may start
    fn entry_conditions(&self) -> &'static [(MemoryKind, MemoryStatus)];

    fn check_extra_start_conditions(&self, _world: &World, _agent: Entity) -> bool {
        true
    }

    fn can_still_use(&self, _world: &World, _agent: Entity, _time: u64) -> bool {
        false
    }

    fn start(&mut self, _world: &mut World, _agent: Entity, _time: u64) {}

    fn tick(&mut self, _world: &mut World, _agent: Entity, _time: u64) {}

    fn stop(&mut self, _world: &mut World, _agent: Entity, _time: u64) {}
}

/// Whether a leaf is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorStatus {
    #[default]
    Stopped,
    Running,
}

/// Component: one behavior instance owned by an agent, plus its lifecycle state
#[derive(Component, Debug, Clone)]
pub struct BehaviorSlot<B: Behavior> {
    behavior: B,
    status: BehaviorStatus,
    started_at: u64,
    end_timestamp: Option<u64>,
    max_duration: Option<u64>,
}

impl<B: Behavior> BehaviorSlot<B> {
    pub fn new(behavior: B) -> Self {
        Self {
            behavior,
            status: BehaviorStatus::Stopped,
            started_at: 0,
            end_timestamp: None,
            max_duration: None,
        }
    }

    /// Stop the leaf once it has run for longer than `ticks`
    pub fn with_max_duration(mut self, ticks: Option<u64>) -> Self {
        self.max_duration = ticks;
        self
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn status(&self) -> BehaviorStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == BehaviorStatus::Running
    }

    /// Tick at which the current (or last) run started
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    fn has_required_memories(&self, world: &World, agent: Entity) -> bool {
        let Some(brain) = world.get::<Brain>(agent) else {
            return false;
        };
        self.behavior
            .entry_conditions()
            .iter()
            .all(|(kind, status)| brain.check_memory(*kind, *status))
    }

    fn timed_out(&self, time: u64) -> bool {
        self.end_timestamp.map_or(false, |end| time > end)
    }

    /// Start the leaf if it is stopped and its conditions hold
    pub fn try_start(&mut self, world: &mut World, agent: Entity, time: u64) -> bool {
        if self.is_running() {
            return false;
        }
        if !self.has_required_memories(world, agent)
            || !self.behavior.check_extra_start_conditions(world, agent)
        {
            return false;
        }

        self.status = BehaviorStatus::Running;
        self.started_at = time;
        self.end_timestamp = self.max_duration.map(|d| time.saturating_add(d));
        self.behavior.start(world, agent, time);
        true
    }

    /// Tick a running leaf, or stop it when it timed out or may no longer run.
    /// Returns why it stopped, if it did.
    pub fn tick_or_stop(&mut self, world: &mut World, agent: Entity, time: u64) -> Option<StopReason> {
        if !self.is_running() {
            return None;
        }
        if self.timed_out(time) {
            self.do_stop(world, agent, time);
            return Some(StopReason::TimedOut);
        }
        if !self.behavior.can_still_use(world, agent, time) {
            self.do_stop(world, agent, time);
            return Some(StopReason::ConditionsFailed);
        }
        self.behavior.tick(world, agent, time);
        None
    }

    pub fn do_stop(&mut self, world: &mut World, agent: Entity, time: u64) {
        self.status = BehaviorStatus::Stopped;
        self.behavior.stop(world, agent, time);
    }

    /// One scheduler update: start if stopped, then tick or stop if running
    pub fn update(&mut self, world: &mut World, agent: Entity, time: u64) -> Option<StopReason> {
        if !self.is_running() {
            self.try_start(world, agent, time);
        }
        self.tick_or_stop(world, agent, time)
    }
}
