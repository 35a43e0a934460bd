//! Trade With Villager
//!
//! Two paired villagers walk up to each other, gossip, and hand over surplus
//! items. The actor works out once per episode which item kinds it is willing
//! to part with, then on every tick in range throws at most one partial stack
//! per exchange rule toward its partner.

use bevy_ecs::prelude::*;
use std::sync::Arc;

use super::util::{gossip, lock_gaze_and_walk_to_each_other, throw_item};
use super::Behavior;
use crate::components::brain::{Brain, MemoryKind, MemoryStatus};
use crate::components::inventory::{Inventory, ItemKind, ItemStack};
use crate::components::profession::{FoodPolicy, RoleTable};
use crate::components::villager::{is_busy, EntityKind, Profession};
use crate::components::world::{distance_sqr_between, Position};
use crate::events::types::{record_event, EventDetails, TransferRule};

/// Fixed tuning of the exchange
pub mod trade_constants {
    /// Items only change hands when partners are at most this far apart (squared)
    pub const INTERACT_DIST_SQR: f64 = 5.0;
    /// Partners stop walking once this close
    pub const CLOSE_ENOUGH_DIST: f64 = 2.0;
    /// A stack at or under half its max size keeps at least this many items
    pub const KEEP_BUFFER: u32 = 24;
}

use trade_constants::*;

const WHEAT_ONLY: [ItemKind; 1] = [ItemKind::Wheat];

/// State of one trade episode, created on start and dropped on stop
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TradeEpisode {
    trade_set: Option<Arc<[ItemKind]>>,
}

impl TradeEpisode {
    /// Item kinds the actor is willing to trade this episode
    pub fn trade_set(&self) -> Option<&[ItemKind]> {
        self.trade_set.as_deref()
    }
}

/// The trade behavior-tree leaf
#[derive(Debug, Clone)]
pub struct TradeWithVillager {
    walk_speed: f64,
    episode: Option<TradeEpisode>,
}

impl TradeWithVillager {
    pub fn new(walk_speed: f64) -> Self {
        Self {
            walk_speed,
            episode: None,
        }
    }

    /// The running episode, if any
    pub fn episode(&self) -> Option<&TradeEpisode> {
        self.episode.as_ref()
    }
}

impl Default for TradeWithVillager {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Behavior for TradeWithVillager {
    fn entry_conditions(&self) -> &'static [(MemoryKind, MemoryStatus)] {
        &[
            (MemoryKind::InteractionTarget, MemoryStatus::ValuePresent),
            (MemoryKind::NearestVisibleLivingEntities, MemoryStatus::ValuePresent),
        ]
    }

    fn check_extra_start_conditions(&self, world: &World, agent: Entity) -> bool {
        can_trade(world, agent)
    }

    fn can_still_use(&self, world: &World, agent: Entity, _time: u64) -> bool {
        can_trade(world, agent)
    }

    fn start(&mut self, world: &mut World, agent: Entity, time: u64) {
        let Some(target) = interaction_target(world, agent) else {
            return;
        };
        lock_gaze_and_walk_to_each_other(world, agent, target, self.walk_speed, CLOSE_ENOUGH_DIST);

        let trade_set = figure_out_trade_set(world, agent, target);
        tracing::debug!(?agent, ?target, trade_set = ?trade_set.as_deref(), "trade episode started");
        record_event(
            world,
            time,
            agent,
            Some(target),
            EventDetails::EpisodeStarted {
                trade_set: trade_set.as_deref().map(<[ItemKind]>::to_vec),
            },
        );
        self.episode = Some(TradeEpisode { trade_set });
    }

    fn tick(&mut self, world: &mut World, agent: Entity, time: u64) {
        let Some(target) = interaction_target(world, agent) else {
            return;
        };
        let Some(distance_sqr) = distance_sqr_between(world, agent, target) else {
            return;
        };
        if distance_sqr > INTERACT_DIST_SQR {
            return;
        }

        lock_gaze_and_walk_to_each_other(world, agent, target, self.walk_speed, CLOSE_ENOUGH_DIST);
        gossip(world, agent, target, time);

        // Target should have at least one empty slot before anything is given
        let target_has_room = world
            .get::<Inventory>(target)
            .map_or(false, |inventory| inventory.first_empty().is_some());
        if !target_has_room {
            return;
        }

        let Some(state) = ExchangeState::read(world, agent, target) else {
            return;
        };

        if state.actor_has_excess_food && (state.actor_is_farmer || state.target_wants_food) {
            // The food kinds are skipped: the first other stack over threshold goes
            throw_half_stack(world, agent, &state.food_kinds, target, TransferRule::Food, time);
        }

        let wheat = actor_count(world, agent, ItemKind::Wheat);
        if state.target_is_farmer && wheat > ItemKind::Wheat.max_stack_size() / 2 {
            // Wheat itself is skipped here as well
            throw_half_stack(world, agent, &WHEAT_ONLY, target, TransferRule::Wheat, time);
        }

        let trade_set = self.episode.as_ref().and_then(|e| e.trade_set.clone());
        if let Some(trades) = trade_set {
            let holds_any = world
                .get::<Inventory>(agent)
                .map_or(false, |inventory| inventory.has_any_of(&trades));
            if holds_any {
                // Kinds in the trade set are skipped too
                throw_half_stack(world, agent, &trades, target, TransferRule::TradeSet, time);
            }
        }
    }

    fn stop(&mut self, world: &mut World, agent: Entity, _time: u64) {
        if let Some(mut brain) = world.get_mut::<Brain>(agent) {
            brain.erase_memory(MemoryKind::InteractionTarget);
        }
        self.episode = None;
    }
}

/// Eligibility gate, used both to start and to continue an episode.
///
/// Holds when the actor is not busy, its interaction target is a visible
/// villager, and that villager is not busy either.
pub fn can_trade(world: &World, agent: Entity) -> bool {
    if is_busy(world, agent) {
        return false;
    }
    let Some(brain) = world.get::<Brain>(agent) else {
        return false;
    };
    let Some(target) = brain.interaction_target() else {
        return false;
    };

    world.get::<EntityKind>(target) == Some(&EntityKind::Villager)
        && brain.nearest_visible().map_or(false, |visible| visible.contains(target))
        && !is_busy(world, target)
}

fn interaction_target(world: &World, agent: Entity) -> Option<Entity> {
    world.get::<Brain>(agent)?.interaction_target()
}

fn actor_count(world: &World, agent: Entity, kind: ItemKind) -> u32 {
    world
        .get::<Inventory>(agent)
        .map_or(0, |inventory| inventory.count_item(kind))
}

/// What the exchange rules need to know about both partners, read before any
/// item moves
struct ExchangeState {
    actor_has_excess_food: bool,
    actor_is_farmer: bool,
    target_wants_food: bool,
    target_is_farmer: bool,
    food_kinds: Vec<ItemKind>,
}

impl ExchangeState {
    fn read(world: &World, agent: Entity, target: Entity) -> Option<Self> {
        let roles = world.get_resource::<RoleTable>()?;
        let food = world.get_resource::<FoodPolicy>()?;
        let default_profession = Profession::default();
        let actor_profession = world.get::<Profession>(agent).unwrap_or(&default_profession);
        let target_profession = world.get::<Profession>(target).unwrap_or(&default_profession);
        let actor_inventory = world.get::<Inventory>(agent)?;
        let target_inventory = world.get::<Inventory>(target)?;

        Some(Self {
            actor_has_excess_food: food.has_excess_food(actor_inventory),
            actor_is_farmer: roles.is_farmer(actor_profession),
            target_wants_food: food.wants_more_food(target_inventory, roles.profile(target_profession)),
            target_is_farmer: roles.is_farmer(target_profession),
            food_kinds: food.food_kinds().to_vec(),
        })
    }
}

/// Trade set for an actor/target pair, from the role table in the world
pub fn figure_out_trade_set(world: &World, actor: Entity, target: Entity) -> Option<Arc<[ItemKind]>> {
    let roles = world.get_resource::<RoleTable>()?;
    let default_profession = Profession::default();
    let actor_profession = world.get::<Profession>(actor).unwrap_or(&default_profession);
    let target_profession = world.get::<Profession>(target).unwrap_or(&default_profession);

    resolve_trade_set(roles.wanted_items(actor_profession), roles.wanted_items(target_profession))
}

/// Item kinds the actor is willing to give, given both partners' wanted lists.
///
/// - target wants nothing: `None`
/// - actor wants nothing: everything the target wants
/// - both share the very same list (same role): `None`
/// - otherwise: what the target wants minus what the actor wants, in the
///   target's order
pub fn resolve_trade_set(
    actor_wants: Option<&Arc<[ItemKind]>>,
    target_wants: Option<&Arc<[ItemKind]>>,
) -> Option<Arc<[ItemKind]>> {
    let target_items = target_wants.filter(|items| !items.is_empty())?;
    let Some(villager_items) = actor_wants.filter(|items| !items.is_empty()) else {
        return Some(Arc::clone(target_items));
    };
    if Arc::ptr_eq(target_items, villager_items) {
        return None;
    }

    let willing: Vec<ItemKind> = target_items
        .iter()
        .filter(|item| !villager_items.contains(item))
        .copied()
        .collect();
    Some(Arc::from(willing))
}

/// How many items to take off a stack, if it passes either threshold.
///
/// More than half full: half of it (rounded down). Otherwise anything above
/// `KEEP_BUFFER`. A lone unstackable item passes the first threshold with an
/// amount of zero.
pub fn half_stack_amount(stack: &ItemStack) -> Option<u32> {
    if stack.count > stack.max_stack_size / 2 {
        Some(stack.count / 2)
    } else if stack.count > KEEP_BUFFER {
        Some(stack.count - KEEP_BUFFER)
    } else {
        None
    }
}

/// Throw part of the first qualifying stack toward `target`.
///
/// Slots holding a kind in `skip` are passed over. The first slot that passes
/// a threshold ends the scan; if its amount is zero nothing moves. At most one
/// slot changes. Returns the thrown stack.
pub fn throw_half_stack(
    world: &mut World,
    villager: Entity,
    skip: &[ItemKind],
    target: Entity,
    rule: TransferRule,
    time: u64,
) -> Option<ItemStack> {
    // Both ends need a position, otherwise the items would vanish
    world.get::<Position>(villager)?;
    let target_position = world.get::<Position>(target)?.0;

    let (slot, thrown) = {
        let mut inventory = world.get_mut::<Inventory>(villager)?;
        let (slot, thrown) = inventory
            .stacks()
            .filter(|(_, stack)| !skip.contains(&stack.kind))
            .find_map(|(slot, stack)| {
                half_stack_amount(stack).map(|amount| {
                    (
                        slot,
                        ItemStack {
                            kind: stack.kind,
                            count: amount,
                            max_stack_size: stack.max_stack_size,
                        },
                    )
                })
            })?;
        if thrown.is_empty() {
            return None;
        }
        inventory.shrink(slot, thrown.count);
        (slot, thrown)
    };

    tracing::debug!(
        ?villager,
        ?target,
        ?rule,
        item = ?thrown.kind,
        amount = thrown.count,
        slot,
        "throwing half stack"
    );
    record_event(
        world,
        time,
        villager,
        Some(target),
        EventDetails::ItemThrown {
            rule,
            item: thrown.kind,
            amount: thrown.count,
            slot,
        },
    );
    throw_item(world, villager, thrown.clone(), target_position);
    Some(thrown)
}
