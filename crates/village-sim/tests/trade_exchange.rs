//! Trade exchange tests
//!
//! Drives a single trade slot between two hand-placed villagers and checks
//! which exchange rules fire.

use bevy_ecs::prelude::*;

use village_sim::behavior::trade::{can_trade, TradeWithVillager};
use village_sim::behavior::BehaviorSlot;
use village_sim::components::{
    Activity, Brain, EntityKind, EyeHeight, GossipState, Inventory, ItemEntity, ItemKind, ItemStack,
    NearestVisibleLivingEntities, Position, Profession, Villager, VillagerId,
};
use village_sim::config::RoleConfig;
use village_sim::events::types::{EventDetails, EventType, TickEvents, TransferRule};
use village_sim::{SimConfig, Simulation};

fn village() -> World {
    let mut config = SimConfig::default();
    config.roles.insert("baker".into(), RoleConfig::default());
    Simulation::empty_world(&config, 42)
}

fn villager(world: &mut World, id: &str, profession: &str, position: Position, stacks: Vec<ItemStack>) -> Entity {
    world
        .spawn((
            Villager,
            VillagerId(id.into()),
            EntityKind::Villager,
            Profession::new(profession),
            Inventory::with_stacks(8, stacks),
            position,
            EyeHeight::default(),
            Brain::new(),
            GossipState::new(),
        ))
        .id()
}

fn pair(world: &mut World, actor: Entity, target: Entity) {
    let mut brain = world.get_mut::<Brain>(actor).unwrap();
    brain.set_interaction_target(target);
    brain.set_nearest_visible(NearestVisibleLivingEntities::new(vec![target]));
}

fn thrown(world: &World) -> Vec<(TransferRule, ItemKind, u32)> {
    world
        .resource::<TickEvents>()
        .events
        .iter()
        .filter_map(|e| match &e.details {
            EventDetails::ItemThrown { rule, item, amount, .. } => Some((*rule, *item, *amount)),
            _ => None,
        })
        .collect()
}

fn count_events(world: &World, event_type: EventType) -> usize {
    world
        .resource::<TickEvents>()
        .events
        .iter()
        .filter(|e| e.event_type == event_type)
        .count()
}

#[test]
fn test_farmer_with_surplus_gives_to_baker() {
    let mut world = village();
    let actor = villager(
        &mut world,
        "villager_001",
        "farmer",
        Position::new(0.0, 0.0, 0.0),
        vec![ItemStack::new(ItemKind::Bread, 10), ItemStack::new(ItemKind::Wheat, 40)],
    );
    let target = villager(
        &mut world,
        "villager_002",
        "baker",
        Position::new(1.0, 0.0, 0.0),
        vec![ItemStack::new(ItemKind::Bread, 5)],
    );
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    assert!(slot.is_running());
    // Baker wants nothing, so there is no trade set
    assert_eq!(slot.behavior().episode().unwrap().trade_set(), None);

    // Only the food rule fires; the wheat rule is about the target being a farmer
    assert_eq!(thrown(&world), vec![(TransferRule::Food, ItemKind::Wheat, 20)]);
    let inventory = world.get::<Inventory>(actor).unwrap();
    assert_eq!(inventory.count_item(ItemKind::Wheat), 20);
    assert_eq!(inventory.count_item(ItemKind::Bread), 10);

    let mut items = world.query::<&ItemEntity>();
    let loose: Vec<&ItemEntity> = items.iter(&world).collect();
    assert_eq!(loose.len(), 1);
    assert_eq!(loose[0].stack, ItemStack::new(ItemKind::Wheat, 20));
    assert_eq!(loose[0].thrower, Some(actor));
}

#[test]
fn test_food_surplus_not_given_to_fed_non_farmer() {
    let mut world = village();
    let actor = villager(
        &mut world,
        "villager_001",
        "librarian",
        Position::new(0.0, 0.0, 0.0),
        vec![ItemStack::new(ItemKind::Bread, 10), ItemStack::new(ItemKind::Emerald, 64)],
    );
    // 5 bread is 20 food points, above the baker's need threshold of 12
    let target = villager(
        &mut world,
        "villager_002",
        "baker",
        Position::new(1.0, 0.0, 0.0),
        vec![ItemStack::new(ItemKind::Bread, 5)],
    );
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    assert!(slot.is_running());
    assert_eq!(count_events(&world, EventType::Gossip), 1);
    assert!(thrown(&world).is_empty());
    assert_eq!(
        world.get::<Inventory>(actor).unwrap().count_item(ItemKind::Emerald),
        64
    );

    // Once the baker is down to 2 bread it needs food and the rule fires
    world.get_mut::<Inventory>(target).unwrap().shrink(0, 3);
    slot.update(&mut world, actor, 1);

    assert_eq!(thrown(&world), vec![(TransferRule::Food, ItemKind::Emerald, 32)]);
}

#[test]
fn test_wheat_rule_skips_wheat_stacks() {
    let mut world = village();
    let actor = villager(
        &mut world,
        "villager_001",
        "librarian",
        Position::new(0.0, 0.0, 0.0),
        vec![ItemStack::new(ItemKind::Wheat, 40), ItemStack::new(ItemKind::Coal, 30)],
    );
    let target = villager(&mut world, "villager_002", "farmer", Position::new(2.0, 0.0, 0.0), vec![]);
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    // Wheat is the skipped kind, so the coal stack gives up its excess over 24
    assert_eq!(thrown(&world), vec![(TransferRule::Wheat, ItemKind::Coal, 6)]);
    assert_eq!(
        world.get::<Inventory>(actor).unwrap().count_item(ItemKind::Wheat),
        40
    );
}

#[test]
fn test_trade_set_rule_and_rule_order() {
    let mut world = village();
    let actor = villager(
        &mut world,
        "villager_001",
        "librarian",
        Position::new(0.0, 0.0, 0.0),
        vec![
            ItemStack::new(ItemKind::Bread, 10),
            ItemStack::new(ItemKind::Emerald, 64),
            ItemStack::new(ItemKind::BoneMeal, 40),
        ],
    );
    let target = villager(&mut world, "villager_002", "farmer", Position::new(1.0, 0.0, 1.0), vec![]);
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    let trade_set = slot.behavior().episode().unwrap().trade_set().unwrap().to_vec();
    assert_eq!(
        trade_set,
        vec![
            ItemKind::Wheat,
            ItemKind::WheatSeeds,
            ItemKind::BeetrootSeeds,
            ItemKind::BoneMeal
        ]
    );

    // Food rule halves the emeralds, the trade-set rule then sees 32 and takes 8
    assert_eq!(
        thrown(&world),
        vec![
            (TransferRule::Food, ItemKind::Emerald, 32),
            (TransferRule::TradeSet, ItemKind::Emerald, 8),
        ]
    );
    let inventory = world.get::<Inventory>(actor).unwrap();
    assert_eq!(inventory.count_item(ItemKind::Emerald), 24);
    assert_eq!(inventory.count_item(ItemKind::BoneMeal), 40);
}

#[test]
fn test_same_role_has_no_trade_set() {
    let mut world = village();
    let actor = villager(&mut world, "villager_001", "farmer", Position::new(0.0, 0.0, 0.0), vec![]);
    let target = villager(&mut world, "villager_002", "farmer", Position::new(1.0, 0.0, 0.0), vec![]);
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    assert_eq!(slot.behavior().episode().unwrap().trade_set(), None);
}

#[test]
fn test_out_of_range_does_nothing_but_keeps_running() {
    let mut world = village();
    let stacks = vec![ItemStack::new(ItemKind::Bread, 10), ItemStack::new(ItemKind::Wheat, 40)];
    let actor = villager(&mut world, "villager_001", "farmer", Position::new(0.0, 0.0, 0.0), stacks);
    // Squared distance 6
    let target = villager(&mut world, "villager_002", "baker", Position::new(2.0, 1.0, 1.0), vec![]);
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    assert!(slot.is_running());
    assert!(thrown(&world).is_empty());
    assert_eq!(count_events(&world, EventType::Gossip), 0);
    assert_eq!(world.get::<GossipState>(actor).unwrap().exchanges, 0);

    // Squared distance 4: now within reach
    world.get_mut::<Position>(target).unwrap().0.y = 0.0;
    world.get_mut::<Position>(target).unwrap().0.z = 0.0;
    assert_eq!(slot.update(&mut world, actor, 1), None);

    assert_eq!(count_events(&world, EventType::Gossip), 1);
    assert_eq!(thrown(&world), vec![(TransferRule::Food, ItemKind::Wheat, 20)]);
}

#[test]
fn test_full_target_inventory_blocks_all_rules() {
    let mut world = village();
    let actor = villager(
        &mut world,
        "villager_001",
        "librarian",
        Position::new(0.0, 0.0, 0.0),
        vec![
            ItemStack::new(ItemKind::Bread, 10),
            ItemStack::new(ItemKind::Wheat, 64),
            ItemStack::new(ItemKind::Emerald, 64),
        ],
    );
    let target = world
        .spawn((
            Villager,
            VillagerId("villager_002".into()),
            EntityKind::Villager,
            Profession::new("farmer"),
            Inventory::with_stacks(1, [ItemStack::new(ItemKind::Carrot, 1)]),
            Position::new(1.0, 0.0, 0.0),
            Brain::new(),
            GossipState::new(),
        ))
        .id();
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);

    // Gossip still happens before the inventory check
    assert_eq!(count_events(&world, EventType::Gossip), 1);
    assert!(thrown(&world).is_empty());
    assert_eq!(world.get::<Inventory>(actor).unwrap().total_count(), 138);
    assert_eq!(world.query::<&ItemEntity>().iter(&world).count(), 0);
}

#[test]
fn test_gate_is_idempotent() {
    let mut world = village();
    let actor = villager(&mut world, "villager_001", "farmer", Position::new(0.0, 0.0, 0.0), vec![]);
    let target = villager(&mut world, "villager_002", "farmer", Position::new(1.0, 0.0, 0.0), vec![]);

    assert_eq!(can_trade(&world, actor), can_trade(&world, actor));
    assert!(!can_trade(&world, actor));

    pair(&mut world, actor, target);
    assert!(can_trade(&world, actor));
    assert!(can_trade(&world, actor));

    // Target not in the visible snapshot
    world
        .get_mut::<Brain>(actor)
        .unwrap()
        .set_nearest_visible(NearestVisibleLivingEntities::new(vec![]));
    assert!(!can_trade(&world, actor));
}

#[test]
fn test_busy_partners_cannot_trade() {
    let mut world = village();
    let actor = villager(&mut world, "villager_001", "farmer", Position::new(0.0, 0.0, 0.0), vec![]);
    let target = villager(&mut world, "villager_002", "farmer", Position::new(1.0, 0.0, 0.0), vec![]);
    pair(&mut world, actor, target);

    world.entity_mut(target).insert(Activity::Fishing);
    assert!(!can_trade(&world, actor));

    world.entity_mut(target).insert(Activity::Idle);
    world.entity_mut(actor).insert(Activity::Fighting);
    assert!(!can_trade(&world, actor));

    world.entity_mut(actor).insert(Activity::Idle);
    assert!(can_trade(&world, actor));
}

#[test]
fn test_stop_clears_interaction_target() {
    let mut world = village();
    let actor = villager(&mut world, "villager_001", "farmer", Position::new(0.0, 0.0, 0.0), vec![]);
    let target = villager(&mut world, "villager_002", "farmer", Position::new(1.0, 0.0, 0.0), vec![]);
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    assert!(slot.try_start(&mut world, actor, 0));
    slot.do_stop(&mut world, actor, 3);

    assert!(world.get::<Brain>(actor).unwrap().interaction_target().is_none());
    assert!(slot.behavior().episode().is_none());
    assert!(!can_trade(&world, actor));
    assert!(!slot.try_start(&mut world, actor, 4));
}

#[test]
fn test_despawned_target_stops_episode() {
    let mut world = village();
    let actor = villager(&mut world, "villager_001", "farmer", Position::new(0.0, 0.0, 0.0), vec![]);
    let target = villager(&mut world, "villager_002", "farmer", Position::new(1.0, 0.0, 0.0), vec![]);
    pair(&mut world, actor, target);

    let mut slot = BehaviorSlot::new(TradeWithVillager::new(0.5));
    slot.update(&mut world, actor, 0);
    world.despawn(target);

    assert!(slot.update(&mut world, actor, 1).is_some());
    assert!(!slot.is_running());
}
