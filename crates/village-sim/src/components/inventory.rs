//! Inventory Components
//!
//! Item kinds, item stacks, and the fixed-capacity villager inventory.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of item an inventory slot can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Wheat,
    WheatSeeds,
    BeetrootSeeds,
    BoneMeal,
    Bread,
    Potato,
    Carrot,
    Beetroot,
    Emerald,
    Paper,
    Book,
    Coal,
    IronIngot,
    Stick,
    String,
    Leather,
    Cod,
    Salmon,
    Wool,
    Flint,
    Clay,
    Egg,
    EnderPearl,
    Bucket,
    Shears,
}

impl ItemKind {
    /// All known item kinds, in declaration order
    pub const ALL: [ItemKind; 25] = [
        ItemKind::Wheat,
        ItemKind::WheatSeeds,
        ItemKind::BeetrootSeeds,
        ItemKind::BoneMeal,
        ItemKind::Bread,
        ItemKind::Potato,
        ItemKind::Carrot,
        ItemKind::Beetroot,
        ItemKind::Emerald,
        ItemKind::Paper,
        ItemKind::Book,
        ItemKind::Coal,
        ItemKind::IronIngot,
        ItemKind::Stick,
        ItemKind::String,
        ItemKind::Leather,
        ItemKind::Cod,
        ItemKind::Salmon,
        ItemKind::Wool,
        ItemKind::Flint,
        ItemKind::Clay,
        ItemKind::Egg,
        ItemKind::EnderPearl,
        ItemKind::Bucket,
        ItemKind::Shears,
    ];

    /// Default maximum number of items a single stack of this kind holds
    pub fn max_stack_size(&self) -> u32 {
        match self {
            ItemKind::Egg | ItemKind::EnderPearl | ItemKind::Bucket => 16,
            ItemKind::Shears => 1,
            _ => 64,
        }
    }
}

/// A stack of items of a single kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub count: u32,
    pub max_stack_size: u32,
}

impl ItemStack {
    /// Create a stack using the kind's default max stack size
    pub fn new(kind: ItemKind, count: u32) -> Self {
        Self {
            kind,
            count,
            max_stack_size: kind.max_stack_size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Remove up to `amount` items, saturating at zero
    pub fn shrink(&mut self, amount: u32) {
        self.count = self.count.saturating_sub(amount);
    }

    /// Room left before this stack is full
    pub fn space_left(&self) -> u32 {
        self.max_stack_size.saturating_sub(self.count)
    }
}

/// Ordered, fixed-capacity container of item stacks
#[derive(Component, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Create an empty inventory with `size` slots
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Build an inventory from stacks, filling the remaining slots with nothing
    pub fn with_stacks(size: usize, stacks: impl IntoIterator<Item = ItemStack>) -> Self {
        let mut inventory = Self::new(size);
        for (slot, stack) in inventory.slots.iter_mut().zip(stacks) {
            *slot = Some(stack);
        }
        inventory
    }

    /// Number of slots
    pub fn container_size(&self) -> usize {
        self.slots.len()
    }

    /// Stack at `slot`, or `None` if the slot is empty or out of range
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots
            .get(slot)
            .and_then(|s| s.as_ref())
            .filter(|stack| !stack.is_empty())
    }

    /// Iterate over non-empty stacks with their slot index
    pub fn stacks(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().filter(|stack| !stack.is_empty()).map(|stack| (i, stack)))
    }

    /// Total count of a given item kind across all slots
    pub fn count_item(&self, kind: ItemKind) -> u32 {
        self.stacks()
            .filter(|(_, stack)| stack.kind == kind)
            .map(|(_, stack)| stack.count)
            .sum()
    }

    /// Total count of all items
    pub fn total_count(&self) -> u32 {
        self.stacks().map(|(_, stack)| stack.count).sum()
    }

    /// Whether any slot holds an item of one of the given kinds
    pub fn has_any_of(&self, kinds: &[ItemKind]) -> bool {
        self.stacks().any(|(_, stack)| kinds.contains(&stack.kind))
    }

    /// Index of the first empty slot, if any
    pub fn first_empty(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().map_or(true, |stack| stack.is_empty()))
    }

    /// Shrink the stack in `slot` by `amount`, clearing the slot when it empties
    pub fn shrink(&mut self, slot: usize, amount: u32) {
        let Some(entry) = self.slots.get_mut(slot) else {
            return;
        };
        let emptied = match entry.as_mut() {
            Some(stack) => {
                stack.shrink(amount);
                stack.is_empty()
            }
            None => false,
        };
        if emptied {
            *entry = None;
        }
    }

    /// Add a stack, merging into matching stacks first and then empty slots.
    /// Returns whatever did not fit.
    pub fn add_item(&mut self, mut stack: ItemStack) -> Option<ItemStack> {
        for existing in self.slots.iter_mut().flatten() {
            if stack.is_empty() {
                break;
            }
            if existing.kind == stack.kind && !existing.is_empty() {
                let moved = existing.space_left().min(stack.count);
                existing.count += moved;
                stack.count -= moved;
            }
        }

        while !stack.is_empty() {
            let Some(slot) = self.first_empty() else {
                break;
            };
            let moved = stack.count.min(stack.max_stack_size);
            self.slots[slot] = Some(ItemStack {
                kind: stack.kind,
                count: moved,
                max_stack_size: stack.max_stack_size,
            });
            stack.count -= moved;
        }

        if stack.is_empty() {
            None
        } else {
            Some(stack)
        }
    }
}

/// Component: an item stack lying or flying around in the world
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ItemEntity {
    pub stack: ItemStack,
    pub thrower: Option<Entity>,
    /// Ticks left before anyone can pick this up
    pub pickup_delay: u32,
}

impl ItemEntity {
    pub fn can_be_picked_up(&self) -> bool {
        self.pickup_delay == 0
    }
}
