//! Profession Components
//!
//! The role preference table and food accounting shared by every villager.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::components::inventory::{Inventory, ItemKind};
use crate::components::villager::Profession;
use crate::config::{FoodConfig, RoleConfig};

/// Resolved preferences of one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    /// Items this role wants, in preference order. `None` when it wants nothing.
    pub wanted_items: Option<Arc<[ItemKind]>>,
    pub farmer: bool,
    pub food_need_threshold: u32,
}

impl RoleProfile {
    fn from_config(config: &RoleConfig) -> Self {
        let wanted_items = if config.wanted_items.is_empty() {
            None
        } else {
            Some(Arc::from(config.wanted_items.as_slice()))
        };
        Self {
            wanted_items,
            farmer: config.farmer,
            food_need_threshold: config.food_need_threshold,
        }
    }
}

impl Default for RoleProfile {
    fn default() -> Self {
        Self::from_config(&RoleConfig::default())
    }
}

/// Resource: role id -> profile. Every role's wanted list is allocated once,
/// so two villagers of the same role share the identical list.
#[derive(Resource, Debug, Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, RoleProfile>,
    fallback: RoleProfile,
}

impl RoleTable {
    /// Build the table from configured roles
    pub fn from_config<'a>(roles: impl IntoIterator<Item = (&'a String, &'a RoleConfig)>) -> Self {
        let roles = roles
            .into_iter()
            .map(|(id, config)| (id.clone(), RoleProfile::from_config(config)))
            .collect();
        Self {
            roles,
            fallback: RoleProfile::default(),
        }
    }

    /// Profile of a profession. Unknown professions want nothing and are not farmers.
    pub fn profile(&self, profession: &Profession) -> &RoleProfile {
        self.roles.get(profession.id()).unwrap_or(&self.fallback)
    }

    pub fn wanted_items(&self, profession: &Profession) -> Option<&Arc<[ItemKind]>> {
        self.profile(profession).wanted_items.as_ref()
    }

    pub fn is_farmer(&self, profession: &Profession) -> bool {
        self.profile(profession).farmer
    }

    pub fn role_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.roles.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

/// Resource: food point values and the surplus threshold
#[derive(Resource, Debug, Clone)]
pub struct FoodPolicy {
    points: Vec<(ItemKind, u32)>,
    food_kinds: Vec<ItemKind>,
    pub surplus_threshold: u32,
}

impl FoodPolicy {
    pub fn from_config(config: &FoodConfig) -> Self {
        let points: Vec<(ItemKind, u32)> = config.values.iter().map(|v| (v.item, v.points)).collect();
        let food_kinds = points.iter().map(|(kind, _)| *kind).collect();
        Self {
            points,
            food_kinds,
            surplus_threshold: config.surplus_threshold,
        }
    }

    /// Item kinds that count as food
    pub fn food_kinds(&self) -> &[ItemKind] {
        &self.food_kinds
    }

    /// Total food points held in an inventory
    pub fn food_points(&self, inventory: &Inventory) -> u32 {
        self.points
            .iter()
            .map(|(kind, points)| inventory.count_item(*kind) * points)
            .sum()
    }

    pub fn has_excess_food(&self, inventory: &Inventory) -> bool {
        self.food_points(inventory) >= self.surplus_threshold
    }

    pub fn wants_more_food(&self, inventory: &Inventory, role: &RoleProfile) -> bool {
        self.food_points(inventory) < role.food_need_threshold
    }
}

impl Default for FoodPolicy {
    fn default() -> Self {
        Self::from_config(&FoodConfig::default())
    }
}
