//! Configuration System
//!
//! Loads tuning parameters from a TOML file. Every section and field has a
//! default, so a partial file only overrides what it names.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::components::inventory::ItemKind;
use crate::error::ConfigError;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "village.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub trade: TradeConfig,
    pub food: FoodConfig,
    pub gossip: GossipConfig,
    pub perception: PerceptionConfig,
    pub pairing: PairingConfig,
    pub movement: MovementConfig,
    pub items: ItemConfig,
    /// Role preference table, keyed by profession id
    pub roles: BTreeMap<String, RoleConfig>,
}

/// Simulation parameters
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub villager_count: usize,
    /// Villagers spawn uniformly inside a square of this half-width
    pub spawn_radius: f64,
    pub inventory_size: usize,
    /// Fraction of villagers driven by the full agent AI (carry an `Activity`)
    pub simulated_agent_ratio: f64,
    /// Chance per tick that a simulated agent toggles between idle and busy
    pub activity_change_chance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            villager_count: 12,
            spawn_radius: 6.0,
            inventory_size: 8,
            simulated_agent_ratio: 0.5,
            activity_change_chance: 0.01,
        }
    }
}

/// Trade behavior tuning
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Movement speed used when approaching the trade partner
    pub walk_speed: f64,
    /// Stop the episode after this many ticks; unbounded when unset
    pub max_duration_ticks: Option<u64>,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            walk_speed: 0.5,
            max_duration_ticks: None,
        }
    }
}

/// Food point value of a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodValue {
    pub item: ItemKind,
    pub points: u32,
}

/// Food accounting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// A villager holding at least this many food points has a surplus
    pub surplus_threshold: u32,
    pub values: Vec<FoodValue>,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            surplus_threshold: 24,
            values: vec![
                FoodValue { item: ItemKind::Bread, points: 4 },
                FoodValue { item: ItemKind::Potato, points: 1 },
                FoodValue { item: ItemKind::Carrot, points: 1 },
                FoodValue { item: ItemKind::Beetroot, points: 1 },
            ],
        }
    }
}

/// Gossip bookkeeping
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GossipConfig {
    /// Minimum ticks between two gossip exchanges of the same villager
    pub cooldown_ticks: u64,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self { cooldown_ticks: 1200 }
    }
}

/// Sensor range for the nearest-visible snapshot
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub range: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self { range: 16.0 }
    }
}

/// How idle villagers pick an interaction target
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Chance per tick that an unpaired villager looks for a partner
    pub chance: f64,
    pub max_distance: f64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            chance: 0.05,
            max_distance: 8.0,
        }
    }
}

/// Straight-line walking
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// World units per tick covered at speed 1.0
    pub movement_scale: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { movement_scale: 0.2 }
    }
}

/// Thrown item physics and pickup
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub pickup_delay_ticks: u32,
    pub pickup_range: f64,
    pub gravity: f64,
    pub drag: f64,
    pub ground_level: f64,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            pickup_delay_ticks: 10,
            pickup_range: 1.0,
            gravity: 0.04,
            drag: 0.98,
            ground_level: 0.0,
        }
    }
}

/// One row of the role preference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Items villagers of this role want, in preference order
    pub wanted_items: Vec<ItemKind>,
    /// Whether the role counts as a farmer for food and wheat rules
    pub farmer: bool,
    /// Below this many food points the villager wants more food
    pub food_need_threshold: u32,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            wanted_items: Vec::new(),
            farmer: false,
            food_need_threshold: 12,
        }
    }
}

/// Professions every default table carries
const DEFAULT_PROFESSIONS: [&str; 15] = [
    "none",
    "armorer",
    "butcher",
    "cartographer",
    "cleric",
    "farmer",
    "fisherman",
    "fletcher",
    "leatherworker",
    "librarian",
    "mason",
    "nitwit",
    "shepherd",
    "toolsmith",
    "weaponsmith",
];

/// The default role preference table. Only farmers want anything.
pub fn default_roles() -> BTreeMap<String, RoleConfig> {
    DEFAULT_PROFESSIONS
        .iter()
        .map(|id| {
            let role = if *id == "farmer" {
                RoleConfig {
                    wanted_items: vec![
                        ItemKind::Wheat,
                        ItemKind::WheatSeeds,
                        ItemKind::BeetrootSeeds,
                        ItemKind::BoneMeal,
                    ],
                    farmer: true,
                    ..RoleConfig::default()
                }
            } else {
                RoleConfig::default()
            };
            (id.to_string(), role)
        })
        .collect()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            trade: TradeConfig::default(),
            food: FoodConfig::default(),
            gossip: GossipConfig::default(),
            perception: PerceptionConfig::default(),
            pairing: PairingConfig::default(),
            movement: MovementConfig::default(),
            items: ItemConfig::default(),
            roles: default_roles(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::from_file(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.inventory_size == 0 {
            return Err(ConfigError::Invalid("simulation.inventory_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.simulation.simulated_agent_ratio) {
            return Err(ConfigError::Invalid(
                "simulation.simulated_agent_ratio must be within 0.0..=1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pairing.chance) {
            return Err(ConfigError::Invalid("pairing.chance must be within 0.0..=1.0".into()));
        }
        if self.trade.walk_speed <= 0.0 {
            return Err(ConfigError::Invalid("trade.walk_speed must be positive".into()));
        }
        if self.perception.range <= 0.0 {
            return Err(ConfigError::Invalid("perception.range must be positive".into()));
        }
        if let Some(id) = self.roles.keys().find(|id| id.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("role id {:?} is empty", id)));
        }
        Ok(())
    }
}
