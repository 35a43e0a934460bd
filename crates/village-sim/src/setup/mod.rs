//! World Setup
//!
//! Villager and bystander spawning.

pub mod villagers;

pub use villagers::*;
