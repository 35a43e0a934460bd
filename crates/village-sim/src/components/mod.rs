//! ECS Components
//!
//! All entity components and shared resources for villagers, items, and the world.

pub mod brain;
pub mod inventory;
pub mod profession;
pub mod social;
pub mod villager;
pub mod world;

pub use brain::*;
pub use inventory::*;
pub use profession::*;
pub use social::*;
pub use villager::*;
pub use world::*;
