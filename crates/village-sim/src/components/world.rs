//! World Components
//!
//! Positions, velocities, and the simulation clock.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point or direction in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length_sqr(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length_sqr().sqrt()
    }

    /// Unit vector in the same direction, or zero for a near-zero vector
    pub fn normalize(&self) -> Vec3 {
        let len = self.length();
        if len < 1.0e-4 {
            Vec3::ZERO
        } else {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        }
    }

    /// Component-wise multiplication
    pub fn scale(&self, factor: Vec3) -> Vec3 {
        Vec3::new(self.x * factor.x, self.y * factor.y, self.z * factor.z)
    }

    pub fn distance_sqr(&self, other: Vec3) -> f64 {
        (*self - other).length_sqr()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Component: an entity's feet position in the world
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn distance_sqr(&self, other: &Position) -> f64 {
        self.0.distance_sqr(other.0)
    }
}

/// Component: eye height above the feet position
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeHeight(pub f64);

impl Default for EyeHeight {
    fn default() -> Self {
        // Adult villager
        Self(1.62)
    }
}

/// Component: per-tick motion of a free-moving entity
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// Global simulation clock
#[derive(Resource, Debug, Clone, Default)]
pub struct SimulationState {
    pub current_tick: u64,
    pub max_ticks: u64,
}

impl SimulationState {
    pub fn new(max_ticks: u64) -> Self {
        Self {
            current_tick: 0,
            max_ticks,
        }
    }

    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }
}

/// Squared distance between two entities, if both have positions
pub fn distance_sqr_between(world: &World, a: Entity, b: Entity) -> Option<f64> {
    let pa = world.get::<Position>(a)?;
    let pb = world.get::<Position>(b)?;
    Some(pa.distance_sqr(pb))
}
