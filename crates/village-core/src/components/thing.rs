//! Thing Components
//!
//! Physical bodies in the world: position, heading, hp and hunger.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::registry::KindId;

/// Marker component identifying an entity as a physical thing
#[derive(Component, Debug, Clone, Default)]
pub struct Thing;

/// World position
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Position) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Facing angle in radians; drives critter wandering
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Heading(pub f32);

/// Hit points and hunger
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    pub hp: f32,
    pub hp_max: f32,
    pub hunger: f32,
}

impl Vitals {
    pub fn new(hp: f32, hp_max: f32) -> Self {
        Self {
            hp,
            hp_max,
            hunger: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Restores hp, never above the maximum.
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.hp_max).max(self.hp);
    }

    /// Reduces hunger, never below zero.
    pub fn feed(&mut self, nutrition: f32) {
        self.hunger = (self.hunger - nutrition).max(0.0);
    }
}

/// Everything a physical thing is spawned with
#[derive(Bundle, Debug, Clone)]
pub struct ThingBundle {
    pub thing: Thing,
    pub kind: KindId,
    pub position: Position,
    pub heading: Heading,
    pub vitals: Vitals,
}

impl ThingBundle {
    pub fn new(kind: KindId, position: Position, hp: f32) -> Self {
        Self {
            thing: Thing,
            kind,
            position,
            heading: Heading::default(),
            vitals: Vitals::new(hp, hp),
        }
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = Heading(heading);
        self
    }

    /// Overrides hp independently of the maximum
    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = vitals;
        self
    }
}
