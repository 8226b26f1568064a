//! Kind and AI model registries
//!
//! Kinds describe species of things (size, speed). AI models hold each
//! personality's stockpile targets. Both are shared read-only tables.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::character::Personality;
use super::goods::{Commodity, CommodityMap};

/// Handle to a kind in the [`KindRegistry`]
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(pub u16);

impl KindId {
    pub const HUMAN: KindId = KindId(0);
    pub const RAT: KindId = KindId(1);
    pub const MEATBUG: KindId = KindId(2);
    pub const MEATBUG_QUEEN: KindId = KindId(3);
    pub const POTION_FLOWER: KindId = KindId(4);
    pub const TREE: KindId = KindId(5);
}

/// Species constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindDef {
    pub name: String,
    pub size: f32,
    /// Scales critter wandering and following; zero for plants
    pub speed: f32,
}

/// All kinds, addressed by [`KindId`].
#[derive(Resource, Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: Vec<KindDef>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six built-in kinds, registered so their ids match the
    /// associated constants on [`KindId`].
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("human", 1.0, 1.0);
        registry.register("rat", 0.5, 0.8);
        registry.register("meatbug", 0.1, 0.2);
        registry.register("meatbug_queen", 2.0, 0.1);
        registry.register("potion_flower", 0.1, 0.0);
        registry.register("tree", 0.2, 0.0);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, size: f32, speed: f32) -> KindId {
        let id = KindId(self.kinds.len() as u16);
        self.kinds.push(KindDef {
            name: name.into(),
            size,
            speed,
        });
        id
    }

    pub fn get(&self, id: KindId) -> Option<&KindDef> {
        self.kinds.get(id.0 as usize)
    }

    /// Movement speed, zero for unknown kinds
    pub fn speed(&self, id: KindId) -> f32 {
        self.get(id).map_or(0.0, |k| k.speed)
    }

    /// Body size, zero for unknown kinds
    pub fn size(&self, id: KindId) -> f32 {
        self.get(id).map_or(0.0, |k| k.size)
    }

    pub fn name(&self, id: KindId) -> &str {
        self.get(id).map_or("unknown", |k| k.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Stockpile targets per personality. Absent targets read as zero.
#[derive(Resource, Debug, Clone, Default)]
pub struct AiModelRegistry {
    targets: HashMap<Personality, CommodityMap<f32>>,
}

impl AiModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference stockpile targets for every personality.
    pub fn standard() -> Self {
        let mut models = Self::new();

        models.set_target(Personality::Hunter, Commodity::Potion, 7.0);
        models.set_target(Personality::Hunter, Commodity::PreparedFood, 3.0);

        // Shopkeepers want a bit of everything on the shelves
        for commodity in Commodity::ALL {
            if commodity != Commodity::Coins {
                models.set_target(Personality::Shopkeeper, commodity, 10.0);
            }
        }

        models.set_target(Personality::Innkeeper, Commodity::RawFood, 10.0);
        models.set_target(Personality::Innkeeper, Commodity::PreparedFood, 5.0);
        models.set_target(Personality::Innkeeper, Commodity::Potion, 1.0);

        models.set_target(Personality::Alchemist, Commodity::PreparedFood, 5.0);
        models.set_target(Personality::Alchemist, Commodity::PotionMaterial, 10.0);

        for personality in [Personality::WeaponMaster, Personality::Herbalist] {
            models.set_target(personality, Commodity::PreparedFood, 5.0);
            models.set_target(personality, Commodity::Potion, 1.0);
        }

        models
    }

    pub fn set_target(&mut self, personality: Personality, commodity: Commodity, amount: f32) {
        self.targets
            .entry(personality)
            .or_default()
            .set(commodity, amount);
    }

    pub fn target(&self, personality: Personality, commodity: Commodity) -> f32 {
        self.targets
            .get(&personality)
            .map_or(0.0, |targets| targets.get(commodity))
    }

    /// Full target table for one personality
    pub fn targets(&self, personality: Personality) -> CommodityMap<f32> {
        self.targets.get(&personality).copied().unwrap_or_default()
    }
}
