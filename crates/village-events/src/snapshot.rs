//! Snapshot Types
//!
//! Read-only copies of the simulation state taken between ticks. Renderers
//! and debugging tools consume these; nothing here feeds back into the
//! simulation.

use serde::{Deserialize, Serialize};

use crate::goods::{Activity, Commodity};

/// Complete world state at the end of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub characters: Vec<CharacterSnapshot>,
    pub things: Vec<ThingSnapshot>,
    pub buildings: Vec<BuildingSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debts: Vec<DebtSnapshot>,
}

impl WorldSnapshot {
    /// Sum of one commodity across every character's inventory.
    pub fn total_of(&self, commodity: Commodity) -> f32 {
        self.characters
            .iter()
            .flat_map(|c| c.inventory.iter())
            .filter(|entry| entry.commodity == commodity)
            .map(|entry| entry.amount)
            .sum()
    }

    /// Looks up a character by its entity id.
    pub fn character(&self, id: u64) -> Option<&CharacterSnapshot> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Looks up a thing by its entity id.
    pub fn thing(&self, id: u64) -> Option<&ThingSnapshot> {
        self.things.iter().find(|t| t.id == id)
    }

    /// Pretty-printed JSON for dumping to a terminal or file.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Quantity of one commodity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommodityAmount {
    pub commodity: Commodity,
    pub amount: f32,
}

/// Buy/sell beliefs for one commodity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub commodity: Commodity,
    pub buy: f32,
    pub sell: f32,
}

/// Character state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: u64,
    pub name: String,
    pub personality: String,
    pub activity: Option<Activity>,
    pub activity_timer: u32,
    pub weapon_quality: f32,
    #[serde(default)]
    pub body: Option<u64>,
    pub inventory: Vec<CommodityAmount>,
    pub prices: Vec<PriceSnapshot>,
}

impl CharacterSnapshot {
    /// Presentation name of the current activity.
    pub fn activity_name(&self) -> &'static str {
        Activity::display_name(self.activity)
    }

    /// Held quantity of a commodity (zero when absent).
    pub fn amount_of(&self, commodity: Commodity) -> f32 {
        self.inventory
            .iter()
            .find(|entry| entry.commodity == commodity)
            .map_or(0.0, |entry| entry.amount)
    }
}

/// Physical body state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingSnapshot {
    pub id: u64,
    pub kind: String,
    #[serde(default)]
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub hunger: f32,
    /// Building the thing is currently inside, if any
    #[serde(default)]
    pub inside: Option<u64>,
}

/// Building state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub id: u64,
    pub model: String,
    pub tile_x: i32,
    pub tile_y: i32,
    pub owner: Option<u64>,
    pub guest: Option<u64>,
}

/// Outstanding credit between two characters for one commodity.
///
/// `debtor` owes `creditor` `amount` units; `amount` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtSnapshot {
    pub debtor: u64,
    pub creditor: u64,
    pub commodity: Commodity,
    pub amount: f32,
}
