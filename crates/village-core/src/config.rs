//! Configuration System
//!
//! Every tuning constant of the simulation lives here, loaded from a TOML
//! file. Missing sections and fields fall back to the reference values, so a
//! tuning file only needs to name what it changes.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "village.toml";

/// Errors raised while loading a tuning file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration, inserted into the world as a resource.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub needs: NeedsConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub hunt: HuntConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub population: PopulationConfig,
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from `path`, or use defaults if it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "using default configuration");
            Self::default()
        })
    }
}

/// Run parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed used when none is given on the command line
    pub seed: u64,
    /// Real-time tick cadence
    pub tick_rate_hz: f64,
    /// Upper bound on ticks run to catch up after a stalled frame
    pub max_ticks_per_frame: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate_hz: 60.0,
            max_ticks_per_frame: 5,
        }
    }
}

/// Price belief adaptation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Learning rate toward a counterparty's quote
    pub learning_rate: f32,
    /// Beliefs never drop below this
    pub price_floor: f32,
    pub initial_belief: f32,
    /// Maintenance runs on ticks divisible by this
    pub maintenance_interval: u64,
    /// Decay kicks in once inventory exceeds target times this
    pub overstock_factor: f32,
    pub sell_decay_rate: f32,
    pub buy_decay_rate: f32,
    /// One unit spoils per this many held
    pub spoilage_batch: f32,
    pub scarcity_rate: f32,
    /// Scarcity bumps are capped at coins on hand plus this
    pub price_ceiling_margin: f32,
    /// Weapon masters discount repairs by this factor each maintenance
    pub weapon_service_decay: f32,
    /// Repair price multiplier applied when a job starts
    pub weapon_service_markup: f32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            price_floor: 1e-5,
            initial_belief: 1.0,
            maintenance_interval: 5,
            overstock_factor: 2.0,
            sell_decay_rate: 0.05,
            buy_decay_rate: 0.1,
            spoilage_batch: 20.0,
            scarcity_rate: 0.05,
            price_ceiling_margin: 10.0,
            weapon_service_decay: 0.99,
            weapon_service_markup: 1.05,
        }
    }
}

/// Shop trading rounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub rounds: u32,
    /// Sellers refuse quotes below their own food buy belief divided by this
    pub bottom_price_divisor: f32,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            bottom_price_divisor: 5.0,
        }
    }
}

/// Hunger, eating and healing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    pub hunger_per_tick: f32,
    pub eat_threshold: f32,
    /// Hunger removed by one meal or one kill eaten raw
    pub nutrition: f32,
    pub meal_heal: f32,
    pub potion_heal: f32,
    /// Potions are drunk below this fraction of max hp
    pub potion_hp_fraction: f32,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            hunger_per_tick: 1.0,
            eat_threshold: 250.0,
            nutrition: 250.0,
            meal_heal: 10.0,
            potion_heal: 10.0,
            potion_hp_fraction: 0.5,
        }
    }
}

/// Personality state machines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Hunters cook their own catch above this hunger
    pub cook_hunger_threshold: f32,
    /// Stock over target by more than this triggers a shop visit
    pub surplus_margin: f32,
    pub repair_quality_threshold: f32,
    /// Repairs are wanted only when coins cover this many repair prices
    pub repair_affordability: f32,
    /// Food trips are made only when coins cover this many meals
    pub food_affordability: f32,
    pub repair_bonus: f32,
    /// Activities complete once their timer exceeds these
    pub repair_duration: u32,
    pub brewing_duration: u32,
    pub cooking_duration: u32,
    pub gathering_duration: u32,
    /// Brewing pays when the potion quote exceeds material cost times this
    pub brewing_margin: f32,
    /// Each full step of cooking skill yields one extra portion
    pub cooking_skill_step: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            cook_hunger_threshold: 200.0,
            surplus_margin: 3.0,
            repair_quality_threshold: 2.0,
            repair_affordability: 3.0,
            food_affordability: 2.0,
            repair_bonus: 0.3,
            repair_duration: 4,
            brewing_duration: 6,
            cooking_duration: 1,
            gathering_duration: 3,
            brewing_margin: 2.0,
            cooking_skill_step: 0.3,
        }
    }
}

/// Hunt resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    pub search_radius: f32,
    /// Attacks land within this distance
    pub reach: f32,
    pub base_damage: f32,
    /// Weapon quality multiplier per hit
    pub weapon_wear: f32,
    /// Hp restored to a bodiless hunter per kill
    pub critter_heal: f32,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            search_radius: 1000.0,
            reach: 1.0,
            base_damage: 10.0,
            weapon_wear: 0.95,
            critter_heal: 5.0,
        }
    }
}

/// Walking and wandering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Distance a character walks per tick
    pub step: f32,
    /// Critter wander and follow pull, scaled by kind speed
    pub steer: f32,
    /// Width of the per-tick heading jitter
    pub heading_jitter: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            steer: 0.05,
            heading_jitter: 0.1,
        }
    }
}

/// Starting population and breeding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub hunters: u32,
    pub alchemists: u32,
    pub herbalists: u32,
    pub queens: u32,
    pub trees: u32,
    pub human_hp: f32,
    pub queen_hp: f32,
    pub tree_hp: f32,
    pub offspring_hp: f32,
    /// Queens are scattered uniformly within this distance of the origin
    pub queen_spread: f32,
    pub forest_x: f32,
    pub forest_y: f32,
    /// Standard deviation of tree placement around the forest center
    pub forest_spread: f32,
    pub birth_chance: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            hunters: 4,
            alchemists: 2,
            herbalists: 2,
            queens: 50,
            trees: 50,
            human_hp: 100.0,
            queen_hp: 300.0,
            tree_hp: 30.0,
            offspring_hp: 30.0,
            queen_spread: 50.0,
            forest_x: 30.0,
            forest_y: 30.0,
            forest_spread: 10.0,
            birth_chance: 0.01,
        }
    }
}
