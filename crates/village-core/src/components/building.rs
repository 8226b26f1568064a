//! Building Components

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::thing::Position;

/// What a building is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingModel {
    Inn,
    Shop,
    WeaponShop,
}

impl BuildingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingModel::Inn => "inn",
            BuildingModel::Shop => "shop",
            BuildingModel::WeaponShop => "weapon_shop",
        }
    }
}

/// A building on the tile grid
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building {
    pub tile_x: i32,
    pub tile_y: i32,
    pub model: BuildingModel,
}

impl Building {
    pub fn new(tile_x: i32, tile_y: i32, model: BuildingModel) -> Self {
        Self {
            tile_x,
            tile_y,
            model,
        }
    }

    /// World position of the door (the tile itself)
    pub fn door(&self) -> Position {
        Position::new(self.tile_x as f32, self.tile_y as f32)
    }
}
