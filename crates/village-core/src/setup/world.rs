//! World Setup
//!
//! Core resources, the food web and the village buildings.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::{AiModelRegistry, Building, BuildingModel, KindId, KindRegistry};
use crate::config::SimConfig;
use crate::ledger::CreditBook;
use crate::output::{CommodityFlows, StatsCollector, TickEvents};
use crate::relations::Relations;
use crate::systems::{PendingRemovals, SimClock};
use crate::SimRng;

/// Inserts every resource the schedule reads, replacing any already present.
pub fn insert_core_resources(world: &mut World, config: &SimConfig, seed: u64) {
    world.insert_resource(config.clone());
    world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(SimClock::default());
    world.insert_resource(KindRegistry::standard());
    world.insert_resource(AiModelRegistry::standard());
    world.insert_resource(create_food_web());
    world.insert_resource(CreditBook::new());
    world.insert_resource(TickEvents::new());
    world.insert_resource(CommodityFlows::new());
    world.insert_resource(PendingRemovals::new());
    world.insert_resource(StatsCollector::new());
}

/// Relations seeded with who may hunt whom.
pub fn create_food_web() -> Relations {
    let mut relations = Relations::new();
    relations.add_food_link(KindId::HUMAN, KindId::MEATBUG);
    relations.add_food_link(KindId::HUMAN, KindId::RAT);
    relations.add_food_link(KindId::RAT, KindId::MEATBUG);
    relations
}

/// Spawns a building owned by `owner`.
pub fn spawn_building(
    world: &mut World,
    tile_x: i32,
    tile_y: i32,
    model: BuildingModel,
    owner: Entity,
) -> Entity {
    let building = world.spawn(Building::new(tile_x, tile_y, model)).id();
    world.resource_mut::<Relations>().set_owner(building, owner);
    building
}
