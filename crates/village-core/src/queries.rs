//! World lookups
//!
//! Small read helpers shared by the exclusive phases and the public query
//! surface. Missing components read as absent or zero rather than failing.

use bevy_ecs::prelude::*;

use crate::components::{
    AiModelRegistry, Building, Character, Commodity, CurrentActivity, Favourites, Inventory,
    Personality, PriceBeliefs, Thing,
};
use crate::relations::Relations;

/// Live characters in handle order.
pub fn sorted_characters(world: &mut World) -> Vec<Entity> {
    sorted::<Character>(world)
}

/// Live things in handle order.
pub fn sorted_things(world: &mut World) -> Vec<Entity> {
    sorted::<Thing>(world)
}

/// Live buildings in handle order.
pub fn sorted_buildings(world: &mut World) -> Vec<Entity> {
    sorted::<Building>(world)
}

fn sorted<C: Component>(world: &mut World) -> Vec<Entity> {
    let mut query = world.query_filtered::<Entity, With<C>>();
    let mut entities: Vec<Entity> = query.iter(world).collect();
    entities.sort();
    entities
}

pub fn inventory_of(world: &World, character: Entity, commodity: Commodity) -> f32 {
    world
        .get::<Inventory>(character)
        .map_or(0.0, |inventory| inventory.get(commodity))
}

pub fn buy_belief(world: &World, character: Entity, commodity: Commodity) -> Option<f32> {
    world
        .get::<PriceBeliefs>(character)
        .map(|beliefs| beliefs.buy(commodity))
}

pub fn sell_belief(world: &World, character: Entity, commodity: Commodity) -> Option<f32> {
    world
        .get::<PriceBeliefs>(character)
        .map(|beliefs| beliefs.sell(commodity))
}

pub fn personality_of(world: &World, character: Entity) -> Option<Personality> {
    world.get::<Personality>(character).copied()
}

/// Stockpile target of the character's personality (zero when unknown).
pub fn stockpile_target(world: &World, character: Entity, commodity: Commodity) -> f32 {
    match (
        personality_of(world, character),
        world.get_resource::<AiModelRegistry>(),
    ) {
        (Some(personality), Some(models)) => models.target(personality, commodity),
        _ => 0.0,
    }
}

pub fn favourites_of(world: &World, character: Entity) -> Favourites {
    world
        .get::<Favourites>(character)
        .copied()
        .unwrap_or_default()
}

pub fn activity_of(world: &World, character: Entity) -> CurrentActivity {
    world
        .get::<CurrentActivity>(character)
        .copied()
        .unwrap_or_default()
}

pub fn body_of(world: &World, character: Entity) -> Option<Entity> {
    world.get_resource::<Relations>()?.body_of(character)
}

pub fn owner_of(world: &World, building: Entity) -> Option<Entity> {
    world.get_resource::<Relations>()?.owner_of(building)
}

/// Owner of an optional building reference
pub fn owner_of_opt(world: &World, building: Option<Entity>) -> Option<Entity> {
    building.and_then(|b| owner_of(world, b))
}
