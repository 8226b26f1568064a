//! Snapshot Generation
//!
//! Copies the world into a serializable [`WorldSnapshot`], every list in
//! handle order so two identical worlds produce identical snapshots.

use bevy_ecs::prelude::*;

use crate::components::{
    Building, CharacterName, Commodity, CurrentActivity, Heading, Inventory, KindId,
    KindRegistry, Personality, Position, PriceBeliefs, Vitals, Weapon,
};
use crate::ledger::CreditBook;
use crate::queries::{sorted_buildings, sorted_characters, sorted_things};
use crate::relations::Relations;
use crate::systems::clock::SimClock;
use village_events::{
    BuildingSnapshot, CharacterSnapshot, CommodityAmount, PriceSnapshot, ThingSnapshot,
    WorldSnapshot,
};

/// Generate a complete world snapshot
pub fn capture_snapshot(world: &mut World) -> WorldSnapshot {
    let characters = sorted_characters(world);
    let things = sorted_things(world);
    let buildings = sorted_buildings(world);

    let world: &World = world;
    let no_relations = Relations::default();
    let relations = world.get_resource::<Relations>().unwrap_or(&no_relations);
    let tick = world.get_resource::<SimClock>().map_or(0, |clock| clock.tick);

    WorldSnapshot {
        tick,
        characters: characters
            .into_iter()
            .map(|entity| character_snapshot(world, relations, entity))
            .collect(),
        things: things
            .into_iter()
            .filter_map(|entity| thing_snapshot(world, relations, entity))
            .collect(),
        buildings: buildings
            .into_iter()
            .filter_map(|entity| building_snapshot(world, relations, entity))
            .collect(),
        debts: world
            .get_resource::<CreditBook>()
            .map(|book| book.debts().iter().map(|debt| debt.to_snapshot()).collect())
            .unwrap_or_default(),
    }
}

fn character_snapshot(world: &World, relations: &Relations, entity: Entity) -> CharacterSnapshot {
    let activity = world
        .get::<CurrentActivity>(entity)
        .copied()
        .unwrap_or_default();
    let inventory = world
        .get::<Inventory>(entity)
        .map(|inventory| {
            inventory
                .iter()
                .map(|(commodity, amount)| CommodityAmount { commodity, amount })
                .collect()
        })
        .unwrap_or_default();
    let prices = world
        .get::<PriceBeliefs>(entity)
        .map(|beliefs| {
            Commodity::ALL
                .into_iter()
                .map(|commodity| PriceSnapshot {
                    commodity,
                    buy: beliefs.buy(commodity),
                    sell: beliefs.sell(commodity),
                })
                .collect()
        })
        .unwrap_or_default();

    CharacterSnapshot {
        id: entity.to_bits(),
        name: world
            .get::<CharacterName>(entity)
            .map(|name| name.0.clone())
            .unwrap_or_default(),
        personality: world
            .get::<Personality>(entity)
            .map_or("unknown", Personality::as_str)
            .to_string(),
        activity: activity.activity,
        activity_timer: activity.timer,
        weapon_quality: world.get::<Weapon>(entity).map_or(0.0, |w| w.quality),
        body: relations.body_of(entity).map(Entity::to_bits),
        inventory,
        prices,
    }
}

fn thing_snapshot(world: &World, relations: &Relations, entity: Entity) -> Option<ThingSnapshot> {
    let position = world.get::<Position>(entity)?;
    let vitals = world.get::<Vitals>(entity)?;
    let (kind_name, size) =
        match (world.get::<KindId>(entity), world.get_resource::<KindRegistry>()) {
            (Some(kind), Some(kinds)) => (kinds.name(*kind).to_string(), kinds.size(*kind)),
            _ => ("unknown".to_string(), 0.0),
        };

    Some(ThingSnapshot {
        id: entity.to_bits(),
        kind: kind_name,
        size,
        x: position.x,
        y: position.y,
        heading: world.get::<Heading>(entity).map_or(0.0, |h| h.0),
        hp: vitals.hp,
        hp_max: vitals.hp_max,
        hunger: vitals.hunger,
        inside: relations.guest_location(entity).map(Entity::to_bits),
    })
}

fn building_snapshot(
    world: &World,
    relations: &Relations,
    entity: Entity,
) -> Option<BuildingSnapshot> {
    let building = world.get::<Building>(entity)?;
    Some(BuildingSnapshot {
        id: entity.to_bits(),
        model: building.model.as_str().to_string(),
        tile_x: building.tile_x,
        tile_y: building.tile_y,
        owner: relations.owner_of(entity).map(Entity::to_bits),
        guest: relations.guest_of(entity).map(Entity::to_bits),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ThingBundle;
    use crate::config::SimConfig;
    use crate::setup::insert_core_resources;

    #[test]
    fn test_things_carry_kind_size() {
        let mut world = World::new();
        insert_core_resources(&mut world, &SimConfig::default(), 1);
        let tree = world
            .spawn(ThingBundle::new(KindId::TREE, Position::new(2.0, 3.0), 30.0))
            .id();

        let snapshot = capture_snapshot(&mut world);
        let thing = snapshot.thing(tree.to_bits()).unwrap();

        assert_eq!(thing.kind, "tree");
        assert_eq!(thing.size, 0.2);
        assert_eq!(thing.x, 2.0);
        assert_eq!(thing.inside, None);
    }
}
