//! Behavior Engine
//!
//! Per-personality state machines. Idle characters pick their next activity
//! from an ordered list of triggers; the current activity's handler then
//! runs in the same tick.

use bevy_ecs::prelude::*;

use crate::components::{Activity, Commodity, Personality, Thing, Vitals};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::queries::{
    activity_of, body_of, buy_belief, favourites_of, inventory_of, owner_of_opt, personality_of,
    sell_belief, sorted_characters,
};

use super::hunt::{hunt, HuntOutcome};
use super::movement::move_toward_building;
use super::production::{
    gather_potion_material, make_potion, prepare_food, repair_weapon, reset_activity,
    start_activity,
};
use super::triggers::{
    alchemist_desire_shopping, desire_buy_food, desire_weapon_repair, hunter_desire_shopping,
};

/// System: one behavior step for every character, in handle order.
pub fn run_behavior(world: &mut World) {
    let config = world.get_resource::<SimConfig>().cloned().unwrap_or_default();

    for character in sorted_characters(world) {
        let Some(personality) = personality_of(world, character) else {
            continue;
        };
        let result = match personality {
            Personality::Hunter => update_hunter(world, character, &config),
            Personality::Alchemist => update_alchemist(world, character, &config),
            Personality::Herbalist => update_herbalist(world, character),
            Personality::Innkeeper => update_innkeeper(world, character),
            Personality::Shopkeeper | Personality::WeaponMaster => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!(
                ?character,
                personality = personality.as_str(),
                error = %e,
                "activity abandoned"
            );
            reset_activity(world, character);
        }
    }
}

/// Hunter: trade surplus, repair, cook, buy food, otherwise hunt.
pub fn update_hunter(
    world: &mut World,
    character: Entity,
    config: &SimConfig,
) -> Result<(), SimError> {
    let Some(body) = body_of(world, character) else {
        return Ok(());
    };

    if activity_of(world, character).is_idle() {
        let next = if hunter_desire_shopping(world, character, config) {
            Activity::Shopping
        } else if desire_weapon_repair(world, character, config) {
            Activity::WeaponRepair
        } else if wants_to_cook(world, character, body, config) {
            Activity::PrepareFood
        } else if desire_buy_food(world, character, config) {
            Activity::GettingFood
        } else {
            Activity::Working
        };
        start_activity(world, character, next);
    }

    let current = activity_of(world, character);
    let favourites = favourites_of(world, character);
    match current.activity {
        Some(Activity::Shopping) => {
            let wanted = hunter_desire_shopping(world, character, config);
            run_errand(world, character, body, favourites.shop, wanted)
        }
        Some(Activity::GettingFood) => {
            let wanted = desire_buy_food(world, character, config);
            run_errand(world, character, body, favourites.inn, wanted)
        }
        Some(Activity::WeaponRepair) => {
            let master = owner_of_opt(world, favourites.weapon_shop);
            let wanted = desire_weapon_repair(world, character, config) || current.timer > 0;
            match (favourites.weapon_shop, master) {
                (Some(forge), Some(master)) if wanted => {
                    if move_toward_building(world, body, forge)?.is_complete() {
                        repair_weapon(world, character, master, body)?;
                    }
                }
                _ => reset_activity(world, character),
            }
            Ok(())
        }
        Some(Activity::PrepareFood) => {
            if inventory_of(world, character, Commodity::RawFood) >= 1.0 {
                prepare_food(world, character)
            } else {
                reset_activity(world, character);
                Ok(())
            }
        }
        Some(Activity::Working) => {
            if hunt(world, body)? == HuntOutcome::Success {
                reset_activity(world, character);
            }
            Ok(())
        }
        None => Ok(()),
    }
}

/// Alchemist: trade potions and restock, buy food, otherwise brew.
pub fn update_alchemist(
    world: &mut World,
    character: Entity,
    config: &SimConfig,
) -> Result<(), SimError> {
    let Some(body) = body_of(world, character) else {
        return Ok(());
    };

    if activity_of(world, character).is_idle() {
        let next = if alchemist_desire_shopping(world, character, config) {
            Activity::Shopping
        } else if desire_buy_food(world, character, config) {
            Activity::GettingFood
        } else {
            Activity::Working
        };
        start_activity(world, character, next);
    }

    let favourites = favourites_of(world, character);
    match activity_of(world, character).activity {
        Some(Activity::Shopping) => {
            let wanted = alchemist_desire_shopping(world, character, config);
            run_errand(world, character, body, favourites.shop, wanted)
        }
        Some(Activity::GettingFood) => {
            let wanted = desire_buy_food(world, character, config);
            run_errand(world, character, body, favourites.inn, wanted)
        }
        Some(Activity::Working) => {
            if brewing_pays(world, character, config) {
                make_potion(world, character)
            } else {
                reset_activity(world, character);
                Ok(())
            }
        }
        _ => {
            reset_activity(world, character);
            Ok(())
        }
    }
}

/// Herbalist: gathers potion material forever.
pub fn update_herbalist(world: &mut World, character: Entity) -> Result<(), SimError> {
    if activity_of(world, character).activity != Some(Activity::Working) {
        start_activity(world, character, Activity::Working);
    }
    gather_potion_material(world, character)
}

/// Innkeeper: cooks whenever there is raw food and meals sell above the
/// price of their ingredients.
pub fn update_innkeeper(world: &mut World, character: Entity) -> Result<(), SimError> {
    let raw = inventory_of(world, character, Commodity::RawFood);
    let meal_price = sell_belief(world, character, Commodity::PreparedFood).unwrap_or(0.0);
    let raw_price = buy_belief(world, character, Commodity::RawFood).unwrap_or(0.0);

    if raw < 1.0 || meal_price <= raw_price {
        return Ok(());
    }
    if activity_of(world, character).activity != Some(Activity::PrepareFood) {
        start_activity(world, character, Activity::PrepareFood);
    }
    prepare_food(world, character)
}

/// Keeps walking to an errand's building while the errand is still wanted;
/// otherwise drops the activity. Arrival keeps the activity so the trading
/// phase can find the character in the building.
fn run_errand(
    world: &mut World,
    character: Entity,
    body: Entity,
    building: Option<Entity>,
    wanted: bool,
) -> Result<(), SimError> {
    if !wanted {
        reset_activity(world, character);
    }
    match building {
        Some(building) => move_toward_building(world, body, building).map(|_| ()),
        None => {
            reset_activity(world, character);
            Ok(())
        }
    }
}

fn wants_to_cook(world: &World, character: Entity, body: Entity, config: &SimConfig) -> bool {
    let hunger = world.get::<Vitals>(body).map_or(0.0, |vitals| vitals.hunger);
    hunger > config.behavior.cook_hunger_threshold
        && inventory_of(world, character, Commodity::RawFood) >= 1.0
}

/// Material on hand and the shop pays well over the material's price.
fn brewing_pays(world: &World, character: Entity, config: &SimConfig) -> bool {
    if inventory_of(world, character, Commodity::PotionMaterial) < 1.0 {
        return false;
    }
    let shopkeeper = owner_of_opt(world, favourites_of(world, character).shop);
    let quotes = shopkeeper.and_then(|s| {
        Some((
            buy_belief(world, s, Commodity::Potion)?,
            sell_belief(world, s, Commodity::PotionMaterial)?,
        ))
    });
    match quotes {
        Some((potion, material)) => potion > material * config.behavior.brewing_margin,
        None => false,
    }
}

/// System: hunger grows on every thing each tick.
pub fn grow_hunger(config: Res<SimConfig>, mut things: Query<&mut Vitals, With<Thing>>) {
    let rate = config.needs.hunger_per_tick;
    for mut vitals in things.iter_mut() {
        vitals.hunger += rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        AiModelRegistry, Building, BuildingModel, Character, CurrentActivity, Favourites,
        Inventory, KindId, Position, PriceBeliefs, ThingBundle, Weapon,
    };
    use crate::output::TickEvents;
    use crate::relations::Relations;
    use crate::systems::compaction::PendingRemovals;

    struct Village {
        world: World,
        shop: Entity,
        inn: Entity,
        forge: Entity,
    }

    fn village() -> Village {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(AiModelRegistry::standard());
        world.insert_resource(TickEvents::new());
        world.insert_resource(PendingRemovals::new());
        let mut relations = Relations::new();
        relations.add_food_link(KindId::HUMAN, KindId::MEATBUG);
        world.insert_resource(relations);

        let shop = world.spawn(Building::new(3, 3, BuildingModel::Shop)).id();
        let inn = world.spawn(Building::new(0, 0, BuildingModel::Inn)).id();
        let forge = world.spawn(Building::new(3, 0, BuildingModel::WeaponShop)).id();
        for (building, personality) in [
            (shop, Personality::Shopkeeper),
            (inn, Personality::Innkeeper),
            (forge, Personality::WeaponMaster),
        ] {
            let owner = spawn_resident(&mut world, personality, Inventory::new(), None);
            world.resource_mut::<Relations>().set_owner(building, owner);
        }

        Village {
            world,
            shop,
            inn,
            forge,
        }
    }

    fn spawn_resident(
        world: &mut World,
        personality: Personality,
        inventory: Inventory,
        favourites: Option<Favourites>,
    ) -> Entity {
        let character = world
            .spawn((
                Character,
                personality,
                inventory,
                PriceBeliefs::new(1.0, 1e-5),
                CurrentActivity::default(),
                Weapon { quality: 5.0 },
                favourites.unwrap_or_default(),
            ))
            .id();
        let body = world
            .spawn(ThingBundle::new(KindId::HUMAN, Position::new(1.0, 1.0), 100.0))
            .id();
        world.resource_mut::<Relations>().embody(character, body);
        character
    }

    fn resident(village: &mut Village, personality: Personality, inventory: Inventory) -> Entity {
        let favourites = Favourites {
            shop: Some(village.shop),
            inn: Some(village.inn),
            weapon_shop: Some(village.forge),
        };
        spawn_resident(&mut village.world, personality, inventory, Some(favourites))
    }

    #[test]
    fn test_hunter_with_surplus_goes_shopping() {
        let mut village = village();
        let hunter = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::RawFood, 10.0),
        );

        run_behavior(&mut village.world);

        assert_eq!(
            activity_of(&village.world, hunter).activity,
            Some(Activity::Shopping)
        );
        let body = body_of(&village.world, hunter).unwrap();
        let position = village.world.get::<Position>(body).unwrap();
        assert!(position.x > 1.0 && position.y > 1.0);
    }

    #[test]
    fn test_idle_hunter_defaults_to_hunting() {
        let mut village = village();
        let hunter = resident(&mut village, Personality::Hunter, Inventory::new());
        let prey = village
            .world
            .spawn(ThingBundle::new(KindId::MEATBUG, Position::new(1.5, 1.0), 10.0))
            .id();

        run_behavior(&mut village.world);

        // hunt succeeded in the same tick, so the hunter is idle again
        assert!(activity_of(&village.world, hunter).is_idle());
        assert_eq!(inventory_of(&village.world, hunter, Commodity::RawFood), 1.0);
        assert!(village.world.resource::<PendingRemovals>().contains(prey));
    }

    #[test]
    fn test_hungry_hunter_cooks_own_catch() {
        let mut village = village();
        let hunter = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::RawFood, 1.0),
        );
        let body = body_of(&village.world, hunter).unwrap();
        village.world.get_mut::<Vitals>(body).unwrap().hunger = 201.0;

        for _ in 0..3 {
            run_behavior(&mut village.world);
        }

        assert_eq!(inventory_of(&village.world, hunter, Commodity::PreparedFood), 1.0);
        assert_eq!(inventory_of(&village.world, hunter, Commodity::RawFood), 0.0);
    }

    #[test]
    fn test_broke_repair_is_abandoned() {
        let mut village = village();
        let hunter = resident(&mut village, Personality::Hunter, Inventory::new());
        let body = body_of(&village.world, hunter).unwrap();
        village
            .world
            .resource_mut::<Relations>()
            .enter(body, village.forge);
        let mut current = CurrentActivity::default();
        current.start(Activity::WeaponRepair);
        village.world.entity_mut(hunter).insert(current);
        village.world.entity_mut(hunter).insert(Weapon { quality: 0.5 });

        run_behavior(&mut village.world);

        assert!(activity_of(&village.world, hunter).is_idle());
        assert_eq!(village.world.get::<Weapon>(hunter).unwrap().quality, 0.5);
    }

    #[test]
    fn test_herbalist_gathers_every_five_ticks() {
        let mut village = village();
        let herbalist = resident(&mut village, Personality::Herbalist, Inventory::new());

        for _ in 0..5 {
            run_behavior(&mut village.world);
        }
        assert_eq!(
            inventory_of(&village.world, herbalist, Commodity::PotionMaterial),
            1.0
        );
        assert!(activity_of(&village.world, herbalist).is_idle());
    }

    #[test]
    fn test_alchemist_brews_when_margin_holds() {
        let mut village = village();
        let alchemist = resident(
            &mut village,
            Personality::Alchemist,
            Inventory::new().with(Commodity::PotionMaterial, 20.0),
        );
        let shopkeeper = owner_of_opt(&village.world, Some(village.shop)).unwrap();
        village
            .world
            .get_mut::<PriceBeliefs>(shopkeeper)
            .unwrap()
            .set_buy(Commodity::Potion, 3.0);

        for _ in 0..8 {
            run_behavior(&mut village.world);
        }

        assert_eq!(inventory_of(&village.world, alchemist, Commodity::Potion), 1.0);
        assert_eq!(
            inventory_of(&village.world, alchemist, Commodity::PotionMaterial),
            19.0
        );
    }

    #[test]
    fn test_innkeeper_cooks_only_at_a_margin() {
        let mut village = village();
        let innkeeper = owner_of_opt(&village.world, Some(village.inn)).unwrap();
        village
            .world
            .get_mut::<Inventory>(innkeeper)
            .unwrap()
            .deposit(Commodity::RawFood, 2.0)
            .unwrap();

        for _ in 0..3 {
            run_behavior(&mut village.world);
        }
        assert_eq!(inventory_of(&village.world, innkeeper, Commodity::PreparedFood), 0.0);

        village
            .world
            .get_mut::<PriceBeliefs>(innkeeper)
            .unwrap()
            .set_sell(Commodity::PreparedFood, 2.0);
        for _ in 0..3 {
            run_behavior(&mut village.world);
        }
        assert_eq!(inventory_of(&village.world, innkeeper, Commodity::PreparedFood), 1.0);
        assert_eq!(inventory_of(&village.world, innkeeper, Commodity::RawFood), 1.0);
    }

    #[test]
    fn test_hunger_grows_on_things() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        let bug = world
            .spawn(ThingBundle::new(KindId::MEATBUG, Position::default(), 30.0))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(grow_hunger);
        schedule.run(&mut world);
        schedule.run(&mut world);

        assert_eq!(world.get::<Vitals>(bug).unwrap().hunger, 2.0);
    }
}
