//! Activity triggers
//!
//! Predicates that decide whether a character wants to start (or keep up)
//! an errand. Any trigger whose building or counterparty is missing reads
//! as false.

use bevy_ecs::prelude::*;

use crate::components::{Commodity, Weapon};
use crate::config::SimConfig;
use crate::queries::{
    buy_belief, favourites_of, inventory_of, owner_of_opt, sell_belief, stockpile_target,
};

/// Worn weapon, and coins for a few repairs at the master's price.
pub fn desire_weapon_repair(world: &World, character: Entity, config: &SimConfig) -> bool {
    let master = owner_of_opt(world, favourites_of(world, character).weapon_shop);
    let Some(price) = master.and_then(|m| sell_belief(world, m, Commodity::WeaponService)) else {
        return false;
    };
    let Some(weapon) = world.get::<Weapon>(character) else {
        return false;
    };
    let coins = inventory_of(world, character, Commodity::Coins);

    weapon.quality <= config.behavior.repair_quality_threshold
        && price * config.behavior.repair_affordability <= coins
}

/// Not above the food target, the inn has a meal ready, and the character
/// can pay for a couple of them.
pub fn desire_buy_food(world: &World, character: Entity, config: &SimConfig) -> bool {
    let Some(innkeeper) = owner_of_opt(world, favourites_of(world, character).inn) else {
        return false;
    };
    let Some(price) = sell_belief(world, innkeeper, Commodity::PreparedFood) else {
        return false;
    };
    let held = inventory_of(world, character, Commodity::PreparedFood);
    let target = stockpile_target(world, character, Commodity::PreparedFood);
    let coins = inventory_of(world, character, Commodity::Coins);

    held <= target
        && inventory_of(world, innkeeper, Commodity::PreparedFood) >= 1.0
        && price * config.behavior.food_affordability <= coins
}

/// Raw food surplus, and a shop paying more than the hunter's bottom price.
pub fn hunter_desire_shopping(world: &World, character: Entity, config: &SimConfig) -> bool {
    surplus_worth_selling(world, character, Commodity::RawFood, config)
}

/// Potions to sell at a decent price, or material to restock.
pub fn alchemist_desire_shopping(world: &World, character: Entity, config: &SimConfig) -> bool {
    if owner_of_opt(world, favourites_of(world, character).shop).is_none() {
        return false;
    }
    let material = inventory_of(world, character, Commodity::PotionMaterial);
    let material_target = stockpile_target(world, character, Commodity::PotionMaterial);

    surplus_worth_selling(world, character, Commodity::Potion, config) || material < material_target
}

fn surplus_worth_selling(
    world: &World,
    character: Entity,
    commodity: Commodity,
    config: &SimConfig,
) -> bool {
    let shopkeeper = owner_of_opt(world, favourites_of(world, character).shop);
    let Some(quote) = shopkeeper.and_then(|s| buy_belief(world, s, commodity)) else {
        return false;
    };
    let surplus =
        inventory_of(world, character, commodity) - stockpile_target(world, character, commodity);
    surplus > config.behavior.surplus_margin && quote > bottom_price(world, character, config)
}

/// Lowest quote a seller accepts: its own prepared food buy belief, scaled
/// down.
pub fn bottom_price(world: &World, character: Entity, config: &SimConfig) -> f32 {
    buy_belief(world, character, Commodity::PreparedFood).unwrap_or(0.0)
        / config.trading.bottom_price_divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        AiModelRegistry, Building, BuildingModel, Favourites, Inventory, Personality, PriceBeliefs,
    };
    use crate::relations::Relations;

    struct Village {
        world: World,
        shop: Entity,
        inn: Entity,
        forge: Entity,
    }

    fn village() -> Village {
        let mut world = World::new();
        world.insert_resource(AiModelRegistry::standard());
        world.insert_resource(Relations::new());

        let shop = world.spawn(Building::new(0, 0, BuildingModel::Shop)).id();
        let inn = world.spawn(Building::new(1, 0, BuildingModel::Inn)).id();
        let forge = world.spawn(Building::new(2, 0, BuildingModel::WeaponShop)).id();
        for building in [shop, inn, forge] {
            let owner = world
                .spawn((
                    Inventory::new().with(Commodity::PreparedFood, 5.0),
                    PriceBeliefs::new(1.0, 1e-5),
                ))
                .id();
            world.resource_mut::<Relations>().set_owner(building, owner);
        }

        Village {
            world,
            shop,
            inn,
            forge,
        }
    }

    fn resident(village: &mut Village, personality: Personality, inventory: Inventory) -> Entity {
        let favourites = Favourites {
            shop: Some(village.shop),
            inn: Some(village.inn),
            weapon_shop: Some(village.forge),
        };
        village
            .world
            .spawn((
                personality,
                inventory,
                PriceBeliefs::new(1.0, 1e-5),
                Weapon { quality: 0.0 },
                favourites,
            ))
            .id()
    }

    #[test]
    fn test_weapon_repair_needs_coins() {
        let config = SimConfig::default();
        let mut village = village();
        let poor = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::Coins, 2.9),
        );
        let rich = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::Coins, 3.0),
        );

        assert!(!desire_weapon_repair(&village.world, poor, &config));
        assert!(desire_weapon_repair(&village.world, rich, &config));
    }

    #[test]
    fn test_buy_food_below_target() {
        let config = SimConfig::default();
        let mut village = village();
        let hungry = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::Coins, 5.0),
        );
        let stocked = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new()
                .with(Commodity::Coins, 5.0)
                .with(Commodity::PreparedFood, 4.0),
        );

        assert!(desire_buy_food(&village.world, hungry, &config));
        assert!(!desire_buy_food(&village.world, stocked, &config));
    }

    #[test]
    fn test_buy_food_needs_meals_at_the_inn() {
        let config = SimConfig::default();
        let mut village = village();
        let innkeeper = village.world.resource::<Relations>().owner_of(village.inn).unwrap();
        village
            .world
            .get_mut::<Inventory>(innkeeper)
            .unwrap()
            .withdraw(Commodity::PreparedFood, 5.0)
            .unwrap();
        let hungry = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::Coins, 5.0),
        );

        assert!(!desire_buy_food(&village.world, hungry, &config));
    }

    #[test]
    fn test_hunter_shopping_on_surplus() {
        let config = SimConfig::default();
        let mut village = village();
        let hunter = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::RawFood, 4.0),
        );
        let short = resident(
            &mut village,
            Personality::Hunter,
            Inventory::new().with(Commodity::RawFood, 3.0),
        );

        assert!(hunter_desire_shopping(&village.world, hunter, &config));
        assert!(!hunter_desire_shopping(&village.world, short, &config));
    }

    #[test]
    fn test_alchemist_restocks_material() {
        let config = SimConfig::default();
        let mut village = village();
        let alchemist = resident(&mut village, Personality::Alchemist, Inventory::new());

        assert!(alchemist_desire_shopping(&village.world, alchemist, &config));
    }

    #[test]
    fn test_missing_buildings_read_false() {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(AiModelRegistry::standard());
        world.insert_resource(Relations::new());
        let loner = world
            .spawn((
                Personality::Alchemist,
                Inventory::new().with(Commodity::Coins, 100.0),
                PriceBeliefs::new(1.0, 1e-5),
                Weapon { quality: 0.0 },
            ))
            .id();

        assert!(!desire_weapon_repair(&world, loner, &config));
        assert!(!desire_buy_food(&world, loner, &config));
        assert!(!alchemist_desire_shopping(&world, loner, &config));
        assert!(!hunter_desire_shopping(&world, loner, &config));
    }
}
