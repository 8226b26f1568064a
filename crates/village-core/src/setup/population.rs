//! Population Spawning
//!
//! The reference village: hunters, the three shop owners, alchemists and
//! herbalists, plus meatbug queens and a forest.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::PI;

use crate::components::{
    BuildingModel, Character, CharacterName, Commodity, CurrentActivity, Favourites, Inventory,
    KindId, Personality, Position, PriceBeliefs, Skill, Skills, ThingBundle, Weapon,
};
use crate::config::SimConfig;
use crate::relations::Relations;

const NAMES: &[&str] = &[
    "Aldous", "Brenna", "Cormac", "Dara", "Edwin", "Fenna", "Gideon", "Hestia", "Ivo", "Jorun",
    "Kestrel", "Lorne", "Mabyn", "Nels", "Odo", "Perrin", "Quill", "Rosalind", "Sten", "Tamsin",
];

/// Summary of spawned population
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnSummary {
    pub characters: usize,
    pub queens: usize,
    pub trees: usize,
}

/// Spawns a character with a human body at the origin. Price beliefs start
/// at the configured initial value.
pub fn spawn_character(
    world: &mut World,
    name: impl Into<String>,
    personality: Personality,
    coins: f32,
) -> Entity {
    let (market, population) = world
        .get_resource::<SimConfig>()
        .map(|config| (config.market, config.population))
        .unwrap_or_default();

    let character = world
        .spawn((
            Character,
            CharacterName(name.into()),
            personality,
            Inventory::new().with(Commodity::Coins, coins),
            PriceBeliefs::new(market.initial_belief, market.price_floor),
            CurrentActivity::default(),
            Weapon::default(),
            Skills::default(),
            Favourites::default(),
        ))
        .id();
    let body = world
        .spawn(ThingBundle::new(
            KindId::HUMAN,
            Position::default(),
            population.human_hp,
        ))
        .id();
    world.resource_mut::<Relations>().embody(character, body);
    character
}

/// Spawns the whole reference population and points every character at the
/// shop, inn and forge.
pub fn populate_world(world: &mut World, rng: &mut SmallRng) -> SpawnSummary {
    let population = world
        .get_resource::<SimConfig>()
        .map(|config| config.population)
        .unwrap_or_default();
    let mut names = NAMES.iter().cycle();
    let mut next_name = || names.next().copied().unwrap_or("Villager").to_string();

    for _ in 0..population.hunters {
        let hunter = spawn_character(world, next_name(), Personality::Hunter, 10.0);
        world.entity_mut(hunter).insert(Weapon { quality: 1.0 });
    }

    let innkeeper = spawn_character(world, next_name(), Personality::Innkeeper, 100.0);
    world
        .entity_mut(innkeeper)
        .insert(Skills::default().with(Skill::Cooking, 0.3));
    let inn = super::spawn_building(world, 0, 0, BuildingModel::Inn, innkeeper);

    let shopkeeper = spawn_character(world, next_name(), Personality::Shopkeeper, 100.0);
    let shop = super::spawn_building(world, 3, 3, BuildingModel::Shop, shopkeeper);

    let master = spawn_character(world, next_name(), Personality::WeaponMaster, 10.0);
    let forge = super::spawn_building(world, 3, 0, BuildingModel::WeaponShop, master);

    for _ in 0..population.alchemists {
        spawn_character(world, next_name(), Personality::Alchemist, 100.0);
    }
    for _ in 0..population.herbalists {
        spawn_character(world, next_name(), Personality::Herbalist, 0.0);
    }

    let favourites = Favourites {
        shop: Some(shop),
        inn: Some(inn),
        weapon_shop: Some(forge),
    };
    let mut characters = world.query_filtered::<&mut Favourites, With<Character>>();
    let mut count = 0;
    for mut assigned in characters.iter_mut(world) {
        *assigned = favourites;
        count += 1;
    }

    for _ in 0..population.queens {
        let x = rng.gen::<f32>() * 2.0 * population.queen_spread - population.queen_spread;
        let y = rng.gen::<f32>() * 2.0 * population.queen_spread - population.queen_spread;
        let heading = rng.gen::<f32>() * PI * 2.0;
        world.spawn(
            ThingBundle::new(KindId::MEATBUG_QUEEN, Position::new(x, y), population.queen_hp)
                .with_heading(heading),
        );
    }

    for _ in 0..population.trees {
        let x = standard_normal(rng) * population.forest_spread + population.forest_x;
        let y = standard_normal(rng) * population.forest_spread + population.forest_y;
        let heading = rng.gen::<f32>() * PI * 2.0;
        world.spawn(
            ThingBundle::new(KindId::TREE, Position::new(x, y), population.tree_hp)
                .with_heading(heading),
        );
    }

    SpawnSummary {
        characters: count,
        queens: population.queens as usize,
        trees: population.trees as usize,
    }
}

/// Standard normal sample via the Box-Muller transform.
pub fn standard_normal(rng: &mut SmallRng) -> f32 {
    let u1: f32 = rng.gen::<f32>().max(f32::EPSILON);
    let u2: f32 = rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
