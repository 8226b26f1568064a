//! Timed activities
//!
//! Each handler runs once per tick while its activity is current. The timer
//! counts ticks spent so far and the work completes once it exceeds the
//! activity's duration.

use bevy_ecs::prelude::*;

use crate::components::{
    Activity, Commodity, CurrentActivity, PriceBeliefs, Skill, Skills, Weapon,
};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::ledger::{mint, produce, transfer};
use crate::queries::{activity_of, sell_belief};

use super::movement::exit_building;

fn config(world: &World) -> SimConfig {
    world.get_resource::<SimConfig>().cloned().unwrap_or_default()
}

/// Switches a character to `activity` with a fresh timer.
pub fn start_activity(world: &mut World, character: Entity, activity: Activity) {
    if let Some(mut current) = world.get_mut::<CurrentActivity>(character) {
        current.start(activity);
    }
}

/// Back to idle.
pub fn reset_activity(world: &mut World, character: Entity) {
    if let Some(mut current) = world.get_mut::<CurrentActivity>(character) {
        current.reset();
    }
}

fn advance_timer(world: &mut World, character: Entity) {
    if let Some(mut current) = world.get_mut::<CurrentActivity>(character) {
        current.advance();
    }
}

/// Ticks an activity along; runs `complete` and resets once the timer
/// passes `duration`.
fn timed<F>(world: &mut World, character: Entity, duration: u32, complete: F) -> Result<(), SimError>
where
    F: FnOnce(&mut World) -> Result<(), SimError>,
{
    if activity_of(world, character).timer > duration {
        complete(world)?;
        reset_activity(world, character);
    } else {
        advance_timer(world, character);
    }
    Ok(())
}

/// Weapon repair at the master's forge.
///
/// On the first tick the character pays the master's current price and the
/// master marks the price up. Once the timer passes the repair duration the
/// weapon gains quality and the body steps out of the forge.
pub fn repair_weapon(
    world: &mut World,
    character: Entity,
    master: Entity,
    body: Entity,
) -> Result<(), SimError> {
    let config = config(world);
    let timer = activity_of(world, character).timer;

    if timer == 0 {
        let price = sell_belief(world, master, Commodity::WeaponService)
            .ok_or(SimError::UnknownEntity(master))?;
        transfer(world, character, master, Commodity::Coins, price)?;
        if let Some(mut beliefs) = world.get_mut::<PriceBeliefs>(master) {
            beliefs.set_sell(
                Commodity::WeaponService,
                price * config.market.weapon_service_markup,
            );
        }
        tracing::trace!(?character, ?master, price, "repair paid");
        advance_timer(world, character);
        return Ok(());
    }

    timed(world, character, config.behavior.repair_duration, |world| {
        if let Some(mut weapon) = world.get_mut::<Weapon>(character) {
            weapon.quality += config.behavior.repair_bonus;
        }
        exit_building(world, body);
        Ok(())
    })
}

/// Brews one potion from one unit of material.
pub fn make_potion(world: &mut World, character: Entity) -> Result<(), SimError> {
    let duration = config(world).behavior.brewing_duration;
    timed(world, character, duration, |world| {
        produce(
            world,
            character,
            Commodity::PotionMaterial,
            1.0,
            Commodity::Potion,
            1.0,
        )
    })
}

/// Cooks one raw food into one portion plus one per full step of cooking
/// skill.
pub fn prepare_food(world: &mut World, character: Entity) -> Result<(), SimError> {
    let config = config(world);
    let skill = world
        .get::<Skills>(character)
        .map_or(0.0, |skills| skills.get(Skill::Cooking));
    let portions = 1.0 + (skill / config.behavior.cooking_skill_step).floor();

    timed(world, character, config.behavior.cooking_duration, |world| {
        produce(
            world,
            character,
            Commodity::RawFood,
            1.0,
            Commodity::PreparedFood,
            portions,
        )
    })
}

/// Picks one unit of potion material out of thin air.
pub fn gather_potion_material(world: &mut World, character: Entity) -> Result<(), SimError> {
    let duration = config(world).behavior.gathering_duration;
    timed(world, character, duration, |world| {
        mint(world, character, Commodity::PotionMaterial, 1.0)
    })
}
