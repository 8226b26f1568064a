//! Consumption System
//!
//! Characters eat a prepared meal once their body is hungry enough and drink
//! a potion once it drops below half health.

use bevy_ecs::prelude::*;

use crate::components::{Character, Commodity, Inventory, Thing, Vitals};
use crate::config::SimConfig;
use crate::output::CommodityFlows;
use crate::relations::Relations;

/// System: eating and drinking.
pub fn consume_provisions(
    config: Res<SimConfig>,
    relations: Res<Relations>,
    mut flows: ResMut<CommodityFlows>,
    mut characters: Query<(Entity, &mut Inventory), With<Character>>,
    mut bodies: Query<&mut Vitals, With<Thing>>,
) {
    let needs = config.needs;

    for (character, mut inventory) in characters.iter_mut() {
        let Some(body) = relations.body_of(character) else {
            continue;
        };
        let Ok(mut vitals) = bodies.get_mut(body) else {
            continue;
        };

        if vitals.hunger > needs.eat_threshold
            && inventory.withdraw(Commodity::PreparedFood, 1.0).is_ok()
        {
            flows.record_destroyed(Commodity::PreparedFood, 1.0);
            vitals.feed(needs.nutrition);
            vitals.heal(needs.meal_heal);
        }

        if vitals.hp < vitals.hp_max * needs.potion_hp_fraction
            && inventory.withdraw(Commodity::Potion, 1.0).is_ok()
        {
            flows.record_destroyed(Commodity::Potion, 1.0);
            vitals.heal(needs.potion_heal);
        }
    }
}
