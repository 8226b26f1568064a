//! Queen reproduction: each queen may lay one meatbug per tick, which then
//! follows her around.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::{KindId, Position, Thing, ThingBundle};
use crate::config::SimConfig;
use crate::output::TickEvents;
use crate::relations::Relations;
use crate::SimRng;
use village_events::SimEvent;

/// System: queens roll for offspring.
pub fn breed_queens(
    mut commands: Commands,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut relations: ResMut<Relations>,
    mut events: ResMut<TickEvents>,
    queens: Query<(Entity, &KindId, &Position), With<Thing>>,
) {
    let population = config.population;
    let mut mothers: Vec<(Entity, Position)> = queens
        .iter()
        .filter(|(_, kind, _)| **kind == KindId::MEATBUG_QUEEN)
        .map(|(entity, _, position)| (entity, *position))
        .collect();
    mothers.sort_by_key(|(entity, _)| *entity);

    for (mother, position) in mothers {
        if rng.0.gen::<f32>() >= population.birth_chance {
            continue;
        }
        let child = commands
            .spawn(ThingBundle::new(
                KindId::MEATBUG,
                position,
                population.offspring_hp,
            ))
            .id();
        relations.set_follow_target(child, mother);
        events.push(SimEvent::Birth {
            mother: mother.to_bits(),
            child: child.to_bits(),
        });
    }
}
