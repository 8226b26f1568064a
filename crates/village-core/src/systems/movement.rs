//! Movement
//!
//! Walking characters' bodies toward points and buildings, and the per-tick
//! wander of critters that nobody embodies.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::HashMap;

use crate::components::{Building, Heading, KindId, KindRegistry, Position, Thing};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::relations::Relations;
use crate::SimRng;

/// Whether a walk reached its destination this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Completed,
    InProgress,
}

impl MoveResult {
    pub fn is_complete(self) -> bool {
        self == MoveResult::Completed
    }
}

/// Advances `position` by at most `step` toward `target`, snapping onto it
/// when it is closer than one step.
pub fn step_toward(position: &mut Position, target: Position, step: f32) -> MoveResult {
    let dx = target.x - position.x;
    let dy = target.y - position.y;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance < step || distance == 0.0 {
        *position = target;
        return MoveResult::Completed;
    }
    if step <= 0.0 {
        return MoveResult::InProgress;
    }

    position.x += dx / distance * step;
    position.y += dy / distance * step;
    MoveResult::InProgress
}

/// Moves a thing one walking step toward `target`.
pub fn move_toward_point(
    world: &mut World,
    thing: Entity,
    target: Position,
) -> Result<MoveResult, SimError> {
    let step = world
        .get_resource::<SimConfig>()
        .map(|config| config.movement.step)
        .unwrap_or_default();
    let mut position = world
        .get_mut::<Position>(thing)
        .ok_or(SimError::UnknownEntity(thing))?;
    Ok(step_toward(&mut position, target, step))
}

/// Walks a thing to a building's door and takes it inside.
///
/// A thing sheltering in some other building first steps out, which costs
/// the tick. Arriving at an occupied building leaves the thing waiting at the
/// door until the guest leaves.
pub fn move_toward_building(
    world: &mut World,
    thing: Entity,
    building: Entity,
) -> Result<MoveResult, SimError> {
    let door = world
        .get::<Building>(building)
        .ok_or(SimError::UnknownEntity(building))?
        .door();

    let location = world.resource::<Relations>().guest_location(thing);
    match location {
        Some(current) if current == building => Ok(MoveResult::Completed),
        Some(_) => {
            exit_building(world, thing);
            Ok(MoveResult::InProgress)
        }
        None => {
            if !move_toward_point(world, thing, door)?.is_complete() {
                return Ok(MoveResult::InProgress);
            }
            if world.resource_mut::<Relations>().enter(thing, building) {
                Ok(MoveResult::Completed)
            } else {
                Ok(MoveResult::InProgress)
            }
        }
    }
}

/// Takes a thing out of its building, leaving it on the doorstep.
pub fn exit_building(world: &mut World, thing: Entity) -> Option<Entity> {
    let building = world.resource_mut::<Relations>().leave(thing)?;
    let door = world.get::<Building>(building).map(Building::door);
    if let (Some(door), Some(mut position)) = (door, world.get_mut::<Position>(thing)) {
        *position = door;
    }
    Some(building)
}

/// System: wander and follow for every thing without an embodier.
///
/// Leader positions are read before any critter moves, so a follower always
/// steers toward where its leader stood at the start of the phase.
pub fn move_critters(
    config: Res<SimConfig>,
    kinds: Res<KindRegistry>,
    relations: Res<Relations>,
    mut things: Query<(Entity, &KindId, &mut Position, &Heading), With<Thing>>,
) {
    let relations: &Relations = &relations;
    let kinds: &KindRegistry = &kinds;
    let steer = config.movement.steer;

    let leaders: HashMap<Entity, Position> = things
        .iter()
        .filter(|(entity, ..)| relations.has_followers(*entity))
        .map(|(entity, _, position, _)| (entity, *position))
        .collect();
    let leaders = &leaders;

    things
        .par_iter_mut()
        .for_each(|(entity, kind, mut position, heading)| {
            if relations.is_embodied(entity) {
                return;
            }
            let speed = kinds.speed(*kind);
            if speed == 0.0 {
                return;
            }

            let wander_x = heading.0.sin() * steer;
            let wander_y = -heading.0.cos() * steer;

            let (mut follow_x, mut follow_y) = (0.0, 0.0);
            if let Some(leader) = relations
                .follow_target(entity)
                .and_then(|leader| leaders.get(&leader))
            {
                let dx = leader.x - position.x;
                let dy = leader.y - position.y;
                let length = (dx * dx + dy * dy).sqrt();
                let (nx, ny) = if length > speed {
                    (dx / length, dy / length)
                } else {
                    (dx, dy)
                };
                follow_x = nx * steer;
                follow_y = ny * steer;
            }

            position.x += (wander_x + follow_x) * speed;
            position.y += (wander_y + follow_y) * speed;
        });
}

/// System: random heading drift for unembodied things.
pub fn jitter_headings(
    config: Res<SimConfig>,
    relations: Res<Relations>,
    mut rng: ResMut<SimRng>,
    mut headings: Query<(Entity, &mut Heading), With<Thing>>,
) {
    let jitter = config.movement.heading_jitter;
    for (entity, mut heading) in headings.iter_mut() {
        if relations.is_embodied(entity) {
            continue;
        }
        heading.0 += jitter * rng.0.gen::<f32>() - jitter / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BuildingModel, ThingBundle};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn world_with_building() -> (World, Entity, Entity) {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(Relations::new());
        let building = world
            .spawn(Building::new(0, 0, BuildingModel::Shop))
            .id();
        let walker = world
            .spawn(ThingBundle::new(
                KindId::HUMAN,
                Position::new(0.25, 0.0),
                100.0,
            ))
            .id();
        (world, building, walker)
    }

    #[test]
    fn test_step_toward_moves_fixed_distance() {
        let mut position = Position::new(0.0, 0.0);
        let result = step_toward(&mut position, Position::new(3.0, 4.0), 0.5);

        assert_eq!(result, MoveResult::InProgress);
        assert!((position.x - 0.3).abs() < 1e-6);
        assert!((position.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward_snaps_when_close() {
        let mut position = Position::new(0.0, 0.05);
        let target = Position::new(0.0, 0.0);

        assert_eq!(step_toward(&mut position, target, 0.1), MoveResult::Completed);
        assert_eq!(position, target);
    }

    #[test]
    fn test_step_toward_zero_distance_completes() {
        let mut position = Position::new(2.0, 2.0);
        assert_eq!(
            step_toward(&mut position, Position::new(2.0, 2.0), 0.1),
            MoveResult::Completed
        );
    }

    #[test]
    fn test_walk_into_building() {
        let (mut world, building, walker) = world_with_building();

        let mut steps = 0;
        while !move_toward_building(&mut world, walker, building)
            .unwrap()
            .is_complete()
        {
            steps += 1;
            assert!(steps < 10);
        }

        assert_eq!(
            world.resource::<Relations>().guest_location(walker),
            Some(building)
        );
        // already inside
        assert_eq!(
            move_toward_building(&mut world, walker, building).unwrap(),
            MoveResult::Completed
        );
    }

    #[test]
    fn test_occupied_building_makes_walker_wait() {
        let (mut world, building, walker) = world_with_building();
        let occupant = world
            .spawn(ThingBundle::new(KindId::HUMAN, Position::new(0.0, 0.0), 100.0))
            .id();
        world.resource_mut::<Relations>().enter(occupant, building);

        for _ in 0..5 {
            assert_eq!(
                move_toward_building(&mut world, walker, building).unwrap(),
                MoveResult::InProgress
            );
        }
        assert_eq!(world.resource::<Relations>().guest_location(walker), None);
    }

    #[test]
    fn test_leaving_other_building_costs_a_tick() {
        let (mut world, building, walker) = world_with_building();
        let inn = world.spawn(Building::new(5, 5, BuildingModel::Inn)).id();
        world.resource_mut::<Relations>().enter(walker, inn);

        assert_eq!(
            move_toward_building(&mut world, walker, building).unwrap(),
            MoveResult::InProgress
        );
        assert_eq!(world.resource::<Relations>().guest_location(walker), None);
        assert_eq!(*world.get::<Position>(walker).unwrap(), Position::new(5.0, 5.0));
    }

    #[test]
    fn test_unknown_building_is_error() {
        let (mut world, _, walker) = world_with_building();
        let ghost = world.spawn_empty().id();
        world.despawn(ghost);

        assert_eq!(
            move_toward_building(&mut world, walker, ghost),
            Err(SimError::UnknownEntity(ghost))
        );
    }

    #[test]
    fn test_follower_steers_toward_leader() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(KindRegistry::standard());
        world.insert_resource(Relations::new());

        let queen = world
            .spawn(ThingBundle::new(
                KindId::MEATBUG_QUEEN,
                Position::new(10.0, 0.0),
                300.0,
            ))
            .id();
        let child = world
            .spawn(ThingBundle::new(KindId::MEATBUG, Position::new(0.0, 0.0), 30.0))
            .id();
        world
            .resource_mut::<Relations>()
            .set_follow_target(child, queen);

        let mut schedule = Schedule::default();
        schedule.add_systems(move_critters);
        schedule.run(&mut world);

        let position = world.get::<Position>(child).unwrap();
        // heading 0 wanders toward -y, the leader pulls toward +x
        assert!(position.x > 0.0);
        assert!(position.y < 0.0);
    }

    #[test]
    fn test_embodied_and_rooted_things_stay_put() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(KindRegistry::standard());
        world.insert_resource(Relations::new());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(7)));

        let body = world
            .spawn(ThingBundle::new(KindId::HUMAN, Position::new(1.0, 1.0), 100.0))
            .id();
        let tree = world
            .spawn(ThingBundle::new(KindId::TREE, Position::new(2.0, 2.0), 30.0))
            .id();
        let character = world.spawn_empty().id();
        world.resource_mut::<Relations>().embody(character, body);

        let mut schedule = Schedule::default();
        schedule.add_systems((move_critters, jitter_headings).chain());
        schedule.run(&mut world);

        assert_eq!(*world.get::<Position>(body).unwrap(), Position::new(1.0, 1.0));
        assert_eq!(world.get::<Heading>(body).unwrap().0, 0.0);
        assert_eq!(*world.get::<Position>(tree).unwrap(), Position::new(2.0, 2.0));
    }
}
