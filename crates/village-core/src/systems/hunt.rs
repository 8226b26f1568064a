//! Hunt Resolver
//!
//! One hunting step for a thing: pick the nearest edible prey, walk up to
//! it, hit it, and collect the reward once it drops.

use bevy_ecs::prelude::*;

use crate::components::{Commodity, KindId, Position, Thing, Vitals, Weapon};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::ledger::mint;
use crate::output::TickEvents;
use crate::relations::Relations;
use village_events::SimEvent;

use super::compaction::PendingRemovals;
use super::movement::{exit_building, move_toward_point};

/// Where a hunt stands after one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntOutcome {
    /// No prey in range
    SeekingTarget,
    MovingToTarget,
    /// Hit landed, prey still standing
    AttackingTarget,
    /// Prey killed
    Success,
}

/// Advances the hunt of `hunter` (a thing) by one tick.
pub fn hunt(world: &mut World, hunter: Entity) -> Result<HuntOutcome, SimError> {
    let (config, nutrition) = world
        .get_resource::<SimConfig>()
        .map(|config| (config.hunt, config.needs.nutrition))
        .unwrap_or_default();

    exit_building(world, hunter);

    let hunter_position = *world
        .get::<Position>(hunter)
        .ok_or(SimError::UnknownEntity(hunter))?;

    let target = match current_target(world, hunter) {
        Some(target) => target,
        None => {
            let kind = *world
                .get::<KindId>(hunter)
                .ok_or(SimError::UnknownEntity(hunter))?;
            match find_prey(world, hunter, kind, hunter_position, config.search_radius) {
                Some(prey) => {
                    world
                        .resource_mut::<Relations>()
                        .set_hunt_target(hunter, prey);
                    prey
                }
                None => return Ok(HuntOutcome::SeekingTarget),
            }
        }
    };

    let target_position = *world
        .get::<Position>(target)
        .ok_or(SimError::UnknownEntity(target))?;
    if hunter_position.distance_squared(&target_position) >= config.reach * config.reach {
        move_toward_point(world, hunter, target_position)?;
        return Ok(HuntOutcome::MovingToTarget);
    }

    let character = world.resource::<Relations>().embodier_of(hunter);
    let mut damage = config.base_damage;
    if let Some(mut weapon) = character.and_then(|c| world.get_mut::<Weapon>(c)) {
        damage *= 1.0 + weapon.quality;
        weapon.quality *= config.weapon_wear;
    }

    let remaining = {
        let mut vitals = world
            .get_mut::<Vitals>(target)
            .ok_or(SimError::UnknownEntity(target))?;
        vitals.hp -= damage;
        vitals.hp
    };
    if remaining > 0.0 {
        return Ok(HuntOutcome::AttackingTarget);
    }

    // the kill stands even if the reward below fails
    world.resource_mut::<Relations>().clear_hunt_target(hunter);
    if let Some(mut pending) = world.get_resource_mut::<PendingRemovals>() {
        pending.mark(target);
    }
    if let Some(mut events) = world.get_resource_mut::<TickEvents>() {
        events.push(SimEvent::Kill {
            hunter: hunter.to_bits(),
            prey: target.to_bits(),
            character: character.map(Entity::to_bits),
        });
    }
    tracing::debug!(?hunter, prey = ?target, "prey killed");

    match character {
        Some(character) => mint(world, character, Commodity::RawFood, 1.0)?,
        None => {
            if let Some(mut vitals) = world.get_mut::<Vitals>(hunter) {
                vitals.heal(config.critter_heal);
                vitals.feed(nutrition);
            }
        }
    }

    Ok(HuntOutcome::Success)
}

/// The remembered target if it is still a live, unclaimed thing. A stale
/// target is forgotten.
fn current_target(world: &mut World, hunter: Entity) -> Option<Entity> {
    let target = world.resource::<Relations>().hunt_target(hunter)?;
    let alive = world
        .get::<Vitals>(target)
        .is_some_and(Vitals::is_alive);
    let claimed = world
        .get_resource::<PendingRemovals>()
        .is_some_and(|pending| pending.contains(target));

    if alive && !claimed {
        Some(target)
    } else {
        world.resource_mut::<Relations>().clear_hunt_target(hunter);
        None
    }
}

/// Nearest live thing the hunter's kind can eat, strictly within `radius`.
/// Equally distant candidates go to the lower handle.
fn find_prey(
    world: &mut World,
    hunter: Entity,
    kind: KindId,
    position: Position,
    radius: f32,
) -> Option<Entity> {
    let mut query = world.query_filtered::<(Entity, &Position, &KindId, &Vitals), With<Thing>>();
    let relations = world.resource::<Relations>();
    let pending = world.get_resource::<PendingRemovals>();
    let radius_squared = radius * radius;

    let mut best: Option<(f32, Entity)> = None;
    for (entity, prey_position, prey_kind, vitals) in query.iter(world) {
        if entity == hunter
            || !vitals.is_alive()
            || !relations.can_eat(kind, *prey_kind)
            || pending.is_some_and(|p| p.contains(entity))
        {
            continue;
        }
        let distance = position.distance_squared(prey_position);
        if distance >= radius_squared {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_distance, best_entity)) => {
                distance < best_distance || (distance == best_distance && entity < best_entity)
            }
        };
        if closer {
            best = Some((distance, entity));
        }
    }
    best.map(|(_, entity)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Inventory, ThingBundle};

    struct Arena {
        world: World,
        hunter: Entity,
        character: Entity,
    }

    fn arena(quality: f32) -> Arena {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(PendingRemovals::new());
        world.insert_resource(TickEvents::new());
        let mut relations = Relations::new();
        relations.add_food_link(KindId::HUMAN, KindId::MEATBUG);
        relations.add_food_link(KindId::MEATBUG, KindId::TREE);
        world.insert_resource(relations);

        let hunter = world
            .spawn(ThingBundle::new(KindId::HUMAN, Position::new(0.0, 0.0), 100.0))
            .id();
        let character = world
            .spawn((Inventory::new(), Weapon { quality }))
            .id();
        world.resource_mut::<Relations>().embody(character, hunter);

        Arena {
            world,
            hunter,
            character,
        }
    }

    fn spawn_prey(world: &mut World, kind: KindId, x: f32, hp: f32) -> Entity {
        world
            .spawn(ThingBundle::new(kind, Position::new(x, 0.0), hp))
            .id()
    }

    #[test]
    fn test_hunt_kill_scenario() {
        let mut arena = arena(1.0);
        let prey = spawn_prey(&mut arena.world, KindId::MEATBUG, 0.5, 15.0);

        let outcome = hunt(&mut arena.world, arena.hunter).unwrap();

        assert_eq!(outcome, HuntOutcome::Success);
        let weapon = arena.world.get::<Weapon>(arena.character).unwrap();
        assert!((weapon.quality - 0.95).abs() < 1e-6);
        let inventory = arena.world.get::<Inventory>(arena.character).unwrap();
        assert_eq!(inventory.get(Commodity::RawFood), 1.0);
        assert!(arena.world.resource::<PendingRemovals>().contains(prey));
        assert_eq!(arena.world.resource::<TickEvents>().count("kill"), 1);
        assert_eq!(arena.world.resource::<Relations>().hunt_target(arena.hunter), None);
    }

    #[test]
    fn test_weak_hit_leaves_prey_standing() {
        let mut arena = arena(0.0);
        let prey = spawn_prey(&mut arena.world, KindId::MEATBUG, 0.5, 15.0);

        assert_eq!(
            hunt(&mut arena.world, arena.hunter).unwrap(),
            HuntOutcome::AttackingTarget
        );
        assert_eq!(arena.world.get::<Vitals>(prey).unwrap().hp, 5.0);
        assert_eq!(
            hunt(&mut arena.world, arena.hunter).unwrap(),
            HuntOutcome::Success
        );
    }

    #[test]
    fn test_distant_prey_is_approached() {
        let mut arena = arena(0.0);
        let prey = spawn_prey(&mut arena.world, KindId::MEATBUG, 5.0, 15.0);

        assert_eq!(
            hunt(&mut arena.world, arena.hunter).unwrap(),
            HuntOutcome::MovingToTarget
        );
        assert_eq!(
            arena.world.resource::<Relations>().hunt_target(arena.hunter),
            Some(prey)
        );
        let position = arena.world.get::<Position>(arena.hunter).unwrap();
        assert!((position.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_nothing_edible_keeps_seeking() {
        let mut arena = arena(0.0);
        spawn_prey(&mut arena.world, KindId::TREE, 0.5, 30.0);

        assert_eq!(
            hunt(&mut arena.world, arena.hunter).unwrap(),
            HuntOutcome::SeekingTarget
        );
    }

    #[test]
    fn test_prey_outside_radius_is_ignored() {
        let mut arena = arena(0.0);
        spawn_prey(&mut arena.world, KindId::MEATBUG, 1000.0, 15.0);

        assert_eq!(
            hunt(&mut arena.world, arena.hunter).unwrap(),
            HuntOutcome::SeekingTarget
        );
    }

    #[test]
    fn test_nearest_prey_wins() {
        let mut arena = arena(0.0);
        let far = spawn_prey(&mut arena.world, KindId::MEATBUG, 8.0, 15.0);
        let near = spawn_prey(&mut arena.world, KindId::MEATBUG, 3.0, 15.0);

        hunt(&mut arena.world, arena.hunter).unwrap();
        let target = arena.world.resource::<Relations>().hunt_target(arena.hunter);
        assert_eq!(target, Some(near));
        assert_ne!(target, Some(far));
    }

    #[test]
    fn test_vanished_target_is_replaced() {
        let mut arena = arena(0.0);
        let first = spawn_prey(&mut arena.world, KindId::MEATBUG, 3.0, 15.0);
        hunt(&mut arena.world, arena.hunter).unwrap();

        arena.world.despawn(first);
        let second = spawn_prey(&mut arena.world, KindId::MEATBUG, 4.0, 15.0);
        hunt(&mut arena.world, arena.hunter).unwrap();

        assert_eq!(
            arena.world.resource::<Relations>().hunt_target(arena.hunter),
            Some(second)
        );
    }

    #[test]
    fn test_bodiless_hunter_heals_and_eats() {
        let mut arena = arena(0.0);
        let bug = arena
            .world
            .spawn(
                ThingBundle::new(KindId::MEATBUG, Position::new(10.0, 10.0), 30.0).with_vitals(
                    Vitals {
                        hp: 20.0,
                        hp_max: 30.0,
                        hunger: 300.0,
                    },
                ),
            )
            .id();
        arena
            .world
            .spawn(ThingBundle::new(KindId::TREE, Position::new(10.5, 10.0), 5.0));

        assert_eq!(hunt(&mut arena.world, bug).unwrap(), HuntOutcome::Success);
        let vitals = arena.world.get::<Vitals>(bug).unwrap();
        assert_eq!(vitals.hp, 25.0);
        assert_eq!(vitals.hunger, 50.0);
    }

    #[test]
    fn test_hunter_leaves_building_first() {
        let mut arena = arena(0.0);
        let inn = arena
            .world
            .spawn(crate::components::Building::new(
                0,
                0,
                crate::components::BuildingModel::Inn,
            ))
            .id();
        arena
            .world
            .resource_mut::<Relations>()
            .enter(arena.hunter, inn);

        hunt(&mut arena.world, arena.hunter).unwrap();
        assert_eq!(
            arena.world.resource::<Relations>().guest_location(arena.hunter),
            None
        );
    }

    #[test]
    fn test_kill_is_recorded_when_reward_fails() {
        let mut arena = arena(1.0);
        arena.world.entity_mut(arena.character).remove::<Inventory>();
        let prey = spawn_prey(&mut arena.world, KindId::MEATBUG, 0.5, 15.0);

        assert!(hunt(&mut arena.world, arena.hunter).is_err());

        assert!(arena.world.resource::<PendingRemovals>().contains(prey));
        assert_eq!(arena.world.resource::<Relations>().hunt_target(arena.hunter), None);
        assert_eq!(arena.world.resource::<TickEvents>().count("kill"), 1);
    }
}
