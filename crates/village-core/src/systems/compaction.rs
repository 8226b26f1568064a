//! Deferred deletion of things killed during the behavior phase.

use bevy_ecs::prelude::*;

use crate::relations::Relations;

/// Things marked for removal, despawned together once the phase is over.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingRemovals {
    things: Vec<Entity>,
}

impl PendingRemovals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a thing for removal; marking twice is harmless.
    pub fn mark(&mut self, thing: Entity) {
        if !self.things.contains(&thing) {
            self.things.push(thing);
        }
    }

    pub fn contains(&self, thing: Entity) -> bool {
        self.things.contains(&thing)
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    fn take(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.things)
    }
}

/// System: drops relations of marked things and despawns them.
pub fn despawn_pending(
    mut commands: Commands,
    mut pending: ResMut<PendingRemovals>,
    mut relations: ResMut<Relations>,
) {
    let removed = pending.take();
    if removed.is_empty() {
        return;
    }
    for thing in &removed {
        relations.forget_thing(*thing);
        if let Some(mut entity) = commands.get_entity(*thing) {
            entity.despawn();
        }
    }
    tracing::debug!(count = removed.len(), "despawned things");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_things_are_despawned_and_forgotten() {
        let mut world = World::new();
        world.insert_resource(Relations::new());
        world.insert_resource(PendingRemovals::new());

        let prey = world.spawn_empty().id();
        let hunter = world.spawn_empty().id();
        world
            .resource_mut::<Relations>()
            .set_hunt_target(hunter, prey);
        world.resource_mut::<PendingRemovals>().mark(prey);
        world.resource_mut::<PendingRemovals>().mark(prey);
        assert_eq!(world.resource::<PendingRemovals>().len(), 1);

        let mut schedule = Schedule::default();
        schedule.add_systems(despawn_pending);
        schedule.run(&mut world);

        assert!(world.get_entity(prey).is_none());
        assert!(world.get_entity(hunter).is_some());
        assert_eq!(world.resource::<Relations>().hunt_target(hunter), None);
        assert!(world.resource::<PendingRemovals>().is_empty());
    }
}
