//! Relation Index
//!
//! Associative links between entities, kept as explicit adjacency maps with
//! back-references instead of components pointing at each other. Ordered
//! maps keep every iteration deterministic.

use bevy_ecs::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::components::KindId;

/// All entity relations of the simulation.
#[derive(Resource, Debug, Clone, Default)]
pub struct Relations {
    /// character -> thing
    body: BTreeMap<Entity, Entity>,
    /// thing -> character
    embodier: BTreeMap<Entity, Entity>,
    /// building -> character
    owner: BTreeMap<Entity, Entity>,
    /// character -> buildings
    owned: BTreeMap<Entity, BTreeSet<Entity>>,
    /// thing -> building it is inside
    guest_location: BTreeMap<Entity, Entity>,
    /// building -> thing inside it
    guest: BTreeMap<Entity, Entity>,
    /// hunter thing -> prey thing
    hunt_target: BTreeMap<Entity, Entity>,
    /// prey thing -> hunter things
    hunters: BTreeMap<Entity, BTreeSet<Entity>>,
    /// follower thing -> leader thing
    follow_target: BTreeMap<Entity, Entity>,
    /// leader thing -> follower things
    followers: BTreeMap<Entity, BTreeSet<Entity>>,
    /// (predator kind, prey kind)
    food_hierarchy: BTreeSet<(KindId, KindId)>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    // --- embodiment -------------------------------------------------------

    /// Binds a character to a thing, replacing any previous binding of
    /// either side.
    pub fn embody(&mut self, character: Entity, thing: Entity) {
        if let Some(old_thing) = self.body.remove(&character) {
            self.embodier.remove(&old_thing);
        }
        if let Some(old_character) = self.embodier.remove(&thing) {
            self.body.remove(&old_character);
        }
        self.body.insert(character, thing);
        self.embodier.insert(thing, character);
    }

    pub fn body_of(&self, character: Entity) -> Option<Entity> {
        self.body.get(&character).copied()
    }

    pub fn embodier_of(&self, thing: Entity) -> Option<Entity> {
        self.embodier.get(&thing).copied()
    }

    pub fn is_embodied(&self, thing: Entity) -> bool {
        self.embodier.contains_key(&thing)
    }

    // --- ownership --------------------------------------------------------

    pub fn set_owner(&mut self, building: Entity, character: Entity) {
        if let Some(previous) = self.owner.insert(building, character) {
            if let Some(set) = self.owned.get_mut(&previous) {
                set.remove(&building);
            }
        }
        self.owned.entry(character).or_default().insert(building);
    }

    pub fn owner_of(&self, building: Entity) -> Option<Entity> {
        self.owner.get(&building).copied()
    }

    pub fn buildings_owned_by(&self, character: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.owned
            .get(&character)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    // --- guests -----------------------------------------------------------

    /// Places `thing` inside `building`.
    ///
    /// Returns false without changing anything when the building already
    /// hosts somebody else or `thing` is inside a different building.
    pub fn enter(&mut self, thing: Entity, building: Entity) -> bool {
        match self.guest.get(&building) {
            Some(&current) if current == thing => return true,
            Some(_) => return false,
            None => {}
        }
        if self.guest_location.contains_key(&thing) {
            return false;
        }
        self.guest.insert(building, thing);
        self.guest_location.insert(thing, building);
        true
    }

    /// Removes `thing` from whatever building it is in, returning that building.
    pub fn leave(&mut self, thing: Entity) -> Option<Entity> {
        let building = self.guest_location.remove(&thing)?;
        self.guest.remove(&building);
        Some(building)
    }

    pub fn guest_location(&self, thing: Entity) -> Option<Entity> {
        self.guest_location.get(&thing).copied()
    }

    pub fn guest_of(&self, building: Entity) -> Option<Entity> {
        self.guest.get(&building).copied()
    }

    // --- hunting ----------------------------------------------------------

    pub fn set_hunt_target(&mut self, hunter: Entity, prey: Entity) {
        self.clear_hunt_target(hunter);
        self.hunt_target.insert(hunter, prey);
        self.hunters.entry(prey).or_default().insert(hunter);
    }

    pub fn hunt_target(&self, hunter: Entity) -> Option<Entity> {
        self.hunt_target.get(&hunter).copied()
    }

    pub fn clear_hunt_target(&mut self, hunter: Entity) -> Option<Entity> {
        let prey = self.hunt_target.remove(&hunter)?;
        remove_back_reference(&mut self.hunters, prey, hunter);
        Some(prey)
    }

    pub fn hunters_of(&self, prey: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.hunters
            .get(&prey)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    // --- following --------------------------------------------------------

    pub fn set_follow_target(&mut self, follower: Entity, leader: Entity) {
        self.clear_follow_target(follower);
        self.follow_target.insert(follower, leader);
        self.followers.entry(leader).or_default().insert(follower);
    }

    pub fn follow_target(&self, follower: Entity) -> Option<Entity> {
        self.follow_target.get(&follower).copied()
    }

    pub fn clear_follow_target(&mut self, follower: Entity) -> Option<Entity> {
        let leader = self.follow_target.remove(&follower)?;
        remove_back_reference(&mut self.followers, leader, follower);
        Some(leader)
    }

    pub fn followers_of(&self, leader: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.followers
            .get(&leader)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn has_followers(&self, leader: Entity) -> bool {
        self.followers.contains_key(&leader)
    }

    // --- food hierarchy ---------------------------------------------------

    pub fn add_food_link(&mut self, predator: KindId, prey: KindId) {
        self.food_hierarchy.insert((predator, prey));
    }

    pub fn can_eat(&self, predator: KindId, prey: KindId) -> bool {
        self.food_hierarchy.contains(&(predator, prey))
    }

    // --- deletion ---------------------------------------------------------

    /// Drops every relation touching a thing that is about to be despawned.
    pub fn forget_thing(&mut self, thing: Entity) {
        if let Some(character) = self.embodier.remove(&thing) {
            self.body.remove(&character);
        }
        self.leave(thing);
        self.clear_hunt_target(thing);
        if let Some(hunters) = self.hunters.remove(&thing) {
            for hunter in hunters {
                self.hunt_target.remove(&hunter);
            }
        }
        self.clear_follow_target(thing);
        if let Some(followers) = self.followers.remove(&thing) {
            for follower in followers {
                self.follow_target.remove(&follower);
            }
        }
    }
}

fn remove_back_reference(
    index: &mut BTreeMap<Entity, BTreeSet<Entity>>,
    key: Entity,
    value: Entity,
) {
    if let Some(set) = index.get_mut(&key) {
        set.remove(&value);
        if set.is_empty() {
            index.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(world: &mut World, n: usize) -> Vec<Entity> {
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_embodiment_is_one_to_one() {
        let mut world = World::new();
        let e = entities(&mut world, 3);
        let (alice, bob, body) = (e[0], e[1], e[2]);
        let mut relations = Relations::new();

        relations.embody(alice, body);
        relations.embody(bob, body);

        assert_eq!(relations.embodier_of(body), Some(bob));
        assert_eq!(relations.body_of(bob), Some(body));
        assert_eq!(relations.body_of(alice), None);
    }

    #[test]
    fn test_ownership_back_reference() {
        let mut world = World::new();
        let e = entities(&mut world, 3);
        let (owner, inn, shop) = (e[0], e[1], e[2]);
        let mut relations = Relations::new();

        relations.set_owner(inn, owner);
        relations.set_owner(shop, owner);

        assert_eq!(relations.owner_of(inn), Some(owner));
        let owned: Vec<_> = relations.buildings_owned_by(owner).collect();
        assert_eq!(owned.len(), 2);
    }

    #[test]
    fn test_building_hosts_one_guest() {
        let mut world = World::new();
        let e = entities(&mut world, 3);
        let (first, second, inn) = (e[0], e[1], e[2]);
        let mut relations = Relations::new();

        assert!(relations.enter(first, inn));
        assert!(relations.enter(first, inn));
        assert!(!relations.enter(second, inn));
        assert_eq!(relations.guest_of(inn), Some(first));

        assert_eq!(relations.leave(first), Some(inn));
        assert!(relations.enter(second, inn));
        assert_eq!(relations.guest_location(second), Some(inn));
    }

    #[test]
    fn test_guest_cannot_be_in_two_buildings() {
        let mut world = World::new();
        let e = entities(&mut world, 3);
        let (guest, inn, shop) = (e[0], e[1], e[2]);
        let mut relations = Relations::new();

        assert!(relations.enter(guest, inn));
        assert!(!relations.enter(guest, shop));
        assert_eq!(relations.guest_of(shop), None);
    }

    #[test]
    fn test_forget_thing_clears_all_links() {
        let mut world = World::new();
        let e = entities(&mut world, 5);
        let (prey, hunter, child, character, inn) = (e[0], e[1], e[2], e[3], e[4]);
        let mut relations = Relations::new();

        relations.embody(character, prey);
        relations.enter(prey, inn);
        relations.set_hunt_target(hunter, prey);
        relations.set_follow_target(child, prey);

        relations.forget_thing(prey);

        assert_eq!(relations.body_of(character), None);
        assert_eq!(relations.guest_of(inn), None);
        assert_eq!(relations.hunt_target(hunter), None);
        assert_eq!(relations.follow_target(child), None);
        assert!(!relations.has_followers(prey));
        assert_eq!(relations.hunters_of(prey).count(), 0);
    }

    #[test]
    fn test_food_hierarchy_is_directed() {
        let mut relations = Relations::new();
        relations.add_food_link(KindId::HUMAN, KindId::MEATBUG);

        assert!(relations.can_eat(KindId::HUMAN, KindId::MEATBUG));
        assert!(!relations.can_eat(KindId::MEATBUG, KindId::HUMAN));
    }
}
