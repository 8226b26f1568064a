//! Simulation driver
//!
//! Owns the world and the fixed-order tick schedule, and exposes the
//! read-only query surface used by display collaborators.

use bevy_ecs::prelude::*;
use tracing::info;

use crate::components::{
    Building, Character, Commodity, CurrentActivity, Inventory, KindId, Position, PriceBeliefs,
    Thing, Vitals,
};
use crate::config::SimConfig;
use crate::ledger::{settle_credit, CreditBook, Debt};
use crate::market::maintain_markets;
use crate::output::{capture_snapshot, collect_tick_stats, SimulationStats, StatsCollector};
use crate::queries::{sorted_buildings, sorted_characters, sorted_things};
use crate::relations::Relations;
use crate::setup::{insert_core_resources, populate_world, SpawnSummary};
use crate::systems::{
    advance_clock, breed_queens, consume_provisions, despawn_pending, grow_hunger,
    jitter_headings, move_critters, run_behavior, run_trading_rounds, SimClock,
};
use crate::SimRng;
use village_events::WorldSnapshot;

/// Builds the per-tick schedule. Systems run strictly in this order.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_clock,
            run_behavior,
            grow_hunger,
            despawn_pending,
            run_trading_rounds,
            settle_credit,
            consume_provisions,
            maintain_markets,
            move_critters,
            jitter_headings,
            breed_queens,
            collect_tick_stats,
        )
            .chain(),
    );
    schedule
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    /// The reference village, seeded for critter and tree placement.
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let mut simulation = Self::empty(config, seed);
        let summary = simulation
            .world
            .resource_scope(|world, mut rng: Mut<SimRng>| populate_world(world, &mut rng.0));
        log_population(&summary);
        simulation
    }

    /// Resources only, no entities. Callers spawn their own population.
    pub fn empty(config: SimConfig, seed: u64) -> Self {
        let mut world = World::new();
        insert_core_resources(&mut world, &config, seed);
        Self {
            world,
            schedule: build_schedule(),
        }
    }

    /// Advance by one tick.
    pub fn tick(&mut self) {
        self.schedule.run(&mut self.world);
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn tick_count(&self) -> u64 {
        self.world.resource::<SimClock>().tick
    }

    pub fn characters(&mut self) -> Vec<Entity> {
        sorted_characters(&mut self.world)
    }

    pub fn things(&mut self) -> Vec<Entity> {
        sorted_things(&mut self.world)
    }

    pub fn buildings(&mut self) -> Vec<Entity> {
        sorted_buildings(&mut self.world)
    }

    pub fn delayed_transactions(&self) -> Vec<Debt> {
        self.world.resource::<CreditBook>().debts()
    }

    pub fn position(&self, thing: Entity) -> Option<Position> {
        self.world.get::<Position>(thing).copied()
    }

    pub fn kind_of(&self, thing: Entity) -> Option<KindId> {
        self.world.get::<KindId>(thing).copied()
    }

    /// Amount held; zero for unknown characters.
    pub fn inventory(&self, character: Entity, commodity: Commodity) -> f32 {
        self.world
            .get::<Inventory>(character)
            .map_or(0.0, |inventory| inventory.get(commodity))
    }

    pub fn activity(&self, character: Entity) -> Option<CurrentActivity> {
        self.world.get::<CurrentActivity>(character).copied()
    }

    pub fn vitals(&self, thing: Entity) -> Option<Vitals> {
        self.world.get::<Vitals>(thing).copied()
    }

    /// `(buy, sell)` beliefs.
    pub fn price_beliefs(&self, character: Entity, commodity: Commodity) -> Option<(f32, f32)> {
        self.world
            .get::<PriceBeliefs>(character)
            .map(|beliefs| (beliefs.buy(commodity), beliefs.sell(commodity)))
    }

    pub fn body_of(&self, character: Entity) -> Option<Entity> {
        self.world.resource::<Relations>().body_of(character)
    }

    pub fn is_character(&self, entity: Entity) -> bool {
        self.world.get::<Character>(entity).is_some()
    }

    pub fn is_thing(&self, entity: Entity) -> bool {
        self.world.get::<Thing>(entity).is_some()
    }

    pub fn is_building(&self, entity: Entity) -> bool {
        self.world.get::<Building>(entity).is_some()
    }

    pub fn snapshot(&mut self) -> WorldSnapshot {
        capture_snapshot(&mut self.world)
    }

    pub fn stats(&self) -> SimulationStats {
        self.world
            .resource::<StatsCollector>()
            .generate_stats(self.tick_count())
    }
}

fn log_population(summary: &SpawnSummary) {
    info!(
        characters = summary.characters,
        queens = summary.queens,
        trees = summary.trees,
        "village populated"
    );
}
