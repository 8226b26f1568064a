//! Statistics Output
//!
//! Collects per-tick trade, settlement and kill counts plus outstanding
//! debt, for the periodic summary log and the end-of-run report.

use bevy_ecs::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::components::{Character, Commodity, Thing};
use crate::ledger::CreditBook;
use crate::systems::clock::SimClock;

use super::events::TickEvents;

/// Statistics for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub trades: usize,
    pub settlements: usize,
    pub kills: usize,
    pub births: usize,
    pub things: usize,
    pub outstanding_debt: BTreeMap<Commodity, f32>,
}

/// Overall simulation statistics
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub total_ticks: u64,
    pub total_trades: usize,
    pub total_settlements: usize,
    pub total_kills: usize,
    pub total_births: usize,
    pub average_trades_per_tick: f64,
    pub final_things: usize,
    pub characters: usize,
}

/// Resource to accumulate statistics during simulation
#[derive(Resource, Debug, Default)]
pub struct StatsCollector {
    pub total_trades: usize,
    pub total_settlements: usize,
    pub total_kills: usize,
    pub total_births: usize,
    pub last: TickSummary,
    pub characters: usize,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the summary of a finished tick
    pub fn record_tick(&mut self, summary: TickSummary) {
        self.total_trades += summary.trades;
        self.total_settlements += summary.settlements;
        self.total_kills += summary.kills;
        self.total_births += summary.births;
        self.last = summary;
    }

    /// Generate final statistics
    pub fn generate_stats(&self, total_ticks: u64) -> SimulationStats {
        let average_trades_per_tick = if total_ticks > 0 {
            self.total_trades as f64 / total_ticks as f64
        } else {
            0.0
        };

        SimulationStats {
            total_ticks,
            total_trades: self.total_trades,
            total_settlements: self.total_settlements,
            total_kills: self.total_kills,
            total_births: self.total_births,
            average_trades_per_tick,
            final_things: self.last.things,
            characters: self.characters,
        }
    }
}

/// System: summarize the tick that just ran
pub fn collect_tick_stats(
    clock: Res<SimClock>,
    events: Res<TickEvents>,
    book: Res<CreditBook>,
    mut collector: ResMut<StatsCollector>,
    things: Query<(), With<Thing>>,
    characters: Query<(), With<Character>>,
) {
    let outstanding_debt = Commodity::ALL
        .into_iter()
        .map(|commodity| (commodity, book.outstanding(commodity)))
        .filter(|(_, amount)| *amount > 0.0)
        .collect();

    collector.characters = characters.iter().count();
    collector.record_tick(TickSummary {
        tick: clock.tick,
        trades: events.count("trade"),
        settlements: events.count("settlement"),
        kills: events.count("kill"),
        births: events.count("birth"),
        things: things.iter().count(),
        outstanding_debt,
    });
}
