//! Tick event log and commodity flows

use bevy_ecs::prelude::*;

use crate::components::{Commodity, CommodityMap};
use village_events::{EventRecord, SimEvent};

/// Events produced during the current tick.
///
/// Cleared when the next tick begins, so the last tick's events stay
/// readable between ticks.
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    pub tick: u64,
    pub events: Vec<EventRecord>,
    next_sequence: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous tick's events and stamps new ones with `tick`.
    pub fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
        self.events.clear();
    }

    pub fn push(&mut self, event: SimEvent) {
        self.next_sequence += 1;
        self.events
            .push(EventRecord::new(self.next_sequence, self.tick, event));
    }

    pub fn count(&self, label: &str) -> usize {
        self.events
            .iter()
            .filter(|record| record.event.label() == label)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Units brought into and taken out of existence, per commodity.
///
/// Transfers between characters never touch this; production, hunting,
/// eating and spoilage do. For every commodity the sum of all inventories
/// equals the initial sum plus `created` minus `destroyed`.
#[derive(Resource, Debug, Clone, Default)]
pub struct CommodityFlows {
    created: CommodityMap<f64>,
    destroyed: CommodityMap<f64>,
}

impl CommodityFlows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self, commodity: Commodity, amount: f32) {
        self.created[commodity] += amount as f64;
    }

    pub fn record_destroyed(&mut self, commodity: Commodity, amount: f32) {
        self.destroyed[commodity] += amount as f64;
    }

    pub fn created(&self, commodity: Commodity) -> f64 {
        self.created.get(commodity)
    }

    pub fn destroyed(&self, commodity: Commodity) -> f64 {
        self.destroyed.get(commodity)
    }

    /// Created minus destroyed
    pub fn net(&self, commodity: Commodity) -> f64 {
        self.created(commodity) - self.destroyed(commodity)
    }
}
