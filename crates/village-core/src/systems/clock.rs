//! Simulation clock

use bevy_ecs::prelude::*;

use crate::output::TickEvents;

/// Number of the tick currently being simulated. Zero before the first tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    pub tick: u64,
}

/// System: start a new tick
pub fn advance_clock(mut clock: ResMut<SimClock>, mut events: ResMut<TickEvents>) {
    clock.tick += 1;
    events.begin_tick(clock.tick);
}
