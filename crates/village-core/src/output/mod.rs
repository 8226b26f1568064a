//! Output
//!
//! Per-tick event log, commodity flow accounting, statistics and snapshots.

pub mod events;
pub mod snapshot;
pub mod stats;

pub use events::{CommodityFlows, TickEvents};
pub use snapshot::capture_snapshot;
pub use stats::{collect_tick_stats, SimulationStats, StatsCollector, TickSummary};
