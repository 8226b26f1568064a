//! Shared vocabulary, event and snapshot types for the village simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Display collaborators depend on it to read simulation output without
//! linking the simulation itself.

pub mod event;
pub mod goods;
pub mod snapshot;

// Re-export the shared vocabulary
pub use goods::{Activity, Commodity, COMMODITY_COUNT};

// Re-export event types
pub use event::{generate_event_id, EventRecord, SimEvent, TradeKind};

// Re-export snapshot types
pub use snapshot::{
    BuildingSnapshot, CharacterSnapshot, CommodityAmount, DebtSnapshot, PriceSnapshot,
    ThingSnapshot, WorldSnapshot,
};
