//! Village Economy Simulation Library
//!
//! A fixed-tick simulation of a small village: characters with personalities
//! hunt, gather, cook, brew and trade through shops, extending credit to each
//! other and adapting their price beliefs as they go.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod ledger;
pub mod market;
pub mod output;
pub mod pacing;
pub mod queries;
pub mod relations;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, SimConfig};
pub use error::SimError;
pub use ledger::{CreditBook, CreditPair, Debt};
pub use pacing::TickPacer;
pub use relations::Relations;
pub use simulation::{build_schedule, Simulation};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
