//! Simulation errors
//!
//! Precondition failures of ledger and production operations. They stay
//! local to the entity being updated: the calling phase logs them and moves on.

use bevy_ecs::entity::Entity;

use crate::components::Commodity;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid amount {amount} of {commodity}")]
    InvalidAmount { commodity: Commodity, amount: f32 },

    #[error("insufficient {commodity}: requested {requested}, available {available}")]
    InsufficientFunds {
        commodity: Commodity,
        available: f32,
        requested: f32,
    },

    #[error("{character:?} lacks {commodity} to produce from")]
    MissingMaterial {
        character: Entity,
        commodity: Commodity,
    },

    #[error("entity {0:?} does not exist or lacks the required components")]
    UnknownEntity(Entity),

    #[error("{0:?} cannot owe itself")]
    SelfCredit(Entity),

    #[error("world has no {0} resource")]
    MissingResource(&'static str),
}
