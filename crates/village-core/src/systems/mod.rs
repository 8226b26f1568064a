//! ECS Systems
//!
//! All simulation phases: clock, behavior, hunting, trading, consumption,
//! critter movement and reproduction.

pub mod behavior;
pub mod clock;
pub mod compaction;
pub mod consumption;
pub mod hunt;
pub mod movement;
pub mod production;
pub mod reproduction;
pub mod trading;
pub mod triggers;

// Re-export commonly used systems
pub use behavior::{grow_hunger, run_behavior};
pub use clock::{advance_clock, SimClock};
pub use compaction::{despawn_pending, PendingRemovals};
pub use consumption::consume_provisions;
pub use hunt::{hunt, HuntOutcome};
pub use movement::{
    exit_building, jitter_headings, move_critters, move_toward_building, move_toward_point,
    MoveResult,
};
pub use reproduction::breed_queens;
pub use trading::{run_trading_rounds, trade_with_shop};
