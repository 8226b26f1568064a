//! World Setup
//!
//! Resource initialization, buildings and population spawning.

pub mod population;
pub mod world;

pub use population::*;
pub use world::*;
