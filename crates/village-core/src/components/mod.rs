//! ECS Components
//!
//! All entity components for characters, things and buildings, plus the
//! kind and personality registries.

pub mod building;
pub mod character;
pub mod goods;
pub mod registry;
pub mod thing;

pub use building::*;
pub use character::*;
pub use goods::*;
pub use registry::*;
pub use thing::*;
