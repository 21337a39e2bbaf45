//! Domain layer containing verification entities and outcomes.

pub mod entities;

pub use entities::*;
