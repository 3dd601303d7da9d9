//! Shared types used across the tickworld crates.

mod types;

pub use types::{Bounds, EntityId};
