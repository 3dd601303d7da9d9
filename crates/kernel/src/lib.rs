//! World Kernel: entity membership, deferred structural mutation, view
//! synchronization and per-tick event delivery.
//!
//! # Invariants
//! - Membership changes requested at any time only take effect inside `World::step`.
//! - Each step flushes removals, then additions, then delivers events, in that order.
//! - A view's added/removed callback stream is balanced over its attached lifetime.
//! - The live set is never mutable from outside the world.

pub mod config;
pub mod entity;
pub mod mailbox;
pub mod view;
pub mod world;

pub use config::{ConfigError, WorldConfig};
pub use entity::Entity;
pub use mailbox::Mailbox;
pub use tickworld_common::{Bounds, EntityId};
pub use view::{SharedView, WorldView};
pub use world::{Updatable, World, WorldContext};
