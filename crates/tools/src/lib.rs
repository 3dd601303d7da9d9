//! Developer Tooling: read-only world inspection and view recording.
//!
//! # Invariants
//! - Tools never request membership changes; they only observe.

mod inspector;
mod recorder;

pub use inspector::{EntityInfo, WorldInspector, WorldSummary};
pub use recorder::{ViewCallback, ViewRecorder};
