//! Infrastructure layer: simulated remote services and snapshot storage.

pub mod latency;
pub mod simulated;
pub mod snapshot;

pub use latency::SimulatedLatency;
pub use simulated::{SimulatedFlowStore, SimulatedNameRegistry};
pub use snapshot::{InMemorySnapshotStore, JsonFileSnapshotStore};
