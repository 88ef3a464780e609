//! In-process stand-ins for the remote name registry and flow store.
//!
//! Both answer after a configurable delay so tests and the demo can produce
//! out-of-order completions on purpose.

mod registry;
mod store;

pub use registry::SimulatedNameRegistry;
pub use store::SimulatedFlowStore;
