//! `flowguard-editor`
//!
//! **Responsibility:** the debounced, cancellable name check → save pipeline.
//!
//! This crate provides:
//! - Debouncing and change suppression of raw name input
//! - A token-checked sequencer that only ever applies the latest edit's results
//! - A lifecycle guard that stops all state changes on teardown
//! - A session driver running the pipeline on a single tokio task
//!
//! Remote capabilities (name registry, flow store, snapshot store) are traits;
//! simulated implementations live in `flowguard-infra`.

pub mod config;
pub mod debounce;
pub mod error;
pub mod lifecycle;
pub mod naive;
pub mod sequencer;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod suppress;

pub use config::EditorConfig;
pub use error::{EditorError, ServiceError, SnapshotError};
pub use lifecycle::Lifecycle;
pub use sequencer::{EditorState, SequenceToken, Sequencer, Validation};
pub use service::{FlowStore, NameRegistry};
pub use session::{Collaborators, NameEditSession};
pub use snapshot::SnapshotStore;
