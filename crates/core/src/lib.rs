//! `flowguard-core`: domain building blocks for the flow name editor.
//!
//! This crate contains **pure domain** primitives (no async, no IO).

pub mod entity;
pub mod error;
pub mod flow;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use flow::Flow;
pub use id::FlowId;
pub use value_object::{FlowName, ValueObject};
