//! Error types surfaced by the editor pipeline.

use flowguard_core::DomainError;
use thiserror::Error;

/// Failure reported by a remote collaborator (name registry or flow store).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("request timed out")]
    Timeout,
}

/// Error recorded against the current edit sequence.
///
/// None of these end the session; the next accepted edit clears them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The uniqueness check failed.
    #[error("name check failed")]
    Check(#[source] ServiceError),

    /// The save failed.
    #[error("save failed")]
    Save(#[source] ServiceError),

    /// The store answered with something that breaks a domain invariant.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Failure of the last-saved snapshot store.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("snapshot store lock poisoned")]
    Poisoned,
}
