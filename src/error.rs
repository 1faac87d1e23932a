//! Error types for affinity.

use crate::registry::EntityKind;
use thiserror::Error;

/// Errors that can occur while building or querying a recommender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    /// A handle that the registry never allocated.
    ///
    /// Handles only come from the registry, so this is an internal invariant
    /// violation rather than a caller mistake.
    #[error("unknown {kind} handle {handle}")]
    UnknownHandle { kind: EntityKind, handle: u32 },

    /// Query for a user that was never ingested (strict mode only).
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Query for an item that was never ingested (strict mode only).
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Invalid parameter value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
