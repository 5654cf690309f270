//! Error types for the membership engine

use thiserror::Error;

/// Coarse classification of a [`MembershipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidTransition,
    LimitExceeded,
    NotFound,
    Conflict,
    Storage,
}

/// Membership engine error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// Malformed input (non-positive gift days, negative price, zero cap, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not legal from the record's stored status
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A quota, cap or ceiling would be exceeded
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Dangling plan, benefit or record reference
    #[error("not found: {0}")]
    NotFound(String),

    /// Optimistic version mismatch under concurrent mutation
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed; the outcome of the write is unknown
    #[error("storage error: {0}")]
    Storage(String),
}

impl MembershipError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidTransition(_) => ErrorKind::InvalidTransition,
            Self::LimitExceeded(_) => ErrorKind::LimitExceeded,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Only conflicts are worth retrying with freshly loaded state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type for the membership engine
pub type MembershipResult<T> = Result<T, MembershipError>;
