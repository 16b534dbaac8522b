//! Error types.
//!
//! - [`StatementError`]: failures of statement operations, either raised
//!   locally (closed handle, open limit) or passed through from the driver
//! - [`Error`]: configuration and pool plumbing failures

use thiserror::Error;

use crate::registry::StatementId;

/// Error returned by operations on a [`StatementHandle`](crate::StatementHandle).
#[derive(Debug, Error)]
pub enum StatementError<E> {
    /// The handle was closed, by its owner or by a connection reclaim.
    #[error("statement {0} is closed")]
    Closed(StatementId),

    /// The connection already has as many open statements as allowed.
    #[error("too many open statements on connection ({open} open, limit {limit})")]
    TooManyOpen { open: usize, limit: usize },

    /// Error raised by the driver, passed through unchanged.
    #[error(transparent)]
    Driver(E),
}

impl<E> StatementError<E> {
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    #[must_use]
    pub const fn is_too_many_open(&self) -> bool {
        matches!(self, Self::TooManyOpen { .. })
    }

    #[must_use]
    pub const fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// The driver error, if this is one.
    pub fn into_driver(self) -> Option<E> {
        match self {
            Self::Driver(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Connection validation failed: {0}")]
    Validation(String),

    #[error("Pool error: {0}")]
    Pool(String),
}

impl Error {
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    #[must_use]
    pub const fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub const fn is_pool(&self) -> bool {
        matches!(self, Self::Pool(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
