//! Error types shared across the crate.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by a [`Catalog`](crate::spotify::Catalog) implementation.
///
/// A search that simply finds nothing is not an error: it is reported as
/// `Ok(None)` by [`Catalog::search_track`](crate::spotify::Catalog::search_track).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The provider answered with HTTP 429.
    #[error("rate limited by provider (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// The provider answered with a non-success status other than 429.
    #[error("provider returned {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// The response body could not be decoded.
    #[error("cannot parse provider response: {0}")]
    Parse(String),

    /// No access token could be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network or transport level failure.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl CatalogError {
    /// Returns `true` when retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// The advised wait before retrying, if this is a rate-limit error.
    pub fn retry_after(&self) -> Option<Option<Duration>> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors raised by [`Table`](crate::table::Table) operations.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("row has {found} cells but the table has {expected} columns")]
    RowArity { expected: usize, found: usize },

    #[error("column has {found} values but the table has {expected} rows")]
    ColumnLength { expected: usize, found: usize },

    #[error("expected a JSON array of objects: {0}")]
    InvalidRecords(String),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a non-negative integer, got '{value}'")]
    Invalid { name: &'static str, value: String },
}
