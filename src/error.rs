//! Error types for the archive action.

use std::time::Duration;
use thiserror::Error;

use crate::github::RateLimitKind;

/// The main error type for archive operations.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Invalid input {name}: {message}")]
    InvalidInput { name: &'static str, message: String },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("GitHub API error ({status}): {message}")]
    GitHub { status: u16, message: String },

    #[error("{kind} for {method} {url}, retry after {}s", .retry_after.as_secs())]
    RateLimited {
        kind: RateLimitKind,
        method: String,
        url: String,
        retry_after: Duration,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
