//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::EngineError;
use storage::repository::StorageError;

/// Errors surfaced to callers of `QuizSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Identity persistence failures.
///
/// Always recovered by `IdentityService`; exposed for logging and tests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),
}

/// Errors emitted by question sources.
///
/// `QuestionBankLoader` recovers all of them by falling back to the built-in bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("remote question source is not configured")]
    Disabled,
    #[error("remote question fetch failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("remote question fetch failed: {0}")]
    RemoteFetchFailed(#[from] reqwest::Error),
    #[error("remote question fetch timed out after {millis} ms")]
    Timeout { millis: u128 },
}

/// Invalid remote source configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid remote question URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("remote question URL must use http or https, got {0}")]
    UnsupportedScheme(String),
    #[error("remote question API key cannot be empty")]
    EmptyApiKey,
    #[error("invalid timeout value: {raw}")]
    InvalidTimeout { raw: String },
}
