//! Error types for enrichment operations

use thiserror::Error;
use verity_domain::InvalidTransition;

/// Errors that can occur while running an enrichment session
#[derive(Error, Debug)]
pub enum EnricherError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid tier transition
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}
