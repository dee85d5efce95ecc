//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Statistics error
    #[error("{0}")]
    Domain(#[from] verity_domain::DomainError),

    /// Enrichment session error
    #[error("{0}")]
    Enricher(#[from] verity_enricher::EnricherError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Page fixture could not be used
    #[error("Invalid page fixture: {0}")]
    Fixture(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
