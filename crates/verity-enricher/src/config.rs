//! Configuration for enrichment sessions
//!
//! Defines the confidence level, frame pacing and fetch concurrency.

use crate::EnricherError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use verity_domain::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_PDF_RESOLUTION};

/// Configuration for an enrichment session
///
/// # Examples
///
/// ```
/// use verity_enricher::EnricherConfig;
///
/// let config = EnricherConfig::default();
/// assert_eq!(config.confidence_level, 0.95);
/// assert_eq!(config.max_in_flight, None);
///
/// let config = EnricherConfig::throttled();
/// assert_eq!(config.max_in_flight, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnricherConfig {
    /// Confidence level for every interval, in (0, 1)
    /// Default: 0.95
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Period of the frame clock (in milliseconds)
    /// Default: 16 (about 60 frames per second)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Maximum refinement fetches in flight at once
    /// Default: None (unbounded)
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// Number of density samples handed to plots
    /// Default: 200
    #[serde(default = "default_pdf_resolution")]
    pub pdf_resolution: usize,
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_pdf_resolution() -> usize {
    DEFAULT_PDF_RESOLUTION
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            frame_interval_ms: default_frame_interval_ms(),
            max_in_flight: None,
            pdf_resolution: default_pdf_resolution(),
        }
    }
}

/// File layout: settings live under an `[enricher]` table
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    enricher: EnricherConfig,
}

impl EnricherConfig {
    /// Throttled configuration for hosts with many items per page
    ///
    /// - At most 4 fetches in flight
    /// - 33 ms frames (about 30 per second)
    pub fn throttled() -> Self {
        Self {
            frame_interval_ms: 33,
            max_in_flight: Some(4),
            ..Self::default()
        }
    }

    /// Get the frame interval as Duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<(), EnricherError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(EnricherError::Config(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(EnricherError::Config(
                "frame_interval_ms must be positive".to_string(),
            ));
        }
        if self.max_in_flight == Some(0) {
            return Err(EnricherError::Config(
                "max_in_flight must be positive when set".to_string(),
            ));
        }
        if self.pdf_resolution < 2 {
            return Err(EnricherError::Config(format!(
                "pdf_resolution must be at least 2, got {}",
                self.pdf_resolution
            )));
        }
        Ok(())
    }

    /// Parse an `[enricher]` table from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EnricherError> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| EnricherError::Config(e.to_string()))?;
        file.enricher.validate()?;
        Ok(file.enricher)
    }

    /// Load an `[enricher]` table from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EnricherError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EnricherError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}
