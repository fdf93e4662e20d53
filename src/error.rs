/*!
 * Error types for primeline
 */

use std::fmt;
use std::io;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, PrimelineError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug)]
pub enum PrimelineError {
    /// A candidate was forwarded to a hop whose read end vanished outside of
    /// normal shutdown
    ChannelClosed { stage: usize },

    /// The operating system refused to start a pipeline unit
    SpawnFailed { unit: String, source: io::Error },

    /// The configured stage ceiling refused to grow the chain any further
    StageLimit { stage: usize, limit: usize },

    /// A pipeline unit panicked instead of draining its input
    WorkerPanicked { unit: String },

    /// Configuration error
    Config(String),
}

impl PrimelineError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Fatal errors invalidate the run as a whole
            PrimelineError::Config(_) | PrimelineError::WorkerPanicked { .. } => EXIT_FATAL,
            // Partial failures: primes reported before the failure stand
            PrimelineError::ChannelClosed { .. }
            | PrimelineError::SpawnFailed { .. }
            | PrimelineError::StageLimit { .. } => EXIT_PARTIAL,
        }
    }

    /// Check if this error invalidates output produced before it occurred
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PrimelineError::Config(_) | PrimelineError::WorkerPanicked { .. }
        )
    }
}

impl fmt::Display for PrimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimelineError::ChannelClosed { stage } => {
                write!(f, "stage {} lost its downstream channel mid-forward", stage)
            }
            PrimelineError::SpawnFailed { unit, source } => {
                write!(f, "failed to spawn {}: {}", unit, source)
            }
            PrimelineError::StageLimit { stage, limit } => {
                write!(
                    f,
                    "stage ceiling reached: stage {} refused (limit {})",
                    stage, limit
                )
            }
            PrimelineError::WorkerPanicked { unit } => {
                write!(f, "pipeline unit {} panicked", unit)
            }
            PrimelineError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PrimelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrimelineError::SpawnFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for PrimelineError {
    fn from(err: ConfigError) -> Self {
        PrimelineError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PrimelineError {
    fn from(err: serde_json::Error) -> Self {
        PrimelineError::Config(format!("JSON serialization error: {}", err))
    }
}
