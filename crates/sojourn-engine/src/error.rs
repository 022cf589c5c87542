//! Errors returned by the simulation engine.
//!
//! Only caller mistakes surface here. Blocking, pool stalls, and other
//! per-event anomalies are counted in [`NodeStats`](crate::NodeStats)
//! and [`TickMetrics`](crate::TickMetrics) instead.

use std::error::Error;
use std::fmt;

use sojourn_core::ConfigError;

/// Errors from [`NetworkEngine::tick()`](crate::NetworkEngine::tick),
/// [`NetworkEngine::advance()`](crate::NetworkEngine::advance), and
/// [`NetworkEngine::reset()`](crate::NetworkEngine::reset).
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidDt {
        /// The rejected value.
        value: f64,
    },
    /// An `advance` duration is NaN, infinite, or negative.
    InvalidDuration {
        /// The rejected value.
        value: f64,
    },
    /// The retained configuration failed re-validation on reset.
    Config(ConfigError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt { value } => write!(f, "dt must be finite and positive, got {value}"),
            Self::InvalidDuration { value } => {
                write!(f, "duration must be finite and non-negative, got {value}")
            }
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InvalidDt { .. } | Self::InvalidDuration { .. } => None,
        }
    }
}

impl From<ConfigError> for StepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
