//! Error type for invalid analytical inputs.
//!
//! Instability is not an error: it is reported through
//! [`TheoreticalMetrics::is_stable`](crate::TheoreticalMetrics).

use std::error::Error;
use std::fmt;

/// Rejected inputs to [`evaluate`](crate::evaluate).
#[derive(Clone, Debug, PartialEq)]
pub enum TheoryError {
    /// Arrival rate is NaN, infinite, or negative.
    InvalidArrivalRate {
        /// The invalid value.
        value: f64,
    },
    /// Service rate is NaN, infinite, zero, or negative.
    InvalidServiceRate {
        /// The invalid value.
        value: f64,
    },
    /// A finite-server model was given zero servers.
    NoServers,
    /// System capacity is smaller than the server count.
    CapacityBelowServers {
        /// Configured capacity.
        capacity: u32,
        /// Configured servers.
        servers: u32,
    },
    /// A finite-population model was given zero customers.
    EmptyPopulation,
    /// Breakdown parameters are not finite and positive.
    InvalidBreakdown,
}

impl fmt::Display for TheoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArrivalRate { value } => {
                write!(f, "arrival rate must be finite and non-negative, got {value}")
            }
            Self::InvalidServiceRate { value } => {
                write!(f, "service rate must be finite and positive, got {value}")
            }
            Self::NoServers => write!(f, "server count must be at least 1"),
            Self::CapacityBelowServers { capacity, servers } => write!(
                f,
                "capacity {capacity} is below the server count {servers}"
            ),
            Self::EmptyPopulation => write!(f, "population must be at least 1"),
            Self::InvalidBreakdown => write!(f, "mtbf and mttr must be finite and positive"),
        }
    }
}

impl Error for TheoryError {}
