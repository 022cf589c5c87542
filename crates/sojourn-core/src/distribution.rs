//! Inter-event time distributions.
//!
//! A [`Distribution`] only names a family; the mean is supplied at
//! sampling time by whoever owns the rate (node service time, source
//! arrival rate). The analytical engine reads the same value to obtain
//! the squared coefficient of variation used by its approximations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution family for arrivals or service durations.
///
/// Serialized as an internally tagged object, e.g.
/// `{"kind": "POISSON"}` or `{"kind": "ERLANG", "k": 3}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distribution {
    /// Exponentially distributed inter-event times (a Poisson process).
    #[default]
    Poisson,
    /// Every draw equals the mean.
    Deterministic,
    /// Uniform on `[0, 2 * mean)`, preserving the mean.
    Uniform,
    /// Sum of `k` exponential phases, each with rate `k / mean`.
    Erlang {
        /// Number of phases. Must be at least 1.
        k: u32,
    },
    /// Trace replay. The sampled value is the mean itself; callers feed
    /// recorded values through the mean.
    Trace,
}

impl Distribution {
    /// Squared coefficient of variation (variance / mean²).
    ///
    /// Trace replay has no known shape and is treated as exponential-like
    /// (1.0) by the approximations that consume this value.
    pub fn scv(self) -> f64 {
        match self {
            Self::Poisson | Self::Trace => 1.0,
            Self::Deterministic => 0.0,
            Self::Uniform => 1.0 / 3.0,
            Self::Erlang { k } => 1.0 / f64::from(k.max(1)),
        }
    }

    /// Whether this is the memoryless (exponential) process.
    ///
    /// `Erlang { k: 1 }` is exponential too and is reported as such.
    pub fn is_memoryless(self) -> bool {
        matches!(self, Self::Poisson | Self::Erlang { k: 1 })
    }

    /// Check structural parameters.
    pub fn validate(self) -> Result<(), String> {
        match self {
            Self::Erlang { k: 0 } => Err("erlang shape k must be at least 1".to_string()),
            _ => Ok(()),
        }
    }

    /// Kendall-notation letter for this family.
    pub fn kendall(self) -> String {
        match self {
            _ if self.is_memoryless() => "M".to_string(),
            Self::Deterministic => "D".to_string(),
            Self::Erlang { k } => format!("E{k}"),
            _ => "G".to_string(),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisson => write!(f, "poisson"),
            Self::Deterministic => write!(f, "deterministic"),
            Self::Uniform => write!(f, "uniform"),
            Self::Erlang { k } => write!(f, "erlang(k={k})"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scv_matches_family_variance() {
        assert_eq!(Distribution::Poisson.scv(), 1.0);
        assert_eq!(Distribution::Deterministic.scv(), 0.0);
        assert!((Distribution::Uniform.scv() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(Distribution::Erlang { k: 4 }.scv(), 0.25);
    }

    #[test]
    fn erlang_one_is_memoryless() {
        assert!(Distribution::Erlang { k: 1 }.is_memoryless());
        assert!(!Distribution::Erlang { k: 2 }.is_memoryless());
        assert!(!Distribution::Trace.is_memoryless());
    }

    #[test]
    fn erlang_zero_rejected() {
        assert!(Distribution::Erlang { k: 0 }.validate().is_err());
        assert!(Distribution::Erlang { k: 3 }.validate().is_ok());
    }

    #[test]
    fn kendall_letters() {
        assert_eq!(Distribution::Poisson.kendall(), "M");
        assert_eq!(Distribution::Deterministic.kendall(), "D");
        assert_eq!(Distribution::Erlang { k: 3 }.kendall(), "E3");
        assert_eq!(Distribution::Uniform.kendall(), "G");
    }

    #[test]
    fn serde_uses_tagged_screaming_case() {
        let json = serde_json::to_string(&Distribution::Erlang { k: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"ERLANG","k":2}"#);
        let back: Distribution = serde_json::from_str(r#"{"kind":"DETERMINISTIC"}"#).unwrap();
        assert_eq!(back, Distribution::Deterministic);
    }
}
