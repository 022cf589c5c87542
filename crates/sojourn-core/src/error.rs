//! Configuration error type.
//!
//! Structural problems (malformed topology, non-positive rates, dangling
//! references) are rejected once, at resolution time, before any
//! simulation or analysis starts. Runtime anomalies such as blocking are
//! never reported through this type.

use std::error::Error;
use std::fmt;

/// Errors detected while resolving a [`NetworkConfig`](crate::NetworkConfig).
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The network declares no nodes.
    NoNodes,
    /// Two entities of the same kind share an identifier.
    DuplicateId {
        /// Entity kind ("node", "link", or "pool").
        kind: &'static str,
        /// The repeated identifier.
        id: String,
    },
    /// A node declares zero servers.
    InvalidServerCount {
        /// Offending node.
        node: String,
    },
    /// `avgServiceTime` is NaN, infinite, zero, or negative.
    InvalidServiceTime {
        /// Offending node.
        node: String,
        /// The invalid value.
        value: f64,
    },
    /// A source node has no `externalLambda`.
    MissingArrivalRate {
        /// Offending node.
        node: String,
    },
    /// `externalLambda` is NaN, infinite, zero, or negative.
    InvalidArrivalRate {
        /// Offending node.
        node: String,
        /// The invalid value.
        value: f64,
    },
    /// `classARatio` lies outside `[0, 1]`.
    InvalidClassRatio {
        /// Offending node.
        node: String,
        /// The invalid value.
        value: f64,
    },
    /// An arrival or service batch size is zero.
    InvalidBatchSize {
        /// Offending node.
        node: String,
    },
    /// `capacity` is zero.
    InvalidCapacity {
        /// Offending node.
        node: String,
    },
    /// A distribution has invalid shape parameters.
    InvalidDistribution {
        /// Offending node.
        node: String,
        /// Description of the problem.
        reason: String,
    },
    /// Breakdown parameters are not finite and positive.
    InvalidBreakdown {
        /// Offending node.
        node: String,
    },
    /// A link references a node that is not declared.
    UnknownNode {
        /// Offending link.
        link: String,
        /// The missing node id.
        node: String,
    },
    /// A node references a pool that is not declared.
    UnknownPool {
        /// Offending node.
        node: String,
        /// The missing pool id.
        pool: String,
    },
    /// A link probability lies outside `[0, 1]`.
    InvalidProbability {
        /// Offending link.
        link: String,
        /// The invalid value.
        value: f64,
    },
    /// Outgoing probabilities for one class sum to more than 1.
    ProbabilityOverflow {
        /// Origin node.
        node: String,
        /// Class label ("A" or "B").
        class: &'static str,
        /// The computed sum.
        sum: f64,
    },
    /// Too many entities to index with `u32`.
    TooManyEntities {
        /// Entity kind.
        kind: &'static str,
        /// The count that overflowed.
        count: usize,
    },
    /// The configuration document could not be parsed or written.
    Parse {
        /// Underlying serializer message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNodes => write!(f, "network has no nodes"),
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id '{id}'"),
            Self::InvalidServerCount { node } => {
                write!(f, "node '{node}': serverCount must be at least 1")
            }
            Self::InvalidServiceTime { node, value } => write!(
                f,
                "node '{node}': avgServiceTime must be finite and positive, got {value}"
            ),
            Self::MissingArrivalRate { node } => {
                write!(f, "source node '{node}' has no externalLambda")
            }
            Self::InvalidArrivalRate { node, value } => write!(
                f,
                "node '{node}': externalLambda must be finite and positive, got {value}"
            ),
            Self::InvalidClassRatio { node, value } => {
                write!(f, "node '{node}': classARatio must be in [0, 1], got {value}")
            }
            Self::InvalidBatchSize { node } => {
                write!(f, "node '{node}': batch sizes must be at least 1")
            }
            Self::InvalidCapacity { node } => {
                write!(f, "node '{node}': capacity must be at least 1")
            }
            Self::InvalidDistribution { node, reason } => {
                write!(f, "node '{node}': invalid distribution: {reason}")
            }
            Self::InvalidBreakdown { node } => write!(
                f,
                "node '{node}': breakdown mtbf and mttr must be finite and positive"
            ),
            Self::UnknownNode { link, node } => {
                write!(f, "link '{link}' references unknown node '{node}'")
            }
            Self::UnknownPool { node, pool } => {
                write!(f, "node '{node}' references unknown resource pool '{pool}'")
            }
            Self::InvalidProbability { link, value } => {
                write!(f, "link '{link}': probability must be in [0, 1], got {value}")
            }
            Self::ProbabilityOverflow { node, class, sum } => write!(
                f,
                "node '{node}': class {class} outgoing probabilities sum to {sum}, above 1"
            ),
            Self::TooManyEntities { kind, count } => {
                write!(f, "{count} {kind}s exceed the u32 index range")
            }
            Self::Parse { reason } => write!(f, "configuration parse error: {reason}"),
        }
    }
}

impl Error for ConfigError {}
