//! Core types and configuration for the Sojourn queueing toolkit.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary shared by the analytical engine and the
//! network simulator: typed IDs, service-time distributions, the
//! exchangeable [`NetworkConfig`] format, and the resolved, validated
//! [`Network`] topology produced from it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod distribution;
pub mod error;
pub mod id;
pub mod network;

pub use config::{
    BreakdownConfig, LinkCondition, LinkConfig, NetworkConfig, NodeConfig, PriorityClass,
    ResourcePoolConfig, RoutingStrategy,
};
pub use distribution::Distribution;
pub use error::ConfigError;
pub use id::{CustomerId, LinkId, NodeId, PoolId, TickId};
pub use network::{Breakdown, LinkSpec, Network, NodeSpec, PoolSpec};
