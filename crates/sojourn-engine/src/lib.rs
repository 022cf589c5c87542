//! Fixed-step simulator for networks of queueing stations.
//!
//! [`NetworkEngine`] owns a resolved topology and advances a population
//! of customers through it one `tick(dt)` at a time: external arrivals,
//! service admission (with batching and resource-pool gating), service
//! completion, and routing. Each call processes nodes in declaration
//! order and applies those steps node by node, so accuracy depends on
//! `dt` being small relative to the fastest rate in the network.
//!
//! All randomness flows through an injectable [`VariateGenerator`];
//! two engines built from the same configuration and seed produce
//! identical trajectories.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pool;
pub mod router;
pub mod snapshot;
pub mod variate;

pub use engine::NetworkEngine;
pub use error::StepError;
pub use metrics::TickMetrics;
pub use model::{Batch, Customer, NodeState, NodeStats, Segment, Server, ServerState};
pub use pool::{PoolLease, PoolRegistry, PoolState};
pub use router::Route;
pub use snapshot::{OwnedLink, OwnedNode, OwnedSnapshot, Snapshot};
pub use variate::VariateGenerator;
