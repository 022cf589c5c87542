//! Sojourn: queueing network simulation and steady-state analysis.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Sojourn sub-crates. For most users, adding `sojourn` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sojourn::prelude::*;
//!
//! // One clerk serving 30 customers per hour, one minute each.
//! let config = NetworkConfig {
//!     nodes: vec![NodeConfig::new("clerk", 1, 1.0).source(30.0)],
//!     ..NetworkConfig::default()
//! };
//!
//! // Closed-form answer: rho = 0.5, Wq = 1 minute.
//! let network = config.resolve().unwrap();
//! let analysis = analyze_network(&network).unwrap();
//! let predicted = analysis.nodes[0].metrics.wq * 60.0;
//! assert!((predicted - 1.0).abs() < 1e-9);
//!
//! // Simulate an hour in 0.1-minute steps.
//! let mut engine = NetworkEngine::new(config, 42).unwrap();
//! engine.advance(60.0, 0.1).unwrap();
//! let snapshot = engine.snapshot();
//! assert!(snapshot.time() >= 60.0);
//! let clerk = snapshot.node(NodeId(0)).unwrap();
//! assert!(clerk.stats().admitted_count > 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sojourn-core` | IDs, configuration, resolved topology |
//! | [`theory`] | `sojourn-theory` | Erlang formulas, traffic equations, network analysis |
//! | [`engine`] | `sojourn-engine` | Fixed-step simulator, snapshots, tick metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, configuration, and validation (`sojourn-core`).
///
/// Load a [`types::NetworkConfig`] from JSON, then
/// [`resolve`](types::NetworkConfig::resolve) it into a
/// [`types::Network`] that both engines consume.
pub use sojourn_core as types;

/// Analytical engine (`sojourn-theory`).
///
/// [`theory::evaluate`] for single stations and
/// [`theory::analyze_network`] for whole networks.
pub use sojourn_theory as theory;

/// Simulation engine (`sojourn-engine`).
///
/// [`engine::NetworkEngine`] advances a network in fixed time steps.
pub use sojourn_engine as engine;

/// Common imports for typical Sojourn usage.
///
/// ```rust
/// use sojourn::prelude::*;
/// ```
pub mod prelude {
    // Configuration and topology
    pub use sojourn_core::{
        Distribution, LinkConfig, Network, NetworkConfig, NodeConfig, PriorityClass,
        ResourcePoolConfig, RoutingStrategy,
    };

    // Ids
    pub use sojourn_core::{CustomerId, LinkId, NodeId, PoolId, TickId};

    // Errors
    pub use sojourn_core::ConfigError;
    pub use sojourn_engine::StepError;
    pub use sojourn_theory::TheoryError;

    // Theory
    pub use sojourn_theory::{
        analyze_network, evaluate, NetworkAnalysis, QueueInput, QueueModel, TheoreticalMetrics,
    };

    // Engine
    pub use sojourn_engine::{NetworkEngine, OwnedSnapshot, Snapshot, TickMetrics};
}
