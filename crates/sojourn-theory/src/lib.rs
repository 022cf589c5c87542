//! Analytical queueing engine for Sojourn.
//!
//! Pure functions over static inputs: steady-state metrics for single
//! stations ([`evaluate`]), Erlang and birth-death helpers ([`erlang`]),
//! the Jackson traffic-equation fixed point ([`TrafficSolver`]), and a
//! per-node [`analyze_network`] pass that combines the two for a whole
//! [`Network`](sojourn_core::Network).
//!
//! Rates are per unit time; waits come back in the reciprocal unit. For
//! networks resolved from configuration that means arrivals per hour and
//! waits in hours.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod erlang;
pub mod error;
pub mod metrics;
pub mod model;
pub mod traffic;

pub use analysis::{analyze_network, analyze_with, node_input, NetworkAnalysis, NodeAnalysis};
pub use error::TheoryError;
pub use metrics::evaluate;
pub use model::{QueueInput, QueueModel, TheoreticalMetrics};
pub use traffic::{TrafficSolution, TrafficSolver};
