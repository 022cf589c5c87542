//! Whole-network reference metrics.
//!
//! Solves the traffic equations for a resolved [`Network`] and evaluates
//! every node as an independent station fed by its effective arrival
//! rate (the Jackson product-form assumption). Internal nodes see a
//! Poisson stream; sources keep their configured arrival family.
//! Batching is not modelled here.

use sojourn_core::{Distribution, Network, NodeId, NodeSpec};

use crate::error::TheoryError;
use crate::metrics::evaluate;
use crate::model::{QueueInput, QueueModel, TheoreticalMetrics};
use crate::traffic::{TrafficSolution, TrafficSolver};

/// Reference metrics for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAnalysis {
    /// The node.
    pub node: NodeId,
    /// Total arrival rate from the traffic equations (per hour).
    pub arrival_rate: f64,
    /// Steady-state metrics; waits in hours.
    pub metrics: TheoreticalMetrics,
}

/// Reference metrics for a whole network.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkAnalysis {
    /// Traffic-equation solution the node metrics were computed from.
    pub traffic: TrafficSolution,
    /// One entry per node, in node order.
    pub nodes: Vec<NodeAnalysis>,
}

impl NetworkAnalysis {
    /// Entry for `node`.
    pub fn node(&self, node: NodeId) -> Option<&NodeAnalysis> {
        self.nodes.get(node.index())
    }

    /// Whether every node has a steady state and the rates converged.
    pub fn is_stable(&self) -> bool {
        self.traffic.is_converged() && self.nodes.iter().all(|n| n.metrics.is_stable)
    }
}

/// Analytical input for `spec` fed at `lambda` arrivals per hour.
///
/// Nodes with a finite capacity use the M/M/s/K branch; when the
/// capacity is below the server count the surplus servers can never be
/// busy and the station is evaluated with `capacity` servers.
pub fn node_input(spec: &NodeSpec, lambda: f64) -> QueueInput {
    let mut servers = spec.server_count;
    let model = if spec.has_finite_capacity() {
        servers = servers.min(spec.capacity);
        QueueModel::FiniteCapacity {
            capacity: spec.capacity,
        }
    } else {
        QueueModel::Standard
    };
    let arrival = if spec.is_source() {
        spec.arrival_distribution
    } else {
        Distribution::Poisson
    };
    let mut input = QueueInput::new(lambda, spec.service_rate(), servers)
        .model(model)
        .arrival(arrival)
        .service(spec.service_distribution);
    if let Some(b) = spec.breakdown {
        input = input.breakdown(b);
    }
    input
}

/// Solve the traffic equations with the default solver and evaluate
/// every node.
pub fn analyze_network(network: &Network) -> Result<NetworkAnalysis, TheoryError> {
    analyze_with(network, &TrafficSolver::default())
}

/// [`analyze_network`] with an explicit solver configuration.
pub fn analyze_with(
    network: &Network,
    solver: &TrafficSolver,
) -> Result<NetworkAnalysis, TheoryError> {
    let traffic = solver.solve(network);
    let nodes = network
        .nodes()
        .iter()
        .map(|spec| {
            let arrival_rate = traffic.rate(spec.id);
            let metrics = evaluate(&node_input(spec, arrival_rate))?;
            Ok(NodeAnalysis {
                node: spec.id,
                arrival_rate,
                metrics,
            })
        })
        .collect::<Result<Vec<_>, TheoryError>>()?;
    Ok(NetworkAnalysis { traffic, nodes })
}
