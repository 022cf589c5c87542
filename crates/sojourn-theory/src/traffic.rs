//! Jackson traffic equations.
//!
//! Each node's total arrival rate is its external rate plus the flow
//! routed to it: `λ_j = γ_j + Σ_i λ_i p_ij`. [`TrafficSolver`] finds the
//! fixed point by repeated substitution, starting from the external
//! rates. Acyclic networks settle after at most (depth + 1) rounds;
//! networks with feedback converge geometrically when every loop has
//! gain below one and diverge otherwise, in which case the solution is
//! returned unconverged rather than treated as exact.

use sojourn_core::{Network, NodeId};
use tracing::{debug, warn};

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Default convergence tolerance on the largest per-node change.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// One routed flow: `(from, to, probability)` by node position.
pub type Flow = (usize, usize, f64);

/// Fixed-point solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrafficSolver {
    /// Maximum substitution rounds.
    pub max_iterations: usize,
    /// Stop once no node changes by this much or more.
    pub tolerance: f64,
}

impl Default for TrafficSolver {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Best estimate of per-node arrival rates.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficSolution {
    rates: Vec<f64>,
    iterations: usize,
    max_delta: f64,
    converged: bool,
}

impl TrafficSolution {
    /// Total arrival rate at every node, in node order.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Total arrival rate at `node` (0 for unknown nodes).
    pub fn rate(&self, node: NodeId) -> f64 {
        self.rates.get(node.index()).copied().unwrap_or(0.0)
    }

    /// Rounds performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Largest per-node change in the final round.
    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }

    /// Whether the tolerance was met before the iteration cap.
    ///
    /// When false the rates are unreliable.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Rate at which customers leave `network` through residual
    /// probability mass.
    pub fn exit_rate(&self, network: &Network) -> f64 {
        network
            .nodes()
            .iter()
            .map(|node| {
                let routed: f64 = network.outgoing(node.id).map(|l| l.probability).sum();
                self.rate(node.id) * (1.0 - routed).max(0.0)
            })
            .sum()
    }
}

impl TrafficSolver {
    /// Solve the traffic equations for a resolved network using the
    /// class-agnostic link probabilities.
    pub fn solve(&self, network: &Network) -> TrafficSolution {
        let external: Vec<f64> = network
            .nodes()
            .iter()
            .map(|n| n.external_lambda.unwrap_or(0.0))
            .collect();
        let flows: Vec<Flow> = network
            .links()
            .iter()
            .map(|l| (l.source.index(), l.target.index(), l.probability))
            .collect();
        self.solve_flows(&external, &flows)
    }

    /// Solve for raw external rates and flows.
    ///
    /// Flows naming positions outside `external` are ignored.
    pub fn solve_flows(&self, external: &[f64], flows: &[Flow]) -> TrafficSolution {
        let n = external.len();
        let mut rates = external.to_vec();
        let mut iterations = 0;
        let mut max_delta = 0.0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            let mut next = external.to_vec();
            for &(from, to, p) in flows {
                if from < n && to < n {
                    next[to] += rates[from] * p;
                }
            }
            max_delta = rates
                .iter()
                .zip(&next)
                .map(|(old, new)| (new - old).abs())
                .fold(0.0, f64::max);
            rates = next;
            if max_delta < self.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(iterations, max_delta, "traffic equations converged");
        } else {
            warn!(
                iterations,
                max_delta, "traffic equations did not converge; rates are unreliable"
            );
        }

        TrafficSolution {
            rates,
            iterations,
            max_delta,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn single_source_is_its_external_rate() {
        let sol = TrafficSolver::default().solve_flows(&[12.0], &[]);
        assert!(sol.is_converged());
        assert_eq!(sol.rates(), &[12.0]);
        assert_eq!(sol.iterations(), 1);
    }

    #[test]
    fn tandem_split() {
        // 0 -> 1 (0.6), 0 -> 2 (0.4), 1 -> 2 (1.0)
        let flows = [(0, 1, 0.6), (0, 2, 0.4), (1, 2, 1.0)];
        let sol = TrafficSolver::default().solve_flows(&[10.0, 0.0, 0.0], &flows);
        assert!(sol.is_converged());
        assert!(close(sol.rates()[1], 6.0));
        assert!(close(sol.rates()[2], 10.0));
    }

    #[test]
    fn feedback_loop_converges_to_geometric_sum() {
        // 0 -> 0 with 0.5: λ = γ / (1 - p) = 20.
        let sol = TrafficSolver {
            max_iterations: 200,
            tolerance: 1e-9,
        }
        .solve_flows(&[10.0], &[(0, 0, 0.5)]);
        assert!(sol.is_converged());
        assert!(close(sol.rates()[0], 20.0));
    }

    #[test]
    fn unit_gain_loop_does_not_converge() {
        let sol = TrafficSolver::default().solve_flows(&[5.0, 0.0], &[(0, 1, 1.0), (1, 0, 1.0)]);
        assert!(!sol.is_converged());
        assert_eq!(sol.iterations(), DEFAULT_MAX_ITERATIONS);
        assert!(sol.max_delta() >= DEFAULT_TOLERANCE);
    }

    #[test]
    fn out_of_range_flows_ignored() {
        let sol = TrafficSolver::default().solve_flows(&[1.0], &[(0, 7, 1.0), (4, 0, 1.0)]);
        assert_eq!(sol.rates(), &[1.0]);
    }
}
