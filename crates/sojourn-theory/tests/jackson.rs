//! Traffic-equation conservation on generated acyclic networks.
//!
//! For a feed-forward network the fixed point has a closed form obtained
//! by sweeping nodes in topological order; the solver must reproduce it,
//! and everything that enters must eventually leave.

use proptest::prelude::*;
use sojourn_core::{LinkConfig, NetworkConfig, NodeConfig, NodeId};
use sojourn_test_utils::{single_station, tandem};
use sojourn_theory::{analyze_network, TrafficSolver};

/// Nodes `0..n`, links only from lower to higher index, with each
/// node's outgoing weights scaled so they sum to `keep`.
fn feed_forward(
    n: usize,
    lambdas: &[f64],
    weights: &[Vec<f64>],
    keep: &[f64],
) -> NetworkConfig {
    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let node = NodeConfig::new(format!("n{i}"), 1, 1.0);
        nodes.push(if lambdas[i] > 0.0 {
            node.source(lambdas[i])
        } else {
            node
        });
    }
    let mut links = Vec::new();
    for i in 0..n {
        let targets: Vec<usize> = ((i + 1)..n).collect();
        if targets.is_empty() {
            continue;
        }
        let raw: Vec<f64> = targets.iter().map(|&j| weights[i][j]).collect();
        let total: f64 = raw.iter().sum();
        if total <= 0.0 {
            continue;
        }
        for (&j, w) in targets.iter().zip(raw) {
            // Round down slightly so floating error never pushes the sum above 1.
            let p = (w / total * keep[i] * (1.0 - 1e-12)).clamp(0.0, 1.0);
            links.push(LinkConfig::new(format!("l{i}_{j}"), format!("n{i}"), format!("n{j}"), p));
        }
    }
    NetworkConfig {
        nodes,
        links,
        resource_pools: vec![],
    }
}

fn closed_form(cfg: &NetworkConfig) -> Vec<f64> {
    let mut rates: Vec<f64> = cfg
        .nodes
        .iter()
        .map(|n| n.external_lambda.unwrap_or(0.0))
        .collect();
    for i in 0..cfg.nodes.len() {
        let from = format!("n{i}");
        for link in cfg.links.iter().filter(|l| l.source == from) {
            let j: usize = link.target[1..].parse().unwrap();
            rates[j] += rates[i] * link.probability;
        }
    }
    rates
}

proptest! {
    #[test]
    fn acyclic_rates_match_closed_form(
        n in 2usize..7,
        lambdas in prop::collection::vec(prop_oneof![Just(0.0), 1.0f64..50.0], 7),
        weights in prop::collection::vec(prop::collection::vec(0.0f64..1.0, 7), 7),
        keep in prop::collection::vec(0.0f64..=1.0, 7),
    ) {
        let mut lambdas = lambdas;
        if lambdas[0] == 0.0 {
            lambdas[0] = 10.0;
        }
        let cfg = feed_forward(n, &lambdas, &weights, &keep);
        let net = cfg.resolve().unwrap();
        let sol = TrafficSolver::default().solve(&net);
        prop_assert!(sol.is_converged());
        let expected = closed_form(&cfg);
        for (i, want) in expected.iter().enumerate() {
            let got = sol.rate(NodeId(i as u32));
            prop_assert!((got - want).abs() < 1e-6 * want.max(1.0), "node {}: {} vs {}", i, got, want);
        }
        let inflow = net.total_external_rate();
        let outflow = sol.exit_rate(&net);
        prop_assert!((inflow - outflow).abs() < 1e-6 * inflow.max(1.0));
    }
}

#[test]
fn tandem_fixture_rates() {
    let net = tandem(&[(1, 1.0), (2, 3.0), (1, 0.5)], 20.0).resolve().unwrap();
    let sol = TrafficSolver::default().solve(&net);
    assert!(sol.is_converged());
    assert_eq!(sol.rates(), &[20.0, 20.0, 20.0]);
    assert!((sol.exit_rate(&net) - 20.0).abs() < 1e-9);
}

#[test]
fn single_station_analysis_matches_erlang_c() {
    let net = single_station(30.0, 1.0, 1).resolve().unwrap();
    let analysis = analyze_network(&net).unwrap();
    let node = &analysis.nodes[0];
    assert!((node.metrics.lq - 0.5).abs() < 1e-12);
    assert!((node.metrics.wq * 60.0 - 1.0).abs() < 1e-12);
}
