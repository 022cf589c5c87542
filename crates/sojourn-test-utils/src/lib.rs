//! Network fixtures shared by Sojourn tests and benchmarks.
//!
//! Every builder returns a plain [`NetworkConfig`] so callers can tweak
//! it further before resolving or handing it to an engine. Arrival rates
//! are per hour and service times in minutes, as in saved configurations.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use sojourn_core::{
    Distribution, LinkConfig, NetworkConfig, NodeConfig, ResourcePoolConfig, RoutingStrategy,
};

/// One source station that every customer leaves after service.
pub fn single_station(lambda_per_hour: f64, service_minutes: f64, servers: u32) -> NetworkConfig {
    NetworkConfig {
        nodes: vec![NodeConfig::new("station", servers, service_minutes).source(lambda_per_hour)],
        ..NetworkConfig::default()
    }
}

/// Stations in series, `stage0 -> stage1 -> ...`, each link taken with
/// probability one. The first stage is the only source.
///
/// Each entry is `(servers, service_minutes)`.
pub fn tandem(stages: &[(u32, f64)], lambda_per_hour: f64) -> NetworkConfig {
    let nodes = stages
        .iter()
        .enumerate()
        .map(|(i, &(servers, minutes))| {
            let node = NodeConfig::new(format!("stage{i}"), servers, minutes);
            if i == 0 {
                node.source(lambda_per_hour)
            } else {
                node
            }
        })
        .collect();
    let links = (1..stages.len())
        .map(|i| {
            LinkConfig::new(
                format!("l{}", i - 1),
                format!("stage{}", i - 1),
                format!("stage{i}"),
                1.0,
            )
        })
        .collect();
    NetworkConfig {
        nodes,
        links,
        resource_pools: Vec::new(),
    }
}

/// `front -> back` where `back` holds one customer and takes far longer
/// than any test run to serve it.
///
/// `front` receives one customer every 0.1 minutes and serves each in
/// 0.01 minutes, so with `dt = 0.1` the first customer reaches `back` on
/// tick 2 and the second is blocked on tick 3.
pub fn blocking_pair() -> NetworkConfig {
    NetworkConfig {
        nodes: vec![
            NodeConfig::new("front", 4, 0.01)
                .source(600.0)
                .service(Distribution::Deterministic)
                .arrivals(Distribution::Deterministic),
            NodeConfig::new("back", 1, 1.0e6)
                .capacity(1)
                .service(Distribution::Deterministic),
        ],
        links: vec![LinkConfig::new("front-back", "front", "back", 1.0)],
        resource_pools: Vec::new(),
    }
}

/// A dispatcher that sends everything to whichever of `left` or `right`
/// is least loaded. Both start empty, so the first customer goes left.
pub fn shortest_queue_fork(lambda_per_hour: f64) -> NetworkConfig {
    NetworkConfig {
        nodes: vec![
            NodeConfig::new("dispatch", 1, 0.01)
                .source(lambda_per_hour)
                .routing(RoutingStrategy::ShortestQueue)
                .service(Distribution::Deterministic),
            NodeConfig::new("left", 1, 1.0e6).service(Distribution::Deterministic),
            NodeConfig::new("right", 1, 1.0e6).service(Distribution::Deterministic),
        ],
        links: vec![
            LinkConfig::new("to-left", "dispatch", "left", 0.5),
            LinkConfig::new("to-right", "dispatch", "right", 0.5),
        ],
        resource_pools: Vec::new(),
    }
}

/// Two busy stations competing for a shared pool of `units`.
pub fn pooled_pair(units: u32, lambda_per_hour: f64) -> NetworkConfig {
    NetworkConfig {
        nodes: vec![
            NodeConfig::new("ward-a", 3, 4.0)
                .source(lambda_per_hour)
                .pool("nurses"),
            NodeConfig::new("ward-b", 3, 4.0)
                .source(lambda_per_hour)
                .pool("nurses"),
        ],
        links: Vec::new(),
        resource_pools: vec![ResourcePoolConfig::new("nurses", units)],
    }
}

/// A mid-sized network exercising every feature at once: class-split
/// routing, a feedback loop, finite capacity, batching, a shared pool,
/// breakdowns, and non-exponential distributions.
pub fn clinic(lambda_per_hour: f64) -> NetworkConfig {
    NetworkConfig {
        nodes: vec![
            NodeConfig::new("triage", 2, 3.0)
                .source(lambda_per_hour)
                .class_a_ratio(0.3)
                .arrival_batch(2),
            NodeConfig::new("exam", 3, 8.0)
                .capacity(12)
                .pool("nurses")
                .service(Distribution::Erlang { k: 2 }),
            NodeConfig::new("lab", 2, 5.0)
                .service_batch(3)
                .service(Distribution::Uniform)
                .breakdown(240.0, 15.0),
            NodeConfig::new("pharmacy", 1, 2.0)
                .routing(RoutingStrategy::ShortestQueue)
                .capacity(6)
                .service(Distribution::Deterministic),
            NodeConfig::new("desk-1", 1, 1.5),
            NodeConfig::new("desk-2", 1, 1.5),
        ],
        links: vec![
            LinkConfig::new("t-e", "triage", "exam", 0.8).by_class(1.0, 0.7),
            LinkConfig::new("t-p", "triage", "pharmacy", 0.2).by_class(0.0, 0.3),
            LinkConfig::new("e-l", "exam", "lab", 0.4),
            LinkConfig::new("e-p", "exam", "pharmacy", 0.5),
            LinkConfig::new("l-e", "lab", "exam", 0.3),
            LinkConfig::new("p-1", "pharmacy", "desk-1", 0.5),
            LinkConfig::new("p-2", "pharmacy", "desk-2", 0.5),
        ],
        resource_pools: vec![ResourcePoolConfig::new("nurses", 2)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_resolve() {
        for config in [
            single_station(30.0, 1.0, 1),
            tandem(&[(1, 1.0), (2, 3.0), (1, 0.5)], 20.0),
            blocking_pair(),
            shortest_queue_fork(60.0),
            pooled_pair(2, 30.0),
            clinic(20.0),
        ] {
            if let Err(e) = config.resolve() {
                panic!("fixture failed to resolve: {e}");
            }
        }
    }

    #[test]
    fn tandem_links_chain_stages() {
        let network = tandem(&[(1, 1.0), (1, 1.0), (1, 1.0)], 10.0)
            .resolve()
            .unwrap();
        assert_eq!(network.links().len(), 2);
        assert_eq!(network.nodes()[0].external_lambda, Some(10.0));
        assert!(network.nodes()[1].external_lambda.is_none());
    }
}
