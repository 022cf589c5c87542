//! Benchmark profiles for the Sojourn queueing toolkit.
//!
//! - [`reference_profile`]: the six-station clinic with every feature on
//! - [`stress_profile`]: a ring of `n` stations with feedback routing

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sojourn_core::{Distribution, LinkConfig, NetworkConfig, NodeConfig, RoutingStrategy};

/// Clinic network at 30 arrivals per hour.
pub fn reference_profile() -> NetworkConfig {
    sojourn_test_utils::clinic(30.0)
}

/// `n` stations in a ring. Station `i` forwards to `i+1` with
/// probability 0.6 and to `i+2` with 0.3; the rest leave. Every tenth
/// station is a source at 30 per hour, which keeps each station well
/// below saturation for any `n`.
pub fn stress_profile(n: usize) -> NetworkConfig {
    let n = n.max(3);
    let nodes = (0..n)
        .map(|i| {
            let node = NodeConfig::new(format!("s{i}"), 4, 1.0).service(if i % 3 == 0 {
                Distribution::Erlang { k: 2 }
            } else {
                Distribution::Poisson
            });
            let node = if i % 7 == 0 {
                node.routing(RoutingStrategy::ShortestQueue)
            } else {
                node
            };
            if i % 10 == 0 {
                node.source(30.0)
            } else {
                node
            }
        })
        .collect();
    let links = (0..n)
        .flat_map(|i| {
            [
                LinkConfig::new(format!("s{i}-a"), format!("s{i}"), format!("s{}", (i + 1) % n), 0.6),
                LinkConfig::new(format!("s{i}-b"), format!("s{i}"), format!("s{}", (i + 2) % n), 0.3),
            ]
        })
        .collect();
    NetworkConfig {
        nodes,
        links,
        resource_pools: Vec::new(),
    }
}
