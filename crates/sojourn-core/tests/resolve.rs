//! Property tests for configuration save, load, and resolution.
//!
//! Generated values are short binary fractions so they survive a JSON
//! text round trip bit for bit.

use proptest::prelude::*;
use sojourn_core::{
    ConfigError, Distribution, LinkConfig, NetworkConfig, NodeConfig, ResourcePoolConfig,
    RoutingStrategy,
};

#[derive(Clone, Debug)]
struct NodeParams {
    servers: u32,
    quarter_minutes: u32,
    capacity: Option<u32>,
    lambda: Option<u32>,
    shortest: bool,
    erlang: Option<u32>,
    pooled: bool,
}

fn node_params() -> impl Strategy<Value = NodeParams> {
    (
        1u32..5,
        1u32..240,
        prop::option::of(1u32..50),
        prop::option::of(1u32..120),
        any::<bool>(),
        prop::option::of(1u32..6),
        any::<bool>(),
    )
        .prop_map(
            |(servers, quarter_minutes, capacity, lambda, shortest, erlang, pooled)| NodeParams {
                servers,
                quarter_minutes,
                capacity,
                lambda,
                shortest,
                erlang,
                pooled,
            },
        )
}

/// Nodes `n0..nk`; each draws up to three outgoing links whose
/// probabilities, in eighths, never exceed a total of one.
fn network(nodes: &[NodeParams], links: &[(usize, u32)]) -> NetworkConfig {
    let n = nodes.len();
    let configs = nodes
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut node = NodeConfig::new(
                format!("n{i}"),
                p.servers,
                f64::from(p.quarter_minutes) / 4.0,
            );
            if let Some(lambda) = p.lambda {
                node = node.source(f64::from(lambda));
            }
            if let Some(capacity) = p.capacity {
                node = node.capacity(capacity);
            }
            if p.shortest {
                node = node.routing(RoutingStrategy::ShortestQueue);
            }
            if let Some(k) = p.erlang {
                node = node.service(Distribution::Erlang { k });
            }
            if p.pooled {
                node = node.pool("shared");
            }
            node
        })
        .collect();

    let mut budget = vec![8u32; n];
    let mut out = Vec::new();
    for (i, &(target, eighths)) in links.iter().enumerate() {
        let source = i % n;
        let eighths = eighths.min(budget[source]);
        budget[source] -= eighths;
        out.push(LinkConfig::new(
            format!("l{i}"),
            format!("n{source}"),
            format!("n{}", target % n),
            f64::from(eighths) / 8.0,
        ));
    }
    NetworkConfig {
        nodes: configs,
        links: out,
        resource_pools: vec![ResourcePoolConfig::new("shared", 3)],
    }
}

proptest! {
    #[test]
    fn saved_config_resolves_to_the_same_network(
        nodes in prop::collection::vec(node_params(), 1..6),
        links in prop::collection::vec((0usize..6, 0u32..=8), 0..12),
    ) {
        let cfg = network(&nodes, &links);
        let direct = cfg.resolve().unwrap();
        let json = cfg.to_json().unwrap();
        let loaded = NetworkConfig::from_json(&json).unwrap();
        prop_assert_eq!(&loaded, &cfg);
        prop_assert_eq!(loaded.resolve().unwrap(), direct);
    }

    #[test]
    fn excess_outgoing_probability_is_rejected(
        first in 5u32..=8,
        second in 4u32..=8,
        extra in prop::option::of(0u32..=8),
    ) {
        let mut links = vec![
            LinkConfig::new("h-a", "hub", "a", f64::from(first) / 8.0),
            LinkConfig::new("h-b", "hub", "b", f64::from(second) / 8.0),
        ];
        if let Some(e) = extra {
            links.push(LinkConfig::new("h-h", "hub", "hub", f64::from(e) / 8.0));
        }
        let cfg = NetworkConfig {
            nodes: vec![
                NodeConfig::new("hub", 1, 1.0).source(10.0),
                NodeConfig::new("a", 1, 1.0),
                NodeConfig::new("b", 1, 1.0),
            ],
            links,
            resource_pools: vec![],
        };
        match cfg.resolve() {
            Err(ConfigError::ProbabilityOverflow { node, class, sum }) => {
                prop_assert_eq!(node.as_str(), "hub");
                prop_assert_eq!(class, "A");
                prop_assert!(sum > 1.0);
            }
            other => prop_assert!(false, "expected ProbabilityOverflow, got {:?}", other),
        }
    }
}
