//! Resolved, validated network topology.
//!
//! [`NetworkConfig::resolve()`] is the single place where optional
//! configuration fields receive their defaults and where every
//! structural invariant is checked. The resulting [`Network`] is
//! immutable: the topology is fixed for the lifetime of a run.

use indexmap::IndexMap;

use crate::config::{LinkCondition, NetworkConfig, PriorityClass, RoutingStrategy};
use crate::distribution::Distribution;
use crate::error::ConfigError;
use crate::id::{checked_u32, LinkId, NodeId, PoolId};

/// Capacity assigned when a node does not declare one.
pub const UNBOUNDED_CAPACITY: u32 = 9999;

/// Class A ratio assigned when a node does not declare one.
pub const DEFAULT_CLASS_A_RATIO: f64 = 0.5;

/// Slack allowed when checking that outgoing probabilities sum to at most 1.
const PROBABILITY_SLACK: f64 = 1e-9;

/// Minutes per hour; arrival rates are per hour, durations in minutes.
pub const MINUTES_PER_HOUR: f64 = 60.0;

// ── Resolved records ───────────────────────────────────────────────

/// Validated breakdown parameters (minutes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakdown {
    /// Mean time between failures.
    pub mtbf: f64,
    /// Mean time to repair.
    pub mttr: f64,
}

impl Breakdown {
    /// Long-run fraction of time a server is operational.
    pub fn availability(&self) -> f64 {
        self.mtbf / (self.mtbf + self.mttr)
    }
}

/// A node with all defaults applied.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    /// Dense index.
    pub id: NodeId,
    /// Identifier from the configuration.
    pub key: String,
    /// Display label.
    pub name: Option<String>,
    /// Number of servers (>= 1).
    pub server_count: u32,
    /// Mean service time in minutes (> 0).
    pub avg_service_time: f64,
    /// Maximum customers in queue plus service (>= 1).
    pub capacity: u32,
    /// External arrivals per hour, present only for sources.
    pub external_lambda: Option<f64>,
    /// Probability a generated customer is class A.
    pub class_a_ratio: f64,
    /// Next-hop strategy.
    pub routing: RoutingStrategy,
    /// Customers generated per arrival event (>= 1).
    pub arrival_batch: u32,
    /// Customers served together (>= 1).
    pub service_batch: u32,
    /// Pool required per busy server.
    pub pool: Option<PoolId>,
    /// Inter-arrival distribution.
    pub arrival_distribution: Distribution,
    /// Service-time distribution.
    pub service_distribution: Distribution,
    /// Server failure model.
    pub breakdown: Option<Breakdown>,
    /// Outgoing links in declaration order.
    pub outgoing: Vec<LinkId>,
}

impl NodeSpec {
    /// Whether this node receives external arrivals.
    pub fn is_source(&self) -> bool {
        self.external_lambda.is_some()
    }

    /// Mean minutes between external arrival events.
    pub fn mean_interarrival(&self) -> Option<f64> {
        self.external_lambda.map(|lambda| MINUTES_PER_HOUR / lambda)
    }

    /// Service completions per hour for one server.
    pub fn service_rate(&self) -> f64 {
        MINUTES_PER_HOUR / self.avg_service_time
    }

    /// Whether the capacity is below the unbounded default.
    pub fn has_finite_capacity(&self) -> bool {
        self.capacity < UNBOUNDED_CAPACITY
    }

    /// Display label, falling back to the key.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// A link with class probabilities resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSpec {
    /// Dense index.
    pub id: LinkId,
    /// Identifier from the configuration.
    pub key: String,
    /// Origin node.
    pub source: NodeId,
    /// Destination node.
    pub target: NodeId,
    /// Class-agnostic probability.
    pub probability: f64,
    /// Probability for class A customers.
    pub prob_a: f64,
    /// Probability for class B customers.
    pub prob_b: f64,
    /// Declarative condition.
    pub condition: LinkCondition,
}

impl LinkSpec {
    /// Routing probability for a customer of `class`.
    pub fn probability_for(&self, class: PriorityClass) -> f64 {
        match class {
            PriorityClass::A => self.prob_a,
            PriorityClass::B => self.prob_b,
        }
    }
}

/// A resource pool.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolSpec {
    /// Dense index.
    pub id: PoolId,
    /// Identifier from the configuration.
    pub key: String,
    /// Display label.
    pub name: Option<String>,
    /// Total units.
    pub total: u32,
}

// ── Network ────────────────────────────────────────────────────────

/// Immutable, validated topology.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    nodes: Vec<NodeSpec>,
    links: Vec<LinkSpec>,
    pools: Vec<PoolSpec>,
    node_index: IndexMap<String, NodeId>,
    link_index: IndexMap<String, LinkId>,
    pool_index: IndexMap<String, PoolId>,
}

impl Network {
    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Links in declaration order.
    pub fn links(&self) -> &[LinkSpec] {
        &self.links
    }

    /// Pools in declaration order.
    pub fn pools(&self) -> &[PoolSpec] {
        &self.pools
    }

    /// Look up a node by dense id.
    pub fn node(&self, id: NodeId) -> Option<&NodeSpec> {
        self.nodes.get(id.index())
    }

    /// Look up a link by dense id.
    pub fn link(&self, id: LinkId) -> Option<&LinkSpec> {
        self.links.get(id.index())
    }

    /// Look up a pool by dense id.
    pub fn pool(&self, id: PoolId) -> Option<&PoolSpec> {
        self.pools.get(id.index())
    }

    /// Resolve a configuration node id.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.node_index.get(key).copied()
    }

    /// Resolve a configuration link id.
    pub fn link_id(&self, key: &str) -> Option<LinkId> {
        self.link_index.get(key).copied()
    }

    /// Resolve a configuration pool id.
    pub fn pool_id(&self, key: &str) -> Option<PoolId> {
        self.pool_index.get(key).copied()
    }

    /// Outgoing links of `node`, in declaration order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &LinkSpec> + '_ {
        self.node(node)
            .into_iter()
            .flat_map(|n| n.outgoing.iter())
            .filter_map(|l| self.links.get(l.index()))
    }

    /// Sum of external arrival rates (per hour).
    pub fn total_external_rate(&self) -> f64 {
        self.nodes.iter().filter_map(|n| n.external_lambda).sum()
    }
}

// ── Resolution ─────────────────────────────────────────────────────

impl NetworkConfig {
    /// Apply defaults and validate every structural invariant.
    ///
    /// This is the only place defaults are applied. The configuration is
    /// not modified; the returned [`Network`] owns copies of everything
    /// it needs.
    pub fn resolve(&self) -> Result<Network, ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }

        // 1. Pools.
        let mut pools = Vec::with_capacity(self.resource_pools.len());
        let mut pool_index = IndexMap::with_capacity(self.resource_pools.len());
        for (i, pool) in self.resource_pools.iter().enumerate() {
            let id = PoolId(index_u32("pool", i, self.resource_pools.len())?);
            if pool_index.insert(pool.id.clone(), id).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "pool",
                    id: pool.id.clone(),
                });
            }
            pools.push(PoolSpec {
                id,
                key: pool.id.clone(),
                name: pool.name.clone(),
                total: pool.count,
            });
        }

        // 2. Nodes.
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut node_index = IndexMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index_u32("node", i, self.nodes.len())?);
            if node_index.insert(node.id.clone(), id).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "node",
                    id: node.id.clone(),
                });
            }
            let key = || node.id.clone();

            if node.server_count == 0 {
                return Err(ConfigError::InvalidServerCount { node: key() });
            }
            if !is_positive(node.avg_service_time) {
                return Err(ConfigError::InvalidServiceTime {
                    node: key(),
                    value: node.avg_service_time,
                });
            }
            let external_lambda = if node.is_source.unwrap_or(false) {
                let lambda = node
                    .external_lambda
                    .ok_or_else(|| ConfigError::MissingArrivalRate { node: key() })?;
                if !is_positive(lambda) {
                    return Err(ConfigError::InvalidArrivalRate {
                        node: key(),
                        value: lambda,
                    });
                }
                Some(lambda)
            } else {
                None
            };
            let class_a_ratio = node.class_a_ratio.unwrap_or(DEFAULT_CLASS_A_RATIO);
            if !(0.0..=1.0).contains(&class_a_ratio) {
                return Err(ConfigError::InvalidClassRatio {
                    node: key(),
                    value: class_a_ratio,
                });
            }
            let arrival_batch = node.arrival_batch_size.unwrap_or(1);
            let service_batch = node.service_batch_size.unwrap_or(1);
            if arrival_batch == 0 || service_batch == 0 {
                return Err(ConfigError::InvalidBatchSize { node: key() });
            }
            let capacity = node.capacity.unwrap_or(UNBOUNDED_CAPACITY);
            if capacity == 0 {
                return Err(ConfigError::InvalidCapacity { node: key() });
            }
            let arrival_distribution = node.arrival_distribution.unwrap_or_default();
            let service_distribution = node.service_distribution.unwrap_or_default();
            for dist in [arrival_distribution, service_distribution] {
                dist.validate()
                    .map_err(|reason| ConfigError::InvalidDistribution { node: key(), reason })?;
            }
            let breakdown = match node.breakdown {
                Some(b) if is_positive(b.mtbf) && is_positive(b.mttr) => Some(Breakdown {
                    mtbf: b.mtbf,
                    mttr: b.mttr,
                }),
                Some(_) => return Err(ConfigError::InvalidBreakdown { node: key() }),
                None => None,
            };
            let pool = match &node.resource_pool_id {
                Some(pool_key) => Some(pool_index.get(pool_key).copied().ok_or_else(|| {
                    ConfigError::UnknownPool {
                        node: key(),
                        pool: pool_key.clone(),
                    }
                })?),
                None => None,
            };

            nodes.push(NodeSpec {
                id,
                key: key(),
                name: node.name.clone(),
                server_count: node.server_count,
                avg_service_time: node.avg_service_time,
                capacity,
                external_lambda,
                class_a_ratio,
                routing: node.routing_strategy.unwrap_or_default(),
                arrival_batch,
                service_batch,
                pool,
                arrival_distribution,
                service_distribution,
                breakdown,
                outgoing: Vec::new(),
            });
        }

        // 3. Links.
        let mut links = Vec::with_capacity(self.links.len());
        let mut link_index = IndexMap::with_capacity(self.links.len());
        for (i, link) in self.links.iter().enumerate() {
            let id = LinkId(index_u32("link", i, self.links.len())?);
            if link_index.insert(link.id.clone(), id).is_some() {
                return Err(ConfigError::DuplicateId {
                    kind: "link",
                    id: link.id.clone(),
                });
            }
            let lookup = |node_key: &String| {
                node_index
                    .get(node_key)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownNode {
                        link: link.id.clone(),
                        node: node_key.clone(),
                    })
            };
            let source = lookup(&link.source)?;
            let target = lookup(&link.target)?;
            let prob_a = link.prob_a.unwrap_or(link.probability);
            let prob_b = link.prob_b.unwrap_or(link.probability);
            for value in [link.probability, prob_a, prob_b] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidProbability {
                        link: link.id.clone(),
                        value,
                    });
                }
            }
            nodes[source.index()].outgoing.push(id);
            links.push(LinkSpec {
                id,
                key: link.id.clone(),
                source,
                target,
                probability: link.probability,
                prob_a,
                prob_b,
                condition: link.condition.unwrap_or_default(),
            });
        }

        // 4. Per-class outgoing probability mass.
        for node in &nodes {
            for (class, label) in [(PriorityClass::A, "A"), (PriorityClass::B, "B")] {
                let sum: f64 = node
                    .outgoing
                    .iter()
                    .map(|l| links[l.index()].probability_for(class))
                    .sum();
                if sum > 1.0 + PROBABILITY_SLACK {
                    return Err(ConfigError::ProbabilityOverflow {
                        node: node.key.clone(),
                        class: label,
                        sum,
                    });
                }
            }
        }

        Ok(Network {
            nodes,
            links,
            pools,
            node_index,
            link_index,
            pool_index,
        })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn index_u32(kind: &'static str, index: usize, count: usize) -> Result<u32, ConfigError> {
    checked_u32(index).ok_or(ConfigError::TooManyEntities { kind, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkConfig, NodeConfig, ResourcePoolConfig};

    fn two_node() -> NetworkConfig {
        NetworkConfig {
            nodes: vec![
                NodeConfig::new("a", 1, 2.0).source(20.0),
                NodeConfig::new("b", 2, 3.0),
            ],
            links: vec![LinkConfig::new("ab", "a", "b", 0.8)],
            resource_pools: vec![],
        }
    }

    #[test]
    fn defaults_applied_once() {
        let net = two_node().resolve().unwrap();
        let b = &net.nodes()[1];
        assert_eq!(b.capacity, UNBOUNDED_CAPACITY);
        assert_eq!(b.class_a_ratio, DEFAULT_CLASS_A_RATIO);
        assert_eq!(b.routing, RoutingStrategy::Probabilistic);
        assert_eq!(b.arrival_batch, 1);
        assert_eq!(b.service_batch, 1);
        assert_eq!(b.service_distribution, Distribution::Poisson);
        assert!(!b.is_source());
        let link = &net.links()[0];
        assert_eq!(link.prob_a, 0.8);
        assert_eq!(link.prob_b, 0.8);
        assert_eq!(link.condition, LinkCondition::All);
    }

    #[test]
    fn index_maps_resolve_keys() {
        let net = two_node().resolve().unwrap();
        assert_eq!(net.node_id("b"), Some(NodeId(1)));
        assert_eq!(net.link_id("ab"), Some(LinkId(0)));
        assert_eq!(net.node_id("zzz"), None);
        let out: Vec<_> = net.outgoing(NodeId(0)).map(|l| l.target).collect();
        assert_eq!(out, vec![NodeId(1)]);
        assert_eq!(net.outgoing(NodeId(1)).count(), 0);
    }

    #[test]
    fn source_rates_convert_to_minutes() {
        let net = two_node().resolve().unwrap();
        let a = &net.nodes()[0];
        assert_eq!(a.mean_interarrival(), Some(3.0));
        assert_eq!(a.service_rate(), 30.0);
        assert_eq!(net.total_external_rate(), 20.0);
    }

    #[test]
    fn empty_network_rejected() {
        assert_eq!(NetworkConfig::default().resolve(), Err(ConfigError::NoNodes));
    }

    #[test]
    fn zero_servers_rejected() {
        let mut cfg = two_node();
        cfg.nodes[1].server_count = 0;
        match cfg.resolve() {
            Err(ConfigError::InvalidServerCount { node }) => assert_eq!(node, "b"),
            other => panic!("expected InvalidServerCount, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_service_time_rejected() {
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let mut cfg = two_node();
            cfg.nodes[0].avg_service_time = bad;
            match cfg.resolve() {
                Err(ConfigError::InvalidServiceTime { .. }) => {}
                other => panic!("expected InvalidServiceTime for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn source_without_rate_rejected() {
        let mut cfg = two_node();
        cfg.nodes[0].external_lambda = None;
        match cfg.resolve() {
            Err(ConfigError::MissingArrivalRate { .. }) => {}
            other => panic!("expected MissingArrivalRate, got {other:?}"),
        }
        cfg.nodes[0].external_lambda = Some(0.0);
        match cfg.resolve() {
            Err(ConfigError::InvalidArrivalRate { .. }) => {}
            other => panic!("expected InvalidArrivalRate, got {other:?}"),
        }
    }

    #[test]
    fn lambda_on_non_source_is_ignored() {
        let mut cfg = two_node();
        cfg.nodes[1].external_lambda = Some(5.0);
        let net = cfg.resolve().unwrap();
        assert!(!net.nodes()[1].is_source());
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut cfg = two_node();
        cfg.nodes[1].id = "a".to_string();
        match cfg.resolve() {
            Err(ConfigError::DuplicateId { kind: "node", .. }) => {}
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn dangling_link_rejected() {
        let mut cfg = two_node();
        cfg.links.push(LinkConfig::new("ax", "a", "x", 0.1));
        match cfg.resolve() {
            Err(ConfigError::UnknownNode { link, node }) => {
                assert_eq!(link, "ax");
                assert_eq!(node, "x");
            }
            other => panic!("expected UnknownNode, got {other:?}"),
        }
    }

    #[test]
    fn unknown_pool_rejected() {
        let mut cfg = two_node();
        cfg.nodes[1] = cfg.nodes[1].clone().pool("supervisors");
        match cfg.resolve() {
            Err(ConfigError::UnknownPool { .. }) => {}
            other => panic!("expected UnknownPool, got {other:?}"),
        }
        cfg.resource_pools.push(ResourcePoolConfig::new("supervisors", 2));
        let net = cfg.resolve().unwrap();
        assert_eq!(net.nodes()[1].pool, Some(PoolId(0)));
        assert_eq!(net.pools()[0].total, 2);
    }

    #[test]
    fn class_probability_overflow_rejected() {
        let mut cfg = two_node();
        cfg.links[0] = LinkConfig::new("ab", "a", "b", 0.5).by_class(0.5, 0.9);
        cfg.links.push(LinkConfig::new("aa", "a", "a", 0.2));
        match cfg.resolve() {
            Err(ConfigError::ProbabilityOverflow { class: "B", .. }) => {}
            other => panic!("expected ProbabilityOverflow for B, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_probability_rejected() {
        let mut cfg = two_node();
        cfg.links[0].probability = 1.5;
        match cfg.resolve() {
            Err(ConfigError::InvalidProbability { .. }) => {}
            other => panic!("expected InvalidProbability, got {other:?}"),
        }
    }

    #[test]
    fn bad_breakdown_and_batch_rejected() {
        let mut cfg = two_node();
        cfg.nodes[1] = cfg.nodes[1].clone().breakdown(0.0, 5.0);
        assert!(matches!(
            cfg.resolve(),
            Err(ConfigError::InvalidBreakdown { .. })
        ));
        let mut cfg = two_node();
        cfg.nodes[1] = cfg.nodes[1].clone().service_batch(0);
        assert!(matches!(
            cfg.resolve(),
            Err(ConfigError::InvalidBatchSize { .. })
        ));
        let mut cfg = two_node();
        cfg.nodes[1] = cfg.nodes[1].clone().service(Distribution::Erlang { k: 0 });
        assert!(matches!(
            cfg.resolve(),
            Err(ConfigError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn availability_ratio() {
        let b = Breakdown {
            mtbf: 90.0,
            mttr: 10.0,
        };
        assert!((b.availability() - 0.9).abs() < 1e-12);
    }
}
