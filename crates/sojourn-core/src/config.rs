//! Exchangeable network configuration.
//!
//! [`NetworkConfig`] is the structure loaded from and saved to the
//! external file collaborator. Every field that older configurations may
//! omit is an `Option`; nothing here is defaulted in place. Defaults and
//! validation are applied exactly once, by
//! [`NetworkConfig::resolve()`](crate::NetworkConfig::resolve), which
//! produces the immutable [`Network`](crate::Network) that the engines
//! consume.

use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::ConfigError;

// ── Enums ──────────────────────────────────────────────────────────

/// How a node chooses the next hop for a departing customer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStrategy {
    /// Walk outgoing links accumulating class-conditioned probabilities.
    #[default]
    Probabilistic,
    /// Send to the destination with the smallest current load.
    ShortestQueue,
}

/// Binary customer priority class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityClass {
    /// High priority.
    A,
    /// Standard.
    B,
}

/// Declarative link condition.
///
/// Carried for the editor; routing itself only reads the class-specific
/// probabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkCondition {
    /// Applies to every customer.
    #[default]
    All,
    /// Intended for class A only.
    ClassAOnly,
    /// Intended for class B only.
    ClassBOnly,
}

// ── NodeConfig ─────────────────────────────────────────────────────

/// Server failure parameters, both in minutes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownConfig {
    /// Mean time between failures.
    pub mtbf: f64,
    /// Mean time to repair.
    pub mttr: f64,
}

/// One service station as it appears in a saved configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Unique identifier referenced by links.
    pub id: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of parallel servers. Must be at least 1.
    pub server_count: u32,
    /// Mean service time in minutes. Must be positive.
    pub avg_service_time: f64,
    /// Maximum customers in queue plus service. Default: unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Whether this node receives external arrivals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_source: Option<bool>,
    /// External arrivals per hour (sources only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_lambda: Option<f64>,
    /// Fraction of generated customers assigned class A. Default: 0.5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_a_ratio: Option<f64>,
    /// Next-hop selection. Default: probabilistic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_strategy: Option<RoutingStrategy>,
    /// Customers generated per arrival event. Default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_batch_size: Option<u32>,
    /// Customers served together by one server. Default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_batch_size: Option<u32>,
    /// Shared pool a server must hold while serving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_pool_id: Option<String>,
    /// Inter-arrival distribution (sources only). Default: Poisson.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_distribution: Option<Distribution>,
    /// Service-time distribution. Default: Poisson.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_distribution: Option<Distribution>,
    /// Optional server failure model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BreakdownConfig>,
}

impl NodeConfig {
    /// A non-source node with every optional field left unset.
    pub fn new(id: impl Into<String>, server_count: u32, avg_service_time: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            server_count,
            avg_service_time,
            capacity: None,
            is_source: None,
            external_lambda: None,
            class_a_ratio: None,
            routing_strategy: None,
            arrival_batch_size: None,
            service_batch_size: None,
            resource_pool_id: None,
            arrival_distribution: None,
            service_distribution: None,
            breakdown: None,
        }
    }

    /// Mark as a source with `lambda` arrivals per hour.
    #[must_use]
    pub fn source(mut self, lambda: f64) -> Self {
        self.is_source = Some(true);
        self.external_lambda = Some(lambda);
        self
    }

    /// Set the admission capacity.
    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the class A ratio.
    #[must_use]
    pub fn class_a_ratio(mut self, ratio: f64) -> Self {
        self.class_a_ratio = Some(ratio);
        self
    }

    /// Set the routing strategy.
    #[must_use]
    pub fn routing(mut self, strategy: RoutingStrategy) -> Self {
        self.routing_strategy = Some(strategy);
        self
    }

    /// Set the arrival batch size.
    #[must_use]
    pub fn arrival_batch(mut self, size: u32) -> Self {
        self.arrival_batch_size = Some(size);
        self
    }

    /// Set the service batch size.
    #[must_use]
    pub fn service_batch(mut self, size: u32) -> Self {
        self.service_batch_size = Some(size);
        self
    }

    /// Require a unit of `pool_id` per busy server.
    #[must_use]
    pub fn pool(mut self, pool_id: impl Into<String>) -> Self {
        self.resource_pool_id = Some(pool_id.into());
        self
    }

    /// Set the inter-arrival distribution.
    #[must_use]
    pub fn arrivals(mut self, distribution: Distribution) -> Self {
        self.arrival_distribution = Some(distribution);
        self
    }

    /// Set the service-time distribution.
    #[must_use]
    pub fn service(mut self, distribution: Distribution) -> Self {
        self.service_distribution = Some(distribution);
        self
    }

    /// Enable server breakdowns.
    #[must_use]
    pub fn breakdown(mut self, mtbf: f64, mttr: f64) -> Self {
        self.breakdown = Some(BreakdownConfig { mtbf, mttr });
        self
    }
}

// ── LinkConfig ─────────────────────────────────────────────────────

/// A directed routing edge as it appears in a saved configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfig {
    /// Unique identifier.
    pub id: String,
    /// Origin node id.
    pub source: String,
    /// Destination node id.
    pub target: String,
    /// Legacy class-agnostic probability.
    pub probability: f64,
    /// Probability for class A customers. Default: `probability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob_a: Option<f64>,
    /// Probability for class B customers. Default: `probability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob_b: Option<f64>,
    /// Declarative condition. Default: all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<LinkCondition>,
}

impl LinkConfig {
    /// A link with only the legacy probability set.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        probability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            probability,
            prob_a: None,
            prob_b: None,
            condition: None,
        }
    }

    /// Set class-specific probabilities.
    #[must_use]
    pub fn by_class(mut self, prob_a: f64, prob_b: f64) -> Self {
        self.prob_a = Some(prob_a);
        self.prob_b = Some(prob_b);
        self
    }
}

// ── ResourcePoolConfig ─────────────────────────────────────────────

/// A named, finite, shared resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePoolConfig {
    /// Unique identifier referenced by nodes.
    pub id: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Total units.
    pub count: u32,
}

impl ResourcePoolConfig {
    /// A pool with `count` units.
    pub fn new(id: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            name: None,
            count,
        }
    }
}

// ── NetworkConfig ──────────────────────────────────────────────────

/// Complete network description: nodes, links, and optional pools.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Service stations, in declaration (and processing) order.
    pub nodes: Vec<NodeConfig>,
    /// Directed links, in declaration (and routing scan) order.
    #[serde(default)]
    pub links: Vec<LinkConfig>,
    /// Shared resource pools.
    #[serde(default)]
    pub resource_pools: Vec<ResourcePoolConfig>,
}

impl NetworkConfig {
    /// Parse a configuration from JSON.
    ///
    /// Only the shape is checked here; call
    /// [`resolve()`](Self::resolve) to apply defaults and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_json_loads_with_missing_optionals() {
        let json = r#"{
            "nodes": [
                {"id": "triage", "serverCount": 2, "avgServiceTime": 4.0,
                 "isSource": true, "externalLambda": 20.0, "x": 120, "y": 40},
                {"id": "doctor", "serverCount": 1, "avgServiceTime": 6.0}
            ],
            "links": [
                {"id": "l1", "source": "triage", "target": "doctor", "probability": 0.7}
            ]
        }"#;
        let cfg = NetworkConfig::from_json(json).unwrap();
        assert_eq!(cfg.nodes.len(), 2);
        assert!(cfg.resource_pools.is_empty());
        assert_eq!(cfg.nodes[0].external_lambda, Some(20.0));
        assert_eq!(cfg.nodes[1].capacity, None);
        assert_eq!(cfg.links[0].prob_a, None);
    }

    #[test]
    fn camel_case_field_names() {
        let node = NodeConfig::new("n", 1, 2.0)
            .class_a_ratio(0.3)
            .routing(RoutingStrategy::ShortestQueue)
            .pool("nurses");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["serverCount"], 1);
        assert_eq!(json["classARatio"], 0.3);
        assert_eq!(json["routingStrategy"], "SHORTEST_QUEUE");
        assert_eq!(json["resourcePoolId"], "nurses");
        assert!(json.get("capacity").is_none());
    }

    #[test]
    fn save_then_load_preserves_config() {
        let cfg = NetworkConfig {
            nodes: vec![NodeConfig::new("a", 1, 1.0).source(30.0).capacity(5)],
            links: vec![LinkConfig::new("l", "a", "a", 0.2).by_class(0.1, 0.3)],
            resource_pools: vec![ResourcePoolConfig::new("p", 2)],
        };
        let json = cfg.to_json().unwrap();
        assert!(json.contains("resourcePools"));
        assert!(json.contains("probA"));
        assert_eq!(NetworkConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        match NetworkConfig::from_json("{\"nodes\": 3}") {
            Err(ConfigError::Parse { .. }) => {}
            other => panic!("expected Parse, got {other:?}"),
        }
    }
}
