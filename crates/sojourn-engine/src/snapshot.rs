//! Read-only views of engine state.
//!
//! [`Snapshot`] borrows directly from the engine and costs nothing to
//! take. [`OwnedSnapshot`] is a serializable copy for renderers,
//! reports, and comparisons across ticks.

use indexmap::IndexSet;
use serde::Serialize;
use sojourn_core::{LinkId, LinkSpec, Network, NodeId, TickId};

use crate::model::{Customer, NodeState, NodeStats, Server};
use crate::pool::PoolState;

/// Borrowed view of the engine after a tick.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    network: &'a Network,
    nodes: &'a [NodeState],
    pools: &'a [PoolState],
    time: f64,
    tick: TickId,
    exit_count: u64,
    recently_blocked: &'a IndexSet<LinkId>,
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(
        network: &'a Network,
        nodes: &'a [NodeState],
        pools: &'a [PoolState],
        time: f64,
        tick: TickId,
        exit_count: u64,
        recently_blocked: &'a IndexSet<LinkId>,
    ) -> Self {
        Self {
            network,
            nodes,
            pools,
            time,
            tick,
            exit_count,
            recently_blocked,
        }
    }

    /// Simulation time in minutes.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Tick that produced this state.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Customers that have left the network.
    pub fn exit_count(&self) -> u64 {
        self.exit_count
    }

    /// The topology the state belongs to.
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Node states in declaration order.
    pub fn nodes(&self) -> &'a [NodeState] {
        self.nodes
    }

    /// State of one node.
    pub fn node(&self, id: NodeId) -> Option<&'a NodeState> {
        self.nodes.get(id.index())
    }

    /// Links in declaration order.
    pub fn links(&self) -> &'a [LinkSpec] {
        self.network.links()
    }

    /// Pool availability in declaration order.
    pub fn pools(&self) -> &'a [PoolState] {
        self.pools
    }

    /// Links that turned a customer away during the last tick, in the
    /// order they first blocked.
    pub fn recently_blocked(&self) -> impl Iterator<Item = LinkId> + 'a {
        self.recently_blocked.iter().copied()
    }

    /// Whether `link` blocked a customer during the last tick.
    pub fn is_blocked(&self, link: LinkId) -> bool {
        self.recently_blocked.contains(&link)
    }

    /// Customers present anywhere in the network.
    pub fn population(&self) -> usize {
        self.nodes.iter().map(NodeState::occupancy).sum()
    }

    /// Copy everything into an [`OwnedSnapshot`].
    pub fn to_owned(&self) -> OwnedSnapshot {
        let nodes = self
            .network
            .nodes()
            .iter()
            .zip(self.nodes)
            .map(|(spec, state)| OwnedNode {
                id: spec.id,
                key: spec.key.clone(),
                name: spec.name.clone(),
                queue: state.queue().iter().cloned().collect(),
                servers: state.servers().to_vec(),
                stats: state.stats().clone(),
                next_arrival: state.next_arrival(),
            })
            .collect();
        let links = self
            .network
            .links()
            .iter()
            .map(|l| OwnedLink {
                id: l.id,
                key: l.key.clone(),
                source: l.source,
                target: l.target,
                blocked: self.is_blocked(l.id),
            })
            .collect();
        OwnedSnapshot {
            time: self.time,
            tick: self.tick,
            exit_count: self.exit_count,
            nodes,
            links,
            pools: self.pools.to_vec(),
        }
    }
}

/// Serializable copy of one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNode {
    /// Dense index.
    pub id: NodeId,
    /// Identifier from the configuration.
    pub key: String,
    /// Display label.
    pub name: Option<String>,
    /// Waiting customers, front first.
    pub queue: Vec<Customer>,
    /// Servers in index order.
    pub servers: Vec<Server>,
    /// Running totals.
    pub stats: NodeStats,
    /// Next external arrival event.
    pub next_arrival: Option<f64>,
}

/// Serializable copy of one link.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedLink {
    /// Dense index.
    pub id: LinkId,
    /// Identifier from the configuration.
    pub key: String,
    /// Origin node.
    pub source: NodeId,
    /// Destination node.
    pub target: NodeId,
    /// Whether it turned a customer away during the last tick.
    pub blocked: bool,
}

/// Owned, serializable copy of the engine state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedSnapshot {
    /// Simulation time in minutes.
    pub time: f64,
    /// Tick that produced this state.
    pub tick: TickId,
    /// Customers that have left the network.
    pub exit_count: u64,
    /// Node states in declaration order.
    pub nodes: Vec<OwnedNode>,
    /// Links in declaration order.
    pub links: Vec<OwnedLink>,
    /// Pool availability.
    pub pools: Vec<PoolState>,
}

impl OwnedSnapshot {
    /// Look up a node by configuration id.
    pub fn node(&self, key: &str) -> Option<&OwnedNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Keys of links that blocked during the last tick.
    pub fn blocked_links(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .filter(|l| l.blocked)
            .map(|l| l.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::NetworkEngine;
    use sojourn_core::{NetworkConfig, NodeConfig};

    fn engine() -> NetworkEngine {
        let cfg = NetworkConfig {
            nodes: vec![NodeConfig::new("desk", 1, 2.0).source(60.0)],
            ..NetworkConfig::default()
        };
        NetworkEngine::new(cfg, 5).unwrap()
    }

    #[test]
    fn owned_copy_matches_view() {
        let mut e = engine();
        e.advance(20.0, 0.5).unwrap();
        let snap = e.snapshot();
        let owned = snap.to_owned();
        assert_eq!(owned.time, snap.time());
        assert_eq!(owned.nodes.len(), 1);
        let desk = owned.node("desk").unwrap();
        assert_eq!(desk.queue.len(), snap.nodes()[0].queue().len());
        assert_eq!(desk.stats, *snap.nodes()[0].stats());
        assert_eq!(snap.population(), snap.nodes()[0].occupancy());
    }

    #[test]
    fn owned_snapshot_serializes() {
        let mut e = engine();
        e.advance(5.0, 0.5).unwrap();
        let json = serde_json::to_string(&e.snapshot().to_owned()).unwrap();
        assert!(json.contains("\"exitCount\""));
        assert!(json.contains("\"desk\""));
    }
}
