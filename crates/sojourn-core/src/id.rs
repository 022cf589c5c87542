//! Strongly-typed identifiers.
//!
//! Caller-facing configuration names nodes, links, and pools with
//! arbitrary strings. Resolution replaces those strings with dense
//! indices so the simulator can address state by position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node within a resolved [`Network`](crate::Network).
///
/// `NodeId(n)` corresponds to the n-th node in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in the network's node array.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a directed link within a resolved network.
///
/// Link order is declaration order, which is also the routing scan order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u32);

impl LinkId {
    /// Position of this link in the network's link array.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LinkId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a shared resource pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub u32);

impl PoolId {
    /// Position of this pool in the network's pool array.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PoolId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identity of a customer, preserved across every leg it travels.
///
/// Allocated sequentially by the simulator; never reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CustomerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances by one `tick(dt)` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Convert a collection position into a `u32`-backed id.
///
/// Returns `None` when the position does not fit, which resolution
/// reports as a configuration error instead of truncating.
pub(crate) fn checked_u32(index: usize) -> Option<u32> {
    u32::try_from(index).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_index() {
        assert_eq!(NodeId(3).to_string(), "3");
        assert_eq!(LinkId(7).to_string(), "7");
        assert_eq!(PoolId(0).to_string(), "0");
        assert_eq!(CustomerId(42).to_string(), "42");
        assert_eq!(TickId(9).to_string(), "9");
    }

    #[test]
    fn index_round_trips_through_from() {
        assert_eq!(NodeId::from(5).index(), 5);
        assert_eq!(LinkId::from(2).index(), 2);
        assert_eq!(PoolId::from(1).index(), 1);
    }

    #[test]
    fn checked_u32_rejects_overflow() {
        assert_eq!(checked_u32(12), Some(12));
        assert_eq!(checked_u32(usize::MAX), if usize::BITS > 32 { None } else { Some(u32::MAX) });
    }
}
