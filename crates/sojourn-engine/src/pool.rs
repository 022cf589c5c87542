//! Shared resource pools.
//!
//! A busy server at a pooled node holds exactly one [`PoolLease`]. The
//! lease is a move-only token: the only way to return a unit is to hand
//! the lease back to [`PoolRegistry::release()`], so a unit cannot be
//! released twice or leaked silently.

use serde::Serialize;
use sojourn_core::{PoolId, PoolSpec};

/// Proof that one unit of a pool is held.
#[must_use = "dropping a lease leaks a pool unit; return it with PoolRegistry::release"]
#[derive(Debug, PartialEq, Eq)]
pub struct PoolLease {
    pool: PoolId,
}

impl PoolLease {
    /// Pool the unit belongs to.
    pub fn pool(&self) -> PoolId {
        self.pool
    }
}

/// Availability of one pool.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoolState {
    /// Dense index.
    pub id: PoolId,
    /// Identifier from the configuration.
    pub key: String,
    /// Display label.
    pub name: Option<String>,
    /// Total units.
    pub total: u32,
    /// Units not currently leased.
    pub available: u32,
}

impl PoolState {
    /// Units currently leased.
    pub fn in_use(&self) -> u32 {
        self.total - self.available
    }
}

/// Every pool in the network, indexed by [`PoolId`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolRegistry {
    pools: Vec<PoolState>,
}

impl PoolRegistry {
    /// All pools full.
    pub fn new(specs: &[PoolSpec]) -> Self {
        Self {
            pools: specs
                .iter()
                .map(|s| PoolState {
                    id: s.id,
                    key: s.key.clone(),
                    name: s.name.clone(),
                    total: s.total,
                    available: s.total,
                })
                .collect(),
        }
    }

    /// Take one unit, or `None` when the pool is exhausted or unknown.
    pub fn try_acquire(&mut self, pool: PoolId) -> Option<PoolLease> {
        let state = self.pools.get_mut(pool.index())?;
        if state.available == 0 {
            return None;
        }
        state.available -= 1;
        Some(PoolLease { pool })
    }

    /// Return a unit.
    pub fn release(&mut self, lease: PoolLease) {
        if let Some(state) = self.pools.get_mut(lease.pool.index()) {
            debug_assert!(state.available < state.total, "pool {} over-released", state.key);
            state.available = (state.available + 1).min(state.total);
        }
    }

    /// Units available in `pool`.
    pub fn available(&self, pool: PoolId) -> Option<u32> {
        self.pools.get(pool.index()).map(|s| s.available)
    }

    /// Pools in declaration order.
    pub fn pools(&self) -> &[PoolState] {
        &self.pools
    }
}
