//! Per-tick counters for the simulation engine.
//!
//! [`TickMetrics`] summarises what happened during one `tick()` call.
//! Counts cover the whole network; per-node totals live in
//! [`NodeStats`](crate::NodeStats).

use sojourn_core::TickId;

/// Event counts and timing collected during a single tick.
///
/// All counts are for this tick only. `total_us` is wall-clock time and
/// is the one field that differs between otherwise identical runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickMetrics {
    /// Tick that produced these metrics.
    pub tick: TickId,
    /// Simulation time at the end of the tick, in minutes.
    pub time: f64,
    /// Step size used, in minutes.
    pub dt: f64,
    /// Customers generated by external arrival events.
    pub arrivals: u64,
    /// Generated customers turned away at a full source.
    pub arrivals_blocked: u64,
    /// Batches that entered service.
    pub service_starts: u64,
    /// Customers that finished service.
    pub completions: u64,
    /// Customers forwarded to another node.
    pub routed: u64,
    /// Customers lost because the chosen destination was full.
    pub routing_blocks: u64,
    /// Customers that left the network.
    pub exits: u64,
    /// Times an idle server could not start because its pool was empty.
    pub pool_stalls: u64,
    /// Servers that went offline.
    pub failures: u64,
    /// Servers that came back from repair.
    pub repairs: u64,
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
}

impl TickMetrics {
    /// Customers lost this tick, at sources or on links.
    pub fn blocked(&self) -> u64 {
        self.arrivals_blocked + self.routing_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = TickMetrics::default();
        assert_eq!(m.tick, TickId(0));
        assert_eq!(m.arrivals, 0);
        assert_eq!(m.blocked(), 0);
        assert_eq!(m.total_us, 0);
    }

    #[test]
    fn blocked_sums_both_kinds() {
        let m = TickMetrics {
            arrivals_blocked: 2,
            routing_blocks: 3,
            ..TickMetrics::default()
        };
        assert_eq!(m.blocked(), 5);
    }
}
