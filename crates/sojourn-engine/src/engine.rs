//! Fixed-step network simulator.
//!
//! [`NetworkEngine`] is the user-facing API for running a simulation.
//! Each call to [`tick()`](NetworkEngine::tick) advances the clock by
//! `dt` minutes and then visits every node once, in declaration order:
//!
//! 1. generate due external arrivals (sources only),
//! 2. apply due server failures and repairs,
//! 3. admit waiting customers to idle servers,
//! 4. complete due services and route the departing customers,
//! 5. refresh the node's statistics.
//!
//! Because routing happens inside that loop, a customer forwarded to a
//! later node can start service there within the same tick, while one
//! forwarded to an earlier node waits for the next tick.
//!
//! # Ownership model
//!
//! `NetworkEngine` is [`Send`] but all mutation goes through `&mut self`.
//! [`snapshot()`](NetworkEngine::snapshot) borrows from `self`, so the
//! borrow checker prevents ticking while a snapshot is held. Use
//! [`Snapshot::to_owned()`] to keep state across ticks.

use std::time::Instant;

use indexmap::IndexSet;
use sojourn_core::{
    ConfigError, CustomerId, Distribution, LinkId, Network, NetworkConfig, NodeId, PriorityClass,
    TickId,
};
use tracing::{debug, info, trace};

use crate::error::StepError;
use crate::metrics::TickMetrics;
use crate::model::{Batch, Customer, NodeState};
use crate::pool::{PoolRegistry, PoolState};
use crate::router::{self, Route};
use crate::snapshot::Snapshot;
use crate::variate::VariateGenerator;

// Compile-time assertion: NetworkEngine can move between threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<NetworkEngine>();
    }
};

/// Single-threaded fixed-step simulator over a resolved [`Network`].
///
/// # Example
///
/// ```ignore
/// let mut engine = NetworkEngine::new(config, 42)?;
/// for _ in 0..600 {
///     engine.tick(0.1)?;
/// }
/// let wq = engine.snapshot().node(NodeId(0)).map(|n| n.stats().current_wq);
/// ```
pub struct NetworkEngine {
    config: NetworkConfig,
    network: Network,
    nodes: Vec<NodeState>,
    pools: PoolRegistry,
    variates: VariateGenerator,
    seed: u64,
    time: f64,
    tick: TickId,
    next_customer: u64,
    exit_count: u64,
    recently_blocked: IndexSet<LinkId>,
    last_metrics: TickMetrics,
}

impl NetworkEngine {
    /// Build an engine from `config`, seeding every random draw from `seed`.
    ///
    /// Validates the configuration, allocates servers and pools, and
    /// schedules the first arrival of every source. The configuration is
    /// kept so [`reset()`](Self::reset) can rebuild from it.
    pub fn new(config: NetworkConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_generator(config, seed, VariateGenerator::new(seed))
    }

    /// Like [`new()`](Self::new) but drawing from `variates`.
    ///
    /// `seed` is recorded for reporting only.
    pub fn with_generator(
        config: NetworkConfig,
        seed: u64,
        variates: VariateGenerator,
    ) -> Result<Self, ConfigError> {
        let network = config.resolve()?;
        let mut engine = Self {
            config,
            nodes: Vec::new(),
            pools: PoolRegistry::new(network.pools()),
            network,
            variates,
            seed,
            time: 0.0,
            tick: TickId(0),
            next_customer: 0,
            exit_count: 0,
            recently_blocked: IndexSet::new(),
            last_metrics: TickMetrics::default(),
        };
        engine.populate();
        info!(
            nodes = engine.network.nodes().len(),
            links = engine.network.links().len(),
            pools = engine.network.pools().len(),
            seed,
            "network engine ready"
        );
        Ok(engine)
    }

    /// Allocate node state and schedule first arrivals and failures.
    fn populate(&mut self) {
        self.nodes = Vec::with_capacity(self.network.nodes().len());
        for spec in self.network.nodes() {
            let mut state = NodeState::new(spec.server_count);
            state.next_arrival = spec
                .mean_interarrival()
                .map(|mean| self.variates.sample(spec.arrival_distribution, mean));
            if let Some(b) = spec.breakdown {
                for server in &mut state.servers {
                    let at = self.variates.sample(Distribution::Poisson, b.mtbf);
                    server.schedule_failure(Some(at));
                }
            }
            self.nodes.push(state);
        }
    }

    /// Advance the simulation by `dt` minutes.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidDt`] when `dt` is not finite and
    /// positive; state is left untouched.
    pub fn tick(&mut self, dt: f64) -> Result<TickMetrics, StepError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(StepError::InvalidDt { value: dt });
        }
        let started = Instant::now();
        self.recently_blocked.clear();
        self.time += dt;
        self.tick = TickId(self.tick.0 + 1);

        let mut metrics = TickMetrics {
            tick: self.tick,
            time: self.time,
            dt,
            ..TickMetrics::default()
        };
        for index in 0..self.nodes.len() {
            self.generate_arrivals(index, &mut metrics);
            self.apply_breakdowns(index, &mut metrics);
            self.start_service(index, &mut metrics);
            self.complete_service(index, &mut metrics);
            self.refresh_stats(index, dt);
        }

        metrics.total_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        debug!(
            tick = %self.tick,
            time = self.time,
            arrivals = metrics.arrivals,
            completions = metrics.completions,
            exits = metrics.exits,
            blocked = metrics.blocked(),
            "tick complete"
        );
        self.last_metrics = metrics.clone();
        Ok(metrics)
    }

    /// Tick with step `dt` until at least `duration` more minutes have
    /// elapsed. Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidDuration`] when `duration` is not
    /// finite or is negative, and [`StepError::InvalidDt`] as for
    /// [`tick()`](Self::tick). Nothing is advanced in either case.
    pub fn advance(&mut self, duration: f64, dt: f64) -> Result<u64, StepError> {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(StepError::InvalidDuration { value: duration });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(StepError::InvalidDt { value: dt });
        }
        let until = self.time + duration;
        let mut ticks = 0;
        while self.time < until {
            self.tick(dt)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Rebuild from the retained configuration with a new seed.
    ///
    /// Everything returns to time zero: queues, servers, pools, counters,
    /// and the random stream.
    pub fn reset(&mut self, seed: u64) -> Result<Snapshot<'_>, StepError> {
        self.network = self.config.resolve()?;
        self.pools = PoolRegistry::new(self.network.pools());
        self.variates = VariateGenerator::new(seed);
        self.seed = seed;
        self.time = 0.0;
        self.tick = TickId(0);
        self.next_customer = 0;
        self.exit_count = 0;
        self.recently_blocked.clear();
        self.last_metrics = TickMetrics::default();
        self.populate();
        info!(seed, "network engine reset");
        Ok(self.snapshot())
    }

    // ── Tick phases ────────────────────────────────────────────────

    fn generate_arrivals(&mut self, index: usize, metrics: &mut TickMetrics) {
        let spec = &self.network.nodes()[index];
        let Some(mean) = spec.mean_interarrival() else {
            return;
        };
        let node = &mut self.nodes[index];
        let capacity = spec.capacity as usize;
        // Catch up on every event that fell inside this tick.
        while let Some(due) = node.next_arrival.filter(|&t| t <= self.time) {
            for _ in 0..spec.arrival_batch {
                let class = if self.variates.chance(spec.class_a_ratio) {
                    PriorityClass::A
                } else {
                    PriorityClass::B
                };
                let id = CustomerId(self.next_customer);
                self.next_customer += 1;
                metrics.arrivals += 1;
                if node.occupancy() < capacity {
                    node.queue.push_back(Customer::new(id, due, class));
                    node.stats.admitted_count += 1;
                } else {
                    node.stats.blocked_count += 1;
                    metrics.arrivals_blocked += 1;
                    trace!(node = %spec.key, customer = %id, "arrival blocked at capacity");
                }
            }
            let gap = self.variates.sample(spec.arrival_distribution, mean);
            node.next_arrival = Some(due + gap);
        }
    }

    fn apply_breakdowns(&mut self, index: usize, metrics: &mut TickMetrics) {
        let spec = &self.network.nodes()[index];
        let Some(breakdown) = spec.breakdown else {
            return;
        };
        for server in &mut self.nodes[index].servers {
            loop {
                if server.is_idle() && server.next_failure().is_some_and(|t| t <= self.time) {
                    let repair = self.variates.sample(Distribution::Poisson, breakdown.mttr);
                    let at = server.fail(repair);
                    metrics.failures += 1;
                    trace!(node = %spec.key, server = server.index(), at, "server offline");
                } else if server.repair_at().is_some_and(|t| t <= self.time) {
                    let at = server.repair();
                    let next = self.variates.sample(Distribution::Poisson, breakdown.mtbf);
                    server.schedule_failure(Some(at + next));
                    metrics.repairs += 1;
                    trace!(node = %spec.key, server = server.index(), at, "server repaired");
                } else {
                    break;
                }
            }
        }
    }

    fn start_service(&mut self, index: usize, metrics: &mut TickMetrics) {
        let spec = &self.network.nodes()[index];
        let node = &mut self.nodes[index];
        while !node.queue.is_empty() {
            let Some(slot) = node.idle_server() else {
                break;
            };
            let lease = match spec.pool {
                Some(pool) => match self.pools.try_acquire(pool) {
                    Some(lease) => Some(lease),
                    None => {
                        metrics.pool_stalls += 1;
                        trace!(node = %spec.key, %pool, "pool exhausted; service deferred");
                        break;
                    }
                },
                None => None,
            };

            let take = (spec.service_batch as usize).min(node.queue.len());
            let mut batch: Batch = node.queue.drain(..take).collect();
            let start = batch
                .iter()
                .map(|c| c.arrival_time)
                .fold(self.time, f64::max);
            let finish =
                start + self.variates.sample(spec.service_distribution, spec.avg_service_time);
            for customer in &mut batch {
                customer.start_time = start;
                customer.finish_time = finish;
                node.stats.total_wait += start - customer.arrival_time;
            }
            node.stats.started_count += batch.len() as u64;
            node.servers[slot].start(batch, start, finish, spec.pool);
            node.leases[slot] = lease;
            metrics.service_starts += 1;
        }
    }

    fn complete_service(&mut self, index: usize, metrics: &mut TickMetrics) {
        for slot in 0..self.nodes[index].servers.len() {
            let node = &mut self.nodes[index];
            let due = node.servers[slot]
                .finish_time()
                .is_some_and(|t| t <= self.time);
            if !due {
                continue;
            }
            if let Some(lease) = node.leases[slot].take() {
                self.pools.release(lease);
            }
            let batch = node.servers[slot].complete();
            node.stats.served_count += batch.len() as u64;
            metrics.completions += batch.len() as u64;
            for customer in batch {
                self.route(index, customer, metrics);
            }
        }
    }

    fn route(&mut self, origin: usize, mut customer: Customer, metrics: &mut TickMetrics) {
        let spec = &self.network.nodes()[origin];
        let nodes = &self.nodes;
        let variates = &mut self.variates;
        let route = if spec.outgoing.is_empty() {
            Route::Exit
        } else {
            router::select(
                spec.routing,
                self.network.outgoing(spec.id),
                customer.class,
                |n| nodes[n.index()].occupancy(),
                || variates.uniform(),
            )
        };

        let link = match route {
            Route::Exit => {
                self.exit_count += 1;
                metrics.exits += 1;
                return;
            }
            Route::Forward(link) => link,
        };
        let Some(target) = self.network.link(link).map(|l| l.target) else {
            self.exit_count += 1;
            metrics.exits += 1;
            return;
        };
        let capacity = self.network.nodes()[target.index()].capacity as usize;
        if self.nodes[target.index()].occupancy() >= capacity {
            self.nodes[origin].stats.blocked_count += 1;
            self.recently_blocked.insert(link);
            metrics.routing_blocks += 1;
            trace!(%link, customer = %customer.id, "destination full; customer lost");
            return;
        }
        customer.arrival_time = customer.finish_time;
        let dest = &mut self.nodes[target.index()];
        dest.queue.push_back(customer);
        dest.stats.admitted_count += 1;
        metrics.routed += 1;
    }

    fn refresh_stats(&mut self, index: usize, dt: f64) {
        let servers = self.network.nodes()[index].server_count;
        let node = &mut self.nodes[index];
        let busy = node.busy_servers();
        let occupancy = node.occupancy();
        let stats = &mut node.stats;
        stats.current_wq = if stats.served_count > 0 {
            stats.total_wait / stats.served_count as f64
        } else {
            0.0
        };
        stats.utilization = busy as f64 / f64::from(servers);
        stats.occupancy_area += occupancy as f64 * dt;
        stats.busy_area += busy as f64 * dt;
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(
            &self.network,
            &self.nodes,
            self.pools.pools(),
            self.time,
            self.tick,
            self.exit_count,
            &self.recently_blocked,
        )
    }

    /// Simulation time in minutes.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks run since construction or reset.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// Seed of the current run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Customers that have left the network.
    pub fn exit_count(&self) -> u64 {
        self.exit_count
    }

    /// Metrics from the most recent tick.
    pub fn last_metrics(&self) -> &TickMetrics {
        &self.last_metrics
    }

    /// The resolved topology.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// State of one node.
    pub fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(id.index())
    }

    /// Pool availability in declaration order.
    pub fn pools(&self) -> &[PoolState] {
        self.pools.pools()
    }
}

impl std::fmt::Debug for NetworkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkEngine")
            .field("current_tick", &self.tick)
            .field("time", &self.time)
            .field("seed", &self.seed)
            .field("nodes", &self.nodes.len())
            .field("exit_count", &self.exit_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sojourn_core::{LinkConfig, NodeConfig, ResourcePoolConfig};

    fn single(lambda: f64, servers: u32, minutes: f64) -> NetworkConfig {
        NetworkConfig {
            nodes: vec![NodeConfig::new("s", servers, minutes).source(lambda)],
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn invalid_config_rejected() {
        match NetworkEngine::new(NetworkConfig::default(), 1) {
            Err(ConfigError::NoNodes) => {}
            other => panic!("expected NoNodes, got {other:?}"),
        }
    }

    #[test]
    fn invalid_dt_rejected_without_side_effects() {
        let mut engine = NetworkEngine::new(single(60.0, 1, 1.0), 1).unwrap();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match engine.tick(dt) {
                Err(StepError::InvalidDt { .. }) => {}
                other => panic!("expected InvalidDt, got {other:?}"),
            }
        }
        assert_eq!(engine.current_tick(), TickId(0));
        assert_eq!(engine.time(), 0.0);
    }

    #[test]
    fn invalid_duration_rejected_without_side_effects() {
        let mut engine = NetworkEngine::new(single(60.0, 1, 1.0), 1).unwrap();
        for duration in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, -0.5] {
            match engine.advance(duration, 0.1) {
                Err(StepError::InvalidDuration { .. }) => {}
                other => panic!("expected InvalidDuration, got {other:?}"),
            }
        }
        assert_eq!(engine.current_tick(), TickId(0));
        assert_eq!(engine.time(), 0.0);
        assert_eq!(engine.advance(0.0, 0.1), Ok(0));
    }

    #[test]
    fn first_arrival_is_scheduled() {
        let engine = NetworkEngine::new(single(60.0, 1, 1.0), 1).unwrap();
        let next = engine.node(NodeId(0)).and_then(|n| n.next_arrival());
        assert!(next.is_some_and(|t| t >= 0.0));
    }

    #[test]
    fn non_source_has_no_arrivals() {
        let cfg = NetworkConfig {
            nodes: vec![NodeConfig::new("idle", 1, 1.0)],
            ..NetworkConfig::default()
        };
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        engine.advance(10.0, 0.5).unwrap();
        let node = engine.node(NodeId(0)).unwrap();
        assert_eq!(node.stats().admitted_count, 0);
        assert!(node.next_arrival().is_none());
    }

    #[test]
    fn burst_catch_up_in_one_tick() {
        // Deterministic arrivals every 0.1 minutes; one 1-minute tick
        // must generate all ten.
        let mut cfg = single(600.0, 1, 100.0);
        cfg.nodes[0] = cfg.nodes[0]
            .clone()
            .arrivals(Distribution::Deterministic)
            .service(Distribution::Deterministic);
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        let m = engine.tick(1.0).unwrap();
        assert!((9..=10).contains(&m.arrivals), "arrivals {}", m.arrivals);
        assert_eq!(engine.node(NodeId(0)).unwrap().occupancy() as u64, m.arrivals);
    }

    #[test]
    fn arrival_batch_multiplies_customers() {
        let mut cfg = single(60.0, 1, 100.0);
        cfg.nodes[0] = cfg.nodes[0]
            .clone()
            .arrivals(Distribution::Deterministic)
            .arrival_batch(3);
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        let m = engine.tick(1.0).unwrap();
        assert_eq!(m.arrivals, 3);
    }

    #[test]
    fn source_capacity_blocks_arrivals() {
        let mut cfg = single(600.0, 1, 1.0e6);
        cfg.nodes[0] = cfg.nodes[0]
            .clone()
            .arrivals(Distribution::Deterministic)
            .service(Distribution::Deterministic)
            .capacity(2);
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        engine.advance(1.0, 0.1).unwrap();
        let node = engine.node(NodeId(0)).unwrap();
        assert_eq!(node.occupancy(), 2);
        assert!(node.stats().blocked_count >= 7);
        assert_eq!(
            node.stats().admitted_count + node.stats().blocked_count,
            engine.next_customer
        );
    }

    #[test]
    fn exit_without_links() {
        let mut cfg = single(600.0, 2, 0.01);
        cfg.nodes[0] = cfg.nodes[0]
            .clone()
            .arrivals(Distribution::Deterministic)
            .service(Distribution::Deterministic);
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        engine.advance(1.0, 0.1).unwrap();
        assert!(engine.exit_count() >= 8);
        let stats = engine.node(NodeId(0)).unwrap().stats();
        assert_eq!(stats.served_count, engine.exit_count());
    }

    #[test]
    fn routed_customer_keeps_identity() {
        let cfg = NetworkConfig {
            nodes: vec![
                NodeConfig::new("a", 1, 0.01)
                    .source(60.0)
                    .arrivals(Distribution::Deterministic)
                    .service(Distribution::Deterministic),
                NodeConfig::new("b", 1, 1.0e6).service(Distribution::Deterministic),
            ],
            links: vec![LinkConfig::new("ab", "a", "b", 1.0)],
            resource_pools: Vec::new(),
        };
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        engine.advance(1.1, 0.1).unwrap();
        let b = engine.node(NodeId(1)).unwrap();
        let served = &b.servers()[0];
        assert!(served.is_busy());
        let customer = &served.batch()[0];
        assert_eq!(customer.id, CustomerId(0));
        // Re-stamped on arrival at b with its finish time at a.
        assert!(customer.arrival_time > 1.0 && customer.arrival_time < engine.time());
        assert!(customer.start_time >= customer.arrival_time);
    }

    #[test]
    fn pool_gates_service() {
        let cfg = NetworkConfig {
            nodes: vec![NodeConfig::new("w", 3, 1.0e6)
                .source(600.0)
                .arrivals(Distribution::Deterministic)
                .pool("p")],
            links: Vec::new(),
            resource_pools: vec![ResourcePoolConfig::new("p", 1)],
        };
        let mut engine = NetworkEngine::new(cfg, 1).unwrap();
        let m = engine.advance(1.0, 0.1).unwrap();
        assert!(m > 0);
        let node = engine.node(NodeId(0)).unwrap();
        assert_eq!(node.busy_servers(), 1);
        assert_eq!(engine.pools()[0].available, 0);
        assert!(engine.last_metrics().pool_stalls > 0);
    }

    #[test]
    fn reset_restores_time_zero() {
        let mut engine = NetworkEngine::new(single(120.0, 1, 0.2), 9).unwrap();
        engine.advance(30.0, 0.1).unwrap();
        assert!(engine.exit_count() > 0);
        let snap = engine.reset(10).unwrap();
        assert_eq!(snap.time(), 0.0);
        assert_eq!(snap.exit_count(), 0);
        assert_eq!(engine.current_tick(), TickId(0));
        assert_eq!(engine.seed(), 10);
        assert_eq!(engine.node(NodeId(0)).unwrap().stats(), &Default::default());
    }

    #[test]
    fn breakdowns_take_servers_offline() {
        let mut cfg = single(30.0, 2, 1.0);
        cfg.nodes[0] = cfg.nodes[0].clone().breakdown(5.0, 5.0);
        let mut engine = NetworkEngine::new(cfg, 3).unwrap();
        let mut failures = 0;
        let mut repairs = 0;
        for _ in 0..2000 {
            let m = engine.tick(0.1).unwrap();
            failures += m.failures;
            repairs += m.repairs;
        }
        assert!(failures > 0 && repairs > 0);
        let now = engine.time();
        for server in engine.node(NodeId(0)).unwrap().servers() {
            let offline = server.time_in(crate::ServerState::Offline, now);
            let share = offline / now;
            assert!(share > 0.2 && share < 0.8, "offline share {share}");
        }
    }
}
