//! Runtime state of customers, servers, and nodes.

use std::collections::VecDeque;

use serde::Serialize;
use smallvec::SmallVec;
use sojourn_core::{CustomerId, PoolId, PriorityClass};

use crate::pool::PoolLease;

/// Customers served together by one server.
pub type Batch = SmallVec<[Customer; 4]>;

// ── Customer ───────────────────────────────────────────────────────

/// One unit of work travelling through the network.
///
/// `arrival_time` is the time the customer reached its current node;
/// `start_time` and `finish_time` describe the most recent service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Customer {
    /// Identity, preserved across legs.
    pub id: CustomerId,
    /// Arrival at the current node, in minutes.
    pub arrival_time: f64,
    /// Start of the latest service.
    pub start_time: f64,
    /// End of the latest service.
    pub finish_time: f64,
    /// Priority class, assigned at generation.
    pub class: PriorityClass,
    /// Skill tag; carried but not used for routing.
    pub required_skill: Option<String>,
}

impl Customer {
    /// A customer that has just arrived at `time`.
    pub fn new(id: CustomerId, time: f64, class: PriorityClass) -> Self {
        Self {
            id,
            arrival_time: time,
            start_time: 0.0,
            finish_time: 0.0,
            class,
            required_skill: None,
        }
    }
}

// ── Server ─────────────────────────────────────────────────────────

/// Server availability state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ServerState {
    /// Available to start a batch.
    Idle,
    /// Serving a batch.
    Busy,
    /// Failed and under repair.
    Offline,
}

/// A contiguous interval spent in one state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Segment {
    /// State during the interval.
    pub state: ServerState,
    /// Start, in minutes.
    pub start: f64,
    /// End, or `None` for the current segment.
    pub end: Option<f64>,
}

impl Segment {
    fn duration_until(&self, now: f64) -> f64 {
        (self.end.unwrap_or(now).min(now) - self.start).max(0.0)
    }
}

/// One server at a node.
///
/// A server is `Busy` exactly when it holds a non-empty batch. The
/// timeline records every state change and always ends in one open
/// segment matching the current state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Server {
    index: usize,
    state: ServerState,
    batch: Batch,
    finish_time: f64,
    held_pool: Option<PoolId>,
    timeline: Vec<Segment>,
    next_failure: Option<f64>,
    repair_at: Option<f64>,
}

impl Server {
    /// An idle server whose timeline starts at `now`.
    pub(crate) fn new(index: usize, now: f64) -> Self {
        Self {
            index,
            state: ServerState::Idle,
            batch: Batch::new(),
            finish_time: 0.0,
            held_pool: None,
            timeline: vec![Segment {
                state: ServerState::Idle,
                start: now,
                end: None,
            }],
            next_failure: None,
            repair_at: None,
        }
    }

    /// Position within the node.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current state.
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Customers in service.
    pub fn batch(&self) -> &[Customer] {
        &self.batch
    }

    /// Scheduled completion of the current batch.
    pub fn finish_time(&self) -> Option<f64> {
        (self.state == ServerState::Busy).then_some(self.finish_time)
    }

    /// Pool unit held while busy.
    pub fn held_pool(&self) -> Option<PoolId> {
        self.held_pool
    }

    /// Next scheduled failure, when breakdowns are enabled.
    pub fn next_failure(&self) -> Option<f64> {
        self.next_failure
    }

    /// End of the current repair.
    pub fn repair_at(&self) -> Option<f64> {
        self.repair_at
    }

    /// Whether the server can start a batch.
    pub fn is_idle(&self) -> bool {
        self.state == ServerState::Idle
    }

    /// Whether the server is serving a batch.
    pub fn is_busy(&self) -> bool {
        self.state == ServerState::Busy
    }

    /// State history, oldest first.
    pub fn timeline(&self) -> &[Segment] {
        &self.timeline
    }

    /// Total time spent in `state` up to `now`.
    pub fn time_in(&self, state: ServerState, now: f64) -> f64 {
        self.timeline
            .iter()
            .filter(|s| s.state == state)
            .map(|s| s.duration_until(now))
            .sum()
    }

    /// Close the open segment and open one for `state`.
    ///
    /// Event times are clamped to the open segment's start so the
    /// timeline stays ordered when a deferred event is applied late.
    fn transition(&mut self, state: ServerState, at: f64) -> f64 {
        let mut at = at;
        if let Some(open) = self.timeline.last_mut() {
            at = at.max(open.start);
            open.end = Some(at);
        }
        self.timeline.push(Segment {
            state,
            start: at,
            end: None,
        });
        self.state = state;
        at
    }

    pub(crate) fn start(&mut self, batch: Batch, start: f64, finish: f64, pool: Option<PoolId>) {
        debug_assert!(self.is_idle() && !batch.is_empty());
        self.batch = batch;
        self.finish_time = finish;
        self.held_pool = pool;
        self.transition(ServerState::Busy, start);
    }

    /// Finish the current batch and return its customers.
    pub(crate) fn complete(&mut self) -> Batch {
        let finish = self.finish_time;
        self.held_pool = None;
        self.transition(ServerState::Idle, finish);
        std::mem::take(&mut self.batch)
    }

    pub(crate) fn schedule_failure(&mut self, at: Option<f64>) {
        self.next_failure = at;
    }

    /// Go offline at the scheduled failure time. Returns the effective time.
    pub(crate) fn fail(&mut self, repair_duration: f64) -> f64 {
        let at = self.next_failure.take().unwrap_or(0.0);
        let at = self.transition(ServerState::Offline, at);
        self.repair_at = Some(at + repair_duration);
        at
    }

    /// Come back online at the scheduled repair time. Returns that time.
    pub(crate) fn repair(&mut self) -> f64 {
        let at = self.repair_at.take().unwrap_or(0.0);
        self.transition(ServerState::Idle, at)
    }
}

// ── Node ───────────────────────────────────────────────────────────

/// Running totals for one node.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeStats {
    /// Sum of queue waits over every customer admitted to service.
    pub total_wait: f64,
    /// Customers that completed service here.
    pub served_count: u64,
    /// Customers admitted to service here.
    pub started_count: u64,
    /// Average wait per served customer, in minutes.
    pub current_wq: f64,
    /// Fraction of servers busy at the end of the last tick.
    pub utilization: f64,
    /// Customers lost here: at the door for sources, or at a full
    /// downstream node when routing out of here.
    pub blocked_count: u64,
    /// Customers accepted into the queue.
    pub admitted_count: u64,
    /// Integral of occupancy over time.
    pub occupancy_area: f64,
    /// Integral of busy servers over time.
    pub busy_area: f64,
}

impl NodeStats {
    /// Time-averaged number of customers present over `elapsed` minutes.
    pub fn mean_occupancy(&self, elapsed: f64) -> f64 {
        if elapsed > 0.0 {
            self.occupancy_area / elapsed
        } else {
            0.0
        }
    }

    /// Time-averaged fraction of `servers` busy over `elapsed` minutes.
    pub fn mean_utilization(&self, elapsed: f64, servers: u32) -> f64 {
        if elapsed > 0.0 && servers > 0 {
            self.busy_area / (elapsed * f64::from(servers))
        } else {
            0.0
        }
    }
}

/// Queue, servers, and statistics of one node.
#[derive(Debug)]
pub struct NodeState {
    pub(crate) queue: VecDeque<Customer>,
    pub(crate) servers: Vec<Server>,
    pub(crate) leases: Vec<Option<PoolLease>>,
    pub(crate) stats: NodeStats,
    pub(crate) next_arrival: Option<f64>,
}

impl NodeState {
    pub(crate) fn new(server_count: u32) -> Self {
        let servers: Vec<Server> = (0..server_count as usize).map(|i| Server::new(i, 0.0)).collect();
        let leases = servers.iter().map(|_| None).collect();
        Self {
            queue: VecDeque::new(),
            servers,
            leases,
            stats: NodeStats::default(),
            next_arrival: None,
        }
    }

    /// Waiting customers, front first.
    pub fn queue(&self) -> &VecDeque<Customer> {
        &self.queue
    }

    /// Servers in index order.
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Running totals.
    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Next external arrival event, for sources.
    pub fn next_arrival(&self) -> Option<f64> {
        self.next_arrival
    }

    /// Customers waiting plus customers in service.
    pub fn occupancy(&self) -> usize {
        self.queue.len() + self.in_service()
    }

    /// Customers in service across all servers.
    pub fn in_service(&self) -> usize {
        self.servers.iter().map(|s| s.batch.len()).sum()
    }

    /// Servers currently busy.
    pub fn busy_servers(&self) -> usize {
        self.servers.iter().filter(|s| s.is_busy()).count()
    }

    /// Pool units held by this node's servers.
    pub fn leases_held(&self) -> usize {
        self.leases.iter().filter(|l| l.is_some()).count()
    }

    pub(crate) fn idle_server(&self) -> Option<usize> {
        self.servers.iter().position(Server::is_idle)
    }
}
