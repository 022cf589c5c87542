//! Inputs and outputs of the analytical engine.

use sojourn_core::{Breakdown, Distribution};

/// Queueing model variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueModel {
    /// Infinite buffer, infinite calling population (M/M/s, G/G/s).
    #[default]
    Standard,
    /// Unlimited servers (M/M/inf, G/G/inf).
    InfiniteServers,
    /// At most `capacity` customers in the system; the rest are lost.
    FiniteCapacity {
        /// Queue plus service capacity (K).
        capacity: u32,
    },
    /// Closed population of `population` customers (machine repair).
    /// The arrival rate is per idle customer.
    FinitePopulation {
        /// Number of customers (N).
        population: u32,
    },
}

/// Parameters for [`evaluate`](crate::evaluate).
#[derive(Clone, Debug, PartialEq)]
pub struct QueueInput {
    /// Arrival rate λ.
    pub lambda: f64,
    /// Per-server service rate μ.
    pub mu: f64,
    /// Number of servers s. Ignored by [`QueueModel::InfiniteServers`].
    pub servers: u32,
    /// Model variant.
    pub model: QueueModel,
    /// Arrival process family.
    pub arrival: Distribution,
    /// Service time family.
    pub service: Distribution,
    /// Server failures; scales μ by availability when present.
    pub breakdown: Option<Breakdown>,
}

impl QueueInput {
    /// Markovian standard model with `servers` servers.
    pub fn new(lambda: f64, mu: f64, servers: u32) -> Self {
        Self {
            lambda,
            mu,
            servers,
            model: QueueModel::Standard,
            arrival: Distribution::Poisson,
            service: Distribution::Poisson,
            breakdown: None,
        }
    }

    /// Set the model variant.
    #[must_use]
    pub fn model(mut self, model: QueueModel) -> Self {
        self.model = model;
        self
    }

    /// Set the arrival process.
    #[must_use]
    pub fn arrival(mut self, arrival: Distribution) -> Self {
        self.arrival = arrival;
        self
    }

    /// Set the service distribution.
    #[must_use]
    pub fn service(mut self, service: Distribution) -> Self {
        self.service = service;
        self
    }

    /// Enable server breakdowns.
    #[must_use]
    pub fn breakdown(mut self, breakdown: Breakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    /// Allen-Cunneen variability factor `(c_a² + c_s²) / 2`.
    pub fn variability(&self) -> f64 {
        (self.arrival.scv() + self.service.scv()) / 2.0
    }

    /// Whether both processes are memoryless.
    pub fn is_markovian(&self) -> bool {
        self.arrival.is_memoryless() && self.service.is_memoryless()
    }
}

/// Steady-state performance of one station.
///
/// When `is_stable` is false, `lq`, `l`, `wq`, and `w` are `+inf` and
/// must not be used as numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct TheoreticalMetrics {
    /// Per-server offered utilization λ/(sμ). For infinite-server models
    /// this is the offered load λ/μ in Erlangs; for finite populations
    /// it uses the effective arrival rate.
    pub rho: f64,
    /// Probability the system is empty.
    pub p0: f64,
    /// Mean number waiting.
    pub lq: f64,
    /// Mean number in system.
    pub l: f64,
    /// Mean wait in queue.
    pub wq: f64,
    /// Mean time in system.
    pub w: f64,
    /// Arrival rate that actually enters service.
    pub effective_lambda: f64,
    /// Probability an arrival is lost (finite capacity only).
    pub blocking_probability: f64,
    /// Heavy-traffic diffusion estimate of `lq`, for standard models.
    pub heavy_traffic_lq: Option<f64>,
    /// Whether a steady state exists.
    pub is_stable: bool,
    /// Whether any figure is an approximation.
    pub is_approximate: bool,
    /// Kendall notation and method.
    pub note: String,
}

impl TheoreticalMetrics {
    /// Metrics for a model with no steady state.
    pub(crate) fn unstable(rho: f64, lambda: f64, note: String) -> Self {
        Self {
            rho,
            p0: 0.0,
            lq: f64::INFINITY,
            l: f64::INFINITY,
            wq: f64::INFINITY,
            w: f64::INFINITY,
            effective_lambda: lambda,
            blocking_probability: 0.0,
            heavy_traffic_lq: None,
            is_stable: false,
            is_approximate: false,
            note,
        }
    }
}
