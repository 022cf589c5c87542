//! Steady-state metrics for a single station.
//!
//! [`evaluate`] dispatches on [`QueueModel`]:
//!
//! - **Infinite servers**: `L = λ/μ`; `P0 = e^-L` (exact for Poisson
//!   arrivals); nobody waits.
//! - **Finite population**: birth-death chain with
//!   `p[n] = p[n-1] (N-n+1) r / min(n, s)`, `λ_eff = λ (N - L)`.
//! - **Finite capacity**: M/M/s/K normalization, blocking `P_K`,
//!   `Lq = Σ (n - s) p_n`, Allen-Cunneen scaling for general processes.
//! - **Standard**: Erlang-C, Allen-Cunneen scaling, plus a heavy-traffic
//!   bound. Exact for M/M/s and for M/G/1 (Pollaczek-Khinchine).
//!
//! Breakdowns scale μ by `MTBF / (MTBF + MTTR)` before any branch.

use sojourn_core::Distribution;

use crate::erlang::{birth_death, erlang_c, mms_ratio, queue_length};
use crate::error::TheoryError;
use crate::model::{QueueInput, QueueModel, TheoreticalMetrics};

/// Compute steady-state metrics for `input`.
///
/// # Errors
///
/// Returns [`TheoryError`] for rates that are not finite, a zero server
/// count, a capacity below the server count, an empty population, or
/// invalid breakdown parameters. Instability is reported through
/// [`TheoreticalMetrics::is_stable`], never as an error.
pub fn evaluate(input: &QueueInput) -> Result<TheoreticalMetrics, TheoryError> {
    if !input.lambda.is_finite() || input.lambda < 0.0 {
        return Err(TheoryError::InvalidArrivalRate {
            value: input.lambda,
        });
    }
    if !input.mu.is_finite() || input.mu <= 0.0 {
        return Err(TheoryError::InvalidServiceRate { value: input.mu });
    }
    if input.servers == 0 && input.model != QueueModel::InfiniteServers {
        return Err(TheoryError::NoServers);
    }

    let mut mu = input.mu;
    let mut suffix = String::new();
    if let Some(b) = input.breakdown {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(b.mtbf) || !valid(b.mttr) {
            return Err(TheoryError::InvalidBreakdown);
        }
        let availability = b.availability();
        mu *= availability;
        suffix = format!("; service rate scaled by availability {availability:.4}");
    }

    let mut metrics = match input.model {
        QueueModel::InfiniteServers => infinite_servers(input, mu),
        QueueModel::FinitePopulation { population } => {
            if population == 0 {
                return Err(TheoryError::EmptyPopulation);
            }
            finite_population(input, mu, population)
        }
        QueueModel::FiniteCapacity { capacity } => {
            if capacity < input.servers {
                return Err(TheoryError::CapacityBelowServers {
                    capacity,
                    servers: input.servers,
                });
            }
            finite_capacity(input, mu, capacity)
        }
        QueueModel::Standard => standard(input, mu),
    };
    metrics.note.push_str(&suffix);
    Ok(metrics)
}

fn kendall(input: &QueueInput) -> String {
    format!("{}/{}", input.arrival.kendall(), input.service.kendall())
}

/// `num / den`, or zero when nothing flows.
fn per_flow(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

fn infinite_servers(input: &QueueInput, mu: f64) -> TheoreticalMetrics {
    let l = input.lambda / mu;
    let exact = input.arrival.is_memoryless();
    let method = if exact {
        "exact"
    } else {
        "P0 approximate for non-Poisson arrivals"
    };
    TheoreticalMetrics {
        rho: l,
        p0: (-l).exp(),
        lq: 0.0,
        l,
        wq: 0.0,
        w: 1.0 / mu,
        effective_lambda: input.lambda,
        blocking_probability: 0.0,
        heavy_traffic_lq: None,
        is_stable: true,
        is_approximate: !exact,
        note: format!("{}/inf ({method})", kendall(input)),
    }
}

fn finite_population(input: &QueueInput, mu: f64, population: u32) -> TheoreticalMetrics {
    let s = input.servers;
    let r = input.lambda / mu;
    let n_total = f64::from(population);
    let p = birth_death(population, |n| {
        (n_total - f64::from(n) + 1.0) * r / f64::from(n.min(s))
    });

    let mut l = 0.0;
    let mut lq = 0.0;
    for (n, pn) in p.iter().enumerate() {
        let n = n as f64;
        l += n * pn;
        lq += (n - f64::from(s)).max(0.0) * pn;
    }
    let effective_lambda = input.lambda * (n_total - l);
    let exact = input.is_markovian();
    let method = if exact {
        "exact"
    } else {
        "Markovian chain applied to general processes"
    };
    TheoreticalMetrics {
        rho: effective_lambda / (f64::from(s) * mu),
        p0: p[0],
        lq,
        l,
        wq: per_flow(lq, effective_lambda),
        w: if effective_lambda > 0.0 {
            l / effective_lambda
        } else {
            1.0 / mu
        },
        effective_lambda,
        blocking_probability: 0.0,
        heavy_traffic_lq: None,
        is_stable: true,
        is_approximate: !exact,
        note: format!("{}/{s}//{population} ({method})", kendall(input)),
    }
}

fn finite_capacity(input: &QueueInput, mu: f64, capacity: u32) -> TheoreticalMetrics {
    let s = input.servers;
    let a = input.lambda / mu;
    let rho = a / f64::from(s);
    let p = birth_death(capacity, mms_ratio(a, s));
    let p0 = p[0];
    let blocking = p[p.len() - 1];
    let effective_lambda = input.lambda * (1.0 - blocking);

    let exact = input.is_markovian();
    let mut lq = queue_length(&p, s);
    if !exact {
        lq *= input.variability();
    }
    let l = lq + effective_lambda / mu;
    let method = if exact { "exact" } else { "Allen-Cunneen approximation" };
    TheoreticalMetrics {
        rho,
        p0,
        lq,
        l,
        wq: per_flow(lq, effective_lambda),
        w: if effective_lambda > 0.0 {
            l / effective_lambda
        } else {
            1.0 / mu
        },
        effective_lambda,
        blocking_probability: blocking,
        heavy_traffic_lq: None,
        is_stable: true,
        is_approximate: !exact,
        note: format!("{}/{s}/{capacity} ({method})", kendall(input)),
    }
}

fn standard(input: &QueueInput, mu: f64) -> TheoreticalMetrics {
    let s = input.servers;
    let a = input.lambda / mu;
    let rho = a / f64::from(s);
    let label = format!("{}/{s}", kendall(input));

    let erlang = match erlang_c(a, s) {
        Some(c) => c,
        None => {
            return TheoreticalMetrics::unstable(
                rho,
                input.lambda,
                format!("{label} (unstable: utilization {rho:.4} >= 1)"),
            )
        }
    };

    let variability = input.variability();
    let markovian = input.is_markovian();
    let pollaczek_khinchine = s == 1
        && input.arrival.is_memoryless()
        && !matches!(input.service, Distribution::Trace);
    let lq_markov = erlang.wait_probability * rho / (1.0 - rho);
    let lq = if markovian {
        lq_markov
    } else {
        lq_markov * variability
    };
    let method = if markovian {
        "exact"
    } else if pollaczek_khinchine {
        "exact, Pollaczek-Khinchine"
    } else {
        "Allen-Cunneen approximation"
    };
    let heavy_traffic = rho.powf((2.0 * (f64::from(s) + 1.0)).sqrt()) / (1.0 - rho) * variability;

    let wq = per_flow(lq, input.lambda);
    TheoreticalMetrics {
        rho,
        p0: erlang.p0,
        lq,
        l: lq + a,
        wq,
        w: wq + 1.0 / mu,
        effective_lambda: input.lambda,
        blocking_probability: 0.0,
        heavy_traffic_lq: Some(heavy_traffic),
        is_stable: true,
        is_approximate: !(markovian || pollaczek_khinchine),
        note: format!("{label} ({method})"),
    }
}
