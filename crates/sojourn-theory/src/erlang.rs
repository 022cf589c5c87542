//! Erlang formulas and birth-death chain helpers.
//!
//! Unnormalized terms such as `a^n / n!` or `ρ^n` overflow long before
//! the probabilities they normalize into stop being meaningful, so every
//! helper here works either through a bounded recursion or with
//! logarithms rescaled by the largest term.

/// Result of the Erlang-C calculation for an M/M/s queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErlangC {
    /// Probability the system is empty.
    pub p0: f64,
    /// Probability an arrival has to wait.
    pub wait_probability: f64,
}

/// Erlang-C for an M/M/s queue.
///
/// `a` is the offered load `λ/μ` in Erlangs, `servers` the server count.
/// The waiting probability comes from the Erlang-B recursion
/// (`C = B / (1 - ρ(1 - B))`); `P0` from a log-domain sum of the
/// state weights. Returns `None` when `a >= servers` (no steady state).
pub fn erlang_c(a: f64, servers: u32) -> Option<ErlangC> {
    let s = f64::from(servers);
    let rho = a / s;
    if servers == 0 || rho >= 1.0 {
        return None;
    }
    let b = erlang_b(a, servers);
    let wait_probability = b / (1.0 - rho * (1.0 - b));

    // ln(a^n / n!) for n < s, then the geometric tail a^s / (s! (1 - ρ)).
    let ln_a = a.ln();
    let mut ln_term = 0.0;
    let mut ln_total = f64::NEG_INFINITY;
    for n in 0..servers {
        ln_total = ln_add(ln_total, ln_term);
        ln_term += ln_a - f64::from(n + 1).ln();
    }
    ln_total = ln_add(ln_total, ln_term - (1.0 - rho).ln());
    Some(ErlangC {
        p0: (-ln_total).exp(),
        wait_probability,
    })
}

/// Erlang-B blocking probability for an M/M/s/s loss system.
///
/// Uses the stable recursion `B(n) = a B(n-1) / (n + a B(n-1))`.
pub fn erlang_b(a: f64, servers: u32) -> f64 {
    let mut b = 1.0;
    for n in 1..=servers {
        let ab = a * b;
        b = ab / (f64::from(n) + ab);
    }
    b
}

/// Normalized stationary distribution of a birth-death chain on
/// states `0..=max_state`.
///
/// `ratio(n)` is `λ_{n-1} / μ_n`, the factor taking the unnormalized
/// probability of state `n-1` to state `n`. Weights are accumulated as
/// logarithms and rescaled by the largest before normalizing, so long
/// chains with ratios above one stay finite.
pub fn birth_death<F>(max_state: u32, ratio: F) -> Vec<f64>
where
    F: Fn(u32) -> f64,
{
    let mut ln_p = Vec::with_capacity(max_state as usize + 1);
    let mut last = 0.0;
    let mut peak = 0.0f64;
    ln_p.push(last);
    for n in 1..=max_state {
        last += ratio(n).ln();
        peak = peak.max(last);
        ln_p.push(last);
    }
    let mut p: Vec<f64> = ln_p.into_iter().map(|l| (l - peak).exp()).collect();
    let total: f64 = p.iter().sum();
    for v in &mut p {
        *v /= total;
    }
    p
}

/// Mean number waiting, `Σ (n - s) p_n`, over a normalized distribution.
pub fn queue_length(p: &[f64], servers: u32) -> f64 {
    p.iter()
        .enumerate()
        .skip(servers as usize + 1)
        .map(|(n, pn)| (n as f64 - f64::from(servers)) * pn)
        .sum()
}

/// Occupancy ratio for an M/M/s chain truncated at `capacity`.
pub(crate) fn mms_ratio(a: f64, servers: u32) -> impl Fn(u32) -> f64 {
    move |n| a / f64::from(n.min(servers))
}

/// `ln(e^x + e^y)` without leaving the log domain.
fn ln_add(x: f64, y: f64) -> f64 {
    let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}
