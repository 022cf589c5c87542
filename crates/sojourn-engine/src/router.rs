//! Next-hop selection for departing customers.
//!
//! Both strategies are pure: they see the candidate links and, for
//! shortest-queue, a load lookup, and return a [`Route`]. Capacity is
//! checked by the caller after a route is chosen.

use sojourn_core::{LinkId, LinkSpec, NodeId, PriorityClass, RoutingStrategy};

/// Where a departing customer goes next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Leave the network.
    Exit,
    /// Follow this link.
    Forward(LinkId),
}

/// Pick a route using `strategy`.
///
/// `draw` is consulted only by the probabilistic strategy, and at most
/// once.
pub fn select<'a, I, L, D>(
    strategy: RoutingStrategy,
    links: I,
    class: PriorityClass,
    load: L,
    draw: D,
) -> Route
where
    I: IntoIterator<Item = &'a LinkSpec>,
    L: Fn(NodeId) -> usize,
    D: FnOnce() -> f64,
{
    match strategy {
        RoutingStrategy::Probabilistic => probabilistic(links, class, draw()),
        RoutingStrategy::ShortestQueue => shortest_queue(links, load),
    }
}

/// Walk `links` in order, accumulating each link's probability for
/// `class`, and take the first whose running total exceeds `draw`.
///
/// Falls through to [`Route::Exit`] when the probabilities sum to at
/// most `draw`.
pub fn probabilistic<'a>(
    links: impl IntoIterator<Item = &'a LinkSpec>,
    class: PriorityClass,
    draw: f64,
) -> Route {
    let mut cumulative = 0.0;
    for link in links {
        cumulative += link.probability_for(class);
        if cumulative > draw {
            return Route::Forward(link.id);
        }
    }
    Route::Exit
}

/// Take the link whose destination has the smallest `load`; ties go to
/// the earliest link.
pub fn shortest_queue<'a>(
    links: impl IntoIterator<Item = &'a LinkSpec>,
    load: impl Fn(NodeId) -> usize,
) -> Route {
    let mut best: Option<(usize, LinkId)> = None;
    for link in links {
        let l = load(link.target);
        if best.map_or(true, |(b, _)| l < b) {
            best = Some((l, link.id));
        }
    }
    best.map_or(Route::Exit, |(_, id)| Route::Forward(id))
}
