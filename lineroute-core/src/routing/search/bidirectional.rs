use std::time::Instant;

use log::{debug, trace};

use super::budget::SearchBudget;
use super::path::{GraphPath, Hop};
use super::state::{Frontier, Relaxation, Slot};
use super::stats::{SearchStats, TraversedEdges};
use crate::config::MeetRule;
use crate::model::RouteGraph;
use crate::routing::Heuristic;
use crate::{EdgeId, Meters, VertexId};

// Distinct meetings remembered for the alternative path
const MEET_HISTORY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidirectionalOptions {
    pub heuristic: Heuristic,
    pub meet_rule: MeetRule,
    /// Weight of the heuristic in both frontiers' keys once they have met
    pub dampening: f64,
}

impl Default for BidirectionalOptions {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            meet_rule: MeetRule::default(),
            dampening: 0.75,
        }
    }
}

/// Result of a search grown from both endpoints
#[derive(Debug, Clone)]
pub struct BidirectionalOutcome {
    pub path: Option<GraphPath>,
    /// Cheapest meeting that yields a different route than `path`
    pub alternative: Option<GraphPath>,
    pub stats: SearchStats,
    pub traversed: TraversedEdges,
    /// The start-side frontier emptied without meeting the other one
    pub failed_at_start: bool,
    /// The finish-side frontier emptied without meeting the other one
    pub failed_at_finish: bool,
    pub interrupted: bool,
}

impl BidirectionalOutcome {
    fn empty() -> Self {
        Self {
            path: None,
            alternative: None,
            stats: SearchStats::default(),
            traversed: TraversedEdges::default(),
            failed_at_start: false,
            failed_at_finish: false,
            interrupted: false,
        }
    }
}

/// Edge joining the two trees.
///
/// `forward` and `backward` are the slots of the edge ends in their own
/// trees, in travel order.
#[derive(Debug, Clone, Copy)]
struct Meet {
    cost: Meters,
    forward: Slot,
    backward: Slot,
    edge: EdgeId,
    reversed: bool,
    weight: Meters,
}

impl Meet {
    fn same_junction(&self, other: &Meet) -> bool {
        self.forward == other.forward && self.backward == other.backward
    }
}

#[derive(Debug, Default)]
struct Meetings {
    ranked: Vec<Meet>,
    candidates: usize,
}

impl Meetings {
    fn offer(&mut self, meet: Meet) {
        if !meet.cost.is_finite() {
            return;
        }
        self.candidates += 1;

        if let Some(pos) = self.ranked.iter().position(|m| m.same_junction(&meet)) {
            if self.ranked[pos].cost <= meet.cost {
                return;
            }
            self.ranked.remove(pos);
        }
        let at = self.ranked.partition_point(|m| m.cost <= meet.cost);
        if at < MEET_HISTORY {
            self.ranked.insert(at, meet);
            self.ranked.truncate(MEET_HISTORY);
        }
    }

    fn best_cost(&self) -> Meters {
        self.ranked.first().map_or(f64::INFINITY, |meet| meet.cost)
    }

    fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Shortest path from `src` to `dst`, searched from both ends at once.
///
/// The backward tree grows over mirror edges, which is valid because the
/// graph stores every edge in both directions.
pub fn bidirectional_path_search(
    graph: &RouteGraph,
    src: VertexId,
    dst: VertexId,
    options: &BidirectionalOptions,
) -> BidirectionalOutcome {
    bidirectional_path_search_with_budget(graph, src, dst, options, &SearchBudget::unlimited())
}

/// [`bidirectional_path_search`] that gives up once `budget` runs out
pub fn bidirectional_path_search_with_budget(
    graph: &RouteGraph,
    src: VertexId,
    dst: VertexId,
    options: &BidirectionalOptions,
    budget: &SearchBudget,
) -> BidirectionalOutcome {
    if !graph.contains_vertex(src) || !graph.contains_vertex(dst) {
        debug!(
            "Bidirectional endpoints {} -> {} are not in the graph",
            src.index(),
            dst.index()
        );
        return BidirectionalOutcome::empty();
    }
    if src == dst {
        return BidirectionalOutcome {
            path: Some(GraphPath::new(vec![src], Vec::new(), 0.0)),
            ..BidirectionalOutcome::empty()
        };
    }

    let started = Instant::now();
    let heuristic = options.heuristic;
    let mut forward = Frontier::new(graph, src, dst, heuristic);
    let mut backward = Frontier::new(graph, dst, src, heuristic);
    let mut meetings = Meetings::default();
    let mut direct = None;
    let mut dampened = false;
    let mut interrupted = false;
    let mut iteration = 0;

    // One settle per side and round
    'search: loop {
        for side in [Side::Forward, Side::Backward] {
            if budget.interrupted(iteration) {
                interrupted = true;
                break 'search;
            }
            iteration += 1;

            if should_stop(&mut forward, &mut backward, &meetings, options) {
                break 'search;
            }

            let step = match side {
                Side::Forward => advance(&mut forward, &backward, side, dst, &mut meetings),
                Side::Backward => advance(&mut backward, &forward, side, src, &mut meetings),
            };
            match step {
                Step::Exhausted => break 'search,
                Step::Reached(path) => {
                    direct = Some(path);
                    break 'search;
                }
                Step::Expanded => {}
            }

            if !dampened && !meetings.is_empty() && heuristic.is_enabled() {
                trace!(
                    "Frontiers met at {:.1} m after {} iterations, dampening heuristic",
                    meetings.best_cost(),
                    iteration
                );
                forward.reweight(options.dampening);
                backward.reweight(options.dampening);
                dampened = true;
            }
        }
    }

    let (path, alternative) = if interrupted {
        (None, None)
    } else {
        let mut candidates: Vec<GraphPath> = direct
            .into_iter()
            .chain(
                meetings
                    .ranked
                    .iter()
                    .map(|meet| assemble(&forward, &backward, meet)),
            )
            .collect();
        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let mut candidates = candidates.into_iter();
        let path = candidates.next();
        let alternative = path.as_ref().and_then(|best| {
            candidates.find(|candidate| candidate.is_simple() && candidate.hops != best.hops)
        });
        (path, alternative)
    };

    let (failed_at_start, failed_at_finish) = if path.is_none() && !interrupted {
        (forward.peek().is_none(), backward.peek().is_none())
    } else {
        (false, false)
    };

    let mut stats = SearchStats::combined(&forward.stats(), &backward.stats());
    stats.elapsed = started.elapsed();
    let (_, mut traversed) = forward.into_parts();
    let (_, backward_traversed) = backward.into_parts();
    traversed.union_with(&backward_traversed);

    debug!(
        "Bidirectional {:?} search {} -> {}: found={}, meetings={}, failed_at_start={}, failed_at_finish={}, interrupted={}, expanded={}",
        heuristic,
        src.index(),
        dst.index(),
        path.is_some(),
        meetings.candidates,
        failed_at_start,
        failed_at_finish,
        interrupted,
        stats.nodes_expanded
    );

    BidirectionalOutcome {
        path,
        alternative,
        stats,
        traversed,
        failed_at_start,
        failed_at_finish,
        interrupted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Forward,
    Backward,
}

enum Step {
    Expanded,
    Exhausted,
    /// The frontier settled the other side's root
    Reached(GraphPath),
}

/// Checks the configured meet rule against both frontier tops.
///
/// With a consistent heuristic an open vertex keyed at or above the best
/// meeting cost cannot lie on a cheaper route, which also holds for the
/// dampened keys. Without a heuristic the classic `g_f + g_b >= mu` test
/// applies as well.
fn should_stop(
    forward: &mut Frontier<'_>,
    backward: &mut Frontier<'_>,
    meetings: &Meetings,
    options: &BidirectionalOptions,
) -> bool {
    let (Some(top_f), Some(top_b)) = (forward.peek(), backward.peek()) else {
        return true;
    };

    match options.meet_rule {
        MeetRule::StoppingInequality => {
            let mu = meetings.best_cost();
            top_f.key >= mu
                || top_b.key >= mu
                || (!options.heuristic.is_enabled() && top_f.g + top_b.g >= mu)
        }
        MeetRule::CandidateCollection { min_candidates } => meetings.candidates >= min_candidates,
    }
}

/// Settles and expands one vertex of `own`, recording every edge that
/// reaches a vertex labelled by `other`
fn advance(
    own: &mut Frontier<'_>,
    other: &Frontier<'_>,
    side: Side,
    target: VertexId,
    meetings: &mut Meetings,
) -> Step {
    let Some(slot) = own.settle() else {
        return Step::Exhausted;
    };
    if own.node(slot).vertex == target {
        let path = match side {
            Side::Forward => own.path_from_root(slot),
            Side::Backward => own.path_to_root(slot),
        };
        return Step::Reached(path);
    }

    own.expand(slot, |relax: Relaxation| {
        let Some(far) = other.slot_of(relax.to) else {
            return;
        };
        let (forward, backward) = match side {
            Side::Forward => (relax.from, far),
            Side::Backward => (far, relax.from),
        };
        meetings.offer(Meet {
            cost: relax.cost + other.node(far).g,
            forward,
            backward,
            edge: relax.edge,
            reversed: side == Side::Backward,
            weight: relax.weight,
        });
    });
    Step::Expanded
}

/// Start tree branch, joining edge, finish tree branch
fn assemble(forward: &Frontier<'_>, backward: &Frontier<'_>, meet: &Meet) -> GraphPath {
    let head = forward.path_from_root(meet.forward);
    let tail = backward.path_to_root(meet.backward);
    let bridge = GraphPath::new(
        vec![head.target(), tail.source()],
        vec![Hop {
            edge: meet.edge,
            reversed: meet.reversed,
        }],
        meet.weight,
    );
    head.join(bridge).join(tail)
}
