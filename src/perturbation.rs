//! Stochastic perturbation operators.
//!
//! These operators judge routes by their tonnage cost rather than by distance,
//! which makes route direction relevant. Accepted changes always leave route
//! cost, route load and the solution cost consistent with the node sequences.

use crate::problem::Problem;
use crate::solution::{tonnage_cost_of, Solution};
use itertools::Itertools;
use log::trace;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

/// Acceptance factor of [`segment_shuffle`].
pub const SHUFFLE_ACCEPTANCE: f64 = 0.98;

/// Exchange two blocks of two adjacent customers, across routes or within one.
///
/// Only routes with at least two customers take part, so both routes keep a
/// customer. The exchange is kept only if both vehicles stay within capacity and
/// the combined tonnage cost does not exceed `tolerance` times the previous one.
/// Returns whether the solution changed.
pub fn block_exchange<R: Rng>(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut R,
    tolerance: f64,
) -> bool {
    let eligible: Vec<usize> = (0..solution.routes.len())
        .filter(|&r| solution.routes[r].len() >= 2)
        .collect();
    let (Some(&r1), Some(&r2)) = (eligible.choose(rng), eligible.choose(rng)) else {
        return false;
    };

    let mut first = solution.routes[r1].customers().to_vec();
    let p1 = rng.gen_range(0..first.len() - 1);

    if r1 == r2 {
        let old_cost = tonnage_cost_of(&first, problem);
        let starts: Vec<usize> = (0..first.len() - 1)
            .filter(|&p| p.abs_diff(p1) >= 2)
            .collect();
        let Some(&p2) = starts.choose(rng) else {
            return false;
        };

        first.swap(p1, p2);
        first.swap(p1 + 1, p2 + 1);

        if tonnage_cost_of(&first, problem) > old_cost * tolerance {
            return false;
        }
        trace!("Block exchange inside route {} at {} and {}", r1, p1, p2);
        replace_customers(solution, problem, r1, &first);
        return true;
    }

    let mut second = solution.routes[r2].customers().to_vec();
    let p2 = rng.gen_range(0..second.len() - 1);
    let old_cost = tonnage_cost_of(&first, problem) + tonnage_cost_of(&second, problem);

    let block1 = problem.demand(first[p1]) + problem.demand(first[p1 + 1]);
    let block2 = problem.demand(second[p2]) + problem.demand(second[p2 + 1]);
    let (route1, route2) = (&solution.routes[r1], &solution.routes[r2]);
    if route1.load - block1 + block2 > route1.capacity
        || route2.load - block2 + block1 > route2.capacity
    {
        return false;
    }

    for offset in 0..2 {
        std::mem::swap(&mut first[p1 + offset], &mut second[p2 + offset]);
    }

    let new_cost = tonnage_cost_of(&first, problem) + tonnage_cost_of(&second, problem);
    if new_cost > old_cost * tolerance {
        return false;
    }

    trace!(
        "Block exchange between routes {} and {}: {:.2} -> {:.2}",
        r1,
        r2,
        old_cost,
        new_cost
    );
    replace_customers(solution, problem, r1, &first);
    replace_customers(solution, problem, r2, &second);
    true
}

/// Try one random reordering of three consecutive customers of a random route.
///
/// The new order is kept if its tonnage cost is at most [`SHUFFLE_ACCEPTANCE`]
/// times the previous one. Returns whether the solution changed.
pub fn segment_shuffle<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) -> bool {
    let Some(r) = (0..solution.routes.len())
        .filter(|&r| solution.routes[r].len() >= 3)
        .choose(rng)
    else {
        return false;
    };

    let customers = solution.routes[r].customers().to_vec();
    let start = rng.gen_range(0..=customers.len() - 3);
    let window = &customers[start..start + 3];

    let orders: Vec<Vec<usize>> = window
        .iter()
        .copied()
        .permutations(3)
        .filter(|order| order.as_slice() != window)
        .collect();
    let Some(order) = orders.choose(rng) else {
        return false;
    };

    let mut candidate = customers.clone();
    candidate[start..start + 3].copy_from_slice(order);

    let old_cost = tonnage_cost_of(&customers, problem);
    if tonnage_cost_of(&candidate, problem) > SHUFFLE_ACCEPTANCE * old_cost {
        return false;
    }

    trace!("Segment shuffle in route {} at {}: {:?}", r, start, order);
    replace_customers(solution, problem, r, &candidate);
    true
}

/// Reverse every route whose reversed direction has a lower tonnage cost.
///
/// Returns the number of reversed routes.
pub fn full_reversal(solution: &mut Solution, problem: &Problem) -> usize {
    let mut reversed = 0;

    for r in 0..solution.routes.len() {
        let mut candidate = solution.routes[r].customers().to_vec();
        let old_cost = tonnage_cost_of(&candidate, problem);
        candidate.reverse();

        if tonnage_cost_of(&candidate, problem) < old_cost {
            replace_customers(solution, problem, r, &candidate);
            reversed += 1;
        }
    }

    reversed
}

/// Reverse one random sub-segment of every route, keeping reversals that lower
/// the tonnage cost.
///
/// Returns the number of routes changed.
pub fn partial_reversal<R: Rng>(solution: &mut Solution, problem: &Problem, rng: &mut R) -> usize {
    let mut changed = 0;

    for r in 0..solution.routes.len() {
        let customers = solution.routes[r].customers().to_vec();
        if customers.len() < 2 {
            continue;
        }

        let i = rng.gen_range(0..customers.len() - 1);
        let j = rng.gen_range(i + 1..customers.len());

        let mut candidate = customers.clone();
        candidate[i..=j].reverse();

        if tonnage_cost_of(&candidate, problem) < tonnage_cost_of(&customers, problem) {
            replace_customers(solution, problem, r, &candidate);
            changed += 1;
        }
    }

    changed
}

/// Replace the customers of a route and restore every cost and load.
fn replace_customers(solution: &mut Solution, problem: &Problem, index: usize, customers: &[usize]) {
    let route = &mut solution.routes[index];
    let end = route.nodes.len() - 1;
    route.nodes.splice(1..end, customers.iter().copied());
    route.update_cost_and_load(problem);
    solution.cost = solution.routes.iter().map(|r| r.cost).sum();
}
