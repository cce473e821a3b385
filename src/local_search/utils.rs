//! Utility functions for local search operations.

use crate::problem::{DistanceMatrix, Problem};
use crate::solution::{Route, Solution};

/// Cost change of inserting `customer` between the consecutive nodes `a` and `b`.
#[inline]
pub fn calculate_insertion_cost(matrix: &DistanceMatrix, a: usize, customer: usize, b: usize) -> f64 {
    matrix[a][customer] + matrix[customer][b] - matrix[a][b]
}

/// Cost change of removing `customer` from between its neighbours `a` and `b`.
#[inline]
pub fn calculate_removal_cost(matrix: &DistanceMatrix, a: usize, customer: usize, b: usize) -> f64 {
    matrix[a][b] - matrix[a][customer] - matrix[customer][b]
}

/// Demand carried by `route.nodes[..=cut]`.
pub fn prefix_load(route: &Route, cut: usize, problem: &Problem) -> f64 {
    route.nodes[..=cut].iter().map(|&n| problem.demand(n)).sum()
}

/// Check whether exchanging the tails after `cut1` and `cut2` overloads a vehicle.
///
/// Each route is split after its cut; the head of one route is combined with the
/// tail of the other and both combinations are checked against the capacity of the
/// route keeping the head.
pub fn capacity_is_violated(
    route1: &Route,
    cut1: usize,
    route2: &Route,
    cut2: usize,
    problem: &Problem,
) -> bool {
    let head1 = prefix_load(route1, cut1, problem);
    let tail1 = route1.load - head1;
    let head2 = prefix_load(route2, cut2, problem);
    let tail2 = route2.load - head2;

    head1 + tail2 > route1.capacity || head2 + tail1 > route2.capacity
}

/// Borrow two distinct routes mutably.
pub(crate) fn two_routes_mut(routes: &mut [Route], first: usize, second: usize) -> (&mut Route, &mut Route) {
    debug_assert_ne!(first, second);
    if first < second {
        let (left, right) = routes.split_at_mut(second);
        (&mut left[first], &mut right[0])
    } else {
        let (left, right) = routes.split_at_mut(first);
        (&mut right[0], &mut left[second])
    }
}

/// Panics in debug builds when incremental bookkeeping drifted from a recomputation.
#[inline]
pub(crate) fn debug_check_consistency(solution: &Solution, problem: &Problem, operator: &str) {
    debug_assert!(
        solution.is_consistent(problem),
        "cost drift after applying {}: {:?}",
        operator,
        solution
    );
}
