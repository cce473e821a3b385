//! Swap neighborhood for local search.

use crate::problem::{DistanceMatrix, Problem};
use crate::solution::Solution;

use super::utils::{debug_check_consistency, two_routes_mut};
use super::{Metric, MoveFilter};

/// Exchanges the customers at two positions, in the same route or across routes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapMove {
    pub first_route: usize,
    pub first_position: usize,
    pub second_route: usize,
    pub second_position: usize,
    /// Distance change of the first route (cross-route moves only)
    pub cost_change_first: f64,
    /// Distance change of the second route (cross-route moves only)
    pub cost_change_second: f64,
    pub move_cost: f64,
    pub penalized_cost: f64,
}

/// Cost change of replacing `old` by `new` between the neighbours `a` and `c`.
#[inline]
fn replacement_cost(m: &DistanceMatrix, a: usize, old: usize, new: usize, c: usize) -> f64 {
    m[a][new] + m[new][c] - m[a][old] - m[old][c]
}

/// Scan every swap and return the cheapest admissible one.
///
/// Each unordered pair of positions is visited once. Swapping two neighbours of
/// the same route shares the arc between them, which is handled as its own case.
pub fn find_best_swap(
    solution: &Solution,
    problem: &Problem,
    metric: Metric<'_>,
    filter: &dyn MoveFilter,
) -> Option<SwapMove> {
    let mut best: Option<SwapMove> = None;
    let routes = &solution.routes;

    for r1 in 0..routes.len() {
        let route1 = &routes[r1];

        for r2 in r1..routes.len() {
            let route2 = &routes[r2];
            let same_route = r1 == r2;

            for i in 1..route1.nodes.len() - 1 {
                let start = if same_route { i + 1 } else { 1 };

                for j in start..route2.nodes.len() - 1 {
                    let (a1, b1, c1) = (route1.nodes[i - 1], route1.nodes[i], route1.nodes[i + 1]);
                    let (a2, b2, c2) = (route2.nodes[j - 1], route2.nodes[j], route2.nodes[j + 1]);

                    if !same_route {
                        let (d1, d2) = (problem.demand(b1), problem.demand(b2));
                        if route1.load - d1 + d2 > route1.capacity
                            || route2.load - d2 + d1 > route2.capacity
                        {
                            continue;
                        }
                    }

                    let (move_cost, penalized_cost) = metric.evaluate(|m| {
                        if same_route && i + 1 == j {
                            // a1 -> b1 -> b2 -> c2 becomes a1 -> b2 -> b1 -> c2
                            m[a1][b2] + m[b2][b1] + m[b1][c2] - m[a1][b1] - m[b1][b2] - m[b2][c2]
                        } else {
                            replacement_cost(m, a1, b1, b2, c1) + replacement_cost(m, a2, b2, b1, c2)
                        }
                    });

                    if best.is_some_and(|current| penalized_cost >= current.penalized_cost) {
                        continue;
                    }
                    if !filter.admits(&[b1, b2], move_cost) {
                        continue;
                    }

                    let (cost_change_first, cost_change_second) = if same_route {
                        (0.0, 0.0)
                    } else {
                        let distances = metric.distances();
                        (
                            replacement_cost(distances, a1, b1, b2, c1),
                            replacement_cost(distances, a2, b2, b1, c2),
                        )
                    };

                    best = Some(SwapMove {
                        first_route: r1,
                        first_position: i,
                        second_route: r2,
                        second_position: j,
                        cost_change_first,
                        cost_change_second,
                        move_cost,
                        penalized_cost,
                    });
                }
            }
        }
    }

    best
}

impl SwapMove {
    /// The two customers being exchanged.
    pub fn touched_nodes(&self, solution: &Solution) -> Vec<usize> {
        vec![
            solution.routes[self.first_route].nodes[self.first_position],
            solution.routes[self.second_route].nodes[self.second_position],
        ]
    }

    /// Apply the move to the solution.
    pub fn apply(&self, solution: &mut Solution, problem: &Problem) {
        if self.first_route == self.second_route {
            let route = &mut solution.routes[self.first_route];
            route.nodes.swap(self.first_position, self.second_position);
            route.cost += self.move_cost;
        } else {
            let (route1, route2) =
                two_routes_mut(&mut solution.routes, self.first_route, self.second_route);
            let b1 = route1.nodes[self.first_position];
            let b2 = route2.nodes[self.second_position];
            let (d1, d2) = (problem.demand(b1), problem.demand(b2));

            route1.nodes[self.first_position] = b2;
            route2.nodes[self.second_position] = b1;
            route1.cost += self.cost_change_first;
            route2.cost += self.cost_change_second;
            route1.load += d2 - d1;
            route2.load += d1 - d2;
        }

        solution.cost += self.move_cost;
        debug_check_consistency(solution, problem, "swap");
    }
}
