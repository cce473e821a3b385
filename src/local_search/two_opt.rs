//! 2-Opt neighborhood for local search (intra-route reversal and inter-route 2-Opt*).

use crate::problem::{Problem, DEPOT};
use crate::solution::Solution;

use super::utils::{capacity_is_violated, debug_check_consistency, two_routes_mut};
use super::{Metric, MoveFilter};

/// Removes the arcs `(A, B)` after `first_position` and `(K, L)` after
/// `second_position` and reconnects the routes.
///
/// Within one route the segment `B..=K` is reversed. Across routes the tails
/// after `A` and after `K` are exchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoOptMove {
    pub first_route: usize,
    pub first_position: usize,
    pub second_route: usize,
    pub second_position: usize,
    pub move_cost: f64,
    pub penalized_cost: f64,
}

/// Scan every 2-Opt and 2-Opt* move and return the cheapest admissible one.
pub fn find_best_two_opt(
    solution: &Solution,
    problem: &Problem,
    metric: Metric<'_>,
    filter: &dyn MoveFilter,
) -> Option<TwoOptMove> {
    let mut best: Option<TwoOptMove> = None;
    let routes = &solution.routes;

    for r1 in 0..routes.len() {
        let route1 = &routes[r1];
        let last1 = route1.nodes.len() - 2;

        for r2 in r1..routes.len() {
            let route2 = &routes[r2];
            let last2 = route2.nodes.len() - 2;
            let same_route = r1 == r2;

            for i in 0..route1.nodes.len() - 1 {
                let start = if same_route { i + 2 } else { 0 };

                for j in start..route2.nodes.len() - 1 {
                    let a = route1.nodes[i];
                    let b = route1.nodes[i + 1];
                    let k = route2.nodes[j];
                    let l = route2.nodes[j + 1];

                    let (move_cost, penalized_cost) = if same_route {
                        // Reversing everything between the two depots changes nothing.
                        if i == 0 && j == last1 {
                            continue;
                        }
                        metric.evaluate(|m| m[a][k] + m[b][l] - m[a][b] - m[k][l])
                    } else {
                        // Both cuts at the head, or both at the tail, only swap route labels.
                        if (i == 0 && j == 0) || (i == last1 && j == last2) {
                            continue;
                        }
                        if capacity_is_violated(route1, i, route2, j, problem) {
                            continue;
                        }
                        metric.evaluate(|m| m[a][l] + m[k][b] - m[a][b] - m[k][l])
                    };

                    if best.is_some_and(|current| penalized_cost >= current.penalized_cost) {
                        continue;
                    }
                    if !filter.admits(&[a, b, k, l], move_cost) {
                        continue;
                    }

                    best = Some(TwoOptMove {
                        first_route: r1,
                        first_position: i,
                        second_route: r2,
                        second_position: j,
                        move_cost,
                        penalized_cost,
                    });
                }
            }
        }
    }

    best
}

impl TwoOptMove {
    /// The customers at both ends of the two removed arcs.
    pub fn touched_nodes(&self, solution: &Solution) -> Vec<usize> {
        let route1 = &solution.routes[self.first_route].nodes;
        let route2 = &solution.routes[self.second_route].nodes;

        let mut nodes = vec![
            route1[self.first_position],
            route1[self.first_position + 1],
            route2[self.second_position],
            route2[self.second_position + 1],
        ];
        nodes.retain(|&n| n != DEPOT);
        nodes.dedup();
        nodes
    }

    /// Apply the move to the solution.
    pub fn apply(&self, solution: &mut Solution, problem: &Problem) {
        if self.first_route == self.second_route {
            let route = &mut solution.routes[self.first_route];
            route.nodes[self.first_position + 1..=self.second_position].reverse();
            route.cost += self.move_cost;
        } else {
            let (route1, route2) =
                two_routes_mut(&mut solution.routes, self.first_route, self.second_route);
            let mut tail1 = route1.nodes.split_off(self.first_position + 1);
            let mut tail2 = route2.nodes.split_off(self.second_position + 1);

            route1.nodes.append(&mut tail2);
            route2.nodes.append(&mut tail1);
            route1.update_cost_and_load(problem);
            route2.update_cost_and_load(problem);
        }

        solution.cost += self.move_cost;
        debug_check_consistency(solution, problem, "2-opt");
    }
}
