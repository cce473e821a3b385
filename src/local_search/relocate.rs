//! Relocate neighborhood for local search.

use crate::problem::Problem;
use crate::solution::Solution;

use super::utils::{
    calculate_insertion_cost, calculate_removal_cost, debug_check_consistency, two_routes_mut,
};
use super::{Metric, MoveFilter};

/// Moves the customer at `origin_position` so that it follows the node at
/// `target_position` of the target route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelocationMove {
    pub origin_route: usize,
    pub origin_position: usize,
    pub target_route: usize,
    pub target_position: usize,
    /// Distance change of the origin route (cross-route moves only)
    pub cost_change_origin: f64,
    /// Distance change of the target route (cross-route moves only)
    pub cost_change_target: f64,
    pub move_cost: f64,
    pub penalized_cost: f64,
}

/// Scan every relocation and return the cheapest admissible one.
///
/// Candidates are ranked by their cost under the metric's guiding matrix.
/// Relocating a customer onto its own slot or right after its predecessor leaves
/// the route unchanged and is skipped, as is any move overloading the target route.
pub fn find_best_relocation(
    solution: &Solution,
    problem: &Problem,
    metric: Metric<'_>,
    filter: &dyn MoveFilter,
) -> Option<RelocationMove> {
    let mut best: Option<RelocationMove> = None;

    for (r1, route1) in solution.routes.iter().enumerate() {
        for i in 1..route1.nodes.len() - 1 {
            let a = route1.nodes[i - 1];
            let b = route1.nodes[i];
            let c = route1.nodes[i + 1];
            let demand = problem.demand(b);

            for (r2, route2) in solution.routes.iter().enumerate() {
                if r1 != r2 && route2.load + demand > route2.capacity {
                    continue;
                }

                for j in 0..route2.nodes.len() - 1 {
                    if r1 == r2 && (j == i || j + 1 == i) {
                        continue;
                    }

                    let f = route2.nodes[j];
                    let g = route2.nodes[j + 1];

                    let (move_cost, penalized_cost) = metric.evaluate(|m| {
                        calculate_removal_cost(m, a, b, c) + calculate_insertion_cost(m, f, b, g)
                    });

                    if best.is_some_and(|current| penalized_cost >= current.penalized_cost) {
                        continue;
                    }
                    if !filter.admits(&[b], move_cost) {
                        continue;
                    }

                    let distances = metric.distances();
                    best = Some(RelocationMove {
                        origin_route: r1,
                        origin_position: i,
                        target_route: r2,
                        target_position: j,
                        cost_change_origin: calculate_removal_cost(distances, a, b, c),
                        cost_change_target: calculate_insertion_cost(distances, f, b, g),
                        move_cost,
                        penalized_cost,
                    });
                }
            }
        }
    }

    best
}

impl RelocationMove {
    /// The customer being relocated.
    pub fn touched_nodes(&self, solution: &Solution) -> Vec<usize> {
        vec![solution.routes[self.origin_route].nodes[self.origin_position]]
    }

    /// Apply the move to the solution.
    pub fn apply(&self, solution: &mut Solution, problem: &Problem) {
        if self.origin_route == self.target_route {
            let route = &mut solution.routes[self.origin_route];
            let customer = route.nodes.remove(self.origin_position);

            if self.origin_position < self.target_position {
                route.nodes.insert(self.target_position, customer);
            } else {
                route.nodes.insert(self.target_position + 1, customer);
            }
            route.cost += self.move_cost;
        } else {
            let (origin, target) =
                two_routes_mut(&mut solution.routes, self.origin_route, self.target_route);
            let customer = origin.nodes.remove(self.origin_position);
            let demand = problem.demand(customer);

            target.nodes.insert(self.target_position + 1, customer);
            origin.cost += self.cost_change_origin;
            target.cost += self.cost_change_target;
            origin.load -= demand;
            target.load += demand;
        }

        solution.cost += self.move_cost;
        debug_check_consistency(solution, problem, "relocation");
    }
}
