//! Cheapest-insertion route construction.

use crate::error::SolverError;
use crate::problem::Problem;
use crate::solution::{Route, Solution};
use log::{debug, warn};

use super::first_unrouted;

/// The cheapest insertion found in one scan.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    customer: usize,
    route: usize,
    /// Index of the node after which the customer is inserted
    position: usize,
    cost: f64,
}

/// Build routes by repeatedly performing the globally cheapest feasible insertion.
///
/// The route list always ends with an empty route so that a customer can open a
/// new vehicle. Candidates are scanned route by route, then slot by slot, then by
/// customer ID; the first candidate with the lowest cost wins. The trailing empty
/// route is dropped once every customer is routed.
pub fn minimum_insertion(problem: &Problem) -> Result<Solution, SolverError> {
    let mut unrouted = vec![false; problem.nodes.len()];
    for customer in problem.customers() {
        unrouted[customer] = true;
    }

    let mut solution = Solution::new();

    for _ in 0..problem.get_customer_count() {
        keep_an_empty_route(&mut solution, problem);

        let Some(insertion) = cheapest_insertion(&solution, problem, &unrouted) else {
            let customer = first_unrouted(&unrouted);
            warn!("Minimum insertion: customer {} fits no vehicle", customer);
            return Err(SolverError::Infeasible { customer });
        };

        let route = &mut solution.routes[insertion.route];
        route.nodes.insert(insertion.position + 1, insertion.customer);
        route.cost += insertion.cost;
        route.load += problem.demand(insertion.customer);
        solution.cost += insertion.cost;
        unrouted[insertion.customer] = false;
    }

    solution.remove_empty_routes();
    debug!(
        "Minimum insertion built {} routes, cost {:.2}",
        solution.routes.len(),
        solution.cost
    );

    Ok(solution)
}

/// Append an empty route unless the last route is still empty.
fn keep_an_empty_route(solution: &mut Solution, problem: &Problem) {
    if solution.routes.last().map_or(true, |r| !r.is_empty()) {
        solution.routes.push(Route::new(problem.vehicle_capacity));
    }
}

fn cheapest_insertion(solution: &Solution, problem: &Problem, unrouted: &[bool]) -> Option<Insertion> {
    let mut best: Option<Insertion> = None;

    for (route_index, route) in solution.routes.iter().enumerate() {
        for (position, arc) in route.nodes.windows(2).enumerate() {
            let (a, b) = (arc[0], arc[1]);
            let removed = problem.get_distance(a, b);

            for customer in problem.customers() {
                if !unrouted[customer] || route.load + problem.demand(customer) > route.capacity {
                    continue;
                }

                let cost = problem.get_distance(a, customer) + problem.get_distance(customer, b)
                    - removed;

                if best.map_or(true, |current| cost < current.cost) {
                    best = Some(Insertion {
                        customer,
                        route: route_index,
                        position,
                        cost,
                    });
                }
            }
        }
    }

    best
}
