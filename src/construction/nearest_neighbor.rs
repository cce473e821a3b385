//! Nearest-neighbor route construction.

use crate::error::SolverError;
use crate::problem::{Problem, DEPOT};
use crate::solution::{Route, Solution};
use log::{debug, warn};

use super::first_unrouted;

/// Build routes by repeatedly extending the last open route with the nearest
/// unrouted customer that still fits.
///
/// A new route is opened when the last one cannot be extended. If even a fresh,
/// empty route has no feasible customer the instance is infeasible.
pub fn nearest_neighbor(problem: &Problem) -> Result<Solution, SolverError> {
    let mut unrouted = vec![false; problem.nodes.len()];
    for customer in problem.customers() {
        unrouted[customer] = true;
    }

    let mut solution = Solution::new();
    let mut insertions = 0;

    while insertions < problem.get_customer_count() {
        let inserted = solution.routes.last_mut().and_then(|route| {
            let customer = nearest_feasible(route, problem, &unrouted)?;
            append_customer(route, customer, problem);
            Some(customer)
        });

        match inserted {
            Some(customer) => {
                unrouted[customer] = false;
                insertions += 1;
            }
            None => {
                if solution.routes.last().is_some_and(Route::is_empty) {
                    let customer = first_unrouted(&unrouted);
                    warn!("Nearest neighbor: customer {} fits no vehicle", customer);
                    return Err(SolverError::Infeasible { customer });
                }
                solution.routes.push(Route::new(problem.vehicle_capacity));
            }
        }
    }

    solution.cost = solution.routes.iter().map(|r| r.cost).sum();
    debug!(
        "Nearest neighbor built {} routes, cost {:.2}",
        solution.routes.len(),
        solution.cost
    );

    Ok(solution)
}

/// Nearest unrouted customer to the last real node of the route, within capacity.
fn nearest_feasible(route: &Route, problem: &Problem, unrouted: &[bool]) -> Option<usize> {
    let last = route.nodes[route.nodes.len() - 2];
    let mut best: Option<(usize, f64)> = None;

    for customer in problem.customers() {
        if !unrouted[customer] || problem.demand(customer) > route.residual_capacity() {
            continue;
        }
        let distance = problem.get_distance(last, customer);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((customer, distance));
        }
    }

    best.map(|(customer, _)| customer)
}

/// Insert a customer right before the closing depot.
fn append_customer(route: &mut Route, customer: usize, problem: &Problem) {
    let position = route.nodes.len() - 1;
    let last = route.nodes[position - 1];

    route.cost += problem.get_distance(last, customer) + problem.get_distance(customer, DEPOT)
        - problem.get_distance(last, DEPOT);
    route.load += problem.demand(customer);
    route.nodes.insert(position, customer);
}
