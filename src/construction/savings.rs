//! Clarke-Wright savings route construction.
//!
//! Every customer starts on its own `depot -> i -> depot` trip. Merging the trips
//! of `i` and `j` through the arc `(i, j)` saves
//!
//! ```text
//! s(i, j) = d(i, 0) + d(0, j) - d(i, j)
//! ```
//!
//! Savings are processed in decreasing order and a merge is performed whenever
//! both customers sit at an extremity of two different routes and the merged
//! load fits in a vehicle.

use crate::error::SolverError;
use crate::problem::{Problem, DEPOT};
use crate::solution::{Route, Solution};
use itertools::Itertools;
use log::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct Saving {
    i: usize,
    j: usize,
    value: f64,
}

/// Build routes with the Clarke-Wright savings heuristic.
pub fn clarke_wright_savings(problem: &Problem) -> Result<Solution, SolverError> {
    let n = problem.nodes.len();

    if let Some(customer) = problem
        .customers()
        .find(|&c| problem.demand(c) > problem.vehicle_capacity)
    {
        warn!("Savings: customer {} exceeds the vehicle capacity", customer);
        return Err(SolverError::Infeasible { customer });
    }

    // One route per customer; `route_of` and `position` are kept in sync with `members`.
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut loads = vec![0.0; n];
    let mut route_of = vec![DEPOT; n];
    let mut position = vec![0usize; n];

    for customer in problem.customers() {
        members[customer].push(customer);
        loads[customer] = problem.demand(customer);
        route_of[customer] = customer;
    }

    let mut savings: Vec<Saving> = problem
        .customers()
        .tuple_combinations()
        .map(|(i, j)| Saving {
            i,
            j,
            value: problem.get_distance(i, DEPOT) + problem.get_distance(DEPOT, j)
                - problem.get_distance(i, j),
        })
        .collect();

    // Stable sort keeps the pair scan order among equal savings.
    savings.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut merges = 0;
    for saving in &savings {
        let (ri, rj) = (route_of[saving.i], route_of[saving.j]);

        if ri == rj || loads[ri] + loads[rj] > problem.vehicle_capacity {
            continue;
        }

        let i_first = position[saving.i] == 0;
        let i_last = position[saving.i] == members[ri].len() - 1;
        let j_first = position[saving.j] == 0;
        let j_last = position[saving.j] == members[rj].len() - 1;

        if !(i_first || i_last) || !(j_first || j_last) {
            continue;
        }

        let mut absorbed = std::mem::take(&mut members[rj]);
        let mut kept = std::mem::take(&mut members[ri]);

        // Orient both segments so that `i` is followed directly by `j`.
        if !i_last {
            kept.reverse();
        }
        if !j_first {
            absorbed.reverse();
        }
        kept.append(&mut absorbed);

        for (index, &customer) in kept.iter().enumerate() {
            route_of[customer] = ri;
            position[customer] = index;
        }

        members[ri] = kept;
        loads[ri] += loads[rj];
        loads[rj] = 0.0;
        merges += 1;
    }

    let routes: Vec<Route> = members
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| Route::from_customers(m, problem))
        .collect();
    let solution = Solution::from_routes(routes);

    debug!(
        "Savings performed {} merges into {} routes, cost {:.2}",
        merges,
        solution.routes.len(),
        solution.cost
    );

    Ok(solution)
}
