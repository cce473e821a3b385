//! Solution representation for the tonnage-weighted CVRP.

use crate::problem::{Problem, DEPOT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing incrementally tracked costs with a full recomputation.
pub const COST_TOLERANCE: f64 = 1e-4;

/// Represents a route in a CVRP solution.
///
/// `nodes` always starts and ends with the depot; `[DEPOT, DEPOT]` is an empty route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// The sequence of node IDs, depot included at both ends
    pub nodes: Vec<usize>,
    /// The total distance of the route
    pub cost: f64,
    /// The total demand served by the route
    pub load: f64,
    /// The vehicle capacity
    pub capacity: f64,
}

impl Route {
    /// Create a new, empty route.
    pub fn new(capacity: f64) -> Self {
        Route {
            nodes: vec![DEPOT, DEPOT],
            cost: 0.0,
            load: 0.0,
            capacity,
        }
    }

    /// Create a route serving the given customers in order.
    pub fn from_customers(customers: &[usize], problem: &Problem) -> Self {
        let mut route = Route::new(problem.vehicle_capacity);
        route.nodes.splice(1..1, customers.iter().copied());
        route.update_cost_and_load(problem);
        route
    }

    /// The customers of this route, depots excluded.
    pub fn customers(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Check if the route serves no customer.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    /// Number of customers served.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }

    /// Capacity left on the vehicle.
    pub fn residual_capacity(&self) -> f64 {
        self.capacity - self.load
    }

    /// Sum of consecutive-pair distances over the node sequence.
    pub fn calculate_cost(&self, problem: &Problem) -> f64 {
        self.nodes
            .windows(2)
            .map(|arc| problem.get_distance(arc[0], arc[1]))
            .sum()
    }

    /// Sum of the demands of the visited nodes.
    pub fn calculate_load(&self, problem: &Problem) -> f64 {
        self.nodes.iter().map(|&n| problem.demand(n)).sum()
    }

    /// Recompute cost and load from the node sequence.
    pub fn update_cost_and_load(&mut self, problem: &Problem) {
        self.cost = self.calculate_cost(problem);
        self.load = self.calculate_load(problem);
    }

    /// Load-weighted cost of the route.
    ///
    /// The vehicle leaves the depot carrying its own weight plus every demand of
    /// the route; each arc costs its distance times the weight carried over it,
    /// and the weight drops by a customer's demand once that customer is served.
    /// The empty return leg to the depot is not charged.
    pub fn tonnage_cost(&self, problem: &Problem) -> f64 {
        tonnage_cost_of(self.customers(), problem)
    }

    /// Check that the tracked cost and load match a full recomputation.
    pub fn is_consistent(&self, problem: &Problem) -> bool {
        (self.calculate_cost(problem) - self.cost).abs() <= COST_TOLERANCE
            && (self.calculate_load(problem) - self.load).abs() <= COST_TOLERANCE
    }
}

/// Tonnage cost of an open route `depot -> customers[0] -> ... -> customers[n-1]`.
pub fn tonnage_cost_of(customers: &[usize], problem: &Problem) -> f64 {
    let mut carried: f64 =
        problem.empty_vehicle_weight + customers.iter().map(|&c| problem.demand(c)).sum::<f64>();
    let mut cost = 0.0;
    let mut from = DEPOT;

    for &to in customers {
        cost += problem.get_distance(from, to) * carried;
        carried -= problem.demand(to);
        from = to;
    }

    cost
}

/// Represents a complete solution to a CVRP instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The list of routes
    pub routes: Vec<Route>,
    /// The total distance of the solution
    pub cost: f64,
}

impl Solution {
    /// Create a new, empty solution.
    pub fn new() -> Self {
        Solution {
            routes: Vec::new(),
            cost: 0.0,
        }
    }

    /// Build a solution from routes, summing their tracked costs.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        let cost = routes.iter().map(|r| r.cost).sum();
        Solution { routes, cost }
    }

    /// Ground-truth total distance, recomputed from every route's node sequence.
    pub fn calculate_total_cost(&self, problem: &Problem) -> f64 {
        self.routes.iter().map(|r| r.calculate_cost(problem)).sum()
    }

    /// Recompute every route and the solution cost from scratch.
    pub fn evaluate(&mut self, problem: &Problem) {
        for route in &mut self.routes {
            route.update_cost_and_load(problem);
        }
        self.cost = self.calculate_total_cost(problem);
    }

    /// Sum of the tonnage costs of all routes.
    pub fn tonnage_cost(&self, problem: &Problem) -> f64 {
        self.routes.iter().map(|r| r.tonnage_cost(problem)).sum()
    }

    /// Check route bookkeeping and the aggregate cost against recomputation.
    pub fn is_consistent(&self, problem: &Problem) -> bool {
        let routes_ok = self.routes.iter().all(|r| r.is_consistent(problem));
        let tracked: f64 = self.routes.iter().map(|r| r.cost).sum();

        routes_ok
            && (tracked - self.cost).abs() <= COST_TOLERANCE
            && (self.calculate_total_cost(problem) - self.cost).abs() <= COST_TOLERANCE
    }

    /// Check that no route exceeds its capacity.
    pub fn is_feasible(&self) -> bool {
        self.routes
            .iter()
            .all(|r| r.load <= r.capacity + COST_TOLERANCE)
    }

    /// Check that every customer of the problem is served exactly once.
    pub fn covers_all_customers(&self, problem: &Problem) -> bool {
        let mut visits = vec![0usize; problem.nodes.len()];

        for route in &self.routes {
            if route.nodes.first() != Some(&DEPOT) || route.nodes.last() != Some(&DEPOT) {
                return false;
            }
            for &customer in route.customers() {
                if customer == DEPOT || customer >= visits.len() {
                    return false;
                }
                visits[customer] += 1;
            }
        }

        problem.customers().all(|c| visits[c] == 1)
    }

    /// Drop routes that serve no customer.
    pub fn remove_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }

    /// Number of routes serving at least one customer.
    pub fn get_used_route_count(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }
}

impl Default for Solution {
    fn default() -> Self {
        Solution::new()
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;

        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {}: {:?} (Load: {:.2}/{:.2}, Cost: {:.2})",
                i, route.nodes, route.load, route.capacity, route.cost
            )?;
        }

        Ok(())
    }
}
