//! Configuration parameters for the solver.

use crate::construction::Construction;
use crate::local_search::Operator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration settings for the construction and search phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Heuristic producing the first feasible solution
    pub construction: Construction,
    /// Operators chained by the descent phase, in order
    pub local_search_operators: Vec<Operator>,
    /// Iteration budget of Guided Local Search (0 disables the phase)
    pub gls_iterations: usize,
    /// Penalty weight applied per penalization of an arc
    pub gls_lambda: f64,
    /// Iteration budget of Tabu Search (0 disables the phase)
    pub tabu_iterations: usize,
    /// Minimum tabu tenure in iterations
    pub tabu_min_tenure: usize,
    /// Maximum tabu tenure in iterations
    pub tabu_max_tenure: usize,
    /// Non-improving iterations tolerated before a perturbation fires
    pub stagnation_threshold: usize,
    /// Period of the full-route reversal sweep during Tabu Search
    pub reversal_interval: usize,
    /// Margin by which a tabu move must beat the best-known cost to be aspirated
    pub aspiration_tolerance: f64,
    /// Acceptance factor of the block exchange perturbation (>= 1.0 accepts worse moves)
    pub block_exchange_tolerance: f64,
    /// Seed of every random generator used by the search
    pub seed: u64,
    /// Optional time limit applied to each metaheuristic phase
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            construction: Construction::MinimumInsertion,
            local_search_operators: vec![Operator::Relocation, Operator::Swap, Operator::TwoOpt],
            gls_iterations: 2000,
            gls_lambda: 0.15,
            tabu_iterations: 2000,
            tabu_min_tenure: 10,
            tabu_max_tenure: 20,
            stagnation_threshold: 100,
            reversal_interval: 250,
            aspiration_tolerance: 1e-3,
            block_exchange_tolerance: 1.05,
            seed: 1,
            time_limit: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the construction heuristic.
    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    /// Set the operators used by the descent phase.
    pub fn with_local_search_operators(mut self, operators: Vec<Operator>) -> Self {
        self.local_search_operators = operators;
        self
    }

    /// Set the Guided Local Search iteration budget.
    pub fn with_gls_iterations(mut self, iterations: usize) -> Self {
        self.gls_iterations = iterations;
        self
    }

    /// Set the Guided Local Search penalty weight.
    pub fn with_gls_lambda(mut self, lambda: f64) -> Self {
        self.gls_lambda = lambda;
        self
    }

    /// Set the Tabu Search iteration budget.
    pub fn with_tabu_iterations(mut self, iterations: usize) -> Self {
        self.tabu_iterations = iterations;
        self
    }

    /// Set the range the tabu tenure is drawn from.
    pub fn with_tabu_tenure(mut self, min: usize, max: usize) -> Self {
        self.tabu_min_tenure = min.min(max);
        self.tabu_max_tenure = max.max(min);
        self
    }

    /// Set the stagnation threshold triggering a perturbation.
    pub fn with_stagnation_threshold(mut self, iterations: usize) -> Self {
        self.stagnation_threshold = iterations;
        self
    }

    /// Set the period of the route reversal sweep.
    pub fn with_reversal_interval(mut self, iterations: usize) -> Self {
        self.reversal_interval = iterations;
        self
    }

    /// Set the aspiration tolerance.
    pub fn with_aspiration_tolerance(mut self, tolerance: f64) -> Self {
        self.aspiration_tolerance = tolerance;
        self
    }

    /// Set the block exchange acceptance factor.
    pub fn with_block_exchange_tolerance(mut self, tolerance: f64) -> Self {
        self.block_exchange_tolerance = tolerance;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }
}
