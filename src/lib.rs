//! # Tonnage CVRP
//!
//! Metaheuristics for the Capacitated Vehicle Routing Problem with a
//! tonnage-weighted objective, where every arc costs its distance times the
//! weight the vehicle carries over it.
//!
//! A feasible solution is built by a construction heuristic, improved by
//! steepest-descent local search over relocation, swap and 2-opt moves, then
//! diversified by Guided Local Search and Tabu Search. The search layers work
//! on distance; route direction is settled by reversal sweeps against the
//! tonnage cost before the solution is reported.

pub mod checker;
pub mod config;
pub mod construction;
pub mod error;
pub mod guided;
pub mod local_search;
pub mod perturbation;
pub mod problem;
pub mod report;
pub mod solution;
pub mod tabu;
pub mod utils;

use crate::config::Config;
use crate::error::SolverError;
use crate::guided::GuidedLocalSearch;
use crate::local_search::LocalSearch;
use crate::perturbation::full_reversal;
use crate::problem::Problem;
use crate::solution::Solution;
use crate::tabu::TabuSearch;
use crate::utils::SearchStatistics;

use log::{info, warn};
use std::time::{Duration, Instant};

/// Runs the construction and search phases configured in [`Config`].
pub struct Solver {
    pub problem: Problem,
    pub config: Config,
    pub best_solution: Option<Solution>,
    pub run_time: Duration,
    pub statistics: SearchStatistics,
    pub local_search: LocalSearch,
    pub start_time: Instant,
}

impl Solver {
    /// Create a solver for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        Solver {
            problem,
            config,
            best_solution: None,
            run_time: Duration::from_secs(0),
            statistics: SearchStatistics::default(),
            local_search: LocalSearch::new(),
            start_time: Instant::now(),
        }
    }

    /// Run every phase and return the final solution.
    ///
    /// Each phase starts from the best solution of the previous one, so the
    /// distance of the result never exceeds that of the constructed solution.
    pub fn solve(&mut self) -> Result<&Solution, SolverError> {
        self.start_time = Instant::now();
        self.statistics = SearchStatistics::default();

        let mut solution = self.config.construction.build(&self.problem)?;
        info!(
            "{:?} construction: {} routes, cost {:.4}",
            self.config.construction,
            solution.get_used_route_count(),
            solution.cost
        );
        self.statistics.record_phase("construction", solution.cost);

        solution = self.local_search.vnd(
            solution,
            &self.problem,
            &self.config.local_search_operators,
        );
        info!("Local search: cost {:.4}", solution.cost);
        self.statistics.record_phase("local search", solution.cost);
        self.statistics.applied_moves = self.local_search.applied_moves;

        if self.config.gls_iterations > 0 {
            let mut gls = GuidedLocalSearch::new(&self.problem, self.config.gls_lambda);
            solution = gls.run(
                solution,
                &self.problem,
                self.config.gls_iterations,
                self.config.seed,
                self.config.time_limit,
            );
            self.statistics.record_phase("guided local search", solution.cost);
            self.statistics.penalizations = gls.penalizations;
        }

        if self.config.tabu_iterations > 0 {
            let mut tabu = TabuSearch::new(&self.problem, &self.config);
            solution = tabu.run(
                solution,
                &self.problem,
                self.config.tabu_iterations,
                self.config.seed.wrapping_add(1),
                self.config.time_limit,
            );
            self.statistics.record_phase("tabu search", solution.cost);
            self.statistics.perturbations = tabu.perturbations;
        }

        let reversed = full_reversal(&mut solution, &self.problem);
        solution.remove_empty_routes();

        if !solution.is_feasible() {
            warn!("Final solution exceeds the vehicle capacity");
        }

        self.run_time = self.start_time.elapsed();
        self.statistics.runtime = self.run_time;
        self.statistics.record_best(&solution, &self.problem);
        info!(
            "Finished in {}: distance {:.4}, tonnage {:.4}, {} routes reversed",
            utils::format_duration(self.run_time),
            solution.cost,
            self.statistics.best_solution_tonnage,
            reversed
        );

        Ok(self.best_solution.insert(solution))
    }
}
