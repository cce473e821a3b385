//! Utility functions and structures for the solver.

use std::time::Duration;

use crate::problem::Problem;
use crate::solution::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Statistics about one solver run.
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    pub runtime: Duration,
    /// Distance after each phase, in the order the phases ran
    pub phase_costs: Vec<(String, f64)>,
    pub best_solution_distance: f64,
    pub best_solution_tonnage: f64,
    pub best_solution_routes: usize,
    pub applied_moves: usize,
    pub penalizations: usize,
    pub perturbations: usize,
}

impl SearchStatistics {
    /// Record the distance reached at the end of a phase.
    pub fn record_phase(&mut self, phase: &str, cost: f64) {
        self.phase_costs.push((phase.to_string(), cost));
    }

    /// Fill in the figures of the final solution.
    pub fn record_best(&mut self, solution: &Solution, problem: &Problem) {
        self.best_solution_distance = solution.cost;
        self.best_solution_tonnage = solution.tonnage_cost(problem);
        self.best_solution_routes = solution.get_used_route_count();
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        let phases = self
            .phase_costs
            .iter()
            .map(|(phase, cost)| format!("\n  - {}: {:.2}", phase, cost))
            .collect::<String>();

        format!(
            "Search Statistics:
- Runtime: {}
- Phases:{}
- Best Solution Distance: {:.2}
- Best Solution Tonnage: {:.2}
- Best Solution Routes: {}
- Applied Moves: {}
- Penalized Arcs: {}
- Perturbations: {}",
            format_duration(self.runtime),
            phases,
            self.best_solution_distance,
            self.best_solution_tonnage,
            self.best_solution_routes,
            self.applied_moves,
            self.penalizations,
            self.perturbations
        )
    }
}
