//! Guided Local Search (GLS).
//!
//! Moves are ranked on a penalized copy of the distance matrix while the
//! solution keeps being charged true distances. Whenever no move improves the
//! penalized objective, the arc of the current solution with the highest utility
//!
//! ```text
//! utility(i, j) = d(i, j) / (1 + penalty(i, j))
//! ```
//!
//! is penalized: its count goes up by one and both directions of the arc are set
//! to `d(i, j) * (1 + lambda * penalty(i, j))` in the penalized matrix. The base
//! matrix is never modified, so the true objective stays comparable across
//! iterations.

use crate::local_search::{AllowAll, Metric, Operator, IMPROVEMENT_EPSILON};
use crate::problem::{DistanceMatrix, Problem};
use crate::solution::Solution;
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// Guided Local Search state: the penalized matrix and the per-arc penalty counts.
pub struct GuidedLocalSearch {
    /// Penalty weight per penalization
    pub lambda: f64,
    penalized: DistanceMatrix,
    penalties: Vec<Vec<u32>>,
    /// Number of arcs penalized so far
    pub penalizations: usize,
}

impl GuidedLocalSearch {
    /// Start with no penalties: the penalized matrix is a copy of the base matrix.
    pub fn new(problem: &Problem, lambda: f64) -> Self {
        let n = problem.nodes.len();
        GuidedLocalSearch {
            lambda,
            penalized: problem.distance_matrix.clone(),
            penalties: vec![vec![0; n]; n],
            penalizations: 0,
        }
    }

    /// Times the arc `(from, to)` has been penalized.
    pub fn penalty(&self, from: usize, to: usize) -> u32 {
        self.penalties[from][to]
    }

    /// The penalized distance matrix.
    pub fn penalized_matrix(&self) -> &DistanceMatrix {
        &self.penalized
    }

    /// Run GLS for `iterations` iterations and return the best solution found.
    ///
    /// Every iteration draws one operator uniformly at random from `seed`.
    pub fn run(
        &mut self,
        mut solution: Solution,
        problem: &Problem,
        iterations: usize,
        seed: u64,
        time_limit: Option<Duration>,
    ) -> Solution {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let start_time = Instant::now();
        let mut best = solution.clone();

        for iteration in 0..iterations {
            if time_limit.is_some_and(|limit| start_time.elapsed() >= limit) {
                debug!("GLS stopped by the time limit at iteration {}", iteration);
                break;
            }

            let operator = *Operator::ALL.choose(&mut rng).unwrap_or(&Operator::Relocation);
            let metric = Metric::guided(problem, &self.penalized);
            let candidate = operator.find_best(&solution, problem, metric, &AllowAll);

            match candidate {
                Some(candidate) if candidate.penalized_cost() < -IMPROVEMENT_EPSILON => {
                    candidate.apply(&mut solution, problem);
                    solution.cost = solution.calculate_total_cost(problem);
                    trace!(
                        "GLS #{} {:?}: cost {:.4} (penalized delta {:.4})",
                        iteration,
                        operator,
                        solution.cost,
                        candidate.penalized_cost()
                    );

                    if solution.cost < best.cost {
                        best = solution.clone();
                        debug!("GLS #{}: new best {:.4}", iteration, best.cost);
                    }
                }
                _ => self.penalize_arcs(&solution, problem),
            }
        }

        info!(
            "GLS finished: best cost {:.4}, {} arcs penalized",
            best.cost, self.penalizations
        );

        best
    }

    /// Penalize the arc of `solution` with the highest utility.
    pub fn penalize_arcs(&mut self, solution: &Solution, problem: &Problem) {
        let mut best: Option<((usize, usize), f64)> = None;

        for route in &solution.routes {
            for arc in route.nodes.windows(2) {
                let (from, to) = (arc[0], arc[1]);
                let utility =
                    problem.get_distance(from, to) / (1.0 + self.penalties[from][to] as f64);

                if best.map_or(true, |(_, u)| utility > u) {
                    best = Some(((from, to), utility));
                }
            }
        }

        let Some(((from, to), _)) = best else {
            return;
        };

        self.penalties[from][to] += 1;
        if from != to {
            self.penalties[to][from] += 1;
        }

        let count = self.penalties[from][to] as f64;
        let value = problem.get_distance(from, to) * (1.0 + self.lambda * count);
        self.penalized[from][to] = value;
        self.penalized[to][from] = value;
        self.penalizations += 1;

        trace!("GLS penalized arc ({}, {}) to count {}", from, to, count);
    }
}
