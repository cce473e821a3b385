//! Tabu Search with randomized tenure, aspiration and perturbation on stagnation.

use crate::config::Config;
use crate::local_search::{Metric, MoveFilter, Operator};
use crate::perturbation::{block_exchange, full_reversal, partial_reversal, segment_shuffle};
use crate::problem::{Problem, DEPOT};
use crate::solution::Solution;
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// Rejects moves touching a tabu node unless they would beat the best-known cost.
struct TabuFilter<'a> {
    tabu_until: &'a [usize],
    iteration: usize,
    current_cost: f64,
    best_cost: f64,
    aspiration_tolerance: f64,
}

impl MoveFilter for TabuFilter<'_> {
    fn admits(&self, nodes: &[usize], move_cost: f64) -> bool {
        let tabu = nodes
            .iter()
            .any(|&n| n != DEPOT && self.tabu_until[n] > self.iteration);

        !tabu || self.current_cost + move_cost < self.best_cost - self.aspiration_tolerance
    }
}

/// Tabu Search state.
///
/// Tabu status lives in a side table indexed by node ID holding the first
/// iteration at which the node may be moved again.
pub struct TabuSearch {
    pub min_tenure: usize,
    pub max_tenure: usize,
    pub stagnation_threshold: usize,
    pub reversal_interval: usize,
    pub aspiration_tolerance: f64,
    pub block_exchange_tolerance: f64,
    tabu_until: Vec<usize>,
    /// Number of perturbations fired so far
    pub perturbations: usize,
}

impl TabuSearch {
    /// Create a tabu search for the problem with parameters from the configuration.
    pub fn new(problem: &Problem, config: &Config) -> Self {
        TabuSearch {
            min_tenure: config.tabu_min_tenure,
            max_tenure: config.tabu_max_tenure.max(config.tabu_min_tenure),
            stagnation_threshold: config.stagnation_threshold,
            reversal_interval: config.reversal_interval,
            aspiration_tolerance: config.aspiration_tolerance,
            block_exchange_tolerance: config.block_exchange_tolerance,
            tabu_until: vec![0; problem.nodes.len()],
            perturbations: 0,
        }
    }

    /// Whether `node` may not be moved at `iteration`.
    pub fn is_tabu(&self, node: usize, iteration: usize) -> bool {
        self.tabu_until[node] > iteration
    }

    /// Run Tabu Search for `iterations` iterations and return the best solution found.
    ///
    /// The best admissible move of a randomly drawn operator is applied every
    /// iteration, even when it worsens the solution.
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
        let mut stagnation = 0;

        self.tabu_until.iter_mut().for_each(|t| *t = 0);

        for iteration in 0..iterations {
            if time_limit.is_some_and(|limit| start_time.elapsed() >= limit) {
                debug!("Tabu search stopped by the time limit at iteration {}", iteration);
                break;
            }

            let operator = *Operator::ALL.choose(&mut rng).unwrap_or(&Operator::Relocation);
            let filter = TabuFilter {
                tabu_until: &self.tabu_until,
                iteration,
                current_cost: solution.cost,
                best_cost: best.cost,
                aspiration_tolerance: self.aspiration_tolerance,
            };

            if let Some(candidate) =
                operator.find_best(&solution, problem, Metric::plain(problem), &filter)
            {
                let touched = candidate.touched_nodes(&solution);
                candidate.apply(&mut solution, problem);
                solution.cost = solution.calculate_total_cost(problem);

                for node in touched {
                    let tenure = rng.gen_range(self.min_tenure..=self.max_tenure);
                    self.tabu_until[node] = iteration + tenure;
                }
                trace!(
                    "Tabu #{} {:?}: delta {:.4}, cost {:.4}",
                    iteration,
                    operator,
                    candidate.move_cost(),
                    solution.cost
                );
            }

            if record_best(&solution, &mut best) {
                stagnation = 0;
                debug!("Tabu #{}: new best {:.4}", iteration, best.cost);
            } else {
                stagnation += 1;
            }

            if stagnation > self.stagnation_threshold {
                self.perturb(&mut solution, &mut best, problem, &mut rng);
                stagnation = 0;
            }

            if self.reversal_interval > 0 && (iteration + 1) % self.reversal_interval == 0 {
                full_reversal(&mut solution, problem);
                record_best(&solution, &mut best);
            }
        }

        info!(
            "Tabu search finished: best cost {:.4}, {} perturbations",
            best.cost, self.perturbations
        );

        best
    }

    /// Fire one randomly chosen perturbation operator and keep the result if it
    /// beats `best`.
    fn perturb<R: Rng>(
        &mut self,
        solution: &mut Solution,
        best: &mut Solution,
        problem: &Problem,
        rng: &mut R,
    ) {
        let changed = match rng.gen_range(0..3) {
            0 => block_exchange(solution, problem, rng, self.block_exchange_tolerance),
            1 => segment_shuffle(solution, problem, rng),
            _ => partial_reversal(solution, problem, rng) > 0,
        };

        solution.cost = solution.calculate_total_cost(problem);
        self.perturbations += 1;
        debug!(
            "Perturbation {} {}: cost {:.4}",
            self.perturbations,
            if changed { "applied" } else { "rejected" },
            solution.cost
        );

        if record_best(solution, best) {
            debug!("Perturbation {}: new best {:.4}", self.perturbations, best.cost);
        }
    }
}

/// Replace `best` with a copy of `solution` when it is cheaper.
fn record_best(solution: &Solution, best: &mut Solution) -> bool {
    if solution.cost < best.cost {
        *best = solution.clone();
        true
    } else {
        false
    }
}
