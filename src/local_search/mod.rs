//! Local search operators and the steepest-descent engine.

pub mod relocate;
pub mod swap;
pub mod two_opt;
pub mod utils;

use crate::problem::{DistanceMatrix, Problem};
use crate::solution::Solution;
use clap::ValueEnum;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub use self::relocate::{find_best_relocation, RelocationMove};
pub use self::swap::{find_best_swap, SwapMove};
pub use self::two_opt::{find_best_two_opt, TwoOptMove};

/// A move must lower the cost by more than this to count as an improvement.
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// The neighborhoods explored by the search layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Relocation,
    Swap,
    TwoOpt,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Relocation, Operator::Swap, Operator::TwoOpt];

    /// Scan this operator's neighborhood for the best admissible move.
    pub fn find_best(
        self,
        solution: &Solution,
        problem: &Problem,
        metric: Metric<'_>,
        filter: &dyn MoveFilter,
    ) -> Option<Move> {
        match self {
            Operator::Relocation => {
                find_best_relocation(solution, problem, metric, filter).map(Move::Relocation)
            }
            Operator::Swap => find_best_swap(solution, problem, metric, filter).map(Move::Swap),
            Operator::TwoOpt => {
                find_best_two_opt(solution, problem, metric, filter).map(Move::TwoOpt)
            }
        }
    }
}

/// Distances used to evaluate candidate moves.
///
/// `distances` gives the true cost of a move. The optional guiding matrix, when
/// present, ranks the candidates instead (Guided Local Search).
#[derive(Debug, Clone, Copy)]
pub struct Metric<'a> {
    distances: &'a DistanceMatrix,
    guide: Option<&'a DistanceMatrix>,
}

impl<'a> Metric<'a> {
    /// Rank moves by their true cost.
    pub fn plain(problem: &'a Problem) -> Self {
        Metric {
            distances: &problem.distance_matrix,
            guide: None,
        }
    }

    /// Rank moves by their cost under a penalized matrix.
    pub fn guided(problem: &'a Problem, penalized: &'a DistanceMatrix) -> Self {
        Metric {
            distances: &problem.distance_matrix,
            guide: Some(penalized),
        }
    }

    /// The true distance matrix.
    pub fn distances(&self) -> &'a DistanceMatrix {
        self.distances
    }

    /// Evaluate a delta formula, returning `(true cost, ranking cost)`.
    #[inline]
    pub fn evaluate<F>(&self, delta: F) -> (f64, f64)
    where
        F: Fn(&DistanceMatrix) -> f64,
    {
        let cost = delta(self.distances);
        match self.guide {
            Some(guide) => (cost, delta(guide)),
            None => (cost, cost),
        }
    }
}

/// Decides whether a candidate move may become the selected move.
pub trait MoveFilter {
    /// `nodes` are the nodes the move touches, `move_cost` its true cost.
    fn admits(&self, nodes: &[usize], move_cost: f64) -> bool;
}

/// Admits every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MoveFilter for AllowAll {
    #[inline]
    fn admits(&self, _nodes: &[usize], _move_cost: f64) -> bool {
        true
    }
}

/// A selected move of any operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    Relocation(RelocationMove),
    Swap(SwapMove),
    TwoOpt(TwoOptMove),
}

impl Move {
    /// True distance change of the move.
    pub fn move_cost(&self) -> f64 {
        match self {
            Move::Relocation(m) => m.move_cost,
            Move::Swap(m) => m.move_cost,
            Move::TwoOpt(m) => m.move_cost,
        }
    }

    /// Cost the move was ranked by.
    pub fn penalized_cost(&self) -> f64 {
        match self {
            Move::Relocation(m) => m.penalized_cost,
            Move::Swap(m) => m.penalized_cost,
            Move::TwoOpt(m) => m.penalized_cost,
        }
    }

    /// Customers affected by the move, read before it is applied.
    pub fn touched_nodes(&self, solution: &Solution) -> Vec<usize> {
        match self {
            Move::Relocation(m) => m.touched_nodes(solution),
            Move::Swap(m) => m.touched_nodes(solution),
            Move::TwoOpt(m) => m.touched_nodes(solution),
        }
    }

    /// Apply the move to the solution.
    pub fn apply(&self, solution: &mut Solution, problem: &Problem) {
        match self {
            Move::Relocation(m) => m.apply(solution, problem),
            Move::Swap(m) => m.apply(solution, problem),
            Move::TwoOpt(m) => m.apply(solution, problem),
        }
    }
}

/// Steepest-descent local search.
#[derive(Debug, Default)]
pub struct LocalSearch {
    /// Number of moves applied since creation
    pub applied_moves: usize,
}

impl LocalSearch {
    /// Create a new local search instance.
    pub fn new() -> Self {
        LocalSearch::default()
    }

    /// Apply the best move of `operator` until none improves the solution.
    ///
    /// Returns the best solution met, which is never worse than the input.
    pub fn run(&mut self, mut solution: Solution, problem: &Problem, operator: Operator) -> Solution {
        let mut best = solution.clone();
        let mut iterations = 0;

        while let Some(candidate) =
            operator.find_best(&solution, problem, Metric::plain(problem), &AllowAll)
        {
            if candidate.move_cost() >= -IMPROVEMENT_EPSILON {
                break;
            }

            candidate.apply(&mut solution, problem);
            solution.cost = solution.calculate_total_cost(problem);
            iterations += 1;
            trace!("{:?} #{}: cost {:.4}", operator, iterations, solution.cost);

            if solution.cost < best.cost {
                best = solution.clone();
            }
        }

        self.applied_moves += iterations;
        debug!(
            "{:?} descent finished after {} moves, cost {:.4}",
            operator, iterations, best.cost
        );

        best
    }

    /// Variable neighborhood descent over `operators`.
    ///
    /// Runs each operator to its local optimum in turn and restarts from the first
    /// operator whenever one of them improved the solution.
    pub fn vnd(&mut self, mut solution: Solution, problem: &Problem, operators: &[Operator]) -> Solution {
        let mut index = 0;

        while index < operators.len() {
            let before = solution.cost;
            solution = self.run(solution, problem, operators[index]);

            if solution.cost < before - IMPROVEMENT_EPSILON {
                index = 0;
            } else {
                index += 1;
            }
        }

        solution
    }
}
