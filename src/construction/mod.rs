//! Construction heuristics producing a first feasible solution.

pub mod minimum_insertion;
pub mod nearest_neighbor;
pub mod savings;

use crate::error::SolverError;
use crate::problem::Problem;
use crate::solution::Solution;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use minimum_insertion::minimum_insertion;
pub use nearest_neighbor::nearest_neighbor;
pub use savings::clarke_wright_savings;

/// The available construction heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Construction {
    NearestNeighbor,
    MinimumInsertion,
    Savings,
}

impl Construction {
    /// Build a solution with this heuristic.
    pub fn build(self, problem: &Problem) -> Result<Solution, SolverError> {
        match self {
            Construction::NearestNeighbor => nearest_neighbor(problem),
            Construction::MinimumInsertion => minimum_insertion(problem),
            Construction::Savings => clarke_wright_savings(problem),
        }
    }
}

/// First unrouted customer, used to report which customer made an instance infeasible.
fn first_unrouted(unrouted: &[bool]) -> usize {
    unrouted.iter().position(|&u| u).unwrap_or(0)
}
