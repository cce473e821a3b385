//! Error types for the tonnage CVRP solver.

use thiserror::Error;

/// Errors surfaced by instance loading and solution construction.
#[derive(Error, Debug)]
pub enum SolverError {
    /// No route can take the customer within the vehicle capacity.
    #[error("instance is infeasible: customer {customer} cannot be routed within capacity")]
    Infeasible { customer: usize },
    #[error("failed to read instance")]
    Io(#[from] std::io::Error),
    #[error("malformed instance at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid instance: {0}")]
    InvalidInstance(String),
}
