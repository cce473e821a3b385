//! Independent verification of a solution file against an instance.
//!
//! The checker only trusts the node coordinates and demands of the instance: it
//! recomputes every route's tonnage cost, checks it against the reported total,
//! and verifies capacity and that each customer is visited exactly once.

use crate::problem::{Problem, DEPOT};
use crate::solution::tonnage_cost_of;
use std::io::BufRead;
use thiserror::Error;

/// Largest accepted gap between the reported and the recomputed total cost.
pub const COST_CHECK_TOLERANCE: f64 = 1e-3;

/// Reasons a solution file is rejected.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("failed to read solution")]
    Io(#[from] std::io::Error),
    #[error("malformed solution at line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("capacity violation: route {route} carries {load} over capacity {capacity}")]
    CapacityViolation { route: usize, load: f64, capacity: f64 },
    #[error("cost inconsistency: reported {reported}, calculated {calculated}")]
    CostInconsistency { reported: f64, calculated: f64 },
    #[error("customer {customer} visited {visits} times instead of once")]
    Coverage { customer: usize, visits: usize },
}

/// Outcome of a successful check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    /// Recomputed total tonnage cost
    pub total_cost: f64,
    pub routes: usize,
}

/// Verify a solution file read from `reader`.
///
/// Capacity is checked route by route while reading, then the total cost, then
/// customer coverage.
pub fn check_solution<R: BufRead>(problem: &Problem, reader: R) -> Result<CheckReport, CheckError> {
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;

    let reported: f64 = header_value(&lines, 1)?;
    let route_count: usize = header_value(&lines, 3)?;

    let mut visits = vec![0usize; problem.nodes.len()];
    let mut calculated = 0.0;

    for route in 0..route_count {
        let line = 4 + route;
        let raw = lines.get(line).ok_or_else(|| CheckError::Malformed {
            line: line + 1,
            message: format!("expected {} routes, found {}", route_count, route),
        })?;
        let nodes = parse_route(raw, line + 1, problem)?;

        if nodes.first() != Some(&DEPOT) {
            return Err(CheckError::Malformed {
                line: line + 1,
                message: "route does not start at the depot".to_string(),
            });
        }
        let customers = &nodes[1..];
        if customers.contains(&DEPOT) {
            return Err(CheckError::Malformed {
                line: line + 1,
                message: "depot visited inside a route".to_string(),
            });
        }

        let load: f64 = customers.iter().map(|&c| problem.demand(c)).sum();
        if load > problem.vehicle_capacity {
            return Err(CheckError::CapacityViolation {
                route,
                load,
                capacity: problem.vehicle_capacity,
            });
        }

        customers.iter().for_each(|&c| visits[c] += 1);
        calculated += tonnage_cost_of(customers, problem);
    }

    if (calculated - reported).abs() > COST_CHECK_TOLERANCE {
        return Err(CheckError::CostInconsistency {
            reported,
            calculated,
        });
    }

    if let Some(customer) = problem.customers().find(|&c| visits[c] != 1) {
        return Err(CheckError::Coverage {
            customer,
            visits: visits[customer],
        });
    }

    Ok(CheckReport {
        total_cost: calculated,
        routes: route_count,
    })
}

fn header_value<T: std::str::FromStr>(lines: &[String], index: usize) -> Result<T, CheckError> {
    let raw = lines.get(index).map(|l| l.trim()).unwrap_or_default();

    raw.parse::<T>().map_err(|_| CheckError::Malformed {
        line: index + 1,
        message: format!("cannot parse `{}`", raw),
    })
}

fn parse_route(raw: &str, line: usize, problem: &Problem) -> Result<Vec<usize>, CheckError> {
    raw.trim()
        .split(',')
        .map(|field| {
            let field = field.trim();
            match field.parse::<usize>() {
                Ok(node) if node < problem.nodes.len() => Ok(node),
                _ => Err(CheckError::Malformed {
                    line,
                    message: format!("unknown node `{}`", field),
                }),
            }
        })
        .collect()
}
