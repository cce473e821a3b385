//! Solution file output.
//!
//! The file lists the total tonnage cost and one open route per line:
//!
//! ```text
//! Cost:
//! 1234.5
//! Routes:
//! 2
//! 0,3,1,4
//! 0,2,5
//! ```

use crate::problem::{Problem, DEPOT};
use crate::solution::Solution;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tonnage costs and customer sequences of the non-empty routes of a solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub total_cost: f64,
    pub route_costs: Vec<f64>,
    /// Customers of each route, depot excluded
    pub routes: Vec<Vec<usize>>,
}

/// Compute the tonnage cost of every non-empty route.
///
/// The solution is only read; its distance cost is left untouched.
pub fn build_report(solution: &Solution, problem: &Problem) -> Report {
    let used = solution.routes.iter().filter(|r| !r.is_empty());

    let routes: Vec<Vec<usize>> = used.clone().map(|r| r.customers().to_vec()).collect();
    let route_costs: Vec<f64> = used.map(|r| r.tonnage_cost(problem)).collect();

    Report {
        total_cost: route_costs.iter().sum(),
        route_costs,
        routes,
    }
}

/// Write the report in the solution file format.
pub fn write_report<W: Write>(report: &Report, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "Cost:")?;
    writeln!(writer, "{}", report.total_cost)?;
    writeln!(writer, "Routes:")?;
    writeln!(writer, "{}", report.routes.len())?;

    for route in &report.routes {
        write!(writer, "{}", DEPOT)?;
        for customer in route {
            write!(writer, ",{}", customer)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Save the report of a solution to a file.
pub fn save_report<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<Report> {
    let report = build_report(solution, problem);
    let mut writer = BufWriter::new(File::create(path)?);

    write_report(&report, &mut writer)?;
    writer.flush()?;

    Ok(report)
}
