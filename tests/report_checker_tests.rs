//! Tests for the solution file writer and the independent checker.

use std::io::Cursor;

use tonnage_cvrp::checker::{check_solution, CheckError};
use tonnage_cvrp::problem::{Node, Problem};
use tonnage_cvrp::report::{build_report, save_report, write_report};
use tonnage_cvrp::solution::{Route, Solution};

/// Creates a simple test problem with a depot and some customers.
fn create_test_problem() -> Problem {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0),
        Node::new(1, 10.0, 0.0, 1.0),
        Node::new(2, 0.0, 10.0, 1.0),
        Node::new(3, 10.0, 10.0, 1.0),
        Node::new(4, 20.0, 0.0, 1.5),
        Node::new(5, 20.0, 10.0, 2.0),
    ];

    Problem::new("TestProblem".to_string(), nodes, 5.0, 2.0)
}

fn check(problem: &Problem, text: &str) -> Result<f64, CheckError> {
    check_solution(problem, Cursor::new(text.as_bytes())).map(|report| report.total_cost)
}

#[test]
fn test_report_format() {
    let problem = create_test_problem();
    let solution = Solution::from_routes(vec![
        Route::from_customers(&[1, 4], &problem),
        Route::new(problem.vehicle_capacity),
        Route::from_customers(&[2, 3, 5], &problem),
    ]);

    let report = build_report(&solution, &problem);
    let mut output = Vec::new();
    write_report(&report, &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    // Empty routes are not reported
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Cost:");
    assert_eq!(lines[2], "Routes:");
    assert_eq!(lines[3], "2");
    assert_eq!(lines[4], "0,1,4");
    assert_eq!(lines[5], "0,2,3,5");

    assert_eq!(report.route_costs.len(), 2);
    // 10 * 4.5 + 10 * 3.5
    assert!((report.route_costs[0] - 80.0).abs() < 1e-9);
    assert!((lines[1].parse::<f64>().unwrap() - report.total_cost).abs() < 1e-9);
}

#[test]
fn test_report_leaves_solution_untouched() {
    let problem = create_test_problem();
    let solution = Solution::from_routes(vec![Route::from_customers(&[1, 2, 3], &problem)]);
    let distance = solution.cost;

    let report = build_report(&solution, &problem);

    assert_eq!(solution.cost, distance);
    assert!(report.total_cost > distance);
}

#[test]
fn test_checker_accepts_written_report() {
    let problem = create_test_problem();
    let solution = Solution::from_routes(vec![
        Route::from_customers(&[1, 4], &problem),
        Route::from_customers(&[5, 3, 2], &problem),
    ]);

    let report = build_report(&solution, &problem);
    let mut output = Vec::new();
    write_report(&report, &mut output).unwrap();

    let checked = check_solution(&problem, Cursor::new(output)).unwrap();
    assert_eq!(checked.routes, 2);
    assert!((checked.total_cost - report.total_cost).abs() < 1e-9);
}

#[test]
fn test_checker_rejects_wrong_cost() {
    let problem = create_test_problem();

    // Route 0,1,4 costs 80 and route 0,2,3,5 is needed for coverage
    let text = "Cost:\n1.0\nRoutes:\n2\n0,1,4\n0,2,3,5\n";

    match check(&problem, text) {
        Err(CheckError::CostInconsistency { reported, .. }) => assert_eq!(reported, 1.0),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_checker_rejects_overloaded_route() {
    let problem = create_test_problem();
    let text = "Cost:\n0\nRoutes:\n1\n0,1,2,3,4,5\n";

    match check(&problem, text) {
        Err(CheckError::CapacityViolation { route, load, .. }) => {
            assert_eq!(route, 0);
            assert!((load - 6.5).abs() < 1e-9);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_checker_rejects_missing_and_repeated_customers() {
    let problem = create_test_problem();
    let cost = |routes: &[&[usize]]| -> f64 {
        routes
            .iter()
            .map(|r| Route::from_customers(r, &problem).tonnage_cost(&problem))
            .sum()
    };

    // Customer 5 is never visited
    let text = format!("Cost:\n{}\nRoutes:\n1\n0,1,2,3,4\n", cost(&[&[1, 2, 3, 4]]));
    match check(&problem, &text) {
        Err(CheckError::Coverage { customer, visits }) => assert_eq!((customer, visits), (5, 0)),
        other => panic!("unexpected result {:?}", other),
    }

    // Customer 1 is visited twice
    let text = format!(
        "Cost:\n{}\nRoutes:\n2\n0,1,2\n0,1,3,5\n",
        cost(&[&[1, 2], &[1, 3, 5]])
    );
    match check(&problem, &text) {
        Err(CheckError::Coverage { customer, visits }) => assert_eq!((customer, visits), (1, 2)),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_checker_rejects_malformed_files() {
    let problem = create_test_problem();

    assert!(matches!(check(&problem, ""), Err(CheckError::Malformed { line: 2, .. })));
    assert!(matches!(
        check(&problem, "Cost:\nabc\nRoutes:\n1\n0,1\n"),
        Err(CheckError::Malformed { line: 2, .. })
    ));
    // Fewer route lines than announced
    assert!(matches!(
        check(&problem, "Cost:\n0\nRoutes:\n2\n0,1,2,3\n"),
        Err(CheckError::Malformed { line: 6, .. })
    ));
    // Unknown node
    assert!(matches!(
        check(&problem, "Cost:\n0\nRoutes:\n1\n0,1,9\n"),
        Err(CheckError::Malformed { line: 5, .. })
    ));
    // Route not leaving from the depot
    assert!(matches!(
        check(&problem, "Cost:\n0\nRoutes:\n1\n1,2,3,4,5\n"),
        Err(CheckError::Malformed { line: 5, .. })
    ));
}

#[test]
fn test_save_report_round_trip_through_checker() {
    let problem = create_test_problem();
    let solution = Solution::from_routes(vec![
        Route::from_customers(&[4, 1], &problem),
        Route::from_customers(&[3, 2, 5], &problem),
    ]);
    let path = std::env::temp_dir().join(format!("tonnage_cvrp_report_{}.txt", std::process::id()));

    let report = save_report(&solution, &problem, &path).unwrap();
    let file = std::fs::File::open(&path).unwrap();
    let checked = check_solution(&problem, std::io::BufReader::new(file)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!((checked.total_cost - report.total_cost).abs() < 1e-9);
}
