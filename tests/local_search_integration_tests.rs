//! Integration tests for the local search engine working with the constructions.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tonnage_cvrp::construction::Construction;
use tonnage_cvrp::local_search::{LocalSearch, Operator};
use tonnage_cvrp::problem::{Node, Problem};
use tonnage_cvrp::solution::{Route, Solution};

/// Creates a more complex test problem with a depot and customers in a grid.
fn create_complex_problem() -> Problem {
    let mut nodes = Vec::new();

    // Depot at (50, 50)
    nodes.push(Node::new(0, 50.0, 50.0, 0.0));

    let mut id = 1;
    for x in 0..5 {
        for y in 0..5 {
            // Skip the center where the depot is
            if x == 2 && y == 2 {
                continue;
            }
            let x_coord = x as f64 * 20.0 + 10.0;
            let y_coord = y as f64 * 20.0 + 10.0;
            let demand = 1.0 + (x + y) as f64 * 0.1;
            nodes.push(Node::new(id, x_coord, y_coord, demand));
            id += 1;
        }
    }

    Problem::new(
        "ComplexTestProblem".to_string(),
        nodes,
        10.0, // vehicle capacity
        5.0,  // empty vehicle weight
    )
}

/// Creates a feasible solution with shuffled routes.
fn create_random_solution(problem: &Problem, seed: u64) -> Solution {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut customers: Vec<usize> = problem.customers().collect();
    customers.shuffle(&mut rng);

    // Demands never exceed 1.8, so five customers always fit
    let routes = customers
        .chunks(5)
        .map(|chunk| Route::from_customers(chunk, problem))
        .collect();

    Solution::from_routes(routes)
}

fn assert_valid(solution: &Solution, problem: &Problem) {
    assert!(solution.is_consistent(problem));
    assert!(solution.is_feasible());
    assert!(solution.covers_all_customers(problem));
}

#[test]
fn test_descent_never_worsens() {
    let problem = create_complex_problem();

    for operator in Operator::ALL {
        let solution = create_random_solution(&problem, 7);
        let initial_cost = solution.cost;

        let mut local_search = LocalSearch::new();
        let improved = local_search.run(solution, &problem, operator);

        assert!(improved.cost <= initial_cost);
        assert_valid(&improved, &problem);
    }
}

#[test]
fn test_descent_reaches_local_optimum() {
    let problem = create_complex_problem();
    let solution = create_random_solution(&problem, 11);

    let mut local_search = LocalSearch::new();
    let improved = local_search.run(solution, &problem, Operator::Relocation);
    assert!(local_search.applied_moves > 0);

    // A second descent from the optimum finds nothing to apply
    let moves = local_search.applied_moves;
    let again = local_search.run(improved.clone(), &problem, Operator::Relocation);

    assert_eq!(local_search.applied_moves, moves);
    assert!((again.cost - improved.cost).abs() < 1e-9);
}

#[test]
fn test_vnd_is_local_optimum_for_every_operator() {
    let problem = create_complex_problem();
    let solution = create_random_solution(&problem, 3);
    let initial_cost = solution.cost;

    let mut local_search = LocalSearch::new();
    let improved = local_search.vnd(solution, &problem, &Operator::ALL);

    assert!(improved.cost < initial_cost);
    assert_valid(&improved, &problem);

    for operator in Operator::ALL {
        let mut check = LocalSearch::new();
        let again = check.run(improved.clone(), &problem, operator);
        assert_eq!(check.applied_moves, 0, "{:?} still improves", operator);
        assert!((again.cost - improved.cost).abs() < 1e-9);
    }
}

#[test]
fn test_vnd_after_each_construction() {
    let problem = create_complex_problem();

    for construction in [
        Construction::NearestNeighbor,
        Construction::MinimumInsertion,
        Construction::Savings,
    ] {
        let solution = construction.build(&problem).expect("instance is feasible");
        let initial_cost = solution.cost;

        let improved = LocalSearch::new().vnd(solution, &problem, &Operator::ALL);

        assert!(improved.cost <= initial_cost, "{:?} got worse", construction);
        assert_valid(&improved, &problem);
    }
}

#[test]
fn test_vnd_with_empty_operator_list() {
    let problem = create_complex_problem();
    let solution = create_random_solution(&problem, 5);
    let nodes: Vec<Vec<usize>> = solution.routes.iter().map(|r| r.nodes.clone()).collect();

    let result = LocalSearch::new().vnd(solution, &problem, &[]);

    let after: Vec<Vec<usize>> = result.routes.iter().map(|r| r.nodes.clone()).collect();
    assert_eq!(nodes, after);
}
