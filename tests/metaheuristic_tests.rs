//! Tests for Guided Local Search, Tabu Search and the perturbation operators.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tonnage_cvrp::config::Config;
use tonnage_cvrp::construction::nearest_neighbor;
use tonnage_cvrp::guided::GuidedLocalSearch;
use tonnage_cvrp::local_search::{AllowAll, LocalSearch, Metric, Operator};
use tonnage_cvrp::perturbation::{block_exchange, full_reversal, partial_reversal, segment_shuffle};
use tonnage_cvrp::problem::{Node, Problem};
use tonnage_cvrp::solution::{tonnage_cost_of, Route, Solution};
use tonnage_cvrp::tabu::TabuSearch;

/// Twenty customers in a grid around a central depot.
fn create_moderate_problem() -> Problem {
    let mut nodes = vec![Node::new(0, 50.0, 50.0, 0.0)];

    let mut id = 1;
    for i in 0..4 {
        for j in 0..5 {
            let x = i as f64 * 20.0 + 10.0;
            let y = j as f64 * 20.0 + 10.0;
            let demand = 1.0 + 0.1 * (id as f64 % 3.0);
            nodes.push(Node::new(id, x, y, demand));
            id += 1;
        }
    }

    Problem::new("ModerateTestProblem".to_string(), nodes, 10.0, 4.0)
}

/// A locally optimal starting point for the metaheuristics.
fn create_local_optimum(problem: &Problem) -> Solution {
    let solution = nearest_neighbor(problem).expect("instance is feasible");
    let mut solution = LocalSearch::new().vnd(solution, problem, &Operator::ALL);
    solution.remove_empty_routes();
    solution
}

fn assert_valid(solution: &Solution, problem: &Problem) {
    assert!(solution.is_consistent(problem));
    assert!(solution.is_feasible());
    assert!(solution.covers_all_customers(problem));
}

fn route_nodes(solution: &Solution) -> Vec<Vec<usize>> {
    solution.routes.iter().map(|r| r.nodes.clone()).collect()
}

#[test]
fn test_gls_never_returns_worse() {
    let problem = create_moderate_problem();
    let start = create_local_optimum(&problem);
    let initial_cost = start.cost;

    let mut gls = GuidedLocalSearch::new(&problem, 0.15);
    let best = gls.run(start, &problem, 300, 42, None);

    assert!(best.cost <= initial_cost + 1e-9);
    assert_valid(&best, &problem);
    // A local optimum has no improving move, so the first iteration penalizes
    assert!(gls.penalizations > 0);
}

#[test]
fn test_gls_is_deterministic() {
    let problem = create_moderate_problem();
    let start = create_local_optimum(&problem);

    let first = GuidedLocalSearch::new(&problem, 0.15).run(start.clone(), &problem, 200, 7, None);
    let second = GuidedLocalSearch::new(&problem, 0.15).run(start, &problem, 200, 7, None);

    assert_eq!(route_nodes(&first), route_nodes(&second));
}

#[test]
fn test_gls_penalties_do_not_compound() {
    let problem = create_moderate_problem();
    let solution = Solution::from_routes(vec![Route::from_customers(&[1], &problem)]);
    let base = problem.get_distance(0, 1);
    let lambda = 0.5;

    let mut gls = GuidedLocalSearch::new(&problem, lambda);

    // Both arcs of the trip have the same utility, the first one found is penalized
    gls.penalize_arcs(&solution, &problem);
    assert_eq!(gls.penalty(0, 1), 1);
    assert_eq!(gls.penalty(1, 0), 1);
    assert!((gls.penalized_matrix()[0][1] - base * 1.5).abs() < 1e-9);
    assert!((gls.penalized_matrix()[1][0] - base * 1.5).abs() < 1e-9);

    gls.penalize_arcs(&solution, &problem);
    assert_eq!(gls.penalty(0, 1), 2);
    assert!((gls.penalized_matrix()[0][1] - base * 2.0).abs() < 1e-9);

    // The true distances are never touched
    assert_eq!(problem.get_distance(0, 1), base);
    assert_eq!(gls.penalizations, 2);
}

#[test]
fn test_tabu_never_returns_worse() {
    let problem = create_moderate_problem();
    let start = create_local_optimum(&problem);
    let initial_cost = start.cost;
    let config = Config::new().with_stagnation_threshold(10).with_reversal_interval(25);

    let mut tabu = TabuSearch::new(&problem, &config);
    let best = tabu.run(start, &problem, 300, 3, None);

    assert!(best.cost <= initial_cost + 1e-9);
    assert_valid(&best, &problem);
    assert!(tabu.perturbations > 0);
}

#[test]
fn test_tabu_is_deterministic() {
    let problem = create_moderate_problem();
    let start = create_local_optimum(&problem);
    let config = Config::new().with_stagnation_threshold(20);

    let first = TabuSearch::new(&problem, &config).run(start.clone(), &problem, 150, 9, None);
    let second = TabuSearch::new(&problem, &config).run(start, &problem, 150, 9, None);

    assert_eq!(route_nodes(&first), route_nodes(&second));
}

#[test]
fn test_tabu_starts_without_tabu_nodes() {
    let problem = create_moderate_problem();
    let mut config = Config::new();
    config.tabu_min_tenure = 5;
    config.tabu_max_tenure = 3;
    let tabu = TabuSearch::new(&problem, &config);

    assert!(problem.customers().all(|c| !tabu.is_tabu(c, 0)));
    // An inverted range loaded from a file collapses to the minimum tenure
    assert_eq!(tabu.min_tenure, 5);
    assert_eq!(tabu.max_tenure, 5);
}

#[test]
fn test_tabu_marks_moved_customers_for_the_tenure() {
    let problem = create_moderate_problem();
    let start = create_local_optimum(&problem);
    let config = Config::new()
        .with_tabu_tenure(50, 50)
        .with_stagnation_threshold(100)
        .with_reversal_interval(1000);
    let seed = 11;

    // Nothing is tabu in the first iteration, so it takes the unrestricted best
    // move of the operator drawn from the seeded generator.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let operator = *Operator::ALL.choose(&mut rng).unwrap();
    let first_move = operator
        .find_best(&start, &problem, Metric::plain(&problem), &AllowAll)
        .expect("a move exists");
    let touched = first_move.touched_nodes(&start);
    assert!(!touched.is_empty());

    let mut tabu = TabuSearch::new(&problem, &config);
    tabu.run(start.clone(), &problem, 1, seed, None);

    for customer in problem.customers() {
        if touched.contains(&customer) {
            assert!(tabu.is_tabu(customer, 1));
            assert!(tabu.is_tabu(customer, 49));
            assert!(!tabu.is_tabu(customer, 50));
        } else {
            assert!(!tabu.is_tabu(customer, 1));
        }
    }

    // Over several iterations every mark expires 50 iterations after its move
    let mut tabu = TabuSearch::new(&problem, &config);
    tabu.run(start, &problem, 5, seed, None);

    assert!(problem.customers().any(|c| tabu.is_tabu(c, 5)));
    assert!(problem.customers().all(|c| !tabu.is_tabu(c, 54)));
}

#[test]
fn test_full_reversal_keeps_cheaper_direction() {
    let problem = create_moderate_problem();
    let mut solution = create_local_optimum(&problem);
    let tonnage = solution.tonnage_cost(&problem);

    full_reversal(&mut solution, &problem);

    assert!(solution.tonnage_cost(&problem) <= tonnage + 1e-9);
    assert_valid(&solution, &problem);
    for route in &solution.routes {
        let mut reversed = route.customers().to_vec();
        reversed.reverse();
        assert!(route.tonnage_cost(&problem) <= tonnage_cost_of(&reversed, &problem) + 1e-9);
    }

    // Nothing is left to reverse
    assert_eq!(full_reversal(&mut solution, &problem), 0);
}

#[test]
fn test_full_reversal_serves_heavy_customer_first() {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0),
        Node::new(1, 10.0, 0.0, 5.0),
        Node::new(2, 20.0, 0.0, 1.0),
    ];
    let problem = Problem::new("Line".to_string(), nodes, 10.0, 1.0);
    // Light far customer first: 20 * 7 + 10 * 6 = 200, against 10 * 7 + 10 * 2 = 90
    let mut solution = Solution::from_routes(vec![Route::from_customers(&[2, 1], &problem)]);

    assert_eq!(full_reversal(&mut solution, &problem), 1);
    assert_eq!(solution.routes[0].nodes, vec![0, 1, 2, 0]);
    assert!((solution.tonnage_cost(&problem) - 90.0).abs() < 1e-9);
    assert!(solution.is_consistent(&problem));
}

#[test]
fn test_perturbations_keep_solution_valid() {
    let problem = create_moderate_problem();
    let mut solution = create_local_optimum(&problem);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    for _ in 0..200 {
        let tonnage = solution.tonnage_cost(&problem);
        segment_shuffle(&mut solution, &problem, &mut rng);
        assert!(solution.tonnage_cost(&problem) <= tonnage + 1e-9);

        let tonnage = solution.tonnage_cost(&problem);
        partial_reversal(&mut solution, &problem, &mut rng);
        assert!(solution.tonnage_cost(&problem) <= tonnage + 1e-9);

        let tonnage = solution.tonnage_cost(&problem);
        block_exchange(&mut solution, &problem, &mut rng, 1.0);
        assert!(solution.tonnage_cost(&problem) <= tonnage + 1e-6);

        block_exchange(&mut solution, &problem, &mut rng, 1.2);

        assert_valid(&solution, &problem);
        assert!(solution.routes.iter().all(|r| !r.is_empty()));
    }
}

#[test]
fn test_perturbations_on_tiny_routes() {
    let problem = create_moderate_problem();
    let mut solution = Solution::from_routes(vec![
        Route::from_customers(&[1], &problem),
        Route::from_customers(&[2, 3], &problem),
    ]);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    // No route has three customers to shuffle
    assert!(!segment_shuffle(&mut solution, &problem, &mut rng));
    // Blocks in the same two-customer route always overlap
    for _ in 0..20 {
        block_exchange(&mut solution, &problem, &mut rng, 10.0);
    }
    assert_eq!(solution.routes[0].nodes, vec![0, 1, 0]);
    assert!(solution.is_consistent(&problem));
}
