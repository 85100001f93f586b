#![allow(non_snake_case)]

use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn double_integrator_problem(dt: f64, N: usize) -> Problem<f64> {
    let dynamics = LinearDiscrete::new(
        DMatrix::from_row_slice(2, 2, &[1.0, dt, 0.0, 1.0]),
        DMatrix::from_row_slice(2, 1, &[0.5 * dt * dt, dt]),
    );
    let objective = QuadraticObjective::new(
        DMatrix::identity(2, 2),
        DMatrix::from_element(1, 1, 0.1),
        DMatrix::identity(2, 2) * 100.0,
        DVector::zeros(2),
    )
    .unwrap();

    Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![1.0, 0.0]),
        N,
        dt,
    )
    .unwrap()
}

#[test]
fn test_unconstrained_short_circuits() {
    let prob = double_integrator_problem(0.1, 21);
    assert!(!prob.is_constrained());

    let mut solver = DefaultSolver::new(prob, DefaultSettings::default());
    solver.solve();

    // the outer loop is skipped entirely: exactly one inner solve and
    // no dual/penalty work
    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert_eq!(solver.info.iterations, 1);
    assert_eq!(solver.info.iter_inner_history.len(), 1);
    assert_eq!(solver.info.violation_history, vec![0.0]);

    // the goal is approached under the heavy terminal weight
    let xN = &solver.solution.x[20];
    assert!(xN.norm() < 0.1, "terminal state too far from goal: {}", xN);
}

#[test]
fn test_unconstrained_cost_decreases() {
    let prob = double_integrator_problem(0.1, 21);
    let settings = DefaultSettings::default();

    // cost of the zero-control rollout
    let mut solver = DefaultSolver::new(prob, settings);
    let initial_cost = {
        let mut traj = Trajectory::zeros(&solver.prob);
        assert!(rollout(&solver.prob, &mut traj, &solver.settings));
        solver.prob.objective.trajectory_cost(&solver.prob, &traj)
    };

    solver.solve();
    assert!(solver.solution.obj_val < initial_cost);
}
