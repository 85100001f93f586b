#![allow(non_snake_case)]
use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn main() {
    // Infeasible start: seed a straight-line state trajectory, let the
    // slack controls make it dynamically exact, then drive the slacks
    // to zero through the penalty schedule.

    let dt = 0.1;
    let dynamics = LinearDiscrete::new(
        DMatrix::from_row_slice(2, 2, &[1.0, dt, 0.0, 1.0]),
        DMatrix::from_row_slice(2, 1, &[0.5 * dt * dt, dt]),
    );

    let objective = QuadraticObjective::new(
        DMatrix::identity(2, 2),
        DMatrix::from_element(1, 1, 0.1),
        DMatrix::identity(2, 2) * 100.0,
        DVector::from_vec(vec![1.0, 0.0]),
    )
    .unwrap();

    let prob = Problem::new(
        Box::new(dynamics),
        objective,
        DVector::zeros(2),
        21,
        dt,
    )
    .unwrap()
    .with_goal_constraint(true);

    let settings = DefaultSettingsBuilder::default()
        .infeasible(true)
        .verbose(true)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(prob, settings);

    let x_ref = line_trajectory(&solver.prob.x0, &solver.prob.objective.xf, 21);
    solver.set_initial_state_trajectory(&x_ref).unwrap();

    solver.solve();

    println!("status        = {}", solver.solution.status);
    println!("max violation = {:.3e}", solver.solution.max_violation);
}
