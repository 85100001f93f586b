#![allow(non_snake_case)]
use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn main() {
    // Double integrator with |u| <= 1 and a terminal goal constraint.

    let dt = 0.1;
    let dynamics = LinearDiscrete::new(
        DMatrix::from_row_slice(2, 2, &[1.0, dt, 0.0, 1.0]),
        DMatrix::from_row_slice(2, 1, &[0.5 * dt * dt, dt]),
    );

    let objective = QuadraticObjective::new(
        DMatrix::identity(2, 2),
        DMatrix::from_element(1, 1, 0.1),
        DMatrix::identity(2, 2),
        DVector::zeros(2),
    )
    .unwrap();

    let prob = Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![2.0, 0.0]),
        31,
        dt,
    )
    .unwrap()
    .with_control_bounds(DVector::from_element(1, -1.0), DVector::from_element(1, 1.0))
    .unwrap()
    .with_goal_constraint(true);

    let settings = DefaultSettingsBuilder::<f64>::default()
        .verbose(true)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(prob, settings);
    solver.solve();

    println!("status        = {}", solver.solution.status);
    println!("max violation = {:.3e}", solver.solution.max_violation);
    let u_max = solver
        .solution
        .u
        .iter()
        .fold(0f64, |m, u| m.max(u[0].abs()));
    println!("max |u|       = {:.6}", u_max);
}
