#![allow(non_snake_case)]
use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn main() {
    // Double integrator driven from rest at x = 1 to the origin.
    // No constraints: the outer loop short-circuits to one inner solve.

    let dt = 0.1;
    let dynamics = LinearDiscrete::new(
        DMatrix::from_row_slice(2, 2, &[1.0, dt, 0.0, 1.0]),
        DMatrix::from_row_slice(2, 1, &[0.5 * dt * dt, dt]),
    );

    let objective = QuadraticObjective::new(
        DMatrix::identity(2, 2),           // Q
        DMatrix::from_element(1, 1, 0.1),  // R
        DMatrix::identity(2, 2) * 100.0,   // Qf
        DVector::zeros(2),                 // xf
    )
    .unwrap();

    let prob = Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![1.0, 0.0]),
        21,
        dt,
    )
    .unwrap();

    let settings = DefaultSettingsBuilder::default()
        .verbose(true)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(prob, settings);
    solver.solve();

    println!("status   = {}", solver.solution.status);
    println!("cost     = {:.6}", solver.solution.obj_val);
    println!("terminal = {:?}", solver.solution.x.last().unwrap().as_slice());
}
