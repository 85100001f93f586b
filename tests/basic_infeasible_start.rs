#![allow(non_snake_case)]

use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn double_integrator(dt: f64, N: usize, x0: [f64; 2]) -> Problem<f64> {
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

    Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![x0[0], x0[1]]),
        N,
        dt,
    )
    .unwrap()
}

#[test]
fn test_slacks_reproduce_reference_exactly() {
    let prob = double_integrator(0.1, 11, [0.0, 0.0]);
    let settings = DefaultSettingsBuilder::<f64>::default()
        .infeasible(true)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(prob, settings);

    // an arbitrary reference the dynamics cannot track open loop
    let x_ref: Vec<DVector<f64>> = (0..11)
        .map(|k| {
            let t = k as f64 * 0.1;
            DVector::from_vec(vec![t * t - 0.3 * t, (2.0 * t).sin()])
        })
        .collect();

    solver.set_initial_state_trajectory(&x_ref).unwrap();

    // re-simulating with the synthesized slacks reproduces the
    // reference at every knot
    let mut traj = solver.traj.clone();
    assert!(rollout(&solver.prob, &mut traj, &solver.settings));
    for (x_sim, x_want) in traj.x.iter().zip(x_ref.iter()) {
        for i in 0..2 {
            assert!(
                (x_sim[i] - x_want[i]).abs() <= 1e-14,
                "knot mismatch: {} vs {}",
                x_sim[i],
                x_want[i]
            );
        }
    }
}

#[test]
fn test_line_trajectory_endpoints() {
    let x0 = DVector::<f64>::from_vec(vec![1.0, -2.0]);
    let xf = DVector::<f64>::from_vec(vec![3.0, 4.0]);
    let line = line_trajectory(&x0, &xf, 5);

    assert_eq!(line.len(), 5);
    assert_eq!(line[0], x0);
    assert_eq!(line[4], xf);
    // interior points are componentwise linear
    assert!((line[2][0] - 2.0).abs() < 1e-12);
    assert!((line[2][1] - 1.0).abs() < 1e-12);
}

#[test]
fn test_infeasible_start_solve_drives_slacks_to_zero() {
    let prob = double_integrator(0.1, 11, [0.0, 0.0]).with_goal_constraint(true);
    let settings = DefaultSettingsBuilder::<f64>::default()
        .infeasible(true)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(prob, settings);

    let x_ref = line_trajectory(&solver.prob.x0, &solver.prob.objective.xf, 11);
    solver.set_initial_state_trajectory(&x_ref).unwrap();

    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);

    // the slack equality family forces the slacks below tolerance
    let tol = solver.settings.constraint_tolerance;
    for u in solver.traj.u.iter() {
        for i in 1..u.len() {
            assert!(u[i].abs() <= tol * 10.0, "slack too large: {}", u[i]);
        }
    }

    // the returned controls are stripped to the nominal width
    assert_eq!(solver.solution.u[0].len(), 1);
}
