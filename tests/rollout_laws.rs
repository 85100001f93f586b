#![allow(non_snake_case)]

use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn pendulum_like() -> (DMatrix<f64>, DMatrix<f64>) {
    (
        DMatrix::from_row_slice(2, 2, &[0.0, 1.0, -1.0, -0.1]),
        DMatrix::from_row_slice(2, 1, &[0.0, 1.0]),
    )
}

fn zoh_problem() -> Problem<f64> {
    let (a, b) = pendulum_like();
    let dynamics = Rk3::new(LinearContinuous::new(a, b));
    let objective = QuadraticObjective::new(
        DMatrix::identity(2, 2),
        DMatrix::from_element(1, 1, 0.1),
        DMatrix::identity(2, 2),
        DVector::zeros(2),
    )
    .unwrap();

    Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![0.5, -0.2]),
        11,
        0.1,
    )
    .unwrap()
}

fn foh_problem() -> Problem<f64> {
    let (a, b) = pendulum_like();
    let dynamics = Rk3::new(LinearContinuous::new(a.clone(), b.clone()));
    let objective = QuadraticObjective::new(
        DMatrix::identity(2, 2),
        DMatrix::from_element(1, 1, 0.1),
        DMatrix::identity(2, 2),
        DVector::zeros(2),
    )
    .unwrap();

    Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![0.5, -0.2]),
        11,
        0.1,
    )
    .unwrap()
    .with_scheme(
        IntegrationScheme::Foh,
        Some(Box::new(LinearContinuous::new(a, b))),
    )
    .unwrap()
}

fn seed_controls(traj: &mut Trajectory<f64>) {
    for (k, u) in traj.u.iter_mut().enumerate() {
        u[0] = 0.3 * (k as f64) - 0.7;
    }
}

#[test]
fn test_closed_loop_zero_gains_is_open_loop_zoh() {
    let prob = zoh_problem();
    let solver = DefaultSolver::new(prob, DefaultSettings::default());

    let mut nominal = Trajectory::zeros(&solver.prob);
    seed_controls(&mut nominal);
    assert!(rollout(&solver.prob, &mut nominal, &solver.settings));

    let gains = Gains::zeros(&solver.prob);
    let mut replay = Trajectory::zeros(&solver.prob);
    replay.copy_from(&nominal);
    assert!(rollout_closed_loop(
        &solver.prob,
        &nominal,
        &gains,
        0.0,
        &mut replay,
        &solver.settings
    ));

    // bit-for-bit agreement with the open-loop trajectory
    for (x_ol, x_cl) in nominal.x.iter().zip(replay.x.iter()) {
        assert_eq!(x_ol, x_cl);
    }
    for (u_ol, u_cl) in nominal.u.iter().zip(replay.u.iter()) {
        assert_eq!(u_ol, u_cl);
    }
}

#[test]
fn test_closed_loop_zero_gains_is_open_loop_foh() {
    let prob = foh_problem();
    let solver = DefaultSolver::new(prob, DefaultSettings::default());

    let mut nominal = Trajectory::zeros(&solver.prob);
    seed_controls(&mut nominal);
    assert!(rollout(&solver.prob, &mut nominal, &solver.settings));
    assert_eq!(nominal.u.len(), solver.prob.horizon);
    assert_eq!(nominal.xdot.len(), solver.prob.horizon);
    assert_eq!(nominal.xmid.len(), solver.prob.horizon - 1);

    let gains = Gains::zeros(&solver.prob);
    let mut replay = Trajectory::zeros(&solver.prob);
    replay.copy_from(&nominal);
    assert!(rollout_closed_loop(
        &solver.prob,
        &nominal,
        &gains,
        0.0,
        &mut replay,
        &solver.settings
    ));

    for (x_ol, x_cl) in nominal.x.iter().zip(replay.x.iter()) {
        assert_eq!(x_ol, x_cl);
    }
    for (m_ol, m_cl) in nominal.xmid.iter().zip(replay.xmid.iter()) {
        assert_eq!(m_ol, m_cl);
    }
}

#[test]
fn test_divergence_reported_not_fatal() {
    // unstable discrete map doubles the state each step
    let dynamics = LinearDiscrete::new(
        DMatrix::from_row_slice(1, 1, &[2.0]),
        DMatrix::from_row_slice(1, 1, &[0.0]),
    );
    let objective = QuadraticObjective::new(
        DMatrix::identity(1, 1),
        DMatrix::identity(1, 1),
        DMatrix::identity(1, 1),
        DVector::zeros(1),
    )
    .unwrap();
    let prob = Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![1.0]),
        60,
        0.1,
    )
    .unwrap();

    let settings = DefaultSettingsBuilder::<f64>::default()
        .max_state_value(1e6)
        .build()
        .unwrap();
    let solver = DefaultSolver::new(prob, settings);

    let mut traj = Trajectory::zeros(&solver.prob);
    assert!(!rollout(&solver.prob, &mut traj, &solver.settings));
}

#[test]
fn test_foh_midpoint_bookkeeping() {
    let prob = foh_problem();
    let solver = DefaultSolver::new(prob, DefaultSettings::default());

    let mut traj = Trajectory::zeros(&solver.prob);
    seed_controls(&mut traj);
    assert!(rollout(&solver.prob, &mut traj, &solver.settings));

    // xmid is the cubic interpolant midpoint
    let dt = 0.1;
    for k in 0..solver.prob.horizon - 1 {
        let expect = (&traj.x[k] + &traj.x[k + 1]) * 0.5
            + (&traj.xdot[k] - &traj.xdot[k + 1]) * (dt / 8.0);
        assert_eq!(traj.xmid[k], expect);
    }
}
