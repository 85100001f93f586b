#![allow(non_snake_case)]

use nalgebra::{DMatrix, DVector};
use trajopt::solver::*;

fn dynamics() -> Box<LinearDiscrete<f64>> {
    Box::new(LinearDiscrete::new(
        DMatrix::identity(2, 2),
        DMatrix::from_row_slice(2, 1, &[0.0, 1.0]),
    ))
}

fn objective() -> QuadraticObjective<f64> {
    QuadraticObjective::new(
        DMatrix::identity(2, 2),
        DMatrix::identity(1, 1),
        DMatrix::identity(2, 2),
        DVector::zeros(2),
    )
    .unwrap()
}

#[test]
fn test_bad_initial_state() {
    let result = Problem::new(dynamics(), objective(), DVector::zeros(3), 11, 0.1);
    assert!(matches!(
        result,
        Err(ProblemError::DimensionMismatch { field: "x0", .. })
    ));
}

#[test]
fn test_bad_objective_shapes() {
    assert!(QuadraticObjective::<f64>::new(
        DMatrix::identity(3, 3),
        DMatrix::identity(1, 1),
        DMatrix::identity(2, 2),
        DVector::zeros(2),
    )
    .is_err());
}

#[test]
fn test_horizon_too_short() {
    let result = Problem::new(dynamics(), objective(), DVector::zeros(2), 1, 0.1);
    assert!(matches!(result, Err(ProblemError::HorizonTooShort)));
}

#[test]
fn test_negative_timestep() {
    let result = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, -0.1);
    assert!(matches!(result, Err(ProblemError::NegativeTimestep)));
}

#[test]
fn test_zero_timestep_selects_minimum_time() {
    let prob = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, 0.0).unwrap();
    assert!(prob.is_min_time());
    assert!(prob.is_constrained());
}

#[test]
fn test_bad_bound_lengths() {
    let prob = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, 0.1).unwrap();
    let result = prob.with_control_bounds(DVector::zeros(2), DVector::zeros(2));
    assert!(matches!(
        result,
        Err(ProblemError::DimensionMismatch { field: "u_min", .. })
    ));
}

#[test]
fn test_inverted_bounds() {
    let prob = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, 0.1).unwrap();
    let result = prob.with_control_bounds(
        DVector::from_element(1, 1.0),
        DVector::from_element(1, -1.0),
    );
    assert!(matches!(result, Err(ProblemError::InvertedBound(0))));
}

#[test]
fn test_foh_requires_continuous_dynamics() {
    let prob = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, 0.1).unwrap();
    let result = prob.with_scheme(IntegrationScheme::Foh, None);
    assert!(matches!(
        result,
        Err(ProblemError::MissingContinuousDynamics)
    ));
}

#[test]
fn test_infeasible_start_requires_option() {
    let prob = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, 0.1).unwrap();
    let mut solver = DefaultSolver::new(prob, DefaultSettings::default());

    let x_ref = vec![DVector::zeros(2); 11];
    assert!(matches!(
        solver.set_initial_state_trajectory(&x_ref),
        Err(ProblemError::InfeasibleStartDisabled)
    ));
}

#[test]
fn test_initial_controls_length_checked() {
    let prob = Problem::new(dynamics(), objective(), DVector::zeros(2), 11, 0.1).unwrap();
    let mut solver = DefaultSolver::new(prob, DefaultSettings::default());

    let u0 = vec![DVector::zeros(1); 3];
    assert!(solver.set_initial_controls(&u0).is_err());
}
