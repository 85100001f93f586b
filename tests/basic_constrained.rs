#![allow(non_snake_case)]

use nalgebra::{DMatrix, DVector};
use trajopt::solver::traits::ConstraintFunction;
use trajopt::solver::*;

fn bounded_double_integrator(dt: f64, N: usize) -> Problem<f64> {
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
        DVector::from_vec(vec![2.0, 0.0]),
        N,
        dt,
    )
    .unwrap()
    .with_control_bounds(DVector::from_element(1, -1.0), DVector::from_element(1, 1.0))
    .unwrap()
}

#[test]
fn test_control_bounds_satisfied() {
    let prob = bounded_double_integrator(0.1, 21);
    assert!(prob.is_constrained());

    let mut solver = DefaultSolver::new(prob, DefaultSettings::default());

    // seed a guess that violates the bound
    let u0 = vec![DVector::from_element(1, 2.0); 20];
    solver.set_initial_controls(&u0).unwrap();

    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    // bounds hold to within the constraint tolerance
    let tol = solver.settings.constraint_tolerance;
    for u in solver.solution.u.iter() {
        assert!(u[0].abs() <= 1.0 + tol, "bound violated: {}", u[0]);
    }

    // the recorded history ends strictly below tolerance
    let last = *solver.info.violation_history.last().unwrap();
    assert!(last < tol);
}

#[test]
fn test_dual_and_penalty_invariants() {
    let prob = bounded_double_integrator(0.1, 21);
    let settings = DefaultSettings::default();
    let penalty_initial = settings.penalty_initial;
    let penalty_max = settings.penalty_max;

    let mut solver = DefaultSolver::new(prob, settings);
    solver.solve();

    let al = match &solver.cost {
        CostModel::AugmentedLagrangian(al) => al,
        CostModel::Unconstrained(_) => panic!("expected a constrained cost model"),
    };

    for knot in al.state.stages.iter().chain([&al.state.terminal]) {
        // inequality multipliers stay projected nonnegative
        for &l in knot.λ.inequality() {
            assert!(l >= 0.0);
        }
        // penalties escalate monotonically from the initial value and
        // respect the ceiling
        for &p in knot.μ.data.iter() {
            assert!(p >= penalty_initial);
            assert!(p <= penalty_max);
        }
        // equality rows are always active
        for &on in knot.active.equality() {
            assert!(on);
        }
    }
}

#[test]
fn test_constraint_layout_sizes() {
    let prob = bounded_double_integrator(0.1, 21);
    let solver = DefaultSolver::new(prob, DefaultSettings::default());

    let stage = ConstraintLayout::stage(&solver.prob);
    let terminal = ConstraintLayout::terminal(&solver.prob);

    // |u| <= 1 contributes one upper and one lower row; nothing else
    assert_eq!(stage.p_ineq, 2);
    assert_eq!(stage.p_eq, 0);
    assert_eq!(stage.p_ineq + stage.p_eq, stage.p);

    // no goal constraint requested: empty terminal layout
    assert_eq!(terminal.p, 0);

    // the stored per-knot vectors match the layout sizes
    let al = match &solver.cost {
        CostModel::AugmentedLagrangian(al) => al,
        CostModel::Unconstrained(_) => panic!("expected a constrained cost model"),
    };
    for knot in al.state.stages.iter() {
        assert_eq!(knot.c.inequality().len() + knot.c.equality().len(), stage.p);
    }
    assert_eq!(al.state.terminal.c.len(), terminal.p);
}

// nonlinear speed limit  v² − v_max² ≤ 0
struct SpeedLimit {
    vmax: f64,
}

impl ConstraintFunction<f64> for SpeedLimit {
    fn dim(&self) -> usize {
        1
    }
    fn evaluate(&self, out: &mut [f64], x: &DVector<f64>, _u: &DVector<f64>) {
        out[0] = x[1] * x[1] - self.vmax * self.vmax;
    }
}

#[test]
fn test_custom_inequality_constraint() {
    let dt = 0.1;
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

    let prob = Problem::new(
        Box::new(dynamics),
        objective,
        DVector::from_vec(vec![2.0, 0.0]),
        41,
        dt,
    )
    .unwrap()
    .with_inequality_constraint(Box::new(SpeedLimit { vmax: 0.8 }));

    // the custom row lands after the (empty) box families
    let mut solver = DefaultSolver::new(prob, DefaultSettings::default());
    let stage = ConstraintLayout::stage(&solver.prob);
    assert_eq!(stage.p_ineq, 1);
    assert_eq!(stage.custom_ineq, 1);

    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);

    for x in solver.solution.x.iter() {
        assert!(x[1].abs() <= 0.81, "speed limit violated: {}", x[1]);
    }
}

#[test]
fn test_active_set_memory() {
    let prob = bounded_double_integrator(0.1, 11);
    let settings = DefaultSettings::default();
    let mut solver = DefaultSolver::new(prob, settings.clone());
    solver.solve();

    let al = match &mut solver.cost {
        CostModel::AugmentedLagrangian(al) => al,
        CostModel::Unconstrained(_) => panic!("expected a constrained cost model"),
    };

    // force a positive multiplier against a negative residual: with the
    // penalty zeroed the dual update leaves the multiplier in place, and
    // the row must stay active purely through the multiplier memory
    let knot = &mut al.state.stages[0];
    knot.c.data[0] = -1.0;
    knot.λ.data[0] = 0.5;
    knot.μ.data[0] = 0.0;

    al.state.dual_update(&settings);

    let knot = &al.state.stages[0];
    assert!(knot.λ.data[0] > 0.0);
    assert!(knot.active.data[0]);

    // with the multiplier cleared the same negative residual deactivates
    let knot = &mut al.state.stages[0];
    knot.λ.data[0] = 0.0;
    al.state.update_active_set(settings.active_set_tolerance);
    assert!(!al.state.stages[0].active.data[0]);
}
