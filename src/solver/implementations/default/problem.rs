#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::traits::{
    ConstraintFunction, ContinuousDynamics, DiscreteDynamics, TerminalConstraint,
};
use crate::solver::utils::infbounds::get_infinity;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Error type returned by problem construction and configuration.
///
/// All shape checking happens here, before the first iteration; the
/// solver itself assumes a validated problem.
#[derive(Error, Debug)]
pub enum ProblemError {
    #[error("dimension mismatch for {field}: expected {expected}, got {got}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("horizon must have at least two knot points")]
    HorizonTooShort,
    #[error("timestep must be nonnegative (zero selects a minimum-time horizon)")]
    NegativeTimestep,
    #[error("first-order hold requires a continuous dynamics model")]
    MissingContinuousDynamics,
    #[error("lower bound exceeds upper bound at index {0}")]
    InvertedBound(usize),
    #[error("an initial state trajectory requires the infeasible-start option")]
    InfeasibleStartDisabled,
}

/// Control hold scheme over each interval.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum IntegrationScheme {
    /// control held constant over the interval
    #[default]
    Zoh,
    /// control varying linearly between interval endpoints
    Foh,
}

/// Immutable per-solve problem description.
///
/// Holds the dimensions, dynamics, objective, box bounds, custom
/// constraint functions and hold scheme.  A zero timestep selects a
/// free-horizon (minimum-time) problem where the per-step duration is a
/// decision variable, carried as its square root so that it is
/// implicitly nonnegative.
pub struct Problem<T: FloatT> {
    /// state dimension
    pub nx: usize,
    /// nominal control dimension
    pub nu: usize,
    /// number of knot points
    pub horizon: usize,
    /// fixed timestep (zero for minimum time)
    pub dt: T,
    /// initial state
    pub x0: DVector<T>,
    /// integration scheme
    pub scheme: IntegrationScheme,
    /// objective
    pub objective: QuadraticObjective<T>,

    pub(crate) dynamics: Box<dyn DiscreteDynamics<T>>,
    pub(crate) continuous: Option<Box<dyn ContinuousDynamics<T>>>,
    pub(crate) ineq_constraint: Option<Box<dyn ConstraintFunction<T>>>,
    pub(crate) eq_constraint: Option<Box<dyn ConstraintFunction<T>>>,
    pub(crate) terminal_constraint: Option<Box<dyn TerminalConstraint<T>>>,

    /// state box bounds (entries at the infinity threshold are absent)
    pub x_min: DVector<T>,
    pub x_max: DVector<T>,
    /// control box bounds over the nominal controls
    pub u_min: DVector<T>,
    pub u_max: DVector<T>,

    /// terminal goal equality constraint enabled
    pub(crate) goal_constraint: bool,

    // derived widths, fixed by configure()
    pub(crate) min_time: bool,
    pub(crate) infeasible: bool,
    pub(crate) m_bar: usize,
    pub(crate) mm: usize,
}

impl<T: FloatT> Problem<T> {
    /// Create a problem from dynamics, objective, initial state, horizon
    /// and timestep.  `dt = 0` selects a minimum-time horizon.
    pub fn new(
        dynamics: Box<dyn DiscreteDynamics<T>>,
        objective: QuadraticObjective<T>,
        x0: DVector<T>,
        horizon: usize,
        dt: T,
    ) -> Result<Self, ProblemError> {
        if horizon < 2 {
            return Err(ProblemError::HorizonTooShort);
        }
        if dt < T::zero() {
            return Err(ProblemError::NegativeTimestep);
        }
        let nx = dynamics.state_dim();
        let nu = dynamics.control_dim();
        if x0.len() != nx {
            return Err(ProblemError::DimensionMismatch {
                field: "x0",
                expected: nx,
                got: x0.len(),
            });
        }
        if objective.xf.len() != nx {
            return Err(ProblemError::DimensionMismatch {
                field: "xf",
                expected: nx,
                got: objective.xf.len(),
            });
        }
        if objective.control_dim() != nu {
            return Err(ProblemError::DimensionMismatch {
                field: "R",
                expected: nu,
                got: objective.control_dim(),
            });
        }

        let inf = T::from_f64(get_infinity()).unwrap();
        let min_time = dt == T::zero();
        Ok(Self {
            nx,
            nu,
            horizon,
            dt,
            x0,
            scheme: IntegrationScheme::Zoh,
            objective,
            dynamics,
            continuous: None,
            ineq_constraint: None,
            eq_constraint: None,
            terminal_constraint: None,
            x_min: DVector::from_element(nx, -inf),
            x_max: DVector::from_element(nx, inf),
            u_min: DVector::from_element(nu, -inf),
            u_max: DVector::from_element(nu, inf),
            goal_constraint: false,
            min_time,
            infeasible: false,
            m_bar: nu + usize::from(min_time),
            mm: nu + usize::from(min_time),
        })
    }

    /// Select the first-order-hold scheme.  The continuous model is
    /// required for derivative and midpoint bookkeeping.
    pub fn with_scheme(
        mut self,
        scheme: IntegrationScheme,
        continuous: Option<Box<dyn ContinuousDynamics<T>>>,
    ) -> Result<Self, ProblemError> {
        if scheme == IntegrationScheme::Foh && continuous.is_none() {
            return Err(ProblemError::MissingContinuousDynamics);
        }
        self.scheme = scheme;
        self.continuous = continuous;
        Ok(self)
    }

    /// Set state box bounds.
    pub fn with_state_bounds(
        mut self,
        x_min: DVector<T>,
        x_max: DVector<T>,
    ) -> Result<Self, ProblemError> {
        check_bounds("x_min", self.nx, &x_min, &x_max)?;
        self.x_min = x_min;
        self.x_max = x_max;
        Ok(self)
    }

    /// Set control box bounds over the nominal controls.
    pub fn with_control_bounds(
        mut self,
        u_min: DVector<T>,
        u_max: DVector<T>,
    ) -> Result<Self, ProblemError> {
        check_bounds("u_min", self.nu, &u_min, &u_max)?;
        self.u_min = u_min;
        self.u_max = u_max;
        Ok(self)
    }

    /// Attach a custom inequality constraint `cI(x, u) ≤ 0`.
    pub fn with_inequality_constraint(mut self, c: Box<dyn ConstraintFunction<T>>) -> Self {
        self.ineq_constraint = Some(c);
        self
    }

    /// Attach a custom equality constraint `cE(x, u) = 0`.
    pub fn with_equality_constraint(mut self, c: Box<dyn ConstraintFunction<T>>) -> Self {
        self.eq_constraint = Some(c);
        self
    }

    /// Enable the terminal goal equality constraint `x_N = xf`.
    pub fn with_goal_constraint(mut self, enable: bool) -> Self {
        self.goal_constraint = enable;
        self
    }

    /// Attach a custom terminal constraint (replaces the goal equality).
    pub fn with_terminal_constraint(mut self, c: Box<dyn TerminalConstraint<T>>) -> Self {
        self.terminal_constraint = Some(c);
        self.goal_constraint = true;
        self
    }

    // Fix the augmented control widths and the expanded control weight
    // from the solve options.  Called once at solver construction.
    pub(crate) fn configure(&mut self, settings: &DefaultSettings<T>) {
        self.infeasible = settings.infeasible;
        self.m_bar = self.nu + usize::from(self.min_time);
        self.mm = self.m_bar + if self.infeasible { self.nx } else { 0 };
        self.objective.expand_controls(
            self.m_bar,
            self.mm,
            settings.min_time_control_weight,
            settings.infeasible_control_weight,
        );
    }

    /// True if any constraint family is present.
    pub fn is_constrained(&self) -> bool {
        let inf = T::from_f64(get_infinity()).unwrap();
        let finite = |v: &DVector<T>| v.iter().any(|&b| b.abs() < inf);
        finite(&self.x_min)
            || finite(&self.x_max)
            || finite(&self.u_min)
            || finite(&self.u_max)
            || self.ineq_constraint.is_some()
            || self.eq_constraint.is_some()
            || self.goal_constraint
            || self.min_time
            || self.infeasible
    }

    pub fn is_min_time(&self) -> bool {
        self.min_time
    }

    /// Effective timestep at a knot: fixed, or the square of the local
    /// step variable under minimum time (squaring keeps the effective
    /// step nonnegative regardless of the sign of the free variable).
    pub fn local_dt(&self, u: &DVector<T>) -> T {
        if self.min_time {
            let h = u[self.m_bar - 1];
            h * h
        } else {
            self.dt
        }
    }

    /// View of the nominal control entries of an augmented control.
    pub(crate) fn nominal_u(&self, u: &DVector<T>) -> DVector<T> {
        u.rows(0, self.nu).into_owned()
    }

    /// Propagate one step of the augmented dynamics: nominal model step,
    /// plus the per-step infeasibility slack added directly to the next
    /// state when infeasible start is enabled.
    pub(crate) fn step_aug(
        &self,
        x: &DVector<T>,
        u: &DVector<T>,
        u_next: Option<&DVector<T>>,
    ) -> DVector<T> {
        let dt = self.local_dt(u);
        let un = self.nominal_u(u);
        let mut xn = match (self.scheme, u_next) {
            (IntegrationScheme::Foh, Some(v)) => {
                let vn = self.nominal_u(v);
                self.dynamics.step_foh(x, &un, &vn, dt)
            }
            _ => self.dynamics.step(x, &un, dt),
        };
        if self.infeasible {
            for i in 0..self.nx {
                xn[i] += u[self.m_bar + i];
            }
        }
        xn
    }

    /// Jacobians of the augmented zero-order-hold step with respect to
    /// the state and the full augmented control: the nominal model
    /// blocks, a central-difference column for the minimum-time step
    /// variable, and an identity block for the slack controls.
    pub(crate) fn augmented_jacobian(
        &self,
        x: &DVector<T>,
        u: &DVector<T>,
    ) -> (DMatrix<T>, DMatrix<T>) {
        let dt = self.local_dt(u);
        let un = self.nominal_u(u);
        let (fx, fu) = self.dynamics.jacobian(x, &un, dt);

        let mut bu = DMatrix::zeros(self.nx, self.mm);
        bu.view_mut((0, 0), (self.nx, self.nu)).copy_from(&fu);

        if self.min_time {
            // ∂x⁺/∂h at dt = h² by central difference
            let h = u[self.m_bar - 1];
            let eps = (1e-6).as_T();
            let dp = (h + eps) * (h + eps);
            let dm = (h - eps) * (h - eps);
            let xp = self.dynamics.step(x, &un, dp);
            let xm = self.dynamics.step(x, &un, dm);
            let two: T = (2.0).as_T();
            let scale = T::one() / (two * eps);
            for i in 0..self.nx {
                bu[(i, self.m_bar - 1)] = (xp[i] - xm[i]) * scale;
            }
        }

        if self.infeasible {
            for i in 0..self.nx {
                bu[(i, self.m_bar + i)] = T::one();
            }
        }

        (fx, bu)
    }
}

fn check_bounds<T: FloatT>(
    field: &'static str,
    dim: usize,
    lo: &DVector<T>,
    hi: &DVector<T>,
) -> Result<(), ProblemError> {
    if lo.len() != dim {
        return Err(ProblemError::DimensionMismatch {
            field,
            expected: dim,
            got: lo.len(),
        });
    }
    if hi.len() != dim {
        return Err(ProblemError::DimensionMismatch {
            field,
            expected: dim,
            got: hi.len(),
        });
    }
    for i in 0..dim {
        if lo[i] > hi[i] {
            return Err(ProblemError::InvertedBound(i));
        }
    }
    Ok(())
}
