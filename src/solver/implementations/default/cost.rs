#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use enum_dispatch::*;
use nalgebra::{DMatrix, DVector};
use std::marker::PhantomData;

// -------------------------------------
// expansion buffers
// -------------------------------------

/// Second-order stage cost model consumed by the inner solver's
/// backward pass.
#[derive(Clone, Debug)]
pub struct StageExpansion<T: FloatT> {
    pub xx: DMatrix<T>,
    pub uu: DMatrix<T>,
    pub ux: DMatrix<T>,
    pub x: DVector<T>,
    pub u: DVector<T>,
}

impl<T: FloatT> StageExpansion<T> {
    pub fn zeros(nx: usize, mm: usize) -> Self {
        Self {
            xx: DMatrix::zeros(nx, nx),
            uu: DMatrix::zeros(mm, mm),
            ux: DMatrix::zeros(mm, nx),
            x: DVector::zeros(nx),
            u: DVector::zeros(mm),
        }
    }

    pub fn set_zero(&mut self) {
        self.xx.fill(T::zero());
        self.uu.fill(T::zero());
        self.ux.fill(T::zero());
        self.x.fill(T::zero());
        self.u.fill(T::zero());
    }
}

/// Second-order terminal cost model (state blocks only).
#[derive(Clone, Debug)]
pub struct TerminalExpansion<T: FloatT> {
    pub xx: DMatrix<T>,
    pub x: DVector<T>,
}

impl<T: FloatT> TerminalExpansion<T> {
    pub fn zeros(nx: usize) -> Self {
        Self {
            xx: DMatrix::zeros(nx, nx),
            x: DVector::zeros(nx),
        }
    }

    pub fn set_zero(&mut self) {
        self.xx.fill(T::zero());
        self.x.fill(T::zero());
    }
}

// -------------------------------------
// cost model dispatch
// -------------------------------------

/// Cost model presented to the inner solver.
///
/// `update` must be called whenever the trajectory changes before
/// `cost` is read; `update_jacobians` refreshes the derivative blocks
/// before an expansion pass.  The expansion hooks are strictly
/// additive: they contribute onto whatever unconstrained quadratic
/// expansion the caller has already accumulated and never overwrite
/// existing entries.
#[enum_dispatch]
pub trait TrajectoryCost<T: FloatT> {
    /// Refresh internal constraint residual state at the trajectory.
    fn update(&mut self, prob: &Problem<T>, traj: &Trajectory<T>);

    /// Refresh internal constraint jacobian state at the trajectory.
    fn update_jacobians(&mut self, prob: &Problem<T>, traj: &Trajectory<T>);

    /// Total cost at the trajectory (unconstrained plus penalties).
    fn cost(&self, prob: &Problem<T>, traj: &Trajectory<T>) -> T;

    /// Add the stage-`k` constraint penalty expansion onto `exp`.
    fn add_stage_expansion(&self, k: usize, exp: &mut StageExpansion<T>);

    /// Add the terminal constraint penalty expansion onto `exp`.
    fn add_terminal_expansion(&self, exp: &mut TerminalExpansion<T>);

    /// Canonical maximum constraint violation (activation-independent).
    fn max_violation(&self) -> T;

    /// Diagnostic violation masked by current penalty activation.
    fn max_violation_penalized(&self) -> T;
}

/// The two problem variants, fixed once at solver construction: the
/// unconstrained arm carries no-op constraint and expansion hooks, so
/// the inner solver never branches on constrainedness.
#[enum_dispatch(TrajectoryCost<T>)]
pub enum CostModel<T: FloatT> {
    Unconstrained(UnconstrainedCost<T>),
    AugmentedLagrangian(AugLagCost<T>),
}

// -------------------------------------
// unconstrained variant
// -------------------------------------

/// No-op constraint implementation for unconstrained problems.
pub struct UnconstrainedCost<T: FloatT> {
    _marker: PhantomData<T>,
}

impl<T: FloatT> UnconstrainedCost<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: FloatT> Default for UnconstrainedCost<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatT> TrajectoryCost<T> for UnconstrainedCost<T> {
    fn update(&mut self, _prob: &Problem<T>, _traj: &Trajectory<T>) {}
    fn update_jacobians(&mut self, _prob: &Problem<T>, _traj: &Trajectory<T>) {}

    fn cost(&self, prob: &Problem<T>, traj: &Trajectory<T>) -> T {
        prob.objective.trajectory_cost(prob, traj)
    }

    fn add_stage_expansion(&self, _k: usize, _exp: &mut StageExpansion<T>) {}
    fn add_terminal_expansion(&self, _exp: &mut TerminalExpansion<T>) {}

    fn max_violation(&self) -> T {
        T::zero()
    }
    fn max_violation_penalized(&self) -> T {
        T::zero()
    }
}

// -------------------------------------
// augmented Lagrangian variant
// -------------------------------------

/// Augmented Lagrangian cost: the unconstrained objective plus, per
/// knot, `λᵀc + ½cᵀ·diag(active∘μ)·c`, with the interior sum normalized
/// by the stage count before the terminal term is added.
pub struct AugLagCost<T: FloatT> {
    pub state: AlState<T>,
    assembler: JacobianAssembler<T>,
    active_tol: T,
}

impl<T: FloatT> AugLagCost<T> {
    pub fn new(prob: &Problem<T>, settings: &DefaultSettings<T>) -> Self {
        let state = AlState::new(prob, settings.penalty_initial);
        let assembler = JacobianAssembler::new(
            state.stage_layout.clone(),
            Box::new(FiniteDiff::new()),
        );
        Self {
            state,
            assembler,
            active_tol: settings.active_set_tolerance,
        }
    }

    // scatter one knot's penalty expansion onto the caller's buffers
    fn knot_expansion(
        knot: &KnotDuals<T>,
        xx: &mut DMatrix<T>,
        uu: Option<&mut DMatrix<T>>,
        ux: Option<&mut DMatrix<T>>,
        gx: &mut DVector<T>,
        gu: Option<&mut DVector<T>>,
    ) {
        let p = knot.c.len();
        if p == 0 {
            return;
        }

        // w = active ∘ μ,  g = w∘c + λ
        let mut w = DVector::zeros(p);
        let mut g = DVector::zeros(p);
        for i in 0..p {
            if knot.active.data[i] {
                w[i] = knot.μ.data[i];
            }
            g[i] = w[i] * knot.c.data[i] + knot.λ.data[i];
        }

        // row-scaled jacobians:  diag(w)·Cx, diag(w)·Cu
        let mut wcx = knot.jac.cx.clone();
        for i in 0..p {
            let wi = w[i];
            for j in 0..wcx.ncols() {
                wcx[(i, j)] *= wi;
            }
        }

        *xx += wcx.transpose() * &knot.jac.cx;
        *gx += knot.jac.cx.transpose() * &g;

        if let Some(uu) = uu {
            let mut wcu = knot.jac.cu.clone();
            for i in 0..p {
                let wi = w[i];
                for j in 0..wcu.ncols() {
                    wcu[(i, j)] *= wi;
                }
            }
            *uu += wcu.transpose() * &knot.jac.cu;
            if let Some(ux) = ux {
                *ux += wcu.transpose() * &knot.jac.cx;
            }
            if let Some(gu) = gu {
                *gu += knot.jac.cu.transpose() * &g;
            }
        }
    }
}

impl<T: FloatT> TrajectoryCost<T> for AugLagCost<T> {
    fn update(&mut self, prob: &Problem<T>, traj: &Trajectory<T>) {
        self.state.update_residuals(prob, traj, self.active_tol);
    }

    fn update_jacobians(&mut self, prob: &Problem<T>, traj: &Trajectory<T>) {
        self.state.update_jacobians(prob, traj, &self.assembler);
    }

    fn cost(&self, prob: &Problem<T>, traj: &Trajectory<T>) -> T {
        prob.objective.trajectory_cost(prob, traj) + self.state.penalty_cost()
    }

    fn add_stage_expansion(&self, k: usize, exp: &mut StageExpansion<T>) {
        Self::knot_expansion(
            &self.state.stages[k],
            &mut exp.xx,
            Some(&mut exp.uu),
            Some(&mut exp.ux),
            &mut exp.x,
            Some(&mut exp.u),
        );
    }

    fn add_terminal_expansion(&self, exp: &mut TerminalExpansion<T>) {
        Self::knot_expansion(&self.state.terminal, &mut exp.xx, None, None, &mut exp.x, None);
    }

    fn max_violation(&self) -> T {
        self.state.max_violation()
    }

    fn max_violation_penalized(&self) -> T {
        self.state.max_violation_penalized()
    }
}
