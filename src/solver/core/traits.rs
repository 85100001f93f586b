//! Boundary contracts for collaborators of the Augmented Lagrangian core.
//!
//! This module defines the traits through which the outer loop talks to
//! its external collaborators: the dynamics model (continuous and
//! discrete), user constraint functions, the differentiation service used
//! to produce constraint and dynamics jacobians, and the inner
//! unconstrained solver.
//!
//! The crate ships a [default implementation](crate::solver::implementations::default)
//! of every contract; users supply their own dynamics and constraint
//! functions and may substitute any inner solver honouring
//! [`InnerSolver`].

use crate::algebra::FloatT;
use crate::solver::core::{InnerSummary, InnerTolerances, SolveError};
use nalgebra::{DMatrix, DVector};

/// Continuous-time dynamics `ẋ = f(x, u)` with jacobian provider.
///
/// Required when the problem uses first-order-hold integration, where
/// state derivatives and interval midpoints enter the cost quadrature.
pub trait ContinuousDynamics<T: FloatT> {
    fn state_dim(&self) -> usize;
    fn control_dim(&self) -> usize;

    /// Evaluate `ẋ = f(x, u)`.
    fn dynamics(&self, x: &DVector<T>, u: &DVector<T>) -> DVector<T>;

    /// Jacobians `(∂f/∂x, ∂f/∂u)`.
    fn jacobian(&self, x: &DVector<T>, u: &DVector<T>) -> (DMatrix<T>, DMatrix<T>);
}

/// Discrete-time dynamics `x⁺ = f(x, u, dt)` with jacobian provider.
pub trait DiscreteDynamics<T: FloatT> {
    fn state_dim(&self) -> usize;
    fn control_dim(&self) -> usize;

    /// Propagate one step with the control held constant over the interval.
    fn step(&self, x: &DVector<T>, u: &DVector<T>, dt: T) -> DVector<T>;

    /// Propagate one step with the control varying linearly from `u` to
    /// `u_next` over the interval.  Models that do not distinguish the
    /// endpoint controls may rely on the zero-order-hold default.
    fn step_foh(&self, x: &DVector<T>, u: &DVector<T>, _u_next: &DVector<T>, dt: T) -> DVector<T> {
        self.step(x, u, dt)
    }

    /// Jacobians `(∂x⁺/∂x, ∂x⁺/∂u)` of the zero-order-hold step.
    fn jacobian(&self, x: &DVector<T>, u: &DVector<T>, dt: T) -> (DMatrix<T>, DMatrix<T>);

    /// Jacobians `(∂x⁺/∂x, ∂x⁺/∂u, ∂x⁺/∂u_next)` of the first-order-hold
    /// step.  The default ties the trailing block to zero.
    fn jacobian_foh(
        &self,
        x: &DVector<T>,
        u: &DVector<T>,
        _u_next: &DVector<T>,
        dt: T,
    ) -> (DMatrix<T>, DMatrix<T>, DMatrix<T>) {
        let (fx, fu) = self.jacobian(x, u, dt);
        let bv = DMatrix::zeros(self.state_dim(), self.control_dim());
        (fx, fu, bv)
    }
}

/// A vector-valued stage constraint function `c(x, u)`.
///
/// Inequality functions are satisfied when `c(x, u) ≤ 0`; equality
/// functions when `c(x, u) = 0`.  Jacobians are produced externally by a
/// [`Differentiator`] over the concatenated `[x; u]` vector.
pub trait ConstraintFunction<T: FloatT> {
    /// Number of rows this function contributes to the stage layout.
    fn dim(&self) -> usize;

    /// Evaluate into caller-owned storage of length `dim()`.
    fn evaluate(&self, out: &mut [T], x: &DVector<T>, u: &DVector<T>);
}

/// A terminal constraint `c_N(x) = 0` with a caller-supplied jacobian.
///
/// The default terminal constraint (goal-state equality `x − xf`) is
/// built in with its identity jacobian; a custom terminal constraint
/// must bring its own jacobian since it is not auto-derived.
pub trait TerminalConstraint<T: FloatT> {
    fn dim(&self) -> usize;
    fn evaluate(&self, out: &mut [T], x: &DVector<T>);
    fn jacobian(&self, out: &mut DMatrix<T>, x: &DVector<T>);
}

/// A jacobian-producing differentiation service.
///
/// Any engine returning exact-to-tolerance jacobians for smooth
/// functions satisfies this contract: dual numbers, finite differences,
/// or closed-form derivatives alike.
pub trait Differentiator<T: FloatT> {
    /// Write the jacobian of `f` at `x` into `out` (`f(x).len() × x.len()`).
    fn jacobian(&self, f: &dyn Fn(&DVector<T>) -> DVector<T>, x: &DVector<T>, out: &mut DMatrix<T>);
}

/// The inner unconstrained trajectory solver.
///
/// The outer loop hands the inner solver an augmented cost model and the
/// current trajectory; the inner solver owns the trajectory for the
/// duration of its own iterations and returns it (and the achieved cost)
/// when done.  It must leave the cost model's constraint state current
/// at the returned trajectory.
pub trait InnerSolver<T: FloatT> {
    /// Problem description type.
    type P;
    /// Cost model type (augmentable via the cost-expansion contract).
    type C;
    /// Trajectory type.
    type TR;
    /// Settings type.
    type SE;

    /// Minimize the cost over the trajectory in place.
    fn solve(
        &mut self,
        prob: &Self::P,
        cost: &mut Self::C,
        traj: &mut Self::TR,
        tols: &InnerTolerances<T>,
        settings: &Self::SE,
    ) -> Result<InnerSummary<T>, SolveError>;

    /// Clear warm-start state for reuse between outer iterations.
    fn reset(&mut self);

    /// Iteration count of the most recent solve.
    fn iterations(&self) -> u32;
}
