#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use itertools::izip;
use nalgebra::DVector;

/// Per-knot Augmented Lagrangian tuple: constraint residuals, their
/// jacobian, multipliers, penalties and the activation mask.
///
/// Invariants maintained across a solve:
/// - inequality entries of `λ` are nonnegative after every dual update;
/// - entries of `μ` are nonnegative and non-decreasing across outer
///   iterations, bounded above by `penalty_max`;
/// - equality entries of `active` are always true;
/// - an inequality row is active iff its residual is at least the
///   activation tolerance or its multiplier is positive, so a positive
///   multiplier keeps a row active after its residual goes negative.
#[derive(Clone, Debug)]
pub struct KnotDuals<T: FloatT> {
    pub c: PartedVec<T>,
    pub jac: StageJacobian<T>,
    pub λ: PartedVec<T>,
    pub μ: PartedVec<T>,
    pub active: PartedMask,
}

impl<T: FloatT> KnotDuals<T> {
    fn new(layout: &ConstraintLayout<T>, penalty_initial: T) -> Self {
        Self {
            c: PartedVec::zeros(layout.p, layout.p_ineq),
            jac: StageJacobian::zeros(layout),
            λ: PartedVec::zeros(layout.p, layout.p_ineq),
            μ: PartedVec::from_element(layout.p, layout.p_ineq, penalty_initial),
            active: PartedMask::new(layout.p, layout.p_ineq),
        }
    }

    fn update_active_set(&mut self, tol: T) {
        let split = self.active.split();
        for (i, slot) in self.active.data.iter_mut().enumerate() {
            if i < split {
                *slot = self.c.data[i] >= tol || self.λ.data[i] > T::zero();
            } else {
                *slot = true;
            }
        }
    }

    /// Effective penalty weights `active ∘ μ`, the diagonal of the
    /// quadratic penalty term.
    pub fn effective_penalty(&self) -> DVector<T> {
        let mut w = DVector::zeros(self.μ.len());
        for (i, (&μ, &on)) in izip!(self.μ.data.iter(), self.active.data.iter()).enumerate() {
            if on {
                w[i] = μ;
            }
        }
        w
    }

    // λᵀc + ½ cᵀ diag(active ∘ μ) c
    fn penalty_cost(&self) -> T {
        let half: T = (0.5).as_T();
        let mut J = T::zero();
        for (&c, &λ, &μ, &on) in izip!(
            self.c.data.iter(),
            self.λ.data.iter(),
            self.μ.data.iter(),
            self.active.data.iter()
        ) {
            J += λ * c;
            if on {
                J += half * μ * c * c;
            }
        }
        J
    }

    fn violation(&self) -> T {
        self.c.equality().norm_inf().max(self.c.inequality().max_positive())
    }

    fn violation_penalized(&self) -> T {
        let split = self.c.split();
        let mut v = T::zero();
        for (i, (&c, &μ, &on)) in
            izip!(self.c.data.iter(), self.μ.data.iter(), self.active.data.iter()).enumerate()
        {
            if !on || μ <= T::zero() {
                continue;
            }
            let r = if i < split { c.max(T::zero()) } else { c.abs() };
            v = v.max(r);
        }
        v
    }
}

/// The shared per-knot Augmented Lagrangian state, exclusively owned by
/// one outer-loop instance per solve and passed by reference into
/// constraint evaluation, jacobian assembly and cost expansion.
pub struct AlState<T: FloatT> {
    pub(crate) stage_layout: ConstraintLayout<T>,
    pub(crate) terminal_layout: ConstraintLayout<T>,
    /// stage knots `k = 0..N-2`
    pub stages: Vec<KnotDuals<T>>,
    /// terminal knot, shorter layout
    pub terminal: KnotDuals<T>,
    /// residual snapshot taken after each outer iteration, retained for
    /// diagnostics and adaptive extensions
    pub(crate) c_prev: Vec<DVector<T>>,
}

impl<T: FloatT> AlState<T> {
    pub fn new(prob: &Problem<T>, penalty_initial: T) -> Self {
        let stage_layout = ConstraintLayout::stage(prob);
        let terminal_layout = ConstraintLayout::terminal(prob);

        let stages = (0..prob.horizon - 1)
            .map(|_| KnotDuals::new(&stage_layout, penalty_initial))
            .collect::<Vec<_>>();
        let terminal = KnotDuals::new(&terminal_layout, penalty_initial);
        let c_prev = (0..prob.horizon - 1)
            .map(|_| DVector::zeros(stage_layout.p))
            .chain(std::iter::once(DVector::zeros(terminal_layout.p)))
            .collect();

        Self {
            stage_layout,
            terminal_layout,
            stages,
            terminal,
            c_prev,
        }
    }

    /// Re-evaluate every constraint residual at the trajectory, then
    /// refresh the activation masks against the current multipliers.
    pub fn update_residuals(&mut self, prob: &Problem<T>, traj: &Trajectory<T>, tol: T) {
        let n_stages = self.stages.len();
        for (k, knot) in self.stages.iter_mut().enumerate() {
            // consistency row only couples interior steps
            let u_next = if k + 1 < n_stages {
                Some(&traj.u[k + 1])
            } else {
                None
            };
            self.stage_layout
                .evaluate(&mut knot.c, prob, &traj.x[k], &traj.u[k], u_next);
            knot.update_active_set(tol);
        }
        self.terminal_layout.evaluate_terminal(
            &mut self.terminal.c,
            prob,
            &traj.x[prob.horizon - 1],
        );
        self.terminal.update_active_set(tol);
    }

    /// Re-assemble every constraint jacobian at the trajectory.
    pub fn update_jacobians(
        &mut self,
        prob: &Problem<T>,
        traj: &Trajectory<T>,
        assembler: &JacobianAssembler<T>,
    ) {
        for (k, knot) in self.stages.iter_mut().enumerate() {
            assembler.assemble(&mut knot.jac, prob, &traj.x[k], &traj.u[k]);
        }
        assembler.assemble_terminal(&mut self.terminal.jac, prob, &traj.x[prob.horizon - 1]);
    }

    /// Recompute every activation mask from the current residuals and
    /// multipliers.  Must run after any multiplier update and before the
    /// masks feed a penalty term.
    pub fn update_active_set(&mut self, tol: T) {
        for knot in self.knots_mut() {
            knot.update_active_set(tol);
        }
    }

    /// Dual ascent: `λ ← clamp(λ + μ∘c, dual_min, dual_max)`, inequality
    /// entries projected to be nonnegative, then the activation masks
    /// recomputed against the *new* multipliers and *current* residuals.
    /// The ordering is load-bearing: recomputation must follow the dual
    /// update so that subsequent penalty masks are not stale.
    pub fn dual_update(&mut self, settings: &DefaultSettings<T>) {
        let (lo, hi) = (settings.dual_min, settings.dual_max);
        let tol = settings.active_set_tolerance;

        for knot in self.knots_mut() {
            let split = knot.λ.split();
            for (i, (λ, &μ, &c)) in
                izip!(knot.λ.data.iter_mut(), knot.μ.data.iter(), knot.c.data.iter()).enumerate()
            {
                let mut next = (*λ + μ * c).clamp(lo, hi);
                if i < split {
                    next = next.max(T::zero());
                }
                *λ = next;
            }
            knot.update_active_set(tol);
        }
    }

    /// Monotone penalty escalation:
    /// `μ ← clamp(penalty_scaling·μ, 0, penalty_max)`.  A fixed-ratio
    /// schedule, independent of the residual magnitude.
    pub fn penalty_update(&mut self, settings: &DefaultSettings<T>) {
        let scaling = settings.penalty_scaling;
        let cap = settings.penalty_max;

        for knot in self.knots_mut() {
            for μ in knot.μ.data.iter_mut() {
                *μ = (scaling * *μ).clamp(T::zero(), cap);
            }
        }
    }

    /// Residual snapshots from the end of the previous outer iteration.
    pub fn previous_residuals(&self) -> &[DVector<T>] {
        &self.c_prev
    }

    /// Snapshot the residuals for diagnostics.
    pub fn snapshot(&mut self) {
        let n_stages = self.stages.len();
        for (k, knot) in self.stages.iter().enumerate() {
            self.c_prev[k].copy_from(&knot.c.data);
        }
        self.c_prev[n_stages].copy_from(&self.terminal.c.data);
    }

    /// Canonical maximum constraint violation across every knot
    /// including the terminal: infinity norm of the equality block and
    /// positive part of the inequality block, activation-independent.
    pub fn max_violation(&self) -> T {
        self.knots().fold(T::zero(), |v, knot| v.max(knot.violation()))
    }

    /// Diagnostic variant masking rows by current penalty activation
    /// (`Iμ > 0`).  Can disagree with [`max_violation`](Self::max_violation)
    /// near activation boundaries.
    pub fn max_violation_penalized(&self) -> T {
        self.knots()
            .fold(T::zero(), |v, knot| v.max(knot.violation_penalized()))
    }

    /// AL penalty cost: interior knot sum normalized by the stage count
    /// before the terminal term is added.
    pub fn penalty_cost(&self) -> T {
        let n_stages = (self.stages.len()).as_T();
        let interior = self
            .stages
            .iter()
            .fold(T::zero(), |J, knot| J + knot.penalty_cost());
        interior / n_stages + self.terminal.penalty_cost()
    }

    pub(crate) fn knots(&self) -> impl Iterator<Item = &KnotDuals<T>> {
        self.stages.iter().chain(std::iter::once(&self.terminal))
    }

    pub(crate) fn knots_mut(&mut self) -> impl Iterator<Item = &mut KnotDuals<T>> {
        self.stages
            .iter_mut()
            .chain(std::iter::once(&mut self.terminal))
    }
}
