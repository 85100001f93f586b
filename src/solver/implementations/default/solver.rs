#![allow(non_snake_case)]

use self::internal::*;
use super::*;
use crate::algebra::*;
use crate::solver::core::traits::InnerSolver;
use crate::solver::core::{InnerSummary, InnerTolerances, SolverStatus};
use nalgebra::DVector;
use std::time::Instant;

/// Boxed inner solver operating on the default types.
pub type BoxedInnerSolver<T> = Box<
    dyn InnerSolver<
        T,
        P = Problem<T>,
        C = CostModel<T>,
        TR = Trajectory<T>,
        SE = DefaultSettings<T>,
    >,
>;

// ---------------------------------
// top level solver container type
// ---------------------------------

/// Augmented Lagrangian trajectory optimization solver.
///
/// Wraps an inner unconstrained solver in a dual-ascent/penalty outer
/// loop.  Constraint residuals, multipliers, penalties and activation
/// masks live in the cost model and are exclusively owned by this
/// instance for the duration of a solve; concurrent solves over the
/// same problem must use independent instances.
pub struct DefaultSolver<T: FloatT> {
    pub prob: Problem<T>,
    pub traj: Trajectory<T>,
    pub cost: CostModel<T>,
    pub inner: BoxedInnerSolver<T>,
    pub info: DefaultInfo<T>,
    pub solution: DefaultSolution<T>,
    pub settings: DefaultSettings<T>,
}

fn _print_banner(is_verbose: bool) {
    if !is_verbose {
        return;
    }

    println!("-------------------------------------------------------------");
    println!(
        "         trajopt v{}  -  AL-iLQR trajectory optimizer",
        crate::VERSION
    );
    println!("-------------------------------------------------------------");
}

impl<T: FloatT> DefaultSolver<T> {
    /// Create a solver for a problem with the given settings.  The
    /// augmented control width and the constraint layout are fixed
    /// here, once.
    pub fn new(mut prob: Problem<T>, settings: DefaultSettings<T>) -> Self {
        prob.configure(&settings);

        let mut traj = Trajectory::zeros(&prob);
        if prob.is_min_time() {
            // a zero step variable has no gradient through dt = h²,
            // so seed every local step from the settings guess
            let h = settings.min_time_step_initial.sqrt();
            for u in traj.u.iter_mut() {
                u[prob.m_bar - 1] = h;
            }
        }
        let cost = if prob.is_constrained() {
            CostModel::AugmentedLagrangian(AugLagCost::new(&prob, &settings))
        } else {
            CostModel::Unconstrained(UnconstrainedCost::new())
        };
        let inner = Box::new(IlqrSolver::new(&prob));

        Self {
            prob,
            traj,
            cost,
            inner,
            info: DefaultInfo::new(),
            solution: DefaultSolution::new(),
            settings,
        }
    }

    /// Seed the nominal control trajectory.
    pub fn set_initial_controls(&mut self, u0: &[DVector<T>]) -> Result<(), ProblemError> {
        let nc = self.traj.u.len();
        if u0.len() != nc {
            return Err(ProblemError::DimensionMismatch {
                field: "u0",
                expected: nc,
                got: u0.len(),
            });
        }
        for (dst, src) in self.traj.u.iter_mut().zip(u0.iter()) {
            if src.len() != self.prob.nu {
                return Err(ProblemError::DimensionMismatch {
                    field: "u0",
                    expected: self.prob.nu,
                    got: src.len(),
                });
            }
            for j in 0..self.prob.nu {
                dst[j] = src[j];
            }
        }
        Ok(())
    }

    /// Seed a reference state trajectory for an infeasible start.
    /// Synthesizes the slack controls that make the reference
    /// dynamically exact (see [`infeasible_controls`]).
    pub fn set_initial_state_trajectory(
        &mut self,
        x0: &[DVector<T>],
    ) -> Result<(), ProblemError> {
        if !self.prob.infeasible {
            return Err(ProblemError::InfeasibleStartDisabled);
        }
        if x0.len() != self.prob.horizon {
            return Err(ProblemError::DimensionMismatch {
                field: "x0_trajectory",
                expected: self.prob.horizon,
                got: x0.len(),
            });
        }

        let u_aug = infeasible_controls(&self.prob, x0, &self.traj.u);
        self.traj.u = u_aug;
        for (dst, src) in self.traj.x.iter_mut().zip(x0.iter()) {
            dst.copy_from(src);
        }
        Ok(())
    }
}

// ---------------------------------
// ALSolver trait and its standard implementation.
// ---------------------------------

/// An Augmented Lagrangian solver implementing dual ascent with
/// monotone penalty escalation.

// Only the main solve function lives in ALSolver, since this is the
// only publicly facing trait we want to give the solver.  Additional
// internal functionality is implemented for the ALSolverInternals
// trait below, upon which ALSolver depends.

pub trait ALSolver<T: FloatT> {
    /// Run the solver.
    fn solve(&mut self);
}

impl<T: FloatT> ALSolver<T> for DefaultSolver<T> {
    fn solve(&mut self) {
        let start = Instant::now();

        _print_banner(self.settings.verbose);
        self.info
            .print_configuration(&self.settings, &self.prob, self.prob.is_constrained());

        self.info.reset();

        // ----------
        // Init: make the seeded trajectory dynamically consistent
        // ----------
        if !rollout(&self.prob, &mut self.traj, &self.settings) {
            self.info.status = SolverStatus::NumericalError;
            self.finish(start);
            return;
        }

        // an unconstrained problem skips the outer loop entirely and
        // runs the inner solver once at the final tolerances
        if matches!(self.cost, CostModel::Unconstrained(_)) {
            self.solve_unconstrained();
            self.finish(start);
            return;
        }

        self.info.print_status_header(&self.settings);

        // ----------
        // main loop: InnerSolve -> DualUpdate -> PenaltyUpdate
        // ----------
        for outer in 1..=self.settings.max_outer_iter {
            let tols = self.tolerances_for(outer);

            // inner solve on the augmented problem
            let summary = match self.inner.solve(
                &self.prob,
                &mut self.cost,
                &mut self.traj,
                &tols,
                &self.settings,
            ) {
                Ok(summary) => summary,
                Err(_) => {
                    self.info.status = SolverStatus::NumericalError;
                    break;
                }
            };
            self.inner.reset();

            // dual ascent, then penalty escalation.  The phases have a
            // strict data dependency and must run in this order.
            let viol = {
                let al = match &mut self.cost {
                    CostModel::AugmentedLagrangian(al) => al,
                    CostModel::Unconstrained(_) => unreachable!(),
                };
                al.state.dual_update(&self.settings);
                al.state.penalty_update(&self.settings);
                al.state.snapshot();
                al.state.max_violation()
            };

            self.info.record_iteration(summary, viol);
            self.info.print_status(&self.settings);

            // convergence test against the most recent recorded
            // violation
            if viol < self.settings.constraint_tolerance {
                self.info.status = SolverStatus::Solved;
                break;
            }
        }

        if self.info.status == SolverStatus::Unsolved {
            self.info.status = SolverStatus::MaxIterations;
        }

        self.finish(start);
    }
}

// Encapsulate the internal helpers trait in a private module
// so it doesn't get exported
mod internal {
    use super::*;

    pub(super) trait ALSolverInternals<T: FloatT> {
        /// Intermediate tolerances on all but the last permitted outer
        /// iteration, final tolerances on the last.
        fn tolerances_for(&self, outer: u32) -> InnerTolerances<T>;

        /// Single direct inner solve for unconstrained problems.
        fn solve_unconstrained(&mut self);

        /// Store the final solution, timing and footer.
        fn finish(&mut self, start: Instant);
    }

    impl<T: FloatT> ALSolverInternals<T> for DefaultSolver<T> {
        fn tolerances_for(&self, outer: u32) -> InnerTolerances<T> {
            if outer == self.settings.max_outer_iter {
                InnerTolerances {
                    cost_tolerance: self.settings.cost_tolerance,
                    gradient_tolerance: self.settings.gradient_tolerance,
                }
            } else {
                InnerTolerances {
                    cost_tolerance: self.settings.cost_tolerance_intermediate,
                    gradient_tolerance: self.settings.gradient_tolerance_intermediate,
                }
            }
        }

        fn solve_unconstrained(&mut self) {
            let tols = InnerTolerances {
                cost_tolerance: self.settings.cost_tolerance,
                gradient_tolerance: self.settings.gradient_tolerance,
            };
            match self.inner.solve(
                &self.prob,
                &mut self.cost,
                &mut self.traj,
                &tols,
                &self.settings,
            ) {
                Ok(summary) => {
                    self.info.record_iteration(summary, T::zero());
                    self.info.status = SolverStatus::Solved;
                }
                Err(_) => {
                    let summary = InnerSummary {
                        cost: self.cost.cost(&self.prob, &self.traj),
                        iterations: self.inner.iterations(),
                        gradient: T::zero(),
                    };
                    self.info.record_iteration(summary, T::zero());
                    self.info.status = SolverStatus::NumericalError;
                }
            }
            self.inner.reset();
        }

        fn finish(&mut self, start: Instant) {
            self.info.finalize(start.elapsed().as_secs_f64());

            // report the true objective, without penalty terms
            let obj_val = self.prob.objective.trajectory_cost(&self.prob, &self.traj);
            let viol = self.cost.max_violation();
            self.solution
                .finalize(&self.prob, &self.traj, &self.info, obj_val, viol);

            self.info.print_footer(&self.settings);
        }
    }
}
