#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::traits::InnerSolver;
use crate::solver::core::{InnerSummary, InnerTolerances, SolveError};

/// Reference inner solver: iLQR with a regularized backward Riccati
/// recursion and a backtracking line search through the closed-loop
/// rollout.
///
/// Consumes the cost model through the [`TrajectoryCost`] contract, so
/// constraint penalties fold into its quadratic model without the
/// solver branching on constrainedness.  Supports zero-order hold; a
/// first-order-hold backward pass may be supplied by an external
/// [`InnerSolver`] implementation.
pub struct IlqrSolver<T: FloatT> {
    gains: Gains<T>,
    reg: Regularization<T>,
    traj_new: Trajectory<T>,
    iterations: u32,
}

enum BackwardOutcome {
    Done,
    NotPositiveDefinite,
}

impl<T: FloatT> IlqrSolver<T> {
    pub fn new(prob: &Problem<T>) -> Self {
        Self {
            gains: Gains::zeros(prob),
            reg: Regularization::new(),
            traj_new: Trajectory::zeros(prob),
            iterations: 0,
        }
    }

    // One sweep of the backward Riccati recursion.  Fails out as soon
    // as a regularized control hessian loses positive definiteness, so
    // the caller can escalate the damping and retry.
    fn backward_pass(
        &mut self,
        prob: &Problem<T>,
        cost: &CostModel<T>,
        traj: &Trajectory<T>,
    ) -> BackwardOutcome {
        let N = prob.horizon;
        let (n, mm) = (prob.nx, prob.mm);
        let obj = &prob.objective;
        let half: T = (0.5).as_T();

        // terminal cost-to-go, constraint terms folded in additively
        let mut term = TerminalExpansion::zeros(n);
        let δx = &traj.x[N - 1] - &obj.xf;
        term.xx += &obj.Qf;
        term.x += &obj.Qf * &δx;
        cost.add_terminal_expansion(&mut term);

        let mut s_mat = term.xx;
        let mut s_vec = term.x;

        for k in (0..N - 1).rev() {
            let dt = prob.local_dt(&traj.u[k]);
            let (fx, bu) = prob.augmented_jacobian(&traj.x[k], &traj.u[k]);

            // timestep-weighted unconstrained expansion ...
            let mut e = StageExpansion::zeros(n, mm);
            let δx = &traj.x[k] - &obj.xf;
            e.xx = &obj.Q * dt;
            e.uu = &obj.R_aug * dt;
            e.x = (&obj.Q * &δx) * dt;
            e.u = (&obj.R_aug * &traj.u[k]) * dt;
            // ... plus the additive constraint penalty expansion
            cost.add_stage_expansion(k, &mut e);

            let qx = &e.x + fx.transpose() * &s_vec;
            let qu = &e.u + bu.transpose() * &s_vec;
            let qxx = &e.xx + fx.transpose() * &s_mat * &fx;
            let quu = &e.uu + bu.transpose() * &s_mat * &bu;
            let qux = &e.ux + bu.transpose() * &s_mat * &fx;

            let mut quu_reg = quu.clone();
            for i in 0..mm {
                quu_reg[(i, i)] += self.reg.ρ;
            }
            let Some(chol) = quu_reg.cholesky() else {
                return BackwardOutcome::NotPositiveDefinite;
            };

            let kk = chol.solve(&qux);
            let dd = chol.solve(&qu);

            // cost-to-go under  u = ū − K·δx − α·d
            s_mat = &qxx + kk.transpose() * &quu * &kk
                - kk.transpose() * &qux
                - qux.transpose() * &kk;
            s_mat = (&s_mat + &s_mat.transpose()) * half;
            s_vec = qx + kk.transpose() * &quu * &dd - kk.transpose() * &qu - qux.transpose() * &dd;

            self.gains.k_fb[k] = kk;
            self.gains.d[k] = dd;
        }

        BackwardOutcome::Done
    }

    // Normalized feedforward magnitude, the usual iLQR gradient proxy.
    fn gradient(&self, traj: &Trajectory<T>) -> T {
        let mut g = T::zero();
        for (d, u) in self.gains.d.iter().zip(traj.u.iter()) {
            let num = d.as_slice().norm_inf();
            let den = u.as_slice().norm_inf() + T::one();
            g = g.max(num / den);
        }
        g
    }
}

impl<T: FloatT> InnerSolver<T> for IlqrSolver<T> {
    type P = Problem<T>;
    type C = CostModel<T>;
    type TR = Trajectory<T>;
    type SE = DefaultSettings<T>;

    fn solve(
        &mut self,
        prob: &Problem<T>,
        cost: &mut CostModel<T>,
        traj: &mut Trajectory<T>,
        tols: &InnerTolerances<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<InnerSummary<T>, SolveError> {
        if prob.scheme == IntegrationScheme::Foh {
            return Err(SolveError::UnsupportedScheme);
        }

        cost.update(prob, traj);
        let mut J = cost.cost(prob, traj);
        if !J.is_finite() {
            return Err(SolveError::NonFiniteCost);
        }

        let half: T = (0.5).as_T();
        let mut grad = T::from_f64(f64::INFINITY).unwrap();
        let mut iters: u32 = 0;

        for _ in 0..settings.max_inner_iter {
            cost.update_jacobians(prob, traj);

            // backward pass, escalating regularization until the model
            // is positive definite
            loop {
                match self.backward_pass(prob, cost, traj) {
                    BackwardOutcome::Done => break,
                    BackwardOutcome::NotPositiveDefinite => {
                        self.reg
                            .increase(settings.regularization_factor, settings.regularization_min);
                        if self.reg.ρ > settings.regularization_max {
                            return Err(SolveError::RegularizationLimit);
                        }
                    }
                }
            }

            // a small feedforward means the current trajectory already
            // minimizes the quadratic model
            grad = self.gradient(traj);
            if grad < tols.gradient_tolerance {
                iters += 1;
                break;
            }

            // forward pass: backtrack the step size through the
            // closed-loop rollout until the cost decreases
            let mut α = T::one();
            let mut dJ = T::zero();
            let mut accepted = false;
            for _ in 0..settings.max_linesearch_iter {
                let ok =
                    rollout_closed_loop(prob, traj, &self.gains, α, &mut self.traj_new, settings);
                if ok {
                    cost.update(prob, &self.traj_new);
                    let J_new = cost.cost(prob, &self.traj_new);
                    if J_new.is_finite() && J_new < J {
                        traj.copy_from(&self.traj_new);
                        dJ = J - J_new;
                        J = J_new;
                        accepted = true;
                        break;
                    }
                }
                α *= half;
            }

            iters += 1;

            if accepted {
                self.reg
                    .decrease(settings.regularization_factor, settings.regularization_min);
                if dJ < tols.cost_tolerance {
                    break;
                }
            } else {
                // no productive step at any size; damp harder or stop
                self.reg
                    .increase(settings.regularization_factor, settings.regularization_min);
                if self.reg.ρ > settings.regularization_max {
                    break;
                }
            }
        }

        // leave the constraint state current at the returned trajectory
        cost.update(prob, traj);
        self.iterations = iters;

        Ok(InnerSummary {
            cost: J,
            iterations: iters,
            gradient: grad,
        })
    }

    fn reset(&mut self) {
        self.gains.set_zero();
        self.reg.reset();
        self.iterations = 0;
    }

    fn iterations(&self) -> u32 {
        self.iterations
    }
}
