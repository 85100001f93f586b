#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use nalgebra::{DMatrix, DVector};

/// Quadratic trajectory objective
///
/// `J = Σ dtₖ·( ½(xₖ−xf)ᵀQ(xₖ−xf) + ½uₖᵀR̄uₖ ) + ½(x_N−xf)ᵀQf(x_N−xf)`
///
/// For first-order hold the per-interval contribution is integrated with
/// a Simpson rule over (start, midpoint, end), with the midpoint control
/// taken as the mean of the interval endpoints' controls.
///
/// `R̄` is the expanded control weight covering the augmented control
/// width: the nominal block is `R`, the minimum-time entry and the
/// infeasible slack block carry settings-controlled diagonal weights so
/// that the inner solver's control hessian stays well conditioned before
/// constraint penalties activate.
#[derive(Clone, Debug)]
pub struct QuadraticObjective<T: FloatT> {
    /// running state weight
    pub Q: DMatrix<T>,
    /// running control weight (nominal controls)
    pub R: DMatrix<T>,
    /// terminal state weight
    pub Qf: DMatrix<T>,
    /// goal state
    pub xf: DVector<T>,
    /// expanded control weight over the augmented width
    pub(crate) R_aug: DMatrix<T>,
}

impl<T: FloatT> QuadraticObjective<T> {
    pub fn new(
        Q: DMatrix<T>,
        R: DMatrix<T>,
        Qf: DMatrix<T>,
        xf: DVector<T>,
    ) -> Result<Self, ProblemError> {
        let n = xf.len();
        for (name, mat) in [("Q", &Q), ("Qf", &Qf)] {
            if mat.nrows() != n || mat.ncols() != n {
                return Err(ProblemError::DimensionMismatch {
                    field: name,
                    expected: n,
                    got: mat.nrows(),
                });
            }
        }
        if R.nrows() != R.ncols() {
            return Err(ProblemError::DimensionMismatch {
                field: "R",
                expected: R.nrows(),
                got: R.ncols(),
            });
        }
        let R_aug = R.clone();
        Ok(Self { Q, R, Qf, xf, R_aug })
    }

    /// Number of nominal controls.
    pub fn control_dim(&self) -> usize {
        self.R.nrows()
    }

    // Build R̄ once the augmented control width is known.
    pub(crate) fn expand_controls(&mut self, m_bar: usize, mm: usize, w_time: T, w_slack: T) {
        let m = self.R.nrows();
        let mut R_aug = DMatrix::zeros(mm, mm);
        R_aug.view_mut((0, 0), (m, m)).copy_from(&self.R);
        for i in m..m_bar {
            R_aug[(i, i)] = w_time;
        }
        for i in m_bar..mm {
            R_aug[(i, i)] = w_slack;
        }
        self.R_aug = R_aug;
    }

    /// Instantaneous stage cost `½δxᵀQδx + ½uᵀR̄u` (no timestep weighting).
    pub fn stage_cost(&self, x: &DVector<T>, u: &DVector<T>) -> T {
        let half: T = (0.5).as_T();
        let δx = x - &self.xf;
        half * (&self.Q * &δx).dot(&δx) + half * (&self.R_aug * u).dot(u)
    }

    /// Terminal cost `½(x−xf)ᵀQf(x−xf)`.
    pub fn terminal_cost(&self, x: &DVector<T>) -> T {
        let half: T = (0.5).as_T();
        let δx = x - &self.xf;
        half * (&self.Qf * &δx).dot(&δx)
    }

    /// Total unconstrained trajectory cost under the problem's
    /// integration scheme.
    pub fn trajectory_cost(&self, prob: &Problem<T>, traj: &Trajectory<T>) -> T {
        let N = prob.horizon;
        let mut J = T::zero();

        match prob.scheme {
            IntegrationScheme::Zoh => {
                for k in 0..N - 1 {
                    let dt = prob.local_dt(&traj.u[k]);
                    J += dt * self.stage_cost(&traj.x[k], &traj.u[k]);
                }
            }
            IntegrationScheme::Foh => {
                // Simpson quadrature over each interval
                let sixth = T::one() / (6.0).as_T();
                let four: T = (4.0).as_T();
                let half: T = (0.5).as_T();
                for k in 0..N - 1 {
                    let dt = prob.local_dt(&traj.u[k]);
                    let um = (&traj.u[k] + &traj.u[k + 1]) * half;
                    let l0 = self.stage_cost(&traj.x[k], &traj.u[k]);
                    let lm = self.stage_cost(&traj.xmid[k], &um);
                    let l1 = self.stage_cost(&traj.x[k + 1], &traj.u[k + 1]);
                    J += dt * sixth * (l0 + four * lm + l1);
                }
            }
        }

        J + self.terminal_cost(&traj.x[N - 1])
    }
}
