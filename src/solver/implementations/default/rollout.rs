#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use nalgebra::{DMatrix, DVector};

// -------------------------------------
// trajectory storage
// -------------------------------------

/// State/control trajectory over the horizon.
///
/// Controls carry the augmented width `mm`.  Under first-order hold the
/// trajectory additionally tracks state derivatives at every knot and
/// interval midpoint states, recomputed whenever the trajectory changes.
#[derive(Clone, Debug)]
pub struct Trajectory<T: FloatT> {
    pub x: Vec<DVector<T>>,
    pub u: Vec<DVector<T>>,
    pub xdot: Vec<DVector<T>>,
    pub xmid: Vec<DVector<T>>,
}

impl<T: FloatT> Trajectory<T> {
    /// Number of control vectors for the problem's hold scheme.
    pub fn num_controls(prob: &Problem<T>) -> usize {
        match prob.scheme {
            IntegrationScheme::Zoh => prob.horizon - 1,
            IntegrationScheme::Foh => prob.horizon,
        }
    }

    pub fn zeros(prob: &Problem<T>) -> Self {
        let N = prob.horizon;
        let (n_dot, n_mid) = match prob.scheme {
            IntegrationScheme::Zoh => (0, 0),
            IntegrationScheme::Foh => (N, N - 1),
        };
        Self {
            x: (0..N).map(|_| DVector::zeros(prob.nx)).collect(),
            u: (0..Self::num_controls(prob))
                .map(|_| DVector::zeros(prob.mm))
                .collect(),
            xdot: (0..n_dot).map(|_| DVector::zeros(prob.nx)).collect(),
            xmid: (0..n_mid).map(|_| DVector::zeros(prob.nx)).collect(),
        }
    }

    pub fn copy_from(&mut self, src: &Self) {
        for (dst, src) in self.x.iter_mut().zip(src.x.iter()) {
            dst.copy_from(src);
        }
        for (dst, src) in self.u.iter_mut().zip(src.u.iter()) {
            dst.copy_from(src);
        }
        for (dst, src) in self.xdot.iter_mut().zip(src.xdot.iter()) {
            dst.copy_from(src);
        }
        for (dst, src) in self.xmid.iter_mut().zip(src.xmid.iter()) {
            dst.copy_from(src);
        }
    }
}

/// Feedback data produced by the inner solver's backward pass.
///
/// `k_fb`/`d` are the feedback gains and feedforward corrections; `b`
/// carries the additional first-order-hold coupling gains and is empty
/// under zero-order hold.
#[derive(Clone, Debug)]
pub struct Gains<T: FloatT> {
    pub k_fb: Vec<DMatrix<T>>,
    pub d: Vec<DVector<T>>,
    pub b: Vec<DMatrix<T>>,
}

impl<T: FloatT> Gains<T> {
    pub fn zeros(prob: &Problem<T>) -> Self {
        let nc = Trajectory::num_controls(prob);
        let n_b = match prob.scheme {
            IntegrationScheme::Zoh => 0,
            IntegrationScheme::Foh => nc,
        };
        Self {
            k_fb: (0..nc).map(|_| DMatrix::zeros(prob.mm, prob.nx)).collect(),
            d: (0..nc).map(|_| DVector::zeros(prob.mm)).collect(),
            b: (0..n_b).map(|_| DMatrix::zeros(prob.mm, prob.mm)).collect(),
        }
    }

    pub fn set_zero(&mut self) {
        for k in self.k_fb.iter_mut() {
            k.fill(T::zero());
        }
        for d in self.d.iter_mut() {
            d.fill(T::zero());
        }
        for b in self.b.iter_mut() {
            b.fill(T::zero());
        }
    }
}

// -------------------------------------
// rollout
// -------------------------------------

// Magnitude ceiling check.  A non-finite norm (Inf or NaN anywhere in
// the step) also trips this, which is stricter than the plain
// comparison.
fn within_limits<T: FloatT>(x: &DVector<T>, u: &DVector<T>, settings: &DefaultSettings<T>) -> bool {
    let nx = x.as_slice().norm_inf();
    let nu = u.as_slice().norm_inf();
    nx.is_finite() && nu.is_finite() && nx < settings.max_state_value && nu < settings.max_control_value
}

/// Open-loop rollout: propagate the states from `x0` under the stored
/// controls.  Returns `false` on divergence (magnitude ceiling
/// exceeded); the partial trajectory is then unusable.  Divergence is
/// recoverable by the caller, never fatal at this layer.
pub fn rollout<T: FloatT>(
    prob: &Problem<T>,
    traj: &mut Trajectory<T>,
    settings: &DefaultSettings<T>,
) -> bool {
    let N = prob.horizon;
    traj.x[0].copy_from(&prob.x0);

    for k in 0..N - 1 {
        let u_next = match prob.scheme {
            IntegrationScheme::Foh => Some(&traj.u[k + 1]),
            IntegrationScheme::Zoh => None,
        };
        let xn = prob.step_aug(&traj.x[k], &traj.u[k], u_next);
        if !within_limits(&xn, &traj.u[k], settings) {
            return false;
        }
        traj.x[k + 1] = xn;
    }

    if prob.scheme == IntegrationScheme::Foh {
        update_derivatives(prob, traj);
    }
    true
}

/// Closed-loop rollout with step size `α`: propagate a new trajectory
/// from the same `x0`, correcting the controls with the feedback gains
/// and the scaled feedforward.
///
/// Zero-order hold applies `u = ū − K·(x − x̄) − α·d` per step.
/// First-order hold carries a rolling correction forward:
/// `du ← K·(x − x̄) + b·du + α·d`, so each step's correction depends on
/// the previous one.  With zero gains and `α·d = 0` both modes
/// reproduce the open-loop rollout bit-for-bit.
pub fn rollout_closed_loop<T: FloatT>(
    prob: &Problem<T>,
    nominal: &Trajectory<T>,
    gains: &Gains<T>,
    α: T,
    out: &mut Trajectory<T>,
    settings: &DefaultSettings<T>,
) -> bool {
    let N = prob.horizon;
    out.x[0].copy_from(&prob.x0);

    match prob.scheme {
        IntegrationScheme::Zoh => {
            for k in 0..N - 1 {
                let δx = &out.x[k] - &nominal.x[k];
                out.u[k] = &nominal.u[k] - &gains.k_fb[k] * δx - &gains.d[k] * α;

                let xn = prob.step_aug(&out.x[k], &out.u[k], None);
                if !within_limits(&xn, &out.u[k], settings) {
                    return false;
                }
                out.x[k + 1] = xn;
            }
        }
        IntegrationScheme::Foh => {
            let mut du = &gains.d[0] * α;
            out.u[0] = &nominal.u[0] + &du;

            for k in 1..N {
                let δx = &out.x[k - 1] - &nominal.x[k - 1];
                du = &gains.k_fb[k] * δx + &gains.b[k] * du + &gains.d[k] * α;
                out.u[k] = &nominal.u[k] + &du;

                let xn = prob.step_aug(&out.x[k - 1], &out.u[k - 1], Some(&out.u[k]));
                if !within_limits(&xn, &out.u[k], settings) {
                    return false;
                }
                out.x[k] = xn;
            }
        }
    }

    if prob.scheme == IntegrationScheme::Foh {
        update_derivatives(prob, out);
    }
    true
}

/// Recompute the state derivative and interval midpoint bookkeeping for
/// a first-order-hold trajectory.  The midpoint uses the cubic
/// interpolant `½(xₖ + xₖ₊₁) + dt/8·(ẋₖ − ẋₖ₊₁)`.
pub fn update_derivatives<T: FloatT>(prob: &Problem<T>, traj: &mut Trajectory<T>) {
    let model = prob
        .continuous
        .as_ref()
        .expect("first-order hold requires continuous dynamics");
    let N = prob.horizon;

    for k in 0..N {
        let un = prob.nominal_u(&traj.u[k]);
        traj.xdot[k] = model.dynamics(&traj.x[k], &un);
    }

    let half: T = (0.5).as_T();
    let eighth = T::one() / (8.0).as_T();
    for k in 0..N - 1 {
        let dt = prob.local_dt(&traj.u[k]);
        traj.xmid[k] = (&traj.x[k] + &traj.x[k + 1]) * half
            + (&traj.xdot[k] - &traj.xdot[k + 1]) * (dt * eighth);
    }
}
