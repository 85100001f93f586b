#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use nalgebra::DVector;

/// Componentwise linear interpolation between `x0` and `xf` over `n`
/// samples.  A cheap initial state guess for infeasible starts.
pub fn line_trajectory<T: FloatT>(x0: &DVector<T>, xf: &DVector<T>, n: usize) -> Vec<DVector<T>> {
    debug_assert!(n >= 2);
    let step = T::one() / (n - 1).as_T();
    (0..n)
        .map(|k| {
            let kt: T = k.as_T();
            let t = kt * step;
            x0 * (T::one() - t) + xf * t
        })
        .collect()
}

/// Synthesize slack controls that make an arbitrary reference state
/// trajectory dynamically exact.
///
/// Open-loop simulates the dynamics under the nominal controls and, at
/// each step, sets the slack equal to the residual between the
/// reference and the simulated next state; the slack is then added into
/// the simulation so it reproduces the reference exactly at every knot.
/// The resulting trajectory is dynamically consistent but penalized as
/// infeasible, and is driven toward zero slack by the slack equality
/// constraints as the outer loop escalates penalties.
///
/// Returns the augmented control trajectory (nominal entries copied
/// from `u_nominal`, slack entries filled).
pub fn infeasible_controls<T: FloatT>(
    prob: &Problem<T>,
    x_ref: &[DVector<T>],
    u_nominal: &[DVector<T>],
) -> Vec<DVector<T>> {
    debug_assert!(prob.infeasible);
    debug_assert_eq!(x_ref.len(), prob.horizon);

    let nc = Trajectory::num_controls(prob);
    let mut u_aug: Vec<DVector<T>> = (0..nc).map(|_| DVector::zeros(prob.mm)).collect();
    for (dst, src) in u_aug.iter_mut().zip(u_nominal.iter()) {
        for j in 0..src.len().min(prob.m_bar) {
            dst[j] = src[j];
        }
    }

    let mut x_sim = x_ref[0].clone();
    for k in 0..prob.horizon - 1 {
        let dt = prob.local_dt(&u_aug[k]);
        let un = prob.nominal_u(&u_aug[k]);
        let x_next = match prob.scheme {
            IntegrationScheme::Foh if k + 1 < nc => {
                let vn = prob.nominal_u(&u_aug[k + 1]);
                prob.dynamics.step_foh(&x_sim, &un, &vn, dt)
            }
            _ => prob.dynamics.step(&x_sim, &un, dt),
        };

        // slack = reference minus simulated next state
        for i in 0..prob.nx {
            u_aug[k][prob.m_bar + i] = x_ref[k + 1][i] - x_next[i];
        }

        // adding the slack reproduces the reference exactly
        x_sim.copy_from(&x_ref[k + 1]);
    }

    u_aug
}
