#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::traits::Differentiator;
use nalgebra::{DMatrix, DVector};

/// Per-stage constraint jacobian, split into state and control blocks.
#[derive(Clone, Debug)]
pub struct StageJacobian<T: FloatT> {
    /// `∂c/∂x`, `p × nx`
    pub cx: DMatrix<T>,
    /// `∂c/∂u` over the augmented control width, `p × mm`
    pub cu: DMatrix<T>,
}

impl<T: FloatT> StageJacobian<T> {
    pub fn zeros(layout: &ConstraintLayout<T>) -> Self {
        Self {
            cx: DMatrix::zeros(layout.p, layout.nx),
            cu: DMatrix::zeros(layout.p, layout.mm),
        }
    }
}

/// Builds per-stage constraint jacobians into pre-sized buffers.
///
/// Box-constraint rows are constant sign-selected identity entries,
/// precomputed once from the finite-bound masks and copied into the
/// output each call.  Custom-function rows are produced by the injected
/// differentiation service over the concatenated `[x; u]` vector and
/// sliced into the state and control blocks.  Assembly is idempotent
/// and allocation-free apart from the differentiation scratch.
pub struct JacobianAssembler<T: FloatT> {
    layout: ConstraintLayout<T>,
    diff: Box<dyn Differentiator<T>>,

    // (row, column, sign) triplets for the box families
    box_x: Vec<(usize, usize, T)>,
    box_u: Vec<(usize, usize, T)>,
}

impl<T: FloatT> JacobianAssembler<T> {
    pub fn new(layout: ConstraintLayout<T>, diff: Box<dyn Differentiator<T>>) -> Self {
        let one = T::one();
        let mut box_u = Vec::new();
        let mut box_x = Vec::new();

        let mut r = 0usize;
        for &j in layout.u_upper_idx.iter() {
            box_u.push((r, j, one));
            r += 1;
        }
        for &j in layout.u_lower_idx.iter() {
            box_u.push((r, j, -one));
            r += 1;
        }
        for &j in layout.x_upper_idx.iter() {
            box_x.push((r, j, one));
            r += 1;
        }
        for &j in layout.x_lower_idx.iter() {
            box_x.push((r, j, -one));
            r += 1;
        }

        Self {
            layout,
            diff,
            box_x,
            box_u,
        }
    }

    pub fn layout(&self) -> &ConstraintLayout<T> {
        &self.layout
    }

    /// Assemble the stage jacobian at `(x, u)`.
    pub fn assemble(
        &self,
        jac: &mut StageJacobian<T>,
        prob: &Problem<T>,
        x: &DVector<T>,
        u: &DVector<T>,
    ) {
        let layout = &self.layout;
        let (n, m) = (layout.nx, layout.nu);
        jac.cx.fill(T::zero());
        jac.cu.fill(T::zero());

        for &(r, j, sign) in self.box_u.iter() {
            jac.cu[(r, j)] = sign;
        }
        for &(r, j, sign) in self.box_x.iter() {
            jac.cx[(r, j)] = sign;
        }

        // custom blocks: differentiate wrt [x; u] and slice
        for (cf, rng) in [
            (prob.ineq_constraint.as_ref(), layout.rng_custom_ineq.clone()),
            (prob.eq_constraint.as_ref(), layout.rng_custom_eq.clone()),
        ] {
            let Some(cf) = cf else { continue };
            let dim = cf.dim();

            let mut s = DVector::zeros(n + m);
            s.rows_mut(0, n).copy_from(x);
            for j in 0..m {
                s[n + j] = u[j];
            }

            let f = |s: &DVector<T>| {
                let xs = s.rows(0, n).into_owned();
                let mut us = u.clone();
                for j in 0..m {
                    us[j] = s[n + j];
                }
                let mut out = DVector::zeros(dim);
                cf.evaluate(out.as_mut_slice(), &xs, &us);
                out
            };

            let mut block = DMatrix::zeros(dim, n + m);
            self.diff.jacobian(&f, &s, &mut block);

            for (i, row) in rng.enumerate() {
                for j in 0..n {
                    jac.cx[(row, j)] = block[(i, j)];
                }
                for j in 0..m {
                    jac.cu[(row, j)] = block[(i, n + j)];
                }
            }
        }

        // slack rows: identity against the slack columns
        for (i, row) in layout.rng_slack.clone().enumerate() {
            jac.cu[(row, layout.m_bar + i)] = T::one();
        }

        // minimum-time consistency: unit entry against the local step
        // variable (the cross-knot coupling is not represented in the
        // per-stage blocks)
        if layout.min_time_rows > 0 {
            let row = layout.rng_min_time.start;
            jac.cu[(row, layout.m_bar - 1)] = T::one();
        }
    }

    /// Assemble the terminal jacobian: identity for the default
    /// goal-state constraint, or the caller-supplied jacobian for a
    /// custom terminal constraint.
    pub fn assemble_terminal(
        &self,
        jac: &mut StageJacobian<T>,
        prob: &Problem<T>,
        x: &DVector<T>,
    ) {
        jac.cu.fill(T::zero());
        if let Some(tc) = prob.terminal_constraint.as_ref() {
            tc.jacobian(&mut jac.cx, x);
        } else {
            jac.cx.fill(T::zero());
            for i in 0..jac.cx.nrows() {
                jac.cx[(i, i)] = T::one();
            }
        }
    }
}
