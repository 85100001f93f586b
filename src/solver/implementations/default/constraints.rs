#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::utils::infbounds::get_infinity;
use itertools::izip;
use nalgebra::DVector;
use std::marker::PhantomData;
use std::ops::Range;

// -------------------------------------
// parted vectors
// -------------------------------------

/// A block-partitioned vector: one flat backing array tagged with an
/// inequality range followed by an equality range.  The split point is
/// fixed at construction, so sub-range access needs no dynamic lookup.
#[derive(Clone, Debug)]
pub struct PartedVec<T: FloatT> {
    pub data: DVector<T>,
    split: usize,
}

impl<T: FloatT> PartedVec<T> {
    pub fn zeros(p: usize, p_ineq: usize) -> Self {
        debug_assert!(p_ineq <= p);
        Self {
            data: DVector::zeros(p),
            split: p_ineq,
        }
    }

    pub fn from_element(p: usize, p_ineq: usize, value: T) -> Self {
        Self {
            data: DVector::from_element(p, value),
            split: p_ineq,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
    pub fn split(&self) -> usize {
        self.split
    }

    pub fn inequality(&self) -> &[T] {
        &self.data.as_slice()[..self.split]
    }
    pub fn equality(&self) -> &[T] {
        &self.data.as_slice()[self.split..]
    }
    pub fn inequality_mut(&mut self) -> &mut [T] {
        &mut self.data.as_mut_slice()[..self.split]
    }
    pub fn equality_mut(&mut self) -> &mut [T] {
        &mut self.data.as_mut_slice()[self.split..]
    }
}

/// Boolean companion of [`PartedVec`], tracking per-row activation.
#[derive(Clone, Debug)]
pub struct PartedMask {
    pub data: Vec<bool>,
    split: usize,
}

impl PartedMask {
    /// New mask with every equality row active and every inequality row
    /// inactive.
    pub fn new(p: usize, p_ineq: usize) -> Self {
        let mut data = vec![false; p];
        for slot in data.iter_mut().skip(p_ineq) {
            *slot = true;
        }
        Self { data, split: p_ineq }
    }

    pub fn split(&self) -> usize {
        self.split
    }
    pub fn inequality(&self) -> &[bool] {
        &self.data[..self.split]
    }
    pub fn equality(&self) -> &[bool] {
        &self.data[self.split..]
    }
}

// -------------------------------------
// constraint layout
// -------------------------------------

/// Fixed per-timestep constraint partition.
///
/// The stage layout concatenates, in order: control upper bounds,
/// control lower bounds, state upper bounds, state lower bounds (each
/// restricted to rows whose bound is finite), custom inequality rows,
/// custom equality rows, infeasible-slack equality rows, and the
/// minimum-time step-consistency row.  The terminal layout is shorter:
/// by default a goal-state equality of size `nx`.
///
/// Family ranges are computed once per problem shape; the total sizes
/// `p`, `p_ineq`, `p_eq` are invariant thereafter.
#[derive(Clone, Debug)]
pub struct ConstraintLayout<T: FloatT> {
    pub nx: usize,
    pub nu: usize,
    pub(crate) m_bar: usize,
    pub(crate) mm: usize,

    // finite-bound row indices into u and x
    pub(crate) u_upper_idx: Vec<usize>,
    pub(crate) u_lower_idx: Vec<usize>,
    pub(crate) x_upper_idx: Vec<usize>,
    pub(crate) x_lower_idx: Vec<usize>,

    /// rows contributed by the custom inequality function
    pub custom_ineq: usize,
    /// rows contributed by the custom equality function
    pub custom_eq: usize,
    /// infeasible-slack equality rows
    pub slack_rows: usize,
    /// minimum-time consistency rows
    pub min_time_rows: usize,
    /// terminal (vs stage) layout
    pub terminal: bool,

    // family ranges into the stage vector
    pub(crate) rng_custom_ineq: Range<usize>,
    pub(crate) rng_custom_eq: Range<usize>,
    pub(crate) rng_slack: Range<usize>,
    pub(crate) rng_min_time: Range<usize>,

    /// total rows
    pub p: usize,
    /// inequality rows
    pub p_ineq: usize,
    /// equality rows
    pub p_eq: usize,

    _phantom: PhantomData<T>,
}

fn finite_indices<T: FloatT>(bounds: &DVector<T>) -> Vec<usize> {
    let inf = T::from_f64(get_infinity()).unwrap();
    bounds
        .iter()
        .enumerate()
        .filter(|(_, &b)| b.abs() < inf)
        .map(|(i, _)| i)
        .collect()
}

impl<T: FloatT> ConstraintLayout<T> {
    /// Stage layout for a configured problem.
    pub fn stage(prob: &Problem<T>) -> Self {
        let u_upper_idx = finite_indices(&prob.u_max);
        let u_lower_idx = finite_indices(&prob.u_min);
        let x_upper_idx = finite_indices(&prob.x_max);
        let x_lower_idx = finite_indices(&prob.x_min);

        let custom_ineq = prob.ineq_constraint.as_ref().map_or(0, |c| c.dim());
        let custom_eq = prob.eq_constraint.as_ref().map_or(0, |c| c.dim());
        let slack_rows = if prob.infeasible { prob.nx } else { 0 };
        let min_time_rows = usize::from(prob.min_time);

        let p_ineq = u_upper_idx.len()
            + u_lower_idx.len()
            + x_upper_idx.len()
            + x_lower_idx.len()
            + custom_ineq;
        let p_eq = custom_eq + slack_rows + min_time_rows;
        let p = p_ineq + p_eq;

        let rng_custom_ineq = (p_ineq - custom_ineq)..p_ineq;
        let rng_custom_eq = p_ineq..(p_ineq + custom_eq);
        let rng_slack = rng_custom_eq.end..(rng_custom_eq.end + slack_rows);
        let rng_min_time = rng_slack.end..p;

        Self {
            nx: prob.nx,
            nu: prob.nu,
            m_bar: prob.m_bar,
            mm: prob.mm,
            u_upper_idx,
            u_lower_idx,
            x_upper_idx,
            x_lower_idx,
            custom_ineq,
            custom_eq,
            slack_rows,
            min_time_rows,
            terminal: false,
            rng_custom_ineq,
            rng_custom_eq,
            rng_slack,
            rng_min_time,
            p,
            p_ineq,
            p_eq,
            _phantom: PhantomData,
        }
    }

    /// Terminal layout: all equality, default goal-state size.
    pub fn terminal(prob: &Problem<T>) -> Self {
        let p = if let Some(tc) = prob.terminal_constraint.as_ref() {
            tc.dim()
        } else if prob.goal_constraint {
            prob.nx
        } else {
            0
        };
        Self {
            nx: prob.nx,
            nu: prob.nu,
            m_bar: prob.m_bar,
            mm: prob.mm,
            u_upper_idx: vec![],
            u_lower_idx: vec![],
            x_upper_idx: vec![],
            x_lower_idx: vec![],
            custom_ineq: 0,
            custom_eq: p,
            slack_rows: 0,
            min_time_rows: 0,
            terminal: true,
            rng_custom_ineq: 0..0,
            rng_custom_eq: 0..p,
            rng_slack: p..p,
            rng_min_time: p..p,
            p,
            p_ineq: 0,
            p_eq: p,
            _phantom: PhantomData,
        }
    }

    /// Evaluate the stage constraint vector at `(x, u)` into
    /// caller-owned storage.  Pure given its arguments; never resizes
    /// its output.  `u_next` feeds the minimum-time consistency row and
    /// is absent at the last stage, where the row evaluates to zero.
    pub fn evaluate(
        &self,
        c: &mut PartedVec<T>,
        prob: &Problem<T>,
        x: &DVector<T>,
        u: &DVector<T>,
        u_next: Option<&DVector<T>>,
    ) {
        debug_assert_eq!(c.len(), self.p);
        let mut r = 0usize;

        // box bounds, masked to the finite rows
        for &j in self.u_upper_idx.iter() {
            c.data[r] = u[j] - prob.u_max[j];
            r += 1;
        }
        for &j in self.u_lower_idx.iter() {
            c.data[r] = prob.u_min[j] - u[j];
            r += 1;
        }
        for &j in self.x_upper_idx.iter() {
            c.data[r] = x[j] - prob.x_max[j];
            r += 1;
        }
        for &j in self.x_lower_idx.iter() {
            c.data[r] = prob.x_min[j] - x[j];
            r += 1;
        }

        if let Some(cf) = prob.ineq_constraint.as_ref() {
            let rng = self.rng_custom_ineq.clone();
            cf.evaluate(&mut c.data.as_mut_slice()[rng], x, u);
        }
        if let Some(cf) = prob.eq_constraint.as_ref() {
            let rng = self.rng_custom_eq.clone();
            cf.evaluate(&mut c.data.as_mut_slice()[rng], x, u);
        }

        // infeasible slack rows: the slack sub-vector of u, verbatim
        if self.slack_rows > 0 {
            for (slot, i) in izip!(self.rng_slack.clone(), 0..self.slack_rows) {
                c.data[slot] = u[self.m_bar + i];
            }
        }

        // minimum-time step consistency, interior steps only
        if self.min_time_rows > 0 {
            let slot = self.rng_min_time.start;
            c.data[slot] = match u_next {
                Some(v) => u[self.m_bar - 1] - v[self.m_bar - 1],
                None => T::zero(),
            };
        }
    }

    /// Evaluate the terminal constraint at `x` into caller-owned
    /// storage.  Default: the goal-state equality `x − xf`.
    pub fn evaluate_terminal(&self, c: &mut PartedVec<T>, prob: &Problem<T>, x: &DVector<T>) {
        debug_assert_eq!(c.len(), self.p);
        if let Some(tc) = prob.terminal_constraint.as_ref() {
            tc.evaluate(c.data.as_mut_slice(), x);
        } else if self.p > 0 {
            for i in 0..self.p {
                c.data[i] = x[i] - prob.objective.xf[i];
            }
        }
    }
}
