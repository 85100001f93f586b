use super::*;
use crate::algebra::*;
use crate::solver::core::{InnerSummary, SolverStatus};

/// Solver progress statistics.
///
/// Reset at the start of every solve, appended to once per outer
/// iteration, read-only afterward.
#[derive(Default, Debug, Clone)]
pub struct DefaultInfo<T: FloatT> {
    /// outer iteration count
    pub iterations: u32,
    /// cumulative inner iteration count
    pub iterations_inner: u32,
    /// inner iterations spent in each outer iteration
    pub iter_inner_history: Vec<u32>,
    /// cost achieved after each outer iteration
    pub cost_history: Vec<T>,
    /// maximum constraint violation after each outer iteration
    pub violation_history: Vec<T>,
    /// one inner-solver summary per outer iteration
    pub inner_history: Vec<InnerSummary<T>>,

    pub solve_time: f64,
    pub status: SolverStatus,
}

impl<T: FloatT> DefaultInfo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.iterations = 0;
        self.iterations_inner = 0;
        self.iter_inner_history.clear();
        self.cost_history.clear();
        self.violation_history.clear();
        self.inner_history.clear();
        self.solve_time = 0f64;
        self.status = SolverStatus::Unsolved;
    }

    pub(crate) fn record_iteration(&mut self, summary: InnerSummary<T>, violation: T) {
        self.iterations += 1;
        self.iterations_inner += summary.iterations;
        self.iter_inner_history.push(summary.iterations);
        self.cost_history.push(summary.cost);
        self.violation_history.push(violation);
        self.inner_history.push(summary);
    }

    pub(crate) fn finalize(&mut self, solve_time: f64) {
        self.solve_time = solve_time;
    }
}
