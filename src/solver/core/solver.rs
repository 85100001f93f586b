use crate::algebra::FloatT;
use thiserror::Error;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    Unsolved,
    /// Solver terminated with all constraints satisfied to tolerance.
    Solved,
    /// Outer iteration limit reached before the constraint tolerance was
    /// met.  The best trajectory found is still returned.
    MaxIterations,
    /// Solver terminated with a numerical error in the inner solve.
    NumericalError,
}

impl SolverStatus {
    /// True if the solver terminated with an error status.
    pub fn is_errored(&self) -> bool {
        matches!(*self, SolverStatus::NumericalError)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Default for SolverStatus {
    fn default() -> Self {
        SolverStatus::Unsolved
    }
}

// ---------------------------------
// inner solve interchange types
// ---------------------------------

/// Convergence tolerances handed to the inner solver for one outer
/// iteration.  The outer loop passes intermediate (looser) values on all
/// but the final allowed iteration, so that early outer iterations run
/// cheap, inexact inner solves.
#[derive(Clone, Debug)]
pub struct InnerTolerances<T: FloatT> {
    pub cost_tolerance: T,
    pub gradient_tolerance: T,
}

/// Result summary reported by the inner solver after one solve.
#[derive(Clone, Debug)]
pub struct InnerSummary<T: FloatT> {
    /// cost achieved at the returned trajectory
    pub cost: T,
    /// iterations spent by the inner solver
    pub iterations: u32,
    /// final feedforward gradient norm
    pub gradient: T,
}

/// Unrecoverable inner-solve failure.
///
/// Rollout divergence is *not* an error: it is a recoverable condition
/// reported as a boolean and handled by line-search backoff.  These
/// variants surface only when no retry can make progress.
#[derive(Error, Debug)]
pub enum SolveError {
    /// Cost evaluated to a non-finite value at the current trajectory.
    #[error("cost is not finite at the current trajectory")]
    NonFiniteCost,
    /// Backward pass failed to produce a positive definite model at the
    /// regularization ceiling.
    #[error("regularization limit reached in the backward pass")]
    RegularizationLimit,
    /// The inner solver does not support the problem's integration scheme.
    #[error("integration scheme not supported by this inner solver")]
    UnsupportedScheme,
}
