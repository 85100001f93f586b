use super::*;
use crate::algebra::*;
use crate::solver::core::SolverStatus;
use nalgebra::DVector;

/// Final solver output.
#[derive(Debug, Clone)]
pub struct DefaultSolution<T: FloatT> {
    /// state trajectory
    pub x: Vec<DVector<T>>,
    /// control trajectory, nominal entries only (slack and minimum-time
    /// entries stripped)
    pub u: Vec<DVector<T>>,
    /// final solver status
    pub status: SolverStatus,
    /// achieved cost
    pub obj_val: T,
    /// final maximum constraint violation
    pub max_violation: T,
    /// outer iteration count
    pub iterations: u32,
    /// cumulative inner iteration count
    pub iterations_inner: u32,
    /// solve time in seconds
    pub solve_time: f64,
}

impl<T: FloatT> DefaultSolution<T> {
    pub(crate) fn new() -> Self {
        Self {
            x: vec![],
            u: vec![],
            status: SolverStatus::Unsolved,
            obj_val: T::zero(),
            max_violation: T::zero(),
            iterations: 0,
            iterations_inner: 0,
            solve_time: 0f64,
        }
    }

    pub(crate) fn finalize(
        &mut self,
        prob: &Problem<T>,
        traj: &Trajectory<T>,
        info: &DefaultInfo<T>,
        obj_val: T,
        max_violation: T,
    ) {
        self.x = traj.x.clone();
        self.u = traj
            .u
            .iter()
            .map(|u| u.rows(0, prob.nu).into_owned())
            .collect();
        self.status = info.status;
        self.obj_val = obj_val;
        self.max_violation = max_violation;
        self.iterations = info.iterations;
        self.iterations_inner = info.iterations_inner;
        self.solve_time = info.solve_time;
    }
}
