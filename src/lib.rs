//! __trajopt__ is a Rust implementation of an Augmented Lagrangian
//! trajectory optimization solver (AL-iLQR).  It computes locally
//! optimal, dynamically feasible state-control trajectories for
//! nonlinear systems subject to constraints:
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \ell_N(x_N) + \sum_{k=1}^{N-1} \ell(x_k, u_k)\,dt_k \\\\\[2ex\]
//! \text{subject to} & x_{k+1} = f(x_k, u_k) \\\\\[1ex\]
//!         & c_I(x_k, u_k) \le 0,\quad c_E(x_k, u_k) = 0 \\\\\[1ex\]
//!         & x_{min} \le x_k \le x_{max},\quad u_{min} \le u_k \le u_{max}
//!  \end{array}
//! $$
//!
//! Constrained problems are reduced to a sequence of unconstrained
//! subproblems via the Augmented Lagrangian method: each subproblem is
//! handed to an inner iLQR-style solver, after which the Lagrange
//! multipliers take a dual ascent step and the quadratic penalty
//! weights escalate on a fixed-ratio schedule until the maximum
//! constraint violation meets tolerance.
//!
//! ## Features
//!
//! * __Heterogeneous constraints__: box bounds on states and controls,
//!   custom nonlinear equality and inequality functions, and a terminal
//!   goal constraint, stacked into one fixed-layout constraint vector
//!   per timestep.
//! * __Infeasible start__: an arbitrary reference state trajectory can
//!   seed the solve exactly via per-step slack controls, later driven
//!   to zero by the penalty schedule.
//! * __Minimum time__: the per-step duration can itself be a decision
//!   variable, carried as its square root to keep it implicitly
//!   nonnegative.
//! * __Zero- and first-order hold__: control held constant over each
//!   interval, or varying linearly with Simpson-quadrature cost
//!   integration.
//!
//! ## Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use trajopt::solver::*;
//!
//! // double integrator driven to the origin with |u| <= 1
//! let dt = 0.1;
//! let dynamics = LinearDiscrete::new(
//!     DMatrix::from_row_slice(2, 2, &[1.0, dt, 0.0, 1.0]),
//!     DMatrix::from_row_slice(2, 1, &[0.5 * dt * dt, dt]),
//! );
//! let objective = QuadraticObjective::new(
//!     DMatrix::identity(2, 2),
//!     DMatrix::from_element(1, 1, 0.1),
//!     DMatrix::identity(2, 2) * 100.0,
//!     DVector::zeros(2),
//! )
//! .unwrap();
//!
//! let prob = Problem::new(
//!     Box::new(dynamics),
//!     objective,
//!     DVector::from_vec(vec![1.0, 0.0]),
//!     21,
//!     dt,
//! )
//! .unwrap()
//! .with_control_bounds(
//!     DVector::from_element(1, -1.0),
//!     DVector::from_element(1, 1.0),
//! )
//! .unwrap();
//!
//! let mut solver = DefaultSolver::new(prob, DefaultSettings::default());
//! solver.solve();
//!
//! assert_eq!(solver.solution.status, SolverStatus::Solved);
//! ```

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod solver;
