#![allow(non_snake_case)]
//! Default implementation of the Augmented Lagrangian trajectory
//! optimization solver.

mod alstate;
mod constraints;
mod cost;
mod diff;
mod dynamics;
mod ilqr;
mod infeasible;
mod info;
mod info_print;
mod jacobians;
mod objective;
mod problem;
mod regularization;
mod rollout;
mod settings;
mod solution;
mod solver;

//export flattened
pub use alstate::*;
pub use constraints::*;
pub use cost::*;
pub use diff::*;
pub use dynamics::*;
pub use ilqr::*;
pub use infeasible::*;
pub use info::*;
pub use jacobians::*;
pub use objective::*;
pub use problem::*;
pub use regularization::*;
pub use rollout::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
