//! Scalar traits and small vector helpers.
//!
//! Dense linear algebra is provided by [`nalgebra`]; this module adds the
//! crate-wide scalar trait [`FloatT`], primitive conversion via
//! [`AsFloatT`], and a handful of slice reductions missing from the
//! standard library.

mod floats;
mod vecmath;

pub use floats::*;
pub use vecmath::*;

// scalar traits used pervasively alongside FloatT
pub use nalgebra::{ComplexField, RealField};
pub use num_traits::{FromPrimitive, One, Zero};
