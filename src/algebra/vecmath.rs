use super::FloatT;
use nalgebra::{ComplexField, RealField};
use num_traits::Zero;

/// Slice-level vector reductions used throughout the solver.
///
/// These operate on `&[T]` so that they apply equally to full vectors and
/// to the partitioned sub-ranges of constraint vectors.  All reductions
/// return zero on empty inputs.
pub trait VectorMath<T> {
    /// infinity norm
    fn norm_inf(&self) -> T;

    /// largest positive entry, clamped below at zero
    fn max_positive(&self) -> T;

    /// inner product
    fn dot(&self, y: &[T]) -> T;
}

impl<T: FloatT> VectorMath<T> for [T] {
    fn norm_inf(&self) -> T {
        self.iter().fold(T::zero(), |m, &v| m.max(v.abs()))
    }

    fn max_positive(&self) -> T {
        self.iter().fold(T::zero(), |m, &v| m.max(v))
    }

    fn dot(&self, y: &[T]) -> T {
        debug_assert_eq!(self.len(), y.len());
        self.iter()
            .zip(y.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }
}

// -------------
// testing

#[test]
fn test_norm_inf() {
    let v = [1.0, -3.0, 2.0];
    assert_eq!(v.norm_inf(), 3.0);

    let empty: [f64; 0] = [];
    assert_eq!(empty.norm_inf(), 0.0);
}

#[test]
fn test_max_positive() {
    let v = [-1.0, -3.0, -2.0];
    assert_eq!(v.max_positive(), 0.0);

    let v = [-1.0, 0.5, -2.0];
    assert_eq!(v.max_positive(), 0.5);
}
