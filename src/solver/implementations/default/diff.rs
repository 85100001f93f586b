use crate::algebra::*;
use crate::solver::core::traits::Differentiator;
use nalgebra::{DMatrix, DVector};

/// Central finite-difference jacobian service.
///
/// The dependency-free default [`Differentiator`].  Any other engine
/// (dual numbers, closed-form) may be injected in its place.
pub struct FiniteDiff<T: FloatT> {
    eps: T,
}

impl<T: FloatT> FiniteDiff<T> {
    pub fn new() -> Self {
        // near the cube root of f64 machine epsilon, the usual
        // central-difference step
        Self {
            eps: (1e-6).as_T(),
        }
    }

    pub fn with_step(eps: T) -> Self {
        Self { eps }
    }
}

impl<T: FloatT> Default for FiniteDiff<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatT> Differentiator<T> for FiniteDiff<T> {
    fn jacobian(
        &self,
        f: &dyn Fn(&DVector<T>) -> DVector<T>,
        x: &DVector<T>,
        out: &mut DMatrix<T>,
    ) {
        let two: T = (2.0).as_T();
        let mut xp = x.clone();
        for j in 0..x.len() {
            let h = self.eps.max(self.eps * x[j].abs());
            xp[j] = x[j] + h;
            let fp = f(&xp);
            xp[j] = x[j] - h;
            let fm = f(&xp);
            xp[j] = x[j];
            for i in 0..fp.len() {
                out[(i, j)] = (fp[i] - fm[i]) / (two * h);
            }
        }
    }
}

// -------------
// testing

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_diff_linear() {
        // jacobian of a linear map is exact to rounding
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, -1.0, 0.5, 4.0]);
        let f = {
            let a = a.clone();
            move |x: &DVector<f64>| &a * x
        };
        let x = DVector::from_vec(vec![0.3, -1.2, 2.0]);
        let mut jac = DMatrix::zeros(2, 3);
        FiniteDiff::new().jacobian(&f, &x, &mut jac);

        for i in 0..2 {
            for j in 0..3 {
                assert!((jac[(i, j)] - a[(i, j)]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_finite_diff_nonlinear() {
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]);
        let x = DVector::from_vec(vec![1.5, -2.0]);
        let mut jac = DMatrix::zeros(2, 2);
        FiniteDiff::new().jacobian(&f, &x, &mut jac);

        assert!((jac[(0, 0)] - 3.0).abs() < 1e-6);
        assert!((jac[(0, 1)] - 0.0).abs() < 1e-6);
        assert!((jac[(1, 0)] + 2.0).abs() < 1e-6);
        assert!((jac[(1, 1)] - 1.5).abs() < 1e-6);
    }
}
