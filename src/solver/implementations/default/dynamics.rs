use super::FiniteDiff;
use crate::algebra::*;
use crate::solver::core::traits::{ContinuousDynamics, DiscreteDynamics, Differentiator};
use nalgebra::{DMatrix, DVector};

// -------------------------------------
// RK3 discretizer
// -------------------------------------

/// Discretizes any [`ContinuousDynamics`] model with a 3-stage
/// Runge-Kutta step.
///
/// Supports both hold schemes: the zero-order-hold step holds the
/// control constant across the internal stages, the first-order-hold
/// step interpolates it linearly between the interval endpoints.
/// Jacobians are produced by the injected differentiation service.
pub struct Rk3<T: FloatT, M: ContinuousDynamics<T>> {
    model: M,
    diff: FiniteDiff<T>,
}

impl<T: FloatT, M: ContinuousDynamics<T>> Rk3<T, M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            diff: FiniteDiff::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    fn stages(&self, x: &DVector<T>, u0: &DVector<T>, um: &DVector<T>, u1: &DVector<T>, dt: T) -> DVector<T> {
        let half: T = (0.5).as_T();
        let two: T = (2.0).as_T();
        let four: T = (4.0).as_T();
        let sixth = T::one() / (6.0).as_T();

        let k1 = self.model.dynamics(x, u0);
        let k2 = self.model.dynamics(&(x + &k1 * (dt * half)), um);
        let k3 = self.model.dynamics(&(x - &k1 * dt + &k2 * (two * dt)), u1);

        x + (k1 + k2 * four + k3) * (dt * sixth)
    }
}

impl<T: FloatT, M: ContinuousDynamics<T>> DiscreteDynamics<T> for Rk3<T, M> {
    fn state_dim(&self) -> usize {
        self.model.state_dim()
    }
    fn control_dim(&self) -> usize {
        self.model.control_dim()
    }

    fn step(&self, x: &DVector<T>, u: &DVector<T>, dt: T) -> DVector<T> {
        self.stages(x, u, u, u, dt)
    }

    fn step_foh(&self, x: &DVector<T>, u: &DVector<T>, u_next: &DVector<T>, dt: T) -> DVector<T> {
        let half: T = (0.5).as_T();
        let um = (u + u_next) * half;
        self.stages(x, u, &um, u_next, dt)
    }

    fn jacobian(&self, x: &DVector<T>, u: &DVector<T>, dt: T) -> (DMatrix<T>, DMatrix<T>) {
        let (n, m) = (self.state_dim(), self.control_dim());

        // differentiate through the full step wrt [x; u]
        let mut s = DVector::zeros(n + m);
        s.rows_mut(0, n).copy_from(x);
        s.rows_mut(n, m).copy_from(u);

        let f = |s: &DVector<T>| {
            let xs = s.rows(0, n).into_owned();
            let us = s.rows(n, m).into_owned();
            self.step(&xs, &us, dt)
        };

        let mut jac = DMatrix::zeros(n, n + m);
        self.diff.jacobian(&f, &s, &mut jac);

        let fx = jac.columns(0, n).into_owned();
        let fu = jac.columns(n, m).into_owned();
        (fx, fu)
    }

    fn jacobian_foh(
        &self,
        x: &DVector<T>,
        u: &DVector<T>,
        u_next: &DVector<T>,
        dt: T,
    ) -> (DMatrix<T>, DMatrix<T>, DMatrix<T>) {
        let (n, m) = (self.state_dim(), self.control_dim());

        let mut s = DVector::zeros(n + 2 * m);
        s.rows_mut(0, n).copy_from(x);
        s.rows_mut(n, m).copy_from(u);
        s.rows_mut(n + m, m).copy_from(u_next);

        let f = |s: &DVector<T>| {
            let xs = s.rows(0, n).into_owned();
            let us = s.rows(n, m).into_owned();
            let vs = s.rows(n + m, m).into_owned();
            self.step_foh(&xs, &us, &vs, dt)
        };

        let mut jac = DMatrix::zeros(n, n + 2 * m);
        self.diff.jacobian(&f, &s, &mut jac);

        let fx = jac.columns(0, n).into_owned();
        let fu = jac.columns(n, m).into_owned();
        let fv = jac.columns(n + m, m).into_owned();
        (fx, fu, fv)
    }
}

// -------------------------------------
// linear models
// -------------------------------------

/// Continuous-time linear dynamics `ẋ = Ax + Bu` with exact jacobians.
pub struct LinearContinuous<T: FloatT> {
    pub a: DMatrix<T>,
    pub b: DMatrix<T>,
}

impl<T: FloatT> LinearContinuous<T> {
    pub fn new(a: DMatrix<T>, b: DMatrix<T>) -> Self {
        assert_eq!(a.nrows(), a.ncols());
        assert_eq!(a.nrows(), b.nrows());
        Self { a, b }
    }
}

impl<T: FloatT> ContinuousDynamics<T> for LinearContinuous<T> {
    fn state_dim(&self) -> usize {
        self.a.nrows()
    }
    fn control_dim(&self) -> usize {
        self.b.ncols()
    }

    fn dynamics(&self, x: &DVector<T>, u: &DVector<T>) -> DVector<T> {
        &self.a * x + &self.b * u
    }

    fn jacobian(&self, _x: &DVector<T>, _u: &DVector<T>) -> (DMatrix<T>, DMatrix<T>) {
        (self.a.clone(), self.b.clone())
    }
}

/// Discrete-time linear dynamics `x⁺ = Ax + Bu` with exact jacobians.
///
/// The matrices are assumed consistent with the problem timestep; the
/// `dt` argument of the step is ignored.
pub struct LinearDiscrete<T: FloatT> {
    pub a: DMatrix<T>,
    pub b: DMatrix<T>,
}

impl<T: FloatT> LinearDiscrete<T> {
    pub fn new(a: DMatrix<T>, b: DMatrix<T>) -> Self {
        assert_eq!(a.nrows(), a.ncols());
        assert_eq!(a.nrows(), b.nrows());
        Self { a, b }
    }
}

impl<T: FloatT> DiscreteDynamics<T> for LinearDiscrete<T> {
    fn state_dim(&self) -> usize {
        self.a.nrows()
    }
    fn control_dim(&self) -> usize {
        self.b.ncols()
    }

    fn step(&self, x: &DVector<T>, u: &DVector<T>, _dt: T) -> DVector<T> {
        &self.a * x + &self.b * u
    }

    fn jacobian(&self, _x: &DVector<T>, _u: &DVector<T>, _dt: T) -> (DMatrix<T>, DMatrix<T>) {
        (self.a.clone(), self.b.clone())
    }
}

// -------------
// testing

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rk3_matches_exact_integrator() {
        // ẋ = -x integrates to x e^{-dt}
        let model = LinearContinuous::new(
            DMatrix::from_row_slice(1, 1, &[-1.0]),
            DMatrix::zeros(1, 1),
        );
        let rk3 = Rk3::new(model);

        let x = DVector::from_vec(vec![1.0]);
        let u = DVector::zeros(1);
        let xn = rk3.step(&x, &u, 0.01);

        assert!((xn[0] - (-0.01f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_rk3_jacobian_linear() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]);
        let b = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        let rk3 = Rk3::new(LinearContinuous::new(a, b));

        let x = DVector::from_vec(vec![1.0, -0.5]);
        let u = DVector::from_vec(vec![0.3]);
        let dt = 0.1;
        let (fx, fu) = rk3.jacobian(&x, &u, dt);

        // double integrator: fx = [1 dt; 0 1], fu = [dt²/2; dt]
        assert!((fx[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((fx[(0, 1)] - dt).abs() < 1e-6);
        assert!((fx[(1, 1)] - 1.0).abs() < 1e-6);
        assert!((fu[(0, 0)] - 0.5 * dt * dt).abs() < 1e-6);
        assert!((fu[(1, 0)] - dt).abs() < 1e-6);
    }
}
