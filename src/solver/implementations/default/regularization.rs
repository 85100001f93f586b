use crate::algebra::*;

/// Scalar damping term for the inner solver's backward pass, with its
/// rate of change.
///
/// Increase and decrease follow a geometric schedule: the rate `dρ`
/// accelerates in whichever direction is being applied, and a decrease
/// whose product would land at or below the floor snaps to exactly zero
/// rather than decaying below it.
#[derive(Clone, Copy, Debug)]
pub struct Regularization<T: FloatT> {
    pub ρ: T,
    pub dρ: T,
}

impl<T: FloatT> Regularization<T> {
    pub fn new() -> Self {
        Self {
            ρ: T::zero(),
            dρ: T::one(),
        }
    }

    pub fn reset(&mut self) {
        self.ρ = T::zero();
        self.dρ = T::one();
    }

    /// `dρ ← max(dρ·factor, factor)`, `ρ ← max(ρ·dρ, ρ_min)`.
    pub fn increase(&mut self, factor: T, ρ_min: T) {
        self.dρ = (self.dρ * factor).max(factor);
        self.ρ = (self.ρ * self.dρ).max(ρ_min);
    }

    /// `dρ ← min(dρ/factor, 1/factor)`, then `ρ ← ρ·dρ` forced to zero
    /// when the product would not clear the floor.
    pub fn decrease(&mut self, factor: T, ρ_min: T) {
        self.dρ = (self.dρ / factor).min(T::one() / factor);
        let next = self.ρ * self.dρ;
        self.ρ = if next > ρ_min { next } else { T::zero() };
    }
}

impl<T: FloatT> Default for Regularization<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -------------
// testing

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_from_zero() {
        let mut reg = Regularization::<f64>::new();
        reg.increase(1.6, 1e-8);
        assert_eq!(reg.dρ, 1.6);
        assert_eq!(reg.ρ, 1e-8);

        // repeated increases accelerate
        reg.increase(1.6, 1e-8);
        assert!(reg.dρ > 1.6);
        assert!(reg.ρ > 1e-8);
    }

    #[test]
    fn test_decrease_snaps_to_zero_at_floor() {
        let mut reg = Regularization::<f64> { ρ: 1e-8, dρ: 1.0 };
        reg.decrease(1.6, 1e-8);
        assert_eq!(reg.ρ, 0.0);
    }

    #[test]
    fn test_decrease_above_floor() {
        let mut reg = Regularization::<f64> { ρ: 1.0, dρ: 1.0 };
        reg.decrease(1.6, 1e-8);
        assert!((reg.ρ - 1.0 / 1.6).abs() < 1e-12);
        assert!((reg.dρ - 1.0 / 1.6).abs() < 1e-12);
    }
}
