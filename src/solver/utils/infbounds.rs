use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use lazy_static::lazy_static;

// Process-global threshold above which a box bound is treated as
// absent.  The constraint layout reads this once, when the per-problem
// bound masks are fixed; changing it mid-solve has no effect on an
// already-constructed solver.

lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert the finite-bound threshold to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}

/// Set the finite-bound threshold.  A state or control bound whose
/// magnitude reaches this value contributes no inequality row to the
/// constraint layout.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}

/// Get the current finite-bound threshold.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}
