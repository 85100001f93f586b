#![allow(non_snake_case)]
use nalgebra::RealField;
use num_traits::FromPrimitive;
use std::fmt::{Debug, Display, LowerExp};

/// Main trait for floating point types used in the solver.
///
/// All floating point calculations are represented internally on values
/// implementing the `FloatT` trait, with blanket coverage for f32 and f64
/// native types.  `FloatT` relies on [`nalgebra::RealField`] for its field
/// operations and on [`num_traits`](num_traits) for primitive conversion.
pub trait FloatT:
    'static + Send + Sync + RealField + Copy + Default + FromPrimitive + Display + LowerExp + Debug
{
}

impl<T> FloatT for T where
    T: 'static
        + Send
        + Sync
        + RealField
        + Copy
        + Default
        + FromPrimitive
        + Display
        + LowerExp
        + Debug
{
}

/// Trait for converting Rust primitives to [`FloatT`](crate::algebra::FloatT)
///
/// This convenience trait is implemented on f32/64 and u32/64, so that we
/// can write things like `(2.0).as_T()` on constants rather than the
/// awful `T::from_f64(2.0).unwrap()`.
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_FloatT {
    ($ty:ty, $ident:ident) => {
        impl<T> AsFloatT<T> for $ty
        where
            T: FromPrimitive + 'static,
        {
            #[inline]
            fn as_T(&self) -> T {
                T::$ident(*self).unwrap()
            }
        }
    };
}
impl_as_FloatT!(u32, from_u32);
impl_as_FloatT!(u64, from_u64);
impl_as_FloatT!(usize, from_usize);
impl_as_FloatT!(f32, from_f32);
impl_as_FloatT!(f64, from_f64);
