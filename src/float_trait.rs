use ndarray::NdFloat;
use num_traits::FloatConst;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::iter::Sum;

/// Floating-point type the microlensing model is evaluated in
///
/// Implemented for [`f32`] and [`f64`]. Physical constants are always handled in double precision,
/// only the dimensionless model (positions in Einstein radii, magnification) is generic.
pub trait Float:
    'static
    + Sized
    + NdFloat
    + FloatConst
    + Sum
    + JsonSchema
    + DeserializeOwned
    + Serialize
{
    fn half() -> Self;
    fn two() -> Self;
    fn four() -> Self;

    /// Round a double-precision value to the nearest representable one, overflow gives infinity
    fn from_double(x: f64) -> Self;

    fn into_double(self) -> f64;
}

impl Float for f32 {
    #[inline]
    fn half() -> Self {
        0.5
    }

    #[inline]
    fn two() -> Self {
        2.0
    }

    #[inline]
    fn four() -> Self {
        4.0
    }

    #[inline]
    fn from_double(x: f64) -> Self {
        x as f32
    }

    #[inline]
    fn into_double(self) -> f64 {
        self.into()
    }
}

impl Float for f64 {
    #[inline]
    fn half() -> Self {
        0.5
    }

    #[inline]
    fn two() -> Self {
        2.0
    }

    #[inline]
    fn four() -> Self {
        4.0
    }

    #[inline]
    fn from_double(x: f64) -> Self {
        x
    }

    #[inline]
    fn into_double(self) -> f64 {
        self
    }
}
