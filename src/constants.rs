//! Physical constants and unit conversions used by the lens geometry
//!
//! Values match the ones astropy uses (CODATA 2018 and IAU 2015 nominal solar mass), so results
//! can be compared with Python microlensing tools directly.

/// Newtonian constant of gravitation, m^3 kg^-1 s^-2
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

/// Speed of light in vacuum, m s^-1
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Solar mass, kg
///
/// Derived from the IAU 2015 nominal solar mass parameter GM = 1.3271244e20 m^3 s^-2.
pub const SOLAR_MASS: f64 = 1.988_409_870_698_051e30;

/// One kiloparsec, m
pub const KILOPARSEC: f64 = 3.085_677_581_491_367e19;

/// One kilometre, m
pub const KILOMETRE: f64 = 1.0e3;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Arcseconds in one radian
pub const ARCSEC_PER_RADIAN: f64 = 180.0 / std::f64::consts::PI * 3600.0;

/// Gravitational radius GM/c^2 of one solar mass, m
pub fn solar_gravitational_radius() -> f64 {
    GRAVITATIONAL_CONSTANT * SOLAR_MASS / (SPEED_OF_LIGHT * SPEED_OF_LIGHT)
}

#[inline]
pub fn kpc_to_m(kpc: f64) -> f64 {
    kpc * KILOPARSEC
}

#[inline]
pub fn kpc_to_km(kpc: f64) -> f64 {
    kpc * (KILOPARSEC / KILOMETRE)
}

#[inline]
pub fn rad_to_arcsec(rad: f64) -> f64 {
    rad * ARCSEC_PER_RADIAN
}

#[inline]
pub fn arcsec_to_rad(arcsec: f64) -> f64 {
    arcsec / ARCSEC_PER_RADIAN
}

#[inline]
pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}
