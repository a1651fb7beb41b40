use crate::constants::{
    arcsec_to_rad, kpc_to_km, kpc_to_m, rad_to_arcsec, seconds_to_days,
    solar_gravitational_radius,
};
use crate::error::ConfigurationError;
use crate::params::PhysicalParameters;

use log::debug;
use serde::{Deserialize, Serialize};

/// Angular Einstein radius in arcseconds
///
/// $\theta_E = \sqrt{\frac{4 G M}{c^2} \frac{D_s - D_l}{D_l D_s}}$, `lens_mass` is in solar masses,
/// distances are in kiloparsecs.
pub fn einstein_radius(
    lens_mass: f64,
    source_distance: f64,
    lens_distance: f64,
) -> Result<f64, ConfigurationError> {
    let lens_mass = ConfigurationError::check_positive("lens mass", lens_mass)?;
    let source_distance = ConfigurationError::check_positive("source distance", source_distance)?;
    let lens_distance = ConfigurationError::check_positive("lens distance", lens_distance)?;
    if lens_distance >= source_distance {
        return Err(ConfigurationError::LensBeyondSource {
            lens_distance,
            source_distance,
        });
    }

    let schwarzschild_diameter = 4.0 * solar_gravitational_radius() * lens_mass;
    // (D_s - D_l) / (D_l D_s) in m^-1
    let inverse_distance =
        (source_distance - lens_distance) / (lens_distance * kpc_to_m(source_distance));
    let theta_rad = f64::sqrt(schwarzschild_diameter * inverse_distance);
    Ok(rad_to_arcsec(theta_rad))
}

/// Time in days to cross one Einstein radius projected onto the lens plane
///
/// `einstein_radius` is in arcseconds, `lens_distance` in kiloparsecs, `source_velocity` in km/s.
pub fn einstein_cross_time(
    einstein_radius: f64,
    lens_distance: f64,
    source_velocity: f64,
) -> Result<f64, ConfigurationError> {
    let einstein_radius = ConfigurationError::check_positive("Einstein radius", einstein_radius)?;
    let lens_distance = ConfigurationError::check_positive("lens distance", lens_distance)?;
    let source_velocity = ConfigurationError::check_positive("source velocity", source_velocity)?;

    let radius_km = arcsec_to_rad(einstein_radius) * kpc_to_km(lens_distance);
    let days = seconds_to_days(radius_km / source_velocity);
    if days.is_finite() && days > 0.0 {
        Ok(days)
    } else {
        Err(ConfigurationError::DegenerateCrossingTime { value: days })
    }
}

/// Angular and temporal scales of an event
///
/// Both values are strictly positive and finite. The scale is computed once per run and shared by
/// every sample. Deserialization goes through [LensScale::new].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LensScaleParameters")]
pub struct LensScale {
    einstein_radius: f64,
    crossing_time: f64,
}

#[derive(Deserialize)]
struct LensScaleParameters {
    einstein_radius: f64,
    crossing_time: f64,
}

impl TryFrom<LensScaleParameters> for LensScale {
    type Error = ConfigurationError;

    fn try_from(p: LensScaleParameters) -> Result<Self, Self::Error> {
        Self::new(p.einstein_radius, p.crossing_time)
    }
}

impl LensScale {
    /// Scale from known values, arcsec and days
    pub fn new(einstein_radius: f64, crossing_time: f64) -> Result<Self, ConfigurationError> {
        let einstein_radius = ConfigurationError::check_positive("Einstein radius", einstein_radius)?;
        if !(crossing_time.is_finite() && crossing_time > 0.0) {
            return Err(ConfigurationError::DegenerateCrossingTime {
                value: crossing_time,
            });
        }
        Ok(Self {
            einstein_radius,
            crossing_time,
        })
    }

    pub fn from_parameters(params: &PhysicalParameters) -> Result<Self, ConfigurationError> {
        params.validate()?;
        let einstein_radius =
            einstein_radius(params.lens_mass, params.source_distance, params.lens_distance)?;
        let crossing_time =
            einstein_cross_time(einstein_radius, params.lens_distance, params.source_velocity)?;
        debug!("Einstein radius {einstein_radius:.4e} arcsec, crossing time {crossing_time:.4} days");
        Ok(Self {
            einstein_radius,
            crossing_time,
        })
    }

    /// Einstein radius, arcsec
    #[inline]
    pub fn einstein_radius(&self) -> f64 {
        self.einstein_radius
    }

    /// Einstein radius crossing time, days
    #[inline]
    pub fn crossing_time(&self) -> f64 {
        self.crossing_time
    }
}
