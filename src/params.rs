use crate::error::{ConfigurationError, ParameterFileError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Physical parameters of a single-lens single-source event
///
/// Units: distances in kiloparsecs, mass in solar masses, velocity in km/s, impact parameter in
/// Einstein radii, peak time in days, baseline flux is dimensionless.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhysicalParameters {
    pub source_distance: f64,
    pub baseline_flux: f64,
    pub source_velocity: f64,
    pub lens_mass: f64,
    pub lens_distance: f64,
    pub impact_parameter: f64,
    pub peak_time: f64,
}

impl PhysicalParameters {
    /// Check the record, the first offending field is reported
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let source_distance =
            ConfigurationError::check_positive("source distance", self.source_distance)?;
        let lens_distance =
            ConfigurationError::check_positive("lens distance", self.lens_distance)?;
        if lens_distance >= source_distance {
            return Err(ConfigurationError::LensBeyondSource {
                lens_distance,
                source_distance,
            });
        }
        ConfigurationError::check_positive("lens mass", self.lens_mass)?;
        ConfigurationError::check_positive("source velocity", self.source_velocity)?;
        ConfigurationError::check_positive("baseline flux", self.baseline_flux)?;
        ConfigurationError::check_finite("impact parameter", self.impact_parameter)?;
        ConfigurationError::check_finite("peak time", self.peak_time)?;
        Ok(())
    }

    /// Parse a parameter file, see [ParameterFile] for the layout
    pub fn from_json_reader(reader: impl Read) -> Result<Self, ParameterFileError> {
        let file: ParameterFile = serde_json::from_reader(reader)?;
        let params: Self = file.into();
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ParameterFileError> {
        Self::from_json_reader(s.as_bytes())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ParameterFileError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ParameterFileError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }
}

/// On-disk layout of the parameter file
///
/// ```json
/// {
///   "point source": {"Ds": 8.0, "flux": 1.0, "velocity": 200.0},
///   "point lens": {"mass": 0.5, "Dl": 4.0, "impact parameter": 0.1, "t0": 0.0}
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ParameterFile {
    #[serde(rename = "point source")]
    pub source: PointSourceSection,
    #[serde(rename = "point lens")]
    pub lens: PointLensSection,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PointSourceSection {
    #[serde(rename = "Ds")]
    pub distance: f64,
    pub flux: f64,
    pub velocity: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PointLensSection {
    pub mass: f64,
    #[serde(rename = "Dl")]
    pub distance: f64,
    #[serde(rename = "impact parameter")]
    pub impact_parameter: f64,
    pub t0: f64,
}

impl From<ParameterFile> for PhysicalParameters {
    fn from(file: ParameterFile) -> Self {
        Self {
            source_distance: file.source.distance,
            baseline_flux: file.source.flux,
            source_velocity: file.source.velocity,
            lens_mass: file.lens.mass,
            lens_distance: file.lens.distance,
            impact_parameter: file.lens.impact_parameter,
            peak_time: file.lens.t0,
        }
    }
}

impl From<PhysicalParameters> for ParameterFile {
    fn from(params: PhysicalParameters) -> Self {
        Self {
            source: PointSourceSection {
                distance: params.source_distance,
                flux: params.baseline_flux,
                velocity: params.source_velocity,
            },
            lens: PointLensSection {
                mass: params.lens_mass,
                distance: params.lens_distance,
                impact_parameter: params.impact_parameter,
                t0: params.peak_time,
            },
        }
    }
}
