use crate::float_trait::Float;

use std::path::PathBuf;

/// Invalid physical parameters or sampling configuration, detected before any sampling
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigurationError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error(
        "lens distance {lens_distance} kpc must be smaller than source distance {source_distance} kpc"
    )]
    LensBeyondSource {
        lens_distance: f64,
        source_distance: f64,
    },

    #[error("Einstein crossing time must be positive and finite, got {value} days")]
    DegenerateCrossingTime { value: f64 },

    #[error("{field} is {actual}, which is smaller than the minimum {minimum}")]
    TooFewSamples {
        field: &'static str,
        actual: usize,
        minimum: usize,
    },
}

impl ConfigurationError {
    pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            Err(Self::NonFinite { field })
        } else if value <= 0.0 {
            Err(Self::NonPositive { field, value })
        } else {
            Ok(value)
        }
    }

    pub(crate) fn check_finite(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { field })
        }
    }

    pub(crate) fn check_size(
        field: &'static str,
        actual: usize,
        minimum: usize,
    ) -> Result<usize, Self> {
        if actual < minimum {
            Err(Self::TooFewSamples {
                field,
                actual,
                minimum,
            })
        } else {
            Ok(actual)
        }
    }
}

/// Lens equation singularity hit during sampling
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DomainError {
    #[error(
        "source position ({y1}, {y2}) coincides with the lens: magnification is infinite and images are undefined"
    )]
    SourceOnLensAxis { y1: f64, y2: f64 },

    #[error("{quantity} at source position ({y1}, {y2}) is not representable as a finite number")]
    NotRepresentable {
        quantity: &'static str,
        y1: f64,
        y2: f64,
    },
}

impl DomainError {
    pub(crate) fn source_on_lens_axis<T: Float>(y1: T, y2: T) -> Self {
        Self::SourceOnLensAxis {
            y1: y1.into_double(),
            y2: y2.into_double(),
        }
    }

    pub(crate) fn not_representable<T: Float>(quantity: &'static str, y1: T, y2: T) -> Self {
        Self::NotRepresentable {
            quantity,
            y1: y1.into_double(),
            y2: y2.into_double(),
        }
    }
}

/// Error of the numeric pipeline, fatal for the run
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Error while loading a parameter or configuration file
#[derive(Debug, thiserror::Error)]
pub enum ParameterFileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Rendering or export collaborator failure
///
/// Never invalidates numeric series computed before the failure.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("output directory {0} does not exist and creating it is disabled")]
    MissingDirectory(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot draw {path}: {source}")]
    Plot {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot flush the light curve writer: {0}")]
    Flush(#[source] std::io::Error),

    #[error("video encoder {program} is unavailable: {source}")]
    EncoderUnavailable {
        program: String,
        source: std::io::Error,
    },

    #[error("video encoder {program} failed with {status}")]
    EncoderFailed {
        program: String,
        status: std::process::ExitStatus,
    },
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn plot(
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(Box<dyn std::error::Error + Send + Sync>) -> Self {
        let path = path.into();
        move |source| Self::Plot { path, source }
    }
}
