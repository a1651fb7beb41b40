use crate::error::{ConfigurationError, DomainError, SimulationError};
use crate::float_trait::Float;
use crate::images::{BoundaryContours, ImagePosition, point_images};
use crate::lens_geometry::LensScale;
use crate::magnification::{contour_magnification, magnification, magnification_at_separation};
use crate::params::PhysicalParameters;
use crate::trajectory::{SourcePosition, SourceTrajectory, TimeGrid, source_position};

use log::debug;
use ndarray::{Array1, Zip};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sampling settings of a simulation run
///
/// Half widths are in Einstein crossing times, the source radius is in Einstein radii.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SimulationConfig {
    /// Half width of the dense light-curve window
    pub curve_half_width: f64,
    /// Number of dense light-curve samples
    pub curve_samples: usize,
    /// Half width of the frame window
    pub frame_half_width: f64,
    /// Number of frames
    pub frame_count: usize,
    /// Radius of the finite source used for the frame contours
    pub source_radius: f64,
    /// Number of boundary points of the finite source
    pub boundary_resolution: usize,
}

impl SimulationConfig {
    pub fn default_curve_half_width() -> f64 {
        8.0
    }

    pub fn default_curve_samples() -> usize {
        2000
    }

    pub fn default_frame_half_width() -> f64 {
        2.0
    }

    pub fn default_frame_count() -> usize {
        100
    }

    pub fn default_source_radius() -> f64 {
        0.05
    }

    pub fn default_boundary_resolution() -> usize {
        360
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ConfigurationError::check_positive("curve half width", self.curve_half_width)?;
        ConfigurationError::check_size("curve samples", self.curve_samples, 2)?;
        ConfigurationError::check_positive("frame half width", self.frame_half_width)?;
        ConfigurationError::check_size("frame count", self.frame_count, 2)?;
        ConfigurationError::check_positive("source radius", self.source_radius)?;
        ConfigurationError::check_size("boundary resolution", self.boundary_resolution, 3)?;
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            curve_half_width: Self::default_curve_half_width(),
            curve_samples: Self::default_curve_samples(),
            frame_half_width: Self::default_frame_half_width(),
            frame_count: Self::default_frame_count(),
            source_radius: Self::default_source_radius(),
            boundary_resolution: Self::default_boundary_resolution(),
        }
    }
}

/// Columnar series of one image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct ImageSeries<T> {
    pub x1: Array1<T>,
    pub x2: Array1<T>,
}

impl<T> ImageSeries<T>
where
    T: Float,
{
    pub fn get(&self, i: usize) -> Option<ImagePosition<T>> {
        Some(ImagePosition::new(*self.x1.get(i)?, *self.x2.get(i)?))
    }
}

impl<T> FromIterator<ImagePosition<T>> for ImageSeries<T>
where
    T: Float,
{
    fn from_iter<I: IntoIterator<Item = ImagePosition<T>>>(iter: I) -> Self {
        let (x1, x2): (Vec<_>, Vec<_>) = iter.into_iter().map(|x| (x.x1, x.x2)).unzip();
        Self {
            x1: x1.into(),
            x2: x2.into(),
        }
    }
}

/// Dense light curve of a point source
///
/// Every series has the same length as the time grid `t`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct LightCurve<T> {
    pub scale: LensScale,
    pub peak_time: T,
    pub baseline_flux: T,
    pub t: Array1<T>,
    pub trajectory: SourceTrajectory<T>,
    pub plus: ImageSeries<T>,
    pub minus: ImageSeries<T>,
    pub magnification: Array1<T>,
}

impl<T> LightCurve<T>
where
    T: Float,
{
    /// Validate the inputs, compute the lens scale and sample the dense light curve
    pub fn build(
        params: &PhysicalParameters,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let scale = LensScale::from_parameters(params)?;
        Self::from_scale(
            params,
            &scale,
            T::from_double(config.curve_half_width),
            config.curve_samples,
        )
    }

    /// Sample `size` points on `peak_time ± half_width * crossing_time` with a precomputed scale
    pub fn from_scale(
        params: &PhysicalParameters,
        scale: &LensScale,
        half_width: T,
        size: usize,
    ) -> Result<Self, SimulationError> {
        let peak_time = T::from_double(params.peak_time);
        let crossing_time = T::from_double(scale.crossing_time());
        let baseline_flux = T::from_double(params.baseline_flux);

        let grid = TimeGrid::around_peak(peak_time, crossing_time, half_width, size)?;
        let trajectory = SourceTrajectory::new(
            grid.view(),
            peak_time,
            crossing_time,
            T::from_double(params.impact_parameter),
        );
        debug!("Sampling light curve at {} points", grid.len());

        // Fails on the first sample coinciding with the lens
        let pairs = trajectory
            .positions()
            .map(|position| point_images(&position))
            .collect::<Result<Vec<_>, _>>()?;
        let plus = pairs.iter().map(|pair| pair.plus).collect();
        let minus = pairs.iter().map(|pair| pair.minus).collect();
        let magnification = Zip::from(&trajectory.y1)
            .and(&trajectory.y2)
            .map_collect(|&y1, &y2| magnification_at_separation(y1.hypot(y2), baseline_flux));
        if let Some(i) = magnification.iter().position(|a| !a.is_finite()) {
            return Err(DomainError::not_representable(
                "magnification",
                trajectory.y1[i],
                trajectory.y2[i],
            )
            .into());
        }

        Ok(Self {
            scale: *scale,
            peak_time,
            baseline_flux,
            t: grid.into_inner(),
            trajectory,
            plus,
            minus,
            magnification,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Time in units of crossing time relative to the peak, $(t - t_0) / t_E$
    pub fn normalized_time(&self) -> &Array1<T> {
        &self.trajectory.y1
    }

    /// Index of the brightest sample, the earliest one on ties
    pub fn peak_index(&self) -> Option<usize> {
        self.magnification
            .iter()
            .enumerate()
            .fold(None, |brightest, (i, &a)| match brightest {
                Some((_, max)) if max >= a => brightest,
                _ => Some((i, a)),
            })
            .map(|(i, _)| i)
    }

    /// Time and magnification of the brightest sample
    pub fn peak(&self) -> Option<(T, T)> {
        let i = self.peak_index()?;
        Some((self.t[i], self.magnification[i]))
    }
}

/// Geometry and brightness at one frame instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Frame<T> {
    /// Frame number, starts from one
    pub index: usize,
    pub time: T,
    pub source: SourcePosition<T>,
    /// Point-source magnification at the source center
    pub magnification: T,
    /// Image contours of the finite source
    pub contours: BoundaryContours<T>,
    /// Contour-area magnification of the finite source, if the source doesn't cover the lens
    pub contour_magnification: Option<T>,
}

impl<T> Frame<T>
where
    T: Float,
{
    /// Evaluate one frame, `scale` must be computed from `params`
    pub fn at(
        index: usize,
        time: T,
        params: &PhysicalParameters,
        scale: &LensScale,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let baseline_flux = T::from_double(params.baseline_flux);
        let radius = T::from_double(config.source_radius);
        let source = source_position(
            time,
            T::from_double(params.peak_time),
            T::from_double(scale.crossing_time()),
            T::from_double(params.impact_parameter),
        );
        let magnification = magnification(&source, baseline_flux)?;
        let contours = BoundaryContours::new(&source, radius, config.boundary_resolution)?;
        let contour_magnification = contour_magnification(&contours, &source, radius, baseline_flux);
        Ok(Self {
            index,
            time,
            source,
            magnification,
            contours,
            contour_magnification,
        })
    }

    /// Evaluate all frames on the sparse grid in parallel, ordered by time
    pub fn build_all(
        params: &PhysicalParameters,
        scale: &LensScale,
        config: &SimulationConfig,
    ) -> Result<Vec<Self>, SimulationError> {
        config.validate()?;
        let grid = TimeGrid::around_peak(
            T::from_double(params.peak_time),
            T::from_double(scale.crossing_time()),
            T::from_double(config.frame_half_width),
            config.frame_count,
        )?;
        debug!(
            "Sampling {} frames with {} boundary points each",
            grid.len(),
            config.boundary_resolution
        );
        grid.into_inner()
            .to_vec()
            .into_par_iter()
            .enumerate()
            .map(|(i, time)| Self::at(i + 1, time, params, scale, config))
            .collect()
    }
}

/// Free-function form of [Frame::build_all]
pub fn build_frames<T>(
    params: &PhysicalParameters,
    scale: &LensScale,
    config: &SimulationConfig,
) -> Result<Vec<Frame<T>>, SimulationError>
where
    T: Float,
{
    Frame::build_all(params, scale, config)
}

/// Full numeric output of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Simulation<T> {
    pub params: PhysicalParameters,
    pub config: SimulationConfig,
    pub scale: LensScale,
    pub light_curve: LightCurve<T>,
    pub frames: Vec<Frame<T>>,
}

impl<T> Simulation<T>
where
    T: Float,
{
    /// Compute the lens scale once, then the dense light curve and the frames
    pub fn run(
        params: &PhysicalParameters,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let scale = LensScale::from_parameters(params)?;
        let light_curve = LightCurve::from_scale(
            params,
            &scale,
            T::from_double(config.curve_half_width),
            config.curve_samples,
        )?;
        let frames = Frame::build_all(params, &scale, config)?;
        Ok(Self {
            params: *params,
            config: config.clone(),
            scale,
            light_curve,
            frames,
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::*;
    use crate::images::ImageKind;

    use approx::assert_relative_eq;

    fn dense_config() -> SimulationConfig {
        SimulationConfig {
            curve_samples: 201,
            frame_count: 11,
            boundary_resolution: 36,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn default_config_follows_reference_run() {
        let config = SimulationConfig::default();
        assert_eq!(config.curve_samples, 2000);
        assert_eq!(config.frame_count, 100);
        assert_eq!(config.boundary_resolution, 360);
        assert_eq!(config.source_radius, 0.05);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn partial_config_file_uses_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"frame_count": 20}"#).unwrap();
        assert_eq!(config.frame_count, 20);
        assert_eq!(config.curve_half_width, 8.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig {
            boundary_resolution: 2,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            LightCurve::<f64>::build(&reference_parameters(), &config),
            Err(SimulationError::Configuration(
                ConfigurationError::TooFewSamples {
                    field: "boundary resolution",
                    ..
                }
            ))
        ));
    }

    #[test]
    fn light_curve_series_have_equal_length() {
        let curve = LightCurve::<f64>::build(&reference_parameters(), &dense_config()).unwrap();
        assert_eq!(curve.len(), 201);
        assert_eq!(curve.trajectory.len(), 201);
        assert_eq!(curve.plus.x1.len(), 201);
        assert_eq!(curve.minus.x2.len(), 201);
        assert_eq!(curve.magnification.len(), 201);
    }

    #[test]
    fn light_curve_peaks_at_peak_time() {
        let params = PhysicalParameters {
            peak_time: 2450000.0,
            ..reference_parameters()
        };
        let curve = LightCurve::<f64>::build(&params, &dense_config()).unwrap();
        let (t, a) = curve.peak().unwrap();
        assert_eq!(curve.peak_index(), Some(100));
        assert_relative_eq!(t, 2450000.0, epsilon = 1e-6);
        assert_relative_eq!(a, magnification_at_separation(0.1, 1.0), max_relative = 1e-6);
        assert_relative_eq!(curve.normalized_time()[0], -8.0, max_relative = 1e-9);
    }

    #[test]
    fn peak_index_prefers_earliest_sample() {
        let mut curve = LightCurve::<f64>::build(&reference_parameters(), &dense_config()).unwrap();
        curve.magnification.fill(1.0);
        assert_eq!(curve.peak_index(), Some(0));
        curve.magnification[150] = 2.0;
        curve.magnification[170] = 2.0;
        assert_eq!(curve.peak_index(), Some(150));
    }

    #[test]
    fn light_curve_is_symmetric() {
        let curve = LightCurve::<f64>::build(&reference_parameters(), &dense_config()).unwrap();
        let n = curve.len();
        for i in 0..n / 2 {
            assert_relative_eq!(
                curve.magnification[i],
                curve.magnification[n - 1 - i],
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn light_curve_images_match_point_images() {
        let curve = LightCurve::<f64>::build(&reference_parameters(), &dense_config()).unwrap();
        let i = 42;
        let pair = point_images(&curve.trajectory.get(i).unwrap()).unwrap();
        assert_eq!(curve.plus.get(i), Some(pair.plus));
        assert_eq!(curve.minus.get(i), Some(pair.minus));
    }

    #[test]
    fn light_curve_is_reproducible() {
        let a = LightCurve::<f32>::build(&reference_parameters(), &dense_config()).unwrap();
        let b = LightCurve::<f32>::build(&reference_parameters(), &dense_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_impact_parameter_through_lens_is_domain_error() {
        let params = PhysicalParameters {
            impact_parameter: 0.0,
            ..reference_parameters()
        };
        // Odd grid size puts a sample exactly on the peak
        let scale = LensScale::new(1e-3, 1.0).unwrap();
        assert!(matches!(
            LightCurve::<f64>::from_scale(&params, &scale, 2.0, 5),
            Err(SimulationError::Domain(_))
        ));
    }

    #[test]
    fn huge_impact_parameter_gives_unmagnified_curve() {
        let params = PhysicalParameters {
            impact_parameter: 1e160,
            ..reference_parameters()
        };
        let simulation = Simulation::<f64>::run(&params, &dense_config()).unwrap();
        for &a in simulation.light_curve.magnification.iter() {
            assert_relative_eq!(a, 1.0, max_relative = 1e-12);
        }
        for frame in &simulation.frames {
            assert_relative_eq!(frame.magnification, 1.0, max_relative = 1e-12);
            assert!(frame.contours.plus.iter().all(|x| x.x1.is_finite() && x.x2.is_finite()));
            assert!(frame.contour_magnification.is_none_or(|a| a.is_finite()));
        }
    }

    #[test]
    fn overflowing_magnification_aborts_light_curve() {
        let params = PhysicalParameters {
            impact_parameter: 1e-310,
            ..reference_parameters()
        };
        let scale = LensScale::new(1e-3, 1.0).unwrap();
        assert!(matches!(
            LightCurve::<f64>::from_scale(&params, &scale, 2.0, 5),
            Err(SimulationError::Domain(DomainError::NotRepresentable {
                quantity: "magnification",
                ..
            }))
        ));
    }

    #[test]
    fn lens_at_source_distance_aborts_run() {
        let params = PhysicalParameters {
            lens_distance: 8.0,
            ..reference_parameters()
        };
        assert!(matches!(
            Simulation::<f64>::run(&params, &dense_config()),
            Err(SimulationError::Configuration(
                ConfigurationError::LensBeyondSource { .. }
            ))
        ));
    }

    #[test]
    fn frames_are_ordered_and_indexed_from_one() {
        let params = reference_parameters();
        let scale = LensScale::from_parameters(&params).unwrap();
        let frames: Vec<Frame<f64>> = build_frames(&params, &scale, &dense_config()).unwrap();
        assert_eq!(frames.len(), 11);
        assert_eq!(frames[0].index, 1);
        assert_eq!(frames[10].index, 11);
        assert!(frames.windows(2).all(|w| w[1].time > w[0].time));
        assert_relative_eq!(frames[0].source.y1, -2.0, max_relative = 1e-9);
    }

    #[test]
    fn frame_has_contours_and_magnifications() {
        let params = reference_parameters();
        let scale = LensScale::from_parameters(&params).unwrap();
        let config = dense_config();
        let frame = Frame::<f64>::at(7, 0.0, &params, &scale, &config).unwrap();
        assert_eq!(frame.index, 7);
        assert_eq!(frame.source, SourcePosition::new(0.0, 0.1));
        assert_relative_eq!(frame.magnification, magnification_at_separation(0.1, 1.0));
        for kind in ImageKind::BOTH {
            assert_eq!(frame.contours.get(kind).len(), 36);
        }
        // The source disk doesn't cover the lens: separation 0.1 > radius 0.05
        let finite = frame.contour_magnification.unwrap();
        assert!(finite > 1.0);
    }

    #[test]
    fn simulation_reuses_single_scale() {
        let simulation = Simulation::<f64>::run(&reference_parameters(), &dense_config()).unwrap();
        assert_eq!(simulation.light_curve.scale, simulation.scale);
        assert_eq!(simulation.frames.len(), 11);
        assert_relative_eq!(simulation.scale.crossing_time(), 24.70567045932516, max_relative = 1e-9);
    }
}
