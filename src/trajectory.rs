use crate::error::ConfigurationError;
use crate::float_trait::Float;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Unlensed source position in Einstein radii
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct SourcePosition<T> {
    pub y1: T,
    pub y2: T,
}

impl<T> SourcePosition<T>
where
    T: Float,
{
    pub fn new(y1: T, y2: T) -> Self {
        Self { y1, y2 }
    }

    /// Angular separation from the lens
    #[inline]
    pub fn separation(&self) -> T {
        self.y1.hypot(self.y2)
    }

    /// Shift by `radius` in the direction of the polar angle `phi`
    #[inline]
    pub fn offset(&self, radius: T, phi: T) -> Self {
        let (sin, cos) = phi.sin_cos();
        Self::new(self.y1 + radius * cos, self.y2 + radius * sin)
    }
}

/// Source position at time `t`
///
/// `crossing_time` must be positive, it is validated together with the other lens parameters.
#[inline]
pub fn source_position<T>(
    t: T,
    peak_time: T,
    crossing_time: T,
    impact_parameter: T,
) -> SourcePosition<T>
where
    T: Float,
{
    SourcePosition::new((t - peak_time) / crossing_time, impact_parameter)
}

/// Strictly increasing equally spaced time instants around the peak
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct TimeGrid<T>(Array1<T>);

impl<T> TimeGrid<T>
where
    T: Float,
{
    /// `size` points spanning `peak_time ± half_width * crossing_time`
    pub fn around_peak(
        peak_time: T,
        crossing_time: T,
        half_width: T,
        size: usize,
    ) -> Result<Self, ConfigurationError> {
        ConfigurationError::check_positive("crossing time", crossing_time.into_double())?;
        ConfigurationError::check_positive("grid half width", half_width.into_double())?;
        ConfigurationError::check_finite("peak time", peak_time.into_double())?;
        ConfigurationError::check_size("grid size", size, 2)?;

        let t = Array1::linspace(-half_width, half_width, size)
            .mapv_into(|x| peak_time + x * crossing_time);
        Ok(Self(t))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, T> {
        self.0.view()
    }

    pub fn into_inner(self) -> Array1<T> {
        self.0
    }
}

/// Unlensed source positions sampled along a straight trajectory
///
/// Columnar: `y1[i]`, `y2[i]` is the position at the i-th time instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct SourceTrajectory<T> {
    pub y1: Array1<T>,
    pub y2: Array1<T>,
}

impl<T> SourceTrajectory<T>
where
    T: Float,
{
    /// Panics if `crossing_time` is not positive
    pub fn new(
        times: ArrayView1<'_, T>,
        peak_time: T,
        crossing_time: T,
        impact_parameter: T,
    ) -> Self {
        assert!(
            crossing_time.is_finite() && crossing_time > T::zero(),
            "crossing time must be a positive finite number"
        );
        let y1 = times.mapv(|t| (t - peak_time) / crossing_time);
        let y2 = Array1::from_elem(times.len(), impact_parameter);
        Self { y1, y2 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.y1.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y1.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<SourcePosition<T>> {
        Some(SourcePosition::new(*self.y1.get(i)?, *self.y2.get(i)?))
    }

    pub fn positions(&self) -> impl Iterator<Item = SourcePosition<T>> + '_ {
        self.y1
            .iter()
            .zip(self.y2.iter())
            .map(|(&y1, &y2)| SourcePosition::new(y1, y2))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use itertools::Itertools;
    use light_curve_common::all_close;

    #[test]
    fn trajectory_at_peak_time_is_impact_parameter() {
        let times = ndarray::arr1(&[-3.5_f64, 12.25, 17.0]);
        let trajectory = SourceTrajectory::new(times.view(), 12.25, 24.7, 0.1);
        let at_peak = trajectory.get(1).unwrap();
        assert_eq!(at_peak, SourcePosition::new(0.0, 0.1));
        assert!(trajectory.y2.iter().all(|&y2| y2 == 0.1));
    }

    #[test]
    fn trajectory_is_linear_in_time() {
        let times = ndarray::arr1(&[0.0_f64, 10.0, 20.0, 30.0]);
        let trajectory = SourceTrajectory::new(times.view(), 10.0, 5.0, -0.3);
        all_close(trajectory.y1.as_slice().unwrap(), &[-2.0, 0.0, 2.0, 4.0], 1e-12);
        assert_eq!(trajectory.len(), 4);
        assert_eq!(trajectory.positions().count(), 4);
    }

    #[test]
    #[should_panic(expected = "crossing time")]
    fn zero_crossing_time_panics() {
        let times = ndarray::arr1(&[0.0_f32]);
        let _ = SourceTrajectory::new(times.view(), 0.0, 0.0, 0.1);
    }

    #[test]
    fn scalar_position_matches_trajectory() {
        let p = source_position(30.0_f64, 10.0, 5.0, 0.2);
        assert_eq!(p, SourcePosition::new(4.0, 0.2));
        assert_relative_eq!(p.separation(), f64::hypot(4.0, 0.2));
    }

    #[test]
    fn offset_moves_along_polar_angle() {
        let p = SourcePosition::new(1.0_f64, 1.0).offset(0.5, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(p.y1, 1.0, epsilon = 1e-15);
        assert_relative_eq!(p.y2, 1.5, epsilon = 1e-15);
    }

    #[test]
    fn grid_spans_window_around_peak() {
        let grid = TimeGrid::around_peak(100.0_f64, 20.0, 8.0, 2000).unwrap();
        let t = grid.view();
        assert_eq!(grid.len(), 2000);
        assert_relative_eq!(t[0], 100.0 - 160.0, max_relative = 1e-12);
        assert_relative_eq!(t[1999], 100.0 + 160.0, max_relative = 1e-12);
        assert!(t.iter().tuple_windows().all(|(a, b)| b > a));
    }

    #[test]
    fn empty_times_give_empty_trajectory() {
        let times = ndarray::Array1::<f64>::zeros(0);
        let trajectory = SourceTrajectory::new(times.view(), 0.0, 1.0, 0.1);
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.get(0), None);

        let grid = TimeGrid::around_peak(0.0_f64, 1.0, 1.0, 2).unwrap();
        assert!(!grid.is_empty());
        let trajectory = SourceTrajectory::new(grid.view(), 0.0, 1.0, 0.1);
        assert!(!trajectory.is_empty());
    }

    #[test]
    fn grid_odd_size_contains_peak() {
        let grid = TimeGrid::around_peak(0.0_f64, 24.7, 2.0, 101).unwrap();
        assert_relative_eq!(grid.view()[50], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_rejects_degenerate_input() {
        assert!(matches!(
            TimeGrid::around_peak(0.0_f64, 0.0, 8.0, 10),
            Err(ConfigurationError::NonPositive { field: "crossing time", .. })
        ));
        assert!(matches!(
            TimeGrid::around_peak(0.0_f64, 1.0, 8.0, 1),
            Err(ConfigurationError::TooFewSamples { minimum: 2, .. })
        ));
        assert!(TimeGrid::around_peak(0.0_f64, 1.0, -1.0, 10).is_err());
    }
}
