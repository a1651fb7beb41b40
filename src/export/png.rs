use crate::error::ExportError;
use crate::export::{FrameRenderer, OutputDirectory};
use crate::float_trait::Float;
use crate::images::{ImageKind, ImagePosition};
use crate::light_curve::{Frame, LightCurve};

use itertools::Itertools;
use log::info;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

type PlotResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const GOLD: RGBColor = RGBColor(255, 215, 0);
const CORNFLOWER_BLUE: RGBColor = RGBColor(100, 149, 237);
const SOURCE_TRAJECTORY_COLOR: RGBColor = RGBColor(31, 119, 180);
const PLUS_TRAJECTORY_COLOR: RGBColor = RGBColor(255, 127, 14);
const MINUS_TRAJECTORY_COLOR: RGBColor = RGBColor(44, 160, 44);

const LENS_MARKER_SIZE: i32 = 8;
const SAMPLE_MARKER_SIZE: i32 = 6;

/// Panel sizes and lens-plane windows of the PNG output
#[derive(Clone, Debug, PartialEq)]
pub struct PngLayout {
    /// Size of each of the two square panels, pixels
    pub panel_size: u32,
    /// Lens-plane window of a frame in Einstein radii, `[x1_min, x1_max, x2_min, x2_max]`
    pub lens_plane: [f64; 4],
    /// Lens-plane window of the summary figure
    pub summary_lens_plane: [f64; 4],
}

impl Default for PngLayout {
    fn default() -> Self {
        Self {
            panel_size: 600,
            lens_plane: [-2.5, 2.5, -2.3, 2.7],
            summary_lens_plane: [-2.0, 2.0, -1.8, 2.2],
        }
    }
}

fn is_inside([x_min, x_max, y_min, y_max]: [f64; 4], (x, y): (f64, f64)) -> bool {
    (x_min..=x_max).contains(&x) && (y_min..=y_max).contains(&y)
}

/// Split a polyline into runs of consecutive points inside the window
fn visible_runs(
    window: [f64; 4],
    points: impl IntoIterator<Item = (f64, f64)>,
) -> Vec<Vec<(f64, f64)>> {
    let mut runs = vec![];
    let mut run = vec![];
    for point in points {
        if is_inside(window, point) {
            run.push(point);
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

/// Contour points with the first point repeated at the end
fn closed_contour<T: Float>(contour: &[ImagePosition<T>]) -> Vec<(f64, f64)> {
    contour
        .iter()
        .chain(contour.first())
        .map(|x| (x.x1.into_double(), x.x2.into_double()))
        .collect()
}

fn einstein_ring() -> Vec<(f64, f64)> {
    (0..=720)
        .map(|i| {
            let phi = std::f64::consts::TAU * f64::from(i) / 720.0;
            (phi.cos(), phi.sin())
        })
        .collect()
}

fn light_curve_points<T: Float>(curve: &LightCurve<T>) -> Vec<(f64, f64)> {
    curve
        .normalized_time()
        .iter()
        .zip(curve.magnification.iter())
        .map(|(x, a)| (x.into_double(), a.into_double()))
        .collect()
}

/// Axis ranges of the light-curve panel, magnification gets a 5% margin
fn light_curve_window(points: &[(f64, f64)]) -> [f64; 4] {
    let (x_min, x_max) = points
        .iter()
        .map(|&(x, _)| x)
        .minmax_by(f64::total_cmp)
        .into_option()
        .unwrap_or((-1.0, 1.0));
    let (y_min, y_max) = points
        .iter()
        .map(|&(_, y)| y)
        .minmax_by(f64::total_cmp)
        .into_option()
        .unwrap_or((0.0, 1.0));
    let margin = 0.05 * (y_max - y_min).max(f64::EPSILON);
    [x_min, x_max, y_min - margin, y_max + margin]
}

/// Rainbow color of the i-th of n frames, violet to red
fn frame_color(i: usize, n: usize) -> HSLColor {
    let fraction = if n > 1 {
        i as f64 / (n - 1) as f64
    } else {
        0.0
    };
    HSLColor(0.8 * (1.0 - fraction), 1.0, 0.5)
}

/// Two-panel PNG per frame: the lens plane and the light curve
///
/// Left panel shows the Einstein ring, the lens and both image contours of the finite source.
/// Right panel shows the magnification against $(t - t_0) / t_E$ with the current frame marked.
/// Axis descriptions are rendered only with the `ttf` feature.
pub struct PngFrameRenderer {
    dir: OutputDirectory,
    layout: PngLayout,
}

impl PngFrameRenderer {
    pub fn new(dir: OutputDirectory, layout: PngLayout) -> Self {
        Self { dir, layout }
    }

    fn draw<T: Float>(&self, path: &Path, curve: &LightCurve<T>, frame: &Frame<T>) -> PlotResult {
        let size = self.layout.panel_size;
        let root = BitMapBackend::new(path, (2 * size, size)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));

        let window = self.layout.lens_plane;
        let [x_min, x_max, y_min, y_max] = window;
        let mut lens_plane = ChartBuilder::on(&panels[0])
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        lens_plane
            .configure_mesh()
            .disable_mesh()
            .x_desc("x1")
            .y_desc("x2")
            .draw()?;
        for run in visible_runs(window, einstein_ring()) {
            lens_plane.draw_series(LineSeries::new(run, &BLACK))?;
        }
        for kind in ImageKind::BOTH {
            for run in visible_runs(window, closed_contour(frame.contours.get(kind))) {
                lens_plane.draw_series(LineSeries::new(run, CORNFLOWER_BLUE.stroke_width(2)))?;
            }
        }
        lens_plane.draw_series(std::iter::once(Circle::new(
            (0.0, 0.0),
            LENS_MARKER_SIZE,
            GOLD.filled(),
        )))?;

        let points = light_curve_points(curve);
        let [t_min, t_max, a_min, a_max] = light_curve_window(&points);
        let mut light_curve = ChartBuilder::on(&panels[1])
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(t_min..t_max, a_min..a_max)?;
        light_curve
            .configure_mesh()
            .disable_mesh()
            .x_desc("(t-t0)/tE")
            .y_desc("A(t)")
            .draw()?;
        light_curve.draw_series(LineSeries::new(points, &BLACK))?;
        light_curve.draw_series(std::iter::once(Circle::new(
            (
                frame.source.y1.into_double(),
                frame.magnification.into_double(),
            ),
            SAMPLE_MARKER_SIZE,
            CORNFLOWER_BLUE.filled(),
        )))?;

        root.present()?;
        Ok(())
    }
}

impl<T> FrameRenderer<T> for PngFrameRenderer
where
    T: Float,
{
    fn render(&mut self, curve: &LightCurve<T>, frame: &Frame<T>) -> Result<PathBuf, ExportError> {
        let path = self.dir.frame_path(frame.index, "png");
        self.draw(&path, curve, frame)
            .map_err(ExportError::plot(&path))?;
        Ok(path)
    }
}

fn draw_summary<T: Float>(
    path: &Path,
    curve: &LightCurve<T>,
    frames: &[Frame<T>],
    layout: &PngLayout,
) -> PlotResult {
    let size = layout.panel_size;
    let root = BitMapBackend::new(path, (2 * size, size)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let window = layout.summary_lens_plane;
    let [x_min, x_max, y_min, y_max] = window;
    let mut lens_plane = ChartBuilder::on(&panels[0])
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    lens_plane
        .configure_mesh()
        .disable_mesh()
        .x_desc("x1")
        .y_desc("x2")
        .draw()?;

    let trajectories = [
        (
            "source trajectory",
            SOURCE_TRAJECTORY_COLOR,
            curve
                .trajectory
                .y1
                .iter()
                .copied()
                .zip(curve.trajectory.y2.iter().copied())
                .collect_vec(),
        ),
        (
            "image x+",
            PLUS_TRAJECTORY_COLOR,
            curve.plus.x1.iter().copied().zip(curve.plus.x2.iter().copied()).collect_vec(),
        ),
        (
            "image x-",
            MINUS_TRAJECTORY_COLOR,
            curve.minus.x1.iter().copied().zip(curve.minus.x2.iter().copied()).collect_vec(),
        ),
    ];
    for (label, color, points) in trajectories {
        let points = points
            .into_iter()
            .map(|(x, y)| (x.into_double(), y.into_double()));
        for (i, run) in visible_runs(window, points).into_iter().enumerate() {
            let series = lens_plane.draw_series(LineSeries::new(run, &color))?;
            if i == 0 {
                series
                    .label(label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
    }

    for (i, frame) in frames.iter().enumerate() {
        let color = frame_color(i, frames.len());
        for kind in ImageKind::BOTH {
            for run in visible_runs(window, closed_contour(frame.contours.get(kind))) {
                lens_plane.draw_series(LineSeries::new(run, color.stroke_width(2)))?;
            }
        }
    }
    for run in visible_runs(window, einstein_ring()) {
        lens_plane.draw_series(LineSeries::new(run, &BLACK))?;
    }
    lens_plane.draw_series(std::iter::once(Circle::new(
        (0.0, 0.0),
        LENS_MARKER_SIZE,
        GOLD.filled(),
    )))?;
    lens_plane
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let points = light_curve_points(curve);
    let [t_min, t_max, a_min, a_max] = light_curve_window(&points);
    let mut light_curve = ChartBuilder::on(&panels[1])
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(t_min..t_max, a_min..a_max)?;
    light_curve
        .configure_mesh()
        .disable_mesh()
        .x_desc("(t-t0)/tE")
        .y_desc("A(t)")
        .draw()?;
    light_curve.draw_series(LineSeries::new(points, &BLACK))?;
    light_curve.draw_series(frames.iter().enumerate().map(|(i, frame)| {
        Circle::new(
            (
                frame.source.y1.into_double(),
                frame.magnification.into_double(),
            ),
            SAMPLE_MARKER_SIZE,
            frame_color(i, frames.len()).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Summary figure of a whole run
///
/// Left panel shows the source and image trajectories, the image contours of every frame in
/// rainbow colors, the Einstein ring and the lens. Right panel shows the light curve with every
/// frame sample marked in the same colors.
pub fn write_summary_png<T>(
    path: impl AsRef<Path>,
    curve: &LightCurve<T>,
    frames: &[Frame<T>],
    layout: &PngLayout,
) -> Result<(), ExportError>
where
    T: Float,
{
    let path = path.as_ref();
    draw_summary(path, curve, frames, layout).map_err(ExportError::plot(path))?;
    info!("Summary figure written to {}", path.display());
    Ok(())
}
