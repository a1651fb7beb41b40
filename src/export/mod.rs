//! Output collaborators of the numeric pipeline
//!
//! Everything here consumes already computed [LightCurve] and [Frame] values. Failures are reported
//! as [ExportError] and never invalidate the numeric results.

use crate::error::ExportError;
use crate::float_trait::Float;
use crate::light_curve::{Frame, LightCurve};

use log::info;
use std::path::PathBuf;

mod csv_writer;
pub use csv_writer::{CsvFrameWriter, write_light_curve_csv};

mod output_dir;
pub use output_dir::OutputDirectory;

mod png;
pub use png::{PngFrameRenderer, PngLayout, write_summary_png};

mod video;
pub use video::{FfmpegAssembler, VideoAssembler, VideoSettings};

/// Writes one artifact per frame
pub trait FrameRenderer<T: Float> {
    /// Render `frame` together with the static `curve`, returns the written path
    fn render(&mut self, curve: &LightCurve<T>, frame: &Frame<T>) -> Result<PathBuf, ExportError>;
}

/// Render frames in index order, stops at the first failure
pub fn export_frames<T, R>(
    renderer: &mut R,
    curve: &LightCurve<T>,
    frames: &[Frame<T>],
) -> Result<Vec<PathBuf>, ExportError>
where
    T: Float,
    R: FrameRenderer<T> + ?Sized,
{
    let paths = frames
        .iter()
        .map(|frame| renderer.render(curve, frame))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Exported {} frames", paths.len());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    struct FailingRenderer {
        fail_at: usize,
        rendered: Vec<usize>,
    }

    impl FrameRenderer<f64> for FailingRenderer {
        fn render(
            &mut self,
            _curve: &LightCurve<f64>,
            frame: &Frame<f64>,
        ) -> Result<PathBuf, ExportError> {
            if frame.index == self.fail_at {
                return Err(ExportError::MissingDirectory(PathBuf::from("gone")));
            }
            self.rendered.push(frame.index);
            Ok(PathBuf::from(format!("{:03}", frame.index)))
        }
    }

    #[test]
    fn export_stops_at_first_failure_and_keeps_results() {
        let simulation = small_simulation();
        let mut renderer = FailingRenderer {
            fail_at: 3,
            rendered: vec![],
        };
        let result = export_frames(&mut renderer, &simulation.light_curve, &simulation.frames);
        assert!(matches!(result, Err(ExportError::MissingDirectory(_))));
        assert_eq!(renderer.rendered, vec![1, 2]);
        // Numeric results are untouched by the export failure
        assert_eq!(simulation.frames.len(), 5);
        assert!(simulation.light_curve.peak().is_some());
    }

    #[test]
    fn export_renders_in_index_order() {
        let simulation = small_simulation();
        let mut renderer = FailingRenderer {
            fail_at: usize::MAX,
            rendered: vec![],
        };
        let paths = export_frames(&mut renderer, &simulation.light_curve, &simulation.frames).unwrap();
        assert_eq!(renderer.rendered, vec![1, 2, 3, 4, 5]);
        assert_eq!(paths[0], PathBuf::from("001"));
    }
}
