use crate::error::ExportError;
use crate::export::{FrameRenderer, OutputDirectory};
use crate::float_trait::Float;
use crate::images::ImageKind;
use crate::light_curve::{Frame, LightCurve};

use itertools::izip;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Serialize)]
struct LightCurveRow<T> {
    t: T,
    normalized_time: T,
    y1: T,
    y2: T,
    x1_plus: T,
    x2_plus: T,
    x1_minus: T,
    x2_minus: T,
    magnification: T,
}

/// Write the dense light curve as CSV with a header row
pub fn write_light_curve_csv<T, W>(curve: &LightCurve<T>, writer: W) -> Result<(), ExportError>
where
    T: Float,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (&t, &y1, &y2, &x1_plus, &x2_plus, &x1_minus, &x2_minus, &magnification) in izip!(
        &curve.t,
        &curve.trajectory.y1,
        &curve.trajectory.y2,
        &curve.plus.x1,
        &curve.plus.x2,
        &curve.minus.x1,
        &curve.minus.x2,
        &curve.magnification,
    ) {
        csv_writer.serialize(LightCurveRow {
            t,
            normalized_time: y1,
            y1,
            y2,
            x1_plus,
            x2_plus,
            x1_minus,
            x2_minus,
            magnification,
        })?;
    }
    csv_writer.flush().map_err(ExportError::Flush)?;
    Ok(())
}

#[derive(Serialize)]
struct ContourRow<T> {
    image: &'static str,
    x1: T,
    x2: T,
}

/// Writes image contours of every frame as `NNN.csv`
pub struct CsvFrameWriter {
    dir: OutputDirectory,
}

impl CsvFrameWriter {
    pub fn new(dir: OutputDirectory) -> Self {
        Self { dir }
    }
}

impl<T> FrameRenderer<T> for CsvFrameWriter
where
    T: Float,
{
    fn render(&mut self, _curve: &LightCurve<T>, frame: &Frame<T>) -> Result<PathBuf, ExportError> {
        let path = self.dir.frame_path(frame.index, "csv");
        let mut csv_writer = csv::Writer::from_path(&path)?;
        for kind in ImageKind::BOTH {
            for x in frame.contours.get(kind) {
                csv_writer.serialize(ContourRow {
                    image: kind.name(),
                    x1: x.x1,
                    x2: x.x2,
                })?;
            }
        }
        csv_writer.flush().map_err(ExportError::io(&path))?;
        Ok(path)
    }
}
