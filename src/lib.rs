#![doc = include_str!("../README.md")]


pub mod constants;

mod error;
pub use error::{ConfigurationError, DomainError, ExportError, ParameterFileError, SimulationError};

pub mod export;
pub use export::{
    CsvFrameWriter, FfmpegAssembler, FrameRenderer, OutputDirectory, PngFrameRenderer, PngLayout,
    VideoAssembler, VideoSettings, export_frames, write_light_curve_csv, write_summary_png,
};

mod float_trait;
pub use float_trait::Float;

mod images;
pub use images::{
    BoundaryContours, ImageKind, ImagePair, ImagePosition, boundary_angles,
    finite_source_boundary_images, point_image, point_images,
};

mod lens_geometry;
pub use lens_geometry::{LensScale, einstein_cross_time, einstein_radius};

mod light_curve;
pub use light_curve::{Frame, ImageSeries, LightCurve, Simulation, SimulationConfig, build_frames};

mod magnification;
pub use magnification::{
    contour_area, contour_magnification, magnification, magnification_at_separation,
};

mod params;
pub use params::{ParameterFile, PhysicalParameters, PointLensSection, PointSourceSection};

mod trajectory;
pub use trajectory::{SourcePosition, SourceTrajectory, TimeGrid, source_position};

pub use ndarray;
