use light_curve_microlensing::{
    CsvFrameWriter, ExportError, FfmpegAssembler, Frame, FrameRenderer, LightCurve,
    OutputDirectory, PhysicalParameters, PngFrameRenderer, PngLayout, Simulation, SimulationConfig,
    VideoAssembler, VideoSettings, export_frames, write_light_curve_csv, write_summary_png,
};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FrameFormat {
    /// Two-panel PNG images
    Png,
    /// Image contour coordinates
    Csv,
}

/// Simulate a single-lens microlensing event and render its frames
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Parameter file with "point source" and "point lens" sections
    #[arg(default_value = "INPUT.json")]
    params: PathBuf,

    /// JSON file with sampling settings, missing fields take default values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the JSON schema of the sampling settings and exit
    #[arg(long)]
    print_config_schema: bool,

    /// Directory for the frame files
    #[arg(short, long, default_value = "images")]
    output_dir: PathBuf,

    /// Create the output directory if it doesn't exist
    #[arg(long)]
    create_dirs: bool,

    #[arg(long, value_enum, default_value_t = FrameFormat::Png)]
    format: FrameFormat,

    /// Assemble PNG frames into a video with ffmpeg
    #[arg(long)]
    video: bool,

    /// Output video path
    #[arg(long, default_value = "animation.mp4")]
    video_output: PathBuf,

    /// Dense light curve table
    #[arg(long, default_value = "light_curve.csv")]
    curve_csv: PathBuf,

    /// Size of each PNG panel, pixels
    #[arg(long, default_value_t = 600)]
    panel_size: u32,

    /// Summary figure with all frames overlaid
    #[arg(long, default_value = "Microlensing_full.png")]
    summary: PathBuf,

    /// Don't draw the summary figure
    #[arg(long)]
    no_summary: bool,

    /// Hide the frame progress bar
    #[arg(long)]
    quiet: bool,
}

/// Advances a progress bar after every rendered frame
struct ProgressRenderer {
    inner: Box<dyn FrameRenderer<f64>>,
    pb: ProgressBar,
}

impl FrameRenderer<f64> for ProgressRenderer {
    fn render(
        &mut self,
        curve: &LightCurve<f64>,
        frame: &Frame<f64>,
    ) -> Result<PathBuf, ExportError> {
        let path = self.inner.render(curve, frame)?;
        self.pb.inc(1);
        Ok(path)
    }
}

fn progress_bar(args: &Args, len: usize) -> anyhow::Result<ProgressBar> {
    if args.quiet {
        return Ok(ProgressBar::hidden());
    }
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
        .progress_chars("█▉▊▋▌▍▎▏ ");
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    pb.set_message("Rendering frames");
    Ok(pb)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let config: SimulationConfig = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("cannot parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn write_curve(simulation: &Simulation<f64>, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_light_curve_csv(&simulation.light_curve, BufWriter::new(file))?;
    info!("Light curve written to {}", path.display());
    Ok(())
}

fn export(args: &Args, simulation: &Simulation<f64>) -> anyhow::Result<()> {
    let dir = OutputDirectory::prepare(&args.output_dir, args.create_dirs)?;
    let layout = PngLayout {
        panel_size: args.panel_size,
        ..PngLayout::default()
    };
    let inner: Box<dyn FrameRenderer<f64>> = match args.format {
        FrameFormat::Png => Box::new(PngFrameRenderer::new(dir.clone(), layout.clone())),
        FrameFormat::Csv => Box::new(CsvFrameWriter::new(dir.clone())),
    };
    let mut renderer = ProgressRenderer {
        inner,
        pb: progress_bar(args, simulation.frames.len())?,
    };
    let exported = export_frames(&mut renderer, &simulation.light_curve, &simulation.frames);
    renderer.pb.finish_with_message("Frames rendered");
    exported?;

    if !args.no_summary {
        write_summary_png(
            &args.summary,
            &simulation.light_curve,
            &simulation.frames,
            &layout,
        )?;
    }

    if args.video {
        if args.format != FrameFormat::Png {
            warn!("Video requires PNG frames, skipping it");
            return Ok(());
        }
        let assembler = FfmpegAssembler::new(VideoSettings {
            output: args.video_output.clone(),
            ..VideoSettings::default()
        });
        assembler.assemble(dir.path())?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.print_config_schema {
        let schema = schemars::schema_for!(SimulationConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let params = PhysicalParameters::from_json_file(&args.params)
        .with_context(|| format!("invalid parameter file {}", args.params.display()))?;
    let config = load_config(args.config.as_deref())?;

    let simulation: Simulation<f64> = Simulation::run(&params, &config)?;
    info!(
        "Einstein radius {:.4e} arcsec, crossing time {:.4} days",
        simulation.scale.einstein_radius(),
        simulation.scale.crossing_time(),
    );
    if let Some((t, a)) = simulation.light_curve.peak() {
        info!("Peak magnification {a:.4} at t = {t:.4} days");
    }

    write_curve(&simulation, &args.curve_csv)?;

    // Numeric outputs are complete at this point
    if let Err(err) = export(&args, &simulation) {
        error!("Export failed: {err:#}");
        bail!("{} frames computed, export failed", simulation.frames.len());
    }
    Ok(())
}
