use crate::error::ExportError;

use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Assembles numbered frame images into a single video
pub trait VideoAssembler {
    /// Returns the path of the produced video
    fn assemble(&self, frames_dir: &Path) -> Result<PathBuf, ExportError>;
}

/// Encoder settings of [FfmpegAssembler]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VideoSettings {
    /// Encoder executable, looked up in `PATH`
    pub program: String,
    /// Input frames per second
    pub framerate: u32,
    /// Output frames per second
    pub output_rate: u32,
    pub codec: String,
    pub pixel_format: String,
    pub output: PathBuf,
    /// Replace an existing output file
    pub overwrite: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".into(),
            framerate: 20,
            output_rate: 30,
            codec: "libx264".into(),
            pixel_format: "yuv420p".into(),
            output: PathBuf::from("animation.mp4"),
            overwrite: true,
        }
    }
}

/// Runs an external `ffmpeg` process over `NNN.png` frames
#[derive(Clone, Debug, Default)]
pub struct FfmpegAssembler {
    pub settings: VideoSettings,
}

impl FfmpegAssembler {
    pub fn new(settings: VideoSettings) -> Self {
        Self { settings }
    }

    fn command(&self, frames_dir: &Path) -> Command {
        let settings = &self.settings;
        let mut cmd = Command::new(&settings.program);
        cmd.arg(if settings.overwrite { "-y" } else { "-n" })
            .args(["-loglevel", "error"])
            .arg("-framerate")
            .arg(settings.framerate.to_string())
            .args(["-pattern_type", "glob", "-i"])
            .arg(frames_dir.join("*.png"))
            .arg("-c:v")
            .arg(&settings.codec)
            .arg("-r")
            .arg(settings.output_rate.to_string())
            .arg("-pix_fmt")
            .arg(&settings.pixel_format)
            .arg(&settings.output)
            .stdin(Stdio::null());
        cmd
    }
}

impl VideoAssembler for FfmpegAssembler {
    fn assemble(&self, frames_dir: &Path) -> Result<PathBuf, ExportError> {
        let program = &self.settings.program;
        let status = self.command(frames_dir).status().map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ExportError::EncoderUnavailable {
                    program: program.clone(),
                    source,
                }
            } else {
                ExportError::Io {
                    path: PathBuf::from(program),
                    source,
                }
            }
        })?;
        if !status.success() {
            return Err(ExportError::EncoderFailed {
                program: program.clone(),
                status,
            });
        }
        info!("Video written to {}", self.settings.output.display());
        Ok(self.settings.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_follows_settings() {
        let assembler = FfmpegAssembler::default();
        let cmd = assembler.command(Path::new("images"));
        assert_eq!(cmd.get_program(), "ffmpeg");
        let args: Vec<_> = cmd
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-y",
                "-loglevel",
                "error",
                "-framerate",
                "20",
                "-pattern_type",
                "glob",
                "-i",
                "images/*.png",
                "-c:v",
                "libx264",
                "-r",
                "30",
                "-pix_fmt",
                "yuv420p",
                "animation.mp4",
            ]
        );
    }

    #[test]
    fn settings_from_partial_json() {
        let settings: VideoSettings =
            serde_json::from_str(r#"{"framerate": 10, "overwrite": false}"#).unwrap();
        assert_eq!(settings.framerate, 10);
        assert!(!settings.overwrite);
        assert_eq!(settings.program, "ffmpeg");
    }

    #[test]
    fn missing_encoder_is_reported() {
        let assembler = FfmpegAssembler::new(VideoSettings {
            program: "microlensing-no-such-encoder".into(),
            ..VideoSettings::default()
        });
        let err = assembler.assemble(Path::new("images")).unwrap_err();
        assert!(matches!(err, ExportError::EncoderUnavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_encoder_is_reported() {
        let assembler = FfmpegAssembler::new(VideoSettings {
            program: "false".into(),
            ..VideoSettings::default()
        });
        let err = assembler.assemble(Path::new("images")).unwrap_err();
        assert!(matches!(err, ExportError::EncoderFailed { .. }));
    }
}
