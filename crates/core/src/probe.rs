//! Audio duration sources.
//!
//! The synchronizer never decodes audio itself; it takes a duration in
//! seconds from one of these:
//! - FixedDuration: a value already known to the caller
//! - FfprobeDuration: asks `ffprobe` for the container duration

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Something that can report an audio asset's length in seconds.
pub trait DurationSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Total duration of `audio` in seconds.
    fn measure(&self, audio: &Path) -> Result<f64>;
}

/// A duration supplied up front; the path is ignored.
#[derive(Debug, Clone, Copy)]
pub struct FixedDuration(pub f64);

impl DurationSource for FixedDuration {
    fn name(&self) -> &str {
        "fixed"
    }

    fn measure(&self, _audio: &Path) -> Result<f64> {
        check_measured(self.0)
    }
}

/// Runs `ffprobe` and reads `format=duration`.
#[derive(Debug, Clone)]
pub struct FfprobeDuration {
    pub binary: String,
}

impl FfprobeDuration {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl DurationSource for FfprobeDuration {
    fn name(&self) -> &str {
        "ffprobe"
    }

    fn measure(&self, audio: &Path) -> Result<f64> {
        if !audio.exists() {
            bail!("Audio file not found: {}", audio.display());
        }

        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(audio)
            .output()
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            bail!(
                "{} failed on {}: {}",
                self.binary,
                audio.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let seconds = parse_duration_output(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("Unreadable duration for {}", audio.display()))?;
        log::info!("Audio duration: {:.3}s ({})", seconds, audio.display());
        Ok(seconds)
    }
}

/// Parse ffprobe's bare `format=duration` output.
pub fn parse_duration_output(stdout: &str) -> Result<f64> {
    let text = stdout.trim();
    let seconds: f64 = text
        .parse()
        .with_context(|| format!("Not a duration: '{}'", text))?;
    check_measured(seconds)
}

fn check_measured(seconds: f64) -> Result<f64> {
    crate::error::ensure_duration(seconds)?;
    Ok(seconds)
}

/// Get a duration source by name.
///
/// Sources:
/// - "ffprobe": probe the file with ffprobe on PATH.
pub fn get_duration_source(name: &str) -> Result<Box<dyn DurationSource>> {
    match name {
        "ffprobe" => Ok(Box::new(FfprobeDuration::default())),
        _ => bail!("Unknown duration source: '{}'. Available: ffprobe", name),
    }
}
