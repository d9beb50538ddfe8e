//! Narrasync CLI: narration timelines and clip plans for short-form video.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use narrasync_core::artifact::{load_clip_requests, write_json, SpeechMap};
use narrasync_core::probe::{get_duration_source, DurationSource, FixedDuration};
use narrasync_core::script::load_script;
use narrasync_core::timeline::validate;
use narrasync_core::transcript::load_segments;
use narrasync_core::types::{ClipPlan, ScriptLine, SpeechSegment};
use narrasync_core::{SyncConfig, SyncError, SyncOutcome, Synchronizer};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "narrasync",
    about = "Sync narration scripts and visual clips to the narration audio",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the per-line speech map
    Timeline(TimelineArgs),
    /// Schedule visual clip durations
    Clips(ClipsArgs),
    /// Build the speech map and the clip plan in one go
    Run(RunArgs),
}

// ─── Shared arguments (embedded in each subcommand) ──────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Narration audio (duration read with ffprobe)
    #[arg(long, conflicts_with = "duration", required_unless_present = "duration")]
    audio: Option<PathBuf>,

    /// Narration duration in seconds, instead of probing --audio
    #[arg(long)]
    duration: Option<f64>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct TimelineOpts {
    /// Script file, one spoken line per line
    #[arg(long, default_value = "script.txt")]
    script: PathBuf,

    /// Recognized speech segments (JSON list or Whisper output)
    #[arg(long)]
    segments: Option<PathBuf>,

    /// Line count required for segment alignment
    #[arg(long)]
    expected_lines: Option<usize>,

    /// Fall back to word counts when segment alignment is not possible
    #[arg(long, default_value_t = false)]
    fallback: bool,

    /// Speech map output path
    #[arg(long, default_value = "speech_map.json")]
    speech_map: PathBuf,
}

#[derive(Parser, Debug)]
struct ClipOpts {
    /// Visual asset manifest: JSON list of {asset, intent}
    #[arg(long)]
    manifest: PathBuf,

    /// Shortest regular clip in seconds (unbounded unless set, e.g. 3)
    #[arg(long)]
    min_clip: Option<f64>,

    /// Longest regular clip in seconds (unbounded unless set, e.g. 7)
    #[arg(long)]
    max_clip: Option<f64>,

    /// Clip plan output path
    #[arg(long, default_value = "clip_plan.json")]
    clip_plan: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Map script lines onto the narration audio")]
struct TimelineArgs {
    #[command(flatten)]
    shared: SharedArgs,

    #[command(flatten)]
    timeline: TimelineOpts,
}

#[derive(Parser, Debug)]
#[command(about = "Fit visual clip durations to the narration audio")]
struct ClipsArgs {
    #[command(flatten)]
    shared: SharedArgs,

    #[command(flatten)]
    clips: ClipOpts,
}

#[derive(Parser, Debug)]
#[command(about = "Speech map and clip plan from one duration measurement")]
struct RunArgs {
    #[command(flatten)]
    shared: SharedArgs,

    #[command(flatten)]
    timeline: TimelineOpts,

    #[command(flatten)]
    clips: ClipOpts,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Timeline(a) if a.shared.verbose => "debug",
        Command::Clips(a) if a.shared.verbose => "debug",
        Command::Run(a) if a.shared.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Timeline(args) => run_timeline(args),
        Command::Clips(args) => run_clips(args),
        Command::Run(args) => run_all(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Config file (or defaults) with command-line overrides applied.
fn build_config(
    shared: &SharedArgs,
    timeline: Option<&TimelineOpts>,
    clips: Option<&ClipOpts>,
) -> Result<SyncConfig> {
    let mut config = match &shared.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };

    if let Some(n) = timeline.and_then(|t| t.expected_lines) {
        config.expected_line_count = Some(n);
    }
    if let Some(opts) = clips {
        if let Some(min) = opts.min_clip {
            config.min_clip_seconds = Some(min);
        }
        if let Some(max) = opts.max_clip {
            config.max_clip_seconds = Some(max);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Narration duration from --duration or by probing --audio.
fn measure_duration(shared: &SharedArgs) -> Result<f64> {
    let source: Box<dyn DurationSource> = match shared.duration {
        Some(seconds) => Box::new(FixedDuration(seconds)),
        None => get_duration_source("ffprobe")?,
    };
    let audio = match (&shared.duration, &shared.audio) {
        (Some(_), _) => Path::new(""),
        (None, Some(audio)) => audio.as_path(),
        (None, None) => anyhow::bail!("Either --audio or --duration is required"),
    };
    source
        .measure(audio)
        .with_context(|| format!("Could not get narration duration ({})", source.name()))
}

/// Run the synchronizer, optionally dropping to word counts when the
/// segment path cannot be used.
fn build_timeline(
    sync: &Synchronizer,
    lines: &[ScriptLine],
    audio_duration: f64,
    segments: Option<&[SpeechSegment]>,
    fallback: bool,
) -> Result<SyncOutcome> {
    match sync.timeline(lines, audio_duration, segments) {
        Err(e @ (SyncError::NoSpeechDetected | SyncError::LineCountMismatch { .. }))
            if fallback && segments.is_some() =>
        {
            log::warn!("Segment alignment not possible ({}), using word counts", e);
            Ok(sync.timeline(lines, audio_duration, None)?)
        }
        other => Ok(other?),
    }
}

fn write_speech_map(
    sync: &Synchronizer,
    opts: &TimelineOpts,
    audio_duration: f64,
) -> Result<SpeechMap> {
    let lines = load_script(&opts.script)?;
    let segments = opts
        .segments
        .as_deref()
        .map(load_segments)
        .transpose()?;

    let outcome = build_timeline(
        sync,
        &lines,
        audio_duration,
        segments.as_deref(),
        opts.fallback,
    )
    .with_context(|| format!("Timeline failed for {}", opts.script.display()))?;

    let report = validate(&outcome.timeline, audio_duration, sync.config().timeline_tolerance);
    if !report.is_clean() {
        log::warn!(
            "Timeline report: {} discontinuities, degenerate lines {:?}",
            report.discontinuities.len(),
            report.degenerate_lines
        );
    }

    let map = SpeechMap::new(&lines, &outcome, audio_duration)?;
    write_json(&opts.speech_map, &map)?;
    log::info!(
        "Speech map written: {} ({} lines)",
        opts.speech_map.display(),
        map.lines.len()
    );
    Ok(map)
}

fn write_clip_plan(sync: &Synchronizer, opts: &ClipOpts, audio_duration: f64) -> Result<ClipPlan> {
    let clips = load_clip_requests(&opts.manifest)?;
    let plan = sync
        .clips(&clips, audio_duration)
        .with_context(|| format!("Clip scheduling failed for {}", opts.manifest.display()))?;
    write_json(&opts.clip_plan, &plan.entries)?;
    log::info!(
        "Clip plan written: {} ({} clips, {:.3}s)",
        opts.clip_plan.display(),
        plan.len(),
        plan.total()
    );
    Ok(plan)
}

// ─── Runners ─────────────────────────────────────────────────────

fn run_timeline(args: TimelineArgs) -> Result<()> {
    let config = build_config(&args.shared, Some(&args.timeline), None)?;
    let sync = Synchronizer::new(config)?;
    let duration = measure_duration(&args.shared)?;

    let map = write_speech_map(&sync, &args.timeline, duration)?;
    println!("Strategy: {}", map.strategy);
    println!("Output: {}", args.timeline.speech_map.display());
    Ok(())
}

fn run_clips(args: ClipsArgs) -> Result<()> {
    let config = build_config(&args.shared, None, Some(&args.clips))?;
    let sync = Synchronizer::new(config)?;
    let duration = measure_duration(&args.shared)?;

    write_clip_plan(&sync, &args.clips, duration)?;
    println!("Output: {}", args.clips.clip_plan.display());
    Ok(())
}

fn run_all(args: RunArgs) -> Result<()> {
    let config = build_config(&args.shared, Some(&args.timeline), Some(&args.clips))?;
    let sync = Synchronizer::new(config)?;
    let duration = measure_duration(&args.shared)?;

    let map = write_speech_map(&sync, &args.timeline, duration)?;
    write_clip_plan(&sync, &args.clips, duration)?;

    println!("Strategy: {}", map.strategy);
    println!("Speech map: {}", args.timeline.speech_map.display());
    println!("Clip plan: {}", args.clips.clip_plan.display());
    Ok(())
}
