//! Loading recognized speech segments produced by an external recognizer.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::SpeechSegment;

/// Accepted on-disk shapes: a bare list, or a recognizer document with a
/// top-level `segments` array (Whisper's JSON output).
#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentDocument {
    List(Vec<SpeechSegment>),
    Recognizer { segments: Vec<SpeechSegment> },
}

/// Parse segments from JSON, keeping recognizer order.
///
/// Segments with blank text are dropped.
pub fn parse_segments_json(json: &str) -> Result<Vec<SpeechSegment>> {
    let doc: SegmentDocument =
        serde_json::from_str(json).context("Failed to parse speech segments JSON")?;
    let segments = match doc {
        SegmentDocument::List(s) => s,
        SegmentDocument::Recognizer { segments } => segments,
    };

    let total = segments.len();
    let kept: Vec<SpeechSegment> = segments
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .collect();
    if kept.len() < total {
        log::debug!("Skipped {} blank speech segment(s)", total - kept.len());
    }
    if kept.windows(2).any(|pair| pair[1].start < pair[0].start) {
        log::warn!("Speech segments are not ordered by start time; using them as given");
    }

    Ok(kept)
}

/// Read segments from a JSON file.
pub fn load_segments(path: &Path) -> Result<Vec<SpeechSegment>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read segments: {}", path.display()))?;
    let segments = parse_segments_json(&data)
        .with_context(|| format!("Invalid segments file: {}", path.display()))?;
    log::info!("Loaded {} speech segments from {}", segments.len(), path.display());
    Ok(segments)
}
