//! JSON artifacts handed to the renderer: the speech map and the clip plan.
//!
//! Values are written at full precision so they read back unchanged.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::sync::SyncOutcome;
use crate::types::{ClipPlanEntry, ClipRequest, ScriptLine, Strategy};

/// One script line with its time span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechMapLine {
    pub line: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Persisted narration timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechMap {
    pub audio_duration: f64,
    pub strategy: Strategy,
    pub lines: Vec<SpeechMapLine>,
}

impl SpeechMap {
    /// Pair each interval with its script line.
    pub fn new(lines: &[ScriptLine], outcome: &SyncOutcome, audio_duration: f64) -> Result<Self> {
        let intervals = outcome.timeline.intervals();
        if intervals.len() != lines.len() {
            bail!(
                "Timeline has {} intervals for {} script lines",
                intervals.len(),
                lines.len()
            );
        }

        let lines = lines
            .iter()
            .zip(intervals)
            .map(|(line, iv)| SpeechMapLine {
                line: iv.line,
                text: line.text.clone(),
                start: iv.start,
                end: iv.end,
                duration: iv.duration(),
            })
            .collect();

        Ok(Self {
            audio_duration,
            strategy: outcome.strategy,
            lines,
        })
    }
}

/// Write `value` as pretty JSON via temp file + rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, json.as_bytes())
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move output into {}", path.display()))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}: {}", what, path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse {}: {}", what, path.display()))
}

pub fn read_speech_map(path: &Path) -> Result<SpeechMap> {
    read_json(path, "speech map")
}

/// Clip plans are persisted as the flat list of entries.
pub fn read_clip_plan(path: &Path) -> Result<Vec<ClipPlanEntry>> {
    read_json(path, "clip plan")
}

/// Read the visual asset manifest: a list of `{asset, intent}`.
pub fn load_clip_requests(path: &Path) -> Result<Vec<ClipRequest>> {
    let clips: Vec<ClipRequest> = read_json(path, "clip manifest")?;
    log::info!("Loaded {} visual assets from {}", clips.len(), path.display());
    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::sync::Synchronizer;
    use crate::types::{Intent, Interval, Timeline};

    #[test]
    fn test_speech_map_from_outcome() {
        let lines = ScriptLine::numbered(&["one two three", "four"]);
        let outcome = Synchronizer::default().timeline(&lines, 7.0, None).unwrap();
        let map = SpeechMap::new(&lines, &outcome, 7.0).unwrap();

        assert_eq!(map.strategy, Strategy::WordCount);
        assert_eq!(map.lines.len(), 2);
        assert_eq!(map.lines[0].text, "one two three");
        assert_eq!(map.lines[1].end, 7.0);
        assert!((map.lines[0].duration - 5.25).abs() < 1e-9);
    }

    #[test]
    fn test_speech_map_rejects_count_mismatch() {
        let lines = ScriptLine::numbered(&["a", "b"]);
        let outcome = SyncOutcome {
            strategy: Strategy::Segments,
            timeline: Timeline::new(vec![Interval { line: 1, start: 0.0, end: 1.0 }]),
        };
        assert!(SpeechMap::new(&lines, &outcome, 1.0).is_err());
    }

    #[test]
    fn test_speech_map_file_keeps_full_precision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("speech_map.json");

        let lines = ScriptLine::numbered(&["a b c", "d e f g h", "i"]);
        let duration = 13.337_123_456_789;
        let outcome = Synchronizer::default().timeline(&lines, duration, None).unwrap();
        let map = SpeechMap::new(&lines, &outcome, duration).unwrap();

        write_json(&path, &map).unwrap();
        let back = read_speech_map(&path).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.lines[2].end, duration);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_clip_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip_plan.json");

        let sync = Synchronizer::new(SyncConfig::default()).unwrap();
        let clips = vec![
            ClipRequest::new("hook_static/door.jpg", Intent::Attention),
            ClipRequest::new("street_night.mp4", Intent::Neutral),
        ];
        let plan = sync.clips(&clips, 9.0).unwrap();
        write_json(&path, &plan.entries).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.is_array());
        assert_eq!(raw[0]["asset"], "hook_static/door.jpg");
        assert_eq!(raw[0]["boosted"], true);

        let entries = read_clip_plan(&path).unwrap();
        assert_eq!(entries, plan.entries);
    }

    #[test]
    fn test_load_clip_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clips.json");
        std::fs::write(
            &path,
            r#"[{"asset": "a.jpg", "intent": "attention"}, {"asset": "b.jpg"}]"#,
        )
        .unwrap();
        let clips = load_clip_requests(&path).unwrap();
        assert_eq!(clips[0].intent, Intent::Attention);
        assert_eq!(clips[1].intent, Intent::Neutral);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_speech_map(Path::new("/nonexistent/speech_map.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("speech map"));
    }
}
