//! Timeline reconciler: the last boundary always lands on the audio end.
//!
//! Only the final interval's end is corrected. Earlier intervals keep the
//! values their allocator produced, even when that leaves the last interval
//! unusually long or short.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::types::{AlignedLine, Discontinuity, Interval, Timeline};

/// Turn aligned lines into a timeline ending exactly at `audio_duration`.
pub fn reconcile(aligned: &[AlignedLine], audio_duration: f64) -> Result<Timeline> {
    let intervals = aligned
        .iter()
        .map(|a| Interval {
            line: a.line,
            start: a.start,
            end: a.end,
        })
        .collect();
    reconcile_timeline(Timeline::new(intervals), audio_duration)
}

/// Pin the last interval of an existing timeline to `audio_duration`.
///
/// Fails only on an empty timeline.
pub fn reconcile_timeline(mut timeline: Timeline, audio_duration: f64) -> Result<Timeline> {
    let Some(last) = timeline.last_mut() else {
        return Err(SyncError::EmptyScript);
    };

    let drift = audio_duration - last.end;
    last.end = audio_duration;
    if drift != 0.0 {
        log::debug!("Line {} end moved by {:+.3}s", last.line, drift);
    }
    if last.end <= last.start {
        log::warn!(
            "Line {} now ends at {:.3}s, not after its start at {:.3}s",
            last.line,
            last.end,
            last.start
        );
    }

    let gaps = timeline.gaps();
    if !gaps.is_empty() {
        log::warn!(
            "Timeline has {} discontinuities (first after line {}, {:+.3}s)",
            gaps.len(),
            gaps[0].after_line,
            gaps[0].delta
        );
    }

    Ok(timeline)
}

/// Diagnostic summary of how well a timeline fits the audio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineReport {
    /// Last end equals the audio duration bit-for-bit
    pub ends_exactly: bool,
    /// Start of the first interval
    pub start_offset: f64,
    /// Boundaries off by more than the tolerance
    pub discontinuities: Vec<Discontinuity>,
    /// Lines whose end is not after their start
    pub degenerate_lines: Vec<usize>,
}

impl TimelineReport {
    pub fn is_clean(&self) -> bool {
        self.ends_exactly && self.discontinuities.is_empty() && self.degenerate_lines.is_empty()
    }
}

/// Check a timeline against the audio duration.
///
/// `tolerance` only filters which discontinuities are reported; the
/// end-of-audio check is always exact.
pub fn validate(timeline: &Timeline, audio_duration: f64, tolerance: f64) -> TimelineReport {
    let mut discontinuities: Vec<Discontinuity> = timeline
        .gaps()
        .into_iter()
        .filter(|d| d.delta.abs() > tolerance)
        .collect();

    let start_offset = timeline.intervals().first().map(|iv| iv.start).unwrap_or(0.0);
    if start_offset.abs() > tolerance {
        discontinuities.insert(
            0,
            Discontinuity {
                after_line: 0,
                delta: start_offset,
            },
        );
    }

    let degenerate_lines = timeline
        .intervals()
        .iter()
        .filter(|iv| iv.end <= iv.start)
        .map(|iv| iv.line)
        .collect();

    TimelineReport {
        ends_exactly: timeline.end() == Some(audio_duration),
        start_offset,
        discontinuities,
        degenerate_lines,
    }
}
