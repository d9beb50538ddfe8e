//! One synchronization run: script + audio duration in, timeline and clip
//! plan out.

use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::error::{ensure_duration, Result};
use crate::timeline::{align, allocate, check_line_count, reconcile};
use crate::types::{ClipPlan, ClipRequest, ScriptLine, SpeechSegment, Strategy, Timeline};
use crate::visual::schedule;

/// A reconciled timeline and the allocator that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncOutcome {
    pub strategy: Strategy,
    pub timeline: Timeline,
}

/// Runs the allocators with a fixed config.
///
/// Holds no mutable state; a single instance can serve runs on many threads.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Build the narration timeline.
    ///
    /// With `segments`, the line count is checked and the segment aligner
    /// runs; without, the word-count allocator does. Errors from the aligner
    /// path are returned as-is; switching to word counts is the caller's call.
    pub fn timeline(
        &self,
        lines: &[ScriptLine],
        audio_duration: f64,
        segments: Option<&[SpeechSegment]>,
    ) -> Result<SyncOutcome> {
        let (strategy, timeline) = match segments {
            Some(segments) => {
                ensure_duration(audio_duration)?;
                check_line_count(lines, self.config.expected_line_count)?;
                let aligned = align(lines, segments)?;
                (Strategy::Segments, reconcile(&aligned, audio_duration)?)
            }
            None => (Strategy::WordCount, allocate(lines, audio_duration)?),
        };

        log::info!(
            "Timeline: {} lines over {:.3}s ({})",
            timeline.len(),
            audio_duration,
            strategy
        );

        Ok(SyncOutcome { strategy, timeline })
    }

    /// Schedule visual clips against the same audio duration.
    pub fn clips(&self, clips: &[ClipRequest], audio_duration: f64) -> Result<ClipPlan> {
        schedule(clips, audio_duration, &self.config)
    }
}
