//! Word-count allocator: each line gets time in proportion to its words.

use crate::error::{ensure_duration, Result, SyncError};
use crate::types::{Interval, ScriptLine, Timeline};

/// Split `audio_duration` across lines by word count.
///
/// Intervals are laid end to end from zero. The last interval's end is set
/// to `audio_duration` rather than the running cursor, so floating-point
/// drift never changes the total. Lines without words get a zero-length
/// interval at the cursor.
pub fn allocate(lines: &[ScriptLine], audio_duration: f64) -> Result<Timeline> {
    if lines.is_empty() {
        return Err(SyncError::EmptyScript);
    }
    ensure_duration(audio_duration)?;

    let word_counts: Vec<usize> = lines.iter().map(|l| l.word_count()).collect();
    let total_words: usize = word_counts.iter().sum();
    if total_words == 0 {
        return Err(SyncError::ZeroWords);
    }

    let mut intervals = Vec::with_capacity(lines.len());
    let mut cursor = 0.0;

    for (line, &words) in lines.iter().zip(&word_counts) {
        let share = (words as f64 / total_words as f64) * audio_duration;
        let start = cursor;
        let end = cursor + share;
        intervals.push(Interval {
            line: line.index,
            start,
            end,
        });
        cursor = end;
    }

    if let Some(last) = intervals.last_mut() {
        if last.end != audio_duration {
            log::debug!(
                "Word-count drift {:.3e}s absorbed by line {}",
                audio_duration - last.end,
                last.line
            );
        }
        last.end = audio_duration;
    }

    log::debug!(
        "Allocated {} lines ({} words) over {:.3}s",
        intervals.len(),
        total_words,
        audio_duration
    );

    Ok(Timeline::new(intervals))
}
