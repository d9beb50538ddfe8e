//! Segment aligner: maps recognized speech segments onto script lines.
//!
//! Recognized segments rarely line up 1:1 with script lines. Each line
//! starts at the next unused segment and keeps absorbing following segments
//! until the recognized text is at least as long as the line's own text.
//! One forward cursor, no backtracking. Misheard words can shift boundaries;
//! this is a best-effort heuristic.

use crate::error::{Result, SyncError};
use crate::types::{AlignedLine, ScriptLine, SpeechSegment};

/// Reject scripts whose line count differs from the configured one.
pub fn check_line_count(lines: &[ScriptLine], expected: Option<usize>) -> Result<()> {
    match expected {
        Some(expected) if expected != lines.len() => Err(SyncError::LineCountMismatch {
            expected,
            actual: lines.len(),
        }),
        _ => Ok(()),
    }
}

/// Greedily align segments to lines.
///
/// Segments are consumed in the order given. When they run out before the
/// script does, the remaining lines reuse the last segment's end for both
/// boundaries. The result is not pinned to the audio duration; pass it
/// through [`super::reconcile`].
pub fn align(lines: &[ScriptLine], segments: &[SpeechSegment]) -> Result<Vec<AlignedLine>> {
    if lines.is_empty() {
        return Err(SyncError::EmptyScript);
    }
    let Some(last_segment) = segments.last() else {
        return Err(SyncError::NoSpeechDetected);
    };

    let mut aligned = Vec::with_capacity(lines.len());
    let mut exhausted = 0;
    let mut i = 0;

    for line in lines {
        let Some(first) = segments.get(i) else {
            aligned.push(AlignedLine::new(line.index, last_segment.end, last_segment.end));
            exhausted += 1;
            continue;
        };

        let start = first.start;
        let mut end = first.end;
        let target_len = line.text_len();
        let mut consumed_len = first.text_len();

        while consumed_len < target_len && i + 1 < segments.len() {
            i += 1;
            end = segments[i].end;
            consumed_len += segments[i].text_len();
        }

        aligned.push(AlignedLine::new(line.index, start, end));
        i += 1;
    }

    if exhausted > 0 {
        log::warn!(
            "Speech segments ran out: {} of {} lines pinned to {:.3}s",
            exhausted,
            lines.len(),
            last_segment.end
        );
    }
    if i < segments.len() {
        log::debug!(
            "{} trailing segment(s) left unassigned",
            segments.len() - i
        );
    }

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> SpeechSegment {
        SpeechSegment::new(start, end, text)
    }

    #[test]
    fn test_one_segment_per_line() {
        let lines = ScriptLine::numbered(&["a", "bb"]);
        let segments = vec![seg(0.0, 2.0, "a"), seg(2.0, 5.0, "bb")];
        let aligned = align(&lines, &segments).unwrap();
        assert_eq!(
            aligned,
            vec![AlignedLine::new(1, 0.0, 2.0), AlignedLine::new(2, 2.0, 5.0)]
        );
    }

    #[test]
    fn test_line_absorbs_split_segments() {
        let lines = ScriptLine::numbered(&["the car was still running", "nobody came"]);
        let segments = vec![
            seg(0.0, 1.1, " the car"),
            seg(1.2, 2.4, " was still"),
            seg(2.5, 3.0, " running now"),
            seg(3.4, 4.6, " nobody came"),
        ];
        let aligned = align(&lines, &segments).unwrap();
        assert_eq!(aligned[0].start, 0.0);
        assert_eq!(aligned[0].end, 3.0);
        assert!((aligned[0].duration - 3.0).abs() < 1e-12);
        assert_eq!(aligned[1].start, 3.4);
        assert_eq!(aligned[1].end, 4.6);
    }

    #[test]
    fn test_stops_once_recognized_text_is_long_enough() {
        // First segment already covers the line; the next one belongs to line 2.
        let lines = ScriptLine::numbered(&["hi", "there"]);
        let segments = vec![seg(0.0, 0.5, "hi you"), seg(0.6, 1.0, "there")];
        let aligned = align(&lines, &segments).unwrap();
        assert_eq!(aligned[0].end, 0.5);
        assert_eq!(aligned[1].start, 0.6);
    }

    #[test]
    fn test_exhausted_segments_reuse_last_end() {
        let lines = ScriptLine::numbered(&["first line", "second line", "third line"]);
        let segments = vec![seg(0.0, 1.0, "first"), seg(1.0, 2.5, "line")];
        let aligned = align(&lines, &segments).unwrap();

        assert_eq!(aligned.len(), 3);
        // Line 1 swallows both segments trying to reach its length.
        assert_eq!(aligned[0], AlignedLine::new(1, 0.0, 2.5));
        assert_eq!(aligned[1], AlignedLine::new(2, 2.5, 2.5));
        assert_eq!(aligned[2], AlignedLine::new(3, 2.5, 2.5));
    }

    #[test]
    fn test_segment_order_is_not_changed() {
        let lines = ScriptLine::numbered(&["x", "y"]);
        let segments = vec![seg(3.0, 4.0, "x"), seg(1.0, 2.0, "y")];
        let aligned = align(&lines, &segments).unwrap();
        assert_eq!(aligned[0].start, 3.0);
        assert_eq!(aligned[1].start, 1.0);
    }

    #[test]
    fn test_no_segments() {
        let lines = ScriptLine::numbered(&["a"]);
        assert_eq!(align(&lines, &[]), Err(SyncError::NoSpeechDetected));
    }

    #[test]
    fn test_no_lines() {
        assert_eq!(
            align(&[], &[seg(0.0, 1.0, "a")]),
            Err(SyncError::EmptyScript)
        );
    }

    #[test]
    fn test_line_indices_follow_script() {
        let lines = ScriptLine::numbered(&["a", "b", "c", "d"]);
        let segments: Vec<SpeechSegment> = (0..4)
            .map(|i| seg(i as f64, i as f64 + 1.0, "z"))
            .collect();
        let aligned = align(&lines, &segments).unwrap();
        let indices: Vec<usize> = aligned.iter().map(|a| a.line).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_check_line_count() {
        let lines = ScriptLine::numbered(&["a", "b", "c"]);
        assert!(check_line_count(&lines, None).is_ok());
        assert!(check_line_count(&lines, Some(3)).is_ok());
        assert_eq!(
            check_line_count(&lines, Some(5)),
            Err(SyncError::LineCountMismatch { expected: 5, actual: 3 })
        );
    }
}
