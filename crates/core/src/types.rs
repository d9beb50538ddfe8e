use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single spoken line of the narration script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptLine {
    /// Position in the script, starting at 1
    pub index: usize,
    /// Raw line text
    pub text: String,
}

impl ScriptLine {
    pub fn new(index: usize, text: &str) -> Self {
        Self {
            index,
            text: text.to_string(),
        }
    }

    /// Number lines from 1 in the order given.
    pub fn numbered<S: AsRef<str>>(texts: &[S]) -> Vec<Self> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Self::new(i + 1, t.as_ref()))
            .collect()
    }

    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Character length of the trimmed text.
    pub fn text_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// Time span assigned to one script line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    /// 1-based script line index
    pub line: usize,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Interval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A boundary where one interval does not end where the next one starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Discontinuity {
    /// Line index of the interval before the boundary
    pub after_line: usize,
    /// `next.start - prev.end`; positive is a gap, negative an overlap
    pub delta: f64,
}

/// Ordered intervals, one per script line.
///
/// Serializes as a flat list of `{line, start, end}` records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Timeline {
    intervals: Vec<Interval>,
}

impl Timeline {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// End of the last interval.
    pub fn end(&self) -> Option<f64> {
        self.intervals.last().map(|iv| iv.end)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Interval> {
        self.intervals.last_mut()
    }

    /// Every boundary where `end[i] != start[i + 1]`.
    pub fn gaps(&self) -> Vec<Discontinuity> {
        self.intervals
            .windows(2)
            .filter(|pair| pair[0].end != pair[1].start)
            .map(|pair| Discontinuity {
                after_line: pair[0].line,
                delta: pair[1].start - pair[0].end,
            })
            .collect()
    }

    pub fn is_contiguous(&self) -> bool {
        self.intervals.windows(2).all(|pair| pair[0].end == pair[1].start)
    }

    /// Starts at zero, has no gaps and ends exactly at `duration`.
    pub fn covers(&self, duration: f64) -> bool {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => {
                first.start == 0.0 && last.end == duration && self.is_contiguous()
            }
            _ => false,
        }
    }
}

/// A recognized speech segment from an external recognizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SpeechSegment {
    pub fn new(start: f64, end: f64, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
        }
    }

    /// Character length of the trimmed recognized text.
    pub fn text_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// A script line matched to recognized speech, before reconciliation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlignedLine {
    pub line: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl AlignedLine {
    pub fn new(line: usize, start: f64, end: f64) -> Self {
        Self {
            line,
            start,
            end,
            duration: end - start,
        }
    }
}

/// Which allocator produced a timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Proportional to per-line word counts
    WordCount,
    /// Greedy matching of recognized speech segments
    Segments,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::WordCount => write!(f, "word_count"),
            Strategy::Segments => write!(f, "segments"),
        }
    }
}

// ---------------------------------------------------------------------------
// Visual clips
// ---------------------------------------------------------------------------

/// Editorial intent attached to a visual clip.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Intent {
    #[default]
    Neutral,
    /// Gets a bounded amount of extra screen time
    Attention,
}

impl Intent {
    /// Lenient parse: unknown tags fall back to `Neutral`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.parse() {
            Ok(intent) => intent,
            Err(e) => {
                log::warn!("{}, treating as neutral", e);
                Intent::Neutral
            }
        }
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "neutral" => Ok(Intent::Neutral),
            "attention" => Ok(Intent::Attention),
            other => Err(format!("Unknown clip intent '{}'", other)),
        }
    }
}

impl From<String> for Intent {
    fn from(tag: String) -> Self {
        Intent::from_tag(&tag)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Neutral => write!(f, "neutral"),
            Intent::Attention => write!(f, "attention"),
        }
    }
}

/// A visual asset waiting for a duration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipRequest {
    /// Asset reference (file name or id), passed through untouched
    pub asset: String,
    #[serde(default)]
    pub intent: Intent,
}

impl ClipRequest {
    pub fn new(asset: &str, intent: Intent) -> Self {
        Self {
            asset: asset.to_string(),
            intent,
        }
    }
}

/// One scheduled clip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipPlanEntry {
    pub asset: String,
    /// Assigned duration in seconds
    pub duration: f64,
    /// True for attention clips
    pub boosted: bool,
}

/// How the scheduled total was brought to the audio duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Per-clip durations already summed to the audio duration
    Exact,
    /// Last clip lengthened by `shortfall` seconds
    Extended { shortfall: f64 },
    /// Sequence cut at the audio duration; `dropped` trailing clips removed
    Truncated { overflow: f64, dropped: usize },
}

/// Per-clip durations for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipPlan {
    pub entries: Vec<ClipPlanEntry>,
    /// Sum of per-clip durations before reconciliation
    pub requested_total: f64,
    pub adjustment: Adjustment,
}

impl ClipPlan {
    /// In-order sum of entry durations.
    pub fn total(&self) -> f64 {
        sum_durations(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Left-to-right sum, the same order the renderer lays clips out in.
pub(crate) fn sum_durations(entries: &[ClipPlanEntry]) -> f64 {
    entries.iter().fold(0.0, |acc, e| acc + e.duration)
}
