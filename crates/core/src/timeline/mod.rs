//! Narration timeline: script lines to intervals covering the audio.
//!
//! Two allocators produce intervals:
//! - word_count: proportional to per-line word counts
//! - segment: greedy matching of recognized speech segments
//!
//! Either result goes through the reconciler, which pins the final boundary
//! to the measured audio duration.

pub mod reconcile;
pub mod segment;
pub mod word_count;

pub use reconcile::{reconcile, reconcile_timeline, validate, TimelineReport};
pub use segment::{align, check_line_count};
pub use word_count::allocate;
