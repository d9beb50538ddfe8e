//! Visual clip scheduling against the narration length.

pub mod schedule;

pub use schedule::{attention_duration, schedule, schedule_even};
