//! Narration timeline synchronizer.
//!
//! Turns a narration script and the measured length of its audio into a
//! gap-free timeline of per-line intervals, and schedules visual clip
//! durations against the same audio length.

pub mod artifact;
pub mod config;
pub mod error;
pub mod probe;
pub mod script;
pub mod sync;
pub mod timeline;
pub mod transcript;
pub mod types;
pub mod visual;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use sync::{SyncOutcome, Synchronizer};
