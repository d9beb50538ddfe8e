//! Tunables for a synchronization run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Line count the segment-alignment path requires. `None` accepts any.
    pub expected_line_count: Option<usize>,
    /// Optional lower bound on the per-clip share (seconds)
    pub min_clip_seconds: Option<f64>,
    /// Optional upper bound on the per-clip share and the attention boost (seconds)
    pub max_clip_seconds: Option<f64>,
    /// Multiplicative boost for attention clips
    pub attention_boost_factor: f64,
    /// Additive cap on the attention boost (seconds)
    pub attention_boost_cap_seconds: f64,
    /// Slack allowed by the diagnostic timeline report
    pub timeline_tolerance: f64,
}

impl SyncConfig {
    pub const DEFAULT_BOOST_FACTOR: f64 = 1.2;
    pub const DEFAULT_BOOST_CAP_SECONDS: f64 = 0.3;
    pub const DEFAULT_TIMELINE_TOLERANCE: f64 = 0.01;

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: SyncConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), SyncError> {
        let finite = [
            self.attention_boost_factor,
            self.attention_boost_cap_seconds,
            self.timeline_tolerance,
        ]
        .into_iter()
        .chain(self.min_clip_seconds)
        .chain(self.max_clip_seconds)
        .all(|v| v.is_finite());
        if !finite {
            return Err(SyncError::InvalidConfig("values must be finite".into()));
        }
        if let Some(min) = self.min_clip_seconds {
            if min < 0.0 {
                return Err(SyncError::InvalidConfig(format!(
                    "min_clip_seconds must not be negative (got {})",
                    min
                )));
            }
        }
        if let Some(max) = self.max_clip_seconds {
            if max <= 0.0 {
                return Err(SyncError::InvalidConfig(
                    "max_clip_seconds must be positive".into(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_clip_seconds, self.max_clip_seconds) {
            if min > max {
                return Err(SyncError::InvalidConfig(format!(
                    "min_clip_seconds ({}) exceeds max_clip_seconds ({})",
                    min, max
                )));
            }
        }
        if self.attention_boost_factor < 1.0 {
            return Err(SyncError::InvalidConfig(format!(
                "attention_boost_factor must be at least 1.0 (got {})",
                self.attention_boost_factor
            )));
        }
        if self.attention_boost_cap_seconds < 0.0 || self.timeline_tolerance < 0.0 {
            return Err(SyncError::InvalidConfig(
                "boost cap and tolerance must not be negative".into(),
            ));
        }
        if self.expected_line_count == Some(0) {
            return Err(SyncError::InvalidConfig(
                "expected_line_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            expected_line_count: None,
            min_clip_seconds: None,
            max_clip_seconds: None,
            attention_boost_factor: Self::DEFAULT_BOOST_FACTOR,
            attention_boost_cap_seconds: Self::DEFAULT_BOOST_CAP_SECONDS,
            timeline_tolerance: Self::DEFAULT_TIMELINE_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.expected_line_count, None);
        assert_eq!(config.min_clip_seconds, None);
        assert_eq!(config.max_clip_seconds, None);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = SyncConfig {
            min_clip_seconds: Some(8.0),
            max_clip_seconds: Some(7.0),
            ..SyncConfig::default()
        };
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));

        // A lone bound is fine.
        let config = SyncConfig {
            min_clip_seconds: Some(8.0),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_bounds() {
        let config = SyncConfig {
            max_clip_seconds: Some(0.0),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            min_clip_seconds: Some(f64::NAN),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_shrinking_boost() {
        let config = SyncConfig {
            attention_boost_factor: 0.8,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_expected_lines() {
        let config = SyncConfig {
            expected_line_count: Some(0),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        std::fs::write(&path, r#"{"expected_line_count": 5, "max_clip_seconds": 6.0}"#).unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.expected_line_count, Some(5));
        assert_eq!(config.max_clip_seconds, Some(6.0));
        assert_eq!(config.min_clip_seconds, None);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        std::fs::write(&path, r#"{"min_clip_seconds": 9.0, "max_clip_seconds": 7.0}"#).unwrap();
        assert!(SyncConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SyncConfig::load(Path::new("/nonexistent/sync.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config"));
    }
}
