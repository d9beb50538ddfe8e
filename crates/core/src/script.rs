//! Narration script loading.

use std::path::Path;

use anyhow::{Context, Result};

use crate::types::ScriptLine;

/// Split script text into numbered lines.
///
/// Lines are trimmed and blank lines dropped; survivors are numbered from 1
/// in file order.
pub fn parse_script(text: &str) -> Vec<ScriptLine> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(i, l)| ScriptLine::new(i + 1, l))
        .collect()
}

/// Read and parse a UTF-8 script file.
pub fn load_script(path: &Path) -> Result<Vec<ScriptLine>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let lines = parse_script(&text);
    log::debug!("Loaded {} script lines from {}", lines.len(), path.display());
    Ok(lines)
}
