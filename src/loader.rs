//! Minimal CSV loader for the fixed-schema exports this tool consumes.
//!
//! This is deliberately not a general CSV reader: fields are split with a
//! naive quote toggle (a `"` flips the in-quotes flag and is consumed; a
//! doubled `""` flips it twice), there is no escape handling, and every
//! field is trimmed. The first non-blank line is dropped unconditionally as
//! the header, whatever it contains.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Split one line into fields. A comma separates fields only while outside
/// quotes; quote characters themselves never reach the field content.
pub fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == ',' && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Read `path` in full and project every data row through `project`.
///
/// Blank and whitespace-only lines are discarded before the header is
/// dropped, so a leading blank line does not cost a data row. A missing or
/// unreadable file is the one fatal error in the pipeline; malformed rows
/// are not — short rows reach the projector as-is and map to defaults.
pub fn load_records<T>(path: &Path, project: impl Fn(&[String]) -> T) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1) // header, content ignored
        .map(|line| project(&split_row(line)))
        .collect())
}
