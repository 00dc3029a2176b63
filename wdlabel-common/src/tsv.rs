//! Tab-separated fact files
//!
//! Dataset rows are `[factId] \t subject \t relation \t object [\t ...]`.
//! Rows with four or more columns carry a leading fact id; rows with exactly
//! three columns do not. Blank lines and `#` comments are skipped.

use crate::facts::strip_quotes;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// One row of a fact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub id: Option<String>,
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl FactRow {
    /// Parse a data line; `None` for lines with fewer than three columns
    pub fn parse(line: &str) -> Option<Self> {
        let columns: Vec<&str> = line.split('\t').collect();
        match columns.len() {
            0..=2 => None,
            3 => Some(FactRow {
                id: None,
                subject: columns[0].to_string(),
                relation: columns[1].to_string(),
                object: columns[2].to_string(),
            }),
            _ => Some(FactRow {
                id: Some(columns[0].to_string()).filter(|id| !id.is_empty()),
                subject: columns[1].to_string(),
                relation: columns[2].to_string(),
                object: columns[3].to_string(),
            }),
        }
    }
}

/// Visit every row of the fact file at `path`
///
/// Lines that are neither blank, comments nor rows are parse errors.
pub fn for_each_row<F>(path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(FactRow),
{
    let file = File::open(path).map_err(|e| {
        Error::Config(format!("Cannot open dataset {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);
    let source_name = path.display().to_string();

    let mut rows = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row = FactRow::parse(trimmed).ok_or_else(|| {
            Error::parse(&source_name, index + 1, "expected at least 3 tab-separated columns")
        })?;
        visit(row);
        rows += 1;
    }

    debug!(dataset = %source_name, rows, "Read fact file");
    Ok(rows)
}

/// Distinct subjects of a fact file
pub fn load_subjects(path: &Path) -> Result<HashSet<String>> {
    let mut subjects = HashSet::new();
    for_each_row(path, |row| {
        subjects.insert(row.subject);
    })?;
    Ok(subjects)
}

/// Subject → object map over the rows carrying `relation`, quotes stripped
///
/// Keys are unique: a repeated key keeps its first value.
pub fn load_string_map(path: &Path, relation: &str) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for_each_row(path, |row| {
        if row.relation != relation {
            return;
        }
        let key = strip_quotes(&row.subject).to_string();
        let value = strip_quotes(&row.object).to_string();
        if let Some(existing) = map.get(&key) {
            if existing != &value {
                warn!(key = %key, kept = %existing, ignored = %value, "Duplicate mapping key");
            }
            return;
        }
        map.insert(key, value);
    })?;
    Ok(map)
}
