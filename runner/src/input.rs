use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use scheduler::ProcessTable;
use tracing::debug;

/// Parses `<name> [<entryTime>]` lines. Blank lines are skipped and a missing
/// entry time counts as 0.
pub fn parse_entries(text: &str) -> Result<Vec<(String, i64)>> {
    let mut entries = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        let entry_time = match fields.next() {
            Some(field) => match field.parse::<i64>() {
                Ok(entry_time) => entry_time,
                Err(_) => bail!("line {}: invalid entry time `{}`", number + 1, field),
            },
            None => 0,
        };
        entries.push((name.to_string(), entry_time));
    }
    Ok(entries)
}

pub fn read_table(path: &Path) -> Result<ProcessTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let entries =
        parse_entries(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!("read {} entries from {}", entries.len(), path.display());
    Ok(entries.into_iter().collect())
}
