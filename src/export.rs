//! CSV output for scraped records.

use std::path::Path;

use anyhow::Context;

use crate::models::{Field, ProductRecord};

/// Write `records` to `path` as CSV, replacing any existing file.
///
/// The header row is always written, so an empty run still produces a file
/// with the column names. Returns the number of data rows.
pub fn write_csv(path: &Path, records: &[ProductRecord]) -> anyhow::Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    writer.write_record(Field::ALL.iter().map(|f| f.as_str()))?;
    for record in records {
        writer.write_record(Field::ALL.iter().map(|&f| record.get(f).unwrap_or("")))?;
    }
    writer.flush()?;

    Ok(records.len())
}
