// src/export/mod.rs
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::process::{Table, TableError};

mod csv;
mod parquet;
mod xlsx;

pub use self::csv::{read_csv, write_csv};
pub use self::parquet::write_parquet;
pub use self::xlsx::append_xlsx;

/// Create a temp file beside `dest` so the final rename stays on one filesystem.
fn staging_file(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating output directory {:?}", dir))?;
    NamedTempFile::new_in(&dir).with_context(|| format!("creating temp file in {:?}", dir))
}

fn commit(tmp: NamedTempFile, dest: &Path) -> Result<()> {
    tmp.persist(dest)
        .with_context(|| format!("moving output into place at {:?}", dest))?;
    Ok(())
}

/// Rows per month label, in the order labels first appear.
pub fn month_counts(table: &Table, month_column: &str) -> Result<Vec<(String, usize)>, TableError> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for cell in table.column(month_column)? {
        let label = cell.to_string();
        match counts.iter_mut().find(|(m, _)| *m == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    Ok(counts)
}
