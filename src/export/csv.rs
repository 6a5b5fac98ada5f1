use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::info;

use super::{commit, staging_file};
use crate::process::{Cell, Table};

/// Write `table` as comma-separated text with a header row and no index column.
///
/// The file only appears at `path` once it has been fully written.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut tmp = staging_file(path)?;
    {
        let mut wtr = WriterBuilder::new().from_writer(tmp.as_file_mut());
        wtr.write_record(&table.headers)
            .context("writing CSV header")?;
        for (idx, row) in table.rows.iter().enumerate() {
            wtr.write_record(row.iter().map(Cell::to_string))
                .with_context(|| format!("writing CSV row {}", idx))?;
        }
        wtr.flush().context("flushing CSV writer")?;
    }
    commit(tmp, path)?;
    info!(path = %path.display(), rows = table.height(), "wrote csv");
    Ok(())
}

/// Read a CSV written by [`write_csv`]; blank fields come back as `Cell::Empty`.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV: {:?}", path))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {:?}", path))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(headers);

    for (idx, record) in rdr.records().enumerate() {
        let record = record
            .with_context(|| format!("CSV parse error in {:?} at record {}", path, idx))?;
        table.push_row(
            record
                .iter()
                .map(|f| {
                    if f.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(f.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}
