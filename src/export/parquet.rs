use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{path::Path, sync::Arc};
use tracing::info;

use super::{commit, staging_file};
use crate::process::{Cell, Table};

/// Write `table` as a single-row-group Parquet file of nullable UTF-8 columns.
pub fn write_parquet<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();

    let schema = Arc::new(Schema::new(
        table
            .headers
            .iter()
            .map(|h| Field::new(h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = (0..table.headers.len())
        .map(|i| {
            let values: StringArray = table
                .rows
                .iter()
                .map(|row| match &row[i] {
                    Cell::Empty => None,
                    cell => Some(cell.to_string()),
                })
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    let mut tmp = staging_file(path)?;
    {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), schema.clone(), Some(props))
            .context("creating Arrow writer")?;
        if table.height() > 0 {
            let batch = RecordBatch::try_new(schema, columns).context("building record batch")?;
            writer.write(&batch).context("writing record batch")?;
        }
        writer.close().context("closing parquet writer")?;
    }
    commit(tmp, path)?;
    info!(path = %path.display(), rows = table.height(), "wrote parquet");
    Ok(())
}
