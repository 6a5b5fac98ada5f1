// src/history/mod.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use glob::{glob, Pattern};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    collections::HashSet,
    fs,
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

const EVENT: &str = "downloaded";

pub struct DownloadRecord {
    pub file_name: String,
    pub url: String,
    pub size_bytes: u64,
    pub downloaded_at: DateTime<Utc>,
}

/// Append-only log of fetched workbooks, one small Parquet file per download.
pub struct DownloadLog {
    dir: PathBuf,
}

impl DownloadLog {
    /// Open the log at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating history directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("file_name", DataType::Utf8, false),
            Field::new("url", DataType::Utf8, false),
            Field::new("size_bytes", DataType::UInt64, false),
            Field::new(
                "downloaded_at",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            ),
        ])
    }

    /// Writes `<file>_downloaded_<micros>.parquet` holding one row.
    pub fn record(&self, rec: &DownloadRecord) -> Result<PathBuf> {
        let ts = rec.downloaded_at.timestamp_micros();
        let path = self
            .dir
            .join(format!("{}_{}_{}.parquet", rec.file_name, EVENT, ts));

        let schema = Arc::new(Self::schema());
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![rec.file_name.clone()])),
            Arc::new(StringArray::from(vec![rec.url.clone()])),
            Arc::new(UInt64Array::from(vec![rec.size_bytes])),
            Arc::new(TimestampMicrosecondArray::from(vec![ts])),
        ];
        let batch =
            RecordBatch::try_new(schema.clone(), columns).context("building download record")?;

        let file =
            File::create(&path).with_context(|| format!("creating history file {:?}", &path))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))
            .context("creating Arrow writer for history")?;
        writer.write(&batch).context("writing history batch")?;
        writer.close().context("closing history writer")?;

        debug!(file = %rec.file_name, path = %path.display(), "recorded download");
        Ok(path)
    }

    /// Every file name that has a download entry, read from the log's filenames.
    pub fn downloaded_names(&self) -> Result<HashSet<String>> {
        let marker = format!("_{}_", EVENT);
        let dir = Pattern::escape(&self.dir.display().to_string());
        let pattern = format!("{}/*{}*.parquet", dir, marker);
        let mut names = HashSet::new();
        for path in glob(&pattern)?.filter_map(Result::ok) {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(idx) = stem.rfind(&marker) {
                names.insert(stem[..idx].to_string());
            }
        }
        Ok(names)
    }
}
