// src/pipeline.rs
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::{path::PathBuf, time::Instant};
use tracing::{info, instrument};

use crate::{
    config::{InputFile, MergeConfig, OutputFormat},
    export,
    process::{load_sheet, merge, transform, Table, TransformRules},
};

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub month: String,
    pub loaded_rows: usize,
    pub kept_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub files: Vec<FileReport>,
    pub total_rows: usize,
    pub output: PathBuf,
}

/// Load and filter a single input, tagging each kept row with its month.
pub fn load_input(
    input: &InputFile,
    sheet: &str,
    header_row: usize,
    rules: &TransformRules,
) -> Result<(Table, FileReport)> {
    let raw = load_sheet(&input.path, sheet, header_row)?;
    let loaded_rows = raw.height();
    let table = transform(raw, rules, &input.month)
        .with_context(|| format!("transforming {:?}", input.path))?;

    let report = FileReport {
        path: input.path.clone(),
        month: input.month.clone(),
        loaded_rows,
        kept_rows: table.height(),
    };
    info!(
        path = %input.path.display(),
        month = %input.month,
        loaded_rows,
        kept_rows = report.kept_rows,
        "input processed"
    );
    Ok((table, report))
}

/// Filter every configured workbook and write the merged result.
///
/// Nothing is written unless every input loads cleanly.
#[instrument(level = "info", skip(cfg), fields(output = %cfg.output.display()))]
pub fn run_merge(cfg: &MergeConfig) -> Result<MergeReport> {
    let start = Instant::now();
    let inputs = cfg.resolved_inputs()?;
    let rules = TransformRules::from(cfg);
    info!(files = inputs.len(), sheet = %cfg.sheet, "starting merge");

    // indexed collect keeps input order
    let loaded: Vec<(Table, FileReport)> = inputs
        .par_iter()
        .map(|input| load_input(input, &cfg.sheet, cfg.header_row, &rules))
        .collect::<Result<_>>()?;

    let (tables, files): (Vec<Table>, Vec<FileReport>) = loaded.into_iter().unzip();
    let merged = merge(tables);

    match cfg.format {
        OutputFormat::Csv => export::write_csv(&merged, &cfg.output)?,
        OutputFormat::Parquet => export::write_parquet(&merged, &cfg.output)?,
        OutputFormat::Xlsx => export::append_xlsx(&merged, &cfg.output, &cfg.xlsx_sheet)?,
    }

    info!(rows = merged.height(), elapsed = ?start.elapsed(), "merge complete");
    Ok(MergeReport {
        files,
        total_rows: merged.height(),
        output: cfg.output.clone(),
    })
}
