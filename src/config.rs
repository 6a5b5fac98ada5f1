// src/config.rs
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::process::filter::KeywordFilter;

pub const DEFAULT_CONFIG_PATH: &str = "ftscraper.yaml";

/// Nepali fiscal year, in publication order.
pub static FISCAL_MONTHS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "shrawan", "bhadra", "ashwin", "kartik", "mangsir", "poush", "magh", "falgun", "chaitra",
        "baishak", "jestha",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{files} input files but only {months} month labels")]
    MonthsExhausted { files: usize, months: usize },
    #[error("no input files configured")]
    NoInputs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub merge: MergeConfig,
}

impl Config {
    /// Load `path`, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub page_url: String,
    /// CSS selector for the anchors that point at workbooks.
    pub selector: String,
    pub download_dir: PathBuf,
    pub history_dir: PathBuf,
    pub pause_secs: u64,
    pub skip: usize,
    pub limit: Option<usize>,
    pub force: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_url: "https://www.customs.gov.np/page/fts-fy-207879".into(),
            selector: r#"a[href$=".xlsx"], a[href$=".xls"]"#.into(),
            download_dir: PathBuf::from("downloads"),
            history_dir: PathBuf::from("history"),
            pause_secs: 5,
            skip: 0,
            limit: None,
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub path: PathBuf,
    pub month: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
    /// Append to a sheet of an existing workbook, creating it if needed.
    Xlsx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub inputs: Vec<InputFile>,
    /// Legacy form: file list paired by position with `months`.
    pub files: Vec<PathBuf>,
    pub months: Vec<String>,
    pub sheet: String,
    /// Physical rows above the header row.
    pub header_row: usize,
    pub rename: BTreeMap<String, String>,
    pub drop: Vec<String>,
    pub description_column: String,
    pub month_column: String,
    pub filter: KeywordFilter,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Target sheet for `OutputFormat::Xlsx`.
    pub xlsx_sheet: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            files: Vec::new(),
            months: FISCAL_MONTHS.clone(),
            sheet: "5_Imports_By_Commodity".into(),
            header_row: 2,
            rename: BTreeMap::from([("HSCode".to_string(), "Sn No".to_string())]),
            drop: vec!["Sn No".into()],
            description_column: "Description".into(),
            month_column: "Month".into(),
            filter: KeywordFilter::default(),
            output: PathBuf::from("data.csv"),
            format: OutputFormat::Csv,
            xlsx_sheet: "Car".into(),
        }
    }
}

impl MergeConfig {
    /// The ordered list of files to merge, each with its month label.
    ///
    /// Explicit `inputs` win. Otherwise `files` is zipped with `months`; extra
    /// months are ignored, extra files are rejected before anything is read.
    pub fn resolved_inputs(&self) -> Result<Vec<InputFile>, ConfigError> {
        if !self.inputs.is_empty() {
            return Ok(self.inputs.clone());
        }
        if self.files.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        if self.files.len() > self.months.len() {
            return Err(ConfigError::MonthsExhausted {
                files: self.files.len(),
                months: self.months.len(),
            });
        }
        if self.files.len() < self.months.len() {
            warn!(
                files = self.files.len(),
                months = self.months.len(),
                "more months than files; trailing months unused"
            );
        }
        Ok(self
            .files
            .iter()
            .zip(&self.months)
            .map(|(path, month)| InputFile {
                path: path.clone(),
                month: month.clone(),
            })
            .collect())
    }
}
