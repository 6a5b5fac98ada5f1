// src/fetch/mod.rs
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::{path::PathBuf, time::Duration};
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::{
    config::FetchConfig,
    history::{DownloadLog, DownloadRecord},
};

pub mod download;
pub mod links;

#[cfg(test)]
pub(crate) mod fixture;

#[derive(Debug, Default, Serialize)]
pub struct FetchReport {
    pub found: usize,
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Download every workbook linked from the FTS page, one at a time.
///
/// Files already in the download log are skipped unless `cfg.force` is set.
/// Each finished download is logged immediately, so an aborted run keeps its
/// progress.
pub async fn run_fetch(cfg: &FetchConfig) -> Result<FetchReport> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let links = links::fetch_sheet_links(&client, &cfg.page_url, &cfg.selector).await?;
    let found = links.len();
    let links = links::window(links, cfg.skip, cfg.limit);
    if links.is_empty() {
        warn!(page = %cfg.page_url, found, "no workbook links to download");
    }
    info!(found, selected = links.len(), "workbook links discovered");

    let log = DownloadLog::new(&cfg.history_dir)?;
    let done = log.downloaded_names()?;
    let pause = Duration::from_secs(cfg.pause_secs);

    let mut report = FetchReport {
        found,
        ..Default::default()
    };
    for url in links {
        let name = download::file_name_for(&url);
        if !cfg.force && done.contains(&name) {
            info!(name = %name, "already downloaded; skipping");
            report.skipped.push(name);
            continue;
        }

        // pause between downloads, not before the first
        if !report.downloaded.is_empty() {
            sleep(pause).await;
        }

        let start = Instant::now();
        let (path, size_bytes) = download::download_file(&client, &url, &cfg.download_dir).await?;
        info!(name = %name, size_bytes, elapsed = ?start.elapsed(), "downloaded");

        log.record(&DownloadRecord {
            file_name: name,
            url: url.to_string(),
            size_bytes,
            downloaded_at: Utc::now(),
        })?;
        report.downloaded.push(path);
    }

    info!(
        downloaded = report.downloaded.len(),
        skipped = report.skipped.len(),
        "fetch complete"
    );
    Ok(report)
}
