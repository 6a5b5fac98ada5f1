use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// Local file name for `url`: its last non-empty path segment, percent-decoded.
///
/// Decoded separators are replaced so the name cannot leave the download
/// directory.
pub fn file_name_for(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.xlsx");
    let name: String = percent_decode_str(segment)
        .decode_utf8_lossy()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "download.xlsx".to_string(),
        _ => name,
    }
}

/// Download `url` into `dest_dir` under [`file_name_for`].
///
/// The body goes to a `.part` file first and is renamed once complete.
/// Returns the saved path and its size in bytes.
#[tracing::instrument(level = "info", skip(client, url, dest_dir), fields(url = %url))]
pub async fn download_file(
    client: &Client,
    url: &Url,
    dest_dir: impl AsRef<Path>,
) -> Result<(PathBuf, u64)> {
    let dest_dir = dest_dir.as_ref();
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("creating download directory {:?}", dest_dir))?;

    let name = file_name_for(url);
    let dest_path = dest_dir.join(&name);
    let part_path = dest_dir.join(format!("{}.part", name));

    let bytes = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    fs::write(&part_path, &bytes)
        .await
        .with_context(|| format!("writing {:?}", part_path))?;
    fs::rename(&part_path, &dest_path)
        .await
        .with_context(|| format!("renaming {:?} to {:?}", part_path, dest_path))?;

    Ok((dest_path, bytes.len() as u64))
}
