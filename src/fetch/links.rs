// src/fetch/links.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fetch `page_url` and return the workbook links picked out by `selector`.
pub async fn fetch_sheet_links(client: &Client, page_url: &str, selector: &str) -> Result<Vec<Url>> {
    let base = Url::parse(page_url).with_context(|| format!("parsing page URL {}", page_url))?;
    let mut attempt = 0;

    let html = loop {
        attempt += 1;
        let result = async {
            client
                .get(base.clone())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
        .await;

        match result {
            Ok(html) => break html,
            Err(e) if attempt < MAX_RETRIES => {
                warn!(attempt, error = %e, url = %base, "page fetch failed, retrying");
                sleep(RETRY_DELAY).await;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("GET {} after {} attempts", base, attempt))
            }
        }
    };

    let links = extract_links(&html, &base, selector)?;
    debug!(count = links.len(), url = %base, "links found");
    Ok(links)
}

/// Resolve every `href` matched by `selector` against `base`, dropping repeats
/// but keeping document order.
pub fn extract_links(html: &str, base: &Url, selector: &str) -> Result<Vec<Url>> {
    let sel = Selector::parse(selector)
        .map_err(|e| anyhow!("invalid CSS selector {:?}: {:?}", selector, e))?;

    let mut seen = HashSet::new();
    Ok(Html::parse_document(html)
        .select(&sel)
        .filter_map(|e| e.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|u| seen.insert(u.clone()))
        .collect())
}

/// Keep `limit` links after skipping the first `skip`.
pub fn window(links: Vec<Url>, skip: usize, limit: Option<usize>) -> Vec<Url> {
    links
        .into_iter()
        .skip(skip)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
