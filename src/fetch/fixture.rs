// Local HTTP/1.1 server standing in for the customs site in tests.
use anyhow::Result;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use url::Url;

pub const PAGE: &str = r#"
<html><body><ul>
  <li><a href="/files/FTS_UptoAsoj_2080_81.xlsx">Asoj</a></li>
  <li><a href="/files/FTS_Upto-Magh_2080_81-1%20(1).xlsx">Magh</a></li>
  <li><a href="/notice.pdf">Notice</a></li>
</ul></body></html>
"#;

pub struct SiteFixture {
    pub base: Url,
    downloads: Arc<AtomicUsize>,
}

impl SiteFixture {
    pub fn page_url(&self) -> String {
        format!("{}fts", self.base)
    }

    /// Requests served under `/files/`.
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

/// Serves [`PAGE`] at `/fts`, a body naming the path under `/files/`, and 404
/// everywhere else. One connection per request.
pub async fn serve_site() -> Result<SiteFixture> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
    let downloads = Arc::new(AtomicUsize::new(0));
    let counter = downloads.clone();

    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = if path == "/fts" {
                    ("200 OK", PAGE.as_bytes().to_vec())
                } else if path.starts_with("/files/") {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ("200 OK", format!("workbook at {}", path).into_bytes())
                } else {
                    ("404 Not Found", b"not found".to_vec())
                };
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = sock.write_all(head.as_bytes()).await;
                let _ = sock.write_all(&body).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    Ok(SiteFixture { base, downloads })
}
