//! Append-only request log file.
//!
//! One line per request, plus one line per write-authorization attempt:
//!
//! ```text
//! [2025-10-05T19:24:00.000Z] GET /api/books 200 1534 - 15.204 ms
//! [2025-10-05T19:24:01.000Z] [FAIL] API Key: none | Route: /api/books
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::env::ensure_parent;

pub struct AccessLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AccessLog {
    /// Open (creating if needed) the log file in append mode.
    pub async fn open<P: Into<PathBuf>>(path: P) -> anyhow::Result<Arc<Self>> {
        let path = path.into();
        ensure_parent(&path).await?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| anyhow::anyhow!("cannot open access log {}: {e}", path.display()))?;
        Ok(Arc::new(Self { path, file: Mutex::new(file) }))
    }

    /// Append one line. Failures are reported through tracing and otherwise ignored.
    pub async fn append(&self, line: &str) {
        let mut file = self.file.lock().await;
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        if let Err(e) = file.write_all(buf.as_bytes()).await {
            warn!(path = %self.path.display(), error = %e, "access log write failed");
            return;
        }
        if let Err(e) = file.flush().await {
            warn!(path = %self.path.display(), error = %e, "access log flush failed");
        }
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn request_line(
    at: DateTime<Utc>,
    method: &str,
    uri: &str,
    status: u16,
    content_length: Option<u64>,
    elapsed: Duration,
) -> String {
    let length = content_length.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
    let ms = elapsed.as_secs_f64() * 1000.0;
    format!("[{}] {method} {uri} {status} {length} - {ms:.3} ms", stamp(at))
}

pub fn auth_line(at: DateTime<Utc>, success: bool, masked_key: &str, route: &str) -> String {
    let outcome = if success { "SUCCESS" } else { "FAIL" };
    format!("[{}] [{outcome}] API Key: {masked_key} | Route: {route}", stamp(at))
}
