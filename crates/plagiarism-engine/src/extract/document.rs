use std::fmt::Display;
use std::path::PathBuf;
use std::pin::pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use super::content::{self, ContentKind};
use super::{pdf, ExtractError, TextExtractor};

/// Reference timeout for a single document fetch.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Extractor for HTTP(S) URLs and local files (`file://` or plain paths).
///
/// PDFs are read through their text layer; everything else that is not
/// binary is decoded as lossy UTF-8. The result is sanitised either way.
pub struct DocumentExtractor {
    client: reqwest::Client,
    max_bytes: u64,
}

impl DocumentExtractor {
    pub fn new(download_timeout: Duration, max_bytes: u64) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()
            .map_err(|e| ExtractError::download("<client>", e))?;

        Ok(Self { client, max_bytes })
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, ExtractError> {
        match Locator::parse(locator) {
            Locator::Http => self.fetch_http(locator).await,
            Locator::File(path) => self.fetch_file(locator, path).await,
        }
    }

    async fn fetch_http(&self, locator: &str) -> Result<Vec<u8>, ExtractError> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| ExtractError::download(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::download(
                locator,
                format!("HTTP status {}", status.as_u16()),
            ));
        }

        if let Some(length) = response.content_length() {
            self.check_size(locator, length)?;
        }

        self.read_capped(locator, response.bytes_stream()).await
    }

    /// Collects a body chunk by chunk, giving up as soon as the running
    /// total passes the size cap.
    async fn read_capped<S, B, E>(&self, locator: &str, body: S) -> Result<Vec<u8>, ExtractError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let mut body = pin!(body);
        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ExtractError::download(locator, e))?;
            let chunk = chunk.as_ref();
            self.check_size(locator, (data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(chunk);
        }
        Ok(data)
    }

    async fn fetch_file(&self, locator: &str, path: PathBuf) -> Result<Vec<u8>, ExtractError> {
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ExtractError::download(locator, e))?;
        self.check_size(locator, metadata.len())?;

        tokio::fs::read(&path)
            .await
            .map_err(|e| ExtractError::download(locator, e))
    }

    fn check_size(&self, locator: &str, len: u64) -> Result<(), ExtractError> {
        if len > self.max_bytes {
            return Err(ExtractError::extraction(
                locator,
                format!("document is {} bytes, limit is {}", len, self.max_bytes),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, locator: &str) -> Result<String, ExtractError> {
        let data = self.fetch(locator).await?;
        let kind = content::sniff(&data);
        debug!(locator, bytes = data.len(), kind = ?kind, "Fetched document");

        extract_from_bytes(locator, &data, kind)
    }
}

/// Decodes already fetched bytes according to their sniffed kind.
pub fn extract_from_bytes(
    locator: &str,
    data: &[u8],
    kind: ContentKind,
) -> Result<String, ExtractError> {
    match kind {
        ContentKind::Pdf => {
            let text = pdf::extract_text(data).map_err(|e| ExtractError::extraction(locator, e))?;
            Ok(content::sanitize(&text))
        }
        ContentKind::Text => Ok(content::sanitize(&String::from_utf8_lossy(data))),
        ContentKind::Binary => Err(ExtractError::extraction(
            locator,
            "unsupported binary content",
        )),
    }
}

enum Locator {
    Http,
    File(PathBuf),
}

impl Locator {
    fn parse(locator: &str) -> Self {
        let lower = locator.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Locator::Http
        } else if let Some(path) = locator.strip_prefix("file://") {
            Locator::File(PathBuf::from(path))
        } else {
            Locator::File(PathBuf::from(locator))
        }
    }
}
