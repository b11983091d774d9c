use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::{CatalogError, FileCatalogProvider};
use crate::model::FileDescriptor;

#[derive(Debug, Deserialize)]
struct ListTaskFilesResponse {
    #[serde(default)]
    items: Vec<FileDescriptor>,
}

/// Catalog client for the storage service's JSON API.
///
/// `GET {base_url}/tasks/{task_id}/files` answers
/// `{"items": [{"studentId", "updatedAt", "contentLocator"}]}`.
pub struct HttpFileCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFileCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    /// Endpoint for a task; the id is percent-encoded as a path segment.
    pub fn files_url(&self, task_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["tasks", task_id, "files"]);
        }
        url
    }
}

#[async_trait]
impl FileCatalogProvider for HttpFileCatalog {
    async fn list_task_files(&self, task_id: &str) -> Result<Vec<FileDescriptor>, CatalogError> {
        let url = self.files_url(task_id);
        debug!(task_id, url = %url, "Listing task files");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request {
                task_id: task_id.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                task_id: task_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ListTaskFilesResponse =
            response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse {
                    task_id: task_id.to_string(),
                    reason: e.to_string(),
                })?;

        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_url_encodes_task_id() {
        let catalog =
            HttpFileCatalog::new("http://storage.local/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            catalog.files_url("task 1/a").as_str(),
            "http://storage.local/api/tasks/task%201%2Fa/files"
        );
    }

    #[test]
    fn test_files_url_without_trailing_slash() {
        let catalog =
            HttpFileCatalog::new("http://storage.local/api", Duration::from_secs(5)).unwrap();
        assert_eq!(
            catalog.files_url("t1").as_str(),
            "http://storage.local/api/tasks/t1/files"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpFileCatalog::new("not a url", Duration::from_secs(5)),
            Err(CatalogError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpFileCatalog::new("mailto:someone@example.com", Duration::from_secs(5)),
            Err(CatalogError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_response_decoding() {
        let body: ListTaskFilesResponse = serde_json::from_str(
            r#"{"items": [{"studentId": "s1", "updatedAt": "2026-01-01T10:00:00Z",
                "contentLocator": "http://files/s1.pdf"}]}"#,
        )
        .unwrap();
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].student_id, "s1");

        let empty: ListTaskFilesResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_request_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let catalog =
            HttpFileCatalog::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = catalog.list_task_files("t1").await.unwrap_err();
        assert!(matches!(err, CatalogError::Request { .. }));
    }
}
