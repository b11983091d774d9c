//! Source of the current submission roster of a task.

pub mod http;

use async_trait::async_trait;

pub use crate::error::CatalogError;
use crate::model::FileDescriptor;
pub use http::HttpFileCatalog;

#[async_trait]
pub trait FileCatalogProvider: Send + Sync {
    /// Files currently submitted for the task, one per student.
    async fn list_task_files(&self, task_id: &str) -> Result<Vec<FileDescriptor>, CatalogError>;
}
