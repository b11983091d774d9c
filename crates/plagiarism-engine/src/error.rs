use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("File catalog unavailable: {0}")]
    UpstreamUnavailable(#[from] CatalogError),

    #[error(
        "analysis failed for students {student_a} and {student_b}: {reason}: {source}"
    )]
    AnalysisFailed {
        student_a: String,
        student_b: String,
        reason: String,
        #[source]
        source: ExtractError,
    },

    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    #[error("Analysis of task '{task_id}' exceeded its deadline of {seconds}s")]
    DeadlineExceeded { task_id: String, seconds: u64 },
}

/// Classification of engine failures, used by the transport layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UpstreamUnavailable,
    ExtractionFailed,
    DownloadFailed,
    AnalysisFailed,
    Persistence,
    DeadlineExceeded,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            EngineError::AnalysisFailed { .. } => ErrorKind::AnalysisFailed,
            EngineError::Persistence(_) => ErrorKind::Persistence,
            EngineError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
        }
    }

    /// Kind of the underlying file failure for `AnalysisFailed`.
    pub fn cause_kind(&self) -> Option<ErrorKind> {
        match self {
            EngineError::AnalysisFailed { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} id required")]
    IdRequired(&'static str),

    #[error("{0} id is too long")]
    IdTooLong(&'static str),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request for task '{task_id}' failed: {reason}")]
    Request { task_id: String, reason: String },

    #[error("Catalog returned status {status} for task '{task_id}'")]
    Status { task_id: String, status: u16 },

    #[error("Invalid catalog response for task '{task_id}': {reason}")]
    InvalidResponse { task_id: String, reason: String },

    #[error("Invalid catalog base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to download file '{locator}': {reason}")]
    Download { locator: String, reason: String },

    #[error("failed to extract text from file '{locator}': {reason}")]
    Extraction { locator: String, reason: String },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Download { .. } => ErrorKind::DownloadFailed,
            ExtractError::Extraction { .. } => ErrorKind::ExtractionFailed,
        }
    }

    pub(crate) fn download(locator: &str, reason: impl ToString) -> Self {
        ExtractError::Download {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn extraction(locator: &str, reason: impl ToString) -> Self {
        ExtractError::Extraction {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Store task failed: {0}")]
    Background(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_names_both_students() {
        let err = EngineError::AnalysisFailed {
            student_a: "s1".to_string(),
            student_b: "s2".to_string(),
            reason: "file comparison failed".to_string(),
            source: ExtractError::download("http://x/a.pdf", "timed out"),
        };

        let message = err.to_string();
        assert!(message.contains("s1"));
        assert!(message.contains("s2"));
        assert!(message.contains("timed out"));
        assert_eq!(err.kind(), ErrorKind::AnalysisFailed);
        assert_eq!(err.cause_kind(), Some(ErrorKind::DownloadFailed));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: EngineError = ValidationError::IdRequired("task").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.cause_kind(), None);

        let err = EngineError::Persistence(StoreError::Background("join".to_string()));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::IdRequired("task").to_string(), "task id required");
        assert_eq!(ValidationError::IdTooLong("task").to_string(), "task id is too long");
    }

    #[test]
    fn test_extract_error_kinds() {
        assert_eq!(
            ExtractError::extraction("a", "corrupt").kind(),
            ErrorKind::ExtractionFailed
        );
        assert_eq!(ExtractError::download("a", "404").kind(), ErrorKind::DownloadFailed);
    }
}
