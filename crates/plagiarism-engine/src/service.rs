//! Request-level surface in front of the orchestrator.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::engine::TaskAnalysisOrchestrator;
use crate::error::{EngineError, ErrorKind, ValidationError};
use crate::model::{AggregatedMatch, TaskReport};

/// Maximum task id length, in Unicode code points.
pub const MAX_TASK_ID_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPlagiarismReportRequest {
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPlagiarismReportResponse {
    pub started_at: DateTime<Utc>,
    pub reports: Vec<StudentReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student: String,
    pub matched_student: String,
    pub max_similarity: f64,
    pub matched_file_handed_over_at: DateTime<Utc>,
}

impl From<AggregatedMatch> for StudentReport {
    fn from(m: AggregatedMatch) -> Self {
        Self {
            student: m.student,
            matched_student: m.matched_student,
            max_similarity: m.max_similarity,
            matched_file_handed_over_at: m.matched_file_handed_over_at,
        }
    }
}

impl From<TaskReport> for GetPlagiarismReportResponse {
    fn from(report: TaskReport) -> Self {
        Self {
            started_at: report.started_at,
            reports: report.matches.into_iter().map(StudentReport::from).collect(),
        }
    }
}

/// Transport-neutral status codes, named after their gRPC counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    InvalidArgument,
    FailedPrecondition,
    Unavailable,
    DeadlineExceeded,
    Internal,
}

impl From<ErrorKind> for StatusCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation | ErrorKind::ExtractionFailed => StatusCode::InvalidArgument,
            ErrorKind::AnalysisFailed => StatusCode::FailedPrecondition,
            ErrorKind::UpstreamUnavailable | ErrorKind::DownloadFailed => StatusCode::Unavailable,
            ErrorKind::DeadlineExceeded => StatusCode::DeadlineExceeded,
            ErrorKind::Persistence => StatusCode::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceError {
    pub code: StatusCode,
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        let message = match &err {
            EngineError::Validation(e) => e.to_string(),
            EngineError::AnalysisFailed { .. } => err.to_string(),
            EngineError::UpstreamUnavailable(_) => "failed to connect to storage service".to_string(),
            EngineError::DeadlineExceeded { .. } => "analysis deadline exceeded".to_string(),
            EngineError::Persistence(_) => "internal error".to_string(),
        };

        Self {
            code: err.kind().into(),
            message,
        }
    }
}

/// Rejects empty ids and ids longer than [`MAX_TASK_ID_CHARS`] code points.
pub fn validate_task_id(task_id: &str) -> Result<(), ValidationError> {
    if task_id.is_empty() {
        return Err(ValidationError::IdRequired("task"));
    }
    if task_id.chars().count() > MAX_TASK_ID_CHARS {
        return Err(ValidationError::IdTooLong("task"));
    }
    Ok(())
}

pub struct PlagiarismService {
    orchestrator: Arc<TaskAnalysisOrchestrator>,
}

impl PlagiarismService {
    pub fn new(orchestrator: Arc<TaskAnalysisOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &TaskAnalysisOrchestrator {
        &self.orchestrator
    }

    pub async fn get_plagiarism_report(
        &self,
        request: GetPlagiarismReportRequest,
    ) -> Result<GetPlagiarismReportResponse, ServiceError> {
        let task_id = request.task_id.as_str();
        if let Err(e) = validate_task_id(task_id) {
            warn!(task_id, error = %e, "Rejected report request");
            return Err(EngineError::from(e).into());
        }

        info!(task_id, "Starting analysis");
        match self.orchestrator.get_or_compute_report(task_id).await {
            Ok(report) => Ok(report.into()),
            Err(e) => {
                error!(
                    task_id,
                    kind = ?e.kind(),
                    cause = ?e.cause_kind(),
                    error = %e,
                    "Report request failed"
                );
                Err(e.into())
            }
        }
    }
}
