//! Persistence contract for tasks and reports.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use crate::error::StoreError;
use crate::model::{PlagiarismReport, Task};
pub use sqlite::SqliteReportStore;

/// Durable storage of task epochs and pairwise reports.
///
/// A missing task is reported as [`StoreError::NotFound`], never as a
/// generic failure.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save_report(&self, report: &PlagiarismReport) -> Result<(), StoreError>;

    async fn delete_reports_by_task(&self, task_id: &str) -> Result<(), StoreError>;

    /// Reports the student takes part in (either side), across all tasks.
    async fn get_reports_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<PlagiarismReport>, StoreError>;

    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;

    async fn get_task_by_id(&self, task_id: &str) -> Result<Task, StoreError>;

    async fn update_task_analysis_time(
        &self,
        task_id: &str,
        analysis_started_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Replaces the task's report set and moves its epoch as one atomic unit.
    /// Creates the task if it does not exist yet.
    async fn commit_analysis(
        &self,
        task: &Task,
        reports: Vec<PlagiarismReport>,
    ) -> Result<(), StoreError>;
}
