use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ReportStore, StoreError};
use crate::db::{report_repo, task_repo, Database, DatabaseError};
use crate::model::{PlagiarismReport, Task};

/// [`ReportStore`] backed by the SQLite [`Database`].
///
/// Blocking SQLite calls run on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteReportStore {
    db: Database,
}

impl SqliteReportStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn run<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Background(e.to_string()))?
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn save_report(&self, report: &PlagiarismReport) -> Result<(), StoreError> {
        let report = report.clone();
        self.run(move |db| Ok(report_repo::insert(db, &report)?)).await
    }

    async fn delete_reports_by_task(&self, task_id: &str) -> Result<(), StoreError> {
        let task_id = task_id.to_string();
        self.run(move |db| {
            let deleted = report_repo::delete_by_task(db, &task_id)?;
            debug!(task_id = %task_id, deleted, "Deleted task reports");
            Ok(())
        })
        .await
    }

    async fn get_reports_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<PlagiarismReport>, StoreError> {
        let student_id = student_id.to_string();
        self.run(move |db| Ok(report_repo::find_by_student(db, &student_id)?))
            .await
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let task = task.clone();
        self.run(move |db| Ok(task_repo::upsert(db, &task)?)).await
    }

    async fn get_task_by_id(&self, task_id: &str) -> Result<Task, StoreError> {
        let task_id = task_id.to_string();
        self.run(move |db| {
            task_repo::find_by_id(db, &task_id)?.ok_or(StoreError::NotFound {
                entity: "task",
                id: task_id,
            })
        })
        .await
    }

    async fn update_task_analysis_time(
        &self,
        task_id: &str,
        analysis_started_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let task_id = task_id.to_string();
        self.run(move |db| {
            match task_repo::update_analysis_time(db, &task_id, analysis_started_at)? {
                0 => Err(StoreError::NotFound {
                    entity: "task",
                    id: task_id,
                }),
                _ => Ok(()),
            }
        })
        .await
    }

    async fn commit_analysis(
        &self,
        task: &Task,
        reports: Vec<PlagiarismReport>,
    ) -> Result<(), StoreError> {
        let task = task.clone();
        self.run(move |db| {
            db.with_transaction(|tx| {
                let deleted = report_repo::delete_by_task_in(tx, &task.id)?;
                for report in &reports {
                    report_repo::insert_in(tx, report)?;
                }
                task_repo::upsert_in(tx, &task)?;
                debug!(
                    task_id = %task.id,
                    deleted,
                    inserted = reports.len(),
                    "Committed analysis cycle"
                );
                Ok::<_, DatabaseError>(())
            })?;
            Ok(())
        })
        .await
    }
}
