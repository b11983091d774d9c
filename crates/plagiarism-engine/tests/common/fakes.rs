//! In-process stand-ins for the engine's collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use plagiarism_engine::{
    CatalogError, Clock, ExtractError, FileCatalogProvider, FileDescriptor, PlagiarismReport,
    ReportStore, SqliteReportStore, StoreError, Task, TextExtractor,
};

/// Fixed reference instant; tests express times as offsets from it.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

pub fn locator_for(student: &str) -> String {
    format!("mem://{}", student)
}

pub fn file(student: &str, updated_at: DateTime<Utc>) -> FileDescriptor {
    FileDescriptor {
        student_id: student.to_string(),
        updated_at,
        content_locator: locator_for(student),
    }
}

/// Roster per task, editable between calls.
#[derive(Default)]
pub struct FakeCatalog {
    rosters: Mutex<HashMap<String, Vec<FileDescriptor>>>,
    unavailable: Mutex<bool>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn set_roster(&self, task_id: &str, roster: Vec<FileDescriptor>) {
        self.rosters.lock().unwrap().insert(task_id.to_string(), roster);
    }

    /// Moves one student's file to a new hand-in time.
    pub fn touch(&self, task_id: &str, student: &str, updated_at: DateTime<Utc>) {
        let mut rosters = self.rosters.lock().unwrap();
        let roster = rosters.get_mut(task_id).expect("unknown task");
        for file in roster.iter_mut().filter(|f| f.student_id == student) {
            file.updated_at = updated_at;
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileCatalogProvider for FakeCatalog {
    async fn list_task_files(&self, task_id: &str) -> Result<Vec<FileDescriptor>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.lock().unwrap() {
            return Err(CatalogError::Status {
                task_id: task_id.to_string(),
                status: 503,
            });
        }
        Ok(self
            .rosters
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Serves scripted text or failures per locator and counts fetches.
#[derive(Default)]
pub struct ScriptedExtractor {
    texts: Mutex<HashMap<String, Result<String, ExtractError>>>,
    fetches: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedExtractor {
    pub fn set_text(&self, student: &str, text: &str) {
        self.texts
            .lock()
            .unwrap()
            .insert(locator_for(student), Ok(text.to_string()));
    }

    pub fn fail_download(&self, student: &str) {
        let locator = locator_for(student);
        self.texts.lock().unwrap().insert(
            locator.clone(),
            Err(ExtractError::Download {
                locator,
                reason: "connection reset".to_string(),
            }),
        );
    }

    pub fn fail_extraction(&self, student: &str) {
        let locator = locator_for(student);
        self.texts.lock().unwrap().insert(
            locator.clone(),
            Err(ExtractError::Extraction {
                locator,
                reason: "corrupt document".to_string(),
            }),
        );
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fetches_of(&self, student: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&locator_for(student))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl TextExtractor for ScriptedExtractor {
    async fn extract_text(&self, locator: &str) -> Result<String, ExtractError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(locator.to_string())
            .or_insert(0) += 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.texts
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Delegates to a SQLite store but holds every commit for `commit_delay`
/// before writing.
pub struct SlowCommitStore {
    inner: Arc<SqliteReportStore>,
    commit_delay: Duration,
}

impl SlowCommitStore {
    pub fn new(inner: Arc<SqliteReportStore>, commit_delay: Duration) -> Self {
        Self {
            inner,
            commit_delay,
        }
    }
}

#[async_trait]
impl ReportStore for SlowCommitStore {
    async fn save_report(&self, report: &PlagiarismReport) -> Result<(), StoreError> {
        self.inner.save_report(report).await
    }

    async fn delete_reports_by_task(&self, task_id: &str) -> Result<(), StoreError> {
        self.inner.delete_reports_by_task(task_id).await
    }

    async fn get_reports_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<PlagiarismReport>, StoreError> {
        self.inner.get_reports_by_student(student_id).await
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        self.inner.save_task(task).await
    }

    async fn get_task_by_id(&self, task_id: &str) -> Result<Task, StoreError> {
        self.inner.get_task_by_id(task_id).await
    }

    async fn update_task_analysis_time(
        &self,
        task_id: &str,
        analysis_started_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.inner
            .update_task_analysis_time(task_id, analysis_started_at)
            .await
    }

    async fn commit_analysis(
        &self,
        task: &Task,
        reports: Vec<PlagiarismReport>,
    ) -> Result<(), StoreError> {
        tokio::time::sleep(self.commit_delay).await;
        self.inner.commit_analysis(task, reports).await
    }
}
