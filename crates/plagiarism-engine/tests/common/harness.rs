//! Test harness wiring the orchestrator to fakes and an in-memory store.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use plagiarism_engine::config::AnalysisConfig;
use plagiarism_engine::db::Database;
use plagiarism_engine::{
    PlagiarismService, ReportStore, SqliteReportStore, TaskAnalysisOrchestrator,
};

use super::fakes::{at, FakeCatalog, ManualClock, ScriptedExtractor, SlowCommitStore};

pub struct TestHarness {
    pub store: Arc<SqliteReportStore>,
    pub catalog: Arc<FakeCatalog>,
    pub extractor: Arc<ScriptedExtractor>,
    pub clock: Arc<ManualClock>,
    pub orchestrator: Arc<TaskAnalysisOrchestrator>,
}

impl TestHarness {
    /// Default analysis settings, clock parked at `at(1000)`.
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self::build(config, None)
    }

    /// Every commit waits `delay` before it writes anything.
    pub fn with_commit_delay(config: AnalysisConfig, delay: Duration) -> Self {
        Self::build(config, Some(delay))
    }

    fn build(config: AnalysisConfig, commit_delay: Option<Duration>) -> Self {
        let store = Arc::new(SqliteReportStore::new(
            Database::open_in_memory().expect("Failed to open in-memory database"),
        ));
        let engine_store: Arc<dyn ReportStore> = match commit_delay {
            Some(delay) => Arc::new(SlowCommitStore::new(store.clone(), delay)),
            None => store.clone(),
        };
        let catalog = Arc::new(FakeCatalog::default());
        let extractor = Arc::new(ScriptedExtractor::default());
        let clock = Arc::new(ManualClock::new(at(1000)));

        let orchestrator = TaskAnalysisOrchestrator::new(
            engine_store,
            catalog.clone(),
            extractor.clone(),
            &config,
        )
        .with_clock(clock.clone());

        Self {
            store,
            catalog,
            extractor,
            clock,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn service(&self) -> PlagiarismService {
        PlagiarismService::new(self.orchestrator.clone())
    }

    pub fn comparisons(&self) -> u64 {
        self.orchestrator.comparisons_performed()
    }

    /// Report ids visible for a student, restricted to one task.
    pub async fn report_ids(&self, task_id: &str, student: &str) -> Vec<String> {
        self.store
            .get_reports_by_student(student)
            .await
            .expect("Failed to read reports")
            .into_iter()
            .filter(|r| r.task_id == task_id)
            .map(|r| r.id)
            .collect()
    }
}
