//! Cache-or-recompute state machine for task plagiarism reports.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use futures_util::{stream, StreamExt, TryStreamExt};
use tokio::sync::OnceCell;
use tracing::{error, info, info_span, warn, Instrument};

use super::aggregator::ReportAggregator;
use super::clock::{Clock, SystemClock};
use super::lock::TaskLocks;
use crate::analysis::{SimilarityEngine, TextNormalizer};
use crate::catalog::FileCatalogProvider;
use crate::config::AnalysisConfig;
use crate::error::{EngineError, ExtractError, Result};
use crate::extract::TextExtractor;
use crate::model::{AggregatedMatch, FileDescriptor, PlagiarismReport, Task, TaskReport};
use crate::store::ReportStore;

/// Decides whether a task's persisted reports are still valid, recomputes
/// them when they are not, and aggregates the best match per student.
///
/// Cycles for the same task id are serialized. A recompute commits its
/// report set and the new epoch in one store transaction, so a failed or
/// cancelled cycle leaves the previous state untouched.
pub struct TaskAnalysisOrchestrator {
    store: Arc<dyn ReportStore>,
    catalog: Arc<dyn FileCatalogProvider>,
    extractor: Arc<dyn TextExtractor>,
    aggregator: ReportAggregator,
    normalizer: TextNormalizer,
    similarity: SimilarityEngine,
    clock: Arc<dyn Clock>,
    locks: TaskLocks,
    max_concurrent_comparisons: usize,
    timeout: Option<Duration>,
    comparisons: AtomicU64,
}

impl TaskAnalysisOrchestrator {
    pub fn new(
        store: Arc<dyn ReportStore>,
        catalog: Arc<dyn FileCatalogProvider>,
        extractor: Arc<dyn TextExtractor>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            aggregator: ReportAggregator::new(Arc::clone(&store)),
            store,
            catalog,
            extractor,
            normalizer: TextNormalizer::new(),
            similarity: SimilarityEngine::new(config.ngram_size, config.threshold),
            clock: Arc::new(SystemClock),
            locks: TaskLocks::new(),
            max_concurrent_comparisons: config.max_concurrent_comparisons.max(1),
            timeout: config.timeout_secs.map(Duration::from_secs),
            comparisons: AtomicU64::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn similarity(&self) -> &SimilarityEngine {
        &self.similarity
    }

    /// Total pairwise comparisons run by this orchestrator.
    pub fn comparisons_performed(&self) -> u64 {
        self.comparisons.load(Ordering::Relaxed)
    }

    /// Returns the task's report, recomputing it first if the roster changed
    /// since the last analysis (or the task was never analysed).
    ///
    /// The deadline covers the lock wait, roster fetch and comparisons. Once
    /// every pair has been scored the commit runs to completion under the
    /// task lock, so an expired deadline never coincides with written reports.
    pub async fn get_or_compute_report(&self, task_id: &str) -> Result<TaskReport> {
        async {
            let (_guard, outcome) = self
                .within_deadline(task_id, async {
                    let guard = self.locks.acquire(task_id).await;
                    let outcome = self.prepare_cycle(task_id).await?;
                    Ok((guard, outcome))
                })
                .await?;

            match outcome {
                CycleOutcome::Fresh(report) => Ok(report),
                CycleOutcome::Computed {
                    task,
                    reports,
                    roster,
                } => self.commit_cycle(task, reports, &roster).await,
            }
        }
        .instrument(info_span!("analysis", task_id))
        .await
    }

    async fn within_deadline<T>(
        &self,
        task_id: &str,
        phase: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let Some(limit) = self.timeout else {
            return phase.await;
        };

        tokio::time::timeout(limit, phase).await.map_err(|_| {
            warn!(task_id, seconds = limit.as_secs(), "Analysis deadline exceeded");
            EngineError::DeadlineExceeded {
                task_id: task_id.to_string(),
                seconds: limit.as_secs(),
            }
        })?
    }

    /// Everything up to, but not including, the first write.
    async fn prepare_cycle(&self, task_id: &str) -> Result<CycleOutcome> {
        let cached = match self.store.get_task_by_id(task_id).await {
            Ok(task) => Some(task),
            Err(e) if e.is_not_found() => {
                info!("Task has not been analysed yet");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to load task");
                return Err(EngineError::Persistence(e));
            }
        };

        // Stored with microsecond precision; truncate so cached reads return
        // the same epoch as the cycle that produced it.
        let cycle_started_at = self.clock.now().trunc_subsecs(6);

        let roster = self
            .catalog
            .list_task_files(task_id)
            .instrument(info_span!("analysis.roster"))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch task roster");
                EngineError::from(e)
            })?;

        let previous_epoch = match cached {
            Some(task) if !task.is_stale(&roster) => {
                info!(
                    started_at = %task.analysis_started_at,
                    roster_size = roster.len(),
                    "Cached analysis is fresh"
                );
                let matches = self.aggregate(task_id, &roster).await?;
                return Ok(CycleOutcome::Fresh(TaskReport {
                    task_id: task.id,
                    started_at: task.analysis_started_at,
                    matches,
                }));
            }
            Some(task) => {
                info!(
                    started_at = %task.analysis_started_at,
                    "Roster changed since last analysis"
                );
                Some(task.analysis_started_at)
            }
            None => None,
        };

        let started_at = next_epoch(cycle_started_at, previous_epoch);
        let reports = self
            .compare_roster(task_id, &roster)
            .instrument(info_span!("analysis.compare"))
            .await?;

        Ok(CycleOutcome::Computed {
            task: Task::new(task_id, started_at),
            reports,
            roster,
        })
    }

    async fn commit_cycle(
        &self,
        task: Task,
        reports: Vec<PlagiarismReport>,
        roster: &[FileDescriptor],
    ) -> Result<TaskReport> {
        let flagged = reports
            .iter()
            .filter(|r| self.similarity.is_match(r.similarity))
            .count();

        self.store
            .commit_analysis(&task, reports)
            .instrument(info_span!("analysis.commit"))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to commit analysis");
                EngineError::Persistence(e)
            })?;

        info!(started_at = %task.analysis_started_at, flagged, "Analysis committed");

        let matches = self.aggregate(&task.id, roster).await?;
        Ok(TaskReport {
            task_id: task.id,
            started_at: task.analysis_started_at,
            matches,
        })
    }

    async fn aggregate(
        &self,
        task_id: &str,
        roster: &[FileDescriptor],
    ) -> Result<Vec<AggregatedMatch>> {
        self.aggregator
            .build_max_reports(task_id, roster)
            .instrument(info_span!("analysis.aggregate"))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to aggregate reports");
                EngineError::Persistence(e)
            })
    }

    /// Compares every unordered pair of distinct roster students.
    ///
    /// Each file is fetched and normalized at most once. The first failing
    /// pair aborts the whole batch; reports come back in pair order.
    async fn compare_roster(
        &self,
        task_id: &str,
        roster: &[FileDescriptor],
    ) -> Result<Vec<PlagiarismReport>> {
        let files = distinct_students(roster);
        if files.len() < 2 {
            info!(roster_size = files.len(), "Fewer than two submissions, nothing to compare");
            return Ok(Vec::new());
        }

        let texts: Vec<OnceCell<Arc<String>>> = files.iter().map(|_| OnceCell::new()).collect();
        let pairs: Vec<(usize, usize)> = (0..files.len())
            .flat_map(|i| (i + 1..files.len()).map(move |j| (i, j)))
            .collect();
        info!(
            roster_size = files.len(),
            pairs = pairs.len(),
            "Comparing submissions"
        );

        let files = &files;
        let texts = &texts;
        let mut scored: Vec<(usize, PlagiarismReport)> = stream::iter(pairs.into_iter().enumerate())
            .map(|(index, (i, j))| async move {
                let (a, b) = (files[i], files[j]);
                let text_a = self
                    .normalized_text(&texts[i], a)
                    .await
                    .map_err(|e| analysis_failed(a, b, e))?;
                let text_b = self
                    .normalized_text(&texts[j], b)
                    .await
                    .map_err(|e| analysis_failed(a, b, e))?;

                let similarity = self.similarity.compare(&text_a, &text_b);
                self.comparisons.fetch_add(1, Ordering::Relaxed);
                Ok::<_, EngineError>((index, PlagiarismReport::for_pair(task_id, a, b, similarity)))
            })
            .buffer_unordered(self.max_concurrent_comparisons)
            .try_collect()
            .await?;

        scored.sort_by_key(|(index, _)| *index);
        Ok(scored.into_iter().map(|(_, report)| report).collect())
    }

    async fn normalized_text(
        &self,
        cell: &OnceCell<Arc<String>>,
        file: &FileDescriptor,
    ) -> std::result::Result<Arc<String>, ExtractError> {
        cell.get_or_try_init(|| async {
            let raw = self.extractor.extract_text(&file.content_locator).await?;
            Ok(Arc::new(self.normalizer.normalize(&raw)))
        })
        .await
        .map(Arc::clone)
    }
}

enum CycleOutcome {
    Fresh(TaskReport),
    Computed {
        task: Task,
        reports: Vec<PlagiarismReport>,
        roster: Vec<FileDescriptor>,
    },
}

/// First occurrence of each student, in roster order.
fn distinct_students(roster: &[FileDescriptor]) -> Vec<&FileDescriptor> {
    let mut seen = HashSet::new();
    roster
        .iter()
        .filter(|file| seen.insert(file.student_id.as_str()))
        .collect()
}

/// The new epoch must be strictly after the one it replaces.
fn next_epoch(now: DateTime<Utc>, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

fn analysis_failed(a: &FileDescriptor, b: &FileDescriptor, source: ExtractError) -> EngineError {
    error!(
        student_a = %a.student_id,
        student_b = %b.student_id,
        error = %source,
        "Failed to compare files"
    );
    EngineError::AnalysisFailed {
        student_a: a.student_id.clone(),
        student_b: b.student_id.clone(),
        reason: "file comparison failed".to_string(),
        source,
    }
}
