//! Domain records shared by the engine, the store and the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One analysis cycle for a task identifier.
///
/// `analysis_started_at` is the cache epoch: roster files updated after it
/// make the persisted report set stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub analysis_started_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: impl Into<String>, analysis_started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            analysis_started_at,
        }
    }

    /// Returns true if any roster file was updated strictly after the epoch.
    pub fn is_stale(&self, roster: &[FileDescriptor]) -> bool {
        roster
            .iter()
            .any(|file| file.updated_at > self.analysis_started_at)
    }
}

/// A submitted file as reported by the file catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub student_id: String,
    pub updated_at: DateTime<Utc>,
    /// URL or filesystem path the extractor reads the document from.
    pub content_locator: String,
}

/// A persisted pairwise comparison within a task.
#[derive(Debug, Clone, PartialEq)]
pub struct PlagiarismReport {
    pub id: String,
    pub task_id: String,
    pub student_a: String,
    pub student_b: String,
    pub similarity: f64,
    pub file_a_handed_over_at: DateTime<Utc>,
    pub file_b_handed_over_at: DateTime<Utc>,
}

impl PlagiarismReport {
    /// Builds a report with a fresh id for the pair `(a, b)`.
    pub fn for_pair(
        task_id: &str,
        a: &FileDescriptor,
        b: &FileDescriptor,
        similarity: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            student_a: a.student_id.clone(),
            student_b: b.student_id.clone(),
            similarity,
            file_a_handed_over_at: a.updated_at,
            file_b_handed_over_at: b.updated_at,
        }
    }

    pub fn involves(&self, student_id: &str) -> bool {
        self.student_a == student_id || self.student_b == student_id
    }

    /// Mirrors the report to the perspective of `student_id`.
    ///
    /// The other side becomes `matched_student`, and its hand-in time is
    /// reported as `matched_file_handed_over_at`.
    pub fn to_match_for(&self, student_id: &str) -> AggregatedMatch {
        if self.student_a == student_id {
            AggregatedMatch {
                student: self.student_a.clone(),
                matched_student: self.student_b.clone(),
                max_similarity: self.similarity,
                matched_file_handed_over_at: self.file_b_handed_over_at,
            }
        } else {
            AggregatedMatch {
                student: self.student_b.clone(),
                matched_student: self.student_a.clone(),
                max_similarity: self.similarity,
                matched_file_handed_over_at: self.file_a_handed_over_at,
            }
        }
    }
}

/// Best match of one student within a task. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMatch {
    pub student: String,
    pub matched_student: String,
    pub max_similarity: f64,
    pub matched_file_handed_over_at: DateTime<Utc>,
}

/// Result of `GetOrComputeReport`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub matches: Vec<AggregatedMatch>,
}
