use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::StoreError;
use crate::model::{AggregatedMatch, FileDescriptor, PlagiarismReport};
use crate::store::ReportStore;

/// Picks the best match per student from the persisted reports of a task.
pub struct ReportAggregator {
    store: Arc<dyn ReportStore>,
}

impl ReportAggregator {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// One entry per distinct roster student that has at least one report in
    /// `task_id`, in first-occurrence roster order.
    ///
    /// Ties keep the report the store returned first.
    pub async fn build_max_reports(
        &self,
        task_id: &str,
        roster: &[FileDescriptor],
    ) -> Result<Vec<AggregatedMatch>, StoreError> {
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for file in roster {
            let student_id = file.student_id.as_str();
            if !seen.insert(student_id) {
                continue;
            }

            let reports = self.store.get_reports_by_student(student_id).await?;
            match best_report(task_id, student_id, &reports) {
                Some(best) => matches.push(best.to_match_for(student_id)),
                None => debug!(task_id, student_id, "No reports for student"),
            }
        }

        Ok(matches)
    }
}

fn best_report<'a>(
    task_id: &str,
    student_id: &str,
    reports: &'a [PlagiarismReport],
) -> Option<&'a PlagiarismReport> {
    reports
        .iter()
        .filter(|r| r.task_id == task_id && r.involves(student_id))
        .fold(None, |best: Option<&PlagiarismReport>, r| match best {
            Some(b) if b.similarity >= r.similarity => Some(b),
            _ => Some(r),
        })
}
