//! Report repository: CRUD operations for the `plagiarism_reports` table.

use rusqlite::{params, Connection, Row};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::PlagiarismReport;

/// A raw report row; timestamps are still RFC 3339 text.
#[derive(Debug, Clone)]
struct ReportRow {
    id: String,
    task_id: String,
    student_a: String,
    student_b: String,
    similarity: f64,
    file_a_handed_over_at: String,
    file_b_handed_over_at: String,
}

impl ReportRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            task_id: row.get("task_id")?,
            student_a: row.get("student_a")?,
            student_b: row.get("student_b")?,
            similarity: row.get("similarity")?,
            file_a_handed_over_at: row.get("file_a_handed_over_at")?,
            file_b_handed_over_at: row.get("file_b_handed_over_at")?,
        })
    }

    fn into_report(self) -> Result<PlagiarismReport, DatabaseError> {
        Ok(PlagiarismReport {
            file_a_handed_over_at: parse_timestamp(
                "file_a_handed_over_at",
                &self.file_a_handed_over_at,
            )?,
            file_b_handed_over_at: parse_timestamp(
                "file_b_handed_over_at",
                &self.file_b_handed_over_at,
            )?,
            id: self.id,
            task_id: self.task_id,
            student_a: self.student_a,
            student_b: self.student_b,
            similarity: self.similarity,
        })
    }
}

pub(crate) fn insert_in(conn: &Connection, report: &PlagiarismReport) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO plagiarism_reports (id, task_id, student_a, student_b, similarity,
         file_a_handed_over_at, file_b_handed_over_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            report.id,
            report.task_id,
            report.student_a,
            report.student_b,
            report.similarity,
            format_timestamp(report.file_a_handed_over_at),
            format_timestamp(report.file_b_handed_over_at),
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_by_task_in(conn: &Connection, task_id: &str) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM plagiarism_reports WHERE task_id = ?1",
        params![task_id],
    )?;
    Ok(deleted)
}

/// Inserts a new report row.
pub fn insert(db: &Database, report: &PlagiarismReport) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_in(conn, report))
}

/// Deletes every report of a task. Returns the number of rows removed.
pub fn delete_by_task(db: &Database, task_id: &str) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| delete_by_task_in(conn, task_id))
}

/// All reports a student takes part in, on either side, across all tasks,
/// in insertion order.
pub fn find_by_student(
    db: &Database,
    student_id: &str,
) -> Result<Vec<PlagiarismReport>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM plagiarism_reports
             WHERE student_a = ?1 OR student_b = ?1
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![student_id], ReportRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ReportRow::into_report).collect()
    })
}

/// Counts the reports stored for a task.
pub fn count_by_task(db: &Database, task_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM plagiarism_reports WHERE task_id = ?1",
            params![task_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_report(id: &str, task: &str, a: &str, b: &str, similarity: f64) -> PlagiarismReport {
        PlagiarismReport {
            id: id.to_string(),
            task_id: task.to_string(),
            student_a: a.to_string(),
            student_b: b.to_string(),
            similarity,
            file_a_handed_over_at: Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(),
            file_b_handed_over_at: Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_find_by_student_either_side() {
        let db = test_db();
        insert(&db, &sample_report("r1", "t1", "s1", "s2", 0.4)).unwrap();
        insert(&db, &sample_report("r2", "t1", "s3", "s1", 0.9)).unwrap();
        insert(&db, &sample_report("r3", "t1", "s2", "s3", 0.1)).unwrap();

        let found = find_by_student(&db, "s1").unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(found[1], sample_report("r2", "t1", "s3", "s1", 0.9));
    }

    #[test]
    fn test_find_by_student_spans_tasks() {
        let db = test_db();
        insert(&db, &sample_report("r1", "t1", "s1", "s2", 0.4)).unwrap();
        insert(&db, &sample_report("r2", "t2", "s1", "s2", 0.6)).unwrap();

        assert_eq!(find_by_student(&db, "s1").unwrap().len(), 2);
        assert!(find_by_student(&db, "nobody").unwrap().is_empty());
    }

    #[test]
    fn test_delete_by_task_leaves_other_tasks() {
        let db = test_db();
        insert(&db, &sample_report("r1", "t1", "s1", "s2", 0.4)).unwrap();
        insert(&db, &sample_report("r2", "t1", "s1", "s3", 0.5)).unwrap();
        insert(&db, &sample_report("r3", "t2", "s1", "s2", 0.6)).unwrap();

        assert_eq!(delete_by_task(&db, "t1").unwrap(), 2);
        assert_eq!(count_by_task(&db, "t1").unwrap(), 0);
        assert_eq!(count_by_task(&db, "t2").unwrap(), 1);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let db = test_db();
        insert(&db, &sample_report("r1", "t1", "s1", "s2", 0.4)).unwrap();
        assert!(insert(&db, &sample_report("r2", "t1", "s1", "s2", 0.5)).is_err());
    }
}
