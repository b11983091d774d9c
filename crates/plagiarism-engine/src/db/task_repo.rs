//! Task repository, holding the cache epoch per task id.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::Task;

/// Inserts a task, or moves the epoch of an existing one.
pub(crate) fn upsert_in(conn: &Connection, task: &Task) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tasks (id, analysis_started_at) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET analysis_started_at = excluded.analysis_started_at",
        params![task.id, format_timestamp(task.analysis_started_at)],
    )?;
    Ok(())
}

pub fn upsert(db: &Database, task: &Task) -> Result<(), DatabaseError> {
    db.with_conn(|conn| upsert_in(conn, task))
}

/// Finds a task by id.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Task>, DatabaseError> {
    db.with_conn(|conn| {
        let raw: Option<String> = conn
            .query_row(
                "SELECT analysis_started_at FROM tasks WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;

        raw.map(|value| {
            Ok(Task {
                id: id.to_string(),
                analysis_started_at: parse_timestamp("analysis_started_at", &value)?,
            })
        })
        .transpose()
    })
}

/// Moves the epoch of an existing task. Returns the number of rows changed.
pub fn update_analysis_time(
    db: &Database,
    id: &str,
    analysis_started_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE tasks SET analysis_started_at = ?2 WHERE id = ?1",
            params![id, format_timestamp(analysis_started_at)],
        )?;
        Ok(changed)
    })
}
