//! Assignee lookup and on-demand creation.

use super::Database;
use crate::types::Assignee;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Pick the assignee for a new task.
///
/// An `existing_id` that refers to a real row wins. Otherwise a non-empty
/// `new_name` is looked up by exact name and created if absent. Otherwise
/// the task stays unassigned.
pub(crate) fn resolve_assignee(
    conn: &Connection,
    existing_id: Option<i64>,
    new_name: Option<&str>,
) -> Result<Option<i64>> {
    if let Some(id) = existing_id {
        let exists = conn
            .query_row(
                "SELECT 1 FROM assignees WHERE id = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(Some(id));
        }
    }

    match new_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Ok(Some(get_or_create(conn, name)?.id)),
        None => Ok(None),
    }
}

fn get_or_create(conn: &Connection, name: &str) -> Result<Assignee> {
    // The UNIQUE constraint on name makes this idempotent.
    conn.execute(
        "INSERT INTO assignees (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM assignees WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(Assignee {
        id,
        name: name.to_string(),
    })
}

impl Database {
    /// All assignees, ordered by name.
    pub fn list_assignees(&self) -> Result<Vec<Assignee>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM assignees ORDER BY name, id")?;
            let assignees = stmt
                .query_map([], |row| {
                    Ok(Assignee {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(assignees)
        })
    }
}
