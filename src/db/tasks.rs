//! Task CRUD operations.

use super::{Database, assignees, now_ms};
use crate::types::{Category, Priority, Task, TaskStatus};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{OptionalExtension, Row, params};

/// Column list matching [`map_task`].
pub(crate) const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.category, \
     t.due_date, t.priority, t.created_at, t.assignee_id";

/// Map the first nine columns of a row selected with [`TASK_COLUMNS`].
pub(crate) fn map_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        category: row.get(4)?,
        due_date: row.get(5)?,
        priority: row.get(6)?,
        created_at: row.get(7)?,
        assignee_id: row.get(8)?,
    })
}

/// A validated task ready to be inserted.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    /// Existing assignee to use, if it still exists.
    pub assignee_id: Option<i64>,
    /// Name to reuse or create when no usable `assignee_id` was given.
    pub new_assignee_name: Option<String>,
}

impl Database {
    /// Insert a task, resolving its assignee in the same transaction.
    pub fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let assignee_id = assignees::resolve_assignee(
                &tx,
                draft.assignee_id,
                draft.new_assignee_name.as_deref(),
            )?;

            tx.execute(
                "INSERT INTO tasks (title, description, status, category, due_date, priority, created_at, assignee_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.title,
                    draft.description,
                    TaskStatus::default(),
                    draft.category,
                    draft.due_date,
                    draft.priority,
                    now,
                    assignee_id,
                ],
            )?;
            let id = tx.last_insert_rowid();

            tx.commit()?;

            Ok(Task {
                id,
                title: draft.title.clone(),
                description: draft.description.clone(),
                status: TaskStatus::default(),
                category: draft.category,
                due_date: draft.due_date,
                priority: draft.priority,
                created_at: now,
                assignee_id,
            })
        })
    }

    /// Get a task by id.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!("SELECT {} FROM tasks t WHERE t.id = ?1", TASK_COLUMNS),
                    params![task_id],
                    map_task,
                )
                .optional()?;
            Ok(task)
        })
    }

    /// Delete a task. Its uploaded file rows go with it through the cascade.
    /// Returns false if the task did not exist.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(rows > 0)
        })
    }

    /// Set a task's status. Returns false if the task did not exist.
    pub fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<bool> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                "UPDATE tasks SET status = ?1 WHERE id = ?2",
                params![status, task_id],
            )?;
            Ok(rows > 0)
        })
    }

    /// Set a task's priority. Returns false if the task did not exist.
    pub fn update_task_priority(&self, task_id: i64, priority: Priority) -> Result<bool> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                "UPDATE tasks SET priority = ?1 WHERE id = ?2",
                params![priority, task_id],
            )?;
            Ok(rows > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, category: Category) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            category,
            ..Default::default()
        }
    }

    #[test]
    fn create_task_applies_defaults() {
        let db = Database::open_in_memory().unwrap();
        let task = db.create_task(&draft("Level 1 layout", Category::Designer)).unwrap();

        let stored = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.title, "Level 1 layout");
        assert_eq!(stored.status, TaskStatus::NotStarted);
        assert_eq!(stored.priority, Priority::Medium);
        assert_eq!(stored.category, Category::Designer);
        assert!(stored.created_at > 0);
        assert!(stored.assignee_id.is_none());
    }

    #[test]
    fn create_task_persists_due_date() {
        let db = Database::open_in_memory().unwrap();
        let mut d = draft("Ship build", Category::Programmer);
        d.due_date = NaiveDate::from_ymd_opt(2025, 3, 14);

        let task = db.create_task(&d).unwrap();
        let stored = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.due_date, NaiveDate::from_ymd_opt(2025, 3, 14));
    }

    #[test]
    fn get_missing_task_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_task(42).unwrap().is_none());
    }

    #[test]
    fn updates_report_missing_task() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.update_task_status(7, TaskStatus::Done).unwrap());
        assert!(!db.update_task_priority(7, Priority::High).unwrap());
        assert!(!db.delete_task(7).unwrap());
    }

    #[test]
    fn update_status_and_priority() {
        let db = Database::open_in_memory().unwrap();
        let task = db.create_task(&draft("Boss AI", Category::Programmer)).unwrap();

        assert!(db.update_task_status(task.id, TaskStatus::Review).unwrap());
        assert!(db.update_task_priority(task.id, Priority::Low).unwrap());

        let stored = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Review);
        assert_eq!(stored.priority, Priority::Low);
    }
}
