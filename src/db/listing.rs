//! Per-category board listing.
//!
//! Each category has its own query shape and its own set of orderings:
//! planner rows are grouped over their uploads so they can be ordered by the
//! most recent one, designer rows by creation time, programmer rows by due
//! date or status. Ties always fall back to task id.

use super::Database;
use super::tasks::{TASK_COLUMNS, map_task};
use crate::types::{Category, SortKey, TaskRow, UploadedFile};
use anyhow::Result;
use rusqlite::params;
use std::collections::HashMap;
use tracing::debug;

/// Result of a listing query.
#[derive(Debug, Clone)]
pub struct Listing {
    pub category: Category,
    /// The ordering actually applied, after fallback.
    pub sort: SortKey,
    pub rows: Vec<TaskRow>,
}

/// SELECT/FROM/WHERE/GROUP BY part for a category.
///
/// Column 9 is the assignee name, column 10 the latest upload timestamp
/// (always NULL outside planner).
fn select_clause(category: Category) -> String {
    match category {
        Category::Planner => format!(
            "SELECT {cols}, a.name, MAX(f.uploaded_at) AS latest_upload
             FROM tasks t
             LEFT JOIN assignees a ON a.id = t.assignee_id
             LEFT JOIN uploaded_files f ON f.task_id = t.id
             WHERE t.category = ?1
             GROUP BY t.id",
            cols = TASK_COLUMNS
        ),
        Category::Designer | Category::Programmer => format!(
            "SELECT {cols}, a.name, NULL AS latest_upload
             FROM tasks t
             LEFT JOIN assignees a ON a.id = t.assignee_id
             WHERE t.category = ?1",
            cols = TASK_COLUMNS
        ),
    }
}

fn order_clause(sort: SortKey) -> &'static str {
    match sort {
        SortKey::UploadDateDesc => " ORDER BY latest_upload DESC NULLS LAST, t.id ASC",
        SortKey::UploadDateAsc => " ORDER BY latest_upload ASC NULLS FIRST, t.id ASC",
        SortKey::TitleAsc => " ORDER BY t.title ASC, t.id ASC",
        SortKey::CreatedAtDesc => " ORDER BY t.created_at DESC, t.id DESC",
        SortKey::CreatedAtAsc => " ORDER BY t.created_at ASC, t.id ASC",
        SortKey::DueDateAsc => " ORDER BY t.due_date ASC NULLS LAST, t.id ASC",
        SortKey::DueDateDesc => " ORDER BY t.due_date DESC NULLS FIRST, t.id ASC",
        // Workflow order rather than alphabetical.
        SortKey::StatusAsc => {
            " ORDER BY CASE t.status
                WHEN 'not_started' THEN 0
                WHEN 'in_progress' THEN 1
                WHEN 'review' THEN 2
                ELSE 3 END ASC, t.id ASC"
        }
    }
}

impl Database {
    /// List one category's tasks under the requested ordering.
    ///
    /// `sort` is resolved with [`SortKey::resolve`]: absent or unknown keys
    /// use the category default.
    pub fn list_tasks(&self, category: Category, sort: Option<&str>) -> Result<Listing> {
        let sort = SortKey::resolve(category, sort);
        let sql = format!("{}{}", select_clause(category), order_clause(sort));
        debug!(category = category.as_str(), sort = sort.as_str(), "Listing tasks");

        let mut rows: Vec<TaskRow> = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![category], |row| {
                    Ok(TaskRow {
                        task: map_task(row)?,
                        assignee: row.get(9)?,
                        files: Vec::new(),
                        latest_upload: row.get(10)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        let mut files_by_task: HashMap<i64, Vec<UploadedFile>> = HashMap::new();
        for file in self.get_uploaded_files_for_category(category)? {
            files_by_task.entry(file.task_id).or_default().push(file);
        }
        for row in &mut rows {
            if let Some(files) = files_by_task.remove(&row.task.id) {
                row.files = files;
            }
        }

        Ok(Listing {
            category,
            sort,
            rows,
        })
    }
}
