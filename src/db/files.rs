//! Uploaded file records.

use super::{Database, now_ms};
use crate::types::{Category, UploadedFile};
use anyhow::{Result, anyhow};
use rusqlite::{Row, params};

fn map_uploaded_file(row: &Row) -> rusqlite::Result<UploadedFile> {
    Ok(UploadedFile {
        id: row.get(0)?,
        task_id: row.get(1)?,
        filename: row.get(2)?,
        uploaded_at: row.get(3)?,
    })
}

impl Database {
    /// Record a stored file against a task.
    pub fn add_uploaded_file(&self, task_id: i64, filename: &str) -> Result<UploadedFile> {
        let now = now_ms();

        self.with_conn(|conn| {
            let rows = conn.execute(
                "INSERT INTO uploaded_files (filename, task_id, uploaded_at)
                 SELECT ?1, id, ?3 FROM tasks WHERE id = ?2",
                params![filename, task_id, now],
            )?;
            if rows == 0 {
                return Err(anyhow!("Task not found: {}", task_id));
            }

            Ok(UploadedFile {
                id: conn.last_insert_rowid(),
                task_id,
                filename: filename.to_string(),
                uploaded_at: now,
            })
        })
    }

    /// Files attached to a task, oldest first.
    pub fn get_uploaded_files(&self, task_id: i64) -> Result<Vec<UploadedFile>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, filename, uploaded_at FROM uploaded_files
                 WHERE task_id = ?1 ORDER BY uploaded_at, id",
            )?;
            let files = stmt
                .query_map(params![task_id], map_uploaded_file)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(files)
        })
    }

    /// All files for tasks in a category, oldest first.
    pub(crate) fn get_uploaded_files_for_category(
        &self,
        category: Category,
    ) -> Result<Vec<UploadedFile>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT f.id, f.task_id, f.filename, f.uploaded_at
                 FROM uploaded_files f JOIN tasks t ON t.id = f.task_id
                 WHERE t.category = ?1
                 ORDER BY f.uploaded_at, f.id",
            )?;
            let files = stmt
                .query_map(params![category], map_uploaded_file)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(files)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tasks::TaskDraft;

    #[test]
    fn add_uploaded_file_requires_task() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.add_uploaded_file(5, "1_art.png").is_err());
    }

    #[test]
    fn files_cascade_with_task() {
        let db = Database::open_in_memory().unwrap();
        let task = db
            .create_task(&TaskDraft {
                title: "Key art".to_string(),
                category: Category::Designer,
                ..Default::default()
            })
            .unwrap();

        db.add_uploaded_file(task.id, "1_art.png").unwrap();
        db.add_uploaded_file(task.id, "2_clip.mp4").unwrap();
        assert_eq!(db.get_uploaded_files(task.id).unwrap().len(), 2);

        assert!(db.delete_task(task.id).unwrap());
        assert!(db.get_uploaded_files(task.id).unwrap().is_empty());
    }
}
