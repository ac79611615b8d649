//! Board operations: the listing read and the five mutations.
//!
//! The HTTP layer is a thin shell around [`Board`]; everything that decides
//! whether a write happens lives here so it can be tested without a server.

use crate::db::Database;
use crate::db::listing::Listing;
use crate::db::tasks::TaskDraft;
use crate::error::{BoardError, BoardResult};
use crate::policy;
use crate::storage::UploadStore;
use crate::types::{Category, NewTask, Priority, Task, TaskStatus, UploadedFile};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Date format accepted for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A file part received from an upload form.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Client-side name; may be empty.
    pub filename: String,
    pub contents: Vec<u8>,
}

/// Why an upload wrote nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    NoFile,
    EmptyFilename,
    DisallowedType { filename: String, category: Category },
}

impl UploadRejection {
    /// Notice shown to the user on the next page render.
    pub fn notice(&self) -> String {
        match self {
            UploadRejection::NoFile => "No file was selected".to_string(),
            UploadRejection::EmptyFilename => "The file has no name".to_string(),
            UploadRejection::DisallowedType { filename, category } => format!(
                "File type not allowed for {} tasks: {}",
                category.label().to_lowercase(),
                filename
            ),
        }
    }
}

/// Result of an upload request that found its task.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Stored(UploadedFile),
    Rejected(UploadRejection),
}

/// The task board: database plus upload directory.
#[derive(Clone)]
pub struct Board {
    db: Arc<Database>,
    store: UploadStore,
}

impl Board {
    pub fn new(db: Arc<Database>, store: UploadStore) -> Self {
        Self { db, store }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Fetch a task or fail with not-found.
    pub fn require_task(&self, task_id: i64) -> BoardResult<Task> {
        self.db
            .get_task(task_id)?
            .ok_or_else(|| BoardError::task_not_found(task_id))
    }

    /// List the active category. An absent or unknown category selects planner.
    pub fn listing(&self, category: Option<&str>, sort: Option<&str>) -> BoardResult<Listing> {
        let category = category
            .and_then(Category::from_str)
            .unwrap_or(Category::Planner);
        Ok(self.db.list_tasks(category, sort)?)
    }

    /// Create a task from the add form.
    ///
    /// Returns `Ok(None)` without writing when the title is blank or the
    /// category is not one of the known set. A due date that does not parse
    /// as `YYYY-MM-DD` fails the request.
    pub fn add_task(&self, form: &NewTask) -> BoardResult<Option<Task>> {
        let title = form.title.trim();
        let category = form.category.as_deref().and_then(Category::from_str);
        let Some(category) = category.filter(|_| !title.is_empty()) else {
            return Ok(None);
        };

        let due_date = match non_blank(form.due_date.as_deref()) {
            Some(raw) => Some(parse_due_date(raw)?),
            None => None,
        };

        let draft = TaskDraft {
            title: title.to_string(),
            description: non_blank(form.description.as_deref()).map(str::to_string),
            category,
            due_date,
            priority: form
                .priority
                .as_deref()
                .and_then(Priority::from_str)
                .unwrap_or_default(),
            assignee_id: non_blank(form.assignee_id.as_deref()).and_then(|id| id.parse().ok()),
            new_assignee_name: non_blank(form.new_assignee_name.as_deref()).map(str::to_string),
        };

        let task = self.db.create_task(&draft)?;
        info!(task_id = task.id, category = category.as_str(), "Task created");
        Ok(Some(task))
    }

    /// Attach a file to a task.
    ///
    /// The task must exist. The file must be present, named, and carry an
    /// extension the task's category allows; otherwise nothing is written and
    /// the rejection is returned for display.
    pub fn upload_file(
        &self,
        task_id: i64,
        file: Option<IncomingFile>,
    ) -> BoardResult<UploadOutcome> {
        let task = self.require_task(task_id)?;

        let Some(file) = file else {
            return Ok(UploadOutcome::Rejected(UploadRejection::NoFile));
        };
        if file.filename.is_empty() {
            return Ok(UploadOutcome::Rejected(UploadRejection::EmptyFilename));
        }
        if !policy::allowed(&file.filename, task.category) {
            warn!(
                task_id,
                filename = %file.filename,
                category = task.category.as_str(),
                "Rejected upload with disallowed extension"
            );
            return Ok(UploadOutcome::Rejected(UploadRejection::DisallowedType {
                filename: file.filename,
                category: task.category,
            }));
        }

        let name = storage_name(&file.filename, task.category);
        let stored_name = self
            .store
            .save(&name, &file.contents)
            .map_err(BoardError::storage)?;

        match self.db.add_uploaded_file(task.id, &stored_name) {
            Ok(record) => {
                info!(task_id, file = %stored_name, "File uploaded");
                Ok(UploadOutcome::Stored(record))
            }
            Err(e) => {
                // Keep disk and table in step when the row could not be written.
                if let Err(cleanup) = self.store.remove(&stored_name) {
                    warn!(file = %stored_name, "Failed to remove orphaned upload: {:#}", cleanup);
                }
                match self.db.get_task(task_id)? {
                    None => Err(BoardError::task_not_found(task_id)),
                    Some(_) => Err(e.into()),
                }
            }
        }
    }

    /// Delete a task and (by cascade) its file rows, then its stored files.
    pub fn delete_task(&self, task_id: i64) -> BoardResult<()> {
        self.require_task(task_id)?;

        let files = self.db.get_uploaded_files(task_id)?;
        if !self.db.delete_task(task_id)? {
            return Err(BoardError::task_not_found(task_id));
        }

        // The rows are gone; a file that cannot be removed is only logged.
        for file in &files {
            if let Err(e) = self.store.remove(&file.filename) {
                warn!(task_id, file = %file.filename, "Failed to remove stored file: {:#}", e);
            }
        }
        info!(task_id, files = files.len(), "Task deleted");
        Ok(())
    }

    /// Set a task's status. Values outside the status set are ignored.
    /// Returns whether the task was updated.
    pub fn update_status(&self, task_id: i64, value: Option<&str>) -> BoardResult<bool> {
        self.require_task(task_id)?;
        let Some(status) = value.and_then(TaskStatus::from_str) else {
            return Ok(false);
        };
        if !self.db.update_task_status(task_id, status)? {
            return Err(BoardError::task_not_found(task_id));
        }
        info!(task_id, status = status.as_str(), "Task status updated");
        Ok(true)
    }

    /// Set a task's priority. Values outside the priority set are ignored.
    /// Returns whether the task was updated.
    pub fn update_priority(&self, task_id: i64, value: Option<&str>) -> BoardResult<bool> {
        self.require_task(task_id)?;
        let Some(priority) = value.and_then(Priority::from_str) else {
            return Ok(false);
        };
        if !self.db.update_task_priority(task_id, priority)? {
            return Err(BoardError::task_not_found(task_id));
        }
        info!(task_id, priority = priority.as_str(), "Task priority updated");
        Ok(true)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_due_date(raw: &str) -> BoardResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).map_err(|e| {
        BoardError::invalid_value(
            "due_date",
            format!("Invalid due date '{}': expected YYYY-MM-DD ({})", raw, e),
        )
    })
}

/// Sanitised name for an accepted upload.
///
/// Sanitising can strip a name down to nothing useful (for example a name
/// made only of non-ASCII characters); the extension that passed the policy
/// check is always kept.
fn storage_name(original: &str, category: Category) -> String {
    let cleaned = policy::secure_filename(original);
    if policy::allowed(&cleaned, category) {
        return cleaned;
    }
    let ext = policy::extension(original).unwrap_or_default();
    format!("upload.{}", ext)
}
