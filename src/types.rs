//! Core types for the game task board.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Role category a task belongs to.
///
/// The category partitions the board, decides which file types may be
/// attached to a task and which orderings the listing offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Planner,
    Designer,
    #[default]
    Programmer,
}

impl Category {
    /// All categories in board order.
    pub const ALL: [Category; 3] = [Category::Planner, Category::Designer, Category::Programmer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Planner => "planner",
            Category::Designer => "designer",
            Category::Programmer => "programmer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planner" => Some(Category::Planner),
            "designer" => Some(Category::Designer),
            "programmer" => Some(Category::Programmer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Planner => "Planner",
            Category::Designer => "Designer",
            Category::Programmer => "Programmer",
        }
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(TaskStatus::NotStarted),
            "in_progress" => Some(TaskStatus::InProgress),
            "review" => Some(TaskStatus::Review),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not started",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Ordering applied to one category's listing.
///
/// Each category accepts its own three keys; anything else resolves to the
/// category default through [`SortKey::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Planner: most recent upload first.
    UploadDateDesc,
    UploadDateAsc,
    /// Planner and designer.
    TitleAsc,
    /// Designer: newest task first.
    CreatedAtDesc,
    CreatedAtAsc,
    /// Programmer: earliest due date first, undated tasks last.
    DueDateAsc,
    /// Programmer: latest due date first, undated tasks first.
    DueDateDesc,
    StatusAsc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::UploadDateDesc => "upload_date_desc",
            SortKey::UploadDateAsc => "upload_date_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::CreatedAtDesc => "created_at_desc",
            SortKey::CreatedAtAsc => "created_at_asc",
            SortKey::DueDateAsc => "due_date_asc",
            SortKey::DueDateDesc => "due_date_desc",
            SortKey::StatusAsc => "status_asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::UploadDateDesc => "Latest upload (newest)",
            SortKey::UploadDateAsc => "Latest upload (oldest)",
            SortKey::TitleAsc => "Title",
            SortKey::CreatedAtDesc => "Created (newest)",
            SortKey::CreatedAtAsc => "Created (oldest)",
            SortKey::DueDateAsc => "Due date (soonest)",
            SortKey::DueDateDesc => "Due date (latest)",
            SortKey::StatusAsc => "Status",
        }
    }

    /// The keys a category offers, default first.
    pub fn options(category: Category) -> &'static [SortKey] {
        match category {
            Category::Planner => &[
                SortKey::UploadDateDesc,
                SortKey::UploadDateAsc,
                SortKey::TitleAsc,
            ],
            Category::Designer => &[
                SortKey::CreatedAtDesc,
                SortKey::CreatedAtAsc,
                SortKey::TitleAsc,
            ],
            Category::Programmer => &[
                SortKey::DueDateAsc,
                SortKey::DueDateDesc,
                SortKey::StatusAsc,
            ],
        }
    }

    pub fn default_for(category: Category) -> SortKey {
        Self::options(category)[0]
    }

    /// Resolve a requested key against a category.
    ///
    /// Absent keys and keys the category does not offer fall back to the
    /// category default.
    pub fn resolve(category: Category, requested: Option<&str>) -> SortKey {
        requested
            .and_then(|key| {
                Self::options(category)
                    .iter()
                    .copied()
                    .find(|option| option.as_str() == key)
            })
            .unwrap_or_else(|| Self::default_for(category))
    }
}

/// A person tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: i64,
    pub name: String,
}

/// A task on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub category: Category,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    /// Milliseconds since the UNIX epoch.
    pub created_at: i64,
    pub assignee_id: Option<i64>,
}

/// A file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    pub task_id: i64,
    /// Name of the file inside the upload directory.
    pub filename: String,
    pub uploaded_at: i64,
}

/// One row of the board listing.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRow {
    pub task: Task,
    pub assignee: Option<String>,
    pub files: Vec<UploadedFile>,
    /// Timestamp of the most recent upload. Only computed for planner rows.
    pub latest_upload: Option<i64>,
}

/// Input for creating a task, as submitted by the add form.
///
/// Every field is raw text; validation happens in [`crate::board::Board::add_task`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<String>,
    pub new_assignee_name: Option<String>,
}
