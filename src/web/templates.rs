//! HTML rendering for the board page.
//!
//! The page shell is embedded at compile time using `include_str!`; the
//! body is assembled from fragments here.

use crate::db::listing::Listing;
use crate::policy;
use crate::types::{Assignee, Category, Priority, SortKey, TaskRow, TaskStatus, UploadedFile};
use chrono::{DateTime, Utc};

/// The base HTML template with styles and header.
pub const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");

/// Everything the board page shows.
pub struct IndexPage<'a> {
    pub listing: &'a Listing,
    pub assignees: &'a [Assignee],
    pub notices: &'a [String],
    /// Raw query string of the current request, re-attached to every form.
    pub query: Option<&'a str>,
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Format a millisecond timestamp for display.
pub fn format_timestamp(ms: Option<i64>) -> String {
    ms.and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `path` with the current query string appended, HTML-escaped for an attribute.
fn action(path: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => html_escape(&format!("{}?{}", path, q)),
        None => html_escape(path),
    }
}

/// Wrap a body in the layout.
pub fn render_layout(title: &str, body: &str) -> String {
    LAYOUT_TEMPLATE
        .replace("{{title}}", &html_escape(title))
        .replace("{{body}}", body)
}

/// Render the full board page.
pub fn render_index(page: &IndexPage<'_>) -> String {
    let mut body = String::new();

    for notice in page.notices {
        body.push_str(&format!(
            r#"<div class="message message-error">{}</div>"#,
            html_escape(notice)
        ));
    }

    body.push_str(&render_tabs(page.listing.category));
    body.push_str(&render_add_form(page));
    body.push_str(&render_sort_form(page.listing));

    if page.listing.rows.is_empty() {
        body.push_str(r#"<div class="card empty-state">No tasks in this category yet</div>"#);
    } else {
        for row in &page.listing.rows {
            body.push_str(&render_task(row, page.listing.category, page.query));
        }
    }

    render_layout(
        &format!("{} tasks - Game Task Board", page.listing.category.label()),
        &body,
    )
}

fn render_tabs(active: Category) -> String {
    let mut html = String::from(r#"<nav class="tabs">"#);
    for category in Category::ALL {
        html.push_str(&format!(
            r#"<a href="/?category={value}"{class}>{label}</a>"#,
            value = category.as_str(),
            class = if category == active { r#" class="active""# } else { "" },
            label = category.label(),
        ));
    }
    html.push_str("</nav>");
    html
}

fn options<T: Copy + PartialEq>(
    values: &[T],
    selected: T,
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> String {
    values
        .iter()
        .map(|&v| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                value(v),
                if v == selected { " selected" } else { "" },
                label(v)
            )
        })
        .collect()
}

fn render_add_form(page: &IndexPage<'_>) -> String {
    let category_options = options(
        &Category::ALL,
        page.listing.category,
        |c| c.as_str(),
        |c| c.label(),
    );
    let priority_options = options(
        &Priority::ALL,
        Priority::default(),
        |p| p.as_str(),
        |p| p.label(),
    );
    let assignee_options: String = page
        .assignees
        .iter()
        .map(|a| {
            format!(
                r#"<option value="{}">{}</option>"#,
                a.id,
                html_escape(&a.name)
            )
        })
        .collect();

    format!(
        r#"<div class="card">
    <h2>Add task</h2>
    <form class="add-task" method="post" action="{action}">
        <input type="text" name="title" placeholder="Title" required>
        <select name="category">{category_options}</select>
        <input type="date" name="due_date">
        <select name="priority">{priority_options}</select>
        <select name="assignee_id"><option value="">Unassigned / new</option>{assignee_options}</select>
        <input type="text" name="new_assignee_name" placeholder="New assignee name">
        <textarea name="description" placeholder="Description"></textarea>
        <button type="submit">Add</button>
    </form>
</div>"#,
        action = action("/add", page.query),
    )
}

fn render_sort_form(listing: &Listing) -> String {
    let sort_options = options(
        SortKey::options(listing.category),
        listing.sort,
        |s| s.as_str(),
        |s| s.label(),
    );
    format!(
        r#"<form class="card actions" method="get" action="/">
    <input type="hidden" name="category" value="{category}">
    <label>Sort by <select name="sort" onchange="this.form.submit()">{sort_options}</select></label>
    <noscript><button type="submit">Apply</button></noscript>
</form>"#,
        category = listing.category.as_str(),
    )
}

fn render_file(file: &UploadedFile) -> String {
    let url = html_escape(&format!(
        "/uploads/{}",
        urlencoding::encode(&file.filename)
    ));
    let name = html_escape(&file.filename);
    if policy::is_video(&file.filename) {
        format!(r#"<video controls preload="metadata" src="{url}" title="{name}"></video>"#)
    } else if policy::is_image(&file.filename) {
        format!(r#"<a href="{url}" target="_blank"><img src="{url}" alt="{name}"></a>"#)
    } else {
        format!(r#"<a href="{url}" target="_blank">{name}</a>"#)
    }
}

/// `accept` attribute listing the extensions a category takes.
fn accept_attr(category: Category) -> String {
    let exts: Vec<&str> = match category {
        Category::Planner => policy::PLANNER_EXTENSIONS.to_vec(),
        Category::Designer => policy::IMAGE_EXTENSIONS
            .iter()
            .chain(policy::VIDEO_EXTENSIONS)
            .copied()
            .collect(),
        Category::Programmer => policy::VIDEO_EXTENSIONS.to_vec(),
    };
    exts.iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(",")
}

fn render_task(row: &TaskRow, category: Category, query: Option<&str>) -> String {
    let task = &row.task;
    let id = task.id;

    let mut meta = vec![
        format!(
            "Assignee: {}",
            html_escape(row.assignee.as_deref().unwrap_or("Unassigned"))
        ),
        format!(
            "Due: {}",
            task.due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!("Created: {}", format_timestamp(Some(task.created_at))),
    ];
    if category == Category::Planner {
        meta.push(format!("Latest upload: {}", format_timestamp(row.latest_upload)));
    }
    let meta_html: String = meta.iter().map(|m| format!("<span>{}</span>", m)).collect();

    let description = task
        .description
        .as_deref()
        .map(|d| format!("<p>{}</p>", html_escape(d)))
        .unwrap_or_default();

    let files_html = if row.files.is_empty() {
        String::new()
    } else {
        let items: String = row.files.iter().map(render_file).collect();
        format!(r#"<div class="files">{}</div>"#, items)
    };

    let priority_class = match task.priority {
        Priority::High => "badge badge-high",
        Priority::Medium => "badge",
        Priority::Low => "badge badge-low",
    };

    format!(
        r#"<div class="card task" id="task-{id}">
    <div class="task-header">
        <h3>{title}</h3>
        <span><span class="{priority_class}">{priority}</span> <span class="badge">{status}</span></span>
    </div>
    <div class="meta">{meta_html}</div>
    {description}
    {files_html}
    <div class="actions">
        <form method="post" action="{status_action}">
            <select name="status">{status_options}</select>
            <button type="submit">Set status</button>
        </form>
        <form method="post" action="{priority_action}">
            <select name="priority">{priority_options}</select>
            <button type="submit">Set priority</button>
        </form>
        <form method="post" action="{upload_action}" enctype="multipart/form-data">
            <input type="file" name="file" accept="{accept}">
            <button type="submit">Upload</button>
        </form>
        <form method="post" action="{delete_action}" onsubmit="return confirm('Delete this task and its files?');">
            <button type="submit" class="btn-danger">Delete</button>
        </form>
    </div>
</div>"#,
        title = html_escape(&task.title),
        priority = task.priority.label(),
        status = task.status.label(),
        status_action = action(&format!("/update/status/{}", id), query),
        status_options = options(&TaskStatus::ALL, task.status, |s| s.as_str(), |s| s.label()),
        priority_action = action(&format!("/update/priority/{}", id), query),
        priority_options = options(&Priority::ALL, task.priority, |p| p.as_str(), |p| p.label()),
        upload_action = action(&format!("/upload/{}", id), query),
        accept = accept_attr(task.category),
        delete_action = action(&format!("/delete/{}", id), query),
    )
}
