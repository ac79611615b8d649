//! File allow-lists per task category.
//!
//! Pure functions only: the upload path asks [`allowed`] before anything is
//! written, and the listing page asks [`is_video`] / [`is_image`] to pick a
//! widget for a file that was already accepted.

use crate::types::Category;

/// Extensions accepted for planner documents.
pub const PLANNER_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];

/// Still-image extensions accepted for designers.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Video extensions, accepted for designers and programmers.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

/// Lowercased suffix after the last dot, if the name has one.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether `ext` is in the allow-list for `category`.
fn category_allows(category: Category, ext: &str) -> bool {
    match category {
        Category::Planner => PLANNER_EXTENSIONS.contains(&ext),
        Category::Designer => IMAGE_EXTENSIONS.contains(&ext) || VIDEO_EXTENSIONS.contains(&ext),
        Category::Programmer => VIDEO_EXTENSIONS.contains(&ext),
    }
}

/// True iff the filename has an extension registered for the category.
pub fn allowed(filename: &str, category: Category) -> bool {
    extension(filename).is_some_and(|ext| category_allows(category, &ext))
}

/// True iff the filename has a video extension, regardless of category.
pub fn is_video(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// True iff the filename has a still-image extension.
pub fn is_image(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client-supplied filename to something safe to store.
///
/// Directory components are dropped, whitespace becomes `_`, and anything
/// outside ASCII alphanumerics, `.`, `_` and `-` is removed. Leading and
/// trailing dots and underscores are trimmed so the result can never name a
/// hidden file or a parent directory. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}
