//! Mapping between task names and file names.

use crate::io::store_io::StoreError;

pub const MARKDOWN_EXTENSION: &str = "md";

/// Content file of a directory task. Never a task by itself.
pub const INDEX_FILE_NAME: &str = "_index.md";

/// `"Groceries"` → `"Groceries.md"`
pub fn add_markdown_extension(name: &str) -> String {
    format!("{}.{}", name, MARKDOWN_EXTENSION)
}

/// `"Groceries.md"` → `"Groceries"`; names without the suffix pass through.
pub fn strip_markdown_extension(file_name: &str) -> &str {
    file_name
        .strip_suffix(MARKDOWN_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(file_name)
}

pub fn is_index_file(file_name: &str) -> bool {
    file_name == INDEX_FILE_NAME
}

/// True for names that would map onto the index file (`_index`, `_index.md`)
pub fn is_reserved_name(name: &str) -> bool {
    is_index_file(&add_markdown_extension(strip_markdown_extension(name)))
}

/// Check a user-supplied name and return it without its `.md` suffix.
pub fn validate_task_name(raw: &str) -> Result<&str, StoreError> {
    let name = strip_markdown_extension(raw);
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if is_reserved_name(name) {
        Some("name is reserved for the index file")
    } else if name.contains('/') || name.contains('\\') {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative path")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidName {
            name: raw.to_string(),
            reason,
        }),
        None => Ok(name),
    }
}
