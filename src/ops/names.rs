use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::io::naming::{MARKDOWN_EXTENSION, add_markdown_extension, is_index_file};
use crate::io::store_io::{StoreError, io_error};

/// Markdown file names directly in `dir` (the index file excluded)
fn markdown_files_in(dir: &Path) -> Result<HashSet<String>, StoreError> {
    let mut files = HashSet::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(MARKDOWN_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && !is_index_file(name)
        {
            files.insert(name.to_string());
        }
    }
    Ok(files)
}

fn candidate_name(base: &str, counter: u64) -> String {
    format!("{} {}", base, counter)
}

/// First free `"<base> <n>"` in `dir`, counting up from 0.
///
/// Only markdown files are checked; the result carries no `.md` suffix.
pub fn default_name(dir: &Path, base: &str) -> Result<String, StoreError> {
    let taken = markdown_files_in(dir)?;
    let mut counter = 0;
    loop {
        let candidate = candidate_name(base, counter);
        if !taken.contains(&add_markdown_extension(&candidate)) {
            return Ok(candidate);
        }
        counter += 1;
    }
}
