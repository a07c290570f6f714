use std::ops::Range;
use std::path::Path;

use regex::Regex;

use crate::io::store_io::{StoreError, list_tasks, load_content};
use crate::model::task::Task;

/// Which part of a task matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Name,
    Content,
}

/// A search hit on one field of one task
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub task: Task,
    pub field: MatchField,
    /// Byte ranges of the matches within the field
    pub spans: Vec<Range<usize>>,
}

fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search names and content of every task under `dir`, depth first,
/// siblings in recency order.
pub fn search_tasks(dir: &Path, re: &Regex) -> Result<Vec<SearchHit>, StoreError> {
    let mut hits = Vec::new();
    search_dir(dir, re, &mut hits)?;
    Ok(hits)
}

fn search_dir(dir: &Path, re: &Regex, hits: &mut Vec<SearchHit>) -> Result<(), StoreError> {
    for task in list_tasks(dir)? {
        search_task(re, &task, hits)?;
        if task.is_directory() {
            search_dir(&task.folder_path(), re, hits)?;
        }
    }
    Ok(())
}

fn search_task(re: &Regex, task: &Task, hits: &mut Vec<SearchHit>) -> Result<(), StoreError> {
    let spans = find_matches(re, &task.name);
    if !spans.is_empty() {
        hits.push(SearchHit {
            task: task.clone(),
            field: MatchField::Name,
            spans,
        });
    }

    let content = load_content(task)?;
    let spans = find_matches(re, &content);
    if !spans.is_empty() {
        hits.push(SearchHit {
            task: task.clone(),
            field: MatchField::Content,
            spans,
        });
    }
    Ok(())
}
