use std::fmt::Write;
use std::time::SystemTime;

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;

use crate::io::store_io::{self, StoreError};
use crate::model::store::Store;
use crate::model::task::{Task, TaskKind};
use crate::ops::navigate::task_address;
use crate::ops::recency::last_edited;
use crate::ops::search::{MatchField, SearchHit};
use crate::ops::tree::TreeNode;
use crate::util::unicode::fit_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub name: String,
    /// Address from the root, as accepted by every command
    pub path: String,
    pub kind: TaskKind,
    pub subtasks: usize,
    /// RFC 3339, local time
    pub last_edited: String,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub task: String,
    pub field: &'static str,
    pub spans: Vec<[usize; 2]>,
}

#[derive(Serialize)]
pub struct TreeNodeJson {
    pub name: String,
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeJson>,
}

#[derive(Serialize)]
pub struct DirJson {
    /// Directory from the root; "." is the root
    pub dir: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn local_time(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}

/// Format with a user-supplied chrono pattern, falling back to RFC 3339 when
/// the pattern is invalid.
fn format_time(time: SystemTime, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", local_time(time).format(pattern)).is_err() {
        out = local_time(time).to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
}

pub fn task_to_json(store: &Store, task: &Task) -> Result<TaskJson, StoreError> {
    Ok(TaskJson {
        name: task.name.clone(),
        path: task_address(store, task),
        kind: task.kind,
        subtasks: store_io::child_count(task)?,
        last_edited: local_time(last_edited(task)?).to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

fn field_name(field: MatchField) -> &'static str {
    match field {
        MatchField::Name => "name",
        MatchField::Content => "content",
    }
}

pub fn search_hit_to_json(store: &Store, hit: &SearchHit) -> SearchHitJson {
    SearchHitJson {
        task: task_address(store, &hit.task),
        field: field_name(hit.field),
        spans: hit.spans.iter().map(|r| [r.start, r.end]).collect(),
    }
}

pub fn tree_to_json(nodes: &[TreeNode]) -> Vec<TreeNodeJson> {
    nodes
        .iter()
        .map(|node| TreeNodeJson {
            name: node.task.name.clone(),
            kind: node.task.kind,
            children: tree_to_json(&node.children),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One listing row: marker, name column, subtask count, last edit.
///
/// ```text
/// ▸ Taxes                (2)  2025-04-01 09:30
///   Groceries                 2025-03-28 18:02
/// ```
pub fn format_task_line(store: &Store, task: &Task) -> Result<String, StoreError> {
    let display = &store.config.display;
    let marker = if task.is_directory() { '▸' } else { ' ' };
    let count = match store_io::child_count(task)? {
        0 => String::new(),
        n => format!("({})", n),
    };
    let edited = format_time(last_edited(task)?, &display.date_format);
    Ok(format!(
        "{} {} {:>5}  {}",
        marker,
        fit_to_width(&task.name, display.name_width),
        count,
        edited
    ))
}

pub fn format_search_hit(store: &Store, hit: &SearchHit) -> String {
    let count = hit.spans.len();
    format!(
        "{}: {} ({} match{})",
        task_address(store, &hit.task),
        field_name(hit.field),
        count,
        if count == 1 { "" } else { "es" }
    )
}

/// `"."` for the root, the `/`-separated path otherwise
pub fn display_dir(rel: String) -> String {
    if rel.is_empty() { ".".to_string() } else { rel }
}
