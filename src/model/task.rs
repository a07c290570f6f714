use std::path::PathBuf;

use serde::Serialize;

use crate::io::naming::{INDEX_FILE_NAME, add_markdown_extension};

/// How a task is laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// `<dir>/<name>.md`
    File,
    /// `<dir>/<name>/_index.md`, subtasks live next to the index
    Directory,
}

/// A task bound to a concrete location.
///
/// This is a snapshot of what was on disk when the task was resolved. The
/// mutation functions in `ops::task_ops` keep it current; any other change to
/// the filesystem means the task must be resolved again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Directory containing the task entry
    pub dir: PathBuf,
    /// Task name (never carries the `.md` suffix)
    pub name: String,
    pub kind: TaskKind,
}

impl Task {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>, kind: TaskKind) -> Self {
        Task {
            dir: dir.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == TaskKind::Directory
    }

    /// The markdown file holding this task's content
    pub fn path(&self) -> PathBuf {
        match self.kind {
            TaskKind::File => self.dir.join(add_markdown_extension(&self.name)),
            TaskKind::Directory => self.folder_path().join(INDEX_FILE_NAME),
        }
    }

    /// The entry this task occupies in its directory: the `.md` file for a
    /// file task, the folder for a directory task.
    pub fn entry_path(&self) -> PathBuf {
        match self.kind {
            TaskKind::File => self.path(),
            TaskKind::Directory => self.folder_path(),
        }
    }

    /// `<dir>/<name>`, where subtasks live once the task is a directory.
    /// Returned for either kind; for a file task the folder may not exist.
    pub fn folder_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}
