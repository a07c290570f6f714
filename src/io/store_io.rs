use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::config_io::{self, ConfigError};
use crate::io::naming::{self, INDEX_FILE_NAME};
use crate::model::store::Store;
use crate::model::task::{Task, TaskKind};
use crate::ops::{recency, task_ops};

/// Error type for every store operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Entry is neither `<name>.md` nor `<name>/_index.md`. Listing skips these.
    #[error("not a task: {path} ({reason})")]
    NotATask { path: PathBuf, reason: &'static str },
    #[error("invalid task name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("name already taken: {0}")]
    NameCollision(PathBuf),
    #[error("{0} is not a directory")]
    NotADirectory(String),
    #[error("already at the root of the task tree")]
    AtRoot,
    #[error("{name} still has {count} subtask(s)")]
    HasSubtasks { name: String, count: usize },
    #[error("{name} is already in {dir}")]
    AlreadyThere { name: String, dir: PathBuf },
    #[error("cannot move {name} into its own subtree")]
    InvalidMove { name: String },
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Open the task tree rooted at `root`, loading `.terdo.toml` if present.
pub fn open_store(root: &Path) -> Result<Store, StoreError> {
    let root = fs::canonicalize(root).map_err(|e| io_error(root, e))?;
    if !root.is_dir() {
        return Err(StoreError::NotADirectory(root.display().to_string()));
    }
    let config = config_io::read_config(&root)?;
    Ok(Store { root, config })
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Decide what `name` is inside `dir` without touching the filesystem.
///
/// A directory with an index wins over a same-named `.md` file.
pub fn classify(dir: &Path, name: &str) -> Option<TaskKind> {
    let folder = dir.join(name);
    if folder.is_dir() && folder.join(INDEX_FILE_NAME).is_file() {
        return Some(TaskKind::Directory);
    }
    if dir.join(naming::add_markdown_extension(name)).is_file() {
        return Some(TaskKind::File);
    }
    None
}

/// Resolve `raw_name` inside `dir` to a task.
///
/// A directory task without subtasks is collapsed into a file task before
/// it is returned. When a same-named `.md` file is in the way the folder
/// stays a directory task and a warning is logged.
pub fn resolve(dir: &Path, raw_name: &str) -> Result<Task, StoreError> {
    let name = naming::strip_markdown_extension(raw_name);
    let rejected = if name.is_empty() {
        Some("empty name")
    } else if naming::is_reserved_name(name) {
        Some("reserved name")
    } else {
        None
    };
    if let Some(reason) = rejected {
        return Err(StoreError::NotATask {
            path: dir.join(raw_name),
            reason,
        });
    }

    match classify(dir, name) {
        Some(TaskKind::Directory) => {
            let mut task = Task::new(dir, name, TaskKind::Directory);
            if count_children(&task.folder_path())? == 0 {
                tracing::debug!(task = %task.folder_path().display(), "collapsing empty directory task");
                match task_ops::demote_to_file(&mut task) {
                    Ok(()) => {}
                    // A stray `<name>.md` blocks the collapse; keep the folder task
                    Err(StoreError::NameCollision(blocker)) => {
                        tracing::warn!(
                            task = %task.folder_path().display(),
                            blocker = %blocker.display(),
                            "cannot collapse empty directory task"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(task)
        }
        Some(TaskKind::File) => Ok(Task::new(dir, name, TaskKind::File)),
        None => Err(StoreError::NotATask {
            path: dir.join(name),
            reason: "no markdown file or directory with an index",
        }),
    }
}

/// Names of the entries directly in `dir`, with the `.md` suffix stripped
/// and duplicates (`Foo.md` next to `Foo/`) folded together.
fn candidate_names(dir: &Path) -> Result<BTreeSet<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| io_error(dir, e))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            tracing::warn!(entry = ?entry.path(), "skipping entry with a non UTF-8 name");
            continue;
        };
        if naming::is_index_file(file_name) {
            continue;
        }
        names.insert(naming::strip_markdown_extension(file_name).to_string());
    }
    Ok(names)
}

/// Tasks directly in `dir`, classified without collapsing anything.
/// Unordered; used for counting and recency walks.
pub fn scan_tasks(dir: &Path) -> Result<Vec<Task>, StoreError> {
    Ok(candidate_names(dir)?
        .into_iter()
        .filter(|name| !name.is_empty() && !naming::is_reserved_name(name))
        .filter_map(|name| classify(dir, &name).map(|kind| Task::new(dir, name, kind)))
        .collect())
}

/// Number of tasks directly inside `dir`
pub fn count_children(dir: &Path) -> Result<usize, StoreError> {
    Ok(scan_tasks(dir)?.len())
}

/// Subtask count of a task: 0 for files, direct children for directories
pub fn child_count(task: &Task) -> Result<usize, StoreError> {
    match task.kind {
        TaskKind::File => Ok(0),
        TaskKind::Directory => count_children(&task.folder_path()),
    }
}

/// List the tasks in `dir`, most recently edited first.
///
/// Entries that are not tasks are skipped. Every call reads the disk again.
pub fn list_tasks(dir: &Path) -> Result<Vec<Task>, StoreError> {
    let mut tasks = Vec::new();
    for name in candidate_names(dir)? {
        match resolve(dir, &name) {
            Ok(task) => tasks.push(task),
            Err(StoreError::NotATask { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    recency::order_by_recency(tasks)
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

pub fn load_content(task: &Task) -> Result<String, StoreError> {
    let path = task.path();
    fs::read_to_string(&path).map_err(|e| io_error(&path, e))
}

/// Replace the task's content with `text`, verbatim.
///
/// The backing file must exist; this never creates a task.
pub fn save_content(task: &Task, text: &str) -> Result<(), StoreError> {
    let path = task.path();
    let metadata = fs::metadata(&path).map_err(|e| io_error(&path, e))?;
    if !metadata.is_file() {
        return Err(io_error(
            &path,
            io::Error::new(io::ErrorKind::NotFound, "backing file is missing"),
        ));
    }
    atomic_write(&path, text.as_bytes(), Some(metadata.permissions()))
        .map_err(|e| io_error(&path, e))?;
    tracing::debug!(task = %path.display(), bytes = text.len(), "saved content");
    Ok(())
}

/// Write through a temp file in the same directory, then rename it over
/// `path`.
pub fn atomic_write(path: &Path, content: &[u8], permissions: Option<fs::Permissions>) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
