use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::io::store_io::{StoreError, io_error, resolve};
use crate::model::store::Store;
use crate::model::task::{Task, TaskKind};

/// Parent of `dir`, refusing to leave the store root.
pub fn parent_directory_of(store: &Store, dir: &Path) -> Result<PathBuf, StoreError> {
    let dir = fs::canonicalize(dir).map_err(|e| io_error(dir, e))?;
    if dir == store.root || !dir.starts_with(&store.root) {
        return Err(StoreError::AtRoot);
    }
    dir.parent().map(Path::to_path_buf).ok_or(StoreError::AtRoot)
}

/// The folder holding a directory task's subtasks.
pub fn child_directory_of(task: &Task) -> Result<PathBuf, StoreError> {
    match task.kind {
        TaskKind::Directory => Ok(task.folder_path()),
        TaskKind::File => Err(StoreError::NotADirectory(task.name.clone())),
    }
}

/// Turn a `/`-separated path relative to the root into a `PathBuf`,
/// rejecting anything that could climb out of the store.
fn checked_relative(rel: &str) -> Result<PathBuf, StoreError> {
    let mut out = PathBuf::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => {
                return Err(StoreError::InvalidName {
                    name: rel.to_string(),
                    reason: "path must stay inside the task tree",
                });
            }
        }
    }
    Ok(out)
}

/// Directory at `rel` under the root (`""` is the root itself).
pub fn directory_of(store: &Store, rel: &str) -> Result<PathBuf, StoreError> {
    let dir = store.root.join(checked_relative(rel)?);
    if !dir.is_dir() {
        return Err(StoreError::NotADirectory(rel.to_string()));
    }
    Ok(dir)
}

/// Resolve a task addressed from the root, e.g. `Taxes/Form`.
pub fn locate(store: &Store, rel: &str) -> Result<Task, StoreError> {
    let rel_path = checked_relative(rel)?;
    let name = rel_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::InvalidName {
            name: rel.to_string(),
            reason: "no task name given",
        })?;
    let dir = match rel_path.parent() {
        Some(parent) => store.root.join(parent),
        None => store.root.clone(),
    };
    resolve(&dir, name)
}

/// Path of `path` relative to the root, `/`-separated; `""` for the root.
pub fn relative_to_root(store: &Store, path: &Path) -> String {
    let rel = path.strip_prefix(&store.root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Root-relative address of a task, as accepted by `locate`.
pub fn task_address(store: &Store, task: &Task) -> String {
    let dir = relative_to_root(store, &task.dir);
    if dir.is_empty() {
        task.name.clone()
    } else {
        format!("{}/{}", dir, task.name)
    }
}
