//! Mutations on the task tree.
//!
//! Each operation is a short sequence of plain filesystem calls with no
//! rollback. Where an operation has more than one step, the steps are ordered
//! so that a failure part way leaves the original content in place (the
//! folder is created before the file moves into it, never the other way
//! round). A half-finished promote can leave an empty folder or an index-only
//! directory behind; the next `resolve` collapses the latter back to a file.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::io::naming::{self, INDEX_FILE_NAME};
use crate::io::store_io::{self, StoreError, io_error};
use crate::model::task::{Task, TaskKind};
use crate::ops::names;

/// Fail if `name` is already used in `dir`, either as a file or a folder.
fn ensure_vacant(dir: &Path, name: &str) -> Result<(), StoreError> {
    for path in [dir.join(name), dir.join(naming::add_markdown_extension(name))] {
        if path.symlink_metadata().is_ok() {
            return Err(StoreError::NameCollision(path));
        }
    }
    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// True if `path` is `ancestor` or lies beneath it
fn is_within(path: &Path, ancestor: &Path) -> bool {
    match (fs::canonicalize(path), fs::canonicalize(ancestor)) {
        (Ok(path), Ok(ancestor)) => path.starts_with(ancestor),
        _ => path.starts_with(ancestor),
    }
}

/// Remove `dir` if nothing is left in it. Returns whether it was removed.
fn remove_dir_if_empty(dir: &Path) -> Result<bool, StoreError> {
    let mut entries = fs::read_dir(dir).map_err(|e| io_error(dir, e))?;
    if entries.next().is_some() {
        tracing::warn!(dir = %dir.display(), "leaving non-empty folder in place");
        return Ok(false);
    }
    fs::remove_dir(dir).map_err(|e| io_error(dir, e))?;
    Ok(true)
}

fn rename_entry(from: &Path, to: &Path) -> Result<(), StoreError> {
    fs::rename(from, to).map_err(|e| io_error(from, e))?;
    tracing::debug!(from = %from.display(), to = %to.display(), "moved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Rename / delete / move
// ---------------------------------------------------------------------------

/// Rename a task in place. Directory tasks take their whole subtree along.
pub fn rename(task: &mut Task, new_name: &str) -> Result<(), StoreError> {
    let new_name = naming::validate_task_name(new_name)?;
    if new_name == task.name {
        return Ok(());
    }
    ensure_vacant(&task.dir, new_name)?;

    let renamed = Task::new(task.dir.clone(), new_name, task.kind);
    rename_entry(&task.entry_path(), &renamed.entry_path())?;
    *task = renamed;
    Ok(())
}

/// Delete a task.
///
/// A directory task that still has subtasks is refused with `HasSubtasks`;
/// use `delete_recursive` to remove the subtree. Without subtasks the index
/// goes and the folder is removed once empty.
pub fn delete(task: Task) -> Result<(), StoreError> {
    match task.kind {
        TaskKind::File => {
            let path = task.path();
            fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
        }
        TaskKind::Directory => {
            let folder = task.folder_path();
            let count = store_io::count_children(&folder)?;
            if count > 0 {
                return Err(StoreError::HasSubtasks {
                    name: task.name,
                    count,
                });
            }
            let index = task.path();
            fs::remove_file(&index).map_err(|e| io_error(&index, e))?;
            remove_dir_if_empty(&folder)?;
        }
    }
    tracing::debug!(task = %task.entry_path().display(), "deleted");
    Ok(())
}

/// Delete a task together with every subtask beneath it.
pub fn delete_recursive(task: Task) -> Result<(), StoreError> {
    let entry = task.entry_path();
    let removed = match task.kind {
        TaskKind::File => fs::remove_file(&entry),
        TaskKind::Directory => fs::remove_dir_all(&entry),
    };
    removed.map_err(|e| io_error(&entry, e))?;
    tracing::debug!(task = %entry.display(), "deleted with subtasks");
    Ok(())
}

/// Move a task (file, or folder with everything in it) into `destination`,
/// keeping its name.
pub fn move_to_directory(task: &mut Task, destination: &Path) -> Result<(), StoreError> {
    if !destination.is_dir() {
        return Err(StoreError::NotADirectory(destination.display().to_string()));
    }
    if same_dir(&task.dir, destination) {
        return Err(StoreError::AlreadyThere {
            name: task.name.clone(),
            dir: destination.to_path_buf(),
        });
    }
    if task.is_directory() && is_within(destination, &task.folder_path()) {
        return Err(StoreError::InvalidMove {
            name: task.name.clone(),
        });
    }
    ensure_vacant(destination, &task.name)?;

    let moved = Task::new(destination, task.name.clone(), task.kind);
    rename_entry(&task.entry_path(), &moved.entry_path())?;
    *task = moved;
    Ok(())
}

// ---------------------------------------------------------------------------
// Promote / demote
// ---------------------------------------------------------------------------

/// Turn a file task into a directory task: `name.md` becomes
/// `name/_index.md`. Does nothing for a directory task.
///
/// A plain folder of the same name without an index is adopted as the new
/// task folder.
pub fn promote_to_directory(task: &mut Task) -> Result<(), StoreError> {
    if task.is_directory() {
        return Ok(());
    }
    let folder = task.folder_path();
    let index = folder.join(INDEX_FILE_NAME);
    match folder.symlink_metadata() {
        Ok(meta) if meta.is_dir() && !index.exists() => {}
        Ok(_) => return Err(StoreError::NameCollision(folder)),
        Err(_) => fs::create_dir(&folder).map_err(|e| io_error(&folder, e))?,
    }

    rename_entry(&task.path(), &index)?;
    task.kind = TaskKind::Directory;
    Ok(())
}

/// Turn a directory task without subtasks back into `name.md`.
/// Does nothing for a file task.
///
/// Files in the folder that are not tasks stay where they are and keep the
/// folder alive; it no longer counts as a task because the index is gone.
pub fn demote_to_file(task: &mut Task) -> Result<(), StoreError> {
    if !task.is_directory() {
        return Ok(());
    }
    let folder = task.folder_path();
    let count = store_io::count_children(&folder)?;
    if count > 0 {
        return Err(StoreError::HasSubtasks {
            name: task.name.clone(),
            count,
        });
    }
    let target = task.dir.join(naming::add_markdown_extension(&task.name));
    if target.symlink_metadata().is_ok() {
        return Err(StoreError::NameCollision(target));
    }

    rename_entry(&task.path(), &target)?;
    task.kind = TaskKind::File;
    remove_dir_if_empty(&folder)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Create an empty task in `dir` with the next free default name.
pub fn create_new_task(dir: &Path, base_name: &str) -> Result<Task, StoreError> {
    let name = names::default_name(dir, base_name)?;
    naming::validate_task_name(&name)?;
    // The allocator only looks at files; a folder task may still own the name.
    ensure_vacant(dir, &name)?;

    let task = Task::new(dir, name, TaskKind::File);
    let path = task.path();
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| io_error(&path, e))?;
    tracing::debug!(task = %path.display(), "created");
    Ok(task)
}

/// Add a fresh, empty subtask under `parent`, promoting it first if it is a
/// file task. The new task's `dir` is the folder to navigate into.
pub fn create_subtask(parent: &mut Task, base_name: &str) -> Result<Task, StoreError> {
    promote_to_directory(parent)?;
    create_new_task(&parent.folder_path(), base_name)
}

/// Make an existing task a subtask of `parent`, promoting `parent` if needed.
pub fn add_task_as_subtask(parent: &mut Task, child: &mut Task) -> Result<(), StoreError> {
    let target = parent.folder_path();
    if same_dir(&parent.entry_path(), &child.entry_path()) {
        return Err(StoreError::InvalidMove {
            name: child.name.clone(),
        });
    }
    if parent.is_directory() && same_dir(&child.dir, &target) {
        return Err(StoreError::AlreadyThere {
            name: child.name.clone(),
            dir: target,
        });
    }
    if child.is_directory() && is_within(&parent.dir, &child.folder_path()) {
        return Err(StoreError::InvalidMove {
            name: child.name.clone(),
        });
    }
    // Check before promoting so a collision leaves the parent untouched
    if target.is_dir() {
        ensure_vacant(&target, &child.name)?;
    }

    promote_to_directory(parent)?;
    move_to_directory(child, &target)
}
