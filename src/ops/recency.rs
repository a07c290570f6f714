use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::io::store_io::{StoreError, io_error, scan_tasks};
use crate::model::task::{Task, TaskKind};

fn modified(path: &Path) -> Result<SystemTime, StoreError> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| io_error(path, e))
}

/// When the task was last edited.
///
/// File tasks report their own mtime. Directory tasks report the latest
/// edit anywhere beneath them, walking the whole subtree; the index file
/// only counts when the directory holds no subtasks at all.
pub fn last_edited(task: &Task) -> Result<SystemTime, StoreError> {
    match task.kind {
        TaskKind::File => modified(&task.path()),
        TaskKind::Directory => {
            let mut latest: Option<SystemTime> = None;
            for child in scan_tasks(&task.folder_path())? {
                let edited = last_edited(&child)?;
                latest = Some(latest.map_or(edited, |l| l.max(edited)));
            }
            match latest {
                Some(edited) => Ok(edited),
                None => modified(&task.path()),
            }
        }
    }
}

/// Sort siblings newest first; ties go by name so the order is stable.
pub fn order_by_recency(tasks: Vec<Task>) -> Result<Vec<Task>, StoreError> {
    let mut keyed = tasks
        .into_iter()
        .map(|task| Ok((last_edited(&task)?, task)))
        .collect::<Result<Vec<_>, StoreError>>()?;
    keyed.sort_by(|(a_time, a), (b_time, b)| b_time.cmp(a_time).then_with(|| a.name.cmp(&b.name)));
    Ok(keyed.into_iter().map(|(_, task)| task).collect())
}
