use std::path::Path;

use crate::io::store_io::{StoreError, list_tasks};
use crate::model::task::Task;

/// A task and, for directory tasks, everything beneath it
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub task: Task,
    pub children: Vec<TreeNode>,
}

/// Load the whole hierarchy under `dir`, each level in recency order.
pub fn build_tree(dir: &Path) -> Result<Vec<TreeNode>, StoreError> {
    list_tasks(dir)?
        .into_iter()
        .map(|task| {
            let children = if task.is_directory() {
                build_tree(&task.folder_path())?
            } else {
                Vec::new()
            };
            Ok(TreeNode { task, children })
        })
        .collect()
}

/// Markdown-style outline, two spaces per level, directory tasks marked `/`.
pub fn render_tree(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    render_level(nodes, 0, &mut out);
    out
}

fn render_level(nodes: &[TreeNode], depth: usize, out: &mut String) {
    for node in nodes {
        out.push_str(&"  ".repeat(depth));
        out.push_str("- ");
        out.push_str(&node.task.name);
        if node.task.is_directory() {
            out.push('/');
        }
        out.push('\n');
        render_level(&node.children, depth + 1, out);
    }
}
