//! terdo — a task tree stored as plain markdown files.
//!
//! Every task is either `<name>.md` or a directory `<name>/` holding an
//! `_index.md` plus its subtasks. The store maps tree operations (rename,
//! move, promote, demote, ...) onto that layout.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod util;
