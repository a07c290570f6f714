pub mod names;
pub mod navigate;
pub mod recency;
pub mod search;
pub mod task_ops;
pub mod tree;
