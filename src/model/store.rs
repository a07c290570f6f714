use std::path::PathBuf;

use super::config::Config;

/// An opened task tree
#[derive(Debug, Clone)]
pub struct Store {
    /// Canonical root directory; parent navigation stops here
    pub root: PathBuf,
    /// Parsed `.terdo.toml` (defaults when absent)
    pub config: Config,
}
