use serde::{Deserialize, Serialize};

/// Configuration from `.terdo.toml` at the store root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Base for generated names: "<default_name> 0", "<default_name> 1", ...
    #[serde(default = "default_task_name")]
    pub default_name: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        TasksConfig {
            default_name: default_task_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// chrono format string for last-edited times in listings
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Terminal cells reserved for the task name column
    #[serde(default = "default_name_width")]
    pub name_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            date_format: default_date_format(),
            name_width: default_name_width(),
        }
    }
}

fn default_task_name() -> String {
    "New markdown file".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_name_width() -> usize {
    40
}
