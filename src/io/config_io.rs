use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Name of the optional config file at the store root
pub const CONFIG_FILE_NAME: &str = ".terdo.toml";

/// Keys accepted by `set_config_value`, as `table.key`
pub const CONFIG_KEYS: &[&str] = &["tasks.default_name", "display.date_format", "display.name_width"];

pub const DEFAULT_CONFIG: &str = r#"# terdo configuration

[tasks]
# Base for generated task names ("New markdown file 0", "New markdown file 1", ...)
default_name = "New markdown file"

[display]
date_format = "%Y-%m-%d %H:%M"
name_width = 40
"#;

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse .terdo.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit .terdo.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key {0:?} (expected one of: {keys})", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

fn is_valid_date_format(pattern: &str) -> bool {
    chrono::format::StrftimeItems::new(pattern).all(|item| !matches!(item, chrono::format::Item::Error))
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Read `.terdo.toml` from the store root. A missing file means defaults.
pub fn read_config(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text)?;
    check_config(&config)?;
    Ok(config)
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Reject values a hand-edited file can carry but the store cannot use.
fn check_config(config: &Config) -> Result<(), ConfigError> {
    if crate::io::naming::validate_task_name(&config.tasks.default_name).is_err() {
        return Err(invalid("tasks.default_name", &config.tasks.default_name));
    }
    if !is_valid_date_format(&config.display.date_format) {
        return Err(invalid("display.date_format", &config.display.date_format));
    }
    if config.display.name_width == 0 {
        return Err(invalid("display.name_width", config.display.name_width));
    }
    Ok(())
}

/// Write the commented default config unless one already exists.
/// Returns true if a file was written.
pub fn write_default_config(root: &Path) -> Result<bool, ConfigError> {
    let path = config_path(root);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, DEFAULT_CONFIG).map_err(|e| ConfigError::WriteError { path, source: e })?;
    Ok(true)
}

/// Set `key` (e.g. `tasks.default_name`) to `value`, keeping the rest of the
/// file's formatting and comments intact.
pub fn set_config_value(root: &Path, key: &str, value: &str) -> Result<Config, ConfigError> {
    let (table, field) = key
        .split_once('.')
        .filter(|_| CONFIG_KEYS.contains(&key))
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let path = config_path(root);
    let text = if path.exists() {
        fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = text.parse()?;

    let item = match key {
        "display.name_width" => {
            let width: i64 = value
                .parse()
                .ok()
                .filter(|w| *w > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            toml_edit::value(width)
        }
        "display.date_format" if !is_valid_date_format(value) => {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        "tasks.default_name" if crate::io::naming::validate_task_name(value).is_err() => {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        _ => toml_edit::value(value),
    };

    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[table][field] = item;

    let updated = doc.to_string();
    let config: Config = toml::from_str(&updated)?;
    fs::write(&path, updated).map_err(|e| ConfigError::WriteError { path, source: e })?;
    tracing::debug!(key, value, "updated config");
    Ok(config)
}
