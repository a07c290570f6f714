use std::fs;
use std::path::Path;

use crate::io::config_io;

pub fn cmd_init(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if root.exists() && !root.is_dir() {
        return Err(format!("{} exists and is not a directory", root.display()).into());
    }
    fs::create_dir_all(root)?;

    if config_io::write_default_config(root)? {
        println!("initialized task tree in {}", root.display());
    } else {
        println!("task tree already initialized in {}", root.display());
    }
    Ok(())
}
