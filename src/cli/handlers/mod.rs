mod init;
pub use init::cmd_init;

use std::io::Read;
use std::path::PathBuf;

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::store_io::{self, StoreError};
use crate::model::store::Store;
use crate::ops::navigate::{self, relative_to_root, task_address};
use crate::ops::{search, task_ops, tree};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Environment variable naming the task tree root
pub const ROOT_ENV: &str = "TERDO_ROOT";

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let root = root_dir(cli.root.as_deref())?;
    tracing::debug!(root = %root.display(), "using task tree");

    if let Commands::Init = cli.command {
        return cmd_init(&root);
    }

    let store = store_io::open_store(&root)
        .map_err(|e| format!("{} (run `td init` to create the task tree)", e))?;

    match cli.command {
        // Handled above, before the store has to exist
        Commands::Init => Ok(()),

        // Read commands
        Commands::Ls(args) => cmd_ls(&store, args, json),
        Commands::Show(args) => cmd_show(&store, args),
        Commands::Parent(args) => cmd_parent(&store, args, json),
        Commands::Children(args) => cmd_children(&store, args, json),
        Commands::Find(args) => cmd_find(&store, args, json),
        Commands::Tree(args) => cmd_tree(&store, args, json),
        Commands::Config(args) => cmd_config(&store, args, json),

        // Write commands
        Commands::Write(args) => cmd_write(&store, args),
        Commands::New(args) => cmd_new(&store, args, json),
        Commands::Sub(args) => cmd_sub(&store, args, json),
        Commands::Adopt(args) => cmd_adopt(&store, args),
        Commands::Mv(args) => cmd_mv(&store, args),
        Commands::Rename(args) => cmd_rename(&store, args),
        Commands::Rm(args) => cmd_rm(&store, args),
        Commands::Promote(args) => cmd_promote(&store, args),
        Commands::Demote(args) => cmd_demote(&store, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `-C` wins, then `$TERDO_ROOT`, then `./markdown`.
fn root_dir(flag: Option<&str>) -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = flag {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::var(ROOT_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    Ok(std::env::current_dir()?.join("markdown"))
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn dir_arg(store: &Store, dir: Option<&str>) -> Result<PathBuf, StoreError> {
    navigate::directory_of(store, dir.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_ls(store: &Store, args: DirArg, json: bool) -> CmdResult {
    let dir = dir_arg(store, args.dir.as_deref())?;
    let tasks = store_io::list_tasks(&dir)?;

    if json {
        let rows = tasks
            .iter()
            .map(|t| task_to_json(store, t))
            .collect::<Result<Vec<_>, _>>()?;
        return print_json(&rows);
    }
    for task in &tasks {
        println!("{}", format_task_line(store, task)?);
    }
    Ok(())
}

fn cmd_show(store: &Store, args: TaskArg) -> CmdResult {
    let task = navigate::locate(store, &args.task)?;
    let content = store_io::load_content(&task)?;
    if content.ends_with('\n') || content.is_empty() {
        print!("{}", content);
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_parent(store: &Store, args: DirArg, json: bool) -> CmdResult {
    let dir = dir_arg(store, args.dir.as_deref())?;
    let parent = navigate::parent_directory_of(store, &dir)?;
    let rel = display_dir(relative_to_root(store, &parent));
    if json {
        return print_json(&DirJson { dir: rel });
    }
    println!("{}", rel);
    Ok(())
}

fn cmd_children(store: &Store, args: TaskArg, json: bool) -> CmdResult {
    let task = navigate::locate(store, &args.task)?;
    let dir = navigate::child_directory_of(&task)?;
    let rel = display_dir(relative_to_root(store, &dir));
    if json {
        return print_json(&DirJson { dir: rel });
    }
    println!("{}", rel);
    Ok(())
}

fn cmd_find(store: &Store, args: FindArgs, json: bool) -> CmdResult {
    let re = Regex::new(&args.pattern).map_err(|e| format!("invalid regex: {}", e))?;
    let dir = dir_arg(store, args.dir.as_deref())?;
    let hits = search::search_tasks(&dir, &re)?;

    if json {
        let rows: Vec<_> = hits.iter().map(|h| search_hit_to_json(store, h)).collect();
        return print_json(&rows);
    }
    for hit in &hits {
        println!("{}", format_search_hit(store, hit));
    }
    Ok(())
}

fn cmd_tree(store: &Store, args: DirArg, json: bool) -> CmdResult {
    let dir = dir_arg(store, args.dir.as_deref())?;
    let nodes = tree::build_tree(&dir)?;
    if json {
        return print_json(&tree_to_json(&nodes));
    }
    print!("{}", tree::render_tree(&nodes));
    Ok(())
}

fn cmd_config(store: &Store, args: ConfigCmd, json: bool) -> CmdResult {
    match args.action {
        None => {
            if json {
                return print_json(&store.config);
            }
            print!("{}", toml::to_string_pretty(&store.config)?);
        }
        Some(ConfigAction::Set(set)) => {
            config_io::set_config_value(&store.root, &set.key, &set.value)?;
            println!("{} = {}", set.key, set.value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_write(store: &Store, args: WriteArgs) -> CmdResult {
    let task = navigate::locate(store, &args.task)?;
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    store_io::save_content(&task, text.trim())?;
    println!("saved {}", task_address(store, &task));
    Ok(())
}

fn cmd_new(store: &Store, args: NewArgs, json: bool) -> CmdResult {
    let dir = dir_arg(store, args.dir.as_deref())?;
    let task = task_ops::create_new_task(&dir, &store.config.tasks.default_name)?;
    if json {
        return print_json(&task_to_json(store, &task)?);
    }
    println!("created {}", task_address(store, &task));
    Ok(())
}

fn cmd_sub(store: &Store, args: TaskArg, json: bool) -> CmdResult {
    let mut parent = navigate::locate(store, &args.task)?;
    let child = task_ops::create_subtask(&mut parent, &store.config.tasks.default_name)?;
    if json {
        return print_json(&task_to_json(store, &child)?);
    }
    println!("created {}", task_address(store, &child));
    Ok(())
}

fn cmd_adopt(store: &Store, args: AdoptArgs) -> CmdResult {
    let mut parent = navigate::locate(store, &args.parent)?;
    let mut child = navigate::locate(store, &args.child)?;
    task_ops::add_task_as_subtask(&mut parent, &mut child)?;
    println!("moved {} -> {}", args.child, task_address(store, &child));
    Ok(())
}

fn cmd_mv(store: &Store, args: MvArgs) -> CmdResult {
    let mut task = navigate::locate(store, &args.task)?;
    let dest = navigate::directory_of(store, &args.dir)?;
    task_ops::move_to_directory(&mut task, &dest)?;
    println!("moved {} -> {}", args.task, task_address(store, &task));
    Ok(())
}

fn cmd_rename(store: &Store, args: RenameArgs) -> CmdResult {
    let mut task = navigate::locate(store, &args.task)?;
    task_ops::rename(&mut task, &args.name)?;
    println!("renamed {} -> {}", args.task, task_address(store, &task));
    Ok(())
}

fn cmd_rm(store: &Store, args: RmArgs) -> CmdResult {
    let task = navigate::locate(store, &args.task)?;
    let address = task_address(store, &task);
    if args.recursive {
        task_ops::delete_recursive(task)?;
    } else {
        task_ops::delete(task).map_err(|e| match e {
            StoreError::HasSubtasks { .. } => format!("{} (use --recursive to delete them too)", e),
            other => other.to_string(),
        })?;
    }
    println!("deleted {}", address);
    Ok(())
}

fn cmd_promote(store: &Store, args: TaskArg) -> CmdResult {
    let mut task = navigate::locate(store, &args.task)?;
    task_ops::promote_to_directory(&mut task)?;
    println!("{} is now a directory task", task_address(store, &task));
    Ok(())
}

fn cmd_demote(store: &Store, args: TaskArg) -> CmdResult {
    let mut task = navigate::locate(store, &args.task)?;
    task_ops::demote_to_file(&mut task)?;
    println!("{} is now a file task", task_address(store, &task));
    Ok(())
}
