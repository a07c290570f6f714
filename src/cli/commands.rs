use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("terdo v", env!("CARGO_PKG_VERSION"), " - a task tree of markdown files"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task tree root (default: $TERDO_ROOT, then ./markdown)
    #[arg(short = 'C', long = "root", global = true)]
    pub root: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the root directory and a default .terdo.toml
    Init,
    /// List the tasks in a directory, most recently edited first
    Ls(DirArg),
    /// Print a task's content
    Show(TaskArg),
    /// Replace a task's content (reads stdin when TEXT is omitted)
    Write(WriteArgs),
    /// Create a new task with a default name
    New(NewArgs),
    /// Add a new empty subtask to a task
    Sub(TaskArg),
    /// Make an existing task a subtask of another
    Adopt(AdoptArgs),
    /// Move a task into another directory
    Mv(MvArgs),
    /// Rename a task
    Rename(RenameArgs),
    /// Delete a task
    Rm(RmArgs),
    /// Turn a file task into a directory task
    Promote(TaskArg),
    /// Turn a directory task without subtasks back into a file
    Demote(TaskArg),
    /// Print the parent of a directory
    Parent(DirArg),
    /// Print the directory holding a task's subtasks
    Children(TaskArg),
    /// Search task names and content by regex
    Find(FindArgs),
    /// Show the task hierarchy
    Tree(DirArg),
    /// Show or change configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Shared args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskArg {
    /// Task path from the root, e.g. "Taxes/Form"
    pub task: String,
}

#[derive(Args)]
pub struct DirArg {
    /// Directory path from the root (default: the root)
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FindArgs {
    /// Regex pattern to search for
    pub pattern: String,
    /// Only search beneath this directory
    #[arg(long)]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct WriteArgs {
    /// Task path from the root
    pub task: String,
    /// New content; leading and trailing whitespace is trimmed
    pub text: Option<String>,
}

#[derive(Args)]
pub struct NewArgs {
    /// Directory to create the task in (default: the root)
    pub dir: Option<String>,
}

#[derive(Args)]
pub struct AdoptArgs {
    /// Task that becomes the parent
    pub parent: String,
    /// Task that becomes the subtask
    pub child: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to move
    pub task: String,
    /// Destination directory from the root ("." for the root)
    pub dir: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Task to rename
    pub task: String,
    /// New name (a trailing .md is ignored)
    pub name: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task to delete
    pub task: String,
    /// Also delete every subtask of a directory task
    #[arg(short, long)]
    pub recursive: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a value, e.g. `td config set tasks.default_name Todo`
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Key as table.key
    pub key: String,
    pub value: String,
}
