//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `keys`: List indexed translation keys, optionally under a prefix
//! - `search`: Fuzzy-search keys and translated values
//! - `report`: Coverage statistics against the reference locale
//! - `rename`: Rename a key across locale files and call sites
//! - `add`: Insert a new key into the matching locale files
//! - `watch`: Keep the index updated on filesystem changes
//! - `init`: Write a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return
    /// None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Display locale for values (overrides config file)
    #[arg(long)]
    pub display_locale: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List indexed translation keys
    Keys(KeysCommand),
    /// Fuzzy-search keys and translated values
    Search(SearchCommand),
    /// Coverage statistics per locale
    Report(ReportCommand),
    /// Rename a key across declarations and usages
    Rename(RenameCommand),
    /// Add a new translation key
    Add(AddCommand),
    /// Watch the project and keep the index current
    Watch(WatchCommand),
    /// Initialize a lokey configuration file
    Init,
}

#[derive(Debug, Args)]
pub struct KeysCommand {
    /// Only keys under this dotted prefix
    pub prefix: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Query text; blank lists everything
    pub query: String,

    /// Namespace granting a ranking bonus
    #[arg(long)]
    pub namespace: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Reference locale (overrides config file)
    #[arg(long)]
    pub reference_locale: Option<String>,

    /// List every missing key per locale
    #[arg(long)]
    pub missing: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct RenameCommand {
    /// Fully-qualified key to rename
    pub old_key: String,

    /// New fully-qualified key
    pub new_key: String,

    /// Actually rewrite files (default is a dry run)
    #[arg(long)]
    pub apply: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct AddCommand {
    /// Fully-qualified key to create
    pub key: String,

    /// Initial value (empty placeholder when omitted)
    pub value: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Quiet window in milliseconds before a change is committed
    #[arg(long, default_value_t = 500)]
    pub debounce_ms: u64,

    #[command(flatten)]
    pub common: CommonArgs,
}
