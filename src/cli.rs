use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "revsift")]
#[command(
    about = "A fast CLI for sifting automated code-review comments into paste-ready LLM suggestions"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress summaries and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract suggestions from a review page and list them
    Extract(ExtractArgs),

    /// Build a natural-language prompt from the selection
    Prompt(BuildArgs),

    /// Build a Markdown document from the selection
    Markdown(BuildArgs),

    /// Build a JSON document from the selection
    Json(BuildArgs),

    /// Uncheck suggestions (kept in the list, excluded from output)
    Deselect(SelectArgs),

    /// Re-check previously deselected suggestions
    Reselect(SelectArgs),

    /// Permanently hide suggestions from the list
    Ignore(SelectArgs),

    /// Unhide previously ignored suggestions
    Unignore(SelectArgs),

    /// Clear all selection state for the page
    Reset(ResetArgs),

    /// Re-extract whenever the page file changes (debounced)
    Watch(WatchArgs),

    /// Initialize a revsift.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtractFormat {
    /// Human-readable listing
    Text,
    /// Query result as JSON (found/selected/suggestions/selectedIds)
    Json,
}

#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Saved review page (HTML file)
    pub page: PathBuf,

    /// Page address override (else canonical link, og:url, or the file path)
    #[arg(long)]
    pub url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ExtractFormat,
}

#[derive(Debug, Parser)]
pub struct BuildArgs {
    /// Saved review page (HTML file)
    pub page: PathBuf,

    /// Page address override
    #[arg(long)]
    pub url: Option<String>,

    /// Explicit suggestion ids to export (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Export everything visible, selection state notwithstanding
    #[arg(long)]
    pub all: bool,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy result to clipboard
    #[arg(long)]
    pub clipboard: bool,
}

#[derive(Debug, Parser)]
pub struct SelectArgs {
    /// Saved review page (HTML file)
    pub page: PathBuf,

    /// Suggestion ids to operate on
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Page address override
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ResetArgs {
    /// Saved review page (HTML file)
    pub page: PathBuf,

    /// Page address override
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Saved review page (HTML file)
    pub page: PathBuf,

    /// Page address override
    #[arg(long)]
    pub url: Option<String>,

    /// Settle window in milliseconds (overrides config)
    #[arg(long)]
    pub settle_ms: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Directory for the config file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to stdout
    #[arg(long)]
    pub stdout: bool,

    /// Directory to write the completion file into
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
