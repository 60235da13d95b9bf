use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config
{
    /// Handle of the automated reviewer whose comments are surfaced
    pub reviewer: String,

    /// Milliseconds the page must stay quiet before re-extraction in watch mode
    pub settle_ms: u64,

    /// Directory for per-page selection state (supports ~ and $VAR)
    pub state_dir: String,

    /// Markup discovery selectors
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig
{
    /// Review-thread containers
    pub thread: String,

    /// Comment roots inside a thread
    pub comment: String,

    /// Comment body region inside a comment root
    pub comment_body: String,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            reviewer: "coderabbitai".to_string(),
            settle_ms: 200,
            state_dir: ".rsift/state".to_string(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for SelectorConfig
{
    fn default() -> Self
    {
        Self {
            thread: r#"[class*="review-thread"], [data-review-thread]"#.to_string(),
            comment: r#"[class*="review-comment"], [class*="timeline-comment"], [data-comment-id]"#
                .to_string(),
            comment_body: r#"[class*="comment-body"]"#.to_string(),
        }
    }
}

impl Config
{
    /// Expanded state directory path
    pub fn state_path(&self) -> PathBuf
    {
        PathBuf::from(shellexpand::tilde(&self.state_dir).into_owned())
    }

    /// Settle window as a Duration
    pub fn settle(&self) -> Duration
    {
        Duration::from_millis(self.settle_ms)
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["revsift.toml", ".revsift.toml"];

    for path in &config_paths
    {
        if std::path::Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with REVSIFT_ prefix. Double underscore
    // nests (REVSIFT_SELECTORS__THREAD -> selectors.thread) so flat keys
    // like settle_ms stay reachable.
    builder = builder.add_source(config::Environment::with_prefix("REVSIFT").separator("__"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;

    // Fill anything not configured from the defaults
    let defaults = Config::default();

    let parsed = Config {
        reviewer: cfg
            .get_string("reviewer")
            .unwrap_or(defaults.reviewer),
        settle_ms: cfg
            .get_int("settle_ms")
            .map(|v| v.max(0) as u64)
            .unwrap_or(defaults.settle_ms),
        state_dir: cfg
            .get_string("state_dir")
            .unwrap_or(defaults.state_dir),
        selectors: SelectorConfig {
            thread: cfg
                .get_string("selectors.thread")
                .unwrap_or(defaults.selectors.thread),
            comment: cfg
                .get_string("selectors.comment")
                .unwrap_or(defaults.selectors.comment),
            comment_body: cfg
                .get_string("selectors.comment_body")
                .unwrap_or(defaults.selectors.comment_body),
        },
    };

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("revsift.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if !ctx.dry_run
    {
        std::fs::write(&config_path, toml_string).context("Failed to write config file")?;
    }

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }

    Ok(())
}
