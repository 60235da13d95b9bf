use anyhow::Result;
use clap::Parser;
use revsift::cli::{AppContext, Cli, Commands};
use revsift::core::output::BuildKind;
use revsift::core::state::SelectOp;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Quiet by default; RUST_LOG=revsift=debug turns on stage logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Extract(args) => revsift::core::extract::run(args, &ctx),
        Commands::Prompt(args) => revsift::core::output::run_build(BuildKind::Prompt, args, &ctx),
        Commands::Markdown(args) => {
            revsift::core::output::run_build(BuildKind::Markdown, args, &ctx)
        }
        Commands::Json(args) => revsift::core::output::run_build(BuildKind::Json, args, &ctx),
        Commands::Deselect(args) => revsift::core::state::run_select(SelectOp::Deselect, args, &ctx),
        Commands::Reselect(args) => revsift::core::state::run_select(SelectOp::Reselect, args, &ctx),
        Commands::Ignore(args) => revsift::core::state::run_select(SelectOp::Ignore, args, &ctx),
        Commands::Unignore(args) => revsift::core::state::run_select(SelectOp::Unignore, args, &ctx),
        Commands::Reset(args) => revsift::core::state::run_reset(args, &ctx),
        Commands::Watch(args) => revsift::core::watch::run(args, &ctx),
        Commands::Init(args) => revsift::infra::config::init(args, &ctx),
        Commands::Completions(args) => revsift::completion::run(args),
    }
}
