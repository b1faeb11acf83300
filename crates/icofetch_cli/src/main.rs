//! icofetch command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, wire core operations, print the result envelope and
//!   map its error code to the process exit code.
//! - Stay glue-only: every invariant lives in `icofetch_core`.

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use icofetch_core::{CoreConfig, Envelope};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "icofetch", version, about = "Resolve and fetch icons from a federated catalog")]
struct Cli {
    /// Catalog API base URL.
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Network timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Snapshot cache directory.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Enable file logging into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level for file logging.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Pretty-print the result envelope.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a query or full identifier into a canonical icon id.
    Resolve(ResolveArgs),
    /// Synchronize the full catalog into the local snapshot.
    Sync(SyncArgs),
    /// Render every item of a batch manifest.
    Render(RenderArgs),
    /// Inspect or clear the local snapshot cache.
    Cache(CacheArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Query text or full `prefix:name` identifier.
    query: String,

    /// Require a full identifier and check existence only.
    #[arg(long)]
    exact: bool,

    /// Candidate source policy.
    #[arg(long, value_enum, default_value_t = SourceArg::Auto)]
    source: SourceArg,

    /// Forbid any network access.
    #[arg(long)]
    offline: bool,

    /// Minimum score a candidate must reach.
    #[arg(long)]
    min_score: Option<f64>,

    /// Collections boosted during ranking; repeatable.
    #[arg(long = "prefer")]
    preferred: Vec<String>,

    /// Restrict candidates to these collections; repeatable.
    #[arg(long = "collection")]
    collections: Vec<String>,

    /// Deterministically pick the top-ranked result instead of failing
    /// with an ambiguous error.
    #[arg(long)]
    pick: bool,

    /// Remote search result cap.
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
struct SyncArgs {
    /// Concurrent collection listings.
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Include icons the catalog marks as hidden.
    #[arg(long)]
    include_hidden: bool,

    /// Stop at the first failed collection.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Manifest file: JSON array or delimited table with a header row.
    manifest: PathBuf,

    /// Concurrent render workers.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Stop at the first failing item.
    #[arg(long)]
    fail_fast: bool,

    /// Default output size for items that do not specify one.
    #[arg(long)]
    size: Option<u32>,

    /// Default color for items that do not specify one.
    #[arg(long)]
    color: Option<String>,

    /// Default output format for items that do not specify one.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Candidate source policy for per-item resolution.
    #[arg(long, value_enum, default_value_t = SourceArg::Auto)]
    source: SourceArg,

    /// Forbid any network access during resolution.
    #[arg(long)]
    offline: bool,
}

#[derive(Args)]
struct CacheArgs {
    #[command(subcommand)]
    action: CacheAction,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report snapshot presence, size and age.
    Status,
    /// Delete the local snapshot.
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Local,
    Remote,
    Auto,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Svg,
    Png,
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| icofetch_core::default_log_level().to_string());
        if let Err(err) = icofetch_core::init_logging(&level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let config = build_config(&cli);
    let envelope = match &cli.command {
        Command::Resolve(args) => commands::resolve(&config, args),
        Command::Sync(args) => commands::sync(&config, args),
        Command::Render(args) => commands::render(&config, args),
        Command::Cache(args) => match args.action {
            CacheAction::Status => commands::cache_status(&config),
            CacheAction::Clear => commands::cache_clear(&config),
        },
    };

    print_envelope(&envelope, cli.pretty);
    std::process::exit(envelope.exit_code());
}

fn build_config(cli: &Cli) -> CoreConfig {
    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let mut config = CoreConfig::new(cache_dir);
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("icofetch")
}

fn print_envelope(envelope: &Envelope<serde_json::Value>, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(envelope)
    } else {
        serde_json::to_string(envelope)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(err) => {
            // Serialization of our own envelope failing is unrecoverable;
            // still exit with the envelope's code.
            eprintln!("failed to serialize result envelope: {err}");
        }
    }
}

impl SourceArg {
    fn into_core(self) -> icofetch_core::SourceMode {
        match self {
            Self::Local => icofetch_core::SourceMode::LocalOnly,
            Self::Remote => icofetch_core::SourceMode::RemoteOnly,
            Self::Auto => icofetch_core::SourceMode::Auto,
        }
    }
}

impl FormatArg {
    fn into_core(self) -> icofetch_core::OutputFormat {
        match self {
            Self::Svg => icofetch_core::OutputFormat::Svg,
            Self::Png => icofetch_core::OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
