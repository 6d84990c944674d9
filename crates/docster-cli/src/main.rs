#![deny(unsafe_code)]

//! Docster CLI: serve, dump, search and compact a project's source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use docster_config::{AppConfig, DEFAULT_CONFIG_FILE};
use docster_core::compact::Compactor;
use docster_core::crawl::{CrawlOutput, Crawler};
use docster_core::{Daemon, DocsterClient, LogCollector, extract_code_block, format_all, search_corpus};

/// Docster: crawl a project and serve its code to paste into an LLM prompt.
#[derive(Parser)]
#[command(name = "docster", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a project and serve it over HTTP.
    Serve {
        /// Project root to crawl.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Crawl a project and print every file.
    Dump {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Crawl a project and print the code for a keyword.
    Search {
        keyword: String,

        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Print the declaration of an identifier in one file.
    Extract { file: PathBuf, identifier: String },

    /// Strip and minify a folder of source files into one text.
    Compact {
        dir: PathBuf,

        /// File extension to collect.
        #[arg(long, default_value = "ts")]
        ext: String,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show whether a server is running.
    Status,

    /// Ask a running server to crawl again.
    Rerun,

    /// Print a running server's recent log entries.
    Logs {
        /// Number of entries to show.
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },

    /// Stop a running server.
    Stop,

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,

        /// Write a default configuration file if none exists.
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { init: true, .. } = cli.command {
        init_tracing(cli.verbose, "info", LogCollector::new(0));
        return cmd_config_init(&cli.config).await;
    }

    let config = AppConfig::load_or_default(&cli.config)
        .await
        .with_context(|| format!("invalid configuration at '{}'", cli.config.display()))?;
    let collector = LogCollector::default();
    init_tracing(cli.verbose, &config.logging.level, collector.clone());

    match cli.command {
        Commands::Serve { root } => cmd_serve(config, root, collector).await?,
        Commands::Dump { root } => cmd_dump(&config, root).await?,
        Commands::Search { keyword, root } => cmd_search(&config, root, &keyword).await?,
        Commands::Extract { file, identifier } => cmd_extract(&file, &identifier).await?,
        Commands::Compact { dir, ext, output } => cmd_compact(dir, &ext, output).await?,
        Commands::Status => cmd_status(&config).await?,
        Commands::Rerun => cmd_rerun(&config).await?,
        Commands::Logs { limit } => cmd_logs(&config, limit).await?,
        Commands::Stop => cmd_stop(&config).await?,
        Commands::Config { show, .. } => cmd_config(&config, &cli.config, show)?,
    }

    Ok(())
}

/// Log to stderr, keeping stdout for command output, and feed `/logs`.
///
/// `RUST_LOG` wins over `-v`, which wins over `logging.level`.
fn init_tracing(verbose: u8, level: &str, collector: LogCollector) {
    let default = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(collector)
        .init();
}

async fn crawl(config: &AppConfig, root: PathBuf) -> Result<CrawlOutput> {
    let crawler = Crawler::new(root, config);
    let output = tokio::task::spawn_blocking(move || crawler.crawl()).await??;
    Ok(output)
}

async fn cmd_serve(config: AppConfig, root: PathBuf, collector: LogCollector) -> Result<()> {
    let url = format!("http://{}/", config.bind_address());
    info!(%url, "Starting Docster server");
    eprintln!("Docster serving '{}' at {url}", root.display());

    let daemon = Daemon::new(config, root, collector.reader());
    daemon.run().await?;
    Ok(())
}

async fn cmd_dump(config: &AppConfig, root: PathBuf) -> Result<()> {
    let output = crawl(config, root).await?;
    print!("{}", format_all(&output.files));
    Ok(())
}

async fn cmd_search(config: &AppConfig, root: PathBuf, keyword: &str) -> Result<()> {
    if keyword.is_empty() {
        bail!("search keyword must not be empty");
    }
    let output = crawl(config, root).await?;
    let outcome = search_corpus(&output.files, keyword)?;
    if outcome.match_count() == 0 {
        eprintln!("No files contain '{keyword}'.");
    } else {
        print!("{}", outcome.render());
        eprintln!("{} matching file(s).", outcome.match_count());
    }
    Ok(())
}

async fn cmd_extract(file: &Path, identifier: &str) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read '{}'", file.display()))?;
    match extract_code_block(&content, identifier) {
        Some(block) => {
            println!("{}", block.as_str().trim_end());
            Ok(())
        }
        None => bail!("no declaration of '{identifier}' in '{}'", file.display()),
    }
}

async fn cmd_compact(dir: PathBuf, ext: &str, output: Option<PathBuf>) -> Result<()> {
    let compactor = Compactor::new(ext)?;
    let collected = tokio::task::spawn_blocking(move || compactor.collect(&dir)).await??;
    let text = collected.render();

    match output {
        Some(path) => {
            tokio::fs::write(&path, text)
                .await
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            eprintln!(
                "Compacted {} file(s) into '{}'.",
                collected.files.len(),
                path.display()
            );
        }
        None => print!("{text}"),
    }
    if collected.failed > 0 {
        eprintln!("{} file(s) could not be read.", collected.failed);
    }
    Ok(())
}

async fn cmd_status(config: &AppConfig) -> Result<()> {
    let client = DocsterClient::from_config(config);
    let health = client.health().await?;
    let all = client.all_content().await?;
    println!(
        "Docster {} running at {}: {} file(s), last crawl {}",
        health.version,
        client.base_url(),
        all.file_count,
        all.timestamp
    );
    Ok(())
}

async fn cmd_rerun(config: &AppConfig) -> Result<()> {
    let response = DocsterClient::from_config(config).rerun().await?;
    println!("{}", response.message);
    Ok(())
}

async fn cmd_logs(config: &AppConfig, limit: usize) -> Result<()> {
    let response = DocsterClient::from_config(config).logs(Some(limit)).await?;
    for entry in &response.entries {
        println!(
            "{} {:>5} {}: {}",
            entry.timestamp, entry.level, entry.target, entry.message
        );
    }
    if response.total > response.entries.len() {
        eprintln!(
            "({} of {} buffered entries shown)",
            response.entries.len(),
            response.total
        );
    }
    Ok(())
}

async fn cmd_stop(config: &AppConfig) -> Result<()> {
    info!("Sending stop request to Docster server");
    let response = DocsterClient::from_config(config).stop().await?;
    println!("{}", response.message);
    Ok(())
}

fn cmd_config(config: &AppConfig, config_path: &Path, show: bool) -> Result<()> {
    if show {
        println!("{}", config.to_toml()?);
    } else if config_path.exists() {
        println!("Configuration at '{}' is valid.", config_path.display());
    } else {
        println!(
            "No configuration at '{}'; using defaults.",
            config_path.display()
        );
    }
    Ok(())
}

async fn cmd_config_init(config_path: &Path) -> Result<()> {
    if AppConfig::write_default(config_path).await? {
        println!("Wrote default configuration to '{}'.", config_path.display());
    } else {
        println!(
            "Configuration already exists at '{}'; left unchanged.",
            config_path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_arguments() {
        let cli = Cli::parse_from(["docster", "-vv", "search", "handler", "--root", "web"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("docster.toml"));
        match cli.command {
            Commands::Search { keyword, root } => {
                assert_eq!(keyword, "handler");
                assert_eq!(root, PathBuf::from("web"));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_logs_limit() {
        let cli = Cli::parse_from(["docster", "logs"]);
        assert!(matches!(cli.command, Commands::Logs { limit: 50 }));

        let cli = Cli::parse_from(["docster", "logs", "-n", "5"]);
        assert!(matches!(cli.command, Commands::Logs { limit: 5 }));
    }

    #[test]
    fn test_compact_defaults() {
        let cli = Cli::parse_from(["docster", "-c", "alt.toml", "compact", "src/lib"]);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        match cli.command {
            Commands::Compact { dir, ext, output } => {
                assert_eq!(dir, PathBuf::from("src/lib"));
                assert_eq!(ext, "ts");
                assert_eq!(output, None);
            }
            _ => panic!("expected compact"),
        }
    }
}
