// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use tvcatalog::video_ref::ThumbnailTier;
use tvcatalog::{Catalog, Config};

mod cli;
use cli::{ConfigCommand, ListCommand, OutputFormat, ResolveCommand, ThumbnailsCommand};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "tvcatalog")]
#[command(about = "A remote-control video catalog for the terminal")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (tvcatalog_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog TOML to load instead of the configured or built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default if no command given)
    Tui,

    /// Print the home screen layout
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Resolve video URLs to ids and thumbnails
    Resolve {
        /// URLs to resolve
        #[arg(required = true)]
        urls: Vec<String>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Thumbnail tier (maxres, high, medium, default)
        #[arg(short, long)]
        tier: Option<String>,
    },

    /// Print thumbnail URLs for every catalog entry
    Thumbnails {
        /// Probe each thumbnail and fall back like the card loader
        #[arg(long)]
        check: bool,
        /// Parallel requests when checking
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigSubcommand),
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Write the default configuration
    Init,
    /// Print the effective configuration
    Show,
}

fn init_logging(cli: &Cli) -> Result<()> {
    if cli.debug_log {
        let file = File::create("tvcatalog_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("tvcatalog=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config_path = cli
        .config
        .clone()
        .or_else(Config::default_path)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    if let Some(Commands::Config(cmd)) = &cli.command {
        // A broken file can still be replaced or inspected
        let config = Config::load_or_default(&config_path).unwrap_or_default();
        let cmd = match cmd {
            ConfigSubcommand::Init => ConfigCommand::Init,
            ConfigSubcommand::Show => ConfigCommand::Show,
        };
        return cmd.execute(&config_path, &config);
    }

    let config = Config::load_or_default(&config_path)?;
    tracing::debug!("Loaded config from {}", config_path.display());

    let catalog_path = cli.catalog.clone().or_else(|| config.catalog.path.clone());
    let catalog = Catalog::load_or_builtin(catalog_path.as_deref())
        .context("Failed to load catalog")?;

    match cli.command {
        Some(Commands::Tui) | None => {
            tvcatalog::run_tui(config, catalog).await?;
        }

        Some(Commands::List { format }) => {
            let cmd = ListCommand {
                format: OutputFormat::from_str(&format)?,
                carousel_limit: config.ui.carousel_limit,
                tier: config.player.thumbnail_tier,
            };
            cmd.execute(&catalog)?;
        }

        Some(Commands::Resolve { urls, format, tier }) => {
            let tier = match tier {
                Some(tier) => ThumbnailTier::from_str(&tier)?,
                None => config.player.thumbnail_tier,
            };
            let cmd = ResolveCommand {
                urls,
                format: OutputFormat::from_str(&format)?,
                tier,
            };
            cmd.execute()?;
        }

        Some(Commands::Thumbnails {
            check,
            concurrency,
            format,
        }) => {
            let cmd = ThumbnailsCommand {
                check,
                concurrency,
                format: OutputFormat::from_str(&format)?,
                tier: config.player.thumbnail_tier,
            };
            cmd.execute(&catalog).await?;
        }

        Some(Commands::Config(_)) => {}
    }

    Ok(())
}
