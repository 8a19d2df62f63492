//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use neckview_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "neckview")]
#[command(version)]
#[command(about = "Live terminal dashboard for neck proxy sessions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the neck server (overrides the config file)
    #[arg(long, global = true, env = "NECKVIEW_SERVER", value_name = "URL")]
    server: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch the session list once and print it
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything; the dashboard needs the multi-threaded
    // flavour to block in place while the store keeps running
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        server,
        verbose,
    } = cli;
    let server = server.as_deref();

    match command {
        // Config commands work even when the existing file does not parse.
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Some(Commands::List { json }) => {
            let config = config::Config::load().context("load config")?;
            commands::list::run(&config, server, json, verbose).await
        }
        None => {
            let config = config::Config::load().context("load config")?;
            commands::dashboard::run(&config, server, verbose).await
        }
    }
}
