mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rota",
    about = "Knowledge-sharing rotation: slash-command server and roster tools",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, env = "ROTA_CONFIG", default_value = "rota.yaml")]
    config: PathBuf,

    /// Rotation database path (overrides store.path)
    #[arg(long, global = true, env = "ROTA_DB")]
    db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the slash-command endpoint
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(long, env = "ROTA_PORT")]
        port: Option<u16>,
    },

    /// Show everyone in the rotation, longest-waiting first
    Roster {
        /// Base URL of a running `rota serve`, used when the database is locked
        #[arg(long, env = "ROTA_SERVER")]
        server: Option<String>,
    },

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = cmd::load_config(&cli.config, cli.db.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Serve { port } => cmd::serve::run(&config, port),
            Commands::Roster { server } => cmd::roster::run(&config, server.as_deref(), cli.json),
            Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
