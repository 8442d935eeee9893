mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, remote::RemoteSubcommand};
use palette_core::env::Env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "palette",
    about = "Fetch a generated colour palette and publish it to the site repository",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest palette.yaml, else built-in defaults)
    #[arg(long, global = true, env = "PALETTE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, transform, write and notify: one full palette refresh
    Refresh {
        /// Write the palette file under DIR instead of the remote; sends no text
        #[arg(long, value_name = "DIR")]
        dry_run: Option<PathBuf>,
    },

    /// Fetch and transform a palette without writing it anywhere
    Fetch,

    /// Parse and print a palette file
    Show { file: PathBuf },

    /// Send a text message through the configured SMS account
    Notify { message: String },

    /// Send the form-submission alert
    Submission,

    /// Inspect the configured git remote
    Remote {
        #[command(subcommand)]
        subcommand: RemoteSubcommand,
    },

    /// Show, validate or create palette.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the pipeline as HTTP functions
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8888")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Refresh { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = root::resolve_config(cli.config.as_deref());
    let config_path = config_path.as_deref();
    let env = Env::from_process();

    let result = match cli.command {
        Commands::Refresh { dry_run } => {
            cmd::refresh::run(config_path, &env, dry_run.as_deref(), cli.json)
        }
        Commands::Fetch => cmd::fetch::run(config_path, cli.json),
        Commands::Show { file } => cmd::show::run(&file, cli.json),
        Commands::Notify { message } => cmd::notify::run(config_path, &env, &message, cli.json),
        Commands::Submission => cmd::submission::run(config_path, &env, cli.json),
        Commands::Remote { subcommand } => cmd::remote::run(config_path, &env, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(config_path, &env, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(config_path, env, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
