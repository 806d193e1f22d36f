//! Prebid loader CLI.
//!
//! This tool provides commands for:
//! - Resolving a config document into engine settings and ad units
//! - Running a loader session against a static page with recorded bids

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod error;
mod http;
mod logging;
mod resolve;
mod run;

use error::CliError;
use run::RunOptions;

#[derive(Parser)]
#[command(name = "pbloader")]
#[command(about = "Prebid loader config resolution and page rendering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the global settings and ad units a config resolves to
    Resolve {
        /// Path to the JSON config document
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Run a loader session and write the rendered page
    Run {
        /// Path to the HTML page
        #[arg(long)]
        page: PathBuf,

        /// URL the page is served from; the config URL resolves against it
        #[arg(long, env = "PREBID_LOADER_BASE_URL")]
        base_url: String,

        /// Bid fixture replayed by the engine
        #[arg(long)]
        bids: PathBuf,

        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Loader settings TOML (default: embedded settings)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Override the configured config URL
        #[arg(long)]
        config_url: Option<String>,

        /// Click the refresh control after the first auction
        #[arg(long)]
        refresh: bool,

        /// Click the show-config control
        #[arg(long)]
        show_config: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Resolve { file } => resolve::resolve_file(&file, cli.verbose),
        Commands::Run {
            page,
            base_url,
            bids,
            output,
            settings,
            config_url,
            refresh,
            show_config,
        } => run::run(
            &RunOptions {
                page,
                base_url,
                bids,
                output,
                settings,
                config_url,
                refresh,
                show_config,
            },
            cli.verbose,
        ),
    }
}
