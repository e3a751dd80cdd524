use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use elevdiff::fetch::DEFAULT_TIMEOUT_SECS;
use elevdiff::request::DEFAULT_ENDPOINT;
use elevdiff::DEFAULT_BATCH_SIZE;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod input;

/// Compare reference elevations with an elevation lookup service
#[derive(Parser)]
#[command(name = "elevdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API key for the elevation service
    #[arg(short = 'k', long, env = "ELEVDIFF_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Elevation service endpoint
    #[arg(long, env = "ELEVDIFF_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Maximum locations per request
    #[arg(
        short,
        long,
        env = "ELEVDIFF_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        global = true
    )]
    batch_size: usize,

    /// Per-request timeout in seconds
    #[arg(
        short,
        long,
        env = "ELEVDIFF_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Input file options shared by all subcommands.
#[derive(Args)]
pub struct InputArgs {
    /// Input file (.json locations document, .geojson, or .csv)
    input: PathBuf,

    /// Column name for latitude (CSV only)
    #[arg(long, default_value = "lat")]
    lat_col: String,

    /// Column name for longitude (CSV only)
    #[arg(long, default_value = "lon")]
    lon_col: String,

    /// Column name for the reference elevation (CSV only)
    #[arg(long, default_value = "z")]
    z_col: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Average difference between reference and service elevations
    Average {
        #[command(flatten)]
        input: InputArgs,

        /// Send all requests concurrently instead of one at a time
        #[arg(short, long)]
        concurrent: bool,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the requests that would be sent, without sending them
    Plan {
        #[command(flatten)]
        input: InputArgs,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elevdiff=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Average {
            input,
            concurrent,
            json,
        } => commands::average::run(
            cli.api_key,
            cli.endpoint,
            cli.batch_size,
            cli.timeout,
            input,
            concurrent,
            json,
        ),
        Commands::Plan { input, json } => {
            commands::plan::run(cli.endpoint, cli.batch_size, input, json)
        }
    }
}
