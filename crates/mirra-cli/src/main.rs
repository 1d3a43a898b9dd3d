use std::process;

use clap::Parser;
use mirra_cli::cli::Cli;
use mirra_cli::run;
use tracing_subscriber::EnvFilter;

/// Default logging target when `RUST_LOG` is not provided.
const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    match run::run(&cli).await {
        Ok(status) => process::exit(status.exit_code()),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
