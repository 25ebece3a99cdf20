use clap::Parser;
use dotenvy::dotenv;
use product_tracker::{cli::Cli, errors::Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; DATABASE_URL may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Parse arguments and run the command
    let cli = Cli::parse();
    product_tracker::cli::run(cli)
        .await
        .inspect_err(|e| error!("Command failed: {}", e))
}
