pub mod api;
pub mod chat;
pub mod cli;
pub mod client_state;
pub mod config;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod upstream;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = config::Cli::parse();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(cli::dispatch(cli)) {
        tracing::error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}
