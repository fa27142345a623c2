//! Frame extraction worker binary.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use campipe_queue::WorkQueueClient;
use campipe_worker::{ExtractionWorker, WorkerConfig};

/// Extract frames for blocks queued by queue-jobs.
#[derive(Parser, Debug)]
#[command(name = "frames-worker", version)]
struct Cli {
    /// Log queue state and every processed video
    #[arg(long, overrides_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, overrides_with = "verbose")]
    quiet: bool,

    /// Exit after the first processed block
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn log_directive(&self) -> &'static str {
        if self.verbose {
            "campipe=debug"
        } else if self.quiet {
            "campipe=warn"
        } else {
            "campipe=info"
        }
    }
}

fn init_tracing(directive: &str) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
    );

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_directive());

    let config = WorkerConfig::from_env().with_run_once(cli.once);
    info!("Worker config: {:?}", config);

    let queue = match WorkQueueClient::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create work queue: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = queue.log_sizes().await {
        error!("Queue service unavailable: {}", e);
        std::process::exit(1);
    }

    let worker = Arc::new(ExtractionWorker::with_ffmpeg(config, queue));

    // Stop between blocks on Ctrl-C
    let signal_worker = Arc::clone(&worker);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            signal_worker.shutdown();
        }
    });

    match worker.run().await {
        Ok(processed) => info!(processed, "Worker shutdown complete"),
        Err(e) => {
            error!("Worker error: {}", e);
            std::process::exit(1);
        }
    }
}
