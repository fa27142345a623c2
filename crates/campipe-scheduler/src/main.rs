//! Block scheduling binary.

use std::sync::Arc;

use chrono::Utc;
use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use campipe_queue::{MemorySetStore, QueueConfig, WorkQueueClient};
use campipe_scheduler::{Dispatcher, ScheduleOptions, SchedulerConfig};

/// Queue frame-extraction and pose-estimation jobs for a classroom.
#[derive(Parser, Debug)]
#[command(name = "queue-jobs", version)]
struct Cli {
    /// Classroom environment directory under the video root
    #[arg(long)]
    environment: String,

    /// Classroom timezone (IANA name)
    #[arg(long, default_value = "US/Central")]
    tz: String,

    /// Operating hours, HH:MM-HH:MM in classroom time
    #[arg(long, default_value = "07:30-16:30")]
    hours: String,

    /// Log every run parameter and classified block
    #[arg(long, overrides_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, overrides_with = "verbose")]
    quiet: bool,

    /// Reprocess this date/time (YYYY-MM-DD[ HH:MM[:SS]]) instead of now
    #[arg(long)]
    reprocess_date: Option<String>,

    /// Also check yesterday's blocks
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    check_yesterday: bool,

    /// Schedule Saturday and Sunday as well
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    include_weekends: bool,

    /// Classify and report without writing to the queue service
    #[arg(long)]
    dry_run: bool,
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

    let config = SchedulerConfig::from_env();
    let options = ScheduleOptions {
        environment: cli.environment,
        timezone: cli.tz,
        hours: cli.hours,
        reprocess_date: cli.reprocess_date,
        check_yesterday: cli.check_yesterday,
        include_weekends: cli.include_weekends,
    };

    let plan = match options.plan(Utc::now()) {
        Ok(plan) => plan,
        Err(e) => {
            error!("Invalid scheduling options: {}", e);
            std::process::exit(1);
        }
    };
    plan.log();

    let queue = if cli.dry_run {
        info!("Dry run: entries go to an in-memory queue");
        WorkQueueClient::new(Arc::new(MemorySetStore::new()), QueueConfig::from_env())
    } else {
        match WorkQueueClient::from_env() {
            Ok(q) => q,
            Err(e) => {
                error!("Failed to create work queue: {}", e);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = queue.log_sizes().await {
        error!("Queue service unavailable: {}", e);
        std::process::exit(1);
    }

    let dispatcher = Dispatcher::from_config(&config, queue);
    if let Err(e) = dispatcher.dispatch(&plan).await {
        error!("Dispatch failed: {}", e);
        std::process::exit(1);
    }
}
