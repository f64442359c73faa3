mod analyzer;
mod config;
mod fetcher;
mod job;
mod model;
mod notifier;
mod scheduler;

use chrono::Local;
use config::{load_config, AppConfig};
use fetcher::YahooFetcher;
use notifier::EmailNotifier;
use scheduler::DailyTrigger;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config: Arc<AppConfig> = match load_config("config.json") {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let fetcher = match YahooFetcher::new() {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let notifier = match EmailNotifier::new(&config.smtp) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to set up mail transport: {}", e);
            return;
        }
    };

    let trigger_time = match config.schedule.trigger_time() {
        Ok(t) => t,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    let mut trigger = DailyTrigger::new(
        trigger_time,
        config.schedule.skip_weekends,
        Local::now().naive_local(),
    );
    let poll_interval = Duration::from_secs(config.schedule.poll_interval_seconds);

    info!(
        "🚀 Stock notifier started: {} tickers, next run at {}",
        config.watchlist.len(),
        trigger.next_run(Local::now().naive_local())
    );

    if config.run_on_startup {
        info!("Running startup check...");
        run_once(&config, &fetcher, &notifier).await;
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        if trigger.poll(Local::now().naive_local()) {
            run_once(&config, &fetcher, &notifier).await;
            info!(
                "Next run at {}",
                trigger.next_run(Local::now().naive_local())
            );
        }

        tokio::select! {
            _ = sleep(poll_interval) => {}
            _ = &mut shutdown => {
                info!("Interrupted, shutting down.");
                break;
            }
        }
    }
}

/// Runs the job and logs a failed send; the loop goes back to idle either way.
async fn run_once(config: &AppConfig, fetcher: &YahooFetcher, notifier: &EmailNotifier) {
    let now = Local::now().naive_local();
    if let Err(e) = job::run_job(config, fetcher, notifier, now).await {
        error!("❌ Report delivery failed: {}", e);
    }
}
