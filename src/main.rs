use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pc_price_tracker::config::{self, Settings};
use pc_price_tracker::{
    pipeline, HistoryStore, Notify, PriceTracker, StdoutNotifier, TelegramNotifier,
};

#[derive(Parser, Debug)]
#[command(name = "pc-price-tracker")]
#[command(about = "Scrape PC component prices and report the cheapest build", long_about = None)]
struct Args {
    /// JSON file with provider definitions (defaults to the built-in shops)
    #[arg(short, long)]
    providers: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Append this run to the parquet history under LOCATION
    #[arg(long, default_value_t = false)]
    history: bool,

    /// Print the message instead of sending it to Telegram
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warn,pc_price_tracker={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = Settings::from_env();
    init_logging(&args.log_level);

    let timeout = Duration::from_secs(args.timeout_secs);

    let notifier: Box<dyn Notify> = if args.dry_run {
        Box::new(StdoutNotifier)
    } else {
        let telegram = match settings.telegram() {
            Ok(telegram) => telegram,
            Err(e) => {
                error!(error = %e, "cannot notify");
                return ExitCode::FAILURE;
            }
        };
        match TelegramNotifier::new(telegram, timeout) {
            Ok(n) => Box::new(n),
            Err(e) => {
                error!(error = %e, "cannot build notifier");
                return ExitCode::FAILURE;
            }
        }
    };

    let providers = match &args.providers {
        Some(path) => match config::load_providers(path) {
            Ok(providers) => providers,
            Err(e) => {
                error!(error = %e, path = %path.display(), "cannot load providers");
                let _ = notifier.send(&pipeline::failure_message(&e));
                return ExitCode::FAILURE;
            }
        },
        None => config::default_providers(),
    };

    let history = args
        .history
        .then(|| HistoryStore::new(settings.history_path()));

    let tracker = match PriceTracker::builder().timeout(timeout).build() {
        Ok(tracker) => tracker,
        Err(e) => {
            error!(error = %e, "cannot build tracker");
            let _ = notifier.send(&pipeline::failure_message(&e));
            return ExitCode::FAILURE;
        }
    };

    let run_at = chrono::Local::now().naive_local();
    info!(%tracker, providers = providers.len(), history = args.history, "run started");

    match pipeline::run_once(&tracker, &providers, run_at, history.as_ref(), notifier.as_ref()) {
        Ok(()) => {
            info!("run finished");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
