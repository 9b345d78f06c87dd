use clap::Parser;
use intent_loadtest::utils::error::ErrorSeverity;
use intent_loadtest::utils::logger;
use intent_loadtest::{
    load_pairs, CliConfig, HttpIntentClient, LoadTestError, ResourcePool, RunConfig,
    RunScheduler, TimingRecorder, TomlConfig, TransactionDriver,
};
use std::sync::Arc;

fn build_scheduler(cli: &CliConfig) -> Result<RunScheduler<HttpIntentClient>, LoadTestError> {
    let file = cli.config.as_deref().map(TomlConfig::from_file).transpose()?;
    let config = RunConfig::resolve(cli.partial(), file.as_ref())?;
    tracing::debug!(
        "Run config: host={}, pairs={}, report={}, rounds={}",
        config.target.host,
        config.pairs_file,
        config.report_file,
        config.rounds
    );

    let pool = Arc::new(ResourcePool::new(load_pairs(&config.pairs_file)?));
    let recorder = Arc::new(TimingRecorder::open(&config.report_file)?);
    let client = Arc::new(HttpIntentClient::new(&config.target)?);

    let driver = TransactionDriver::new(client, pool, recorder, config.timing.phases);
    Ok(RunScheduler::new_with_monitoring(
        driver,
        config.schedule_policy(),
        cli.monitor,
    ))
}

#[tokio::main]
async fn main() {
    // .env first so clap's env lookups can see it
    let dotenv = dotenvy::dotenv();
    let cli = CliConfig::parse();

    logger::init_logger(cli.log_format, cli.verbose);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    tracing::info!("Starting intent-loadtest");
    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let scheduler = match build_scheduler(&cli) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(
                "❌ Setup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    let summary = scheduler.run().await;
    println!(
        "✅ Finished {} round(s): {} transaction(s), {} settled, {} pair(s) dropped",
        summary.rounds_run,
        summary.outcomes.total(),
        summary.outcomes.settled,
        summary.pool.dropped
    );
}
