//! CardioViz: Synthetic Cardiovascular Cohort Monitor
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardioviz::adapters::JsonSnapshotStore;
use cardioviz::application::{CohortGenerator, MonitorService, MutationEngine, MutationMode};
use cardioviz::ports::SnapshotStore;
use cardioviz::tui::App;

const DEFAULT_COHORT_SIZE: usize = 1000;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_TICK_MS: u64 = 2000;

fn main() -> Result<()> {
    // Initialize logging.
    //
    // IMPORTANT: writing logs to the terminal will corrupt the TUI (alternate screen).
    // Default behavior:
    // - interactive TTY: log to a file
    // - non-interactive: log to stdout (so `docker logs` works)
    let log_mode =
        std::env::var("CARDIOVIZ_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        // auto
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file = std::env::var("CARDIOVIZ_LOG_FILE")
            .unwrap_or_else(|_| "cardioviz.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting CardioViz...");

    let cohort_size = env_parse("CARDIOVIZ_COHORT_SIZE", DEFAULT_COHORT_SIZE)?;
    let seed: u64 = env_parse("CARDIOVIZ_SEED", DEFAULT_SEED)?;
    let tick_ms: u64 = env_parse("CARDIOVIZ_TICK_MS", DEFAULT_TICK_MS)?;
    let snapshot_path = PathBuf::from(
        std::env::var("CARDIOVIZ_SNAPSHOT_PATH").unwrap_or_else(|_| "data.json".to_string()),
    );

    let store = JsonSnapshotStore::new(&snapshot_path);

    // Reuse the persisted cohort when one exists; otherwise generate and save.
    let cohort = if store.has_snapshot().context("checking for cohort snapshot")? {
        tracing::info!(path = %snapshot_path.display(), "loading cohort snapshot");
        store
            .load_cohort()
            .with_context(|| format!("loading cohort from {}", snapshot_path.display()))?
    } else {
        tracing::info!(cohort_size, seed, "generating fresh cohort");
        let cohort = CohortGenerator::new(seed).generate(cohort_size)?;
        store
            .save_cohort(&cohort)
            .with_context(|| format!("saving cohort to {}", snapshot_path.display()))?;
        cohort
    };

    let engine = MutationEngine::new(seed, MutationMode::Resample);
    let service = MonitorService::new(cohort, engine, seed);

    // Run the TUI application
    let mut app = App::new(service.clone(), Duration::from_millis(tick_ms), seed);
    app.run()?;

    // Persist the drifted cohort so the next run resumes from it.
    service
        .save_to(&store)
        .with_context(|| format!("saving cohort to {}", snapshot_path.display()))?;

    tracing::info!("CardioViz shutdown complete.");
    Ok(())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {name}: {value:?}")),
        Err(_) => Ok(default),
    }
}
