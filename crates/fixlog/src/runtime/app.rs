use crate::infra::transcript::{TranscriptError, TranscriptWriter};
use crate::runtime::config::RuntimeConfig;
use crate::runtime::logging::init_tracing;
use crate::runtime::session::Session;
use crate::runtime::telemetry;
use fixlog_core::{
    EventLog, LocationProvider, LocationRequest, RequestError, SharedEventLog, SimulatedProvider,
    TimeBase,
};
use fixlog_io::{DisplayError, ScrollView};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid location request: {0}")]
    Request(#[from] RequestError),

    #[error("cannot open transcript {path}: {source}")]
    TranscriptOpen {
        path: PathBuf,
        source: TranscriptError,
    },

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("display task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub fn run_from_args() -> Result<(), AppError> {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return Ok(());
    }
    run(config)
}

pub fn run(config: RuntimeConfig) -> Result<(), AppError> {
    // Initialize tracing; the guard flushes the rolling file on drop
    let _log_guard = init_tracing(config.json_logs, config.log_dir.as_deref());
    for warning in &config.warnings {
        warn!("{warning}");
    }

    // Initialize metrics
    telemetry::init();
    let _metrics_handle = telemetry::start_metrics_server(&config.metrics_addr);

    let request = config.location_request()?;

    let transcript = match &config.transcript_path {
        Some(path) => {
            let writer =
                TranscriptWriter::new(path).map_err(|source| AppError::TranscriptOpen {
                    path: path.clone(),
                    source,
                })?;
            info!(path = %path.display(), "Transcript enabled");
            Some(writer)
        }
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(drive(config, request, transcript))
}

async fn drive(
    config: RuntimeConfig,
    request: LocationRequest,
    transcript: Option<TranscriptWriter>,
) -> Result<(), AppError> {
    let timebase = TimeBase::new();
    let started_unix_ms = timebase.unix_ms();

    let (notify_tx, notify_rx) = mpsc::unbounded_channel::<()>();
    let log = SharedEventLog::new(EventLog::new(timebase).with_notifier(move || {
        let _ = notify_tx.send(());
    }));
    let presenter = tokio::spawn(present(
        log.clone(),
        notify_rx,
        transcript,
        started_unix_ms,
    ));

    let provider = SimulatedProvider::new(config.sim_track(started_unix_ms), config.sim_scenario());
    let mut session = Session::new(log.clone(), provider, request);

    info!(
        priority = request.priority.as_str(),
        interval_ms = request.interval_ms(),
        tick_ms = config.tick_ms,
        "Starting location session"
    );
    session.resume();

    let mut ticker = tokio::time::interval(config.tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    let deadline = async {
        match config.run_seconds {
            Some(seconds) => {
                info!(seconds, "Running for limited duration");
                tokio::time::sleep(Duration::from_secs(seconds)).await
            }
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt_ms = now.duration_since(last_tick).as_millis() as u64;
                last_tick = now;
                session.tick(dt_ms);
            }
            _ = &mut deadline => break,
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Interrupted");
                break;
            }
        }
    }

    session.pause();

    // Dropping the notifier closes the channel once the presenter has drained it
    log.set_notifier(|| {});
    let presented = presenter.await??;

    let stats = session.provider().stats();
    info!(
        entries = session.log().len(),
        presented,
        fixes_delivered = stats.fixes_delivered,
        connect_attempts = stats.connect_attempts,
        suspensions = stats.suspensions,
        final_state = session.state().as_str(),
        "Run complete"
    );
    Ok(())
}

/// Display task: scrolls stdout to the newest text and mirrors entries into
/// metrics and the transcript. Returns the number of entries handled.
async fn present(
    log: SharedEventLog<TimeBase>,
    mut notifications: mpsc::UnboundedReceiver<()>,
    transcript: Option<TranscriptWriter>,
    started_unix_ms: u64,
) -> Result<usize, AppError> {
    let mut view = ScrollView::new(std::io::stdout());
    let mut seen = 0usize;
    let mut at_unix_ms = started_unix_ms;

    loop {
        let open = notifications.recv().await.is_some();
        // Coalesce bursts into one refresh
        while notifications.try_recv().is_ok() {}

        view.refresh_shared(&log)?;
        for entry in log.entries_from(seen) {
            seen += 1;
            at_unix_ms += entry.delta_ms;
            telemetry::observe_entry(&entry);
            if let Some(writer) = &transcript {
                writer.record(seen as u64, at_unix_ms, &entry)?;
            }
        }

        if !open {
            return Ok(seen);
        }
    }
}
