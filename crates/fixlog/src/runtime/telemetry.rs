use fixlog_core::{ClientEvent, ConnectionState, LogEntry};
use fixlog_io::metrics::{
    init_metrics, serve_metrics, set_connection_state, CONNECTION_FAILURES, ENTRY_DELTA_MS,
    LAST_ACCURACY_M, LOCATION_FIXES, LOG_ENTRIES, RESOLUTIONS_STARTED, UNKNOWN_FIXES,
};
use std::thread;
use tracing::info;

pub fn init() {
    init_metrics();
}

pub fn start_metrics_server(addr: &Option<String>) -> Option<thread::JoinHandle<()>> {
    addr.as_ref().map(|addr| {
        info!(addr = %addr, "Starting metrics server");
        serve_metrics(addr.clone())
    })
}

/// Count an event the session is about to handle in `state`.
pub fn observe_event(event: &ClientEvent, state: ConnectionState) {
    match event {
        ClientEvent::LocationChanged(Some(fix)) if state == ConnectionState::Connected => {
            LOCATION_FIXES.inc();
            LAST_ACCURACY_M.set(fix.accuracy_m as f64);
        }
        ClientEvent::LocationChanged(None) if state == ConnectionState::Connected => {
            UNKNOWN_FIXES.inc();
        }
        ClientEvent::ConnectionFailed(_) => CONNECTION_FAILURES.inc(),
        _ => {}
    }
}

pub fn observe_last_known(accuracy_m: f32) {
    LOCATION_FIXES.inc();
    LAST_ACCURACY_M.set(accuracy_m as f64);
}

pub fn observe_resolution_started() {
    RESOLUTIONS_STARTED.inc();
}

pub fn observe_state(state: ConnectionState) {
    set_connection_state(state);
}

pub fn observe_entry(entry: &LogEntry) {
    LOG_ENTRIES.inc();
    ENTRY_DELTA_MS.observe(entry.delta_ms as f64);
}
