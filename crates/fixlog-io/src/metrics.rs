//! Prometheus metrics for fixlog observability.
//!
//! Counters for log traffic, location fixes and connection trouble, plus a
//! gauge for the client connection state.

use fixlog_core::ConnectionState;
use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::LazyLock;
use std::thread;
use tiny_http::{Response, Server};

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Event Log Metrics
// ============================================================================

/// Lines appended to the event log
pub static LOG_ENTRIES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new("fixlog_log_entries_total", "Lines appended to the event log")
        .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Distribution of the delta field in milliseconds
pub static ENTRY_DELTA_MS: LazyLock<Histogram> = LazyLock::new(|| {
    let histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fixlog_entry_delta_milliseconds",
            "Milliseconds between consecutive log entries",
        )
        .buckets(vec![
            1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 60000.0,
        ]),
    )
    .unwrap();
    REGISTRY.register(Box::new(histogram.clone())).unwrap();
    histogram
});

// ============================================================================
// Location Metrics
// ============================================================================

/// Location fixes logged
pub static LOCATION_FIXES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new("fixlog_location_fixes_total", "Location fixes logged").unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Updates that arrived without a location
pub static UNKNOWN_FIXES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "fixlog_unknown_fixes_total",
        "Location updates that carried no position",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Accuracy of the latest fix in metres
pub static LAST_ACCURACY_M: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        "fixlog_last_fix_accuracy_meters",
        "Horizontal accuracy of the most recent fix",
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Connection Metrics
// ============================================================================

/// Connection failures reported by the location service
pub static CONNECTION_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "fixlog_connection_failures_total",
        "Connection failures reported by the location service",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Resolution flows started
pub static RESOLUTIONS_STARTED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "fixlog_resolutions_started_total",
        "Connection failure resolution flows started",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Connection state (0=disconnected,1=connecting,2=connected,3=suspended,4=resolving)
pub static CONNECTION_STATE: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        "fixlog_connection_state",
        "Connection state (0=disconnected,1=connecting,2=connected,3=suspended,4=resolving)",
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

pub fn set_connection_state(state: ConnectionState) {
    CONNECTION_STATE.set(state.as_gauge());
}

/// Render the registry in the Prometheus text format.
pub fn encode_metrics() -> Result<Vec<u8>, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(buffer)
}

// ============================================================================
// Metrics HTTP Server
// ============================================================================

/// Start the metrics HTTP server on the given address.
/// Returns a join handle for the server thread.
pub fn serve_metrics(bind_addr: String) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let server = match Server::http(&bind_addr) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to start metrics server on {}: {}", bind_addr, e);
                return;
            }
        };

        tracing::info!("Metrics server listening on http://{}/metrics", bind_addr);

        for request in server.incoming_requests() {
            match request.url() {
                "/metrics" => {
                    let buffer = match encode_metrics() {
                        Ok(buffer) => buffer,
                        Err(e) => {
                            tracing::warn!("Failed to encode metrics: {}", e);
                            let _ = request.respond(
                                Response::from_string("Internal Server Error")
                                    .with_status_code(500),
                            );
                            continue;
                        }
                    };

                    let mut response = Response::from_data(buffer);
                    if let Ok(header) = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"text/plain; version=0.0.4"[..],
                    ) {
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                }
                "/health" => {
                    let _ = request.respond(Response::from_string("OK"));
                }
                "/ready" => {
                    // Ready once at least one fix has been logged
                    if LOCATION_FIXES.get() > 0 {
                        let _ = request.respond(Response::from_string("Ready"));
                    } else {
                        let _ = request
                            .respond(Response::from_string("Not Ready").with_status_code(503));
                    }
                }
                _ => {
                    let _ =
                        request.respond(Response::from_string("Not Found").with_status_code(404));
                }
            }
        }
    })
}

/// Initialize all metrics (forces lazy initialization)
pub fn init_metrics() {
    let _ = LOG_ENTRIES.get();
    let _ = ENTRY_DELTA_MS.get_sample_count();
    let _ = LOCATION_FIXES.get();
    let _ = UNKNOWN_FIXES.get();
    let _ = LAST_ACCURACY_M.get();
    let _ = CONNECTION_FAILURES.get();
    let _ = RESOLUTIONS_STARTED.get();
    let _ = CONNECTION_STATE.get();
}
