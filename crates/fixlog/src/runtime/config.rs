use fixlog_core::{
    ConnectionResult, ErrorCode, LocationRequest, Priority, RequestError, ResolutionOutcome,
    SimScenario, SimTrack,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    pub run_seconds: Option<u64>,
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub priority: Priority,
    pub tick_ms: u64,
    pub start: Option<(f64, f64)>,
    pub speed_mps: f64,
    pub unavailable: Option<i32>,
    pub fail_connect: Option<i32>,
    pub has_resolution: bool,
    pub resolution: ResolutionOutcome,
    pub resolution_delay_ms: u64,
    pub suspend_after_ms: Option<u64>,
    pub reconnect_after_ms: u64,
    pub json_logs: bool,
    pub log_dir: Option<PathBuf>,
    pub metrics_addr: Option<String>,
    pub transcript_path: Option<PathBuf>,
    /// Arguments that were recognised but could not be used.
    pub warnings: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let request = LocationRequest::default();
        Self {
            show_help: false,
            run_seconds: None,
            interval_ms: request.interval_ms(),
            fastest_interval_ms: request.fastest_interval_ms(),
            priority: request.priority,
            tick_ms: 100,
            start: None,
            speed_mps: SimTrack::default().speed_mps,
            unavailable: None,
            fail_connect: None,
            has_resolution: true,
            resolution: ResolutionOutcome::Ok,
            resolution_delay_ms: 1500,
            suspend_after_ms: None,
            reconnect_after_ms: 2000,
            json_logs: false,
            log_dir: None,
            metrics_addr: None,
            transcript_path: None,
            warnings: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = args.get(i + 1).map(String::as_str);
            let mut consumed = value.is_some();
            match (flag, value) {
                ("--run-seconds", Some(v)) => cfg.run_seconds = cfg.number(flag, v),
                ("--interval-ms", Some(v)) => {
                    cfg.interval_ms = cfg.number(flag, v).unwrap_or(cfg.interval_ms)
                }
                ("--fastest-interval-ms", Some(v)) => {
                    cfg.fastest_interval_ms = cfg.number(flag, v).unwrap_or(cfg.fastest_interval_ms)
                }
                ("--priority", Some(v)) => match v.parse() {
                    Ok(p) => cfg.priority = p,
                    Err(e) => cfg.warnings.push(format!("{flag}: {e}")),
                },
                ("--tick-ms", Some(v)) => {
                    cfg.tick_ms = cfg.number(flag, v).unwrap_or(cfg.tick_ms).max(1)
                }
                ("--start", Some(v)) => match parse_lat_lon(v) {
                    Some(point) => cfg.start = Some(point),
                    None => cfg
                        .warnings
                        .push(format!("{flag}: expected LAT,LON, got '{v}'")),
                },
                ("--speed-mps", Some(v)) => {
                    cfg.speed_mps = cfg.number(flag, v).unwrap_or(cfg.speed_mps)
                }
                ("--unavailable", Some(v)) => cfg.unavailable = cfg.number(flag, v),
                ("--fail-connect", Some(v)) => cfg.fail_connect = cfg.number(flag, v),
                ("--resolution", Some(v)) => match v {
                    "ok" => cfg.resolution = ResolutionOutcome::Ok,
                    "canceled" | "cancelled" => cfg.resolution = ResolutionOutcome::Canceled,
                    "error" => cfg.resolution = ResolutionOutcome::LaunchError,
                    other => cfg.warnings.push(format!(
                        "{flag}: expected ok|canceled|error, got '{other}'"
                    )),
                },
                ("--resolution-delay-ms", Some(v)) => {
                    cfg.resolution_delay_ms =
                        cfg.number(flag, v).unwrap_or(cfg.resolution_delay_ms)
                }
                ("--suspend-after-ms", Some(v)) => cfg.suspend_after_ms = cfg.number(flag, v),
                ("--reconnect-after-ms", Some(v)) => {
                    cfg.reconnect_after_ms = cfg.number(flag, v).unwrap_or(cfg.reconnect_after_ms)
                }
                ("--log-dir", Some(v)) => cfg.log_dir = Some(PathBuf::from(v)),
                ("--metrics-addr", Some(v)) => cfg.metrics_addr = Some(v.to_string()),
                ("--transcript", Some(v)) => cfg.transcript_path = Some(PathBuf::from(v)),
                ("--no-resolution", _) => {
                    cfg.has_resolution = false;
                    consumed = false;
                }
                ("--json-logs", _) => {
                    cfg.json_logs = true;
                    consumed = false;
                }
                ("--help" | "-h", _) => {
                    cfg.show_help = true;
                    break;
                }
                (other, _) => {
                    cfg.warnings.push(format!("ignoring argument '{other}'"));
                    consumed = false;
                }
            }
            if consumed {
                i += 1;
            }
            i += 1;
        }
        cfg
    }

    fn number<T: std::str::FromStr>(&mut self, flag: &str, value: &str) -> Option<T> {
        match value.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                self.warnings
                    .push(format!("{flag}: '{value}' is not a valid number"));
                None
            }
        }
    }

    pub fn location_request(&self) -> Result<LocationRequest, RequestError> {
        LocationRequest::new(
            self.priority,
            Duration::from_millis(self.interval_ms),
            Duration::from_millis(self.fastest_interval_ms),
        )
        .validate()
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn sim_track(&self, start_time_ms: u64) -> SimTrack {
        let defaults = SimTrack::default();
        let (start_latitude, start_longitude) = self
            .start
            .unwrap_or((defaults.start_latitude, defaults.start_longitude));
        SimTrack {
            start_latitude,
            start_longitude,
            speed_mps: self.speed_mps,
            start_time_ms,
            ..defaults
        }
    }

    pub fn sim_scenario(&self) -> SimScenario {
        SimScenario {
            unavailable: self.unavailable.map(ErrorCode::from),
            connect_failure: self
                .fail_connect
                .map(|code| ConnectionResult::new(ErrorCode::from(code), self.has_resolution)),
            resolution: self.resolution,
            resolution_delay_ms: self.resolution_delay_ms,
            suspend_after_ms: self.suspend_after_ms,
            reconnect_after_ms: self.reconnect_after_ms,
        }
    }

    pub fn print_help() {
        println!(
            r#"fixlog - timestamped location event log

USAGE:
    fixlog [OPTIONS]

OPTIONS:
    --run-seconds <SECS>         Run for a fixed duration then exit (default: until Ctrl-C)
    --interval-ms <MS>           Location update interval [default: 5000]
    --fastest-interval-ms <MS>   Fastest accepted update interval [default: 1000]
    --priority <NAME>            high|balanced|low|none [default: high]
    --tick-ms <MS>               Provider polling period [default: 100]
    --start <LAT,LON>            Starting point of the simulated track
    --speed-mps <M/S>            Simulated ground speed [default: 1.4]
    --unavailable <CODE>         Report location services as unavailable with CODE
    --fail-connect <CODE>        Fail the first connection attempt with CODE
    --no-resolution              Connection failure has no resolution
    --resolution <OUTCOME>       ok|canceled|error [default: ok]
    --resolution-delay-ms <MS>   Time the resolution flow takes [default: 1500]
    --suspend-after-ms <MS>      Suspend the connection once after MS connected
    --reconnect-after-ms <MS>    Reconnect delay after a suspension [default: 2000]
    --json-logs                  Output diagnostics in JSON format
    --log-dir <DIR>              Also write diagnostics to a daily rolling file in DIR
    --metrics-addr <ADDR>        Enable Prometheus metrics server on address (e.g., 0.0.0.0:9090)
    --transcript <PATH>          Append every log line to a JSONL file
    -h, --help                   Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                     Diagnostic filter (e.g., RUST_LOG=debug,fixlog_core=trace)

The event log itself is printed to stdout; diagnostics go to stderr.

EXAMPLES:
    # One-second updates for ten seconds
    fixlog --interval-ms 1000 --fastest-interval-ms 500 --run-seconds 10

    # Exercise the failure and resolution path
    fixlog --fail-connect 4 --resolution ok --run-seconds 5
"#
        );
    }
}

fn parse_lat_lon(value: &str) -> Option<(f64, f64)> {
    let (lat, lon) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("fixlog")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults_match_location_request_defaults() {
        let cfg = RuntimeConfig::from_args(&args(&[]));
        assert_eq!(cfg.location_request().unwrap(), LocationRequest::default());
        assert!(cfg.warnings.is_empty());
        assert!(cfg.sim_scenario().connect_failure.is_none());
    }

    #[test]
    fn parses_values_and_switches() {
        let cfg = RuntimeConfig::from_args(&args(&[
            "--run-seconds",
            "3",
            "--interval-ms",
            "200",
            "--fastest-interval-ms",
            "100",
            "--priority",
            "balanced",
            "--json-logs",
            "--start",
            "48.8584,2.2945",
            "--fail-connect",
            "4",
            "--no-resolution",
            "--transcript",
            "/tmp/t.jsonl",
        ]));
        assert_eq!(cfg.run_seconds, Some(3));
        assert!(cfg.json_logs);
        assert_eq!(cfg.start, Some((48.8584, 2.2945)));
        assert_eq!(cfg.transcript_path, Some(PathBuf::from("/tmp/t.jsonl")));

        let req = cfg.location_request().unwrap();
        assert_eq!(req.priority, Priority::BalancedPowerAccuracy);
        assert_eq!(req.interval_ms(), 200);

        let failure = cfg.sim_scenario().connect_failure.unwrap();
        assert_eq!(failure.error_code, ErrorCode::SignInRequired);
        assert!(!failure.has_resolution);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn bad_values_become_warnings() {
        let cfg = RuntimeConfig::from_args(&args(&[
            "--interval-ms",
            "soon",
            "--priority",
            "turbo",
            "--start",
            "100,0",
            "--bogus",
        ]));
        assert_eq!(cfg.interval_ms, 5000);
        assert_eq!(cfg.warnings.len(), 4);
    }

    #[test]
    fn invalid_request_is_rejected() {
        let cfg = RuntimeConfig::from_args(&args(&[
            "--interval-ms",
            "100",
            "--fastest-interval-ms",
            "500",
        ]));
        assert!(matches!(
            cfg.location_request(),
            Err(RequestError::FastestExceedsInterval { .. })
        ));
    }

    #[test]
    fn help_stops_parsing() {
        let cfg = RuntimeConfig::from_args(&args(&["-h", "--bogus"]));
        assert!(cfg.show_help);
        assert!(cfg.warnings.is_empty());
    }
}
