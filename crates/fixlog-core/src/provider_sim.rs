use crate::connection::{
    Availability, ClientEvent, ConnectionResult, ErrorCode, SuspendCause, RESULT_CANCELED,
    RESULT_OK,
};
use crate::location::Location;
use crate::provider::{LocationProvider, ProviderStats, ResolutionError};
use crate::request::{LocationRequest, Priority};

const METRES_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionOutcome {
    #[default]
    Ok,
    Canceled,
    LaunchError,
}

/// Failure modes the simulated service should exhibit.
#[derive(Debug, Clone, Default)]
pub struct SimScenario {
    pub unavailable: Option<ErrorCode>,
    /// Returned for the first connect attempt only.
    pub connect_failure: Option<ConnectionResult>,
    pub resolution: ResolutionOutcome,
    pub resolution_delay_ms: u64,
    /// Drop the connection once, this long after connecting.
    pub suspend_after_ms: Option<u64>,
    pub reconnect_after_ms: u64,
}

/// Circular track the simulated device drives along.
#[derive(Debug, Clone)]
pub struct SimTrack {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub speed_mps: f64,
    pub turn_rate_deg_s: f64,
    pub altitude_m: f64,
    /// Unix ms stamped on the first fix.
    pub start_time_ms: u64,
    /// Whether a last-known fix exists before the first update.
    pub seed_last_known: bool,
}

impl Default for SimTrack {
    fn default() -> Self {
        Self {
            start_latitude: 35.681236,
            start_longitude: 139.767125,
            speed_mps: 1.4,
            turn_rate_deg_s: 3.0,
            altitude_m: 40.0,
            start_time_ms: 0,
            seed_last_known: true,
        }
    }
}

/// Deterministic location service for running without a platform.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    track: SimTrack,
    scenario: SimScenario,

    latitude: f64,
    longitude: f64,
    heading_deg: f64,
    elapsed_ms: u64,

    connected: bool,
    pending_connect: bool,
    connected_ms: u64,
    suspend_fired: bool,
    reconnect_in_ms: Option<u64>,
    pending_resolution: Option<(i32, u64)>,

    request: Option<LocationRequest>,
    since_fix_ms: u64,
    last_fix: Option<Location>,
    stats: ProviderStats,
}

impl SimulatedProvider {
    pub fn new(track: SimTrack, scenario: SimScenario) -> Self {
        let last_fix = track.seed_last_known.then(|| {
            Location::new("fused", track.start_latitude, track.start_longitude)
                .with_accuracy(accuracy_for(Priority::BalancedPowerAccuracy))
                .with_time(track.start_time_ms)
        });
        Self {
            latitude: track.start_latitude,
            longitude: track.start_longitude,
            heading_deg: 0.0,
            elapsed_ms: 0,
            connected: false,
            pending_connect: false,
            connected_ms: 0,
            suspend_fired: false,
            reconnect_in_ms: None,
            pending_resolution: None,
            request: None,
            since_fix_ms: 0,
            last_fix,
            stats: ProviderStats::default(),
            track,
            scenario,
        }
    }

    /// Offer a fix from another source. Delivered only while connected with
    /// updates requested, and no sooner than the fastest interval.
    pub fn inject_fix(&mut self, location: Location) -> Option<ClientEvent> {
        let request = self.request?;
        if !self.connected || self.since_fix_ms < request.fastest_interval_ms() {
            return None;
        }
        self.since_fix_ms = 0;
        self.last_fix = Some(location.clone());
        self.stats.fixes_delivered += 1;
        Some(ClientEvent::LocationChanged(Some(location)))
    }

    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    fn step_motion(&mut self, dt_ms: u64) {
        let dt_s = dt_ms as f64 / 1000.0;
        self.heading_deg = (self.heading_deg + self.track.turn_rate_deg_s * dt_s).rem_euclid(360.0);
        let distance = self.track.speed_mps * dt_s;
        let heading = self.heading_deg.to_radians();
        self.latitude += distance * heading.cos() / METRES_PER_DEGREE;
        self.longitude +=
            distance * heading.sin() / (METRES_PER_DEGREE * self.latitude.to_radians().cos());
    }

    fn make_fix(&self, priority: Priority) -> Location {
        Location::new("fused", self.latitude, self.longitude)
            .with_accuracy(accuracy_for(priority))
            .with_time(self.track.start_time_ms + self.elapsed_ms)
            .with_altitude(self.track.altitude_m)
            .with_motion(self.track.speed_mps as f32, self.heading_deg as f32)
    }
}

fn accuracy_for(priority: Priority) -> f32 {
    match priority {
        Priority::HighAccuracy => 5.0,
        Priority::BalancedPowerAccuracy => 40.0,
        Priority::LowPower | Priority::NoPower => 500.0,
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(SimTrack::default(), SimScenario::default())
    }
}

impl LocationProvider for SimulatedProvider {
    fn availability(&self) -> Availability {
        match self.scenario.unavailable {
            Some(code) => Availability::Unavailable(code),
            None => Availability::Available,
        }
    }

    fn connect(&mut self) {
        if self.connected || self.pending_connect {
            return;
        }
        self.pending_connect = true;
        self.stats.connect_attempts += 1;
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.pending_connect = false;
        self.reconnect_in_ms = None;
        self.request = None;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn last_location(&self) -> Option<Location> {
        self.last_fix.clone()
    }

    fn request_updates(&mut self, request: &LocationRequest) {
        self.request = Some(*request);
        self.since_fix_ms = 0;
    }

    fn remove_updates(&mut self) {
        self.request = None;
    }

    fn start_resolution(&mut self, request_code: i32) -> Result<(), ResolutionError> {
        if let Some((pending, _)) = self.pending_resolution {
            return Err(ResolutionError::AlreadyPending(pending));
        }
        if self.scenario.resolution == ResolutionOutcome::LaunchError {
            return Err(ResolutionError::LaunchFailed(
                "resolution intent was canceled".to_string(),
            ));
        }
        self.pending_resolution = Some((request_code, self.scenario.resolution_delay_ms));
        Ok(())
    }

    fn advance(&mut self, dt_ms: u64) -> Vec<ClientEvent> {
        self.elapsed_ms += dt_ms;
        self.step_motion(dt_ms);

        let mut events = Vec::new();

        if self.pending_connect {
            self.pending_connect = false;
            match self.scenario.connect_failure {
                Some(failure) if self.stats.connect_attempts == 1 => {
                    events.push(ClientEvent::ConnectionFailed(failure));
                }
                _ => {
                    self.connected = true;
                    self.connected_ms = 0;
                    events.push(ClientEvent::Connected);
                }
            }
        }

        if let Some((request_code, remaining)) = self.pending_resolution {
            let remaining = remaining.saturating_sub(dt_ms);
            if remaining == 0 {
                self.pending_resolution = None;
                let result_code = match self.scenario.resolution {
                    ResolutionOutcome::Ok => RESULT_OK,
                    _ => RESULT_CANCELED,
                };
                events.push(ClientEvent::ResolutionResult {
                    request_code,
                    result_code,
                });
            } else {
                self.pending_resolution = Some((request_code, remaining));
            }
        }

        if let Some(remaining) = self.reconnect_in_ms {
            let remaining = remaining.saturating_sub(dt_ms);
            if remaining == 0 {
                self.reconnect_in_ms = None;
                self.connected = true;
                self.connected_ms = 0;
                events.push(ClientEvent::Connected);
            } else {
                self.reconnect_in_ms = Some(remaining);
            }
        } else if self.connected {
            self.connected_ms += dt_ms;
            match self.scenario.suspend_after_ms {
                Some(after) if !self.suspend_fired && self.connected_ms >= after => {
                    self.suspend_fired = true;
                    self.connected = false;
                    self.reconnect_in_ms = Some(self.scenario.reconnect_after_ms.max(1));
                    self.stats.suspensions += 1;
                    events.push(ClientEvent::ConnectionSuspended(
                        SuspendCause::ServiceDisconnected,
                    ));
                }
                _ => {
                    if let Some(request) = self.request {
                        // Validated requests keep fastest <= interval
                        let interval = request.interval_ms();
                        self.since_fix_ms = (self.since_fix_ms + dt_ms).min(interval);
                        if request.priority != Priority::NoPower && self.since_fix_ms >= interval {
                            self.since_fix_ms = 0;
                            let fix = self.make_fix(request.priority);
                            self.last_fix = Some(fix.clone());
                            self.stats.fixes_delivered += 1;
                            events.push(ClientEvent::LocationChanged(Some(fix)));
                        }
                    }
                }
            }
        }

        events
    }

    fn stats(&self) -> ProviderStats {
        self.stats.clone()
    }
}
