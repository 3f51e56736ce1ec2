//! Location client lifecycle as a pure state machine.
//!
//! Platform callbacks (resume, pause, connected, connection failed, ...) are
//! fed in as [`ClientEvent`]s. [`transition`] maps `(state, event)` to the
//! next state plus a list of [`Effect`]s for the host to carry out. The
//! machine never touches the log or the provider itself.

use crate::location::{describe_location, Location};
use crate::request::LocationRequest;
use std::fmt;

/// Request code attached to the resolution flow.
pub const CONNECTION_FAILURE_RESOLUTION_REQUEST: i32 = 9000;
pub const RESULT_OK: i32 = -1;
pub const RESULT_CANCELED: i32 = 0;

pub const MSG_AVAILABLE: &str = "Location services are available";
pub const MSG_NOT_AVAILABLE: &str = "Location services are not available";
pub const MSG_CONNECTED: &str = "Connected";
pub const MSG_LOCATIONS_HEADER: &str = "Locations (starting with last known):";
pub const MSG_CONNECTION_FAILED: &str = "Connection failed";
pub const MSG_TRYING_TO_RESOLVE: &str = "Trying to resolve the error...";
pub const MSG_SUSPENDED: &str = "Connection suspended";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Suspended,
    Resolving,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Suspended => "suspended",
            Self::Resolving => "resolving",
        }
    }

    /// Gauge value (0=disconnected,1=connecting,2=connected,3=suspended,4=resolving).
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Disconnected => 0.0,
            Self::Connecting => 1.0,
            Self::Connected => 2.0,
            Self::Suspended => 3.0,
            Self::Resolving => 4.0,
        }
    }
}

/// Status codes reported by the location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    ServiceMissing,
    ServiceVersionUpdateRequired,
    ServiceDisabled,
    SignInRequired,
    InvalidAccount,
    ResolutionRequired,
    NetworkError,
    InternalError,
    Other(i32),
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ServiceMissing => 1,
            Self::ServiceVersionUpdateRequired => 2,
            Self::ServiceDisabled => 3,
            Self::SignInRequired => 4,
            Self::InvalidAccount => 5,
            Self::ResolutionRequired => 6,
            Self::NetworkError => 7,
            Self::InternalError => 8,
            Self::Other(code) => code,
        }
    }

    /// Text shown by the host's error dialog.
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ServiceMissing => "location services are missing on this device",
            Self::ServiceVersionUpdateRequired => "location services must be updated",
            Self::ServiceDisabled => "location services are disabled",
            Self::SignInRequired => "sign-in required",
            Self::InvalidAccount => "invalid account",
            Self::ResolutionRequired => "resolution required",
            Self::NetworkError => "network error",
            Self::InternalError => "internal error",
            Self::Other(_) => "unknown error",
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::ServiceMissing,
            2 => Self::ServiceVersionUpdateRequired,
            3 => Self::ServiceDisabled,
            4 => Self::SignInRequired,
            5 => Self::InvalidAccount,
            6 => Self::ResolutionRequired,
            7 => Self::NetworkError,
            8 => Self::InternalError,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionResult {
    pub error_code: ErrorCode,
    pub has_resolution: bool,
}

impl ConnectionResult {
    pub fn new(error_code: ErrorCode, has_resolution: bool) -> Self {
        Self {
            error_code,
            has_resolution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(ErrorCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendCause {
    ServiceDisconnected,
    NetworkLost,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Resumed(Availability),
    Paused,
    Connected,
    ConnectionFailed(ConnectionResult),
    ConnectionSuspended(SuspendCause),
    ResolutionLaunchFailed(String),
    ResolutionResult { request_code: i32, result_code: i32 },
    LocationChanged(Option<Location>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Log(String),
    Connect,
    Disconnect,
    /// Log the provider's last known fix, if it has one.
    ReportLastKnownLocation,
    RequestUpdates(LocationRequest),
    ShowErrorDialog(ErrorCode),
    StartResolution { request_code: i32 },
}

fn say(msg: impl Into<String>) -> Effect {
    Effect::Log(msg.into())
}

pub fn transition(
    state: ConnectionState,
    event: &ClientEvent,
    request: &LocationRequest,
) -> (ConnectionState, Vec<Effect>) {
    use ConnectionState::*;

    match event {
        ClientEvent::Resumed(Availability::Available) => match state {
            Disconnected | Suspended => (Connecting, vec![say(MSG_AVAILABLE), Effect::Connect]),
            _ => (state, vec![say(MSG_AVAILABLE)]),
        },
        ClientEvent::Resumed(Availability::Unavailable(code)) => {
            let mut effects = vec![say(MSG_NOT_AVAILABLE), Effect::ShowErrorDialog(*code)];
            if matches!(state, Connected | Connecting | Suspended) {
                effects.push(Effect::Disconnect);
            }
            (Disconnected, effects)
        }
        ClientEvent::Paused => match state {
            Connected | Connecting | Suspended => (Disconnected, vec![Effect::Disconnect]),
            Disconnected | Resolving => (state, Vec::new()),
        },
        ClientEvent::Connected => match state {
            Connecting | Suspended => (
                Connected,
                vec![
                    say(MSG_CONNECTED),
                    say(MSG_LOCATIONS_HEADER),
                    Effect::ReportLastKnownLocation,
                    Effect::RequestUpdates(*request),
                ],
            ),
            _ => (state, Vec::new()),
        },
        ClientEvent::ConnectionFailed(result) => {
            if result.has_resolution {
                (
                    Resolving,
                    vec![
                        say(MSG_CONNECTION_FAILED),
                        say(MSG_TRYING_TO_RESOLVE),
                        Effect::StartResolution {
                            request_code: CONNECTION_FAILURE_RESOLUTION_REQUEST,
                        },
                    ],
                )
            } else {
                (
                    Disconnected,
                    vec![
                        say(MSG_CONNECTION_FAILED),
                        Effect::ShowErrorDialog(result.error_code),
                    ],
                )
            }
        }
        ClientEvent::ResolutionLaunchFailed(reason) => (
            Disconnected,
            vec![say(format!("Exception during resolution: {reason}"))],
        ),
        ClientEvent::ResolutionResult {
            request_code,
            result_code,
        } => {
            if *request_code != CONNECTION_FAILURE_RESOLUTION_REQUEST {
                return (state, Vec::new());
            }
            let line = say(format!("Resolution result code is: {result_code}"));
            match state {
                // Already live: the late result changes nothing
                Connected | Connecting | Suspended => (state, vec![line]),
                Disconnected | Resolving if *result_code == RESULT_OK => {
                    (Connecting, vec![line, Effect::Connect])
                }
                Disconnected | Resolving => (Disconnected, vec![line]),
            }
        }
        ClientEvent::ConnectionSuspended(_) => match state {
            Connected => (Suspended, vec![say(MSG_SUSPENDED)]),
            _ => (state, Vec::new()),
        },
        ClientEvent::LocationChanged(fix) => match state {
            Connected => (state, vec![say(describe_location(fix.as_ref()))]),
            _ => (state, Vec::new()),
        },
    }
}

/// Owns the current state and the update request used on every connect.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    request: LocationRequest,
}

impl ConnectionMachine {
    pub fn new(request: LocationRequest) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            request,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn request(&self) -> &LocationRequest {
        &self.request
    }

    pub fn handle(&mut self, event: &ClientEvent) -> Vec<Effect> {
        let (next, effects) = transition(self.state, event, &self.request);
        if next != self.state {
            log::debug!(
                "connection {} -> {} on {:?}",
                self.state.as_str(),
                next.as_str(),
                event
            );
        }
        self.state = next;
        effects
    }
}
