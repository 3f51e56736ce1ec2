pub mod connection;
pub mod event_log;
mod event_log_proptest;
pub mod location;
pub mod provider;
#[cfg(feature = "simulation")]
pub mod provider_sim;
pub mod request;
pub mod sync;
pub mod timebase;

pub use connection::{
    transition, Availability, ClientEvent, ConnectionMachine, ConnectionResult, ConnectionState,
    Effect, ErrorCode, SuspendCause,
};
pub use event_log::{EventLog, LogEntry, Notifier};
pub use location::{describe_location, Location, UNKNOWN_LOCATION};
pub use provider::{LocationProvider, ProviderStats, ResolutionError};
#[cfg(feature = "simulation")]
pub use provider_sim::{ResolutionOutcome, SimScenario, SimTrack, SimulatedProvider};
pub use request::{LocationRequest, Priority, RequestError};
pub use sync::SharedEventLog;
pub use timebase::{Clock, ManualClock, TimeBase};
