use crate::connection::{Availability, ClientEvent};
use crate::location::Location;
use crate::request::LocationRequest;
use thiserror::Error;

#[derive(Clone, Default, Debug)]
pub struct ProviderStats {
    pub connect_attempts: u32,
    pub fixes_delivered: u64,
    pub suspensions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("resolution already in progress (request {0})")]
    AlreadyPending(i32),

    #[error("{0}")]
    LaunchFailed(String),
}

/// Seam between the session and a location service.
///
/// Calls that the platform answers asynchronously (`connect`,
/// `start_resolution`, periodic updates) report back through `advance`.
pub trait LocationProvider: Send {
    fn availability(&self) -> Availability;
    fn connect(&mut self);
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    fn last_location(&self) -> Option<Location>;
    fn request_updates(&mut self, request: &LocationRequest);
    fn remove_updates(&mut self);
    fn start_resolution(&mut self, request_code: i32) -> Result<(), ResolutionError>;
    /// Move time forward and collect callbacks that fired meanwhile.
    fn advance(&mut self, dt_ms: u64) -> Vec<ClientEvent>;
    fn stats(&self) -> ProviderStats;
}
