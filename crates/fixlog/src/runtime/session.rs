use crate::runtime::telemetry;
use fixlog_core::{
    describe_location, ClientEvent, Clock, ConnectionMachine, ConnectionState, Effect,
    LocationProvider, LocationRequest, SharedEventLog,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Couples the connection state machine to a provider and the event log.
///
/// Effects are executed in order; anything that produces a follow-up event
/// (a resolution that cannot launch, for instance) is queued behind the
/// event being handled.
pub struct Session<P: LocationProvider, C: Clock> {
    log: SharedEventLog<C>,
    machine: ConnectionMachine,
    provider: P,
    queue: VecDeque<ClientEvent>,
}

impl<P: LocationProvider, C: Clock> Session<P, C> {
    pub fn new(log: SharedEventLog<C>, provider: P, request: LocationRequest) -> Self {
        Self {
            log,
            machine: ConnectionMachine::new(request),
            provider,
            queue: VecDeque::new(),
        }
    }

    pub fn resume(&mut self) {
        let availability = self.provider.availability();
        self.dispatch(ClientEvent::Resumed(availability));
    }

    pub fn pause(&mut self) {
        self.dispatch(ClientEvent::Paused);
    }

    /// Advance the provider by `dt_ms` and handle every callback it fired.
    pub fn tick(&mut self, dt_ms: u64) {
        for event in self.provider.advance(dt_ms) {
            self.dispatch(event);
        }
    }

    pub fn dispatch(&mut self, event: ClientEvent) {
        self.queue.push_back(event);
        while let Some(event) = self.queue.pop_front() {
            telemetry::observe_event(&event, self.machine.state());
            let before = self.machine.state();
            let effects = self.machine.handle(&event);
            let after = self.machine.state();
            if before != after {
                debug!(from = before.as_str(), to = after.as_str(), "Connection state changed");
                telemetry::observe_state(after);
            }
            for effect in effects {
                self.apply(effect);
            }
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Log(message) => self.log.append(message),
            Effect::Connect => {
                debug!("Connecting location client");
                self.provider.connect();
            }
            Effect::Disconnect => {
                info!("Disconnecting location client");
                self.provider.remove_updates();
                self.provider.disconnect();
            }
            Effect::ReportLastKnownLocation => {
                if let Some(fix) = self.provider.last_location() {
                    telemetry::observe_last_known(fix.accuracy_m);
                    self.log.append(describe_location(Some(&fix)));
                }
            }
            Effect::RequestUpdates(request) => {
                info!(
                    priority = request.priority.as_str(),
                    interval_ms = request.interval_ms(),
                    fastest_interval_ms = request.fastest_interval_ms(),
                    "Requesting location updates"
                );
                self.provider.request_updates(&request);
            }
            Effect::ShowErrorDialog(code) => {
                warn!(code = code.code(), "Location services error: {}", code.description());
            }
            Effect::StartResolution { request_code } => {
                telemetry::observe_resolution_started();
                if let Err(e) = self.provider.start_resolution(request_code) {
                    warn!(error = %e, request_code, "Resolution could not be started");
                    self.queue
                        .push_back(ClientEvent::ResolutionLaunchFailed(e.to_string()));
                }
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn log(&self) -> &SharedEventLog<C> {
        &self.log
    }
}
