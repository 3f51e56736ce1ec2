use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered in place of a fix the provider could not supply.
pub const UNKNOWN_LOCATION: &str = "Location[unknown]";

/// A single reported position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub provider: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in metres.
    pub accuracy_m: f32,
    /// Fix time, Unix milliseconds.
    pub time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing_deg: Option<f32>,
}

impl Location {
    pub fn new(provider: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            provider: provider.into(),
            latitude,
            longitude,
            accuracy_m: 0.0,
            time_ms: 0,
            altitude_m: None,
            speed_mps: None,
            bearing_deg: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f32) -> Self {
        self.accuracy_m = accuracy_m;
        self
    }

    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }

    pub fn with_motion(mut self, speed_mps: f32, bearing_deg: f32) -> Self {
        self.speed_mps = Some(speed_mps);
        self.bearing_deg = Some(bearing_deg);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location[{} {:.6},{:.6} acc={:.0} t={}",
            self.provider, self.latitude, self.longitude, self.accuracy_m, self.time_ms
        )?;
        if let Some(alt) = self.altitude_m {
            write!(f, " alt={alt:.1}")?;
        }
        if let Some(vel) = self.speed_mps {
            write!(f, " vel={vel:.1}")?;
        }
        if let Some(bear) = self.bearing_deg {
            write!(f, " bear={bear:.1}")?;
        }
        f.write_str("]")
    }
}

/// Log text for a fix that may be missing.
pub fn describe_location(location: Option<&Location>) -> String {
    match location {
        Some(location) => location.to_string(),
        None => UNKNOWN_LOCATION.to_string(),
    }
}
