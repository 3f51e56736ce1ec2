use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_FASTEST_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    HighAccuracy,
    BalancedPowerAccuracy,
    LowPower,
    NoPower,
}

impl Priority {
    /// Numeric value used by the platform location API.
    pub fn code(self) -> i32 {
        match self {
            Self::HighAccuracy => 100,
            Self::BalancedPowerAccuracy => 102,
            Self::LowPower => 104,
            Self::NoPower => 105,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighAccuracy => "high",
            Self::BalancedPowerAccuracy => "balanced",
            Self::LowPower => "low",
            Self::NoPower => "none",
        }
    }
}

impl FromStr for Priority {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" | "high_accuracy" => Ok(Self::HighAccuracy),
            "balanced" | "balanced_power_accuracy" => Ok(Self::BalancedPowerAccuracy),
            "low" | "low_power" => Ok(Self::LowPower),
            "none" | "no_power" => Ok(Self::NoPower),
            other => Err(RequestError::UnknownPriority(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("update interval must be non-zero")]
    ZeroInterval,

    #[error("fastest interval ({fastest_ms}ms) exceeds update interval ({interval_ms}ms)")]
    FastestExceedsInterval { fastest_ms: u64, interval_ms: u64 },

    #[error("unknown priority '{0}' (expected high|balanced|low|none)")]
    UnknownPriority(String),
}

/// Periodic update request handed to the provider once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub priority: Priority,
    pub interval: Duration,
    pub fastest_interval: Duration,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            priority: Priority::HighAccuracy,
            interval: DEFAULT_UPDATE_INTERVAL,
            fastest_interval: DEFAULT_FASTEST_INTERVAL,
        }
    }
}

impl LocationRequest {
    pub fn new(priority: Priority, interval: Duration, fastest_interval: Duration) -> Self {
        Self {
            priority,
            interval,
            fastest_interval,
        }
    }

    pub fn validate(self) -> Result<Self, RequestError> {
        if self.interval.is_zero() {
            return Err(RequestError::ZeroInterval);
        }
        if self.fastest_interval > self.interval {
            return Err(RequestError::FastestExceedsInterval {
                fastest_ms: self.fastest_interval.as_millis() as u64,
                interval_ms: self.interval.as_millis() as u64,
            });
        }
        Ok(self)
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }

    pub fn fastest_interval_ms(&self) -> u64 {
        self.fastest_interval.as_millis() as u64
    }
}
