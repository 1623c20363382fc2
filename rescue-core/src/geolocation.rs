//! One-shot geolocation acquisition.
//!
//! [`GeolocationAcquirer`] issues a single high-accuracy position request per
//! fetch and keeps the last reading. Location and error are replaced together
//! so readers never observe a half-applied result.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, -90 to 90.
    pub latitude: f64,
    /// Longitude in degrees, -180 to 180.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError::PositionUnavailable`] if either value is
    /// outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeolocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeolocationError::PositionUnavailable);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Options for a position request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionOptions {
    /// Ask for GPS-grade accuracy.
    pub enable_high_accuracy: bool,
    /// Upper bound on the wait, in milliseconds.
    pub timeout_ms: u32,
    /// Oldest cached position accepted, in milliseconds. Zero forces a fresh fix.
    pub maximum_age_ms: u32,
}

impl PositionOptions {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }

    /// Maximum accepted age as a [`Duration`].
    #[must_use]
    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(u64::from(self.maximum_age_ms))
    }
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

/// Reasons a position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    /// The platform has no geolocation capability.
    #[error("Geolocation is not supported by your browser")]
    CapabilityUnsupported,
    /// The user refused location access.
    #[error("Please allow location access to help rescuers find the pet")]
    PermissionDenied,
    /// No fix could be obtained.
    #[error("Location information is unavailable")]
    PositionUnavailable,
    /// No fix within the configured timeout.
    #[error("The request to get location timed out")]
    Timeout,
    /// Anything else the platform reports.
    #[error("An unknown error occurred")]
    Unknown,
    /// A newer fetch or disposal superseded this completion.
    #[error("Location request was superseded")]
    Superseded,
}

impl GeolocationError {
    /// Map a W3C `GeolocationPositionError.code`.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

/// Platform position provider.
#[async_trait(?Send)]
pub trait PositionSource {
    /// Whether the platform offers geolocation at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Resolve the current position once.
    ///
    /// # Errors
    ///
    /// Returns the classified platform failure.
    async fn current_position(&self, options: &PositionOptions)
        -> Result<Coordinate, GeolocationError>;
}

/// Token identifying one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the ticket to finish_fetch"]
pub struct FetchTicket {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Reading {
    location: Option<Coordinate>,
    error: Option<GeolocationError>,
}

/// Keeps the latest position reading.
#[derive(Debug, Clone, Default)]
pub struct GeolocationAcquirer {
    options: PositionOptions,
    reading: Reading,
    pending: bool,
    epoch: u64,
    disposed: bool,
}

impl GeolocationAcquirer {
    /// Create an acquirer with the given request options.
    #[must_use]
    pub fn new(options: PositionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Start a fetch.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError::CapabilityUnsupported`] (recording it as
    /// the current error) when `supported` is false, and
    /// [`GeolocationError::Superseded`] after disposal.
    pub fn begin_fetch(&mut self, supported: bool) -> Result<FetchTicket, GeolocationError> {
        if self.disposed {
            return Err(GeolocationError::Superseded);
        }
        if !supported {
            self.reading = Reading {
                location: self.reading.location,
                error: Some(GeolocationError::CapabilityUnsupported),
            };
            return Err(GeolocationError::CapabilityUnsupported);
        }
        self.epoch += 1;
        self.pending = true;
        self.reading.error = None;
        tracing::debug!(epoch = self.epoch, "location requested");
        Ok(FetchTicket { epoch: self.epoch })
    }

    /// Apply the outcome of a fetch.
    ///
    /// Success replaces the location and clears the error; failure records
    /// the error and keeps the last known location.
    ///
    /// # Errors
    ///
    /// Returns the failure, or [`GeolocationError::Superseded`] if the ticket
    /// is stale (nothing is changed).
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Coordinate, GeolocationError>,
    ) -> Result<Coordinate, GeolocationError> {
        if self.disposed || ticket.epoch != self.epoch {
            tracing::debug!(ticket = ticket.epoch, current = self.epoch, "stale location discarded");
            return Err(GeolocationError::Superseded);
        }
        self.pending = false;
        match result {
            Ok(coordinate) => {
                self.reading = Reading {
                    location: Some(coordinate),
                    error: None,
                };
                tracing::info!(%coordinate, "location acquired");
                Ok(coordinate)
            }
            Err(error) => {
                self.reading = Reading {
                    location: self.reading.location,
                    error: Some(error),
                };
                tracing::warn!("location request failed: {error}");
                Err(error)
            }
        }
    }

    /// Fetch the current position from `source`.
    ///
    /// # Errors
    ///
    /// See [`GeolocationAcquirer::begin_fetch`] and [`GeolocationAcquirer::finish_fetch`].
    pub async fn fetch<P>(&mut self, source: &P) -> Result<Coordinate, GeolocationError>
    where
        P: PositionSource + ?Sized,
    {
        let ticket = self.begin_fetch(source.is_supported())?;
        let result = source.current_position(&self.options).await;
        self.finish_fetch(ticket, result)
    }

    /// Ignore every later completion.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.pending = false;
        self.epoch += 1;
    }

    /// Last known coordinate.
    #[must_use]
    pub fn location(&self) -> Option<Coordinate> {
        self.reading.location
    }

    /// Error from the most recent fetch.
    #[must_use]
    pub fn error(&self) -> Option<GeolocationError> {
        self.reading.error
    }

    /// Human-readable message for the most recent error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.reading.error.map(|e| e.to_string())
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Options used for every request.
    #[must_use]
    pub fn options(&self) -> &PositionOptions {
        &self.options
    }
}
