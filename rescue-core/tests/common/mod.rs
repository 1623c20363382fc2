//! Scripted collaborators for integration tests.
//!
//! Every fake stream decrements a shared live counter when stopped, so tests
//! can assert that no camera track is ever leaked.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use rescue_core::{
    delay, CameraDevice, CameraError, CameraResult, CapturedImage, CaptureConstraints, Coordinate,
    GeolocationError, MediaStream, PositionOptions, PositionSource,
};

/// Shared count of unstopped streams.
pub type LiveCounter = Rc<Cell<usize>>;

/// Coordinates used throughout the scenarios (Visakhapatnam).
pub fn vizag() -> Coordinate {
    Coordinate::new(17.6868, 83.2185).unwrap()
}

/// A stream that snapshots a tiny JPEG data URL.
#[derive(Debug)]
pub struct FakeStream {
    live: LiveCounter,
    stopped: bool,
    ended: Rc<Cell<bool>>,
}

impl FakeStream {
    /// Start a stream, counting it as live.
    pub fn start(live: &LiveCounter) -> Self {
        live.set(live.get() + 1);
        Self {
            live: Rc::clone(live),
            stopped: false,
            ended: Rc::new(Cell::new(false)),
        }
    }

    /// Handle that simulates the platform ending the track.
    pub fn end_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.ended)
    }
}

impl MediaStream for FakeStream {
    fn attach_preview(&mut self) -> CameraResult<()> {
        Ok(())
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        Some((1920, 1080))
    }

    fn snapshot(&self) -> CameraResult<CapturedImage> {
        CapturedImage::from_data_url("data:image/jpeg;base64,/9j/4AAQSkZJRg==")
            .map_err(|e| CameraError::Capture(e.to_string()))
    }

    fn is_live(&self) -> bool {
        !self.stopped && !self.ended.get()
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.set(self.live.get() - 1);
        }
    }
}

/// Camera device with scripted permission and latency.
#[derive(Debug, Default)]
pub struct FakeCamera {
    /// Unstopped streams.
    pub live: LiveCounter,
    /// Refuse every request.
    pub deny: bool,
    /// Time until the stream is delivered.
    pub latency: Duration,
    /// Number of acquire calls.
    pub requests: Cell<usize>,
}

impl FakeCamera {
    /// A camera that grants access immediately.
    pub fn granting() -> Self {
        Self::default()
    }

    /// A camera whose permission prompt is refused.
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    /// Streams not yet stopped.
    pub fn live_streams(&self) -> usize {
        self.live.get()
    }
}

#[async_trait(?Send)]
impl CameraDevice for FakeCamera {
    type Stream = FakeStream;

    async fn acquire(&self, _constraints: &CaptureConstraints) -> CameraResult<FakeStream> {
        self.requests.set(self.requests.get() + 1);
        delay::sleep(self.latency).await;
        if self.deny {
            Err(CameraError::DeviceUnavailable("NotAllowedError".into()))
        } else {
            Ok(FakeStream::start(&self.live))
        }
    }
}

/// Position source returning a fixed answer.
#[derive(Debug, Clone)]
pub struct FakePosition {
    /// The answer.
    pub result: Result<Coordinate, GeolocationError>,
    /// Time until the answer.
    pub latency: Duration,
    /// Whether the platform offers geolocation.
    pub supported: bool,
}

impl FakePosition {
    /// Always answers with `coordinate`.
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            result: Ok(coordinate),
            latency: Duration::ZERO,
            supported: true,
        }
    }

    /// Always fails with `error`.
    pub fn failing(error: GeolocationError) -> Self {
        Self {
            result: Err(error),
            latency: Duration::ZERO,
            supported: true,
        }
    }
}

#[async_trait(?Send)]
impl PositionSource for FakePosition {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        delay::sleep(self.latency).await;
        self.result
    }
}
