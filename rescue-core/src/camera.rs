//! Camera session management.
//!
//! A [`CameraSession`] owns at most one live [`MediaStream`] and drives the
//! capture lifecycle:
//!
//! ```text
//! Idle ──open──▶ Opening ──ok──▶ Active ──capture──▶ Captured
//!                   │                │                  │
//!                   └──fail──▶ Error ◀──stream ended─┘  retake
//!                                │                      │
//!                                └──────open────────────┴──▶ Opening
//! ```
//!
//! Opening is split in two phases ([`CameraSession::begin_open`] and
//! [`CameraSession::finish_open`]) so that hosts which cannot hold a mutable
//! borrow across an await point can still drive the session. A completion
//! carrying a superseded [`OpenTicket`] is discarded and its stream stopped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::CapturedImage;

/// Errors that can occur in camera operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// Permission was denied or no camera exists.
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The operation needs a live preview.
    #[error("Camera is not active (state: {0:?})")]
    NotActive(CameraState),

    /// The operation is not valid in the current state.
    #[error("Cannot {action} while camera is {from:?}")]
    InvalidTransition {
        /// State the session was in.
        from: CameraState,
        /// Operation that was attempted.
        action: &'static str,
    },

    /// The stream was stopped by the platform (device unplugged, permission revoked).
    #[error("Camera stream ended unexpectedly")]
    StreamEnded,

    /// Snapshotting or encoding the frame failed.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// A newer open or a close superseded this completion.
    #[error("Camera request was superseded")]
    Superseded,

    /// The session has been torn down.
    #[error("Camera session disposed")]
    Disposed,
}

impl CameraError {
    /// Message suitable for showing next to the camera preview.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DeviceUnavailable(_) | Self::StreamEnded => {
                "Unable to access camera. Please check your camera permissions or try uploading an image instead."
            }
            Self::Capture(_) => "Could not take the photo. Please try again.",
            Self::NotActive(_) | Self::InvalidTransition { .. } => {
                "The camera is not ready yet."
            }
            Self::Superseded | Self::Disposed => "The camera request was cancelled.",
        }
    }
}

/// Result type for camera operations.
pub type CameraResult<T> = Result<T, CameraError>;

/// Which physical sensor to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear-facing camera.
    #[default]
    Environment,
    /// Front-facing camera.
    User,
}

impl FacingMode {
    /// Constraint value understood by `getUserMedia`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::User => "user",
        }
    }
}

/// Constraints for acquiring a video stream. Resolution is a preference, not a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConstraints {
    /// Preferred sensor.
    pub facing_mode: FacingMode,
    /// Ideal frame width in pixels.
    pub ideal_width: u32,
    /// Ideal frame height in pixels.
    pub ideal_height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
        }
    }
}

/// A live video stream owned by a [`CameraSession`].
pub trait MediaStream {
    /// Attach the stream to a live preview surface.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nowhere to show the preview.
    fn attach_preview(&mut self) -> CameraResult<()>;

    /// Native dimensions of the current frame, once known.
    fn frame_size(&self) -> Option<(u32, u32)>;

    /// Rasterise the current frame at its native size and encode it.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Capture`] if no frame is available or encoding fails.
    fn snapshot(&self) -> CameraResult<CapturedImage>;

    /// Whether any track is still delivering frames.
    fn is_live(&self) -> bool;

    /// Stop every track. Must be idempotent.
    fn stop(&mut self);
}

/// Source of camera streams (the platform's media devices).
#[async_trait(?Send)]
pub trait CameraDevice {
    /// Stream type produced by this device.
    type Stream: MediaStream;

    /// Request a video stream.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::DeviceUnavailable`] when permission is denied
    /// or no device exists.
    async fn acquire(&self, constraints: &CaptureConstraints) -> CameraResult<Self::Stream>;
}

/// Lifecycle state of a camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraState {
    /// No stream, no image.
    Idle,
    /// Waiting for the platform to grant a stream.
    Opening,
    /// Live preview attached.
    Active,
    /// Stream released, a still is held.
    Captured,
    /// Opening failed or the stream ended; retry by opening again.
    Error,
}

/// Token identifying one open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the ticket to finish_open"]
pub struct OpenTicket {
    epoch: u64,
}

/// Owns the camera stream and the still captured from it.
#[derive(Debug)]
pub struct CameraSession<S: MediaStream> {
    constraints: CaptureConstraints,
    state: CameraState,
    stream: Option<S>,
    image: Option<CapturedImage>,
    last_error: Option<CameraError>,
    epoch: u64,
    disposed: bool,
}

impl<S: MediaStream> CameraSession<S> {
    /// Create an idle session with the given constraints.
    #[must_use]
    pub fn new(constraints: CaptureConstraints) -> Self {
        Self {
            constraints,
            state: CameraState::Idle,
            stream: None,
            image: None,
            last_error: None,
            epoch: 0,
            disposed: false,
        }
    }

    /// Start an open request.
    ///
    /// Any live stream is stopped first and any held still is discarded, so
    /// two streams can never be live at once.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Disposed`] after [`CameraSession::dispose`].
    pub fn begin_open(&mut self) -> CameraResult<OpenTicket> {
        if self.disposed {
            return Err(CameraError::Disposed);
        }
        self.release_stream();
        self.image = None;
        self.last_error = None;
        self.epoch += 1;
        self.state = CameraState::Opening;
        tracing::debug!(epoch = self.epoch, "camera open requested");
        Ok(OpenTicket { epoch: self.epoch })
    }

    /// Apply the outcome of an open request.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Superseded`] (stopping the delivered stream) if
    /// the ticket is stale or the session was disposed, the device error if
    /// acquisition failed, or the preview error if attaching failed.
    pub fn finish_open(
        &mut self,
        ticket: OpenTicket,
        result: CameraResult<S>,
    ) -> CameraResult<()> {
        if self.disposed || ticket.epoch != self.epoch || self.state != CameraState::Opening {
            if let Ok(mut stream) = result {
                stream.stop();
            }
            tracing::debug!(ticket = ticket.epoch, current = self.epoch, "stale camera completion discarded");
            return Err(CameraError::Superseded);
        }

        let outcome = result.and_then(|mut stream| match stream.attach_preview() {
            Ok(()) => Ok(stream),
            Err(e) => {
                stream.stop();
                Err(e)
            }
        });

        match outcome {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = CameraState::Active;
                tracing::info!("camera preview active");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Error accessing camera: {e}");
                self.state = CameraState::Error;
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Open a stream from `device` and attach the preview.
    ///
    /// # Errors
    ///
    /// See [`CameraSession::begin_open`] and [`CameraSession::finish_open`].
    pub async fn open<D>(&mut self, device: &D) -> CameraResult<()>
    where
        D: CameraDevice<Stream = S> + ?Sized,
    {
        let ticket = self.begin_open()?;
        let result = device.acquire(&self.constraints).await;
        self.finish_open(ticket, result)
    }

    /// Take a still from the live preview and release the stream.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::NotActive`] outside `Active` (no side effects),
    /// [`CameraError::StreamEnded`] if the platform stopped the stream, or
    /// [`CameraError::Capture`] if the snapshot failed (the preview stays live).
    pub fn capture(&mut self) -> CameraResult<CapturedImage> {
        if self.state != CameraState::Active {
            return Err(CameraError::NotActive(self.state));
        }
        let Some(stream) = self.stream.as_ref() else {
            return Err(CameraError::NotActive(self.state));
        };
        if !stream.is_live() {
            self.stream_ended();
            return Err(CameraError::StreamEnded);
        }

        let image = stream.snapshot()?;
        self.release_stream();
        self.image = Some(image.clone());
        self.state = CameraState::Captured;
        tracing::info!(bytes = image.len(), "photo captured, camera released");
        Ok(image)
    }

    /// Discard the held still and open again.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::InvalidTransition`] unless a still is held.
    pub fn begin_retake(&mut self) -> CameraResult<OpenTicket> {
        if self.state != CameraState::Captured {
            return Err(CameraError::InvalidTransition {
                from: self.state,
                action: "retake",
            });
        }
        self.begin_open()
    }

    /// Discard the held still and reopen the camera from `device`.
    ///
    /// # Errors
    ///
    /// See [`CameraSession::begin_retake`] and [`CameraSession::finish_open`].
    pub async fn retake<D>(&mut self, device: &D) -> CameraResult<()>
    where
        D: CameraDevice<Stream = S> + ?Sized,
    {
        let ticket = self.begin_retake()?;
        let result = device.acquire(&self.constraints).await;
        self.finish_open(ticket, result)
    }

    /// Stop the stream if present and cancel any pending open. Idempotent.
    pub fn close(&mut self) {
        self.release_stream();
        self.epoch += 1;
        self.state = if self.image.is_some() {
            CameraState::Captured
        } else {
            CameraState::Idle
        };
    }

    /// Forget the held still without touching the device.
    pub fn discard_image(&mut self) {
        self.image = None;
        if self.state == CameraState::Captured {
            self.state = CameraState::Idle;
        }
    }

    /// The platform stopped the stream underneath us.
    pub fn stream_ended(&mut self) {
        if self.state != CameraState::Active {
            return;
        }
        tracing::warn!("camera stream ended externally");
        self.release_stream();
        self.state = CameraState::Error;
        self.last_error = Some(CameraError::StreamEnded);
    }

    /// Tear the session down. Later completions are discarded.
    pub fn dispose(&mut self) {
        self.close();
        self.disposed = true;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Whether the live preview is attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == CameraState::Active
    }

    /// Whether a stream handle is currently retained.
    #[must_use]
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// The still from the last capture.
    #[must_use]
    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    /// The error that put the session in `Error`.
    #[must_use]
    pub fn last_error(&self) -> Option<&CameraError> {
        self.last_error.as_ref()
    }

    /// Constraints used for every open.
    #[must_use]
    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }

    /// The live stream, for hosts that render the preview themselves.
    #[must_use]
    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("camera stream released");
        }
    }
}

impl<S: MediaStream> Default for CameraSession<S> {
    fn default() -> Self {
        Self::new(CaptureConstraints::default())
    }
}

impl<S: MediaStream> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.release_stream();
    }
}
