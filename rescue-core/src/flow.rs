//! Async driver for a [`ReportSession`].
//!
//! [`InjuryReportFlow`] owns the platform collaborators and runs each
//! `begin_*`/`finish_*` pair across the await. Hosts that cannot hold the
//! session mutably across an await (the browser bindings) drive
//! [`ReportSession`] directly instead.

use crate::camera::{CameraDevice, CameraResult};
use crate::config::RescueConfig;
use crate::geolocation::{Coordinate, GeolocationError, PositionSource};
use crate::media::CapturedImage;
use crate::report::{FormError, ReportSubmitter, SubmissionReceipt};
use crate::session::{ReportSession, ReportView};

/// An injury report screen wired to its collaborators.
pub struct InjuryReportFlow<D, P, S>
where
    D: CameraDevice,
{
    session: ReportSession<D::Stream>,
    camera: D,
    positions: P,
    submitter: S,
}

impl<D, P, S> InjuryReportFlow<D, P, S>
where
    D: CameraDevice,
    P: PositionSource,
    S: ReportSubmitter,
{
    /// Wire a fresh session to its collaborators.
    #[must_use]
    pub fn new(config: &RescueConfig, camera: D, positions: P, submitter: S) -> Self {
        Self {
            session: ReportSession::new(config),
            camera,
            positions,
            submitter,
        }
    }

    /// Underlying session state.
    #[must_use]
    pub fn session(&self) -> &ReportSession<D::Stream> {
        &self.session
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> ReportView {
        self.session.view()
    }

    /// Open the camera preview.
    ///
    /// # Errors
    ///
    /// Returns the device or preview error; the session is left in `Error`.
    pub async fn open_camera(&mut self) -> CameraResult<()> {
        let ticket = self.session.begin_camera()?;
        let result = self
            .camera
            .acquire(self.session.camera().constraints())
            .await;
        self.session.finish_camera(ticket, result)
    }

    /// Request the camera and the position together.
    ///
    /// Both requests are in flight at once and each outcome is applied
    /// independently, so one failing never blocks the other.
    pub async fn prepare(&mut self) -> (CameraResult<()>, Result<Coordinate, GeolocationError>) {
        let camera_ticket = self.session.begin_camera();
        let location_ticket = self.session.begin_location(self.positions.is_supported());

        let constraints = self.session.camera().constraints().clone();
        let options = self.session.geolocation().options().clone();
        let (camera, positions) = (&self.camera, &self.positions);
        let acquire = async {
            match &camera_ticket {
                Ok(_) => camera.acquire(&constraints).await,
                Err(e) => Err(e.clone()),
            }
        };
        let locate = async {
            match location_ticket {
                Ok(_) => positions.current_position(&options).await,
                Err(e) => Err(e),
            }
        };
        let (stream, position) = futures::join!(acquire, locate);

        let camera = match camera_ticket {
            Ok(ticket) => self.session.finish_camera(ticket, stream),
            Err(e) => Err(e),
        };
        let location = match location_ticket {
            Ok(ticket) => self.session.finish_location(ticket, position),
            Err(e) => Err(e),
        };
        (camera, location)
    }

    /// Take the photo from the live preview.
    ///
    /// # Errors
    ///
    /// See [`ReportSession::capture_photo`].
    pub fn capture_photo(&mut self) -> CameraResult<CapturedImage> {
        self.session.capture_photo()
    }

    /// Discard the photo and reopen the camera.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CameraError::InvalidTransition`] without a photo, or
    /// the device error.
    pub async fn retake_photo(&mut self) -> CameraResult<()> {
        let ticket = self.session.begin_retake()?;
        let result = self
            .camera
            .acquire(self.session.camera().constraints())
            .await;
        self.session.finish_camera(ticket, result)
    }

    /// Stop the camera.
    pub fn close_camera(&mut self) {
        self.session.close_camera();
    }

    /// Attach an uploaded photo.
    pub fn upload_image(&mut self, image: CapturedImage) {
        self.session.upload_image(image);
    }

    /// Remove the photo.
    pub fn clear_image(&mut self) {
        self.session.clear_image();
    }

    /// Share the current position.
    ///
    /// # Errors
    ///
    /// Returns the classified platform failure.
    pub async fn fetch_location(&mut self) -> Result<Coordinate, GeolocationError> {
        let ticket = self.session.begin_location(self.positions.is_supported())?;
        let result = self
            .positions
            .current_position(self.session.geolocation().options())
            .await;
        self.session.finish_location(ticket, result)
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.session.set_description(description);
    }

    /// Set the reporter's name.
    pub fn set_contact_name(&mut self, name: impl Into<String>) {
        self.session.set_contact_name(name);
    }

    /// Set the reporter's phone number.
    pub fn set_contact_phone(&mut self, phone: impl Into<String>) {
        self.session.set_contact_phone(phone);
    }

    /// Validate and deliver the report.
    ///
    /// # Errors
    ///
    /// See [`ReportSession::begin_submit`] and [`ReportSession::finish_submit`].
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, FormError> {
        let ticket = self.session.begin_submit()?;
        let result = self.submitter.submit_report(ticket.report()).await;
        self.session.finish_submit(ticket, result).cloned()
    }

    /// Start a new report after success.
    ///
    /// # Errors
    ///
    /// See [`ReportSession::reset`].
    pub fn reset(&mut self) -> Result<(), FormError> {
        self.session.reset()
    }

    /// Return to editing after a failure.
    ///
    /// # Errors
    ///
    /// See [`ReportSession::retry`].
    pub fn retry(&mut self) -> Result<(), FormError> {
        self.session.retry()
    }

    /// Release the camera and ignore pending work.
    pub fn dispose(&mut self) {
        self.session.dispose();
    }
}
