//! Injury report controller state.
//!
//! [`ReportSession`] aggregates the camera session, the geolocation acquirer
//! and the submission form, and keeps the draft in step with them. All
//! operations are synchronous; the asynchronous work (device acquisition,
//! position query, submission) happens between a `begin_*` and a `finish_*`
//! call so that hosts never need to hold the session borrowed while waiting.

use serde::Serialize;

use crate::camera::{CameraResult, CameraSession, CameraState, MediaStream, OpenTicket};
use crate::config::RescueConfig;
use crate::geolocation::{Coordinate, FetchTicket, GeolocationAcquirer, GeolocationError};
use crate::media::CapturedImage;
use crate::notice::Notice;
use crate::report::{
    FormError, ImageSource, ReportForm, SubmissionError, SubmissionReceipt, SubmissionStatus,
    SubmitTicket,
};

/// Serializable snapshot of the report screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    /// Submission state.
    pub status: SubmissionStatus,
    /// Camera state.
    pub camera: CameraState,
    /// Inline camera message when the camera failed.
    pub camera_error: Option<String>,
    /// Whether a photo is attached.
    pub has_image: bool,
    /// Where the photo came from.
    pub image_source: Option<ImageSource>,
    /// Shared location.
    pub location: Option<Coordinate>,
    /// Inline location message.
    pub location_error: Option<String>,
    /// Whether a location request is in flight.
    pub locating: bool,
    /// Description field.
    pub description: String,
    /// Name field.
    pub contact_name: String,
    /// Phone field.
    pub contact_phone: String,
    /// Whether the submit action is enabled.
    pub can_submit: bool,
    /// Shelters alerted by the last successful submission.
    pub shelters_notified: Option<u32>,
    /// Latest toast.
    pub notice: Option<Notice>,
}

/// State of one injury report screen.
#[derive(Debug)]
pub struct ReportSession<S: MediaStream> {
    camera: CameraSession<S>,
    geolocation: GeolocationAcquirer,
    form: ReportForm,
}

impl<S: MediaStream> ReportSession<S> {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: &RescueConfig) -> Self {
        Self {
            camera: CameraSession::new(config.camera.clone()),
            geolocation: GeolocationAcquirer::new(config.geolocation.clone()),
            form: ReportForm::new(),
        }
    }

    /// Camera session.
    #[must_use]
    pub fn camera(&self) -> &CameraSession<S> {
        &self.camera
    }

    /// Geolocation acquirer.
    #[must_use]
    pub fn geolocation(&self) -> &GeolocationAcquirer {
        &self.geolocation
    }

    /// Submission form.
    #[must_use]
    pub fn form(&self) -> &ReportForm {
        &self.form
    }

    /// Start opening the camera.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CameraError::Disposed`] after disposal.
    pub fn begin_camera(&mut self) -> CameraResult<OpenTicket> {
        self.camera.begin_open()
    }

    /// Apply a camera open outcome.
    ///
    /// # Errors
    ///
    /// See [`CameraSession::finish_open`].
    pub fn finish_camera(&mut self, ticket: OpenTicket, result: CameraResult<S>) -> CameraResult<()> {
        self.camera.finish_open(ticket, result)
    }

    /// Take the photo and attach it to the draft.
    ///
    /// # Errors
    ///
    /// See [`CameraSession::capture`].
    pub fn capture_photo(&mut self) -> CameraResult<CapturedImage> {
        let image = self.camera.capture()?;
        self.form.set_image(image.clone(), ImageSource::Camera);
        Ok(image)
    }

    /// Drop the photo and start reopening the camera.
    ///
    /// # Errors
    ///
    /// See [`CameraSession::begin_retake`].
    pub fn begin_retake(&mut self) -> CameraResult<OpenTicket> {
        let ticket = self.camera.begin_retake()?;
        self.form.clear_image();
        Ok(ticket)
    }

    /// Stop the camera.
    pub fn close_camera(&mut self) {
        self.camera.close();
    }

    /// The platform stopped the camera stream.
    pub fn camera_stream_ended(&mut self) {
        self.camera.stream_ended();
    }

    /// Attach an uploaded photo, releasing the camera if it was live.
    pub fn upload_image(&mut self, image: CapturedImage) {
        self.camera.close();
        self.camera.discard_image();
        self.form.set_image(image, ImageSource::Upload);
    }

    /// Remove the photo.
    pub fn clear_image(&mut self) {
        self.camera.discard_image();
        self.form.clear_image();
    }

    /// Start a location fetch.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError::CapabilityUnsupported`] when unsupported.
    pub fn begin_location(&mut self, supported: bool) -> Result<FetchTicket, GeolocationError> {
        self.geolocation.begin_fetch(supported)
    }

    /// Apply a location outcome, copying a fix into the draft.
    ///
    /// # Errors
    ///
    /// See [`GeolocationAcquirer::finish_fetch`].
    pub fn finish_location(
        &mut self,
        ticket: FetchTicket,
        result: Result<Coordinate, GeolocationError>,
    ) -> Result<Coordinate, GeolocationError> {
        let coordinate = self.geolocation.finish_fetch(ticket, result)?;
        self.form.set_location(coordinate);
        Ok(coordinate)
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.set_description(description);
    }

    /// Set the reporter's name.
    pub fn set_contact_name(&mut self, name: impl Into<String>) {
        self.form.set_contact_name(name);
    }

    /// Set the reporter's phone number.
    pub fn set_contact_phone(&mut self, phone: impl Into<String>) {
        self.form.set_contact_phone(phone);
    }

    /// Validate and enter `Submitting`.
    ///
    /// # Errors
    ///
    /// See [`ReportForm::begin_submit`].
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, FormError> {
        self.form.begin_submit()
    }

    /// Apply the submission outcome.
    ///
    /// # Errors
    ///
    /// See [`ReportForm::finish_submit`].
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<&SubmissionReceipt, FormError> {
        self.form.finish_submit(ticket, result)
    }

    /// Acknowledge success and start over.
    ///
    /// # Errors
    ///
    /// See [`ReportForm::reset`].
    pub fn reset(&mut self) -> Result<(), FormError> {
        self.form.reset()?;
        self.camera.close();
        self.camera.discard_image();
        Ok(())
    }

    /// Return to editing after a failed submission.
    ///
    /// # Errors
    ///
    /// See [`ReportForm::retry`].
    pub fn retry(&mut self) -> Result<(), FormError> {
        self.form.retry()
    }

    /// Tear down: release the camera and ignore every pending completion.
    pub fn dispose(&mut self) {
        self.camera.dispose();
        self.geolocation.dispose();
        self.form.dispose();
        tracing::debug!("report session disposed");
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> ReportView {
        let draft = self.form.draft();
        let camera_error = match self.camera.state() {
            CameraState::Error => self.camera.last_error().map(|e| e.user_message().to_string()),
            _ => None,
        };
        ReportView {
            status: self.form.status(),
            camera: self.camera.state(),
            camera_error,
            has_image: draft.image.is_some(),
            image_source: draft.image_source,
            location: draft.location,
            location_error: self.geolocation.error_message(),
            locating: self.geolocation.is_pending(),
            description: draft.description.clone(),
            contact_name: draft.contact_name.clone(),
            contact_phone: draft.contact_phone.clone(),
            can_submit: self.form.can_submit(),
            shelters_notified: self.form.receipt().map(|r| r.shelters_notified),
            notice: self.form.notice().cloned(),
        }
    }
}

impl<S: MediaStream> Default for ReportSession<S> {
    fn default() -> Self {
        Self::new(&RescueConfig::default())
    }
}
