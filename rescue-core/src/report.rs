//! Injury report draft, validation and the submission state machine.
//!
//! ```text
//! Idle ──submit (valid)──▶ Submitting ──ok──▶ Success ──reset──▶ Idle (draft cleared)
//!   ▲                           │
//!   └────────retry──── Error ◀──┘ rejected
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::geolocation::Coordinate;
use crate::media::CapturedImage;
use crate::notice::Notice;

/// A required draft field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No photo was taken or uploaded.
    #[error("Please take or upload a photo of the injured pet")]
    MissingImage,
    /// No location was shared.
    #[error("Please share your location to help rescuers find the pet")]
    MissingLocation,
    /// The contact phone is blank.
    #[error("Please enter a phone number so rescuers can reach you")]
    MissingContactPhone,
}

impl ValidationError {
    /// Name of the offending field.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::MissingImage => "image",
            Self::MissingLocation => "location",
            Self::MissingContactPhone => "contactPhone",
        }
    }

    /// Short title for the notification.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::MissingImage => "Missing image",
            Self::MissingLocation => "Location required",
            Self::MissingContactPhone => "Phone number required",
        }
    }
}

/// The submission collaborator failed. Every variant is handled the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The service rejected the report.
    #[error("Report rejected: {0}")]
    Rejected(String),
    /// The service answered without a success flag.
    #[error("Failed to submit report")]
    Unsuccessful,
    /// The call itself failed.
    #[error("Report submission failed: {0}")]
    Transport(String),
}

/// Submission state machine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The draft is incomplete.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// A submission is already in flight.
    #[error("A report is already being submitted")]
    Busy,
    /// The operation is not valid in the current state.
    #[error("Cannot {action} while {from:?}")]
    InvalidTransition {
        /// State the form was in.
        from: SubmissionStatus,
        /// Operation that was attempted.
        action: &'static str,
    },
    /// The collaborator failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    /// The completion belongs to a submission that no longer applies.
    #[error("Submission was superseded")]
    Superseded,
}

/// Where the draft's photo came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Captured from the live camera.
    Camera,
    /// Picked from a file.
    Upload,
}

/// The in-progress report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDraft {
    /// Photo of the animal.
    pub image: Option<CapturedImage>,
    /// How the photo was obtained.
    pub image_source: Option<ImageSource>,
    /// Where the animal is.
    pub location: Option<Coordinate>,
    /// Free-text description of the animal and its condition.
    pub description: String,
    /// Reporter's name.
    pub contact_name: String,
    /// Reporter's phone number (required).
    pub contact_phone: String,
}

impl ReportDraft {
    /// Check required fields and build the outbound report.
    ///
    /// Fields are checked in order: image, location, contact phone.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<InjuryReport, ValidationError> {
        let image = self.image.clone().ok_or(ValidationError::MissingImage)?;
        let location = self.location.ok_or(ValidationError::MissingLocation)?;
        let contact_phone = self.contact_phone.trim();
        if contact_phone.is_empty() {
            return Err(ValidationError::MissingContactPhone);
        }
        Ok(InjuryReport {
            image,
            description: self.description.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            contact_phone: contact_phone.to_string(),
            location,
        })
    }

    /// Whether every required field is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Whether nothing has been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The validated report sent to the submission service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryReport {
    /// Encoded photo (data URL).
    pub image: CapturedImage,
    /// Description of the animal.
    pub description: String,
    /// Reporter's name.
    pub contact_name: String,
    /// Reporter's phone number.
    pub contact_phone: String,
    /// Where the animal is.
    pub location: Coordinate,
}

/// What the submission service returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Whether the report was accepted.
    pub success: bool,
    /// Service message.
    pub message: String,
    /// Number of shelters alerted.
    pub shelters_notified: u32,
    /// Reference for follow-up.
    pub report_id: Uuid,
}

/// Report submission collaborator.
#[async_trait(?Send)]
pub trait ReportSubmitter {
    /// Deliver a report.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] if the report could not be delivered.
    async fn submit_report(
        &self,
        report: &InjuryReport,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Submission lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Editing.
    #[default]
    Idle,
    /// Waiting for the service.
    Submitting,
    /// Accepted.
    Success,
    /// Failed; retry returns to editing.
    Error,
}

/// Token for one submission; carries the validated report.
#[derive(Debug, Clone)]
#[must_use = "pass the ticket to finish_submit"]
pub struct SubmitTicket {
    epoch: u64,
    report: InjuryReport,
}

impl SubmitTicket {
    /// The report to deliver.
    #[must_use]
    pub fn report(&self) -> &InjuryReport {
        &self.report
    }
}

/// Draft plus submission state machine.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    draft: ReportDraft,
    status: SubmissionStatus,
    receipt: Option<SubmissionReceipt>,
    last_error: Option<SubmissionError>,
    notice: Option<Notice>,
    epoch: u64,
    disposed: bool,
}

impl ReportForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft.
    #[must_use]
    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    /// Current state.
    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Receipt from the last successful submission.
    #[must_use]
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Error from the last failed submission.
    #[must_use]
    pub fn last_error(&self) -> Option<&SubmissionError> {
        self.last_error.as_ref()
    }

    /// The most recent notification.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the submit action should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.status == SubmissionStatus::Idle && self.draft.is_complete()
    }

    /// Set the photo.
    pub fn set_image(&mut self, image: CapturedImage, source: ImageSource) {
        self.draft.image = Some(image);
        self.draft.image_source = Some(source);
    }

    /// Remove the photo.
    pub fn clear_image(&mut self) {
        self.draft.image = None;
        self.draft.image_source = None;
    }

    /// Set the location.
    pub fn set_location(&mut self, location: Coordinate) {
        self.draft.location = Some(location);
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Set the reporter's name.
    pub fn set_contact_name(&mut self, name: impl Into<String>) {
        self.draft.contact_name = name.into();
    }

    /// Set the reporter's phone number.
    pub fn set_contact_phone(&mut self, phone: impl Into<String>) {
        self.draft.contact_phone = phone.into();
    }

    /// Validate the draft and enter `Submitting`.
    ///
    /// The state check and transition happen in one step, so a second call
    /// before [`ReportForm::finish_submit`] is always rejected.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Busy`] while submitting,
    /// [`FormError::InvalidTransition`] from `Success`/`Error`, or
    /// [`FormError::Validation`] (state stays `Idle`).
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, FormError> {
        match self.status {
            SubmissionStatus::Idle => {}
            SubmissionStatus::Submitting => return Err(FormError::Busy),
            from @ (SubmissionStatus::Success | SubmissionStatus::Error) => {
                return Err(FormError::InvalidTransition {
                    from,
                    action: "submit",
                })
            }
        }
        if self.disposed {
            return Err(FormError::Superseded);
        }

        let report = match self.draft.validate() {
            Ok(report) => report,
            Err(e) => {
                tracing::debug!(field = e.field(), "report validation failed");
                self.notice = Some(Notice::from(e));
                return Err(e.into());
            }
        };

        self.epoch += 1;
        self.status = SubmissionStatus::Submitting;
        self.last_error = None;
        tracing::info!(epoch = self.epoch, "submitting injury report");
        Ok(SubmitTicket {
            epoch: self.epoch,
            report,
        })
    }

    /// Apply the collaborator's answer.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Superseded`] for a stale ticket, or
    /// [`FormError::Submission`] when the service failed (state `Error`).
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<&SubmissionReceipt, FormError> {
        if self.disposed
            || ticket.epoch != self.epoch
            || self.status != SubmissionStatus::Submitting
        {
            return Err(FormError::Superseded);
        }

        match result.and_then(|receipt| {
            if receipt.success {
                Ok(receipt)
            } else {
                Err(SubmissionError::Unsuccessful)
            }
        }) {
            Ok(receipt) => {
                tracing::info!(
                    shelters = receipt.shelters_notified,
                    report_id = %receipt.report_id,
                    "injury report accepted"
                );
                self.status = SubmissionStatus::Success;
                self.notice = Some(Notice::report_submitted());
                Ok(&*self.receipt.insert(receipt))
            }
            Err(e) => {
                tracing::warn!("Error submitting report: {e}");
                self.status = SubmissionStatus::Error;
                self.notice = Some(Notice::report_failed());
                self.last_error = Some(e.clone());
                Err(e.into())
            }
        }
    }

    /// Validate, deliver through `submitter`, and apply the answer.
    ///
    /// # Errors
    ///
    /// See [`ReportForm::begin_submit`] and [`ReportForm::finish_submit`].
    pub async fn submit<S>(&mut self, submitter: &S) -> Result<&SubmissionReceipt, FormError>
    where
        S: ReportSubmitter + ?Sized,
    {
        let ticket = self.begin_submit()?;
        let result = submitter.submit_report(ticket.report()).await;
        self.finish_submit(ticket, result)
    }

    /// Acknowledge success and start a fresh draft.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidTransition`] unless in `Success`.
    pub fn reset(&mut self) -> Result<(), FormError> {
        if self.status != SubmissionStatus::Success {
            return Err(FormError::InvalidTransition {
                from: self.status,
                action: "reset",
            });
        }
        self.draft = ReportDraft::default();
        self.status = SubmissionStatus::Idle;
        self.receipt = None;
        self.notice = None;
        Ok(())
    }

    /// Leave `Error` and return to editing with the draft intact.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidTransition`] unless in `Error`.
    pub fn retry(&mut self) -> Result<(), FormError> {
        if self.status != SubmissionStatus::Error {
            return Err(FormError::InvalidTransition {
                from: self.status,
                action: "retry",
            });
        }
        self.status = SubmissionStatus::Idle;
        self.notice = None;
        Ok(())
    }

    /// Ignore any in-flight submission result.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.epoch += 1;
    }
}
