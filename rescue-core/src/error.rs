//! Error types for rescue operations.

use thiserror::Error;

use crate::camera::CameraError;
use crate::catalog::CatalogError;
use crate::geolocation::GeolocationError;
use crate::media::MediaError;
use crate::notice::Notice;
use crate::report::{FormError, SubmissionError, ValidationError};

/// Result type for rescue operations.
pub type RescueResult<T> = Result<T, RescueError>;

/// Errors that can occur anywhere in the rescue client.
///
/// None of these are fatal; each maps to a message the user can act on.
#[derive(Debug, Error)]
pub enum RescueError {
    /// Camera permission or hardware problem.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Position could not be obtained.
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// A required draft field is missing.
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// The submission service failed.
    #[error("Submission failed: {0}")]
    SubmissionFailed(#[from] SubmissionError),

    /// The submission state machine refused the operation.
    #[error("{0}")]
    Form(FormError),

    /// Image data could not be handled.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Listing data could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Configuration or payload (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<FormError> for RescueError {
    fn from(error: FormError) -> Self {
        match error {
            FormError::Validation(e) => Self::ValidationFailed(e),
            FormError::Submission(e) => Self::SubmissionFailed(e),
            other => Self::Form(other),
        }
    }
}

impl RescueError {
    /// Notification describing this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Camera(e) => Notice::from(e),
            Self::Geolocation(e) => Notice::destructive("Location required", e.to_string()),
            Self::ValidationFailed(e) => Notice::from(*e),
            Self::SubmissionFailed(_) => Notice::report_failed(),
            Self::Form(e) => Notice::destructive("Please wait", e.to_string()),
            Self::Media(e) => Notice::destructive("Unsupported image", e.to_string()),
            Self::Catalog(e) => Notice::destructive("Could not load data", e.to_string()),
            Self::Serialization(e) => Notice::destructive("Something went wrong", e.to_string()),
        }
    }
}
