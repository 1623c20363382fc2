//! Transient user notifications (toasts).

use serde::{Deserialize, Serialize};

use crate::camera::CameraError;
use crate::report::ValidationError;

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    /// Informational or success.
    #[default]
    Default,
    /// Something needs the user's attention.
    Destructive,
}

/// A short message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Headline.
    pub title: String,
    /// Supporting text.
    pub description: String,
    /// Visual weight.
    pub variant: NoticeVariant,
}

impl Notice {
    /// Create an informational notice.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    /// Create a destructive notice.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    /// The report reached the shelters.
    #[must_use]
    pub fn report_submitted() -> Self {
        Self::info(
            "Report submitted successfully",
            "Nearby shelters have been notified and will respond soon",
        )
    }

    /// The report could not be delivered.
    #[must_use]
    pub fn report_failed() -> Self {
        Self::destructive("Error submitting report", "Please try again later")
    }
}

impl From<ValidationError> for Notice {
    fn from(error: ValidationError) -> Self {
        Self::destructive(error.title(), error.to_string())
    }
}

impl From<&CameraError> for Notice {
    fn from(error: &CameraError) -> Self {
        Self::destructive("Camera unavailable", error.user_message())
    }
}
