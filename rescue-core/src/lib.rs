//! # Paw Rescue Core
//!
//! Core logic for the Paw Rescue client: reporting injured animals with a
//! photo and location, browsing adoptable pets, and following fundraising
//! campaigns. Compiles natively and to WASM.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               rescue-core.wasm               │
//! ├──────────────────────────────────────────────┤
//! │  Report Session        │  Catalog            │
//! │  - Camera session      │  - Pets             │
//! │  - Geolocation         │  - Campaigns        │
//! │  - Submission form     │  - Shelters         │
//! ├──────────────────────────────────────────────┤
//! │  Collaborators: CameraDevice, PositionSource │
//! │  ReportSubmitter, PetRepository, ...         │
//! └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod delay;
pub mod error;
pub mod fixtures;
pub mod flow;
pub mod geolocation;
pub mod media;
pub mod notice;
pub mod report;
pub mod session;

pub use api::MockRescueApi;
pub use camera::{
    CameraDevice, CameraError, CameraResult, CameraSession, CameraState, CaptureConstraints,
    FacingMode, MediaStream, OpenTicket,
};
pub use catalog::{
    Campaign, CampaignRepository, CatalogError, CatalogResult, Listing, Pet, PetKind, PetQuery,
    PetRepository, Shelter, ShelterDirectory,
};
pub use config::{ApiConfig, RescueConfig};
pub use error::{RescueError, RescueResult};
pub use flow::InjuryReportFlow;
pub use geolocation::{
    Coordinate, FetchTicket, GeolocationAcquirer, GeolocationError, PositionOptions,
    PositionSource,
};
pub use media::{CapturedImage, ImageFormat, MediaError, VideoFrame};
pub use notice::{Notice, NoticeVariant};
pub use report::{
    FormError, ImageSource, InjuryReport, ReportDraft, ReportForm, ReportSubmitter,
    SubmissionError, SubmissionReceipt, SubmissionStatus, SubmitTicket, ValidationError,
};
pub use session::{ReportSession, ReportView};

/// Rescue core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
