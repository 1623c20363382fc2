//! Injury Report Integration Tests
//!
//! Drives complete report screens against scripted collaborators:
//! - Camera capture, location and submission
//! - Permission failures and the upload fallback
//! - Completion ordering and stale completions
//! - Double submission and retry

mod common;

use std::time::Duration;

use common::{vizag, FakeCamera, FakePosition, FakeStream};
use rescue_core::{
    ApiConfig, CameraError, CameraState, CapturedImage, FormError, GeolocationError, ImageSource,
    InjuryReportFlow, MockRescueApi, NoticeVariant, RescueConfig, ReportSession,
    SubmissionStatus, ValidationError,
};

type Flow = InjuryReportFlow<FakeCamera, FakePosition, MockRescueApi>;

fn flow(camera: FakeCamera, position: FakePosition, api: ApiConfig) -> Flow {
    InjuryReportFlow::new(
        &RescueConfig::default(),
        camera,
        position,
        MockRescueApi::new(api),
    )
}

fn uploaded() -> CapturedImage {
    CapturedImage::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap()
}

// ============================================================================
// End-to-end Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_capture_locate_submit_and_reset() {
    let mut flow = flow(
        FakeCamera::granting(),
        FakePosition::at(vizag()),
        ApiConfig::default(),
    );

    flow.open_camera().await.unwrap();
    assert_eq!(flow.view().camera, CameraState::Active);
    assert!(flow.session().camera().stream().is_some());

    flow.capture_photo().unwrap();
    let view = flow.view();
    assert_eq!(view.camera, CameraState::Captured);
    assert!(view.has_image);
    assert_eq!(view.image_source, Some(ImageSource::Camera));

    let location = flow.fetch_location().await.unwrap();
    assert_eq!(location, vizag());
    assert_eq!(location.to_string(), "17.686800, 83.218500");

    flow.set_description("Dog with an injured leg near RK Beach");
    flow.set_contact_phone("9876543210");
    assert!(flow.view().can_submit);

    let start = tokio::time::Instant::now();
    let receipt = flow.submit().await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(receipt.shelters_notified, 3);

    let view = flow.view();
    assert_eq!(view.status, SubmissionStatus::Success);
    assert_eq!(view.shelters_notified, Some(3));
    let notice = view.notice.unwrap();
    assert_eq!(notice.title, "Report submitted successfully");
    assert_eq!(notice.variant, NoticeVariant::Default);

    flow.reset().unwrap();
    let view = flow.view();
    assert_eq!(view.status, SubmissionStatus::Idle);
    assert_eq!(view.camera, CameraState::Idle);
    assert!(!view.has_image);
    assert!(view.location.is_none());
    assert!(view.contact_phone.is_empty());
    assert!(flow.session().form().draft().is_empty());
}

#[tokio::test]
async fn test_permission_denied_falls_back_to_upload() {
    let mut flow = flow(
        FakeCamera::denying(),
        FakePosition::failing(GeolocationError::PermissionDenied),
        ApiConfig::instant(),
    );

    let err = flow.open_camera().await.unwrap_err();
    assert!(matches!(err, CameraError::DeviceUnavailable(_)));
    let view = flow.view();
    assert_eq!(view.camera, CameraState::Error);
    assert!(view
        .camera_error
        .unwrap()
        .contains("try uploading an image instead"));

    flow.upload_image(uploaded());
    let view = flow.view();
    assert!(view.has_image);
    assert_eq!(view.image_source, Some(ImageSource::Upload));
    assert_eq!(view.camera, CameraState::Idle);

    assert_eq!(
        flow.fetch_location().await,
        Err(GeolocationError::PermissionDenied)
    );
    assert_eq!(
        flow.view().location_error.as_deref(),
        Some("Please allow location access to help rescuers find the pet")
    );

    flow.set_contact_phone("9876543210");
    assert_eq!(
        flow.submit().await,
        Err(FormError::Validation(ValidationError::MissingLocation))
    );
    let view = flow.view();
    assert_eq!(view.status, SubmissionStatus::Idle);
    let notice = view.notice.unwrap();
    assert_eq!(notice.title, "Location required");
    assert_eq!(notice.variant, NoticeVariant::Destructive);
}

#[tokio::test]
async fn test_unsupported_geolocation_never_queries_platform() {
    let mut position = FakePosition::at(vizag());
    position.supported = false;
    let mut flow = flow(FakeCamera::granting(), position, ApiConfig::instant());

    assert_eq!(
        flow.fetch_location().await,
        Err(GeolocationError::CapabilityUnsupported)
    );
    let view = flow.view();
    assert!(!view.locating);
    assert_eq!(
        view.location_error.as_deref(),
        Some("Geolocation is not supported by your browser")
    );
}

#[tokio::test]
async fn test_failed_submission_keeps_draft_for_retry() {
    let mut flow = flow(
        FakeCamera::granting(),
        FakePosition::at(vizag()),
        ApiConfig {
            fail_reports: true,
            ..ApiConfig::instant()
        },
    );
    flow.upload_image(uploaded());
    flow.fetch_location().await.unwrap();
    flow.set_contact_phone("9876543210");

    assert!(matches!(flow.submit().await, Err(FormError::Submission(_))));
    let view = flow.view();
    assert_eq!(view.status, SubmissionStatus::Error);
    assert_eq!(view.notice.unwrap().title, "Error submitting report");

    assert!(matches!(
        flow.reset(),
        Err(FormError::InvalidTransition { action: "reset", .. })
    ));
    flow.retry().unwrap();
    let view = flow.view();
    assert_eq!(view.status, SubmissionStatus::Idle);
    assert!(view.has_image);
    assert_eq!(view.location, Some(vizag()));
    assert_eq!(view.contact_phone, "9876543210");
}

#[tokio::test(start_paused = true)]
async fn test_prepare_runs_camera_and_location_together() {
    let camera = FakeCamera {
        latency: Duration::from_millis(800),
        ..FakeCamera::granting()
    };
    let position = FakePosition {
        latency: Duration::from_millis(1000),
        ..FakePosition::at(vizag())
    };
    let mut flow = flow(camera, position, ApiConfig::instant());

    let start = tokio::time::Instant::now();
    let (camera, location) = flow.prepare().await;
    assert!(start.elapsed() < Duration::from_millis(1800));
    camera.unwrap();
    assert_eq!(location.unwrap(), vizag());

    let view = flow.view();
    assert_eq!(view.camera, CameraState::Active);
    assert_eq!(view.location, Some(vizag()));
}

#[tokio::test]
async fn test_prepare_reports_each_failure_independently() {
    let mut flow = flow(
        FakeCamera::denying(),
        FakePosition::at(vizag()),
        ApiConfig::instant(),
    );
    let (camera, location) = flow.prepare().await;
    assert!(camera.is_err());
    assert_eq!(location.unwrap(), vizag());
}

// ============================================================================
// Resource Release
// ============================================================================

#[tokio::test]
async fn test_upload_releases_live_camera() {
    let mut flow = flow(
        FakeCamera::granting(),
        FakePosition::at(vizag()),
        ApiConfig::instant(),
    );
    flow.open_camera().await.unwrap();
    assert!(flow.session().camera().has_stream());

    flow.upload_image(uploaded());
    assert!(!flow.session().camera().has_stream());
    assert_eq!(flow.view().camera, CameraState::Idle);
}

#[tokio::test]
async fn test_retake_reopens_and_clears_photo() {
    let mut flow = flow(
        FakeCamera::granting(),
        FakePosition::at(vizag()),
        ApiConfig::instant(),
    );
    flow.open_camera().await.unwrap();
    flow.capture_photo().unwrap();

    flow.retake_photo().await.unwrap();
    let view = flow.view();
    assert_eq!(view.camera, CameraState::Active);
    assert!(!view.has_image);
}

#[tokio::test]
async fn test_dispose_releases_camera_and_blocks_reopen() {
    let mut flow = flow(
        FakeCamera::granting(),
        FakePosition::at(vizag()),
        ApiConfig::instant(),
    );
    flow.open_camera().await.unwrap();
    flow.dispose();
    assert!(!flow.session().camera().has_stream());
    assert_eq!(flow.open_camera().await, Err(CameraError::Disposed));
}

#[test]
fn test_platform_ending_stream_is_reported() {
    let live = common::LiveCounter::default();
    let mut session: ReportSession<FakeStream> = ReportSession::default();
    let ticket = session.begin_camera().unwrap();
    let stream = FakeStream::start(&live);
    let ended = stream.end_handle();
    session.finish_camera(ticket, Ok(stream)).unwrap();

    ended.set(true);
    assert_eq!(session.capture_photo(), Err(CameraError::StreamEnded));
    assert_eq!(session.view().camera, CameraState::Error);
    assert_eq!(live.get(), 0);
}

// ============================================================================
// Ordering and Stale Completions
// ============================================================================

fn captured_and_located(location_first: bool) -> ReportSession<FakeStream> {
    let live = common::LiveCounter::default();
    let mut session = ReportSession::default();
    let camera = session.begin_camera().unwrap();
    let location = session.begin_location(true).unwrap();

    if location_first {
        session.finish_location(location, Ok(vizag())).unwrap();
        session.finish_camera(camera, Ok(FakeStream::start(&live))).unwrap();
    } else {
        session.finish_camera(camera, Ok(FakeStream::start(&live))).unwrap();
        session.finish_location(location, Ok(vizag())).unwrap();
    }
    session.capture_photo().unwrap();
    session
}

#[test]
fn test_completion_order_does_not_change_draft() {
    let a = captured_and_located(true);
    let b = captured_and_located(false);
    assert_eq!(a.form().draft(), b.form().draft());
    assert!(a.form().draft().location.is_some());
    assert!(a.form().draft().image.is_some());
}

#[test]
fn test_stale_location_is_ignored() {
    let mut session: ReportSession<FakeStream> = ReportSession::default();
    let first = session.begin_location(true).unwrap();
    let second = session.begin_location(true).unwrap();

    let elsewhere = rescue_core::Coordinate::new(12.9716, 77.5946).unwrap();
    assert_eq!(
        session.finish_location(first, Ok(elsewhere)),
        Err(GeolocationError::Superseded)
    );
    session.finish_location(second, Ok(vizag())).unwrap();
    assert_eq!(session.form().draft().location, Some(vizag()));
}

#[test]
fn test_double_submit_is_rejected() {
    let mut session: ReportSession<FakeStream> = ReportSession::default();
    session.upload_image(uploaded());
    let ticket = session.begin_location(true).unwrap();
    session.finish_location(ticket, Ok(vizag())).unwrap();
    session.set_contact_phone("9876543210");

    let _pending = session.begin_submit().unwrap();
    assert!(matches!(session.begin_submit(), Err(FormError::Busy)));
    assert!(!session.view().can_submit);
}

#[test]
fn test_submission_after_dispose_is_discarded() {
    let mut session: ReportSession<FakeStream> = ReportSession::default();
    session.upload_image(uploaded());
    let ticket = session.begin_location(true).unwrap();
    session.finish_location(ticket, Ok(vizag())).unwrap();
    session.set_contact_phone("9876543210");

    let pending = session.begin_submit().unwrap();
    session.dispose();
    let receipt = rescue_core::SubmissionReceipt {
        success: true,
        message: "Report submitted successfully".into(),
        shelters_notified: 3,
        report_id: uuid::Uuid::new_v4(),
    };
    assert_eq!(
        session.finish_submit(pending, Ok(receipt)),
        Err(FormError::Superseded)
    );
}

// ============================================================================
// Collaborator Calls
// ============================================================================

#[derive(Default)]
struct CountingSubmitter {
    calls: std::cell::Cell<usize>,
}

#[async_trait::async_trait(?Send)]
impl rescue_core::ReportSubmitter for CountingSubmitter {
    async fn submit_report(
        &self,
        _report: &rescue_core::InjuryReport,
    ) -> Result<rescue_core::SubmissionReceipt, rescue_core::SubmissionError> {
        self.calls.set(self.calls.get() + 1);
        Ok(rescue_core::SubmissionReceipt {
            success: true,
            message: "Report submitted successfully".into(),
            shelters_notified: 3,
            report_id: uuid::Uuid::new_v4(),
        })
    }
}

#[tokio::test]
async fn test_one_collaborator_call_per_submission() {
    let submitter = CountingSubmitter::default();
    let mut form = rescue_core::ReportForm::new();

    assert!(form.submit(&submitter).await.is_err());
    assert_eq!(submitter.calls.get(), 0);

    form.set_image(uploaded(), ImageSource::Upload);
    form.set_location(vizag());
    form.set_contact_phone("9876543210");
    form.submit(&submitter).await.unwrap();
    assert_eq!(submitter.calls.get(), 1);

    assert!(matches!(
        form.submit(&submitter).await,
        Err(FormError::InvalidTransition { action: "submit", .. })
    ));
    assert_eq!(submitter.calls.get(), 1);
}
