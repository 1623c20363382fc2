//! # Paw Rescue WASM Application
//!
//! Browser bindings for the Paw Rescue client: the injury report screen
//! (camera, location, upload, submission) and the adoption and fundraising
//! listings.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web rescue-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { RescueApp, fetchPets } from './pkg/rescue_app.js';
//!
//! await init();
//! const app = new RescueApp('camera-preview');
//! await app.openCamera();
//! app.capturePhoto();
//! await app.fetchLocation();
//! app.setContactPhone('9876543210');
//! await app.submitReport();
//! render(JSON.parse(app.stateJson()));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod geolocation;
pub mod upload;

use std::{cell::RefCell, fmt::Display, rc::Rc};

use rescue_core::{
    CameraDevice, CampaignRepository, Listing, MockRescueApi, PetKind, PetQuery, PetRepository,
    PositionSource, ReportSession, ReportSubmitter, RescueConfig, ShelterDirectory,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

pub use camera::{WebCamera, WebStream};
pub use geolocation::BrowserGeolocation;
pub use upload::UploadError;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Paw Rescue WASM initialized");
}

fn js_error(error: impl Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_json::to_string(value)
        .map(|json| JsValue::from_str(&json))
        .map_err(js_error)
}

type SessionHandle = Rc<RefCell<ReportSession<WebStream>>>;

/// The injury report screen.
///
/// Every async method returns a `Promise`. The session is never borrowed
/// across an await, so UI events may arrive while a request is in flight;
/// late completions are discarded by the core state machines.
#[wasm_bindgen]
pub struct RescueApp {
    session: SessionHandle,
    camera: Rc<WebCamera>,
    positions: Rc<BrowserGeolocation>,
    api: Rc<MockRescueApi>,
}

#[wasm_bindgen]
impl RescueApp {
    /// Create a report screen previewing into the `<video>` with id `video_id`.
    ///
    /// `config_json` is an optional JSON `RescueConfig`; omitted fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `config_json` is malformed.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::needless_pass_by_value)] // wasm-bindgen has no Option<&str>
    pub fn new(video_id: &str, config_json: Option<String>) -> Result<RescueApp, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => {
                RescueConfig::from_json(json).map_err(js_error)?
            }
            _ => RescueConfig::default(),
        };
        Ok(Self {
            session: Rc::new(RefCell::new(ReportSession::new(&config))),
            camera: Rc::new(WebCamera::new(video_id)),
            positions: Rc::new(BrowserGeolocation),
            api: Rc::new(MockRescueApi::from_config(&config)),
        })
    }

    // ========================================================================
    // Camera
    // ========================================================================

    /// Request the camera and attach the preview.
    #[wasm_bindgen(js_name = openCamera)]
    #[must_use]
    pub fn open_camera(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let camera = Rc::clone(&self.camera);
        future_to_promise(async move {
            let ticket = session.borrow_mut().begin_camera().map_err(js_error)?;
            let constraints = session.borrow().camera().constraints().clone();
            let result = camera.acquire(&constraints).await;
            session
                .borrow_mut()
                .finish_camera(ticket, result)
                .map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Take the photo; returns its data URL.
    ///
    /// # Errors
    ///
    /// Returns an error unless the preview is live.
    #[wasm_bindgen(js_name = capturePhoto)]
    pub fn capture_photo(&self) -> Result<String, JsValue> {
        let image = self
            .session
            .borrow_mut()
            .capture_photo()
            .map_err(js_error)?;
        Ok(image.as_str().to_string())
    }

    /// Discard the photo and reopen the camera.
    #[wasm_bindgen(js_name = retakePhoto)]
    #[must_use]
    pub fn retake_photo(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let camera = Rc::clone(&self.camera);
        future_to_promise(async move {
            let ticket = session.borrow_mut().begin_retake().map_err(js_error)?;
            let constraints = session.borrow().camera().constraints().clone();
            let result = camera.acquire(&constraints).await;
            session
                .borrow_mut()
                .finish_camera(ticket, result)
                .map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Stop the camera.
    #[wasm_bindgen(js_name = closeCamera)]
    pub fn close_camera(&self) {
        self.session.borrow_mut().close_camera();
    }

    /// Tell the session the platform ended the camera track.
    #[wasm_bindgen(js_name = cameraStreamEnded)]
    pub fn camera_stream_ended(&self) {
        self.session.borrow_mut().camera_stream_ended();
    }

    // ========================================================================
    // Upload and Location
    // ========================================================================

    /// Attach a photo from a file input, releasing the camera.
    #[wasm_bindgen(js_name = uploadFile)]
    #[must_use]
    pub fn upload_file(&self, file: &web_sys::File) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let file = file.clone();
        future_to_promise(async move {
            let image = upload::read_image(&file).await.map_err(js_error)?;
            session.borrow_mut().upload_image(image);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Remove the photo.
    #[wasm_bindgen(js_name = clearImage)]
    pub fn clear_image(&self) {
        self.session.borrow_mut().clear_image();
    }

    /// Share the current position; resolves to `{latitude, longitude}` JSON.
    #[wasm_bindgen(js_name = fetchLocation)]
    #[must_use]
    pub fn fetch_location(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let positions = Rc::clone(&self.positions);
        future_to_promise(async move {
            let ticket = session
                .borrow_mut()
                .begin_location(positions.is_supported())
                .map_err(js_error)?;
            let options = session.borrow().geolocation().options().clone();
            let result = positions.current_position(&options).await;
            let coordinate = session
                .borrow_mut()
                .finish_location(ticket, result)
                .map_err(js_error)?;
            to_json(&coordinate)
        })
    }

    // ========================================================================
    // Form
    // ========================================================================

    /// Set the description.
    #[wasm_bindgen(js_name = setDescription)]
    pub fn set_description(&self, value: &str) {
        self.session.borrow_mut().set_description(value);
    }

    /// Set the reporter's name.
    #[wasm_bindgen(js_name = setContactName)]
    pub fn set_contact_name(&self, value: &str) {
        self.session.borrow_mut().set_contact_name(value);
    }

    /// Set the reporter's phone number.
    #[wasm_bindgen(js_name = setContactPhone)]
    pub fn set_contact_phone(&self, value: &str) {
        self.session.borrow_mut().set_contact_phone(value);
    }

    /// Validate and send the report; resolves to the receipt JSON.
    #[wasm_bindgen(js_name = submitReport)]
    #[must_use]
    pub fn submit_report(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let api = Rc::clone(&self.api);
        future_to_promise(async move {
            let ticket = session.borrow_mut().begin_submit().map_err(js_error)?;
            let result = api.submit_report(ticket.report()).await;
            let receipt = session
                .borrow_mut()
                .finish_submit(ticket, result)
                .map_err(js_error)?
                .clone();
            to_json(&receipt)
        })
    }

    /// Start a new report after success.
    ///
    /// # Errors
    ///
    /// Returns an error unless the last submission succeeded.
    pub fn reset(&self) -> Result<(), JsValue> {
        self.session.borrow_mut().reset().map_err(js_error)
    }

    /// Return to editing after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns an error unless the last submission failed.
    pub fn retry(&self) -> Result<(), JsValue> {
        self.session.borrow_mut().retry().map_err(js_error)
    }

    /// Release the camera and ignore every pending completion.
    pub fn dispose(&self) {
        self.session.borrow_mut().dispose();
    }

    /// Render state as JSON (see `ReportView`).
    #[wasm_bindgen(js_name = stateJson)]
    #[must_use]
    pub fn state_json(&self) -> String {
        serde_json::to_string(&self.session.borrow().view()).unwrap_or_default()
    }
}

// JS may free the object without calling `dispose()`; in-flight promises
// still hold the session and must find it disposed.
impl Drop for RescueApp {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.try_borrow_mut() {
            session.dispose();
        }
    }
}

// ============================================================================
// Listings
// ============================================================================

/// Pets open for adoption, filtered; resolves to `{success, data}` JSON.
///
/// `kind` is `all`, `dog` or `cat`.
#[wasm_bindgen(js_name = fetchPets)]
#[must_use]
pub fn fetch_pets(search: Option<String>, kind: Option<String>) -> js_sys::Promise {
    future_to_promise(async move {
        let kind: PetKind = kind.as_deref().unwrap_or_default().parse().map_err(js_error)?;
        let query = PetQuery::new(search.unwrap_or_default(), kind);
        let pets = MockRescueApi::default()
            .search_pets(&query)
            .await
            .map_err(js_error)?;
        to_json(&Listing::ok(pets))
    })
}

/// Running fundraising campaigns; resolves to `{success, data}` JSON.
#[wasm_bindgen(js_name = fetchCampaigns)]
#[must_use]
pub fn fetch_campaigns() -> js_sys::Promise {
    future_to_promise(async move {
        let campaigns = MockRescueApi::default()
            .campaigns()
            .await
            .map_err(js_error)?;
        to_json(&Listing::ok(campaigns))
    })
}

/// Partner shelters as `{success, data}` JSON.
#[wasm_bindgen(js_name = listShelters)]
#[must_use]
pub fn list_shelters() -> String {
    let api = MockRescueApi::default();
    serde_json::to_string(&Listing::ok(api.shelters().to_vec())).unwrap_or_default()
}

/// Format a rupee amount the way campaign cards show it ("₹32,450").
#[wasm_bindgen(js_name = formatRupees)]
#[must_use]
pub fn format_rupees(amount: f64) -> String {
    // Amounts arrive as JS numbers; negative or fractional input is clamped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = amount.max(0.0).round() as u64;
    rescue_core::catalog::format_rupees(whole)
}
