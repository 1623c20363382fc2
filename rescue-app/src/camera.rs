//! Browser camera: `getUserMedia`, a `<video>` preview and canvas snapshots.

use async_trait::async_trait;
use rescue_core::{
    CameraDevice, CameraError, CameraResult, CaptureConstraints, CapturedImage, MediaStream,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStreamConstraints,
    MediaStreamTrack, MediaStreamTrackState,
};

/// Encoding used for snapshots.
const SNAPSHOT_MIME: &str = "image/jpeg";

/// `getUserMedia` constraints: video only, ideal resolution, preferred lens.
#[must_use]
pub fn constraints_json(constraints: &CaptureConstraints) -> serde_json::Value {
    serde_json::json!({
        "audio": false,
        "video": {
            "facingMode": constraints.facing_mode.as_str(),
            "width": { "ideal": constraints.ideal_width },
            "height": { "ideal": constraints.ideal_height },
        }
    })
}

/// Best-effort description of a thrown JS value (`DOMException` name and message).
pub(crate) fn describe(value: &JsValue) -> String {
    let field = |name: &str| {
        js_sys::Reflect::get(value, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.is_empty())
    };
    match (field("name"), field("message")) {
        (Some(name), Some(message)) => format!("{name}: {message}"),
        (Some(text), None) | (None, Some(text)) => text,
        (None, None) => value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}

fn unavailable(value: JsValue) -> CameraError {
    CameraError::DeviceUnavailable(describe(&value))
}

fn capture_failed(value: JsValue) -> CameraError {
    CameraError::Capture(describe(&value))
}

/// The device camera, previewed into a `<video>` element.
#[derive(Debug, Clone)]
pub struct WebCamera {
    video_id: String,
}

impl WebCamera {
    /// Camera whose preview renders into the element with id `video_id`.
    #[must_use]
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
        }
    }
}

#[async_trait(?Send)]
impl CameraDevice for WebCamera {
    type Stream = WebStream;

    async fn acquire(&self, constraints: &CaptureConstraints) -> CameraResult<WebStream> {
        let window = web_sys::window()
            .ok_or_else(|| CameraError::DeviceUnavailable("No window object".into()))?;
        let devices = window.navigator().media_devices().map_err(unavailable)?;

        let request: MediaStreamConstraints =
            js_sys::JSON::parse(&constraints_json(constraints).to_string())
                .map_err(unavailable)?
                .unchecked_into();
        let promise = devices
            .get_user_media_with_constraints(&request)
            .map_err(unavailable)?;
        let stream: web_sys::MediaStream = JsFuture::from(promise)
            .await
            .map_err(unavailable)?
            .dyn_into()
            .map_err(unavailable)?;

        tracing::debug!(tracks = stream.get_tracks().length(), "camera stream granted");
        Ok(WebStream {
            stream,
            video_id: self.video_id.clone(),
            video: None,
            stopped: false,
        })
    }
}

/// A granted camera stream and the preview it is attached to.
#[derive(Debug)]
pub struct WebStream {
    stream: web_sys::MediaStream,
    video_id: String,
    video: Option<HtmlVideoElement>,
    stopped: bool,
}

impl WebStream {
    fn tracks(&self) -> impl Iterator<Item = MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|track| track.dyn_into::<MediaStreamTrack>().ok())
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn document() -> CameraResult<web_sys::Document> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| CameraError::Capture("No document object".into()))
    }
}

impl MediaStream for WebStream {
    fn attach_preview(&mut self) -> CameraResult<()> {
        let video = Self::document()?
            .get_element_by_id(&self.video_id)
            .and_then(|e| e.dyn_into::<HtmlVideoElement>().ok())
            .ok_or_else(|| {
                CameraError::DeviceUnavailable(format!(
                    "Video element '{}' not found",
                    self.video_id
                ))
            })?;
        video.set_autoplay(true);
        video.set_src_object(Some(&self.stream));
        // Autoplay covers browsers that reject an unprompted play().
        let _ = video.play();
        self.video = Some(video);
        Ok(())
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        let video = self.video.as_ref()?;
        let (width, height) = (video.video_width(), video.video_height());
        (width > 0 && height > 0).then_some((width, height))
    }

    fn snapshot(&self) -> CameraResult<CapturedImage> {
        let video = self
            .video
            .as_ref()
            .ok_or_else(|| CameraError::Capture("Preview not attached".into()))?;
        let (width, height) = self
            .frame_size()
            .ok_or_else(|| CameraError::Capture("No video frame yet".into()))?;

        let canvas: HtmlCanvasElement = Self::document()?
            .create_element("canvas")
            .map_err(capture_failed)?
            .dyn_into()
            .map_err(|_| CameraError::Capture("Element is not a canvas".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(capture_failed)?
            .ok_or_else(|| CameraError::Capture("2D context not available".into()))?
            .dyn_into()
            .map_err(|_| CameraError::Capture("Failed to cast to 2D context".into()))?;
        ctx.draw_image_with_html_video_element(video, 0.0, 0.0)
            .map_err(capture_failed)?;

        let url = canvas
            .to_data_url_with_type(SNAPSHOT_MIME)
            .map_err(capture_failed)?;
        CapturedImage::from_data_url(url).map_err(|e| CameraError::Capture(e.to_string()))
    }

    fn is_live(&self) -> bool {
        !self.stopped
            && self
                .tracks()
                .any(|track| track.ready_state() == MediaStreamTrackState::Live)
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        for track in self.tracks() {
            track.stop();
        }
        if let Some(video) = self.video.take() {
            video.set_src_object(None);
        }
        self.stopped = true;
    }
}

impl Drop for WebStream {
    fn drop(&mut self) {
        self.stop();
    }
}
