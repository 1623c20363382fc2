//! Native stand-ins for the platform camera and position service.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use rescue_core::media::DEFAULT_JPEG_QUALITY;
use rescue_core::{
    CameraDevice, CameraError, CameraResult, CaptureConstraints, CapturedImage, Coordinate,
    GeolocationError, MediaStream, PositionOptions, PositionSource, VideoFrame,
};

/// A camera whose only frame is an image file.
#[derive(Debug, Clone)]
pub struct StillFileCamera {
    path: PathBuf,
}

impl StillFileCamera {
    /// Camera that "sees" the image at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait(?Send)]
impl CameraDevice for StillFileCamera {
    type Stream = StillFrameStream;

    async fn acquire(&self, constraints: &CaptureConstraints) -> CameraResult<StillFrameStream> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CameraError::DeviceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let frame = VideoFrame::decode(&bytes)
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            facing = constraints.facing_mode.as_str(),
            "still frame loaded"
        );
        Ok(StillFrameStream {
            frame,
            stopped: false,
        })
    }
}

/// A "stream" that always shows the same frame.
#[derive(Debug)]
pub struct StillFrameStream {
    frame: VideoFrame,
    stopped: bool,
}

impl MediaStream for StillFrameStream {
    fn attach_preview(&mut self) -> CameraResult<()> {
        tracing::info!("previewing {}x{} still", self.frame.width, self.frame.height);
        Ok(())
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        Some((self.frame.width, self.frame.height))
    }

    fn snapshot(&self) -> CameraResult<CapturedImage> {
        self.frame
            .encode_jpeg(DEFAULT_JPEG_QUALITY)
            .map_err(|e| CameraError::Capture(e.to_string()))
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Position source that answers with coordinates given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition {
    coordinate: Option<Coordinate>,
}

impl FixedPosition {
    /// Build from optional latitude and longitude.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are out of range.
    pub fn new(latitude: Option<f64>, longitude: Option<f64>) -> anyhow::Result<Self> {
        let coordinate = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(
                Coordinate::new(lat, lon)
                    .map_err(|_| anyhow::anyhow!("Coordinates out of range: {lat}, {lon}"))?,
            ),
            _ => None,
        };
        Ok(Self { coordinate })
    }
}

#[async_trait(?Send)]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        self.coordinate.ok_or(GeolocationError::PositionUnavailable)
    }
}

/// Read an image file as an uploaded photo.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a supported image.
pub async fn read_upload(path: &Path) -> anyhow::Result<CapturedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    CapturedImage::from_image_bytes(&bytes)
        .with_context(|| format!("{} is not a JPEG, PNG, GIF or WebP image", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_position_validates_range() {
        assert!(FixedPosition::new(Some(17.6868), Some(83.2185)).is_ok());
        assert!(FixedPosition::new(Some(123.0), Some(83.2185)).is_err());
    }

    #[tokio::test]
    async fn missing_coordinates_are_unavailable() {
        let source = FixedPosition::new(None, None).unwrap();
        assert_eq!(
            source.current_position(&PositionOptions::default()).await,
            Err(GeolocationError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn missing_photo_is_device_unavailable() {
        let camera = StillFileCamera::new("/nonexistent/stray.jpg");
        assert!(matches!(
            camera.acquire(&CaptureConstraints::default()).await,
            Err(CameraError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn still_stream_snapshots_jpeg() {
        let mut stream = StillFrameStream {
            frame: VideoFrame::solid(8, 6, [200, 120, 40, 255]),
            stopped: false,
        };
        stream.attach_preview().unwrap();
        assert_eq!(stream.frame_size(), Some((8, 6)));
        let image = stream.snapshot().unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        stream.stop();
        assert!(!stream.is_live());
    }
}
