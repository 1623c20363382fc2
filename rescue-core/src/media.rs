//! Captured images and raw video frames.
//!
//! A [`CapturedImage`] is the encoded still produced by a camera snapshot or a
//! file upload. It is carried as a `data:` URL so it can cross the browser
//! boundary unchanged and be posted as-is to the report collaborator.

use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default JPEG quality used when encoding raw frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur while handling media.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The value is not a `data:image/...` URL.
    #[error("Invalid image data URL: {0}")]
    InvalidDataUrl(String),

    /// The frame data has invalid dimensions or size.
    #[error("Invalid video frame data: expected {expected} bytes, got {actual}")]
    InvalidFrame {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// The bytes are not an image format we accept.
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// Encoding or decoding failed.
    #[error("Image encoding failed: {0}")]
    Encode(String),
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Image formats accepted for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG (lossy, no alpha). Camera snapshots always use this.
    Jpeg,
    /// PNG with alpha support.
    Png,
    /// GIF.
    Gif,
    /// WebP.
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/gif" => Self::Gif,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type for this format.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// An encoded still image, stored as a base64 `data:` URL.
///
/// Construction validates the URL shape only; the payload is decoded lazily
/// by [`CapturedImage::decode`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapturedImage(String);

impl CapturedImage {
    /// Wrap an existing `data:image/...` URL.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::InvalidDataUrl`] if the value is not an image
    /// data URL or carries no payload.
    pub fn from_data_url(url: impl Into<String>) -> MediaResult<Self> {
        let url = url.into();
        let (metadata, payload) = split_data_url(&url)?;
        if !metadata.starts_with("image/") {
            return Err(MediaError::InvalidDataUrl(format!(
                "not an image type: {metadata}"
            )));
        }
        if payload.is_empty() {
            return Err(MediaError::InvalidDataUrl("empty payload".to_string()));
        }
        Ok(Self(url))
    }

    /// Accept a data URL read from a user-chosen file.
    ///
    /// Files the browser could not type arrive as
    /// `application/octet-stream`; their payload is sniffed and relabelled
    /// when it is a recognised image.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::InvalidDataUrl`] for a malformed URL or payload,
    /// or [`MediaError::UnsupportedFormat`] when untyped bytes are not an
    /// image.
    pub fn from_uploaded_data_url(url: impl Into<String>) -> MediaResult<Self> {
        let url = url.into();
        let (metadata, payload) = split_data_url(&url)?;
        if metadata.starts_with("image/") {
            return Self::from_data_url(url);
        }
        if !metadata.ends_with(";base64") {
            return Err(MediaError::InvalidDataUrl(format!(
                "not an image type: {metadata}"
            )));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| MediaError::InvalidDataUrl(format!("Failed to decode base64: {e}")))?;
        Self::from_image_bytes(&bytes)
    }

    /// Encode raw image bytes (an uploaded file) into a data URL.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::UnsupportedFormat`] if the bytes are not a
    /// recognised image.
    pub fn from_image_bytes(bytes: &[u8]) -> MediaResult<Self> {
        let format = ImageFormat::from_magic_bytes(bytes);
        if format == ImageFormat::Unknown {
            return Err(MediaError::UnsupportedFormat);
        }
        Ok(Self::from_encoded(format, bytes))
    }

    /// Build a data URL from already-encoded bytes of a known format.
    #[must_use]
    pub fn from_encoded(format: ImageFormat, bytes: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{};base64,{payload}", format.mime()))
    }

    /// The full data URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The MIME type declared in the data URL.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        split_data_url(&self.0)
            .map(|(metadata, _)| metadata.split(';').next().unwrap_or_default())
            .unwrap_or_default()
    }

    /// The image format declared in the data URL.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_mime(self.mime_type())
    }

    /// Decode the base64 payload.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::InvalidDataUrl`] if the payload is not valid
    /// base64.
    pub fn decode(&self) -> MediaResult<Vec<u8>> {
        let (metadata, payload) = split_data_url(&self.0)?;
        if !metadata.contains(";base64") {
            return Err(MediaError::InvalidDataUrl(
                "payload is not base64 encoded".to_string(),
            ));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| MediaError::InvalidDataUrl(format!("Failed to decode base64: {e}")))
    }

    /// Length of the data URL in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a captured image cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CapturedImage {
    // Data URLs run to megabytes; keep logs readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("mime", &self.mime_type())
            .field("len", &self.0.len())
            .finish()
    }
}

impl TryFrom<String> for CapturedImage {
    type Error = MediaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(value)
    }
}

impl From<CapturedImage> for String {
    fn from(image: CapturedImage) -> Self {
        image.0
    }
}

fn split_data_url(url: &str) -> MediaResult<(&str, &str)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidDataUrl("Not a data URL".to_string()))?;
    rest.split_once(',')
        .ok_or_else(|| MediaError::InvalidDataUrl("Invalid data URL: missing comma".to_string()))
}

/// Raw video frame in RGBA format at the stream's native size.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Width of the frame in pixels.
    pub width: u32,
    /// Height of the frame in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, row-major order).
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Create a new video frame from RGBA data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data length doesn't match width * height * 4.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> MediaResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected || expected == 0 {
            return Err(MediaError::InvalidFrame {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a frame filled with a single colour.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgba.repeat(pixel_count),
        }
    }

    /// Encode this frame as a JPEG still at its native dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Encode`] if the encoder rejects the frame.
    #[cfg(feature = "images")]
    pub fn encode_jpeg(&self, quality: u8) -> MediaResult<CapturedImage> {
        use image::codecs::jpeg::JpegEncoder;
        use image::{ExtendedColorType, ImageEncoder};

        // JPEG has no alpha channel
        let rgb: Vec<u8> = self
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .write_image(&rgb, self.width, self.height, ExtendedColorType::Rgb8)
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        Ok(CapturedImage::from_encoded(ImageFormat::Jpeg, &bytes))
    }

    /// Decode an image file into an RGBA frame.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Encode`] if the bytes cannot be decoded.
    #[cfg(feature = "images")]
    pub fn decode(bytes: &[u8]) -> MediaResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| MediaError::Encode(format!("Failed to decode image: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"hi"), ImageFormat::Unknown);
    }

    #[test]
    fn accepts_short_jpeg_data_url() {
        let image = CapturedImage::from_data_url("data:image/jpeg;base64,AAA").unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.format(), ImageFormat::Jpeg);
        assert!(!image.is_empty());
    }

    #[test]
    fn rejects_non_image_urls() {
        assert!(CapturedImage::from_data_url("https://example.org/a.jpg").is_err());
        assert!(CapturedImage::from_data_url("data:text/plain;base64,AAAA").is_err());
        assert!(CapturedImage::from_data_url("data:image/png;base64,").is_err());
        assert!(CapturedImage::from_data_url("data:image/png").is_err());
    }

    #[test]
    fn uploaded_bytes_become_data_url() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let image = CapturedImage::from_image_bytes(&bytes).unwrap();
        assert!(image.as_str().starts_with("data:image/jpeg;base64,"));
        assert_eq!(image.decode().unwrap(), bytes);

        assert_eq!(
            CapturedImage::from_image_bytes(b"plain text"),
            Err(MediaError::UnsupportedFormat)
        );
    }

    #[test]
    fn untyped_upload_is_sniffed() {
        let bytes = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        let url = format!("data:application/octet-stream;base64,{payload}");

        assert!(CapturedImage::from_data_url(url.as_str()).is_err());
        let image = CapturedImage::from_uploaded_data_url(url).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.decode().unwrap(), bytes);
    }

    #[test]
    fn untyped_upload_rejects_non_images() {
        let payload = base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.7 report");
        assert_eq!(
            CapturedImage::from_uploaded_data_url(format!(
                "data:application/octet-stream;base64,{payload}"
            )),
            Err(MediaError::UnsupportedFormat)
        );
        assert!(CapturedImage::from_uploaded_data_url("data:application/octet-stream,%FF").is_err());
        assert!(CapturedImage::from_uploaded_data_url("data:image/jpeg;base64,").is_err());
    }

    #[test]
    fn typed_upload_passes_through() {
        let image = CapturedImage::from_uploaded_data_url("data:image/jpeg;base64,AAA").unwrap();
        assert_eq!(image.as_str(), "data:image/jpeg;base64,AAA");
    }

    #[test]
    fn serializes_as_plain_string() {
        let image = CapturedImage::from_data_url("data:image/jpeg;base64,AAA").unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"data:image/jpeg;base64,AAA\"");

        let bad: Result<CapturedImage, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn debug_output_omits_payload() {
        let image = CapturedImage::from_data_url("data:image/jpeg;base64,SECRET").unwrap();
        let debug = format!("{image:?}");
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("image/jpeg"));
    }

    #[test]
    fn video_frame_validates_length() {
        assert!(VideoFrame::new(4, 4, vec![0; 64]).is_ok());
        match VideoFrame::new(4, 4, vec![0; 10]) {
            Err(MediaError::InvalidFrame { expected, actual }) => {
                assert_eq!(expected, 64);
                assert_eq!(actual, 10);
            }
            other => panic!("Expected InvalidFrame error, got {other:?}"),
        }
    }

    #[cfg(feature = "images")]
    #[test]
    fn jpeg_encoding_keeps_native_dimensions() {
        let frame = VideoFrame::solid(64, 48, [200, 40, 40, 255]);
        let image = frame.encode_jpeg(DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(image.format(), ImageFormat::Jpeg);

        let decoded = VideoFrame::decode(&image.decode().unwrap()).unwrap();
        assert_eq!((decoded.width, decoded.height), (64, 48));
    }

    #[cfg(feature = "images")]
    #[test]
    fn untyped_jpeg_upload_is_accepted() {
        let jpeg = VideoFrame::solid(4, 4, [10, 20, 30, 255])
            .encode_jpeg(90)
            .unwrap()
            .decode()
            .unwrap();
        let payload = base64::engine::general_purpose::STANDARD.encode(&jpeg);
        let image = CapturedImage::from_uploaded_data_url(format!(
            "data:application/octet-stream;base64,{payload}"
        ))
        .unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.decode().unwrap(), jpeg);
    }
}
