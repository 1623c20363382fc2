//! Reading a user-chosen file into a data URL.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use rescue_core::{CapturedImage, MediaError};
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, File, FileReader};

use crate::camera::describe;

/// Errors that can occur while reading an uploaded file.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The chosen file is not an image.
    #[error("Please choose an image file (got {0})")]
    NotAnImage(String),

    /// The browser could not read the file.
    #[error("Could not read file: {0}")]
    Read(String),

    /// The file contents are not a usable image data URL.
    #[error(transparent)]
    Media(#[from] MediaError),
}

fn read_failed(value: JsValue) -> UploadError {
    UploadError::Read(describe(&value))
}

/// Whether a MIME type from a file input denotes an image.
///
/// Browsers report an empty type when they cannot tell; those files are
/// accepted and their bytes are checked for an image signature once read.
#[must_use]
pub fn is_acceptable_type(mime: &str) -> bool {
    mime.is_empty() || mime.starts_with("image/")
}

/// Read `file` as a base64 data URL.
///
/// # Errors
///
/// Returns [`UploadError`] if the file is not an image or cannot be read.
pub async fn read_image(file: &File) -> Result<CapturedImage, UploadError> {
    let mime = file.type_();
    if !is_acceptable_type(&mime) {
        return Err(UploadError::NotAnImage(mime));
    }

    let reader = FileReader::new().map_err(read_failed)?;
    let (tx, rx) = oneshot::channel::<bool>();
    let reply = Rc::new(RefCell::new(Some(tx)));

    let settle = |loaded: bool| {
        let reply = Rc::clone(&reply);
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            if let Some(tx) = reply.borrow_mut().take() {
                let _ = tx.send(loaded);
            }
        })
    };
    let on_load = settle(true);
    let on_error = settle(false);
    reader.set_onload(Some(on_load.as_ref().unchecked_ref()));
    reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    reader.read_as_data_url(file).map_err(read_failed)?;
    let loaded = rx.await.unwrap_or(false);
    reader.set_onload(None);
    reader.set_onerror(None);

    if !loaded {
        let reason = reader
            .error()
            .map_or_else(|| "unknown error".to_string(), |e| describe(&e.into()));
        return Err(UploadError::Read(reason));
    }

    let url = reader
        .result()
        .map_err(read_failed)?
        .as_string()
        .ok_or_else(|| UploadError::Read("Reader result is not text".into()))?;
    tracing::debug!(name = %file.name(), bytes = url.len(), "image file read");
    Ok(CapturedImage::from_uploaded_data_url(url)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images_and_unknown_types() {
        assert!(is_acceptable_type("image/jpeg"));
        assert!(is_acceptable_type("image/heic"));
        assert!(is_acceptable_type(""));
        assert!(!is_acceptable_type("application/pdf"));
        assert!(!is_acceptable_type("video/mp4"));
    }
}
