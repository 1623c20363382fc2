//! `navigator.geolocation` as a [`PositionSource`].

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use rescue_core::{Coordinate, GeolocationError, PositionOptions, PositionSource};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Position, PositionError};

type Reply = Rc<RefCell<Option<oneshot::Sender<Result<Coordinate, GeolocationError>>>>>;

/// The browser's geolocation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocation;

impl BrowserGeolocation {
    fn platform() -> Option<web_sys::Geolocation> {
        web_sys::window()?.navigator().geolocation().ok()
    }
}

fn request_options(options: &PositionOptions) -> web_sys::PositionOptions {
    let request = web_sys::PositionOptions::new();
    request.set_enable_high_accuracy(options.enable_high_accuracy);
    request.set_timeout(options.timeout_ms);
    request.set_maximum_age(options.maximum_age_ms);
    request
}

fn send(reply: &Reply, result: Result<Coordinate, GeolocationError>) {
    if let Some(tx) = reply.borrow_mut().take() {
        let _ = tx.send(result);
    }
}

#[async_trait(?Send)]
impl PositionSource for BrowserGeolocation {
    fn is_supported(&self) -> bool {
        Self::platform().is_some()
    }

    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        let geolocation = Self::platform().ok_or(GeolocationError::CapabilityUnsupported)?;

        let (tx, rx) = oneshot::channel();
        let reply: Reply = Rc::new(RefCell::new(Some(tx)));

        let on_success = {
            let reply = Rc::clone(&reply);
            Closure::<dyn FnMut(Position)>::new(move |position: Position| {
                let coords = position.coords();
                send(&reply, Coordinate::new(coords.latitude(), coords.longitude()));
            })
        };
        let on_error = {
            let reply = Rc::clone(&reply);
            Closure::<dyn FnMut(PositionError)>::new(move |error: PositionError| {
                send(&reply, Err(GeolocationError::from_code(error.code())));
            })
        };

        geolocation
            .get_current_position_with_error_callback_and_options(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &request_options(options),
            )
            .map_err(|_| GeolocationError::Unknown)?;

        // Both callbacks stay alive until one of them has answered.
        let result = rx.await.unwrap_or(Err(GeolocationError::Unknown));
        drop((on_success, on_error));
        result
    }
}
