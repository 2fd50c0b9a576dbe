use log::{debug, error};
use reqwest::{Method, StatusCode};

use crate::util::error::DeviceError;

/// Receives notifications about every request a [`DeviceClient`] makes.
///
/// Paths are relative to the API root and never contain the auth token.
///
/// [`DeviceClient`]: crate::control_interface::DeviceClient
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, _method: &Method, _path: &str) {}
    fn on_response(&self, _method: &Method, _path: &str, _status: StatusCode, _body: &str) {}
    fn on_error(&self, _error: &DeviceError) {}
}

/// Forwards request activity to the `log` facade.
pub struct LogObserver;

impl RequestObserver for LogObserver {
    fn on_request(&self, method: &Method, path: &str) {
        debug!("{} {}", method, path);
    }

    fn on_response(&self, method: &Method, path: &str, status: StatusCode, body: &str) {
        if body.is_empty() {
            debug!("{} {} -> {}", method, path, status);
        } else {
            debug!("{} {} -> {}: {}", method, path, status, body);
        }
    }

    fn on_error(&self, error: &DeviceError) {
        error!("{}", error);
    }
}

/// Observer for when nothing should be reported.
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}
