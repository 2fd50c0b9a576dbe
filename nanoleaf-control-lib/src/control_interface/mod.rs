use std::fmt;
use std::sync::Arc;

use log::debug;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::util::config::ConnectionConfig;
use crate::util::effect::parse_effect;
use crate::util::error::{DeviceError, Result};
use crate::util::observer::{LogObserver, RequestObserver};

pub mod info;
pub mod state;

#[cfg(test)]
mod mock_device;

pub use info::DeviceInfo;
pub use state::{DeviceState, RangedValue, StateUpdate, Switch, ValueUpdate};

use state::ColorModeResponse;

/// Client for a single device on the local network.
///
/// Every call is a fresh round trip; nothing read from the device is cached.
#[derive(Clone)]
pub struct DeviceClient {
    config: ConnectionConfig,
    client: Client,
    observer: Arc<dyn RequestObserver>,
}

impl fmt::Debug for DeviceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token stays out of debug output.
        f.debug_struct("DeviceClient")
            .field("base_url", &self.config.base_url())
            .field("has_token", &self.config.token.is_some())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

// Forwards requests and responses but swallows errors.
struct QuietErrors(Arc<dyn RequestObserver>);

impl RequestObserver for QuietErrors {
    fn on_request(&self, method: &Method, path: &str) {
        self.0.on_request(method, path);
    }

    fn on_response(&self, method: &Method, path: &str, status: StatusCode, body: &str) {
        self.0.on_response(method, path, status, body);
    }
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    auth_token: String,
}

impl DeviceClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DeviceError::Client)?;

        Ok(DeviceClient {
            config,
            client,
            observer: Arc::new(LogObserver),
        })
    }

    /// Replaces the default [`LogObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn token(&self) -> Option<&str> {
        self.config.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.config.token = token;
    }

    /// Returns true if the device answers the info endpoint.
    ///
    /// Any JSON body on a 2xx counts; fields are not checked. Any failure, an
    /// invalid token included, counts as unavailable and is only logged at
    /// debug level, never passed to the observer's `on_error`.
    pub async fn is_available(&self) -> bool {
        let quiet = self
            .clone()
            .with_observer(Arc::new(QuietErrors(self.observer.clone())));
        match quiet.get::<serde_json::Value>("/").await {
            Ok(_) => true,
            Err(e) => {
                debug!("{} is not available: {}", self.config.host, e);
                false
            }
        }
    }

    pub async fn get_info(&self) -> Result<DeviceInfo> {
        self.get("/").await
    }

    pub async fn serial_no(&self) -> Result<String> {
        Ok(self.get_info().await?.serial_no)
    }

    pub async fn firmware_version(&self) -> Result<String> {
        Ok(self.get_info().await?.firmware_version)
    }

    pub async fn model(&self) -> Result<String> {
        Ok(self.get_info().await?.model)
    }

    pub async fn name(&self) -> Result<String> {
        Ok(self.get_info().await?.name)
    }

    pub async fn get_state(&self) -> Result<DeviceState> {
        self.get("state").await
    }

    /// Sends exactly the fields set in `update`.
    ///
    /// There is no read-merge-write; fields left unset keep whatever value the
    /// device currently has.
    pub async fn set_state(&self, update: &StateUpdate) -> Result<()> {
        self.put("state", update).await
    }

    pub async fn get_power(&self) -> Result<bool> {
        let switch: Switch = self.get("state/on").await?;
        Ok(switch.value)
    }

    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.set_state(&StateUpdate::new().power(on)).await
    }

    pub async fn set_off(&self, off: bool) -> Result<()> {
        self.set_power(!off).await
    }

    pub async fn get_brightness(&self) -> Result<RangedValue> {
        self.get("state/brightness").await
    }

    /// Sets the brightness, fading over `duration` seconds when given.
    pub async fn set_brightness(&self, value: i32, duration: Option<u32>) -> Result<()> {
        let update = match duration {
            Some(duration) => StateUpdate::new().brightness_with_duration(value, duration),
            None => StateUpdate::new().brightness(value),
        };
        self.set_state(&update).await
    }

    pub async fn get_hue(&self) -> Result<RangedValue> {
        self.get("state/hue").await
    }

    pub async fn set_hue(&self, value: i32) -> Result<()> {
        self.set_state(&StateUpdate::new().hue(value)).await
    }

    pub async fn get_saturation(&self) -> Result<RangedValue> {
        self.get("state/sat").await
    }

    pub async fn set_saturation(&self, value: i32) -> Result<()> {
        self.set_state(&StateUpdate::new().saturation(value)).await
    }

    pub async fn get_color_temperature(&self) -> Result<RangedValue> {
        self.get("state/ct").await
    }

    pub async fn set_color_temperature(&self, value: i32) -> Result<()> {
        self.set_state(&StateUpdate::new().color_temperature(value)).await
    }

    pub async fn get_color_mode(&self) -> Result<String> {
        let mode: ColorModeResponse = self.get("state/colorMode").await?;
        Ok(mode.into_mode())
    }

    /// The active effect, or `None` when the device is in a plain color mode.
    pub async fn get_effect(&self) -> Result<Option<String>> {
        let selected: Option<String> = self.get("effects/select").await?;
        Ok(parse_effect(selected))
    }

    /// Selects an effect by name.
    ///
    /// The name is not checked against the effects list; the device rejects
    /// unknown effects itself.
    pub async fn set_effect(&self, name: &str) -> Result<()> {
        self.put("effects", &json!({ "select": name })).await
    }

    pub async fn get_effects_list(&self) -> Result<Vec<String>> {
        self.get("effects/effectsList").await
    }

    /// Asks the device for a new token without storing it.
    ///
    /// Only succeeds while the device is in pairing mode, entered by holding
    /// the on/off button for 5-7 seconds until the LEDs flash.
    pub async fn request_token(&self) -> Result<String> {
        let body = self.request::<()>(Method::POST, "new", None, false).await?;
        let response: TokenResponse = self.decode("new", &body)?;
        Ok(response.auth_token)
    }

    /// Requests a new token and makes it the active one.
    ///
    /// The stored token is left as it was if the request fails.
    pub async fn authorize(&mut self) -> Result<()> {
        let token = self.request_token().await?;
        self.config.token = Some(token);
        Ok(())
    }

    /// Deletes the active token on the device. This cannot be undone.
    pub async fn revoke_token(&mut self) -> Result<()> {
        self.request::<()>(Method::DELETE, "/", None, true).await?;
        self.config.token = None;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.request::<()>(Method::GET, path, None, true).await?;
        self.decode(path, &body)
    }

    async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.request(Method::PUT, path, Some(body), true).await?;
        Ok(())
    }

    /// Single request pipeline behind every operation.
    ///
    /// Returns the raw response body on 2xx. Transport failures become
    /// [`DeviceError::Unavailable`]; error statuses are mapped by
    /// [`DeviceError::from_status`]. Nothing is retried.
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<String> {
        let path = path.trim_start_matches('/');
        let url = if authenticated {
            format!("{}{}", self.config.authenticated_url(), path)
        } else {
            format!("{}{}", self.config.base_url(), path)
        };

        self.observer.on_request(&method, path);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.report(DeviceError::from_transport(&self.config.host, &e)))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(self.report(DeviceError::from_status(
                status,
                &self.config.host,
                path,
                authenticated,
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.report(DeviceError::from_transport(&self.config.host, &e)))?;
        self.observer.on_response(&method, path, status, &text);

        Ok(text)
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|source| {
            self.report(DeviceError::InvalidResponse {
                path: path.trim_start_matches('/').to_string(),
                source,
            })
        })
    }

    fn report(&self, error: DeviceError) -> DeviceError {
        self.observer.on_error(&error);
        error
    }
}
