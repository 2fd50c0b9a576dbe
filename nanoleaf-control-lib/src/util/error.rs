use reqwest::StatusCode;
use thiserror::Error;

/// Result type for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Errors that can occur when talking to a device.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The device could not be reached, or the requested resource does not exist.
    #[error("{target} is not available: {reason}")]
    Unavailable { target: String, reason: String },

    /// The device rejected the auth token.
    #[error("Invalid token for {host}")]
    InvalidToken { host: String },

    /// The device is not in pairing mode.
    #[error(
        "{host} is not allowing new tokens, press and hold the on/off button \
         on the device for 5-7 seconds until the LED starts flashing in a pattern"
    )]
    NotAuthorizingNewTokens { host: String },

    /// Any other error status (400 included).
    #[error("Request to {path} failed with status: {status}")]
    Http { status: StatusCode, path: String },

    /// A successful response whose body did not match the expected shape.
    #[error("Invalid response from {path}: {source}")]
    InvalidResponse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl DeviceError {
    /// Maps an error status to the matching variant.
    ///
    /// A 403 only means "not in pairing mode" on the unauthenticated token call;
    /// anywhere else it is reported as a plain HTTP failure.
    pub(crate) fn from_status(
        status: StatusCode,
        host: &str,
        path: &str,
        authenticated: bool,
    ) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => DeviceError::InvalidToken {
                host: host.to_string(),
            },
            StatusCode::FORBIDDEN if !authenticated => DeviceError::NotAuthorizingNewTokens {
                host: host.to_string(),
            },
            StatusCode::NOT_FOUND => DeviceError::Unavailable {
                target: format!("{}/{}", host, path.trim_start_matches('/')),
                reason: "returns 404".to_string(),
            },
            _ => DeviceError::Http {
                status,
                path: path.to_string(),
            },
        }
    }

    pub(crate) fn from_transport(host: &str, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        DeviceError::Unavailable {
            target: host.to_string(),
            reason,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, DeviceError::Unavailable { .. })
    }

    pub fn is_invalid_token(&self) -> bool {
        matches!(self, DeviceError::InvalidToken { .. })
    }

    pub fn is_not_authorizing(&self) -> bool {
        matches!(self, DeviceError::NotAuthorizingNewTokens { .. })
    }
}
