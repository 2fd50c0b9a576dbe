use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port the device API listens on.
pub const DEFAULT_PORT: u16 = 16021;

/// Default time a single request may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid protocol: {0}")]
pub struct ParseProtocolError(String);

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocol_str = match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        };
        write!(f, "{}", protocol_str)
    }
}

impl FromStr for Protocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(ParseProtocolError(s.to_string())),
        }
    }
}

/// Connection parameters for a single device.
///
/// Everything except the token is fixed once the client is built; the token
/// may be set later, after pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout", with = "duration_millis")]
    pub timeout: Duration,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl ConnectionConfig {
    pub fn new(host: &str) -> Self {
        ConnectionConfig {
            host: host.to_string(),
            port: DEFAULT_PORT,
            protocol: Protocol::default(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{protocol}://{host}:{port}/api/v1/`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/api/v1/", self.protocol, self.host, self.port)
    }

    /// `{base_url}{token}/`
    ///
    /// Without a token the segment is left empty, which the device answers
    /// with 401 or 404 like any other bad token.
    pub fn authenticated_url(&self) -> String {
        format!(
            "{}{}/",
            self.base_url(),
            self.token.as_deref().unwrap_or_default()
        )
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: u64 = Deserialize::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
