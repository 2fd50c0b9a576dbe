//! In-process stand-in for a device, used by the client tests.
//!
//! Speaks just enough HTTP/1.1 for reqwest: one request per connection,
//! `Content-Length` bodies, `Connection: close` replies.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::control_interface::DeviceClient;
use crate::util::config::ConnectionConfig;
use crate::util::observer::NoopObserver;

pub(crate) const TOKEN: &str = "mock-token";
pub(crate) const ISSUED_TOKEN: &str = "fresh-token";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

struct DeviceModel {
    token: String,
    pairing: bool,
    forced_status: Option<u16>,
    info_body: Option<Value>,
    state: Value,
    effects_list: Vec<String>,
    selected_effect: String,
    requests: Vec<RecordedRequest>,
}

impl DeviceModel {
    fn new() -> Self {
        DeviceModel {
            token: TOKEN.to_string(),
            pairing: false,
            forced_status: None,
            info_body: None,
            state: json!({
                "on": {"value": false},
                "brightness": {"value": 100, "max": 100, "min": 0},
                "hue": {"value": 0, "max": 360, "min": 0},
                "sat": {"value": 0, "max": 100, "min": 0},
                "ct": {"value": 4000, "max": 6500, "min": 1200},
                "colorMode": "hs"
            }),
            effects_list: vec![
                "Color Burst".to_string(),
                "Flames".to_string(),
                "Forest".to_string(),
            ],
            selected_effect: "Flames".to_string(),
            requests: Vec::new(),
        }
    }

    fn info(&self) -> Value {
        if let Some(body) = &self.info_body {
            return body.clone();
        }
        json!({
            "name": "Mock Panels",
            "serialNo": "S00000000",
            "manufacturer": "Nanoleaf",
            "firmwareVersion": "5.1.0",
            "hardwareVersion": "1.6-2",
            "model": "NL22",
            "effects": {
                "effectsList": self.effects_list,
                "select": self.selected_effect
            },
            "state": self.state
        })
    }

    fn handle(&mut self, method: &str, path: &str, body: Option<Value>) -> (u16, String) {
        self.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: body.clone(),
        });

        if let Some(status) = self.forced_status {
            return (status, String::new());
        }

        let Some(rest) = path.strip_prefix("/api/v1/") else {
            return (404, String::new());
        };

        if rest == "new" {
            return match (method, self.pairing) {
                ("POST", true) => (200, json!({ "auth_token": ISSUED_TOKEN }).to_string()),
                ("POST", false) => (403, String::new()),
                _ => (404, String::new()),
            };
        }

        let (token, resource) = rest.split_once('/').unwrap_or((rest, ""));
        if token.is_empty() || token != self.token {
            return (401, String::new());
        }

        match (method, resource) {
            ("GET", "") => (200, self.info().to_string()),
            ("DELETE", "") => {
                self.token.clear();
                (204, String::new())
            }
            ("GET", "state") => (200, self.state.to_string()),
            ("PUT", "state") => {
                match body {
                    Some(Value::Object(update)) => {
                        for (key, value) in update {
                            merge_field(&mut self.state, &key, value);
                        }
                    }
                    _ => return (400, String::new()),
                }
                (204, String::new())
            }
            ("GET", "effects/effectsList") => (200, json!(self.effects_list).to_string()),
            ("GET", "effects/select") => (200, json!(self.selected_effect).to_string()),
            ("PUT", "effects") => match body.as_ref().and_then(|b| b["select"].as_str()) {
                Some(name) => {
                    self.selected_effect = name.to_string();
                    (204, String::new())
                }
                None => (400, String::new()),
            },
            ("GET", field) => match field
                .strip_prefix("state/")
                .and_then(|key| self.state.get(key))
            {
                Some(value) => (200, value.to_string()),
                None => (404, String::new()),
            },
            _ => (404, String::new()),
        }
    }
}

// Writes nested values into the stored state, keeping the device-reported bounds.
fn merge_field(state: &mut Value, key: &str, value: Value) {
    match value {
        Value::Object(fields) => {
            let target = &mut state[key];
            for (field, field_value) in fields {
                if field != "duration" {
                    target[field] = field_value;
                }
            }
        }
        other => state[key] = other,
    }
}

pub(crate) struct MockDevice {
    addr: SocketAddr,
    model: Arc<Mutex<DeviceModel>>,
    handle: JoinHandle<()>,
}

impl MockDevice {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let model = Arc::new(Mutex::new(DeviceModel::new()));

        let server_model = model.clone();
        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let model = server_model.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(socket, model).await;
                });
            }
        });

        MockDevice {
            addr,
            model,
            handle,
        }
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.addr.ip().to_string())
            .with_port(self.addr.port())
            .with_timeout(Duration::from_secs(2))
    }

    /// A client already holding the device's valid token.
    pub fn client(&self) -> DeviceClient {
        self.client_with_token(Some(TOKEN))
    }

    pub fn client_with_token(&self, token: Option<&str>) -> DeviceClient {
        DeviceClient::new(self.config().with_token(token.map(str::to_string)))
            .unwrap()
            .with_observer(Arc::new(NoopObserver))
    }

    pub fn set_pairing(&self, pairing: bool) {
        self.model.lock().unwrap().pairing = pairing;
    }

    /// Answers every request with `status` and an empty body.
    pub fn force_status(&self, status: u16) {
        self.model.lock().unwrap().forced_status = Some(status);
    }

    /// Serves `body` verbatim from the info endpoint.
    pub fn set_info_body(&self, body: Value) {
        self.model.lock().unwrap().info_body = Some(body);
    }

    pub fn set_effects_list(&self, effects: &[&str]) {
        self.model.lock().unwrap().effects_list = effects.iter().map(|e| e.to_string()).collect();
    }

    pub fn set_selected_effect(&self, effect: &str) {
        self.model.lock().unwrap().selected_effect = effect.to_string();
    }

    pub fn set_state_field(&self, key: &str, value: Value) {
        self.model.lock().unwrap().state[key] = value;
    }

    pub fn state(&self) -> Value {
        self.model.lock().unwrap().state.clone()
    }

    pub fn selected_effect(&self) -> String {
        self.model.lock().unwrap().selected_effect.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.model.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.model.lock().unwrap().requests.last().cloned()
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An address nothing is listening on.
pub(crate) async fn refused_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Accepts connections and never answers.
pub(crate) async fn stalled_device() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (addr, handle)
}

async fn handle_connection(
    mut socket: TcpStream,
    model: Arc<Mutex<DeviceModel>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let heading = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let Some((method, path, headers)) = parse_request_line(&heading) else {
        return Ok(());
    };
    let content_length = find_content_length(headers).unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = &buf[header_end..body_end];
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(body).ok()
    };

    let (status, response_body) = model.lock().unwrap().handle(method, path, body);

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        response_body.len(),
        response_body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn parse_request_line(heading: &str) -> Option<(&str, &str, &str)> {
    let line_end = heading.find("\r\n")?;
    let mut parts = heading[..line_end].split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    Some((method, path, &heading[line_end + 2..]))
}

fn find_content_length(headers: &str) -> Option<usize> {
    const TARGET: &str = "content-length:";
    headers
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with(TARGET))
        .and_then(|line| line[TARGET.len()..].trim().parse().ok())
}
