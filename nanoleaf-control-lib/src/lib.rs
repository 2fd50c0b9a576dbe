//! # Nanoleaf Control Library
//!
//! `nanoleaf-control-lib` is a Rust library for controlling Nanoleaf LED panels
//! over their local-network HTTP API. It reads and writes the device state
//! (power, brightness, hue, saturation, color temperature, effects) and
//! manages the auth token the device issues while in pairing mode.
//!
//! ## Features
//!
//! - Typed device info and state snapshots
//! - Partial state updates that only touch the fields you set
//! - Token lifecycle: request, adopt and revoke
//! - A small error taxonomy mapped from HTTP failures
//! - Pluggable request observer instead of global logging state
//!
//! ## Example
//!
//! ```no_run
//! use nanoleaf_control_lib::control_interface::{DeviceClient, StateUpdate};
//! use nanoleaf_control_lib::util::config::ConnectionConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new("192.168.1.40").with_token(Some("my-token".into()));
//!     let client = DeviceClient::new(config)?;
//!
//!     client
//!         .set_state(&StateUpdate::new().power(true).brightness(60))
//!         .await?;
//!     println!("Current effect: {:?}", client.get_effect().await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pairing
//!
//! Hold the on/off button of the device for 5-7 seconds until the LEDs start
//! flashing, then call [`DeviceClient::authorize`](control_interface::DeviceClient::authorize).
//!
//! ## Disclaimer
//!
//! This project is not affiliated with, authorized by, endorsed by, or in any way officially connected
//! with Nanoleaf or its affiliates.
//!
//! ## License
//!
//! This project is dual-licensed under the MIT License and the Apache License, Version 2.0.
//! You may choose to use either license, depending on your project needs.

// The `control_interface` module holds the device client, its request
// pipeline, and the typed info and state records it reads and writes.
pub mod control_interface;

// The `util` module provides the connection configuration, the error type,
// effect-name handling, and the request observer hooks.
pub mod util;

pub use control_interface::DeviceClient;
pub use util::config::{ConnectionConfig, Protocol};
pub use util::error::{DeviceError, Result};
