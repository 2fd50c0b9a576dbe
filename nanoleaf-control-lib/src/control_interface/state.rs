use serde::{Deserialize, Serialize};

/// On/off switch as the device nests it: `{"value": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub value: bool,
}

/// A bounded integer field.
///
/// `min` and `max` are reported by the device and are not enforced on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedValue {
    pub value: i32,
    #[serde(default)]
    pub min: i32,
    #[serde(default)]
    pub max: i32,
}

/// Full state snapshot from `GET state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub on: Switch,
    pub brightness: RangedValue,
    pub hue: RangedValue,
    #[serde(rename = "sat")]
    pub saturation: RangedValue,
    #[serde(rename = "ct")]
    pub color_temperature: RangedValue,
    /// Read-only, e.g. `"hs"`, `"ct"` or `"effect"`.
    #[serde(rename = "colorMode")]
    pub color_mode: String,
}

/// Body of `GET state/colorMode`.
///
/// Firmware versions differ on whether the mode is wrapped in an object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum ColorModeResponse {
    Bare(String),
    Wrapped { value: String },
}

impl ColorModeResponse {
    pub(crate) fn into_mode(self) -> String {
        match self {
            ColorModeResponse::Bare(mode) | ColorModeResponse::Wrapped { value: mode } => mode,
        }
    }
}

/// A value to write, optionally with a transition time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueUpdate {
    pub value: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl From<i32> for ValueUpdate {
    fn from(value: i32) -> Self {
        ValueUpdate {
            value,
            duration: None,
        }
    }
}

/// Partial state write for `PUT state`.
///
/// Only the fields that are set are sent; the device leaves the rest untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<Switch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<ValueUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<ValueUpdate>,
    #[serde(rename = "sat", skip_serializing_if = "Option::is_none")]
    pub saturation: Option<ValueUpdate>,
    #[serde(rename = "ct", skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<ValueUpdate>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(mut self, on: bool) -> Self {
        self.on = Some(Switch { value: on });
        self
    }

    pub fn brightness(mut self, value: i32) -> Self {
        self.brightness = Some(value.into());
        self
    }

    /// Fades to `value` over `duration` seconds.
    pub fn brightness_with_duration(mut self, value: i32, duration: u32) -> Self {
        self.brightness = Some(ValueUpdate {
            value,
            duration: Some(duration),
        });
        self
    }

    pub fn hue(mut self, value: i32) -> Self {
        self.hue = Some(value.into());
        self
    }

    pub fn saturation(mut self, value: i32) -> Self {
        self.saturation = Some(value.into());
        self
    }

    pub fn color_temperature(mut self, value: i32) -> Self {
        self.color_temperature = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == StateUpdate::default()
    }
}

/// Writes back every writable value of a snapshot.
impl From<&DeviceState> for StateUpdate {
    fn from(state: &DeviceState) -> Self {
        StateUpdate::new()
            .power(state.on.value)
            .brightness(state.brightness.value)
            .hue(state.hue.value)
            .saturation(state.saturation.value)
            .color_temperature(state.color_temperature.value)
    }
}
