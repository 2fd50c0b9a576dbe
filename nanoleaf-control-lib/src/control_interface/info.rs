use serde::{Deserialize, Deserializer, Serialize};

use crate::util::effect::parse_effect;

/// Snapshot of the general device information served at the API root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial_no: String,
    pub firmware_version: String,
    pub model: String,
    pub name: String,
    pub manufacturer: String,
    pub hardware_version: String,
    pub effects_list: Vec<String>,
    /// `None` when no user effect is active.
    pub selected_effect: Option<String>,
}

// Wire shape of `GET /api/v1/{token}/`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DeviceInfoResponse {
    serial_no: String,
    firmware_version: String,
    model: String,
    name: String,
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    hardware_version: String,
    #[serde(default)]
    effects: EffectsResponse,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct EffectsResponse {
    #[serde(default)]
    effects_list: Vec<String>,
    #[serde(default)]
    select: Option<String>,
}

impl<'de> Deserialize<'de> for DeviceInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let response = DeviceInfoResponse::deserialize(deserializer)?;
        Ok(DeviceInfo {
            serial_no: response.serial_no,
            firmware_version: response.firmware_version,
            model: response.model,
            name: response.name,
            manufacturer: response.manufacturer,
            hardware_version: response.hardware_version,
            effects_list: response.effects.effects_list,
            selected_effect: parse_effect(response.effects.select),
        })
    }
}
