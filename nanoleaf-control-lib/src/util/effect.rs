/// Effect names the device uses internally for plain color modes.
///
/// They cannot be selected directly, so they are never handed to callers as
/// the active effect.
pub const RESERVED_EFFECT_NAMES: [&str; 3] = ["*Solid*", "*Static*", "*Dynamic*"];

pub fn is_reserved(effect: &str) -> bool {
    RESERVED_EFFECT_NAMES.contains(&effect)
}

/// Turns a selected-effect name read from the device into the caller's view.
pub fn parse_effect(effect: Option<String>) -> Option<String> {
    effect.filter(|name| !is_reserved(name))
}
