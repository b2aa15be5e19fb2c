//! Settings file support.
//!
//! All engine tunables live in one serde-backed [`Settings`] struct with
//! sensible defaults, loadable from TOML. Unknown devices and modes fail here,
//! at configuration time, instead of surfacing later as silent no-ops.

use crate::engine::JPInputMode;
use crate::error::ConfigError;
use crate::report::FaceButtonLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which physical device arrangement to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceMode {
    #[default]
    Dinput,
    Xinput,
    /// JoyCon left + right pair.
    Joycon,
    SwitchPro,
}

/// Vendor/product identifiers for the configured device(s).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub mode: DeviceMode,
    /// Single-device (DINPUT) identifiers.
    pub vendor: u16,
    pub product: u16,
    /// JoyCon pair identifiers.
    pub joycon_vendor: u16,
    pub joycon_product_left: u16,
    pub joycon_product_right: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: DeviceMode::Dinput,
            // Logitech Dual Action, the reference DINPUT pad.
            vendor: 0x046D,
            product: 0xC216,
            joycon_vendor: 0x057E,
            joycon_product_left: 0x2006,
            joycon_product_right: 0x2007,
        }
    }
}

/// Software key repeat tunables.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRepeatSettings {
    pub enabled: bool,
    /// Delay before the first synthetic repeat, seconds.
    pub delay_sec_first: f32,
    /// Delay between subsequent repeats, seconds.
    pub delay_sec: f32,
}

impl Default for KeyRepeatSettings {
    fn default() -> Self {
        Self { enabled: true, delay_sec_first: 0.5, delay_sec: 0.1 }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fraction of half-range a stick must leave center before its virtual
    /// direction buttons engage.
    pub axis_threshold: f32,
    /// Separate threshold used by the flick processor's 9-way partition.
    pub flick_axis_threshold: f32,
    /// Seconds a modifier must be held before it escalates to long-press.
    pub long_press_threshold_sec: f32,
    /// Emit Ctrl+Space instead of the literal `kanji` key.
    pub use_ctrl_space_for_kanji_key: bool,
    /// Backspace twice per mora when cycling diacritics (for input methods
    /// that consume two codepoints per mora).
    pub flick_dakuten_double_backspace: bool,
    pub jp_input_mode: JPInputMode,
    pub face_button_layout: FaceButtonLayout,
    pub software_key_repeat: KeyRepeatSettings,
    pub device: DeviceConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            axis_threshold: 0.5,
            flick_axis_threshold: 0.4,
            long_press_threshold_sec: 0.5,
            use_ctrl_space_for_kanji_key: false,
            flick_dakuten_double_backspace: false,
            jp_input_mode: JPInputMode::Romaji,
            face_button_layout: FaceButtonLayout::default(),
            software_key_repeat: KeyRepeatSettings::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file; missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
