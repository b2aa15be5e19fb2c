//! Gamepad-driven text entry.
//!
//! Turns raw HID gamepad reports into synthetic keyboard and mouse actions
//! through a layered input-method engine: a Latin alphabet layer, two Japanese
//! layers (romaji and phone-style flick), and a pointer layer. The pipeline is
//! report decode → edge detection → active processor → action queue → injector,
//! with a software key-repeat timer on the side.
//!
//! OS injection itself stays behind the [`out_event::InputInjector`] trait;
//! this crate decides *what* to inject, not *how*.

pub mod backends;
pub mod button;
pub mod config;
pub mod edge;
pub mod engine;
pub mod error;
pub mod out_event;
pub mod repeat;
pub mod report;
pub mod runtime;

pub use button::{AxisType, AxisValues, ButtonEvent, ButtonStates, ButtonType};
pub use config::{DeviceConfig, DeviceMode, KeyRepeatSettings, Settings};
pub use edge::EdgeDetector;
pub use engine::{Engine, EngineContext, JPInputMode, LayerMode, LayerModeState};
pub use error::{ConfigError, DecodeError, DeviceError, EngineError, InjectError, RuntimeError};
pub use out_event::{InputInjector, MouseButton, OutAction, OutEventQueue};
pub use report::{decode, DeviceFamily, FaceButtonLayout};
pub use runtime::Runtime;
