//! The layered input-method engine.
//!
//! Exactly one processor is active per tick, selected by the current
//! ([`LayerMode`], [`JPInputMode`]) pair:
//!
//! | layer        | jp mode | processor            |
//! |--------------|---------|----------------------|
//! | MOUSE        | any     | [`MouseProcessor`]   |
//! | KEYBOARD_EN  | any     | [`AlphabetProcessor`]|
//! | KEYBOARD_JP  | ROMAJI  | [`RomajiProcessor`]  |
//! | KEYBOARD_JP  | FLICK   | [`FlickProcessor`]   |
//!
//! Processors own their modifier and composition state privately; switching
//! layers does not carry state across the boundary.

pub mod alphabet;
pub mod flick;
pub mod modifier;
pub mod mouse;
pub mod romaji;

pub use alphabet::AlphabetProcessor;
pub use flick::{FlickDirection, FlickProcessor};
pub use modifier::ModifierTracker;
pub use mouse::MouseProcessor;
pub use romaji::RomajiProcessor;

use crate::button::{AxisValues, ButtonEvent, ButtonStates};
use crate::config::Settings;
use crate::error::EngineError;
use crate::out_event::{InputInjector, OutAction, OutEventQueue};
use crate::repeat::KeyRepeat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Top-level input interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerMode {
    Mouse,
    KeyboardJp,
    KeyboardEn,
}

/// Japanese input sub-mode within KEYBOARD_JP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JPInputMode {
    Romaji,
    Flick,
}

impl FromStr for JPInputMode {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "ROMAJI" => Ok(JPInputMode::Romaji),
            "FLICK" => Ok(JPInputMode::Flick),
            other => Err(format!("unknown jp input mode: {other}")),
        }
    }
}

/// Symbol sub-mode placeholder (single variant today).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolMode {
    #[default]
    Default,
}

/// Mutable layer selection owned by the engine.
///
/// `SetLayerMode` actions mutate this during queue drain, so a mode switch
/// takes effect for the very next tick.
#[derive(Clone, Copy, Debug)]
pub struct LayerModeState {
    layer_mode: LayerMode,
    jp_input_mode: JPInputMode,
    symbol_mode: SymbolMode,
}

impl Default for LayerModeState {
    fn default() -> Self {
        Self {
            layer_mode: LayerMode::KeyboardEn,
            jp_input_mode: JPInputMode::Romaji,
            symbol_mode: SymbolMode::Default,
        }
    }
}

impl LayerModeState {
    pub fn new(layer_mode: LayerMode, jp_input_mode: JPInputMode) -> Self {
        Self { layer_mode, jp_input_mode, symbol_mode: SymbolMode::Default }
    }

    pub fn layer_mode(&self) -> LayerMode {
        self.layer_mode
    }

    pub fn jp_input_mode(&self) -> JPInputMode {
        self.jp_input_mode
    }

    pub fn symbol_mode(&self) -> SymbolMode {
        self.symbol_mode
    }

    pub fn set_layer_mode(&mut self, layer_mode: LayerMode) {
        self.layer_mode = layer_mode;
    }

    pub fn set_jp_input_mode(&mut self, jp_input_mode: JPInputMode) {
        self.jp_input_mode = jp_input_mode;
    }
}

/// Single-instance collaborators threaded through the engine by reference.
///
/// Replaces what would otherwise be hidden global state: the settings and the
/// shared key-repeat bookkeeping are constructed once at startup.
pub struct EngineContext {
    pub settings: Settings,
    pub repeat: Arc<KeyRepeat>,
}

impl EngineContext {
    pub fn new(settings: Settings) -> Self {
        let repeat = Arc::new(KeyRepeat::new(settings.software_key_repeat));
        Self { settings, repeat }
    }
}

/// One mutually exclusive input processor.
///
/// `process` may only enqueue [`OutAction`]s; all I/O happens later at drain
/// time. `now` is passed in so timing behavior is testable.
pub trait EventProcessor {
    fn process(
        &mut self,
        queue: &mut OutEventQueue,
        events: &[ButtonEvent],
        axes: &AxisValues,
        states: ButtonStates,
        now: Instant,
    ) -> Result<(), EngineError>;
}

/// Owns the four processors, the layer state, and the per-tick action queue.
pub struct Engine {
    layer: LayerModeState,
    queue: OutEventQueue,
    alphabet: AlphabetProcessor,
    romaji: RomajiProcessor,
    flick: FlickProcessor,
    mouse: MouseProcessor,
}

impl Engine {
    pub fn new(ctx: &EngineContext) -> Self {
        let s = &ctx.settings;
        Self {
            layer: LayerModeState::new(LayerMode::KeyboardEn, s.jp_input_mode),
            queue: OutEventQueue::new(),
            alphabet: AlphabetProcessor::new(s),
            romaji: RomajiProcessor::new(s),
            flick: FlickProcessor::new(s),
            mouse: MouseProcessor::new(s),
        }
    }

    pub fn layer_state(&self) -> &LayerModeState {
        &self.layer
    }

    pub fn layer_state_mut(&mut self) -> &mut LayerModeState {
        &mut self.layer
    }

    /// Actions queued so far this tick (drained by [`Engine::drain`]).
    pub fn pending(&self) -> &[OutAction] {
        self.queue.pending()
    }

    /// Route one tick's events and state to the active processor.
    pub fn tick(
        &mut self,
        events: &[ButtonEvent],
        axes: &AxisValues,
        states: ButtonStates,
        now: Instant,
    ) -> Result<(), EngineError> {
        let Engine { layer, queue, alphabet, romaji, flick, mouse } = self;
        let processor: &mut dyn EventProcessor =
            match (layer.layer_mode(), layer.jp_input_mode()) {
                (LayerMode::Mouse, _) => mouse,
                (LayerMode::KeyboardEn, _) => alphabet,
                (LayerMode::KeyboardJp, JPInputMode::Romaji) => romaji,
                (LayerMode::KeyboardJp, JPInputMode::Flick) => flick,
            };
        processor.process(queue, events, axes, states, now)
    }

    /// Execute and clear the queued actions.
    pub fn drain(&mut self, injector: &mut dyn InputInjector, ctx: &EngineContext) {
        self.queue.drain(injector, &mut self.layer, &ctx.repeat);
    }
}
