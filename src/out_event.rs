//! Output actions, the injector seam, and the per-tick action queue.
//!
//! Processors never touch the OS. They enqueue [`OutAction`] values; side
//! effects happen only when [`OutEventQueue::drain`] hands each action to an
//! [`InputInjector`]. Injection failures are logged per action and never stall
//! the input loop.

use crate::engine::{LayerMode, LayerModeState};
use crate::error::InjectError;
use crate::repeat::KeyRepeat;
use tracing::{debug, warn};

/// Mouse button identity for click actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One resolved output action. Pure data until drained.
#[derive(Clone, Debug, PartialEq)]
pub enum OutAction {
    /// Engine-internal notification; surfaces as a debug log line only.
    DebugNote(String),
    /// Tap a named key (down + up).
    KeyPress(String),
    /// Hold a named key down; `repeat` opts into software key repeat.
    KeyDown { key: String, repeat: bool },
    /// Release a named key.
    KeyUp(String),
    /// Type literal text with a small inter-character delay.
    TypeText(String),
    /// Press a chord of keys together.
    HotKey(Vec<String>),
    MouseMoveRelative { dx: i32, dy: i32 },
    MouseClick(MouseButton),
    /// Switch the active layer; applied synchronously during drain.
    SetLayerMode(LayerMode),
}

impl OutAction {
    pub fn note(msg: impl Into<String>) -> Self {
        OutAction::DebugNote(msg.into())
    }

    pub fn press(key: impl Into<String>) -> Self {
        OutAction::KeyPress(key.into())
    }

    pub fn down(key: impl Into<String>, repeat: bool) -> Self {
        OutAction::KeyDown { key: key.into(), repeat }
    }

    pub fn up(key: impl Into<String>) -> Self {
        OutAction::KeyUp(key.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        OutAction::TypeText(text.into())
    }

    pub fn hotkey(keys: &[&str]) -> Self {
        OutAction::HotKey(keys.iter().map(|k| (*k).to_string()).collect())
    }
}

/// Executes resolved output actions against the OS.
///
/// Implementations live outside the core (platform injectors, test doubles).
pub trait InputInjector {
    fn key_press(&mut self, key: &str) -> Result<(), InjectError>;
    fn key_down(&mut self, key: &str) -> Result<(), InjectError>;
    fn key_up(&mut self, key: &str) -> Result<(), InjectError>;
    fn type_text(&mut self, text: &str) -> Result<(), InjectError>;
    fn hot_key(&mut self, keys: &[String]) -> Result<(), InjectError>;
    fn mouse_move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectError>;
    fn mouse_click(&mut self, button: MouseButton) -> Result<(), InjectError>;
}

/// Strict FIFO buffer of the actions produced during one tick.
#[derive(Debug, Default)]
pub struct OutEventQueue {
    actions: Vec<OutAction>,
}

impl OutEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: OutAction) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Pending actions, in enqueue order.
    pub fn pending(&self) -> &[OutAction] {
        &self.actions
    }

    /// Execute every queued action in enqueue order, then clear the queue.
    ///
    /// Repeatable key-down/up actions are also registered with `repeat` at
    /// injection time. `SetLayerMode` mutates `layer` synchronously. The queue
    /// is cleared unconditionally, even when an injector call fails.
    pub fn drain(
        &mut self,
        injector: &mut dyn InputInjector,
        layer: &mut LayerModeState,
        repeat: &KeyRepeat,
    ) {
        for action in self.actions.drain(..) {
            debug!(?action, "out event");
            let result = match &action {
                OutAction::DebugNote(msg) => {
                    debug!(target: "padkana::engine", "{msg}");
                    Ok(())
                }
                OutAction::KeyPress(key) => injector.key_press(key),
                OutAction::KeyDown { key, repeat: repeatable } => {
                    if *repeatable {
                        repeat.key_down(key);
                    }
                    injector.key_down(key)
                }
                OutAction::KeyUp(key) => {
                    repeat.key_up(key);
                    injector.key_up(key)
                }
                OutAction::TypeText(text) => injector.type_text(text),
                OutAction::HotKey(keys) => injector.hot_key(keys),
                OutAction::MouseMoveRelative { dx, dy } => {
                    injector.mouse_move_relative(*dx, *dy)
                }
                OutAction::MouseClick(button) => injector.mouse_click(*button),
                OutAction::SetLayerMode(mode) => {
                    layer.set_layer_mode(*mode);
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!(?action, error = %e, "injection failed; continuing");
            }
        }
    }
}

/// Test/diagnostic injector that records every call instead of touching the OS.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    pub calls: Vec<InjectedCall>,
    /// When set, every call fails with this message (failure-path testing).
    pub reject_with: Option<String>,
}

/// One call observed by [`RecordingInjector`].
#[derive(Clone, Debug, PartialEq)]
pub enum InjectedCall {
    KeyPress(String),
    KeyDown(String),
    KeyUp(String),
    TypeText(String),
    HotKey(Vec<String>),
    MouseMoveRelative { dx: i32, dy: i32 },
    MouseClick(MouseButton),
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, call: InjectedCall) -> Result<(), InjectError> {
        match &self.reject_with {
            Some(msg) => Err(InjectError(msg.clone())),
            None => {
                self.calls.push(call);
                Ok(())
            }
        }
    }
}

impl InputInjector for RecordingInjector {
    fn key_press(&mut self, key: &str) -> Result<(), InjectError> {
        self.record(InjectedCall::KeyPress(key.to_string()))
    }

    fn key_down(&mut self, key: &str) -> Result<(), InjectError> {
        self.record(InjectedCall::KeyDown(key.to_string()))
    }

    fn key_up(&mut self, key: &str) -> Result<(), InjectError> {
        self.record(InjectedCall::KeyUp(key.to_string()))
    }

    fn type_text(&mut self, text: &str) -> Result<(), InjectError> {
        self.record(InjectedCall::TypeText(text.to_string()))
    }

    fn hot_key(&mut self, keys: &[String]) -> Result<(), InjectError> {
        self.record(InjectedCall::HotKey(keys.to_vec()))
    }

    fn mouse_move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectError> {
        self.record(InjectedCall::MouseMoveRelative { dx, dy })
    }

    fn mouse_click(&mut self, button: MouseButton) -> Result<(), InjectError> {
        self.record(InjectedCall::MouseClick(button))
    }
}
