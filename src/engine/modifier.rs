//! Momentary/lockable modifier tracking.

use crate::button::{ButtonEvent, ButtonStates, ButtonType};
use crate::out_event::{OutAction, OutEventQueue};
use std::time::{Duration, Instant};

/// Tracks one modifier ("shift" or "star") bound to a physical button.
///
/// Behavior, by design:
/// - press toggles the modifier on; a second press toggles it off;
/// - releasing the bound button only deactivates the modifier once it has
///   escalated to long-press (hold-to-sustain);
/// - a plain (not long-pressed) active modifier is closed by the release of
///   any *other* button, so a quick tap modifies exactly the next input;
/// - long-press escalation happens after a configurable hold duration,
///   announced once per escalation.
#[derive(Debug)]
pub struct ModifierTracker {
    name: &'static str,
    button: ButtonType,
    threshold: Duration,
    held: bool,
    press_started: Option<Instant>,
    long_pressed: bool,
}

impl ModifierTracker {
    pub fn new(name: &'static str, button: ButtonType, threshold_sec: f32) -> Self {
        Self {
            name,
            button,
            threshold: Duration::from_secs_f32(threshold_sec),
            held: false,
            press_started: None,
            long_pressed: false,
        }
    }

    pub fn button(&self) -> ButtonType {
        self.button
    }

    /// Whether the modifier currently applies.
    pub fn active(&self) -> bool {
        self.held || self.long_pressed
    }

    fn deactivate(&mut self, queue: &mut OutEventQueue) {
        self.held = false;
        self.press_started = None;
        queue.enqueue(OutAction::note(format!("{} off", self.name)));
    }

    /// Handle an event for the bound button (other buttons are ignored).
    pub fn handle_own_button(
        &mut self,
        queue: &mut OutEventQueue,
        event: &ButtonEvent,
        now: Instant,
    ) {
        if event.button != self.button {
            return;
        }
        if event.pressed {
            if !self.held {
                self.held = true;
                self.press_started = Some(now);
                queue.enqueue(OutAction::note(format!("{} on", self.name)));
            } else {
                self.deactivate(queue);
            }
        } else if self.long_pressed {
            self.deactivate(queue);
        }
    }

    /// A release of any non-bound button closes a plain (tapped) modifier.
    pub fn handle_foreign_release(&mut self, queue: &mut OutEventQueue, event: &ButtonEvent) {
        if self.held && !self.long_pressed && !event.pressed && event.button != self.button {
            self.deactivate(queue);
        }
    }

    /// Re-evaluate long-press escalation; call once at the end of each tick.
    pub fn update_long_press(
        &mut self,
        queue: &mut OutEventQueue,
        states: ButtonStates,
        now: Instant,
    ) {
        let was_long = self.long_pressed;
        self.long_pressed = states.get(self.button)
            && self
                .press_started
                .is_some_and(|start| now.duration_since(start) > self.threshold);
        if self.long_pressed && !was_long {
            queue.enqueue(OutAction::note(format!("{} long press", self.name)));
        }
    }
}
