//! Pointer control processor (MOUSE layer).
//!
//! The right stick moves the cursor at normal speed, the left stick at
//! precision speed; the star modifier makes the right stick faster and the
//! left stick slower still. Movement is emitted as relative-move actions,
//! rate-limited per stick so pointer velocity does not scale with the report
//! rate of the device.

use crate::button::{AxisType, AxisValues, ButtonEvent, ButtonStates, ButtonType};
use crate::config::Settings;
use crate::engine::{EventProcessor, LayerMode, ModifierTracker};
use crate::error::EngineError;
use crate::out_event::{MouseButton, OutAction, OutEventQueue};
use std::time::{Duration, Instant};

/// Pixels per emitted move at each speed tier.
const SPEED_NORMAL: f32 = 10.0;
const SPEED_FAST: f32 = 20.0;
const SPEED_PRECISION: f32 = 3.0;
const SPEED_FINE: f32 = 1.0;

/// Minimum spacing between moves, per stick.
const RIGHT_MOVE_INTERVAL: Duration = Duration::from_millis(2);
const LEFT_MOVE_INTERVAL: Duration = Duration::from_millis(5);

/// Stick rates below this magnitude do not move the pointer.
const MOVE_DEADZONE: f32 = 0.15;

pub struct MouseProcessor {
    star: ModifierTracker,
    backspace_held: bool,
    last_right_move: Option<Instant>,
    last_left_move: Option<Instant>,
}

impl MouseProcessor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            star: ModifierTracker::new("star", ButtonType::L, settings.long_press_threshold_sec),
            backspace_held: false,
            last_right_move: None,
            last_left_move: None,
        }
    }

    /// Deadzone-gated, speed-scaled move delta for one stick.
    fn move_delta(right_rate: f32, down_rate: f32, speed: f32) -> Option<(i32, i32)> {
        if right_rate.abs() <= MOVE_DEADZONE && down_rate.abs() <= MOVE_DEADZONE {
            return None;
        }
        let dx = (right_rate * speed).round() as i32;
        let dy = (down_rate * speed).round() as i32;
        if dx == 0 && dy == 0 {
            None
        } else {
            Some((dx, dy))
        }
    }
}

impl EventProcessor for MouseProcessor {
    fn process(
        &mut self,
        queue: &mut OutEventQueue,
        events: &[ButtonEvent],
        axes: &AxisValues,
        states: ButtonStates,
        now: Instant,
    ) -> Result<(), EngineError> {
        for event in events {
            self.star.handle_own_button(queue, event, now);

            let bt = event.button;
            if event.pressed {
                match bt {
                    ButtonType::R => queue.enqueue(OutAction::MouseClick(MouseButton::Left)),
                    ButtonType::Zr => queue.enqueue(OutAction::MouseClick(MouseButton::Right)),
                    ButtonType::Select => {
                        self.backspace_held = true;
                        queue.enqueue(OutAction::down("backspace", true));
                    }
                    ButtonType::Start => queue.enqueue(OutAction::press("enter")),
                    ButtonType::AnalogRPress => {
                        queue.enqueue(OutAction::SetLayerMode(LayerMode::KeyboardJp));
                    }
                    _ => {}
                }
            }

            if !event.pressed && bt == ButtonType::Select && self.backspace_held {
                self.backspace_held = false;
                queue.enqueue(OutAction::up("backspace"));
            }

            self.star.handle_foreign_release(queue, event);
        }

        let is_star = self.star.active();

        // Right stick: normal speed, fast with star, at most one move per 2 ms.
        let due = self
            .last_right_move
            .map_or(true, |last| now.duration_since(last) >= RIGHT_MOVE_INTERVAL);
        if due {
            let speed = if is_star { SPEED_FAST } else { SPEED_NORMAL };
            let delta = Self::move_delta(
                axes.rate(AxisType::AnalogRRight),
                axes.rate(AxisType::AnalogRDown),
                speed,
            );
            if let Some((dx, dy)) = delta {
                queue.enqueue(OutAction::MouseMoveRelative { dx, dy });
                self.last_right_move = Some(now);
            }
        }

        // Left stick: precision speed, finer with star, at most one per 5 ms.
        let due = self
            .last_left_move
            .map_or(true, |last| now.duration_since(last) >= LEFT_MOVE_INTERVAL);
        if due {
            let speed = if is_star { SPEED_FINE } else { SPEED_PRECISION };
            let delta = Self::move_delta(
                axes.rate(AxisType::AnalogLRight),
                axes.rate(AxisType::AnalogLDown),
                speed,
            );
            if let Some((dx, dy)) = delta {
                queue.enqueue(OutAction::MouseMoveRelative { dx, dy });
                self.last_left_move = Some(now);
            }
        }

        self.star.update_long_press(queue, states, now);
        Ok(())
    }
}
