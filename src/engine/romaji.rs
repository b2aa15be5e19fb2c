//! Romaji input processor (KEYBOARD_JP + ROMAJI).
//!
//! Letter-at-a-time romaji entry aimed at a host-side Japanese IME: vowels on
//! the face buttons, consonant rows on the d-pad and left stick, voiced
//! consonants on the star plane, cursor keys on the shift plane.

use crate::button::{AxisValues, ButtonEvent, ButtonStates, ButtonType};
use crate::config::Settings;
use crate::engine::{EventProcessor, LayerMode, ModifierTracker};
use crate::error::EngineError;
use crate::out_event::{OutAction, OutEventQueue};
use std::time::Instant;

pub struct RomajiProcessor {
    shift: ModifierTracker,
    star: ModifierTracker,
    backspace_held: bool,
    use_ctrl_space_for_kanji_key: bool,
}

impl RomajiProcessor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            shift: ModifierTracker::new("shift", ButtonType::Zl, settings.long_press_threshold_sec),
            star: ModifierTracker::new("star", ButtonType::L, settings.long_press_threshold_sec),
            backspace_held: false,
            use_ctrl_space_for_kanji_key: settings.use_ctrl_space_for_kanji_key,
        }
    }

    fn enqueue_kanji_key(&self, queue: &mut OutEventQueue) {
        if self.use_ctrl_space_for_kanji_key {
            queue.enqueue(OutAction::hotkey(&["ctrl", "space"]));
        } else {
            queue.enqueue(OutAction::press("kanji"));
        }
    }
}

impl EventProcessor for RomajiProcessor {
    fn process(
        &mut self,
        queue: &mut OutEventQueue,
        events: &[ButtonEvent],
        _axes: &AxisValues,
        states: ButtonStates,
        now: Instant,
    ) -> Result<(), EngineError> {
        for event in events {
            self.shift.handle_own_button(queue, event, now);
            self.star.handle_own_button(queue, event, now);
            let is_shift = self.shift.active();
            let is_star = self.star.active();

            let bt = event.button;

            // Vowels and the y-row are reachable from every plane.
            if event.pressed {
                match bt {
                    ButtonType::A => queue.enqueue(OutAction::press("a")),
                    ButtonType::B => queue.enqueue(OutAction::press("i")),
                    ButtonType::X => queue.enqueue(OutAction::press("e")),
                    ButtonType::Y => queue.enqueue(OutAction::press("o")),
                    ButtonType::AnalogRDown => queue.enqueue(OutAction::press("x")),
                    ButtonType::AnalogRRight => queue.enqueue(OutAction::text("ya")),
                    ButtonType::AnalogRUp => queue.enqueue(OutAction::text("yu")),
                    ButtonType::AnalogRLeft => queue.enqueue(OutAction::text("yo")),
                    ButtonType::AnalogRPress => {
                        queue.enqueue(OutAction::SetLayerMode(LayerMode::Mouse));
                    }
                    _ => {}
                }
            }

            if !is_shift && !is_star {
                if event.pressed {
                    match bt {
                        ButtonType::Right => queue.enqueue(OutAction::press("k")),
                        ButtonType::Down => queue.enqueue(OutAction::press("s")),
                        ButtonType::Left => queue.enqueue(OutAction::press("t")),
                        ButtonType::Up => queue.enqueue(OutAction::press("h")),
                        ButtonType::AnalogLRight => queue.enqueue(OutAction::press("n")),
                        ButtonType::AnalogLDown => queue.enqueue(OutAction::press("w")),
                        ButtonType::AnalogLLeft => queue.enqueue(OutAction::press("m")),
                        ButtonType::AnalogLUp => queue.enqueue(OutAction::text("xtsu")),
                        ButtonType::Select => {
                            self.backspace_held = true;
                            queue.enqueue(OutAction::down("backspace", true));
                        }
                        ButtonType::Start => queue.enqueue(OutAction::press("enter")),
                        ButtonType::Zr => queue.enqueue(OutAction::press("u")),
                        ButtonType::R => queue.enqueue(OutAction::press("space")),
                        _ => {}
                    }
                }
            } else if is_star {
                if event.pressed {
                    match bt {
                        ButtonType::Right => queue.enqueue(OutAction::press("g")),
                        ButtonType::Down => queue.enqueue(OutAction::press("z")),
                        ButtonType::Left => queue.enqueue(OutAction::press("d")),
                        ButtonType::Up => queue.enqueue(OutAction::press("b")),
                        ButtonType::AnalogLRight => queue.enqueue(OutAction::text("nn")),
                        ButtonType::Select => queue.enqueue(OutAction::press(",")),
                        ButtonType::Start => queue.enqueue(OutAction::press(".")),
                        ButtonType::Zr => queue.enqueue(OutAction::press("p")),
                        ButtonType::R => queue.enqueue(OutAction::press("r")),
                        _ => {}
                    }
                }
            } else if event.pressed {
                match bt {
                    ButtonType::Right => queue.enqueue(OutAction::press("right")),
                    ButtonType::Down => queue.enqueue(OutAction::press("down")),
                    ButtonType::Left => queue.enqueue(OutAction::press("left")),
                    ButtonType::Up => queue.enqueue(OutAction::press("up")),
                    ButtonType::Select => queue.enqueue(OutAction::press("?")),
                    ButtonType::Start => queue.enqueue(OutAction::press("!")),
                    ButtonType::Zr => queue.enqueue(OutAction::press("-")),
                    ButtonType::R => self.enqueue_kanji_key(queue),
                    _ => {}
                }
            }

            if !event.pressed && bt == ButtonType::Select && self.backspace_held {
                self.backspace_held = false;
                queue.enqueue(OutAction::up("backspace"));
            }

            self.shift.handle_foreign_release(queue, event);
            self.star.handle_foreign_release(queue, event);
        }

        self.shift.update_long_press(queue, states, now);
        self.star.update_long_press(queue, states, now);
        Ok(())
    }
}
