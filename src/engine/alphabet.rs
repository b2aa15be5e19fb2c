//! Latin alphabet processor (KEYBOARD_EN).
//!
//! The 16 directional/face inputs carry the alphabet across two planes:
//! `a`–`p` unmodified, `q`–`z` plus punctuation on the star plane. The shift
//! modifier capitalizes either plane by wrapping the key in an OS-shift
//! hold/press/release triad.
//!
//! Layout (neutral / star):
//!
//! | input        | neutral | star |
//! |--------------|---------|------|
//! | A B X Y      | a b c d | q r s t |
//! | UP DOWN LEFT RIGHT | e f g h | u v w x |
//! | L-stick U D L R | i j k l | y z , . |
//! | R-stick U D L R | m n o p | ; ' [ ] |

use crate::button::{AxisValues, ButtonEvent, ButtonStates, ButtonType};
use crate::config::Settings;
use crate::engine::{EventProcessor, LayerMode, ModifierTracker};
use crate::error::EngineError;
use crate::out_event::{OutAction, OutEventQueue};
use std::time::Instant;

pub struct AlphabetProcessor {
    shift: ModifierTracker,
    star: ModifierTracker,
    backspace_held: bool,
}

/// Letter of the neutral plane, if the input carries one.
fn neutral_letter(bt: ButtonType) -> Option<&'static str> {
    Some(match bt {
        ButtonType::A => "a",
        ButtonType::B => "b",
        ButtonType::X => "c",
        ButtonType::Y => "d",
        ButtonType::Up => "e",
        ButtonType::Down => "f",
        ButtonType::Left => "g",
        ButtonType::Right => "h",
        ButtonType::AnalogLUp => "i",
        ButtonType::AnalogLDown => "j",
        ButtonType::AnalogLLeft => "k",
        ButtonType::AnalogLRight => "l",
        ButtonType::AnalogRUp => "m",
        ButtonType::AnalogRDown => "n",
        ButtonType::AnalogRLeft => "o",
        ButtonType::AnalogRRight => "p",
        _ => return None,
    })
}

/// Letter or punctuation of the star plane.
fn star_letter(bt: ButtonType) -> Option<&'static str> {
    Some(match bt {
        ButtonType::A => "q",
        ButtonType::B => "r",
        ButtonType::X => "s",
        ButtonType::Y => "t",
        ButtonType::Up => "u",
        ButtonType::Down => "v",
        ButtonType::Left => "w",
        ButtonType::Right => "x",
        ButtonType::AnalogLUp => "y",
        ButtonType::AnalogLDown => "z",
        ButtonType::AnalogLLeft => ",",
        ButtonType::AnalogLRight => ".",
        ButtonType::AnalogRUp => ";",
        ButtonType::AnalogRDown => "'",
        ButtonType::AnalogRLeft => "[",
        ButtonType::AnalogRRight => "]",
        _ => return None,
    })
}

fn is_letter(key: &str) -> bool {
    key.len() == 1 && key.chars().all(|c| c.is_ascii_lowercase())
}

impl AlphabetProcessor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            shift: ModifierTracker::new("shift", ButtonType::Zl, settings.long_press_threshold_sec),
            star: ModifierTracker::new("star", ButtonType::L, settings.long_press_threshold_sec),
            backspace_held: false,
        }
    }

    /// Hold OS-shift, tap the key, release OS-shift.
    fn enqueue_shifted(queue: &mut OutEventQueue, key: &str) {
        queue.enqueue(OutAction::down("shift", false));
        queue.enqueue(OutAction::press(key));
        queue.enqueue(OutAction::up("shift"));
    }
}

impl EventProcessor for AlphabetProcessor {
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

            if event.pressed {
                // Plane-independent controls.
                match bt {
                    ButtonType::Select if !is_star && !is_shift => {
                        self.backspace_held = true;
                        queue.enqueue(OutAction::down("backspace", true));
                    }
                    ButtonType::Select if is_shift => queue.enqueue(OutAction::press("?")),
                    ButtonType::Select => queue.enqueue(OutAction::press(",")),
                    ButtonType::Start if is_shift => queue.enqueue(OutAction::press("!")),
                    ButtonType::Start => queue.enqueue(OutAction::press("enter")),
                    ButtonType::Zr if is_shift => queue.enqueue(OutAction::press("_")),
                    ButtonType::Zr if is_star => queue.enqueue(OutAction::press("-")),
                    ButtonType::Zr => queue.enqueue(OutAction::press("space")),
                    ButtonType::R if is_shift => queue.enqueue(OutAction::press(":")),
                    ButtonType::R if is_star => queue.enqueue(OutAction::press("/")),
                    ButtonType::R => queue.enqueue(OutAction::press("tab")),
                    ButtonType::AnalogRPress => {
                        queue.enqueue(OutAction::SetLayerMode(LayerMode::Mouse));
                    }
                    _ => {
                        let key = if is_star { star_letter(bt) } else { neutral_letter(bt) };
                        if let Some(key) = key {
                            if is_shift && is_letter(key) {
                                Self::enqueue_shifted(queue, key);
                            } else {
                                queue.enqueue(OutAction::press(key));
                            }
                        }
                    }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        p: &mut AlphabetProcessor,
        events: &[ButtonEvent],
        states: ButtonStates,
    ) -> Vec<OutAction> {
        let mut queue = OutEventQueue::new();
        p.process(&mut queue, events, &AxisValues::centered(), states, Instant::now())
            .unwrap();
        queue.pending().to_vec()
    }

    fn press(bt: ButtonType) -> ButtonEvent {
        ButtonEvent::new(bt, true)
    }

    fn states_of(buttons: &[ButtonType]) -> ButtonStates {
        let mut s = ButtonStates::empty();
        for b in buttons {
            s.set(*b, true);
        }
        s
    }

    #[test]
    fn neutral_plane_covers_a_through_p() {
        let mut p = AlphabetProcessor::new(&Settings::default());
        let actions = run(
            &mut p,
            &[press(ButtonType::A), press(ButtonType::AnalogRRight)],
            states_of(&[ButtonType::A, ButtonType::AnalogRRight]),
        );
        assert_eq!(actions, vec![OutAction::press("a"), OutAction::press("p")]);
    }

    #[test]
    fn star_plane_covers_q_through_z() {
        let mut p = AlphabetProcessor::new(&Settings::default());
        run(&mut p, &[press(ButtonType::L)], states_of(&[ButtonType::L]));
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogLDown)],
            states_of(&[ButtonType::L, ButtonType::AnalogLDown]),
        );
        assert_eq!(actions, vec![OutAction::press("z")]);
    }

    #[test]
    fn shifted_letters_use_the_os_shift_triad() {
        let mut p = AlphabetProcessor::new(&Settings::default());
        run(&mut p, &[press(ButtonType::Zl)], states_of(&[ButtonType::Zl]));
        let actions = run(
            &mut p,
            &[press(ButtonType::A)],
            states_of(&[ButtonType::Zl, ButtonType::A]),
        );
        assert_eq!(
            actions,
            vec![
                OutAction::down("shift", false),
                OutAction::press("a"),
                OutAction::up("shift"),
            ]
        );
    }

    #[test]
    fn shift_does_not_wrap_punctuation() {
        let mut p = AlphabetProcessor::new(&Settings::default());
        run(
            &mut p,
            &[press(ButtonType::Zl), press(ButtonType::L)],
            states_of(&[ButtonType::Zl, ButtonType::L]),
        );
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogLLeft)],
            states_of(&[ButtonType::Zl, ButtonType::L, ButtonType::AnalogLLeft]),
        );
        assert_eq!(actions, vec![OutAction::press(",")]);
    }

    #[test]
    fn select_backspace_repeats_until_release() {
        let mut p = AlphabetProcessor::new(&Settings::default());
        let actions = run(
            &mut p,
            &[press(ButtonType::Select)],
            states_of(&[ButtonType::Select]),
        );
        assert_eq!(actions, vec![OutAction::down("backspace", true)]);
        let actions = run(
            &mut p,
            &[ButtonEvent::new(ButtonType::Select, false)],
            ButtonStates::empty(),
        );
        assert_eq!(actions, vec![OutAction::up("backspace")]);
    }

    #[test]
    fn stick_press_switches_to_mouse() {
        let mut p = AlphabetProcessor::new(&Settings::default());
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogRPress)],
            states_of(&[ButtonType::AnalogRPress]),
        );
        assert_eq!(actions, vec![OutAction::SetLayerMode(LayerMode::Mouse)]);
    }
}
