//! Flick input processor (KEYBOARD_JP + FLICK).
//!
//! Mimics a phone flick keyboard: the left stick selects a consonant row, R
//! confirms the base "a" vowel, and flicking the right stick picks the other
//! vowels of the same row. The d-pad extends the row set (DOWN = わ row,
//! RIGHT = punctuation) and LEFT cycles dakuten/handakuten/komoji variants of
//! the most recently typed mora by backspacing and retyping it.
//!
//! Text is emitted as romaji for a host-side IME, so a mora is its consonant
//! and vowel concatenated ("ka"), with the irregular わ row and punctuation
//! rows special-cased.

use crate::button::{AxisType, AxisValues, ButtonEvent, ButtonStates, ButtonType};
use crate::config::Settings;
use crate::engine::{EventProcessor, LayerMode, ModifierTracker};
use crate::error::EngineError;
use crate::out_event::{OutAction, OutEventQueue};
use std::time::Instant;

/// 9-way partition of the left stick around center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlickDirection {
    Center,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl FlickDirection {
    /// Threshold the stick rates into one of the nine directions.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidFlickDirection`] if the rates somehow resolve to
    /// an impossible combination; unreachable for well-formed axis values and
    /// kept as an engineering invariant.
    pub fn resolve(axes: &AxisValues, threshold: f32) -> Result<Self, EngineError> {
        let right_rate = axes.rate(AxisType::AnalogLRight);
        let down_rate = axes.rate(AxisType::AnalogLDown);

        let up = -down_rate > threshold;
        let down = down_rate > threshold;
        let left = -right_rate > threshold;
        let right = right_rate > threshold;

        match (up, down, left, right) {
            (false, false, false, false) => Ok(FlickDirection::Center),
            (true, false, false, false) => Ok(FlickDirection::Up),
            (true, false, false, true) => Ok(FlickDirection::UpRight),
            (false, false, false, true) => Ok(FlickDirection::Right),
            (false, true, false, true) => Ok(FlickDirection::DownRight),
            (false, true, false, false) => Ok(FlickDirection::Down),
            (false, true, true, false) => Ok(FlickDirection::DownLeft),
            (false, false, true, false) => Ok(FlickDirection::Left),
            (true, false, true, false) => Ok(FlickDirection::UpLeft),
            _ => Err(EngineError::InvalidFlickDirection { right_rate, down_rate }),
        }
    }
}

/// Consonant row keyed by stick direction, clockwise from Up, with the d-pad
/// extension rows. `""` is the あ row; `","` marks the punctuation row.
fn row_consonant(direction: FlickDirection, states: ButtonStates) -> &'static str {
    // Held d-pad rows take precedence over the stick.
    if states.get(ButtonType::Down) {
        return "w";
    }
    if states.get(ButtonType::Right) {
        return ",";
    }
    match direction {
        FlickDirection::Center => "",
        FlickDirection::Up => "k",
        FlickDirection::UpRight => "s",
        FlickDirection::Right => "t",
        FlickDirection::DownRight => "n",
        FlickDirection::Down => "h",
        FlickDirection::DownLeft => "m",
        FlickDirection::Left => "y",
        FlickDirection::UpLeft => "r",
    }
}

/// Romaji text for one consonant/vowel pair, if the mora exists.
fn syllable(consonant: &str, vowel: &str) -> Option<String> {
    match (consonant, vowel) {
        // わ row: wa / wo / nn plus the long-vowel bar.
        ("w", "a") => Some("wa".to_string()),
        ("w", "i") => Some("wo".to_string()),
        ("w", "u") => Some("nn".to_string()),
        ("w", "e") => Some("-".to_string()),
        ("w", "o") => None,
        // Punctuation row.
        (",", "a") => Some(",".to_string()),
        (",", "i") => Some(".".to_string()),
        (",", "u") => Some("?".to_string()),
        (",", "e") => Some("!".to_string()),
        (",", "o") => Some("~".to_string()),
        // や row has no i/e morae; those slots carry brackets, as on phone
        // flick keyboards.
        ("y", "i") => Some("(".to_string()),
        ("y", "e") => Some(")".to_string()),
        _ => Some(format!("{consonant}{vowel}")),
    }
}

/// Forward diacritic/komoji cycle for the d-pad LEFT key.
///
/// The つ syllable has a three-step cycle through the small っ; every other
/// mapping is a two- or three-cycle on the consonant alone.
fn next_consonant(consonant: &str, vowel: &str) -> Option<&'static str> {
    match consonant {
        "k" => Some("g"),
        "g" => Some("k"),
        "s" => Some("z"),
        "z" => Some("s"),
        "t" if vowel == "u" => Some("xt"),
        "xt" => Some("d"),
        "t" => Some("d"),
        "d" => Some("t"),
        "h" => Some("b"),
        "b" => Some("p"),
        "p" => Some("h"),
        "" => Some("x"),
        "x" => Some(""),
        "y" => Some("xy"),
        "xy" => Some("y"),
        _ => None,
    }
}

/// The most recently typed mora, kept so LEFT can revise it in place.
#[derive(Clone, Debug, PartialEq, Eq)]
struct FlickComposition {
    consonant: String,
    vowel: String,
}

pub struct FlickProcessor {
    star: ModifierTracker,
    backspace_held: bool,
    composition: Option<FlickComposition>,
    flick_axis_threshold: f32,
    use_ctrl_space_for_kanji_key: bool,
    dakuten_double_backspace: bool,
}

impl FlickProcessor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            star: ModifierTracker::new("star", ButtonType::L, settings.long_press_threshold_sec),
            backspace_held: false,
            composition: None,
            flick_axis_threshold: settings.flick_axis_threshold,
            use_ctrl_space_for_kanji_key: settings.use_ctrl_space_for_kanji_key,
            dakuten_double_backspace: settings.flick_dakuten_double_backspace,
        }
    }

    /// Type the mora for `consonant`+`vowel` and remember it for cycling.
    /// Unknown combinations are a defined no-op.
    fn emit_mora(&mut self, queue: &mut OutEventQueue, consonant: &str, vowel: &str) {
        if let Some(text) = syllable(consonant, vowel) {
            queue.enqueue(OutAction::text(text));
            self.composition = Some(FlickComposition {
                consonant: consonant.to_string(),
                vowel: vowel.to_string(),
            });
        }
    }

    /// Backspace the previous mora and retype its next diacritic variant.
    fn cycle_diacritic(&mut self, queue: &mut OutEventQueue) {
        let Some(composition) = self.composition.clone() else {
            return;
        };
        let Some(next) = next_consonant(&composition.consonant, &composition.vowel) else {
            return;
        };
        let Some(text) = syllable(next, &composition.vowel) else {
            return;
        };

        let backspaces = if self.dakuten_double_backspace { 2 } else { 1 };
        for _ in 0..backspaces {
            queue.enqueue(OutAction::press("backspace"));
        }
        queue.enqueue(OutAction::text(text));
        self.composition = Some(FlickComposition {
            consonant: next.to_string(),
            vowel: composition.vowel,
        });
    }

    /// Any output that is not a mora or a cycle invalidates the composition.
    fn reset_composition(&mut self) {
        self.composition = None;
    }

    fn enqueue_kanji_key(&self, queue: &mut OutEventQueue) {
        if self.use_ctrl_space_for_kanji_key {
            queue.enqueue(OutAction::hotkey(&["ctrl", "space"]));
        } else {
            queue.enqueue(OutAction::press("kanji"));
        }
    }
}

impl EventProcessor for FlickProcessor {
    fn process(
        &mut self,
        queue: &mut OutEventQueue,
        events: &[ButtonEvent],
        axes: &AxisValues,
        states: ButtonStates,
        now: Instant,
    ) -> Result<(), EngineError> {
        let direction = FlickDirection::resolve(axes, self.flick_axis_threshold)?;

        for event in events {
            self.star.handle_own_button(queue, event, now);
            let is_star = self.star.active();

            let bt = event.button;

            if event.pressed {
                match bt {
                    // Confirm the base vowel of the selected row.
                    ButtonType::R => {
                        let consonant = row_consonant(direction, states);
                        self.emit_mora(queue, consonant, "a");
                    }
                    // Right-stick flicks pick the remaining vowels.
                    ButtonType::AnalogRLeft => {
                        let consonant = row_consonant(direction, states);
                        self.emit_mora(queue, consonant, "i");
                    }
                    ButtonType::AnalogRUp => {
                        let consonant = row_consonant(direction, states);
                        self.emit_mora(queue, consonant, "u");
                    }
                    ButtonType::AnalogRRight => {
                        let consonant = row_consonant(direction, states);
                        self.emit_mora(queue, consonant, "e");
                    }
                    ButtonType::AnalogRDown => {
                        let consonant = row_consonant(direction, states);
                        self.emit_mora(queue, consonant, "o");
                    }
                    // The star modifier turns the d-pad into cursor keys.
                    ButtonType::Up if is_star => queue.enqueue(OutAction::press("up")),
                    ButtonType::Down if is_star => queue.enqueue(OutAction::press("down")),
                    ButtonType::Left if is_star => queue.enqueue(OutAction::press("left")),
                    ButtonType::Right if is_star => queue.enqueue(OutAction::press("right")),
                    ButtonType::Left => self.cycle_diacritic(queue),
                    ButtonType::Y | ButtonType::Select => {
                        self.reset_composition();
                        self.backspace_held = true;
                        queue.enqueue(OutAction::down("backspace", true));
                    }
                    ButtonType::X => {
                        self.reset_composition();
                        self.enqueue_kanji_key(queue);
                    }
                    ButtonType::B => {
                        self.reset_composition();
                        queue.enqueue(OutAction::press("space"));
                    }
                    ButtonType::A | ButtonType::Start => {
                        self.reset_composition();
                        queue.enqueue(OutAction::press("enter"));
                    }
                    ButtonType::AnalogRPress => {
                        queue.enqueue(OutAction::SetLayerMode(LayerMode::Mouse));
                    }
                    // DOWN/RIGHT are row selectors handled via `states`;
                    // everything else is a defined no-op.
                    _ => {}
                }
            }

            if !event.pressed
                && (bt == ButtonType::Y || bt == ButtonType::Select)
                && self.backspace_held
            {
                self.backspace_held = false;
                queue.enqueue(OutAction::up("backspace"));
            }

            self.star.handle_foreign_release(queue, event);
        }

        self.star.update_long_press(queue, states, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> FlickProcessor {
        FlickProcessor::new(&Settings::default())
    }

    fn stick(right_rate: f32, down_rate: f32) -> AxisValues {
        let mut axes = AxisValues::centered();
        axes.set(AxisType::AnalogLRight, 0.5 + right_rate / 2.0);
        axes.set(AxisType::AnalogLDown, 0.5 + down_rate / 2.0);
        axes
    }

    fn run(
        p: &mut FlickProcessor,
        events: &[ButtonEvent],
        axes: &AxisValues,
        states: ButtonStates,
    ) -> Vec<OutAction> {
        let mut queue = OutEventQueue::new();
        p.process(&mut queue, events, axes, states, Instant::now()).unwrap();
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
    fn nine_directions_resolve() {
        let cases = [
            ((0.0, 0.0), FlickDirection::Center),
            ((0.0, -1.0), FlickDirection::Up),
            ((1.0, -1.0), FlickDirection::UpRight),
            ((1.0, 0.0), FlickDirection::Right),
            ((1.0, 1.0), FlickDirection::DownRight),
            ((0.0, 1.0), FlickDirection::Down),
            ((-1.0, 1.0), FlickDirection::DownLeft),
            ((-1.0, 0.0), FlickDirection::Left),
            ((-1.0, -1.0), FlickDirection::UpLeft),
        ];
        for ((rx, ry), expected) in cases {
            let direction = FlickDirection::resolve(&stick(rx, ry), 0.4).unwrap();
            assert_eq!(direction, expected, "rates ({rx}, {ry})");
        }
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let axes = stick(0.4, 0.0);
        assert_eq!(FlickDirection::resolve(&axes, 0.4).unwrap(), FlickDirection::Center);
        let axes = stick(0.41, 0.0);
        assert_eq!(FlickDirection::resolve(&axes, 0.4).unwrap(), FlickDirection::Right);
    }

    #[test]
    fn confirm_types_the_base_vowel_of_the_row() {
        let mut p = processor();
        // Stick up selects the か row.
        let actions = run(
            &mut p,
            &[press(ButtonType::R)],
            &stick(0.0, -1.0),
            states_of(&[ButtonType::R]),
        );
        assert_eq!(actions, vec![OutAction::text("ka")]);

        // Stick centered selects the あ row.
        let actions = run(
            &mut p,
            &[press(ButtonType::R)],
            &AxisValues::centered(),
            states_of(&[ButtonType::R]),
        );
        assert_eq!(actions, vec![OutAction::text("a")]);
    }

    #[test]
    fn confirm_is_deterministic_for_a_fixed_direction() {
        let mut p = processor();
        let axes = stick(1.0, -1.0); // さ row
        let first = run(&mut p, &[press(ButtonType::R)], &axes, states_of(&[ButtonType::R]));
        run(
            &mut p,
            &[ButtonEvent::new(ButtonType::R, false)],
            &axes,
            ButtonStates::empty(),
        );
        let second = run(&mut p, &[press(ButtonType::R)], &axes, states_of(&[ButtonType::R]));
        assert_eq!(first, second);
        assert_eq!(first, vec![OutAction::text("sa")]);
    }

    #[test]
    fn right_stick_flicks_pick_the_vowel() {
        let mut p = processor();
        let axes = stick(0.0, -1.0); // か row
        let cases = [
            (ButtonType::AnalogRLeft, "ki"),
            (ButtonType::AnalogRUp, "ku"),
            (ButtonType::AnalogRRight, "ke"),
            (ButtonType::AnalogRDown, "ko"),
        ];
        for (button, expected) in cases {
            let actions = run(&mut p, &[press(button)], &axes, states_of(&[button]));
            assert_eq!(actions, vec![OutAction::text(expected)], "{button:?}");
        }
    }

    #[test]
    fn dpad_down_selects_the_wa_row() {
        let mut p = processor();
        let held = states_of(&[ButtonType::Down, ButtonType::R]);
        let actions = run(&mut p, &[press(ButtonType::R)], &AxisValues::centered(), held);
        assert_eq!(actions, vec![OutAction::text("wa")]);

        let held = states_of(&[ButtonType::Down, ButtonType::AnalogRLeft]);
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogRLeft)],
            &AxisValues::centered(),
            held,
        );
        assert_eq!(actions, vec![OutAction::text("wo")]);

        let held = states_of(&[ButtonType::Down, ButtonType::AnalogRUp]);
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogRUp)],
            &AxisValues::centered(),
            held,
        );
        assert_eq!(actions, vec![OutAction::text("nn")]);
    }

    #[test]
    fn dpad_right_selects_punctuation() {
        let mut p = processor();
        let held = states_of(&[ButtonType::Right, ButtonType::R]);
        let actions = run(&mut p, &[press(ButtonType::R)], &AxisValues::centered(), held);
        assert_eq!(actions, vec![OutAction::text(",")]);

        let held = states_of(&[ButtonType::Right, ButtonType::AnalogRDown]);
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogRDown)],
            &AxisValues::centered(),
            held,
        );
        assert_eq!(actions, vec![OutAction::text("~")]);

        // The empty わ-row slot is a no-op, not an error.
        let held = states_of(&[ButtonType::Down, ButtonType::AnalogRDown]);
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogRDown)],
            &AxisValues::centered(),
            held,
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn dakuten_cycle_on_ka_has_period_two() {
        let mut p = processor();
        let axes = stick(0.0, -1.0);
        run(&mut p, &[press(ButtonType::R)], &axes, states_of(&[ButtonType::R])); // "ka"

        let expected = ["ga", "ka", "ga", "ka"];
        for text in expected {
            let actions = run(
                &mut p,
                &[press(ButtonType::Left)],
                &AxisValues::centered(),
                states_of(&[ButtonType::Left]),
            );
            assert_eq!(
                actions,
                vec![OutAction::press("backspace"), OutAction::text(text)]
            );
            run(
                &mut p,
                &[ButtonEvent::new(ButtonType::Left, false)],
                &AxisValues::centered(),
                ButtonStates::empty(),
            );
        }
    }

    #[test]
    fn dakuten_cycle_on_tu_has_period_three() {
        let mut p = processor();
        // た row is stick right; confirm the "u" vowel → "tu".
        let axes = stick(1.0, 0.0);
        let actions = run(
            &mut p,
            &[press(ButtonType::AnalogRUp)],
            &axes,
            states_of(&[ButtonType::AnalogRUp]),
        );
        assert_eq!(actions, vec![OutAction::text("tu")]);

        let expected = ["xtu", "du", "tu", "xtu"];
        for text in expected {
            let actions = run(
                &mut p,
                &[press(ButtonType::Left)],
                &AxisValues::centered(),
                states_of(&[ButtonType::Left]),
            );
            assert_eq!(
                actions,
                vec![OutAction::press("backspace"), OutAction::text(text)]
            );
            run(
                &mut p,
                &[ButtonEvent::new(ButtonType::Left, false)],
                &AxisValues::centered(),
                ButtonStates::empty(),
            );
        }
    }

    #[test]
    fn double_backspace_setting_doubles_the_erase() {
        let mut settings = Settings::default();
        settings.flick_dakuten_double_backspace = true;
        let mut p = FlickProcessor::new(&settings);
        let axes = stick(0.0, -1.0);
        run(&mut p, &[press(ButtonType::R)], &axes, states_of(&[ButtonType::R]));

        let actions = run(
            &mut p,
            &[press(ButtonType::Left)],
            &AxisValues::centered(),
            states_of(&[ButtonType::Left]),
        );
        assert_eq!(
            actions,
            vec![
                OutAction::press("backspace"),
                OutAction::press("backspace"),
                OutAction::text("ga"),
            ]
        );
    }

    #[test]
    fn komoji_cycle_on_bare_vowels() {
        let mut p = processor();
        run(
            &mut p,
            &[press(ButtonType::R)],
            &AxisValues::centered(),
            states_of(&[ButtonType::R]),
        ); // "a"
        let actions = run(
            &mut p,
            &[press(ButtonType::Left)],
            &AxisValues::centered(),
            states_of(&[ButtonType::Left]),
        );
        assert_eq!(
            actions,
            vec![OutAction::press("backspace"), OutAction::text("xa")]
        );
    }

    #[test]
    fn cycle_without_composition_is_a_no_op() {
        let mut p = processor();
        let actions = run(
            &mut p,
            &[press(ButtonType::Left)],
            &AxisValues::centered(),
            states_of(&[ButtonType::Left]),
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn backspace_resets_the_composition() {
        let mut p = processor();
        let axes = stick(0.0, -1.0);
        run(&mut p, &[press(ButtonType::R)], &axes, states_of(&[ButtonType::R]));
        run(
            &mut p,
            &[press(ButtonType::Y)],
            &AxisValues::centered(),
            states_of(&[ButtonType::Y]),
        );
        run(
            &mut p,
            &[ButtonEvent::new(ButtonType::Y, false)],
            &AxisValues::centered(),
            ButtonStates::empty(),
        );
        let actions = run(
            &mut p,
            &[press(ButtonType::Left)],
            &AxisValues::centered(),
            states_of(&[ButtonType::Left]),
        );
        assert!(actions.is_empty(), "cycling after backspace must do nothing");
    }

    #[test]
    fn star_turns_the_dpad_into_arrows() {
        let mut p = processor();
        run(
            &mut p,
            &[press(ButtonType::L)],
            &AxisValues::centered(),
            states_of(&[ButtonType::L]),
        );
        let actions = run(
            &mut p,
            &[press(ButtonType::Left)],
            &AxisValues::centered(),
            states_of(&[ButtonType::L, ButtonType::Left]),
        );
        assert_eq!(actions, vec![OutAction::press("left")]);
    }

    #[test]
    fn editing_keys() {
        let mut p = processor();
        let axes = AxisValues::centered();
        let actions = run(&mut p, &[press(ButtonType::B)], &axes, states_of(&[ButtonType::B]));
        assert_eq!(actions, vec![OutAction::press("space")]);
        let actions = run(&mut p, &[press(ButtonType::A)], &axes, states_of(&[ButtonType::A]));
        assert_eq!(actions, vec![OutAction::press("enter")]);
        let actions = run(&mut p, &[press(ButtonType::X)], &axes, states_of(&[ButtonType::X]));
        assert_eq!(actions, vec![OutAction::press("kanji")]);
    }
}
