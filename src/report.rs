//! Raw report decoding per device family.
//!
//! `decode` is a pure function from a report buffer to a
//! ([`ButtonStates`], [`AxisValues`]) pair. It owns the bit-level byte layouts
//! for the supported families and the JoyCon stick calibration; it keeps no
//! state of its own beyond the caller-supplied axis threshold.
//!
//! ## Layouts
//! - **DINPUT**: bytes 0–3 = LX, LY, RX, RY as unsigned 8-bit, center `0x80`.
//!   Byte 4 low nibble = 8-way hat code, high nibble = face buttons (see
//!   [`FaceButtonLayout`]). Byte 5 = shoulder/meta bit flags.
//! - **JoyCon** (simple `0x3F`-style input reports): button bit flags plus a
//!   12-bit packed stick pair, left in bytes 6–8, right in bytes 9–11.
//! - **SwitchPro / XInput**: intentionally unimplemented; decoding fails with
//!   [`DecodeError::UnsupportedFamily`] so a misconfiguration can never look
//!   like an idle controller.

use crate::button::{AxisType, AxisValues, ButtonStates, ButtonType};
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Device family tag selecting a report layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceFamily {
    Dinput,
    Xinput,
    JoyConLeft,
    JoyConRight,
    SwitchPro,
}

/// Face button assignment of the DINPUT byte-4 high nibble.
///
/// Two otherwise-identical pads in the wild disagree on this ordering, so it
/// is a named profile rather than a silent merge. `Xaby` is the Logitech
/// Dual Action ordering (button 1 = X) and the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaceButtonLayout {
    /// 0x10=X, 0x20=A, 0x40=B, 0x80=Y.
    #[default]
    Xaby,
    /// 0x10=Y, 0x20=B, 0x40=A, 0x80=X.
    Ybax,
}

impl FaceButtonLayout {
    fn buttons(self) -> [ButtonType; 4] {
        match self {
            FaceButtonLayout::Xaby => {
                [ButtonType::X, ButtonType::A, ButtonType::B, ButtonType::Y]
            }
            FaceButtonLayout::Ybax => {
                [ButtonType::Y, ButtonType::B, ButtonType::A, ButtonType::X]
            }
        }
    }
}

/// Calibrated raw stick range: values outside `[min, max]` are clamped.
struct StickCal {
    min: u16,
    center: u16,
    max: u16,
}

// Raw 12-bit stick calibration. Factory calibration varies per unit; these
// are representative values captured from real JoyCons.
const JOYCON_L_CAL_H: StickCal = StickCal { min: 0x2E0, center: 0x7E8, max: 0xD40 };
const JOYCON_L_CAL_V: StickCal = StickCal { min: 0x2B0, center: 0x7B0, max: 0xC90 };
const JOYCON_R_CAL_H: StickCal = StickCal { min: 0x2C0, center: 0x7A0, max: 0xCD0 };
const JOYCON_R_CAL_V: StickCal = StickCal { min: 0x300, center: 0x800, max: 0xD20 };

impl StickCal {
    /// Map a raw stick sample to a rate in `[-1.0, 1.0]` around center.
    fn rate(&self, raw: u16) -> f32 {
        if raw >= self.center {
            let span = (self.max - self.center) as f32;
            (((raw - self.center) as f32) / span).min(1.0)
        } else {
            let span = (self.center - self.min) as f32;
            -((((self.center - raw) as f32) / span).min(1.0))
        }
    }
}

/// Which stick a set of virtual direction buttons belongs to.
#[derive(Clone, Copy)]
enum Stick {
    Left,
    Right,
}

impl Stick {
    fn cardinals(self) -> [ButtonType; 4] {
        // up, down, left, right
        match self {
            Stick::Left => [
                ButtonType::AnalogLUp,
                ButtonType::AnalogLDown,
                ButtonType::AnalogLLeft,
                ButtonType::AnalogLRight,
            ],
            Stick::Right => [
                ButtonType::AnalogRUp,
                ButtonType::AnalogRDown,
                ButtonType::AnalogRLeft,
                ButtonType::AnalogRRight,
            ],
        }
    }

    fn diagonals(self) -> [ButtonType; 4] {
        // up-left, up-right, down-left, down-right
        match self {
            Stick::Left => [
                ButtonType::AnalogLUpLeft,
                ButtonType::AnalogLUpRight,
                ButtonType::AnalogLDownLeft,
                ButtonType::AnalogLDownRight,
            ],
            Stick::Right => [
                ButtonType::AnalogRUpLeft,
                ButtonType::AnalogRUpRight,
                ButtonType::AnalogRDownLeft,
                ButtonType::AnalogRDownRight,
            ],
        }
    }
}

/// Set the virtual direction buttons of one stick from signed rates.
///
/// A cardinal is pressed when its rate strictly exceeds `threshold`; the rate
/// exactly at the threshold is the non-pressed side. Diagonals are pressed
/// when both component cardinals are.
fn set_stick_buttons(
    states: &mut ButtonStates,
    stick: Stick,
    right_rate: f32,
    down_rate: f32,
    threshold: f32,
) {
    let up = -down_rate > threshold;
    let down = down_rate > threshold;
    let left = -right_rate > threshold;
    let right = right_rate > threshold;

    let [b_up, b_down, b_left, b_right] = stick.cardinals();
    states.set(b_up, up);
    states.set(b_down, down);
    states.set(b_left, left);
    states.set(b_right, right);

    let [b_ul, b_ur, b_dl, b_dr] = stick.diagonals();
    states.set(b_ul, up && left);
    states.set(b_ur, up && right);
    states.set(b_dl, down && left);
    states.set(b_dr, down && right);
}

fn require(raw: &[u8], need: usize) -> Result<(), DecodeError> {
    if raw.len() < need {
        return Err(DecodeError::MalformedReport { len: raw.len(), need });
    }
    Ok(())
}

/// Decode one raw report into a button snapshot and axis values.
///
/// `axis_threshold` is the fraction of half-range a stick must deviate from
/// center before its virtual direction buttons engage.
///
/// # Errors
///
/// [`DecodeError::MalformedReport`] when the buffer is shorter than the
/// family's layout, [`DecodeError::UnsupportedFamily`] for SwitchPro/XInput.
pub fn decode(
    raw: &[u8],
    family: DeviceFamily,
    layout: FaceButtonLayout,
    axis_threshold: f32,
) -> Result<(ButtonStates, AxisValues), DecodeError> {
    match family {
        DeviceFamily::Dinput => decode_dinput(raw, layout, axis_threshold),
        DeviceFamily::JoyConLeft => decode_joycon_left(raw, axis_threshold),
        DeviceFamily::JoyConRight => decode_joycon_right(raw, axis_threshold),
        DeviceFamily::SwitchPro | DeviceFamily::Xinput => {
            Err(DecodeError::UnsupportedFamily(family))
        }
    }
}

const DINPUT_REPORT_LEN: usize = 6;
const JOYCON_LEFT_REPORT_LEN: usize = 9;
const JOYCON_RIGHT_REPORT_LEN: usize = 12;

fn decode_dinput(
    raw: &[u8],
    layout: FaceButtonLayout,
    axis_threshold: f32,
) -> Result<(ButtonStates, AxisValues), DecodeError> {
    require(raw, DINPUT_REPORT_LEN)?;

    let mut states = ButtonStates::empty();
    let mut axes = AxisValues::centered();

    // Bytes 0-3: LX, LY, RX, RY; u8 with 0x80 at rest.
    let u8_rate = |v: u8| (v as f32 - 128.0) / 128.0;
    set_stick_buttons(&mut states, Stick::Left, u8_rate(raw[0]), u8_rate(raw[1]), axis_threshold);
    set_stick_buttons(&mut states, Stick::Right, u8_rate(raw[2]), u8_rate(raw[3]), axis_threshold);

    axes.set(AxisType::AnalogLRight, raw[0] as f32 / 255.0);
    axes.set(AxisType::AnalogLDown, raw[1] as f32 / 255.0);
    axes.set(AxisType::AnalogRRight, raw[2] as f32 / 255.0);
    axes.set(AxisType::AnalogRDown, raw[3] as f32 / 255.0);

    // Byte 4 low nibble: hat code 0=UP .. 7=UP-LEFT, anything else neutral.
    // Diagonal codes set both component cardinals.
    let hat = raw[4] & 0x0F;
    states.set(ButtonType::Up, matches!(hat, 7 | 0 | 1));
    states.set(ButtonType::Right, matches!(hat, 1 | 2 | 3));
    states.set(ButtonType::Down, matches!(hat, 3 | 4 | 5));
    states.set(ButtonType::Left, matches!(hat, 5 | 6 | 7));

    // Byte 4 high nibble: face buttons per the configured profile.
    let face = layout.buttons();
    for (i, button) in face.into_iter().enumerate() {
        states.set(button, raw[4] & (0x10 << i) != 0);
    }

    // Byte 5: shoulder and meta buttons.
    states.set(ButtonType::L, raw[5] & 0x01 != 0);
    states.set(ButtonType::R, raw[5] & 0x02 != 0);
    states.set(ButtonType::Zl, raw[5] & 0x04 != 0);
    states.set(ButtonType::Zr, raw[5] & 0x08 != 0);
    states.set(ButtonType::Select, raw[5] & 0x10 != 0);
    states.set(ButtonType::Start, raw[5] & 0x20 != 0);
    states.set(ButtonType::AnalogLPress, raw[5] & 0x40 != 0);
    states.set(ButtonType::AnalogRPress, raw[5] & 0x80 != 0);

    Ok((states, axes))
}

/// Unpack the 12-bit stick pair used by JoyCon input reports.
fn unpack_stick(raw: &[u8]) -> (u16, u16) {
    let horizontal = raw[0] as u16 | ((raw[1] as u16 & 0x0F) << 8);
    let vertical = (raw[1] as u16 >> 4) | ((raw[2] as u16) << 4);
    (horizontal, vertical)
}

fn decode_joycon_left(
    raw: &[u8],
    axis_threshold: f32,
) -> Result<(ButtonStates, AxisValues), DecodeError> {
    require(raw, JOYCON_LEFT_REPORT_LEN)?;

    let mut states = ButtonStates::empty();
    let mut axes = AxisValues::centered();

    states.set(ButtonType::Select, raw[4] & 0x01 != 0);
    states.set(ButtonType::AnalogLPress, raw[4] & 0x08 != 0);

    states.set(ButtonType::Down, raw[5] & 0x01 != 0);
    states.set(ButtonType::Up, raw[5] & 0x02 != 0);
    states.set(ButtonType::Right, raw[5] & 0x04 != 0);
    states.set(ButtonType::Left, raw[5] & 0x08 != 0);
    states.set(ButtonType::L, raw[5] & 0x40 != 0);
    states.set(ButtonType::Zl, raw[5] & 0x80 != 0);

    let (h, v) = unpack_stick(&raw[6..9]);
    let right_rate = JOYCON_L_CAL_H.rate(h);
    // Raw vertical grows upward; our axis convention is down-positive.
    let down_rate = -JOYCON_L_CAL_V.rate(v);
    set_stick_buttons(&mut states, Stick::Left, right_rate, down_rate, axis_threshold);
    axes.set(AxisType::AnalogLRight, 0.5 + right_rate / 2.0);
    axes.set(AxisType::AnalogLDown, 0.5 + down_rate / 2.0);

    Ok((states, axes))
}

fn decode_joycon_right(
    raw: &[u8],
    axis_threshold: f32,
) -> Result<(ButtonStates, AxisValues), DecodeError> {
    require(raw, JOYCON_RIGHT_REPORT_LEN)?;

    let mut states = ButtonStates::empty();
    let mut axes = AxisValues::centered();

    states.set(ButtonType::Y, raw[3] & 0x01 != 0);
    states.set(ButtonType::X, raw[3] & 0x02 != 0);
    states.set(ButtonType::B, raw[3] & 0x04 != 0);
    states.set(ButtonType::A, raw[3] & 0x08 != 0);
    states.set(ButtonType::R, raw[3] & 0x40 != 0);
    states.set(ButtonType::Zr, raw[3] & 0x80 != 0);

    states.set(ButtonType::Start, raw[4] & 0x02 != 0);
    states.set(ButtonType::AnalogRPress, raw[4] & 0x04 != 0);

    let (h, v) = unpack_stick(&raw[9..12]);
    let right_rate = JOYCON_R_CAL_H.rate(h);
    let down_rate = -JOYCON_R_CAL_V.rate(v);
    set_stick_buttons(&mut states, Stick::Right, right_rate, down_rate, axis_threshold);
    axes.set(AxisType::AnalogRRight, 0.5 + right_rate / 2.0);
    axes.set(AxisType::AnalogRDown, 0.5 + down_rate / 2.0);

    Ok((states, axes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f32 = 0.5;

    fn dinput(raw: &[u8]) -> (ButtonStates, AxisValues) {
        decode(raw, DeviceFamily::Dinput, FaceButtonLayout::Xaby, T).unwrap()
    }

    fn neutral_dinput() -> [u8; 8] {
        [0x80, 0x80, 0x80, 0x80, 0x08, 0x00, 0x00, 0x00]
    }

    #[test]
    fn short_report_is_malformed() {
        let err = decode(&[0u8; 4], DeviceFamily::Dinput, FaceButtonLayout::Xaby, T);
        assert_eq!(err, Err(DecodeError::MalformedReport { len: 4, need: 6 }));

        let err = decode(&[0u8; 8], DeviceFamily::JoyConRight, FaceButtonLayout::Xaby, T);
        assert_eq!(err, Err(DecodeError::MalformedReport { len: 8, need: 12 }));
    }

    #[test]
    fn unsupported_families_fail_loudly() {
        for family in [DeviceFamily::SwitchPro, DeviceFamily::Xinput] {
            let err = decode(&[0u8; 64], family, FaceButtonLayout::Xaby, T);
            assert_eq!(err, Err(DecodeError::UnsupportedFamily(family)));
        }
    }

    #[test]
    fn dinput_neutral_is_empty() {
        let (states, axes) = dinput(&neutral_dinput());
        assert_eq!(states, ButtonStates::empty());
        for axis in AxisType::ALL {
            assert!((axes.get(axis) - 0.5).abs() < 0.01);
        }
    }

    #[test]
    fn dinput_face_buttons_follow_layout() {
        let mut raw = neutral_dinput();
        raw[4] = 0x28; // hat neutral (8) + face bit 0x20
        let (states, _) = dinput(&raw);
        assert!(states.get(ButtonType::A));
        assert!(!states.get(ButtonType::B));

        let (states, _) =
            decode(&raw, DeviceFamily::Dinput, FaceButtonLayout::Ybax, T).unwrap();
        assert!(states.get(ButtonType::B));
        assert!(!states.get(ButtonType::A));
    }

    #[test]
    fn dinput_hat_codes_overlap_on_diagonals() {
        let mut raw = neutral_dinput();
        raw[4] = 0x01; // up-right
        let (states, _) = dinput(&raw);
        assert!(states.get(ButtonType::Up));
        assert!(states.get(ButtonType::Right));
        assert!(!states.get(ButtonType::Down));
        assert!(!states.get(ButtonType::Left));

        raw[4] = 0x06; // left
        let (states, _) = dinput(&raw);
        assert!(states.get(ButtonType::Left));
        assert!(!states.get(ButtonType::Up));
    }

    #[test]
    fn dinput_meta_byte_flags() {
        let mut raw = neutral_dinput();
        raw[5] = 0xFF;
        let (states, _) = dinput(&raw);
        for button in [
            ButtonType::L,
            ButtonType::R,
            ButtonType::Zl,
            ButtonType::Zr,
            ButtonType::Select,
            ButtonType::Start,
            ButtonType::AnalogLPress,
            ButtonType::AnalogRPress,
        ] {
            assert!(states.get(button), "{button:?} should be pressed");
        }
    }

    #[test]
    fn axis_boundary_is_exclusive() {
        // threshold 0.5 of half-range 128 => deviation must exceed 64.
        let mut raw = neutral_dinput();

        raw[0] = 0x80 + 64; // exactly at the boundary: not pressed
        let (states, _) = dinput(&raw);
        assert!(!states.get(ButtonType::AnalogLRight));

        raw[0] = 0x80 + 65; // strictly beyond: pressed
        let (states, _) = dinput(&raw);
        assert!(states.get(ButtonType::AnalogLRight));

        raw[0] = 0x80 - 64;
        let (states, _) = dinput(&raw);
        assert!(!states.get(ButtonType::AnalogLLeft));

        raw[0] = 0x80 - 65;
        let (states, _) = dinput(&raw);
        assert!(states.get(ButtonType::AnalogLLeft));
    }

    #[test]
    fn dinput_stick_diagonal_sets_cardinals_and_diagonal() {
        let mut raw = neutral_dinput();
        raw[2] = 0xFF; // right stick full right
        raw[3] = 0x00; // full up
        let (states, _) = dinput(&raw);
        assert!(states.get(ButtonType::AnalogRRight));
        assert!(states.get(ButtonType::AnalogRUp));
        assert!(states.get(ButtonType::AnalogRUpRight));
        assert!(!states.get(ButtonType::AnalogRDown));
    }

    fn joycon_left_report(b4: u8, b5: u8, h: u16, v: u16) -> [u8; 12] {
        let mut raw = [0u8; 12];
        raw[4] = b4;
        raw[5] = b5;
        raw[6] = (h & 0xFF) as u8;
        raw[7] = ((h >> 8) & 0x0F) as u8 | ((v & 0x0F) << 4) as u8;
        raw[8] = (v >> 4) as u8;
        raw
    }

    #[test]
    fn joycon_left_buttons() {
        let raw = joycon_left_report(0x09, 0xC3, JOYCON_L_CAL_H.center, JOYCON_L_CAL_V.center);
        let (states, _) =
            decode(&raw, DeviceFamily::JoyConLeft, FaceButtonLayout::Xaby, T).unwrap();
        assert!(states.get(ButtonType::Select));
        assert!(states.get(ButtonType::AnalogLPress));
        assert!(states.get(ButtonType::Down));
        assert!(states.get(ButtonType::Up));
        assert!(states.get(ButtonType::L));
        assert!(states.get(ButtonType::Zl));
        assert!(!states.get(ButtonType::Right));
    }

    #[test]
    fn joycon_left_stick_full_deflection() {
        let raw = joycon_left_report(0, 0, JOYCON_L_CAL_H.max, JOYCON_L_CAL_V.center);
        let (states, axes) =
            decode(&raw, DeviceFamily::JoyConLeft, FaceButtonLayout::Xaby, T).unwrap();
        assert!(states.get(ButtonType::AnalogLRight));
        assert!((axes.get(AxisType::AnalogLRight) - 1.0).abs() < 1e-6);
        assert!((axes.get(AxisType::AnalogLDown) - 0.5).abs() < 1e-6);

        // Raw vertical at max means stick up, which is a low "down" axis value.
        let raw = joycon_left_report(0, 0, JOYCON_L_CAL_H.center, JOYCON_L_CAL_V.max);
        let (states, axes) =
            decode(&raw, DeviceFamily::JoyConLeft, FaceButtonLayout::Xaby, T).unwrap();
        assert!(states.get(ButtonType::AnalogLUp));
        assert!(axes.get(AxisType::AnalogLDown) < 0.01);
    }

    #[test]
    fn joycon_right_buttons_and_stick() {
        let mut raw = [0u8; 12];
        raw[3] = 0x0F | 0x40 | 0x80; // Y X B A R ZR
        raw[4] = 0x06; // START + stick press
        let h = JOYCON_R_CAL_H.min;
        let v = JOYCON_R_CAL_V.center;
        raw[9] = (h & 0xFF) as u8;
        raw[10] = ((h >> 8) & 0x0F) as u8 | ((v & 0x0F) << 4) as u8;
        raw[11] = (v >> 4) as u8;

        let (states, axes) =
            decode(&raw, DeviceFamily::JoyConRight, FaceButtonLayout::Xaby, T).unwrap();
        for button in [
            ButtonType::A,
            ButtonType::B,
            ButtonType::X,
            ButtonType::Y,
            ButtonType::R,
            ButtonType::Zr,
            ButtonType::Start,
            ButtonType::AnalogRPress,
        ] {
            assert!(states.get(button), "{button:?} should be pressed");
        }
        assert!(states.get(ButtonType::AnalogRLeft));
        assert!(axes.get(AxisType::AnalogRRight) < 0.01);
    }

    #[test]
    fn stick_rate_clamps_outside_calibration() {
        assert_eq!(JOYCON_L_CAL_H.rate(0x000), -1.0);
        assert_eq!(JOYCON_L_CAL_H.rate(0xFFF), 1.0);
        assert_eq!(JOYCON_L_CAL_H.rate(JOYCON_L_CAL_H.center), 0.0);
    }
}
