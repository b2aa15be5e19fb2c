//! Button and axis identities shared by every layer.
//!
//! Buttons are bit flags so a whole controller snapshot fits in one `u64`
//! ([`ButtonStates`]). The analog sticks additionally appear as continuous
//! channels ([`AxisType`]/[`AxisValues`]) normalized to `[0.0, 1.0]` with
//! `0.5` = center.
//!
//! [`ButtonType::ALL`] fixes the declaration order; edge detection walks it so
//! event emission is deterministic across runs.

/// Physical and virtual controller buttons.
///
/// The `ANALOG_*` direction entries are *virtual* buttons derived by
/// thresholding the stick axes in the report decoder; diagonals are set when
/// both component cardinals are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum ButtonType {
    A = 0x01,
    B = 0x02,
    X = 0x04,
    Y = 0x08,
    L = 0x10,
    R = 0x20,
    Zl = 0x40,
    Zr = 0x80,
    Start = 0x100,
    Select = 0x200,
    Up = 0x400,
    Down = 0x800,
    Left = 0x1000,
    Right = 0x2000,
    AnalogLUp = 0x4_0000,
    AnalogLDown = 0x8_0000,
    AnalogLLeft = 0x10_0000,
    AnalogLRight = 0x20_0000,
    AnalogLUpLeft = 0x40_0000,
    AnalogLUpRight = 0x80_0000,
    AnalogLDownLeft = 0x100_0000,
    AnalogLDownRight = 0x200_0000,
    AnalogLPress = 0x400_0000,
    AnalogRUp = 0x800_0000,
    AnalogRDown = 0x1000_0000,
    AnalogRLeft = 0x2000_0000,
    AnalogRRight = 0x4000_0000,
    AnalogRUpLeft = 0x8000_0000,
    AnalogRUpRight = 0x1_0000_0000,
    AnalogRDownLeft = 0x2_0000_0000,
    AnalogRDownRight = 0x4_0000_0000,
    AnalogRPress = 0x8_0000_0000,
}

impl ButtonType {
    /// Every button in declaration order. This order defines event emission
    /// order in [`EdgeDetector`](crate::edge::EdgeDetector).
    pub const ALL: [ButtonType; 32] = [
        ButtonType::A,
        ButtonType::B,
        ButtonType::X,
        ButtonType::Y,
        ButtonType::L,
        ButtonType::R,
        ButtonType::Zl,
        ButtonType::Zr,
        ButtonType::Start,
        ButtonType::Select,
        ButtonType::Up,
        ButtonType::Down,
        ButtonType::Left,
        ButtonType::Right,
        ButtonType::AnalogLUp,
        ButtonType::AnalogLDown,
        ButtonType::AnalogLLeft,
        ButtonType::AnalogLRight,
        ButtonType::AnalogLUpLeft,
        ButtonType::AnalogLUpRight,
        ButtonType::AnalogLDownLeft,
        ButtonType::AnalogLDownRight,
        ButtonType::AnalogLPress,
        ButtonType::AnalogRUp,
        ButtonType::AnalogRDown,
        ButtonType::AnalogRLeft,
        ButtonType::AnalogRRight,
        ButtonType::AnalogRUpLeft,
        ButtonType::AnalogRUpRight,
        ButtonType::AnalogRDownLeft,
        ButtonType::AnalogRDownRight,
        ButtonType::AnalogRPress,
    ];

    /// Bit mask of this button inside a [`ButtonStates`] word.
    #[inline]
    pub const fn bit(self) -> u64 {
        self as u64
    }
}

/// The four continuous analog channels.
///
/// Each is oriented so that larger values mean "more down" or "more right";
/// `0.5` is the stick at rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisType {
    AnalogLDown = 0,
    AnalogLRight = 1,
    AnalogRDown = 2,
    AnalogRRight = 3,
}

impl AxisType {
    pub const ALL: [AxisType; 4] = [
        AxisType::AnalogLDown,
        AxisType::AnalogLRight,
        AxisType::AnalogRDown,
        AxisType::AnalogRRight,
    ];
}

/// One detected button transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: ButtonType,
    /// `true` = pressed, `false` = released.
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn new(button: ButtonType, pressed: bool) -> Self {
        Self { button, pressed }
    }
}

/// Snapshot of every button as a bit set. Absent bits are "released".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonStates(u64);

impl ButtonStates {
    pub const fn empty() -> Self {
        ButtonStates(0)
    }

    #[inline]
    pub fn get(self, button: ButtonType) -> bool {
        self.0 & button.bit() != 0
    }

    #[inline]
    pub fn set(&mut self, button: ButtonType, pressed: bool) {
        if pressed {
            self.0 |= button.bit();
        } else {
            self.0 &= !button.bit();
        }
    }

    /// Bits that differ between two snapshots.
    #[inline]
    pub fn diff(self, other: ButtonStates) -> u64 {
        self.0 ^ other.0
    }

    /// Merge two device snapshots (dual-JoyCon mode).
    #[inline]
    pub fn union(self, other: ButtonStates) -> ButtonStates {
        ButtonStates(self.0 | other.0)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Buttons currently pressed, in declaration order.
    pub fn pressed(self) -> impl Iterator<Item = ButtonType> {
        ButtonType::ALL.into_iter().filter(move |b| self.get(*b))
    }
}

/// Values of the four analog channels; defaults to centered sticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisValues([f32; 4]);

impl Default for AxisValues {
    fn default() -> Self {
        AxisValues([0.5; 4])
    }
}

impl AxisValues {
    pub fn centered() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, axis: AxisType) -> f32 {
        self.0[axis as usize]
    }

    #[inline]
    pub fn set(&mut self, axis: AxisType, value: f32) {
        self.0[axis as usize] = value;
    }

    /// Signed displacement from center in `[-1.0, 1.0]`.
    #[inline]
    pub fn rate(&self, axis: AxisType) -> f32 {
        (self.get(axis) - 0.5) * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_unique() {
        let mut seen = 0u64;
        for b in ButtonType::ALL {
            assert_eq!(seen & b.bit(), 0, "{b:?} overlaps an earlier bit");
            seen |= b.bit();
        }
    }

    #[test]
    fn states_set_and_union() {
        let mut a = ButtonStates::empty();
        a.set(ButtonType::A, true);
        let mut b = ButtonStates::empty();
        b.set(ButtonType::Right, true);

        let merged = a.union(b);
        assert!(merged.get(ButtonType::A));
        assert!(merged.get(ButtonType::Right));
        assert!(!merged.get(ButtonType::B));

        let pressed: Vec<_> = merged.pressed().collect();
        assert_eq!(pressed, vec![ButtonType::A, ButtonType::Right]);
    }

    #[test]
    fn axis_rate_is_signed() {
        let mut axes = AxisValues::centered();
        assert_eq!(axes.rate(AxisType::AnalogLDown), 0.0);
        axes.set(AxisType::AnalogLRight, 1.0);
        assert_eq!(axes.rate(AxisType::AnalogLRight), 1.0);
        axes.set(AxisType::AnalogLRight, 0.0);
        assert_eq!(axes.rate(AxisType::AnalogLRight), -1.0);
    }
}
