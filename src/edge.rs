//! Edge detection between successive button snapshots.

use crate::button::{ButtonEvent, ButtonStates, ButtonType};

/// Diffs each new [`ButtonStates`] snapshot against the last one and emits
/// press/release events for every changed button.
///
/// One instance per device handle; JoyCon pairs keep two independent
/// detectors so the sides can never clobber each other's state. Events are
/// emitted in [`ButtonType::ALL`] declaration order, which keeps output
/// deterministic for a given report sequence.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    prev: ButtonStates,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a new snapshot and return the transitions since the last one.
    pub fn update(&mut self, new: ButtonStates) -> Vec<ButtonEvent> {
        let diff = self.prev.diff(new);
        let mut events = Vec::new();
        if diff != 0 {
            for button in ButtonType::ALL {
                if diff & button.bit() != 0 {
                    events.push(ButtonEvent::new(button, new.get(button)));
                }
            }
        }
        self.prev = new;
        events
    }

    /// Last absorbed snapshot.
    pub fn state(&self) -> ButtonStates {
        self.prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(buttons: &[ButtonType]) -> ButtonStates {
        let mut s = ButtonStates::empty();
        for b in buttons {
            s.set(*b, true);
        }
        s
    }

    #[test]
    fn unchanged_snapshot_emits_nothing() {
        let mut edges = EdgeDetector::new();
        let snap = pressed(&[ButtonType::A, ButtonType::Right]);
        assert_eq!(edges.update(snap).len(), 2);
        assert!(edges.update(snap).is_empty());
        assert!(edges.update(snap).is_empty());
    }

    #[test]
    fn events_follow_declaration_order() {
        let mut edges = EdgeDetector::new();
        let events = edges.update(pressed(&[ButtonType::Right, ButtonType::A]));
        assert_eq!(
            events,
            vec![
                ButtonEvent::new(ButtonType::A, true),
                ButtonEvent::new(ButtonType::Right, true),
            ]
        );
    }

    #[test]
    fn release_is_reported_once() {
        let mut edges = EdgeDetector::new();
        edges.update(pressed(&[ButtonType::Zl]));
        let events = edges.update(ButtonStates::empty());
        assert_eq!(events, vec![ButtonEvent::new(ButtonType::Zl, false)]);
        assert!(edges.update(ButtonStates::empty()).is_empty());
    }

    #[test]
    fn mixed_press_and_release_in_one_tick() {
        let mut edges = EdgeDetector::new();
        edges.update(pressed(&[ButtonType::A]));
        let events = edges.update(pressed(&[ButtonType::Start]));
        assert_eq!(
            events,
            vec![
                ButtonEvent::new(ButtonType::A, false),
                ButtonEvent::new(ButtonType::Start, true),
            ]
        );
    }

    #[test]
    fn detectors_are_independent() {
        let mut left = EdgeDetector::new();
        let mut right = EdgeDetector::new();
        left.update(pressed(&[ButtonType::Zl]));
        assert_eq!(right.update(ButtonStates::empty()).len(), 0);
        assert!(left.state().get(ButtonType::Zl));
        assert!(!right.state().get(ButtonType::Zl));
    }
}
