//! Display-mode state machine.
//!
//! Two mutually exclusive input sources drive the mode.  With a pointer,
//! each background click steps Tree → Explode → Chaos → Tree.  With gesture
//! control, held poses set the mode outright.  Whichever source is inactive
//! is ignored entirely.

use std::fmt;

use log::debug;

use crate::gesture::GestureSnapshot;

// ════════════════════════════════════════════════════════════════════════════
// DisplayMode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Photos and particles wound into the tree.
    #[default]
    Tree,
    /// Everything blown outward from the trunk.
    Explode,
    /// Everything scattered.
    Chaos,
}

impl DisplayMode {
    /// Next mode in the manual cycle.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Tree    => DisplayMode::Explode,
            DisplayMode::Explode => DisplayMode::Chaos,
            DisplayMode::Chaos   => DisplayMode::Tree,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Tree    => "TREE",
            DisplayMode::Explode => "EXPLODE",
            DisplayMode::Chaos   => "CHAOS",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InputSource
// ════════════════════════════════════════════════════════════════════════════

/// Which input currently owns mode changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputSource {
    #[default]
    Pointer,
    Gesture,
}

// ════════════════════════════════════════════════════════════════════════════
// ModeController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeController {
    mode:   DisplayMode,
    source: InputSource,
}

impl ModeController {
    pub fn new() -> Self { ModeController::default() }

    pub fn mode(&self) -> DisplayMode { self.mode }

    pub fn input_source(&self) -> InputSource { self.source }

    pub fn gesture_enabled(&self) -> bool { self.source == InputSource::Gesture }

    pub fn set_input_source(&mut self, source: InputSource) {
        self.source = source;
    }

    /// Step to the next mode.  Returns false (and does nothing) while
    /// gestures own the mode.
    pub fn advance_manual(&mut self) -> bool {
        if self.gesture_enabled() {
            return false;
        }
        self.mode = self.mode.next();
        debug!("mode advanced to {}", self.mode);
        true
    }

    /// Force the mode from a held pose.  Spread wins over fist, fist over
    /// open hand; at most one of them applies.  Returns the mode that was
    /// set, or `None` when the snapshot was ignored or carried no pose.
    pub fn apply_gesture(&mut self, snapshot: &GestureSnapshot) -> Option<DisplayMode> {
        if !self.gesture_enabled() || !snapshot.has_mode_pose() {
            return None;
        }
        let target = if snapshot.is_spread {
            DisplayMode::Chaos
        } else if snapshot.is_fist {
            DisplayMode::Tree
        } else {
            DisplayMode::Explode
        };
        if target != self.mode {
            debug!("gesture set mode {} -> {}", self.mode, target);
        }
        self.mode = target;
        Some(target)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DisplayMode; 3] = [DisplayMode::Tree, DisplayMode::Explode, DisplayMode::Chaos];

    fn gesture_controller(start: DisplayMode) -> ModeController {
        let mut m = ModeController { mode: start, source: InputSource::Pointer };
        m.set_input_source(InputSource::Gesture);
        m
    }

    fn pose(spread: bool, fist: bool, open: bool) -> GestureSnapshot {
        GestureSnapshot {
            is_spread: spread,
            is_fist: fist,
            is_open_hand: open,
            ..Default::default()
        }
    }

    #[test]
    fn starts_in_tree_with_pointer() {
        let m = ModeController::new();
        assert_eq!(m.mode(), DisplayMode::Tree);
        assert_eq!(m.input_source(), InputSource::Pointer);
    }

    #[test]
    fn three_manual_advances_cycle_back() {
        let mut m = ModeController::new();
        assert!(m.advance_manual());
        assert_eq!(m.mode(), DisplayMode::Explode);
        m.advance_manual();
        assert_eq!(m.mode(), DisplayMode::Chaos);
        m.advance_manual();
        assert_eq!(m.mode(), DisplayMode::Tree);
    }

    #[test]
    fn spread_forces_chaos_from_any_mode() {
        for start in ALL {
            let mut m = gesture_controller(start);
            assert_eq!(m.apply_gesture(&pose(true, false, false)), Some(DisplayMode::Chaos));
            assert_eq!(m.mode(), DisplayMode::Chaos);
        }
    }

    #[test]
    fn fist_and_open_hand_are_absolute() {
        for start in ALL {
            let mut m = gesture_controller(start);
            m.apply_gesture(&pose(false, true, false));
            assert_eq!(m.mode(), DisplayMode::Tree);
            m.apply_gesture(&pose(false, false, true));
            assert_eq!(m.mode(), DisplayMode::Explode);
            m.apply_gesture(&pose(false, false, true));
            assert_eq!(m.mode(), DisplayMode::Explode);
        }
    }

    #[test]
    fn priority_spread_then_fist_then_open() {
        let mut m = gesture_controller(DisplayMode::Explode);
        m.apply_gesture(&pose(true, true, false));
        assert_eq!(m.mode(), DisplayMode::Chaos);
        m.apply_gesture(&pose(true, true, true));
        assert_eq!(m.mode(), DisplayMode::Chaos);
        m.apply_gesture(&pose(false, true, true));
        assert_eq!(m.mode(), DisplayMode::Tree);
    }

    #[test]
    fn no_pose_leaves_mode_unchanged() {
        for start in ALL {
            let mut m = gesture_controller(start);
            let snap = GestureSnapshot { is_pinching: true, hand_x: 0.4, ..Default::default() };
            assert_eq!(m.apply_gesture(&snap), None);
            assert_eq!(m.mode(), start);
        }
    }

    #[test]
    fn gestures_ignored_with_pointer_input() {
        let mut m = ModeController::new();
        m.advance_manual();
        assert_eq!(m.apply_gesture(&pose(false, true, false)), None);
        assert_eq!(m.mode(), DisplayMode::Explode);
    }

    #[test]
    fn manual_advance_ignored_with_gesture_input() {
        let mut m = gesture_controller(DisplayMode::Tree);
        assert!(!m.advance_manual());
        assert_eq!(m.mode(), DisplayMode::Tree);
    }

    #[test]
    fn display_names() {
        assert_eq!(DisplayMode::Chaos.to_string(), "CHAOS");
        assert_eq!(DisplayMode::Tree.next().name(), "EXPLODE");
    }
}
