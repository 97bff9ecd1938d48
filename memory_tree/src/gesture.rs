//! One discrete reading from a hand-tracking collaborator.

/// A full gesture reading.  Every update replaces the previous snapshot
/// wholesale; fields are passed through without validation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureSnapshot {
    pub is_fist:         bool,
    pub is_open_hand:    bool,
    pub is_spread:       bool,
    pub is_pinching:     bool,
    pub is_double_pinch: bool,
    /// Horizontal hand position, -1.0 (left) to 1.0 (right).
    pub hand_x:          f32,
    /// Vertical hand position, -1.0 to 1.0.
    pub hand_y:          f32,
    /// Cursor position in screen pixels.
    pub cursor_x:        f32,
    pub cursor_y:        f32,
}

impl GestureSnapshot {
    /// Scene spin driven by the hand's horizontal position.
    pub fn rotation_proxy(&self) -> f32 { self.hand_x }

    /// Camera dolly driven by the hand's vertical position.
    pub fn zoom_proxy(&self) -> f32 { self.hand_y }

    /// True when any of the three mode-forcing poses is held.
    pub fn has_mode_pose(&self) -> bool {
        self.is_spread || self.is_fist || self.is_open_hand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_neutral() {
        let g = GestureSnapshot::default();
        assert!(!g.has_mode_pose());
        assert!(!g.is_double_pinch);
        assert_eq!(g.rotation_proxy(), 0.0);
        assert_eq!(g.zoom_proxy(), 0.0);
    }

    #[test]
    fn pinches_are_not_mode_poses() {
        let pinch = GestureSnapshot { is_pinching: true, is_double_pinch: true, ..Default::default() };
        assert!(!pinch.has_mode_pose());
        assert!(GestureSnapshot { is_open_hand: true, ..pinch }.has_mode_pose());
    }

    #[test]
    fn proxies_pass_values_through_unclamped() {
        let g = GestureSnapshot { hand_x: 3.5, hand_y: -7.0, ..Default::default() };
        assert_eq!(g.rotation_proxy(), 3.5);
        assert_eq!(g.zoom_proxy(), -7.0);
    }
}
