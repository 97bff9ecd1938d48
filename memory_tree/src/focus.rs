//! Single-photo focus selection.

use crate::layout::SlotId;

/// Tracks which photo, if any, is pulled out for a closer look.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusController {
    focused: Option<SlotId>,
}

impl FocusController {
    pub fn new() -> Self { FocusController::default() }

    pub fn focused(&self) -> Option<SlotId> { self.focused }

    /// Focus `id`, or release it if it is already focused.  Returns the new
    /// focus.
    pub fn select_or_toggle(&mut self, id: SlotId) -> Option<SlotId> {
        self.focused = if self.focused == Some(id) { None } else { Some(id) };
        self.focused
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }
}
