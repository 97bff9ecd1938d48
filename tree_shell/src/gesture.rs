//! Gesture collaborators.
//!
//! The public interface is a stream of [`GestureSnapshot`]s delivered over
//! an `mpsc` channel.  The shell does not know whether they came from a hand
//! tracker or from the keyboard simulator below.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::trace;
use memory_tree::GestureSnapshot;

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GestureSnapshot`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GestureSnapshot>);
}

/// Spawn a gesture source on its own thread and return the receiving end.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> Receiver<GestureSnapshot> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation input
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the preview window while gesture control is on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
    /// Mouse moved.  `x`/`y` are already normalised to -1.0..=1.0 (y up);
    /// the cursor fields are window pixels.
    HandMoved { x: f32, y: f32, cursor_x: f32, cursor_y: f32 },
}

/// Poses the keyboard can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Fist,        // F
    OpenHand,    // O
    Spread,      // X
    Pinch,       // P
    DoublePinch, // Shift+P
}

/// Folds simulated inputs into whole snapshots.
#[derive(Clone, Debug, Default)]
pub struct SimTracker {
    current: GestureSnapshot,
}

impl SimTracker {
    pub fn new() -> Self { SimTracker::default() }

    pub fn current(&self) -> &GestureSnapshot { &self.current }

    /// Apply one input and return the snapshots to publish, in order.
    /// A double pinch is a one-reading pulse, so it publishes twice: once
    /// with the flag raised and once with it cleared again.
    pub fn apply(&mut self, input: SimInput) -> Vec<GestureSnapshot> {
        let before = self.current;
        match input {
            SimInput::KeyDown(SimKey::DoublePinch) => {
                let mut pulse = self.current;
                pulse.is_double_pinch = true;
                return vec![pulse, self.current];
            }
            SimInput::KeyDown(key) => self.set(key, true),
            SimInput::KeyUp(key)   => self.set(key, false),
            SimInput::HandMoved { x, y, cursor_x, cursor_y } => {
                self.current.hand_x   = x;
                self.current.hand_y   = y;
                self.current.cursor_x = cursor_x;
                self.current.cursor_y = cursor_y;
            }
        }
        if self.current == before { Vec::new() } else { vec![self.current] }
    }

    fn set(&mut self, key: SimKey, down: bool) {
        let g = &mut self.current;
        match key {
            SimKey::Fist        => g.is_fist = down,
            SimKey::OpenHand    => g.is_open_hand = down,
            SimKey::Spread      => g.is_spread = down,
            SimKey::Pinch       => g.is_pinching = down,
            SimKey::DoublePinch => {}
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource
// ════════════════════════════════════════════════════════════════════════════

/// Gesture source driven by [`SimInput`] events from the preview window.
pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
}

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, tx: Sender<GestureSnapshot>) {
        let mut tracker = SimTracker::new();
        for input in self.rx {
            for snapshot in tracker.apply(input) {
                trace!("sim gesture {:?}", snapshot);
                if tx.send(snapshot).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn held_keys_set_and_clear_flags() {
        let mut t = SimTracker::new();
        let out = t.apply(SimInput::KeyDown(SimKey::Fist));
        assert_eq!(out.len(), 1);
        assert!(out[0].is_fist);
        let out = t.apply(SimInput::KeyDown(SimKey::Spread));
        assert!(out[0].is_fist && out[0].is_spread);
        let out = t.apply(SimInput::KeyUp(SimKey::Fist));
        assert!(!out[0].is_fist && out[0].is_spread);
    }

    #[test]
    fn repeated_key_down_publishes_nothing() {
        let mut t = SimTracker::new();
        t.apply(SimInput::KeyDown(SimKey::OpenHand));
        assert!(t.apply(SimInput::KeyDown(SimKey::OpenHand)).is_empty());
    }

    #[test]
    fn double_pinch_is_a_pulse() {
        let mut t = SimTracker::new();
        t.apply(SimInput::KeyDown(SimKey::Pinch));
        let out = t.apply(SimInput::KeyDown(SimKey::DoublePinch));
        assert_eq!(out.len(), 2);
        assert!(out[0].is_double_pinch && out[0].is_pinching);
        assert!(!out[1].is_double_pinch && out[1].is_pinching);
        assert!(!t.current().is_double_pinch);
    }

    #[test]
    fn hand_motion_carries_position() {
        let mut t = SimTracker::new();
        let out = t.apply(SimInput::HandMoved { x: 0.5, y: -0.25, cursor_x: 720.0, cursor_y: 400.0 });
        assert_eq!(out[0].hand_x, 0.5);
        assert_eq!(out[0].hand_y, -0.25);
        assert_eq!(out[0].cursor_x, 720.0);
        assert_eq!(out[0].cursor_y, 400.0);
    }

    #[test]
    fn sim_source_forwards_in_order() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_gesture_source(SimGestureSource { rx: sim_rx });
        sim_tx.send(SimInput::KeyDown(SimKey::Spread)).unwrap();
        sim_tx.send(SimInput::KeyUp(SimKey::Spread)).unwrap();
        drop(sim_tx);

        let first  = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(first.is_spread);
        assert!(!second.is_spread);
        // Source thread exits once its input closes.
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_err());
    }
}
