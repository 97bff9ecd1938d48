//! # memory_tree
//!
//! State core for the memory tree: a fixed ring of photo slots wound
//! helically around a vertical axis, three display modes, and a single
//! optional focus.  Nothing here renders or classifies gestures; those are
//! collaborators that read [`PhotoSlot`]s and feed [`GestureSnapshot`]s.
//!
//! ## Quick start
//!
//! ```rust
//! use memory_tree::{layout, DisplayMode, ModeController, PhotoSlotStore};
//!
//! let mut store = PhotoSlotStore::new();
//! store.initialize(layout::generate_default(6));
//! store.overwrite_next("blob:memory-tree/1").unwrap();
//! assert_eq!(store.slots()[0].url, "blob:memory-tree/1");
//!
//! let mut modes = ModeController::new();
//! modes.advance_manual();
//! assert_eq!(modes.mode(), DisplayMode::Explode);
//! ```
//!
//! ## Gesture → mode mapping
//!
//! | Snapshot flag | Mode |
//! |---|---|
//! | `is_spread` | Chaos (checked first) |
//! | `is_fist` | Tree |
//! | `is_open_hand` | Explode |
//! | `is_double_pinch` | toggles focus on the first slot |

pub mod error;
pub mod focus;
pub mod gesture;
pub mod layout;
pub mod mode;
pub mod slots;

pub use error::TreeError;
pub use focus::FocusController;
pub use gesture::GestureSnapshot;
pub use layout::{LayoutParams, PhotoSlot, SlotId};
pub use mode::{DisplayMode, InputSource, ModeController};
pub use slots::{Overwrite, PhotoSlotStore};
