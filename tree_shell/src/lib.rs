//! # tree_shell
//!
//! Interactive shell around the [`memory_tree`] state core: a preview
//! window, a simulated gesture tracker, upload intake and a background
//! jingle.
//!
//! ## Input → action mapping
//!
//! | Input | Control | Action |
//! |---|---|---|
//! | `G` / `M` | start screen | Start with gesture / mouse control, start music |
//! | Click background | mouse | Next mode: TREE → EXPLODE → CHAOS → TREE |
//! | Click photo | either | Focus it, or release it if already focused |
//! | `Escape` | either | Release focus |
//! | Hold `X` (spread) | gesture | CHAOS |
//! | Hold `F` (fist) | gesture | TREE |
//! | Hold `O` (open hand) | gesture | EXPLODE |
//! | `Shift+P` (double pinch) | gesture | Toggle focus on the first photo |
//! | Mouse position | gesture | Hand x → scene spin, hand y → zoom |
//! | `U` | either | Upload files (paths typed on stdin) onto the next slots |
//! | `N` | either | Mute / unmute |
//! | `Q` | either | Quit |
//!
//! Spread beats fist, and fist beats open hand, when several are held.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod gesture;
pub mod particles;
pub mod scene;
pub mod uploads;
pub mod visualizer;

pub use error::ShellError;
