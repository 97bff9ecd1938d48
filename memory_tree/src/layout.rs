//! Helical photo layout.
//!
//! Slots are wound once around the trunk, climbing as they go and pulling
//! inward toward the crown so the photos hug the cone of the tree.  The
//! closed form is fixed: renderers and saved scenes depend on these exact
//! coordinates.

use std::f64::consts::PI;

use serde::Deserialize;

/// Stable identity of a photo slot (1-based).
pub type SlotId = u32;

// ════════════════════════════════════════════════════════════════════════════
// PhotoSlot
// ════════════════════════════════════════════════════════════════════════════

/// One fixed position on the tree.  The image shown there (`url`) may
/// change; everything else is set once by the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoSlot {
    pub id:       SlotId,
    pub url:      String,
    pub position: [f64; 3],
    /// Euler angles (x, y, z) in radians.
    pub rotation: [f64; 3],
}

// ════════════════════════════════════════════════════════════════════════════
// LayoutParams
// ════════════════════════════════════════════════════════════════════════════

/// Shape of the helix.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Overall tree height.
    pub height:          f64,
    /// Radius scale at the base of the cone.
    pub radius_base:     f64,
    /// Fraction of `height` the helix climbs over one turn.
    pub height_span:     f64,
    /// Added to every slot's y.
    pub vertical_offset: f64,
    /// Added to every slot's radius so the crown never collapses to the axis.
    pub radial_offset:   f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            height:          10.0,
            radius_base:     3.5,
            height_span:     0.6,
            vertical_offset: -2.0,
            radial_offset:   0.6,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Generation
// ════════════════════════════════════════════════════════════════════════════

/// Placeholder image for a slot that has not received an upload yet.
pub fn placeholder_url(id: SlotId) -> String {
    format!("https://picsum.photos/id/{}/400/400", 15 + id)
}

/// Lay out `n` slots with ids `1..=n`.
pub fn generate(n: usize, params: &LayoutParams) -> Vec<PhotoSlot> {
    (0..n)
        .map(|i| {
            let t      = i as f64 / n as f64;
            let angle  = t * PI * 2.0;
            let y      = t * (params.height * params.height_span) + params.vertical_offset;
            let radius = ((params.height / 2.0 - y) / params.height) * params.radius_base
                + params.radial_offset;
            let id     = i as SlotId + 1;

            PhotoSlot {
                id,
                url:      placeholder_url(id),
                position: [angle.cos() * radius, y, angle.sin() * radius],
                rotation: [0.0, -angle + PI / 2.0, 0.0],
            }
        })
        .collect()
}

/// [`generate`] with [`LayoutParams::default`].
pub fn generate_default(n: usize) -> Vec<PhotoSlot> {
    generate(n, &LayoutParams::default())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
