//! Read-only views handed to collaborators, and the preview's animation
//! state.
//!
//! `SceneProps` and `OverlayProps` are rebuilt from the shell every frame;
//! collaborators never hold on to them.  `SceneAnimator` is the renderer's
//! own bookkeeping: it eases photos and particles toward wherever the
//! current mode wants them.

use memory_tree::{DisplayMode, GestureSnapshot, PhotoSlot, SlotId};

use crate::particles::{mode_target, ParticleData};

// ════════════════════════════════════════════════════════════════════════════
// Props
// ════════════════════════════════════════════════════════════════════════════

/// What the rendering collaborator sees.
#[derive(Clone, Copy, Debug)]
pub struct SceneProps<'a> {
    pub mode:           DisplayMode,
    pub focused_id:     Option<SlotId>,
    pub rotation_proxy: f32,
    pub zoom_proxy:     f32,
    pub slots:          &'a [PhotoSlot],
}

/// What the UI collaborator sees.
#[derive(Clone, Debug)]
pub struct OverlayProps<'a> {
    pub started:         bool,
    pub muted:           bool,
    pub gesture:         &'a GestureSnapshot,
    pub gesture_enabled: bool,
    pub upload_cursor:   u64,
    /// Background clicks advance the mode.
    pub clickable:       bool,
    /// Shown under the focused photo.
    pub focus_caption:   Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// A point after projection to window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x:     f32,
    pub y:     f32,
    pub depth: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

/// Orbiting pinhole camera looking at the trunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub yaw:      f32,
    pub distance: f32,
    /// World y the camera looks at.
    pub target_y: f32,
    pub focal:    f32,
}

const NEAR: f32 = 0.5;

impl Camera {
    pub fn project(&self, p: [f32; 3], width: usize, height: usize) -> Option<Projected> {
        let (s, c) = self.yaw.sin_cos();
        let x = p[0] * c - p[2] * s;
        let z = p[0] * s + p[2] * c + self.distance;
        if z < NEAR {
            return None;
        }
        let scale = self.focal / z;
        Some(Projected {
            x:     width as f32 / 2.0 + x * scale,
            y:     height as f32 / 2.0 - (p[1] - self.target_y) * scale,
            depth: z,
            scale,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneAnimator
// ════════════════════════════════════════════════════════════════════════════

/// Fraction of the remaining distance covered each frame.
const EASE: f32 = 0.08;
/// Idle spin per frame, radians.
const IDLE_SPIN: f32 = 0.004;
/// Offsets photo seeds so they do not share chaos spots with particles.
const PHOTO_SEED_BASE: u64 = 1 << 32;

pub struct SceneAnimator {
    photos:       Vec<[f32; 3]>,
    particles:    Vec<ParticleData>,
    particle_pos: Vec<[f32; 3]>,
    spin:         f32,
    zoom:         f32,
    time:         f32,
    focal:        f32,
}

impl SceneAnimator {
    pub fn new(particles: Vec<ParticleData>, focal: f32) -> Self {
        let particle_pos = particles.iter().map(|p| p.position).collect();
        SceneAnimator {
            photos: Vec::new(),
            particles,
            particle_pos,
            spin: 0.0,
            zoom: 0.0,
            time: 0.0,
            focal,
        }
    }

    /// Advance one frame toward the state described by `scene`.
    pub fn tick(&mut self, scene: &SceneProps) {
        if self.photos.len() != scene.slots.len() {
            self.photos = scene.slots.iter().map(|s| to_f32(s.position)).collect();
        }
        for (cur, slot) in self.photos.iter_mut().zip(scene.slots) {
            let target = mode_target(to_f32(slot.position), PHOTO_SEED_BASE + slot.id as u64, scene.mode);
            ease(cur, target);
        }
        for (cur, p) in self.particle_pos.iter_mut().zip(&self.particles) {
            ease(cur, mode_target(p.position, p.id as u64, scene.mode));
        }

        self.spin = (self.spin + IDLE_SPIN + scene.rotation_proxy * 0.04) % std::f32::consts::TAU;
        self.zoom += (scene.zoom_proxy - self.zoom) * EASE;
        self.time += 1.0 / 60.0;
    }

    /// Current photo positions, indexed like the slots.
    pub fn photo_positions(&self) -> &[[f32; 3]] { &self.photos }

    pub fn particles(&self) -> impl Iterator<Item = (&ParticleData, [f32; 3])> {
        self.particles.iter().zip(self.particle_pos.iter().copied())
    }

    /// Seconds of animation so far.
    pub fn time(&self) -> f32 { self.time }

    pub fn camera(&self) -> Camera {
        Camera {
            yaw:      self.spin,
            distance: 16.0 - self.zoom * 6.0,
            target_y: 0.5,
            focal:    self.focal,
        }
    }
}

fn to_f32(p: [f64; 3]) -> [f32; 3] {
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

fn ease(cur: &mut [f32; 3], target: [f32; 3]) {
    for (c, t) in cur.iter_mut().zip(target) {
        *c += (t - *c) * EASE;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
