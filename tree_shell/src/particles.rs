//! Particle field and palette for the preview renderer.
//!
//! Leaves and ornaments are scattered over the cone of the tree once, from
//! a fixed seed, so every run draws the same tree.  Per-mode targets move
//! them (and the photos) between the tree, an exploded shell and a loose
//! cloud.

use memory_tree::DisplayMode;

// ════════════════════════════════════════════════════════════════════════════
// Theme
// ════════════════════════════════════════════════════════════════════════════

pub mod theme {
    pub const BG:             u32 = 0xFF050103;
    pub const PARTICLE_PINK:  u32 = 0xFFFF69B4;
    pub const PARTICLE_BLUE:  u32 = 0xFF00BFFF;
    pub const STAR_GOLD:      u32 = 0xFFF0E68C;
    pub const ACCENT:         u32 = 0xFFFF1493;
}

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
pub fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    pack_rgb(r, g, b)
}

fn pack_rgb(r: f32, g: f32, b: f32) -> u32 {
    let c = |x: f32| (x.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF000000 | (c(r) << 16) | (c(g) << 8) | c(b)
}

/// Blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |c: u32, shift: u32| ((c >> shift) & 0xFF) as f32 / 255.0;
    let mix = |shift: u32| ch(a, shift) * (1.0 - t) + ch(b, shift) * t;
    pack_rgb(mix(16), mix(8), mix(0))
}

/// Scale a color's brightness (depth fog).
pub fn dim(c: u32, k: f32) -> u32 {
    blend(theme::BG, c, k)
}

// ════════════════════════════════════════════════════════════════════════════
// Deterministic noise
// ════════════════════════════════════════════════════════════════════════════

/// SplitMix64 step, good enough for scattering particles reproducibly.
pub fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Uniform value in [0, 1) for `(seed, salt)`.
pub fn unit(seed: u64, salt: u64) -> f32 {
    (mix64(seed.wrapping_mul(0x100000001B3) ^ salt) >> 40) as f32 / (1u64 << 24) as f32
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleData
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind { Leaf, Ornament }

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleData {
    pub id:       u32,
    /// Resting position on the tree.
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale:    f32,
    pub color:    u32,
    /// Twinkle rate.
    pub speed:    f32,
    pub phase:    f32,
    pub kind:     ParticleKind,
}

/// Every seventh particle is an ornament.
const ORNAMENT_EVERY: u32 = 7;

/// Scatter `count` particles over the tree cone.
pub fn generate_field(count: usize) -> Vec<ParticleData> {
    (0..count as u32)
        .map(|id| {
            let seed   = id as u64;
            let t      = unit(seed, 1);
            let angle  = unit(seed, 2) * std::f32::consts::TAU;
            let y      = -4.0 + t * 9.0;
            let radius = (1.0 - t) * 4.2 * (0.75 + 0.25 * unit(seed, 3));
            let kind   = if id % ORNAMENT_EVERY == 0 { ParticleKind::Ornament } else { ParticleKind::Leaf };
            let color  = match kind {
                ParticleKind::Leaf     => blend(theme::PARTICLE_PINK, theme::PARTICLE_BLUE, unit(seed, 4)),
                ParticleKind::Ornament => if id % 2 == 0 { theme::STAR_GOLD } else { theme::ACCENT },
            };
            ParticleData {
                id,
                position: [angle.cos() * radius, y, angle.sin() * radius],
                rotation: [0.0, angle, 0.0],
                scale:    match kind { ParticleKind::Leaf => 1.0, ParticleKind::Ornament => 2.0 },
                color,
                speed:    0.5 + unit(seed, 5) * 2.0,
                phase:    unit(seed, 6) * std::f32::consts::TAU,
                kind,
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Mode targets
// ════════════════════════════════════════════════════════════════════════════

/// Where something resting at `home` should be in `mode`.  `seed` picks its
/// spot in the chaos cloud.
pub fn mode_target(home: [f32; 3], seed: u64, mode: DisplayMode) -> [f32; 3] {
    match mode {
        DisplayMode::Tree => home,
        DisplayMode::Explode => [home[0] * 2.4, home[1] * 1.5 + 1.0, home[2] * 2.4],
        DisplayMode::Chaos => {
            let theta = unit(seed, 11) * std::f32::consts::TAU;
            let cos_phi = unit(seed, 12) * 2.0 - 1.0;
            let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
            let r = 4.0 + unit(seed, 13) * 6.0;
            [r * sin_phi * theta.cos(), r * cos_phi, r * sin_phi * theta.sin()]
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_argb(0.0, 1.0, 1.0), 0xFFFF0000);
        assert_eq!(hsv_to_argb(120.0, 1.0, 1.0), 0xFF00FF00);
        assert_eq!(hsv_to_argb(240.0, 1.0, 1.0), 0xFF0000FF);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(theme::PARTICLE_PINK, theme::PARTICLE_BLUE, 0.0), theme::PARTICLE_PINK);
        assert_eq!(blend(theme::PARTICLE_PINK, theme::PARTICLE_BLUE, 1.0), theme::PARTICLE_BLUE);
    }

    #[test]
    fn unit_in_range_and_stable() {
        for s in 0..500 {
            let u = unit(s, 3);
            assert!((0.0..1.0).contains(&u));
            assert_eq!(u, unit(s, 3));
        }
    }

    #[test]
    fn field_is_deterministic_with_ornaments() {
        let a = generate_field(50);
        assert_eq!(a, generate_field(50));
        assert_eq!(a.len(), 50);
        let ornaments = a.iter().filter(|p| p.kind == ParticleKind::Ornament).count();
        assert_eq!(ornaments, 8); // ids 0, 7, ..., 49
        for p in &a {
            assert!(p.position[1] >= -4.0 && p.position[1] <= 5.0);
            assert_eq!(p.color >> 24, 0xFF);
        }
    }

    #[test]
    fn tree_target_is_home_and_explode_pushes_out() {
        let home = [1.0f32, 2.0, -1.0];
        assert_eq!(mode_target(home, 3, DisplayMode::Tree), home);
        let e = mode_target(home, 3, DisplayMode::Explode);
        assert!(e[0].hypot(e[2]) > home[0].hypot(home[2]));
    }

    #[test]
    fn chaos_target_within_cloud() {
        for seed in 0..100 {
            let c = mode_target([0.0; 3], seed, DisplayMode::Chaos);
            let r = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
            assert!(r >= 3.99 && r <= 10.01, "seed {} radius {}", seed, r);
        }
    }
}
