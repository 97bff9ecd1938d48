//! Software-rendered preview using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ MODE  input  music  uploads          [gesture flags]         │
//! │                          *                                   │
//! │                      .  [4]  .                               │
//! │                   [5] .  :  .  [3]        particles + photos │
//! │                 .   [6]  :  [2]   .                          │
//! │                    .  . [1] .  .                             │
//! │ status bar                                                   │
//! │ key legend                                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Photos are flat quads tinted per image; the focused photo is lifted out
//! of the tree and drawn large in the centre.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use memory_tree::{DisplayMode, SlotId};

use crate::app::UiEvent;
use crate::error::ShellError;
use crate::gesture::{SimInput, SimKey};
use crate::particles::{blend, dim, hsv_to_argb, mix64, theme, ParticleKind};
use crate::scene::{Camera, OverlayProps, SceneAnimator, SceneProps};
use crate::uploads::BlobRegistry;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

/// Half the side of a photo quad, world units.
const PHOTO_HALF:   f32 = 0.55;
/// Side of the focused photo, fraction of window height.
const FOCUS_FRAC:   f32 = 0.45;
const STATUS_H:     usize = 40;
const GLYPH_SCALE:  usize = 2;
const TEXT:         u32 = 0xFFEEEEEE;
const TEXT_DIM:     u32 = 0xFF888888;
const PANEL_BG:     u32 = 0xFF1A0A12;
const STAR_Y:       f32 = 5.4;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    width:      usize,
    height:     usize,
    mouse_down: bool,
    last_mouse: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize) -> Result<Self, ShellError> {
        let mut window = Window::new(
            "Memory Tree",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| ShellError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![theme::BG; width * height],
            width,
            height,
            mouse_down: false,
            last_mouse: None,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Collect this frame's input.  `None` once the window has closed.
    pub fn poll_input(&mut self, scene: &SceneProps, anim: &SceneAnimator) -> Option<Vec<UiEvent>> {
        if !self.window.is_open() { return None; }

        let mut events = Vec::new();
        let shift = self.window.is_key_down(Key::LeftShift)
                 || self.window.is_key_down(Key::RightShift);
        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) {
            events.push(UiEvent::Quit);
            return Some(events);
        }
        if pressed(Key::G)      { events.push(UiEvent::Start { gestures: true }); }
        if pressed(Key::M)      { events.push(UiEvent::Start { gestures: false }); }
        if pressed(Key::N)      { events.push(UiEvent::ToggleMute); }
        if pressed(Key::U)      { events.push(UiEvent::UploadPrompt); }
        if pressed(Key::Escape) { events.push(UiEvent::PhotoClick(None)); }

        // ── simulated hand poses ──────────────────────────────────────────
        for (key, pose) in [
            (Key::F, SimKey::Fist),
            (Key::O, SimKey::OpenHand),
            (Key::X, SimKey::Spread),
        ] {
            if pressed(key)                   { events.push(UiEvent::Sim(SimInput::KeyDown(pose))); }
            if self.window.is_key_released(key) { events.push(UiEvent::Sim(SimInput::KeyUp(pose))); }
        }
        if pressed(Key::P) {
            let key = if shift { SimKey::DoublePinch } else { SimKey::Pinch };
            events.push(UiEvent::Sim(SimInput::KeyDown(key)));
        }
        if self.window.is_key_released(Key::P) {
            events.push(UiEvent::Sim(SimInput::KeyUp(SimKey::Pinch)));
        }

        // ── mouse: hand position and clicks ───────────────────────────────
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            if self.last_mouse != Some((mx, my)) {
                self.last_mouse = Some((mx, my));
                let (x, y) = normalise_cursor(mx, my, self.width, self.height);
                events.push(UiEvent::Sim(SimInput::HandMoved { x, y, cursor_x: mx, cursor_y: my }));
            }

            let down = self.window.get_mouse_down(MouseButton::Left);
            if down && !self.mouse_down {
                let camera = anim.camera();
                events.push(match hit_test(scene, anim, &camera, self.width, self.height, mx, my) {
                    Some(id) => UiEvent::PhotoClick(Some(id)),
                    None     => UiEvent::BackgroundClick,
                });
            }
            self.mouse_down = down;
        }

        Some(events)
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        scene:   &SceneProps,
        overlay: &OverlayProps,
        anim:    &SceneAnimator,
        status:  &str,
    ) {
        self.buf.fill(theme::BG);
        let camera = anim.camera();

        self.draw_particles(anim, &camera);
        self.draw_star(&camera, anim.time());
        self.draw_photos(scene, anim, &camera);
        if let Some(id) = scene.focused_id {
            self.draw_focused(scene, overlay, id);
        }
        self.draw_overlay(scene, overlay, status);

        self.window.update_with_buffer(&self.buf, self.width, self.height).ok();
    }

    // ── Scene ─────────────────────────────────────────────────────────────

    fn draw_particles(&mut self, anim: &SceneAnimator, camera: &Camera) {
        let t = anim.time();
        for (p, pos) in anim.particles() {
            let Some(pr) = camera.project(pos, self.width, self.height) else { continue };
            let twinkle = 0.65 + 0.35 * (t * p.speed + p.phase).sin();
            let fog     = (1.6 - pr.depth / 20.0).clamp(0.2, 1.0);
            let color   = dim(p.color, twinkle * fog);
            let size    = ((pr.scale * 0.05 * p.scale) as usize).max(1);
            match p.kind {
                ParticleKind::Leaf     => self.fill_centered(pr.x, pr.y, size, color),
                ParticleKind::Ornament => self.draw_diamond(pr.x as isize, pr.y as isize, size + 1, color),
            }
        }
    }

    fn draw_star(&mut self, camera: &Camera, t: f32) {
        if let Some(pr) = camera.project([0.0, STAR_Y, 0.0], self.width, self.height) {
            let r = (pr.scale * 0.35 * (1.0 + 0.1 * (t * 3.0).sin())) as usize;
            self.draw_diamond(pr.x as isize, pr.y as isize, r.max(2), theme::STAR_GOLD);
        }
    }

    fn draw_photos(&mut self, scene: &SceneProps, anim: &SceneAnimator, camera: &Camera) {
        let mut visible = projected_photos(scene, anim, camera, self.width, self.height);
        // Painter's order: far first.
        visible.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for q in visible {
            let Some(slot) = scene.slots.get(q.index) else { continue };
            let fog  = (1.8 - q.depth / 14.0).clamp(0.35, 1.0);
            let side = q.half * 2;
            let x0   = q.x as isize - q.half as isize;
            let y0   = q.y as isize - q.half as isize;
            self.fill_rect_i(x0, y0, side, side, dim(url_color(&slot.url), fog));
            self.draw_border_i(x0, y0, side, side, dim(theme::STAR_GOLD, fog));
            self.draw_label(&slot.id.to_string(), (x0 + 4).max(0) as usize, (y0 + 4).max(0) as usize, 0xFF000000);
        }
    }

    fn draw_focused(&mut self, scene: &SceneProps, overlay: &OverlayProps, id: SlotId) {
        let Some(slot) = scene.slots.iter().find(|s| s.id == id) else { return };
        let (x0, y0, side) = focus_frame(self.width, self.height);
        self.fill_rect(x0, y0, side, side, url_color(&slot.url));
        for (x, y, s) in focus_rings(x0, y0, side) {
            self.draw_border_i(x as isize, y as isize, s, s, theme::ACCENT);
        }
        if let Some(caption) = &overlay.focus_caption {
            self.draw_label(caption, x0 + 8, y0 + side + 8, TEXT);
        }
    }

    // ── Overlay ───────────────────────────────────────────────────────────

    fn draw_overlay(&mut self, scene: &SceneProps, overlay: &OverlayProps, status: &str) {
        let w = self.width;
        let h = self.height;

        // Top line
        let input = if overlay.gesture_enabled { "gesture" } else { "mouse" };
        let music = if overlay.muted { "muted" } else { "music on" };
        let top   = format!("{}   {}   {}   uploads: {}", scene.mode, input, music, overlay.upload_cursor);
        self.draw_label(&top, 10, 10, mode_color(scene.mode));

        if overlay.gesture_enabled {
            let g = overlay.gesture;
            let mut x = w.saturating_sub(300);
            for (name, on) in [
                ("fist", g.is_fist),
                ("open", g.is_open_hand),
                ("spread", g.is_spread),
                ("pinch", g.is_pinching),
            ] {
                self.draw_label(name, x, 10, if on { theme::STAR_GOLD } else { TEXT_DIM });
                x += (name.len() + 2) * 4 * GLYPH_SCALE;
            }
            let (cx, cy) = (g.cursor_x as isize, g.cursor_y as isize);
            self.draw_crosshair(cx, cy, 8, theme::ACCENT);
        }

        // Start screen
        if !overlay.started {
            let bw = 460usize.min(w);
            let bh = 90;
            let bx = (w - bw) / 2;
            let by = h / 3;
            self.fill_rect(bx, by, bw, bh, PANEL_BG);
            self.draw_border_i(bx as isize, by as isize, bw, bh, theme::ACCENT);
            self.draw_label("memory tree", bx + 16, by + 14, theme::STAR_GOLD);
            self.draw_label("g: start with gestures", bx + 16, by + 40, TEXT);
            self.draw_label("m: start with mouse", bx + 16, by + 60, TEXT);
        }

        // Status bar
        let sy = h.saturating_sub(STATUS_H);
        self.fill_rect(0, sy, w, STATUS_H, PANEL_BG);
        self.draw_label(status, 10, sy + 6, TEXT);
        let legend = if overlay.clickable {
            "click=mode/focus  esc=unfocus  n=mute  u=upload  q=quit"
        } else {
            "f=fist  o=open  x=spread  p=pinch  shift+p=double pinch  mouse=hand  n=mute  u=upload  q=quit"
        };
        self.draw_label(legend, 10, sy + 24, TEXT_DIM);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn fill_rect_i(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        let (x0, y0) = (x.max(0), y.max(0));
        let x1 = (x + w as isize).max(0);
        let y1 = (y + h as isize).max(0);
        self.fill_rect(x0 as usize, y0 as usize, (x1 - x0) as usize, (y1 - y0) as usize, color);
    }

    fn fill_centered(&mut self, cx: f32, cy: f32, size: usize, color: u32) {
        let half = (size / 2) as isize;
        self.fill_rect_i(cx as isize - half, cy as isize - half, size, size, color);
    }

    fn draw_border_i(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let (w, h) = (w as isize, h as isize);
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn draw_diamond(&mut self, cx: isize, cy: isize, r: usize, color: u32) {
        let r = r as isize;
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    fn draw_crosshair(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for d in -r..=r {
            self.set_pixel(cx + d, cy, color);
            self.set_pixel(cx, cy + d, color);
        }
    }

    /// 3×5 bitmap font, scaled by `GLYPH_SCALE`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * GLYPH_SCALE, y + row * GLYPH_SCALE, GLYPH_SCALE, GLYPH_SCALE, color);
                    }
                }
            }
            cx += 4 * GLYPH_SCALE;
            if cx + 4 * GLYPH_SCALE > self.width { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Projection + hit testing (window-free, so they can be tested)
// ════════════════════════════════════════════════════════════════════════════

/// A photo quad on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotoQuad {
    pub index: usize,
    pub x:     f32,
    pub y:     f32,
    pub half:  usize,
    pub depth: f32,
}

/// Screen quads for every visible, unfocused photo.
pub fn projected_photos(
    scene:  &SceneProps,
    anim:   &SceneAnimator,
    camera: &Camera,
    width:  usize,
    height: usize,
) -> Vec<PhotoQuad> {
    anim.photo_positions()
        .iter()
        .enumerate()
        .filter(|(i, _)| scene.slots.get(*i).map(|s| Some(s.id) != scene.focused_id).unwrap_or(false))
        .filter_map(|(index, &pos)| {
            camera.project(pos, width, height).map(|pr| PhotoQuad {
                index,
                x:     pr.x,
                y:     pr.y,
                half:  ((PHOTO_HALF * pr.scale) as usize).max(3),
                depth: pr.depth,
            })
        })
        .collect()
}

/// Which photo, if any, is under window point `(mx, my)`.  The focused
/// photo covers the centre of the window; otherwise the nearest quad wins.
pub fn hit_test(
    scene:  &SceneProps,
    anim:   &SceneAnimator,
    camera: &Camera,
    width:  usize,
    height: usize,
    mx:     f32,
    my:     f32,
) -> Option<SlotId> {
    if let Some(id) = scene.focused_id {
        let half = height as f32 * FOCUS_FRAC / 2.0;
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        if (mx - cx).abs() <= half && (my - cy).abs() <= half {
            return Some(id);
        }
    }
    projected_photos(scene, anim, camera, width, height)
        .into_iter()
        .filter(|q| (mx - q.x).abs() <= q.half as f32 && (my - q.y).abs() <= q.half as f32)
        .min_by(|a, b| a.depth.total_cmp(&b.depth))
        .and_then(|q| scene.slots.get(q.index).map(|s| s.id))
}

/// Window pixels → hand coordinates in -1.0..=1.0, y up.
/// Top-left corner and side of the centred focus square.
fn focus_frame(width: usize, height: usize) -> (usize, usize, usize) {
    let side = ((height as f32 * FOCUS_FRAC) as usize).min(width);
    ((width - side) / 2, (height - side) / 2, side)
}

/// The three accent borders drawn inside the focus square.  Rings that no
/// longer fit collapse to zero.
fn focus_rings(x0: usize, y0: usize, side: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    (0..3).map(move |inset| (x0 + inset, y0 + inset, side.saturating_sub(2 * inset)))
}

pub fn normalise_cursor(mx: f32, my: f32, width: usize, height: usize) -> (f32, f32) {
    let x = mx / width.max(1) as f32 * 2.0 - 1.0;
    let y = 1.0 - my / height.max(1) as f32 * 2.0;
    (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0))
}

/// Stable tint standing in for an image: placeholders get soft pastels,
/// uploads get saturated colors.
pub fn url_color(url: &str) -> u32 {
    let h = url.bytes().fold(0u64, |acc, b| mix64(acc ^ b as u64));
    let hue = (h % 360) as f32;
    if BlobRegistry::is_blob(url) {
        hsv_to_argb(hue, 0.75, 0.95)
    } else {
        blend(hsv_to_argb(hue, 0.35, 0.9), 0xFFFFFFFF, 0.2)
    }
}

fn mode_color(mode: DisplayMode) -> u32 {
    match mode {
        DisplayMode::Tree    => theme::STAR_GOLD,
        DisplayMode::Explode => theme::PARTICLE_BLUE,
        DisplayMode::Chaos   => theme::ACCENT,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_lowercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '>' | '→' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
