//! Top-level application shell.
//!
//! `AppShell` owns the slot store, the mode and focus controllers, the
//! latest gesture snapshot, the session flags and the upload handles.  It
//! reacts to one event at a time and hands read-only props to the renderer
//! and the overlay each frame.

use std::io::{self, Write};
use std::sync::mpsc::{self, TryRecvError};

use log::{debug, error, info};
use memory_tree::{
    layout, DisplayMode, FocusController, GestureSnapshot, InputSource, ModeController,
    PhotoSlot, PhotoSlotStore, SlotId, TreeError,
};

use crate::audio::{AudioService, MidiAudio, SilentAudio};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::gesture::{spawn_gesture_source, SimGestureSource, SimInput};
use crate::particles::generate_field;
use crate::scene::{OverlayProps, SceneAnimator, SceneProps};
use crate::uploads::{BlobRegistry, UploadFile};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// UiEvent — what the window reports back
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    /// Leave the start screen, with or without gesture control.
    Start { gestures: bool },
    ToggleMute,
    /// Click that hit no photo.
    BackgroundClick,
    /// Click resolved by the renderer; `None` clears focus.
    PhotoClick(Option<SlotId>),
    Upload(Vec<UploadFile>),
    /// Ask the user for files to upload.
    UploadPrompt,
    /// Raw input for the simulated gesture source.
    Sim(SimInput),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppShell
// ════════════════════════════════════════════════════════════════════════════

pub struct AppShell {
    // ── tree state ───────────────────────────────────────────────────────
    store:   PhotoSlotStore,
    modes:   ModeController,
    focus:   FocusController,
    gesture: GestureSnapshot,

    // ── session ──────────────────────────────────────────────────────────
    started: bool,
    muted:   bool,
    blobs:   BlobRegistry,
    audio:   Box<dyn AudioService>,

    // ── status message ───────────────────────────────────────────────────
    pub status: String,
}

impl AppShell {
    pub fn new(cfg: &ShellConfig, audio: Box<dyn AudioService>) -> Self {
        let mut store = PhotoSlotStore::new();
        store.initialize(layout::generate(cfg.slot_count, &cfg.layout));

        AppShell {
            store,
            modes:   ModeController::new(),
            focus:   FocusController::new(),
            gesture: GestureSnapshot::default(),
            started: false,
            muted:   false,
            blobs:   BlobRegistry::new(),
            audio,
            status:  format!("{} photos on the tree — G: start with gestures  M: start with mouse", cfg.slot_count),
        }
    }

    // ── session ──────────────────────────────────────────────────────────

    /// Leave the start screen.  Only the first call has any effect.
    pub fn handle_start(&mut self, enable_gestures: bool) {
        if self.started {
            return;
        }
        self.started = true;
        self.modes.set_input_source(if enable_gestures {
            InputSource::Gesture
        } else {
            InputSource::Pointer
        });
        self.audio.play();
        info!("session started, {:?} input", self.modes.input_source());
        self.status = if enable_gestures {
            "Gestures on — fist: tree  open hand: explode  spread: chaos  double pinch: focus".to_string()
        } else {
            "Mouse on — click the background to change mode, click a photo to focus".to_string()
        };
    }

    pub fn toggle_mute(&mut self) {
        let playing = self.audio.toggle();
        self.muted = !playing;
        self.status = if self.muted { "Muted".to_string() } else { "Music on ♪".to_string() };
    }

    // ── gesture feed ─────────────────────────────────────────────────────

    /// Take a new snapshot.  With gesture control on, held poses set the
    /// mode and a double pinch toggles focus on the first photo.
    pub fn on_gesture_update(&mut self, snapshot: GestureSnapshot) {
        self.gesture = snapshot;
        if !self.modes.gesture_enabled() {
            return;
        }

        if let Some(mode) = self.modes.apply_gesture(&snapshot) {
            self.status = format!("Gesture → {}", mode);
        }

        if snapshot.is_double_pinch {
            self.on_double_pinch();
        }
    }

    /// Any focus is released; with nothing focused, the first photo is
    /// selected.  A focused photo is never swapped for another.
    fn on_double_pinch(&mut self) {
        if self.focus.focused().is_some() {
            self.focus.clear();
        } else if let Some(first) = self.store.first_id() {
            self.focus.select_or_toggle(first);
        } else {
            return;
        }
        let focused = self.focus.focused();
        debug!("double pinch -> focus {:?}", focused);
        self.status = match focused {
            Some(id) => format!("Double pinch — focus photo {}", id),
            None     => "Double pinch — focus released".to_string(),
        };
    }

    // ── pointer ──────────────────────────────────────────────────────────

    /// Background click: next mode, when the mouse owns the mode.
    pub fn on_background_click(&mut self) {
        if !self.started {
            return;
        }
        if self.modes.advance_manual() {
            self.status = format!("Mode → {}", self.modes.mode());
        }
    }

    pub fn on_photo_click(&mut self, id: Option<SlotId>) {
        match id {
            Some(id) => { self.focus.select_or_toggle(id); }
            None     => self.focus.clear(),
        }
        self.status = match self.focus.focused() {
            Some(id) => format!("Focus photo {}", id),
            None     => "Focus released".to_string(),
        };
    }

    // ── uploads ──────────────────────────────────────────────────────────

    /// Put each file on the next slot in the cycle.  Returns how many slots
    /// were overwritten.
    pub fn on_upload(&mut self, files: &[UploadFile]) -> Result<usize, TreeError> {
        if files.is_empty() {
            return Ok(0);
        }
        // Fail before issuing handles that nothing would own.
        self.store.next_index()?;

        for file in files {
            let url = self.blobs.create(file);
            let ow  = self.store.overwrite_next(url)?;
            if self.blobs.release(&ow.previous_url) {
                debug!("slot {} dropped its previous upload", ow.id);
            }
        }
        info!("uploaded {} file(s), {} total this session", files.len(), self.store.upload_cursor());
        self.status = format!(
            "Uploaded {} photo(s) — next upload goes to slot {}",
            files.len(),
            self.store.next_index().map(|i| i + 1).unwrap_or(0),
        );
        Ok(files.len())
    }

    // ── UI dispatch ──────────────────────────────────────────────────────

    /// Apply a window event.  `Sim`, `UploadPrompt` and `Quit` belong to the
    /// run loop and are ignored here.
    pub fn handle_ui(&mut self, event: UiEvent) {
        match event {
            UiEvent::Start { gestures } => self.handle_start(gestures),
            UiEvent::ToggleMute         => self.toggle_mute(),
            UiEvent::BackgroundClick    => self.on_background_click(),
            UiEvent::PhotoClick(id)     => self.on_photo_click(id),
            UiEvent::Upload(files) => {
                if let Err(e) = self.on_upload(&files) {
                    error!("upload rejected: {}", e);
                    self.status = format!("Upload failed: {}", e);
                }
            }
            UiEvent::UploadPrompt | UiEvent::Sim(_) | UiEvent::Quit => {}
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn mode(&self)            -> DisplayMode        { self.modes.mode() }
    pub fn focused(&self)         -> Option<SlotId>     { self.focus.focused() }
    pub fn gesture(&self)         -> &GestureSnapshot   { &self.gesture }
    pub fn slots(&self)           -> &[PhotoSlot]       { self.store.slots() }
    pub fn upload_cursor(&self)   -> u64                { self.store.upload_cursor() }
    pub fn blobs(&self)           -> &BlobRegistry      { &self.blobs }
    pub fn is_started(&self)      -> bool               { self.started }
    pub fn is_muted(&self)        -> bool               { self.muted }
    pub fn audio_playing(&self)   -> bool               { self.audio.is_playing() }
    pub fn gesture_enabled(&self) -> bool               { self.modes.gesture_enabled() }

    /// Label for the focused photo: its id, plus the file name when it
    /// shows an upload.
    pub fn focus_caption(&self) -> Option<String> {
        let slot = self.store.get(self.focus.focused()?)?;
        Some(match self.blobs.resolve(&slot.url) {
            Some(file) => format!("photo {} - {}", slot.id, file.name()),
            None       => format!("photo {}", slot.id),
        })
    }

    pub fn scene_props(&self) -> SceneProps<'_> {
        SceneProps {
            mode:           self.modes.mode(),
            focused_id:     self.focus.focused(),
            rotation_proxy: self.gesture.rotation_proxy(),
            zoom_proxy:     self.gesture.zoom_proxy(),
            slots:          self.store.slots(),
        }
    }

    pub fn overlay_props(&self) -> OverlayProps<'_> {
        OverlayProps {
            started:         self.started,
            muted:           self.muted,
            gesture:         &self.gesture,
            gesture_enabled: self.gesture_enabled(),
            upload_cursor:   self.store.upload_cursor(),
            clickable:       self.started && !self.gesture_enabled(),
            focus_caption:   self.focus_caption(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Launch-time choices made on the command line.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Skip the start screen: `Some(true)` gestures, `Some(false)` mouse.
    pub start:   Option<bool>,
    /// Applied as one batch before the first frame.
    pub uploads: Vec<UploadFile>,
    /// No MIDI.
    pub silent:  bool,
}

/// Run the full application at ~60 fps until the window closes or Q is
/// pressed.
pub fn run(cfg: ShellConfig, opts: RunOptions) -> Result<(), ShellError> {
    // ── Sim gesture channel ───────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let gesture_rx = spawn_gesture_source(SimGestureSource { rx: sim_rx });

    // ── Window ────────────────────────────────────────────────────────────
    let mut vis = Visualizer::new(cfg.window_width, cfg.window_height)?;
    let mut anim = SceneAnimator::new(generate_field(cfg.particle_count), cfg.window_height as f32);

    // ── App state ─────────────────────────────────────────────────────────
    let audio: Box<dyn AudioService> = if opts.silent {
        Box::new(SilentAudio::default())
    } else {
        Box::new(MidiAudio::spawn(&cfg.audio))
    };
    let mut app = AppShell::new(&cfg, audio);

    if !opts.uploads.is_empty() {
        app.on_upload(&opts.uploads)?;
    }
    if let Some(gestures) = opts.start {
        app.handle_start(gestures);
    }

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window input
        let events = match vis.poll_input(&app.scene_props(), &anim) {
            Some(events) => events,
            None => break,
        };
        for event in events {
            match event {
                UiEvent::Quit => return Ok(()),
                UiEvent::Sim(input) => {
                    // The simulated tracker only listens while gestures are on.
                    if app.gesture_enabled() {
                        let _ = sim_tx.send(input);
                    }
                }
                UiEvent::UploadPrompt => {
                    let files = prompt_upload_paths();
                    app.handle_ui(UiEvent::Upload(files));
                }
                other => app.handle_ui(other),
            }
        }

        // 2. Gesture snapshots, in arrival order
        loop {
            match gesture_rx.try_recv() {
                Ok(snapshot) => app.on_gesture_update(snapshot),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        // 3. Animation
        anim.tick(&app.scene_props());

        // 4. Render
        vis.render(&app.scene_props(), &app.overlay_props(), &anim, &app.status);
    }

    Ok(())
}

/// Read whitespace-separated file paths from stdin.
fn prompt_upload_paths() -> Vec<UploadFile> {
    print!("\n  Photo files to upload: ");
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.split_whitespace().map(UploadFile::new).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn make_app() -> AppShell {
        AppShell::new(&ShellConfig::default(), Box::new(SilentAudio::default()))
    }

    fn started(gestures: bool) -> AppShell {
        let mut app = make_app();
        app.handle_start(gestures);
        app
    }

    fn pose(spread: bool, fist: bool, open: bool) -> GestureSnapshot {
        GestureSnapshot { is_spread: spread, is_fist: fist, is_open_hand: open, ..Default::default() }
    }

    fn double_pinch() -> GestureSnapshot {
        GestureSnapshot { is_double_pinch: true, ..Default::default() }
    }

    fn files(n: usize) -> Vec<UploadFile> {
        (0..n).map(|i| UploadFile::new(format!("/photos/{}.jpg", i))).collect()
    }

    #[test]
    fn starts_with_six_default_slots_in_tree() {
        let app = make_app();
        assert_eq!(app.slots().len(), 6);
        assert_eq!(app.mode(), DisplayMode::Tree);
        assert_eq!(app.focused(), None);
        assert!(!app.is_started());
    }

    #[test]
    fn start_plays_audio_and_sets_input() {
        let app = started(true);
        assert!(app.is_started());
        assert!(app.audio_playing());
        assert!(app.gesture_enabled());
        assert!(!started(false).gesture_enabled());
    }

    #[test]
    fn second_start_is_ignored() {
        let mut app = started(false);
        app.handle_start(true);
        assert!(!app.gesture_enabled());
    }

    #[test]
    fn mute_follows_audio_toggle() {
        let mut app = started(false);
        app.toggle_mute();
        assert!(app.is_muted());
        assert!(!app.audio_playing());
        app.toggle_mute();
        assert!(!app.is_muted());
    }

    #[test]
    fn background_click_cycles_in_mouse_mode() {
        let mut app = started(false);
        app.on_background_click();
        assert_eq!(app.mode(), DisplayMode::Explode);
        app.on_background_click();
        app.on_background_click();
        assert_eq!(app.mode(), DisplayMode::Tree);
    }

    #[test]
    fn background_click_ignored_before_start() {
        let mut app = make_app();
        app.on_background_click();
        assert_eq!(app.mode(), DisplayMode::Tree);
    }

    #[test]
    fn mouse_mode_ignores_fist_gestures() {
        let mut app = started(false);
        app.on_background_click();
        app.on_gesture_update(pose(false, true, false));
        assert_eq!(app.mode(), DisplayMode::Explode);
        app.on_background_click();
        app.on_gesture_update(pose(false, true, false));
        assert_eq!(app.mode(), DisplayMode::Chaos);
    }

    #[test]
    fn gesture_mode_ignores_clicks() {
        let mut app = started(true);
        app.on_background_click();
        assert_eq!(app.mode(), DisplayMode::Tree);
    }

    #[test]
    fn gesture_poses_set_mode_with_priority() {
        let mut app = started(true);
        app.on_gesture_update(pose(true, false, false));
        assert_eq!(app.mode(), DisplayMode::Chaos);
        app.on_gesture_update(pose(false, false, true));
        assert_eq!(app.mode(), DisplayMode::Explode);
        app.on_gesture_update(pose(true, true, false));
        assert_eq!(app.mode(), DisplayMode::Chaos);
        app.on_gesture_update(pose(false, true, true));
        assert_eq!(app.mode(), DisplayMode::Tree);
        app.on_gesture_update(GestureSnapshot::default());
        assert_eq!(app.mode(), DisplayMode::Tree);
    }

    #[test]
    fn double_pinch_toggles_first_photo() {
        let mut app = started(true);
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), Some(1));
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), None);
    }

    #[test]
    fn double_pinch_releases_focus_on_another_photo() {
        let mut app = started(true);
        app.on_photo_click(Some(4));
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), None);
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), Some(1));
    }

    #[test]
    fn double_pinch_ignored_in_mouse_mode() {
        let mut app = started(false);
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), None);
        app.on_photo_click(Some(3));
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), Some(3));
        assert!(app.gesture().is_double_pinch);
    }

    #[test]
    fn double_pinch_and_pose_in_one_snapshot() {
        let mut app = started(true);
        let snap = GestureSnapshot { is_open_hand: true, is_double_pinch: true, ..Default::default() };
        app.on_gesture_update(snap);
        assert_eq!(app.mode(), DisplayMode::Explode);
        assert_eq!(app.focused(), Some(1));
    }

    #[test]
    fn gestures_drive_nothing_before_start() {
        let mut app = make_app();
        app.on_gesture_update(GestureSnapshot { is_spread: true, is_double_pinch: true, ..Default::default() });
        assert_eq!(app.mode(), DisplayMode::Tree);
        assert_eq!(app.focused(), None);
        assert!(app.gesture().is_spread);
    }

    #[test]
    fn photo_click_toggles_and_none_clears() {
        let mut app = started(false);
        app.on_photo_click(Some(5));
        app.on_photo_click(Some(5));
        assert_eq!(app.focused(), None);
        app.on_photo_click(Some(5));
        app.on_photo_click(Some(7));
        assert_eq!(app.focused(), Some(7));
        app.on_photo_click(None);
        assert_eq!(app.focused(), None);
    }

    #[test]
    fn eight_uploads_wrap_and_release_displaced_handles() {
        let mut app = started(false);
        let before = app.slots().to_vec();
        assert_eq!(app.on_upload(&files(8)).unwrap(), 8);
        assert_eq!(app.upload_cursor(), 8);

        // Slots 0 and 1 were written twice; their first-lap handles are gone.
        assert_eq!(app.blobs().live(), 6);
        let f0 = app.blobs().resolve(&app.slots()[0].url).unwrap();
        assert_eq!(f0.path, std::path::Path::new("/photos/6.jpg"));
        let f2 = app.blobs().resolve(&app.slots()[2].url).unwrap();
        assert_eq!(f2.name(), "2.jpg");

        for (a, b) in before.iter().zip(app.slots()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position, b.position);
            assert_ne!(a.url, b.url);
        }
    }

    #[test]
    fn focus_caption_names_uploaded_file() {
        let mut app = started(false);
        assert_eq!(app.focus_caption(), None);
        app.on_photo_click(Some(2));
        assert_eq!(app.focus_caption().as_deref(), Some("photo 2"));
        app.on_upload(&files(2)).unwrap();
        assert_eq!(app.focus_caption().as_deref(), Some("photo 2 - 1.jpg"));
        assert_eq!(app.overlay_props().focus_caption.as_deref(), Some("photo 2 - 1.jpg"));
    }

    #[test]
    fn empty_upload_is_noop() {
        let mut app = started(false);
        let before = app.slots().to_vec();
        assert_eq!(app.on_upload(&[]).unwrap(), 0);
        assert_eq!(app.slots(), &before[..]);
        assert_eq!(app.upload_cursor(), 0);
    }

    #[test]
    fn zero_slot_config_rejects_upload_without_leaking() {
        let cfg = ShellConfig { slot_count: 0, ..ShellConfig::default() };
        let mut app = AppShell::new(&cfg, Box::new(SilentAudio::default()));
        assert!(matches!(app.on_upload(&files(2)), Err(TreeError::InvalidState { .. })));
        assert_eq!(app.blobs().live(), 0);
        // Double pinch with no slots does nothing.
        app.handle_start(true);
        app.on_gesture_update(double_pinch());
        assert_eq!(app.focused(), None);
    }

    #[test]
    fn upload_via_ui_event_reports_failure_in_status() {
        let cfg = ShellConfig { slot_count: 0, ..ShellConfig::default() };
        let mut app = AppShell::new(&cfg, Box::new(SilentAudio::default()));
        app.handle_ui(UiEvent::Upload(files(1)));
        assert!(app.status.starts_with("Upload failed"));
    }

    #[test]
    fn props_forward_state() {
        let mut app = started(true);
        app.on_gesture_update(GestureSnapshot { is_fist: true, hand_x: 0.25, hand_y: -0.5, ..Default::default() });
        let scene = app.scene_props();
        assert_eq!(scene.mode, DisplayMode::Tree);
        assert_eq!(scene.rotation_proxy, 0.25);
        assert_eq!(scene.zoom_proxy, -0.5);
        assert_eq!(scene.slots.len(), 6);

        let overlay = app.overlay_props();
        assert!(overlay.started && overlay.gesture_enabled && !overlay.clickable);
        assert!(overlay.gesture.is_fist);
        assert!(started(false).overlay_props().clickable);
        assert!(!make_app().overlay_props().clickable);
    }
}
