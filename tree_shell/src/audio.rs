//! Background jingle.
//!
//! A short phrase loops on a MIDI output port from its own thread.  The
//! shell only ever starts it once and toggles it afterwards; both go over a
//! channel so the render loop never waits on MIDI I/O.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::AudioConfig;

// ════════════════════════════════════════════════════════════════════════════
// AudioService — what the shell needs from any audio backend
// ════════════════════════════════════════════════════════════════════════════

pub trait AudioService {
    /// Start playback (session start).
    fn play(&mut self);
    /// Flip playback and return the new playing state.
    fn toggle(&mut self) -> bool;
    fn is_playing(&self) -> bool;
}

/// No output at all; keeps the playing flag so mute still round-trips.
#[derive(Debug, Default)]
pub struct SilentAudio {
    playing: bool,
}

impl AudioService for SilentAudio {
    fn play(&mut self) { self.playing = true; }

    fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    fn is_playing(&self) -> bool { self.playing }
}

// ════════════════════════════════════════════════════════════════════════════
// MIDI output
// ════════════════════════════════════════════════════════════════════════════

/// Somewhere raw MIDI messages can go.  Send failures are dropped: a lost
/// note is not worth interrupting the jingle for.
trait MidiOut: Send {
    fn send(&mut self, msg: &[u8]);
}

impl MidiOut for midir::MidiOutputConnection {
    fn send(&mut self, msg: &[u8]) {
        if let Err(e) = midir::MidiOutputConnection::send(self, msg) {
            debug!("MIDI send failed: {}", e);
        }
    }
}

/// Swallows everything; used when no port can be opened.
struct NullOut;

impl MidiOut for NullOut {
    fn send(&mut self, _msg: &[u8]) {}
}

fn program_change(channel: u8, program: u8) -> [u8; 2] {
    [0xC0 | (channel & 0x0F), program & 0x7F]
}

fn note_on(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

fn note_off(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

/// Open the first output port, preferring a soft synth.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("memory_tree_jingle") {
        Ok(m)  => m,
        Err(e) => {
            warn!("MIDI init error: {} — jingle muted", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found — jingle muted (try `fluidsynth` or `timidity -iA`)");
        return Box::new(NullOut);
    }

    let port = ports.iter()
        .find(|p| {
            midi_out.port_name(p).map(|n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") || n.contains("synth")
            }).unwrap_or(false)
        })
        .unwrap_or(&ports[0]);

    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    info!("opening MIDI port: {}", name);

    match midi_out.connect(port, "memory-tree-jingle") {
        Ok(conn) => Box::new(conn),
        Err(e) => {
            warn!("failed to connect MIDI port: {} — jingle muted", e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// The phrase
// ════════════════════════════════════════════════════════════════════════════

/// (MIDI note, length in eighth notes).  Loops forever.
const PHRASE: &[(u8, u32)] = &[
    (76, 2), (76, 2), (76, 4),
    (76, 2), (76, 2), (76, 4),
    (76, 2), (79, 2), (72, 3), (74, 1), (76, 8),
    (77, 2), (77, 2), (77, 3), (77, 1),
    (77, 2), (76, 2), (76, 2), (76, 1), (76, 1),
    (79, 2), (79, 2), (77, 2), (74, 2), (72, 8),
];

/// Milliseconds for `eighths` eighth notes at `bpm`.
fn eighths_to_ms(eighths: u32, bpm: u32) -> u64 {
    let ms_per_eighth = 30_000u64 / bpm.max(1) as u64;
    (eighths as u64 * ms_per_eighth).max(20)
}

/// Position in the looping phrase plus the voice it is played with.
struct Jingle {
    cfg:  AudioConfig,
    step: usize,
}

impl Jingle {
    fn new(cfg: AudioConfig) -> Self {
        Jingle { cfg, step: 0 }
    }

    /// Select the instrument.
    fn begin(&self, out: &mut dyn MidiOut) {
        out.send(&program_change(self.cfg.channel, self.cfg.instrument));
    }

    /// Sound the next note of the phrase.  Returns it with its length in ms.
    fn strike(&mut self, out: &mut dyn MidiOut) -> (u8, u64) {
        let (note, eighths) = PHRASE[self.step % PHRASE.len()];
        self.step += 1;
        out.send(&note_on(self.cfg.channel, note, self.cfg.velocity));
        (note, eighths_to_ms(eighths, self.cfg.tempo_bpm))
    }

    fn release(&self, out: &mut dyn MidiOut, note: u8) {
        out.send(&note_off(self.cfg.channel, note));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiAudio — handle to the jingle thread
// ════════════════════════════════════════════════════════════════════════════

enum AudioCommand {
    Play,
    Pause,
    Quit,
}

pub struct MidiAudio {
    cmd_tx:  Sender<AudioCommand>,
    playing: bool,
}

impl MidiAudio {
    /// Spawn the jingle thread, paused.
    pub fn spawn(cfg: &AudioConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let cfg = cfg.clone();
        thread::spawn(move || jingle_thread(cfg, cmd_rx));
        MidiAudio { cmd_tx, playing: false }
    }

    fn send(&self, cmd: AudioCommand) {
        let _ = self.cmd_tx.send(cmd);
    }
}

impl AudioService for MidiAudio {
    fn play(&mut self) {
        self.playing = true;
        self.send(AudioCommand::Play);
    }

    fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.send(if self.playing { AudioCommand::Play } else { AudioCommand::Pause });
        self.playing
    }

    fn is_playing(&self) -> bool { self.playing }
}

impl Drop for MidiAudio {
    fn drop(&mut self) {
        self.send(AudioCommand::Quit);
    }
}

fn jingle_thread(cfg: AudioConfig, cmd_rx: Receiver<AudioCommand>) {
    let mut midi = open_midi_output();
    let mut jingle = Jingle::new(cfg);
    let mut playing = false;

    jingle.begin(midi.as_mut());

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(AudioCommand::Play)  => playing = true,
                Ok(AudioCommand::Pause) => playing = false,
                Ok(AudioCommand::Quit)  => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        if !playing {
            thread::sleep(Duration::from_millis(10));
            continue;
        }

        let (note, millis) = jingle.strike(midi.as_mut());
        thread::sleep(Duration::from_millis(millis * 9 / 10));
        jingle.release(midi.as_mut(), note);
        thread::sleep(Duration::from_millis(millis / 10));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
