//! Synthesized sound effects
//!
//! Every sound is a single decaying oscillator, so nothing needs to be
//! downloaded. One [`TonePlayer`] is built by the host and handed to every
//! session; failures are logged and the sound is skipped.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A single decaying tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Hz
    pub frequency: f32,
    pub waveform: Waveform,
    /// Starting gain
    pub volume: f32,
    /// Seconds for the gain to ramp down to 0.01
    pub decay: f32,
    /// Seconds until the oscillator is stopped
    pub stop_after: f32,
}

impl Tone {
    const fn preset(frequency: f32, waveform: Waveform, duration: f32, volume: f32) -> Self {
        Self {
            frequency,
            waveform,
            volume,
            decay: duration,
            stop_after: duration,
        }
    }
}

/// Named sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Correct answer, item collected
    Success,
    /// Wrong answer, wall touched
    Error,
    /// Button press
    Click,
    Jump,
    /// Points gained
    Score,
    GameOver,
    /// Balloon popped
    Pop,
    /// Card turned over
    Flip,
}

impl SoundEffect {
    pub const fn tone(self) -> Tone {
        use Waveform::*;
        match self {
            SoundEffect::Success => Tone::preset(523.25, Sine, 0.3, 0.3),
            SoundEffect::Error => Tone::preset(165.0, Sawtooth, 0.3, 0.2),
            SoundEffect::Click => Tone::preset(600.0, Sine, 0.1, 0.2),
            SoundEffect::Jump => Tone::preset(400.0, Square, 0.15, 0.25),
            SoundEffect::Score => Tone::preset(800.0, Sine, 0.15, 0.25),
            SoundEffect::GameOver => Tone::preset(150.0, Sawtooth, 0.5, 0.2),
            SoundEffect::Pop => Tone::preset(300.0, Sine, 0.1, 0.3),
            SoundEffect::Flip => Tone::preset(400.0, Square, 0.1, 0.2),
        }
    }
}

/// Voices for the music toy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Piano,
    Guitar,
    Drums,
    Xylophone,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::Piano,
        Instrument::Guitar,
        Instrument::Drums,
        Instrument::Xylophone,
    ];

    /// Note tone: instrument-specific waveform and envelope, always stopped after 1 s
    pub fn tone(self, frequency: f32) -> Tone {
        let (waveform, volume, decay) = match self {
            Instrument::Piano => (Waveform::Sine, 0.3, 0.5),
            Instrument::Guitar => (Waveform::Sawtooth, 0.2, 0.8),
            Instrument::Drums => (Waveform::Triangle, 0.4, 0.2),
            Instrument::Xylophone => (Waveform::Square, 0.2, 0.3),
        };
        Tone {
            frequency,
            waveform,
            volume,
            decay,
            stop_after: 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
            Instrument::Drums => "Drums",
            Instrument::Xylophone => "Xylophone",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToneError {
    #[error("audio output is unavailable")]
    Unavailable,
    #[error("audio backend failed: {0}")]
    Backend(String),
}

/// Audio backend
pub trait ToneSink {
    /// Start one self-terminating tone
    fn play(&self, tone: &Tone) -> Result<(), ToneError>;

    /// Resume output after a user gesture
    fn resume(&self) -> Result<(), ToneError> {
        Ok(())
    }
}

/// Backend that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn play(&self, _tone: &Tone) -> Result<(), ToneError> {
        Ok(())
    }
}

/// Backend that remembers what it was asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    played: Rc<RefCell<Vec<Tone>>>,
    resumes: Rc<Cell<u32>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tones played so far
    pub fn played(&self) -> Vec<Tone> {
        self.played.borrow().clone()
    }

    pub fn resume_count(&self) -> u32 {
        self.resumes.get()
    }

    /// True if a tone with this effect's frequency and waveform was played
    pub fn heard(&self, effect: SoundEffect) -> bool {
        let want = effect.tone();
        self.played
            .borrow()
            .iter()
            .any(|t| t.frequency == want.frequency && t.waveform == want.waveform)
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl ToneSink for RecordingSink {
    fn play(&self, tone: &Tone) -> Result<(), ToneError> {
        self.played.borrow_mut().push(*tone);
        Ok(())
    }

    fn resume(&self) -> Result<(), ToneError> {
        self.resumes.set(self.resumes.get() + 1);
        Ok(())
    }
}

/// Shared sound-effect player
pub struct TonePlayer {
    sink: Box<dyn ToneSink>,
    unlocked: Cell<bool>,
    master_volume: Cell<f32>,
    sfx_volume: Cell<f32>,
    muted: Cell<bool>,
}

impl Default for TonePlayer {
    fn default() -> Self {
        Self::new(Box::new(SilentSink))
    }
}

impl TonePlayer {
    pub fn new(sink: Box<dyn ToneSink>) -> Self {
        Self {
            sink,
            unlocked: Cell::new(false),
            master_volume: Cell::new(0.8),
            sfx_volume: Cell::new(1.0),
            muted: Cell::new(false),
        }
    }

    /// Player backed by Web Audio
    #[cfg(target_arch = "wasm32")]
    pub fn web() -> Self {
        Self::new(Box::new(WebAudioSink::new()))
    }

    /// Call from a user-gesture handler. Only the first call does anything.
    pub fn unlock(&self) {
        if self.unlocked.replace(true) {
            return;
        }
        match self.sink.resume() {
            Ok(()) => log::info!("Audio unlocked"),
            Err(e) => log::warn!("Audio unlock failed: {e}"),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.get()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&self, vol: f32) {
        self.master_volume.set(vol.clamp(0.0, 1.0));
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&self, vol: f32) {
        self.sfx_volume.set(vol.clamp(0.0, 1.0));
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.set(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.get()
    }

    fn effective_volume(&self) -> f32 {
        if self.muted.get() {
            0.0
        } else {
            self.master_volume.get() * self.sfx_volume.get()
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        self.emit(effect.tone());
    }

    /// Play a music-toy note
    pub fn play_note(&self, frequency: f32, instrument: Instrument) {
        self.emit(instrument.tone(frequency));
    }

    fn emit(&self, tone: Tone) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let tone = Tone {
            volume: tone.volume * vol,
            ..tone
        };
        if let Err(e) = self.sink.play(&tone) {
            log::warn!("Skipping {:?} tone at {} Hz: {e}", tone.waveform, tone.frequency);
        }
    }
}
