//! Web Audio backend

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use super::{Tone, ToneError, ToneSink, Waveform};

fn backend(e: JsValue) -> ToneError {
    ToneError::Backend(format!("{e:?}"))
}

impl From<Waveform> for OscillatorType {
    fn from(w: Waveform) -> Self {
        match w {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }
}

/// Plays tones through an `AudioContext` created on first use
#[derive(Default)]
pub struct WebAudioSink {
    ctx: RefCell<Option<AudioContext>>,
}

impl WebAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Result<AudioContext, ToneError> {
        if let Some(ctx) = self.ctx.borrow().as_ref() {
            return Ok(ctx.clone());
        }
        // May fail outside a secure context
        let ctx = AudioContext::new().map_err(|_| ToneError::Unavailable)?;
        log::info!("AudioContext created ({:?})", ctx.state());
        *self.ctx.borrow_mut() = Some(ctx.clone());
        Ok(ctx)
    }

    /// Oscillator routed through a gain node to the speakers
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Result<(OscillatorNode, GainNode), ToneError> {
        let osc = ctx.create_oscillator().map_err(backend)?;
        let gain = ctx.create_gain().map_err(backend)?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).map_err(backend)?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(backend)?;

        Ok((osc, gain))
    }
}

impl ToneSink for WebAudioSink {
    fn play(&self, tone: &Tone) -> Result<(), ToneError> {
        let ctx = self.context()?;

        // Browsers start suspended until a gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let (osc, gain) = Self::create_osc(&ctx, tone.frequency, tone.waveform.into())?;
        let t = ctx.current_time();

        gain.gain()
            .set_value_at_time(tone.volume, t)
            .map_err(backend)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + tone.decay as f64)
            .map_err(backend)?;

        osc.start_with_when(t).map_err(backend)?;
        osc.stop_with_when(t + tone.stop_after as f64)
            .map_err(backend)?;
        Ok(())
    }

    fn resume(&self) -> Result<(), ToneError> {
        let ctx = self.context()?;
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume().map_err(backend)?;
        }

        // A near-silent blip finishes the unlock on iOS
        let (osc, gain) = Self::create_osc(&ctx, 440.0, OscillatorType::Sine)?;
        gain.gain().set_value(0.001);
        let t = ctx.current_time();
        osc.start_with_when(t).map_err(backend)?;
        osc.stop_with_when(t + 0.001).map_err(backend)?;
        Ok(())
    }
}
