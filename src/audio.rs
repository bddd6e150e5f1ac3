//! Sound cues
//!
//! The simulation never plays audio itself. The session turns game events into
//! [`SoundCue`]s and hands them to whatever [`AudioSink`] the host installed.
//! Playback is fire-and-forget: a failing sink is logged and ignored.

use thiserror::Error;

/// Named cue events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Dragon flaps
    Flap,
    /// Fireball launched
    Fire,
    /// Pillar passed or meteor destroyed
    Score,
    /// Meteor hit by a fireball
    Hit,
    /// Run over
    Crash,
    /// Run started
    Start,
    /// Menu/mission selection
    Select,
    /// Setting toggled
    Toggle,
    /// Power-up collected
    PowerUp,
    /// Shield absorbed a hit
    Shield,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Flap => "flap",
            SoundCue::Fire => "fire",
            SoundCue::Score => "score",
            SoundCue::Hit => "hit",
            SoundCue::Crash => "crash",
            SoundCue::Start => "start",
            SoundCue::Select => "select",
            SoundCue::Toggle => "toggle",
            SoundCue::PowerUp => "powerUp",
            SoundCue::Shield => "shield",
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

/// Audio playback collaborator
pub trait AudioSink {
    /// Play `cue` at `volume` in [0, 1]
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError>;
}

/// Sink that only logs (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError> {
        log::trace!("cue {} @ {:.2}", cue.as_str(), volume);
        Ok(())
    }
}

/// Volume/mute gate in front of the sink
pub struct AudioManager {
    sink: Option<Box<dyn AudioSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Warn only once per failure streak
    failing: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("has_sink", &self.sink.is_some())
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    /// A manager with no sink; every cue is dropped
    pub fn new() -> Self {
        Self {
            sink: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            failing: false,
        }
    }

    pub fn with_sink(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::new()
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = Some(sink);
        self.failing = false;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue; never fails
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        match sink.play(cue, vol) {
            Ok(()) => self.failing = false,
            Err(e) => {
                if !self.failing {
                    log::warn!("Audio cue {} dropped: {}", cue.as_str(), e);
                }
                self.failing = true;
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

/// Procedural Web Audio synth; no asset files needed
#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioError, AudioSink, SoundCue};

    pub struct WebAudioSink {
        ctx: AudioContext,
    }

    impl WebAudioSink {
        /// Fails outside a secure context or without Web Audio support
        pub fn new() -> Result<Self, AudioError> {
            let ctx = AudioContext::new()
                .map_err(|e| AudioError::Unavailable(format!("{:?}", e)))?;
            Ok(Self { ctx })
        }

        fn create_osc(&self, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// One enveloped tone, optionally sweeping to `sweep_to`
        fn tone(
            &self,
            freq: f32,
            sweep_to: Option<f32>,
            osc_type: OscillatorType,
            vol: f32,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(freq, osc_type) else {
                return;
            };
            let t = self.ctx.current_time() + delay;

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if let Some(target) = sweep_to {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(target, t + length)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        fn arpeggio(&self, freqs: &[f32], osc_type: OscillatorType, vol: f32, step: f64, length: f64) {
            for (i, freq) in freqs.iter().enumerate() {
                self.tone(*freq, None, osc_type, vol, i as f64 * step, length);
            }
        }
    }

    impl AudioSink for WebAudioSink {
        fn play(&mut self, cue: SoundCue, vol: f32) -> Result<(), AudioError> {
            // Browsers suspend the context until a user gesture
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }

            match cue {
                SoundCue::Flap => {
                    self.tone(220.0, Some(420.0), OscillatorType::Triangle, vol * 0.25, 0.0, 0.09)
                }
                SoundCue::Fire => {
                    self.tone(700.0, Some(180.0), OscillatorType::Sawtooth, vol * 0.2, 0.0, 0.14)
                }
                SoundCue::Score => {
                    self.arpeggio(&[660.0, 880.0], OscillatorType::Sine, vol * 0.25, 0.06, 0.1)
                }
                SoundCue::Hit => {
                    self.tone(160.0, Some(50.0), OscillatorType::Square, vol * 0.3, 0.0, 0.18)
                }
                SoundCue::Crash => self.arpeggio(
                    &[400.0, 350.0, 300.0, 200.0],
                    OscillatorType::Sine,
                    vol * 0.3,
                    0.2,
                    0.3,
                ),
                SoundCue::Start => {
                    self.tone(200.0, Some(600.0), OscillatorType::Triangle, vol * 0.3, 0.0, 0.2)
                }
                SoundCue::Select => {
                    self.tone(520.0, None, OscillatorType::Sine, vol * 0.2, 0.0, 0.06)
                }
                SoundCue::Toggle => {
                    self.tone(380.0, None, OscillatorType::Triangle, vol * 0.2, 0.0, 0.05)
                }
                SoundCue::PowerUp => self.arpeggio(
                    &[600.0, 800.0, 1000.0],
                    OscillatorType::Sine,
                    vol * 0.25,
                    0.08,
                    0.15,
                ),
                SoundCue::Shield => {
                    self.tone(900.0, Some(300.0), OscillatorType::Sine, vol * 0.3, 0.0, 0.3)
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Records every cue it receives
    #[derive(Debug, Default, Clone)]
    pub struct RecordingSink {
        pub cues: Rc<RefCell<Vec<SoundCue>>>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
            self.cues.borrow_mut().push(cue);
            Ok(())
        }
    }

    /// Always fails, like a browser with no audio device
    #[derive(Debug, Default)]
    pub struct DeadSink;

    impl AudioSink for DeadSink {
        fn play(&mut self, _cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
            Err(AudioError::Unavailable("no device".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{DeadSink, RecordingSink};
    use super::*;

    #[test]
    fn test_mute_drops_cues() {
        let sink = RecordingSink::default();
        let cues = sink.cues.clone();
        let mut audio = AudioManager::with_sink(Box::new(sink));

        audio.play(SoundCue::Flap);
        audio.set_muted(true);
        audio.play(SoundCue::Fire);
        audio.set_muted(false);
        audio.play(SoundCue::Score);

        assert_eq!(*cues.borrow(), vec![SoundCue::Flap, SoundCue::Score]);
    }

    #[test]
    fn test_zero_volume_is_silent() {
        let sink = RecordingSink::default();
        let cues = sink.cues.clone();
        let mut audio = AudioManager::with_sink(Box::new(sink));
        audio.set_master_volume(-1.0);
        audio.play(SoundCue::Crash);
        assert!(cues.borrow().is_empty());
    }

    #[test]
    fn test_failing_sink_is_swallowed() {
        let mut audio = AudioManager::with_sink(Box::new(DeadSink));
        for _ in 0..3 {
            audio.play(SoundCue::Hit);
        }
        assert!(!audio.is_muted());
    }

    #[test]
    fn test_no_sink_is_fine() {
        let mut audio = AudioManager::new();
        audio.play(SoundCue::Start);
        assert!(LogSink.play(SoundCue::Start, 1.0).is_ok());
    }
}
