//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::synth::{Coupling, FilterParams, VoiceParams, Waveform};

/// Synthesizer and tempo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthConfig {
    /// Beats per minute (default: 94)
    #[serde(default = "default_tempo")]
    pub tempo: f32,

    /// Sample rate in Hz (default: 48000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Low-pass cutoff frequency in Hz (default: 400)
    #[serde(default = "default_lp_fc")]
    pub lp_fc: f32,

    /// Low-pass quality factor (default: 1.5)
    #[serde(default = "default_lp_q")]
    pub lp_q: f32,

    /// Low-pass gain (default: 1.0)
    #[serde(default = "default_lp_gain")]
    pub lp_gain: f32,

    /// Attack time in ms (default: 25)
    #[serde(default = "default_attack_time")]
    pub attack_time: f32,

    /// Decay time in ms (default: 15)
    #[serde(default = "default_decay_time")]
    pub decay_time: f32,

    /// Sustain factor 0.0-1.0 (default: 0.7)
    #[serde(default = "default_sustain")]
    pub sustain: f32,

    /// Release time in ms (default: 10)
    #[serde(default = "default_release_time")]
    pub release_time: f32,

    /// Oscillator waveform (default: saw)
    #[serde(default)]
    pub waveform: Waveform,

    /// Second oscillator interval (default: fifth)
    #[serde(default)]
    pub coupling: Coupling,

    /// Oscillator intensity 0.0-1.0 (default: 0.6)
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

fn default_tempo() -> f32 { 94.0 }
fn default_sample_rate() -> u32 { 48000 }
fn default_lp_fc() -> f32 { 400.0 }
fn default_lp_q() -> f32 { 1.5 }
fn default_lp_gain() -> f32 { 1.0 }
fn default_attack_time() -> f32 { 25.0 }
fn default_decay_time() -> f32 { 15.0 }
fn default_sustain() -> f32 { 0.7 }
fn default_release_time() -> f32 { 10.0 }
fn default_intensity() -> f32 { 0.6 }

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            sample_rate: default_sample_rate(),
            lp_fc: default_lp_fc(),
            lp_q: default_lp_q(),
            lp_gain: default_lp_gain(),
            attack_time: default_attack_time(),
            decay_time: default_decay_time(),
            sustain: default_sustain(),
            release_time: default_release_time(),
            waveform: Waveform::default(),
            coupling: Coupling::default(),
            intensity: default_intensity(),
        }
    }
}

impl SynthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.tempo > 0.0) {
            bail!("Tempo must be positive (got {})", self.tempo);
        }
        if self.sample_rate < 8000 || self.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.frame_size() == 0 {
            bail!("Tempo {} is too fast for a {} Hz sample rate", self.tempo, self.sample_rate);
        }

        let nyquist = self.sample_rate as f32 / 2.0;
        if !(self.lp_fc > 0.0 && self.lp_fc < nyquist) {
            bail!("Low-pass cutoff must be between 0 and {} Hz (got {})", nyquist, self.lp_fc);
        }
        if !(self.lp_q > 0.0) {
            bail!("Low-pass Q must be positive (got {})", self.lp_q);
        }
        if !self.lp_gain.is_finite() {
            bail!("Low-pass gain must be a finite number");
        }

        if !(self.attack_time > 0.0) {
            bail!("Attack time must be positive (got {} ms)", self.attack_time);
        }
        if !(self.decay_time > 0.0) {
            bail!("Decay time must be positive (got {} ms)", self.decay_time);
        }
        if !(self.release_time >= 0.0) {
            bail!("Release time must not be negative (got {} ms)", self.release_time);
        }
        if !(self.sustain > 0.0 && self.sustain <= 1.0) {
            bail!("Sustain must be between 0.0 and 1.0 (got {})", self.sustain);
        }
        if !(self.intensity > 0.0 && self.intensity <= 1.0) {
            bail!("Intensity must be between 0.0 and 1.0 (got {})", self.intensity);
        }

        Ok(())
    }

    /// Samples per frame; one frame lasts a sixteenth note
    pub fn frame_size(&self) -> usize {
        (60.0 * self.sample_rate as f64 * 0.25 / self.tempo as f64) as usize
    }

    /// Voice construction parameters
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            sample_rate: self.sample_rate as f64,
            frame_size: self.frame_size(),
            filter: FilterParams {
                fc: self.lp_fc as f64,
                q: self.lp_q as f64,
                gain: self.lp_gain as f64,
            },
            attack: self.attack_time as f64,
            decay: self.decay_time as f64,
            sustain: self.sustain as f64,
            release: self.release_time as f64,
            waveform: self.waveform,
            coupling: self.coupling,
            intensity: self.intensity as f64,
        }
    }
}
