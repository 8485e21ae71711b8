//! ADSR envelope generator
//!
//! Attack-Decay-Sustain-Release envelope for amplitude shaping. Ramps are
//! tabulated once at construction; the per-sample work is a table read.

use super::error::{BusyReason, Result, SynthError};

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Envelope timings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub sample_rate: f64,
    /// Attack time (ms, > 0)
    pub attack: f64,
    /// Decay time (ms, > 0)
    pub decay: f64,
    /// Sustain factor (]0, 1])
    pub sustain: f64,
    /// Release time (ms, >= 0)
    pub release: f64,
}

/// ADSR envelope generator
#[derive(Debug, Clone)]
pub struct Envelope {
    sustain: f64,
    intensity: f64,

    attack_table: Vec<f64>,
    decay_table: Vec<f64>,
    release_table: Vec<f64>,

    stage: EnvelopeStage,
    index: usize,
    factor: f64,
}

impl Envelope {
    /// Create a new envelope, idle
    pub fn new(params: &EnvelopeParams) -> Result<Self> {
        let fs = params.sample_rate;
        if !fs.is_finite() || fs <= 0.0 {
            return Err(SynthError::InvalidSampleRate(fs));
        }
        if !(params.sustain > 0.0 && params.sustain <= 1.0) {
            return Err(SynthError::InvalidSustain(params.sustain));
        }

        let attack_len = ramp_len("attack", params.attack, fs, false)?;
        let decay_len = ramp_len("decay", params.decay, fs, false)?;
        let release_len = ramp_len("release", params.release, fs, true)?;
        let sustain = params.sustain;

        let attack_table = (0..attack_len)
            .map(|i| i as f64 / attack_len as f64)
            .collect();
        let decay_table = (0..decay_len)
            .map(|i| sustain + (1.0 - sustain) * (decay_len - i) as f64 / decay_len as f64)
            .collect();
        let release_table = (0..release_len)
            .map(|i| sustain * (release_len - i) as f64 / release_len as f64)
            .collect();

        Ok(Self {
            sustain,
            intensity: 0.0,
            attack_table,
            decay_table,
            release_table,
            stage: EnvelopeStage::Idle,
            index: 0,
            factor: 0.0,
        })
    }

    /// Get current stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Check if envelope is active (not idle)
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn sustain(&self) -> f64 {
        self.sustain
    }

    pub fn attack_samples(&self) -> usize {
        self.attack_table.len()
    }

    pub fn decay_samples(&self) -> usize {
        self.decay_table.len()
    }

    pub fn release_samples(&self) -> usize {
        self.release_table.len()
    }

    /// Gain that the next processed sample will carry
    pub fn level(&self) -> f64 {
        self.intensity * self.factor
    }

    /// Note ON (`true`) or OFF (`false`).
    ///
    /// ON from idle captures `intensity` and starts the attack; ON while
    /// sustaining keeps the running note. ON during a ramp is refused with
    /// `Busy`. OFF jumps to the release ramp, which always starts from the
    /// sustain factor.
    pub fn toggle(&mut self, on: bool, intensity: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&intensity) {
            return Err(SynthError::InvalidIntensity(intensity));
        }

        if on {
            match self.stage {
                EnvelopeStage::Idle => {
                    self.intensity = intensity;
                    self.enter(EnvelopeStage::Attack, 0.0);
                }
                EnvelopeStage::Sustain => {}
                _ => return Err(SynthError::Busy(BusyReason::EnvelopeTransition)),
            }
        } else {
            match self.stage {
                EnvelopeStage::Idle | EnvelopeStage::Release => {}
                // Leaving attack or decay this way jumps the gain
                _ => self.enter(EnvelopeStage::Release, self.sustain),
            }
        }
        Ok(())
    }

    /// Write the gain of the next `out.len()` samples
    pub fn process(&mut self, out: &mut [f64]) {
        for gain in out.iter_mut() {
            *gain = self.intensity * self.factor;
            self.advance();
        }
    }

    fn enter(&mut self, stage: EnvelopeStage, factor: f64) {
        self.stage = stage;
        self.index = 0;
        self.factor = factor;
    }

    fn advance(&mut self) {
        match self.stage {
            EnvelopeStage::Idle | EnvelopeStage::Sustain => {}

            EnvelopeStage::Attack => {
                self.index += 1;
                if let Some(&factor) = self.attack_table.get(self.index) {
                    self.factor = factor;
                } else {
                    self.enter(EnvelopeStage::Decay, self.decay_table[0]);
                }
            }

            EnvelopeStage::Decay => {
                self.index += 1;
                if let Some(&factor) = self.decay_table.get(self.index) {
                    self.factor = factor;
                } else {
                    self.enter(EnvelopeStage::Sustain, self.sustain);
                }
            }

            EnvelopeStage::Release => {
                self.index += 1;
                if let Some(&factor) = self.release_table.get(self.index) {
                    self.factor = factor;
                } else {
                    self.enter(EnvelopeStage::Idle, 0.0);
                    self.intensity = 0.0;
                }
            }
        }
    }
}

/// Ramp length in samples for a duration in milliseconds
fn ramp_len(name: &'static str, ms: f64, fs: f64, allow_empty: bool) -> Result<usize> {
    let invalid = SynthError::InvalidDuration { name, value: ms };
    if !ms.is_finite() || ms < 0.0 || (!allow_empty && ms == 0.0) {
        return Err(invalid);
    }
    let len = (ms * fs / 1000.0) as usize;
    if len == 0 && !allow_empty {
        return Err(invalid);
    }
    Ok(len)
}
