//! Sine generator with smoothed intensity and frequency changes
//!
//! Intensity changes ramp linearly over [`INTENSITY_TRANSITION_LEN`] samples.
//! Frequency changes go through a small state machine:
//!
//! - `Armed`: a linear frequency sweep has been tabulated as accumulated
//!   phase, waiting for the next ascending zero crossing.
//! - `Running`: samples are read from the phase table.
//! - `Resynchronizing`: the last table sample was emitted; the sample index
//!   is realigned on the new period so the waveform continues from the
//!   closest point with the same slope.

use std::f64::consts::TAU;

use super::error::{BusyReason, Result, SynthError};
use super::fixed::{Sample, SAMPLE_MAX};

/// Length of an intensity ramp, in samples.
pub const INTENSITY_TRANSITION_LEN: usize = 1000;

/// Length of a frequency transition, in samples.
pub const FREQUENCY_TRANSITION_LEN: usize = 256;

/// Observable phase of a frequency change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Armed,
    Running,
    Resynchronizing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrequencyTransition {
    Idle,
    Armed { target: f64 },
    Running { target: f64, step: usize },
    Resynchronizing,
}

#[derive(Debug, Clone, Copy)]
struct IntensityRamp {
    delta: f64,
    remaining: usize,
}

/// Phase accumulator based sine generator.
#[derive(Debug, Clone)]
pub struct SineGenerator {
    sample_rate: f64,
    frequency: f64,
    intensity: f64,
    index: u64,

    ramp: Option<IntensityRamp>,

    // Output trackers
    prev_out: Sample,
    prev_sign: i8,
    sign_change: bool,
    ascending: bool,

    transition: FrequencyTransition,
    phase_table: Box<[f64]>,
}

impl SineGenerator {
    pub fn new(sample_rate: f64, frequency: f64, intensity: f64) -> Self {
        Self {
            sample_rate,
            frequency,
            intensity,
            index: 0,
            ramp: None,
            prev_out: 0,
            prev_sign: 0,
            sign_change: false,
            ascending: false,
            transition: FrequencyTransition::Idle,
            phase_table: vec![0.0; FREQUENCY_TRANSITION_LEN].into_boxed_slice(),
        }
    }

    /// Frequency currently produced; a pending change is not reported until done.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        match self.transition {
            FrequencyTransition::Idle => TransitionPhase::Idle,
            FrequencyTransition::Armed { .. } => TransitionPhase::Armed,
            FrequencyTransition::Running { .. } => TransitionPhase::Running,
            FrequencyTransition::Resynchronizing => TransitionPhase::Resynchronizing,
        }
    }

    /// Request a new frequency.
    ///
    /// The change is immediate from or to 0 Hz, and while the output is
    /// silent (no zero crossing would ever start a transition). Otherwise the
    /// transition is armed and fails with `Busy` while another one is in flight.
    pub fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        if self.frequency == 0.0 || frequency == 0.0 {
            self.frequency = frequency;
            self.index = 0;
            self.transition = FrequencyTransition::Idle;
            return Ok(());
        }
        if self.is_silent() {
            self.frequency = frequency;
            self.transition = FrequencyTransition::Idle;
            return Ok(());
        }
        if self.transition != FrequencyTransition::Idle {
            return Err(SynthError::Busy(BusyReason::FrequencyTransition));
        }

        let delta = (frequency - self.frequency) / FREQUENCY_TRANSITION_LEN as f64;
        self.phase_table[0] = self.frequency;
        for i in 1..FREQUENCY_TRANSITION_LEN {
            let instantaneous = self.frequency + i as f64 * delta;
            self.phase_table[i] = self.phase_table[i - 1] + instantaneous;
        }
        self.transition = FrequencyTransition::Armed { target: frequency };
        Ok(())
    }

    /// Intensity currently applied, possibly mid-ramp.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        self.ramp = Some(IntensityRamp {
            delta: (intensity - self.intensity) / INTENSITY_TRANSITION_LEN as f64,
            remaining: INTENSITY_TRANSITION_LEN,
        });
    }

    pub fn process(&mut self, out: &mut [Sample]) {
        for sample in out.iter_mut() {
            self.advance_intensity();

            if let FrequencyTransition::Armed { target } = self.transition {
                if self.sign_change && self.ascending {
                    self.transition = FrequencyTransition::Running { target, step: 0 };
                }
            }

            let phase = match self.transition {
                FrequencyTransition::Running { target, step } => {
                    let phase = self.phase_table[step];
                    self.transition = if step + 1 == FREQUENCY_TRANSITION_LEN {
                        self.frequency = target;
                        FrequencyTransition::Resynchronizing
                    } else {
                        FrequencyTransition::Running { target, step: step + 1 }
                    };
                    phase
                }
                _ => {
                    let phase = self.index as f64 * self.frequency;
                    self.index += 1;
                    phase
                }
            };

            let value = self.amplitude(phase);
            *sample = value;
            self.track(value);

            if self.transition == FrequencyTransition::Resynchronizing {
                self.index = self.resync_index(value) + 1;
                self.transition = FrequencyTransition::Idle;
            }
        }
    }

    /// Zero intensity with no ramp toward a non-zero one
    fn is_silent(&self) -> bool {
        self.intensity == 0.0 && self.ramp.is_none()
    }

    fn advance_intensity(&mut self) {
        if let Some(ramp) = self.ramp.as_mut() {
            self.intensity += ramp.delta;
            ramp.remaining -= 1;
            if ramp.remaining == 0 {
                self.ramp = None;
            }
        }
    }

    fn amplitude(&self, phase: f64) -> Sample {
        (SAMPLE_MAX as f64 * self.intensity * (TAU * phase / self.sample_rate).sin()) as Sample
    }

    fn track(&mut self, value: Sample) {
        let sign = if value >= 0 { 1 } else { -1 };
        self.sign_change = sign != self.prev_sign;
        self.prev_sign = sign;
        self.ascending = value > self.prev_out;
        self.prev_out = value;
    }

    /// Index in one period of the new frequency whose ideal value is the
    /// closest to `last`, restricted to the current slope direction.
    fn resync_index(&self, last: Sample) -> u64 {
        if self.frequency <= 0.0 {
            return 0;
        }
        let period = (self.sample_rate / self.frequency) as u64;
        let mut best = 0;
        let mut delta_min = i64::MAX;
        let mut previous = self.amplitude(-self.frequency);

        for j in 0..period {
            let value = self.amplitude(j as f64 * self.frequency);
            let ascending = value > previous;
            previous = value;

            if ascending != self.ascending {
                continue;
            }
            let delta = (value as i64 - last as i64).abs();
            if delta < delta_min {
                delta_min = delta;
                best = j;
            }
        }
        best
    }
}
