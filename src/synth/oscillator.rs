//! Waveform oscillator
//!
//! One contract over three generators: frequency, intensity and block
//! processing into Q8.23 samples.

use serde::{Deserialize, Serialize};

use super::error::{Result, SynthError};
use super::fixed::Sample;
use super::saw::SawGenerator;
use super::sine::{SineGenerator, TransitionPhase};
use super::square::SquareGenerator;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    #[default]
    Saw,
    Square,
}

#[derive(Debug, Clone)]
enum Generator {
    Saw(SawGenerator),
    Sine(SineGenerator),
    Square(SquareGenerator),
}

/// A waveform oscillator producing Q8.23 samples
#[derive(Debug, Clone)]
pub struct Oscillator {
    sample_rate: f64,
    /// Last frequency accepted by `set_frequency`
    requested: f64,
    generator: Generator,
}

impl Oscillator {
    /// Create a new oscillator. A frequency of 0 Hz keeps it silent until set.
    pub fn new(waveform: Waveform, sample_rate: f64, frequency: f64, intensity: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        check_frequency(frequency, sample_rate)?;
        check_intensity(intensity)?;

        let generator = match waveform {
            Waveform::Saw => Generator::Saw(SawGenerator::new(sample_rate, frequency, intensity)),
            Waveform::Sine => Generator::Sine(SineGenerator::new(sample_rate, frequency, intensity)),
            Waveform::Square => {
                Generator::Square(SquareGenerator::new(sample_rate, frequency, intensity))
            }
        };

        Ok(Self {
            sample_rate,
            requested: frequency,
            generator,
        })
    }

    pub fn waveform(&self) -> Waveform {
        match self.generator {
            Generator::Saw(_) => Waveform::Saw,
            Generator::Sine(_) => Waveform::Sine,
            Generator::Square(_) => Waveform::Square,
        }
    }

    /// Frequency currently produced by the generator
    pub fn frequency(&self) -> f64 {
        match &self.generator {
            Generator::Saw(g) => g.frequency(),
            Generator::Sine(g) => g.frequency(),
            Generator::Square(g) => g.frequency(),
        }
    }

    /// Set the frequency (Hz, in [0, fs/2[).
    ///
    /// Requesting the frequency already requested is a no-op. The sine
    /// generator may refuse with a retryable `Busy` error.
    pub fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        check_frequency(frequency, self.sample_rate)?;
        if frequency == self.requested {
            return Ok(());
        }

        match &mut self.generator {
            Generator::Saw(g) => g.set_frequency(frequency),
            Generator::Sine(g) => g.set_frequency(frequency)?,
            Generator::Square(g) => g.set_frequency(frequency),
        }
        self.requested = frequency;
        Ok(())
    }

    /// Progress of a smoothed frequency change. Only the sine smooths them.
    pub fn transition_phase(&self) -> TransitionPhase {
        match &self.generator {
            Generator::Sine(g) => g.transition_phase(),
            Generator::Saw(_) | Generator::Square(_) => TransitionPhase::Idle,
        }
    }

    pub fn intensity(&self) -> f64 {
        match &self.generator {
            Generator::Saw(g) => g.intensity(),
            Generator::Sine(g) => g.intensity(),
            Generator::Square(g) => g.intensity(),
        }
    }

    /// Set the intensity (in [0, 1])
    pub fn set_intensity(&mut self, intensity: f64) -> Result<()> {
        check_intensity(intensity)?;
        match &mut self.generator {
            Generator::Saw(g) => g.set_intensity(intensity),
            Generator::Sine(g) => g.set_intensity(intensity),
            Generator::Square(g) => g.set_intensity(intensity),
        }
        Ok(())
    }

    /// Fill `out` with the next samples
    pub fn process(&mut self, out: &mut [Sample]) {
        match &mut self.generator {
            Generator::Saw(g) => g.process(out),
            Generator::Sine(g) => g.process(out),
            Generator::Square(g) => g.process(out),
        }
    }
}

fn check_frequency(frequency: f64, sample_rate: f64) -> Result<()> {
    if !(0.0..sample_rate / 2.0).contains(&frequency) {
        return Err(SynthError::InvalidFrequency(frequency, sample_rate / 2.0));
    }
    Ok(())
}

fn check_intensity(intensity: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&intensity) {
        return Err(SynthError::InvalidIntensity(intensity));
    }
    Ok(())
}
