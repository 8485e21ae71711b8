//! Monophonic subtractive voice
//!
//! One or two oscillators, summed with saturation, shaped by the ADSR
//! envelope and run through the resonant low-pass filter:
//!
//! ```text
//! osc1 ─┬─ sum ─ × envelope ─ filter ─ frame
//! osc2 ─┘
//! ```

use serde::{Deserialize, Serialize};

use super::envelope::{Envelope, EnvelopeParams};
use super::error::{Result, SynthError};
use super::filter::{FilterParams, LowPassFilter};
use super::fixed::{saturate, Sample};
use super::oscillator::{Oscillator, Waveform};

/// Pitch interval between the primary and secondary oscillator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupling {
    /// Single oscillator
    None,
    ThirdMinor,
    ThirdMajor,
    #[default]
    Fifth,
    Octave,
}

impl Coupling {
    /// Frequency ratio of the secondary oscillator, if any
    pub fn ratio(self) -> Option<f64> {
        match self {
            Coupling::None => None,
            Coupling::ThirdMinor => Some(2f64.powf(3.0 / 12.0)),
            Coupling::ThirdMajor => Some(2f64.powf(4.0 / 12.0)),
            Coupling::Fifth => Some(2f64.powf(7.0 / 12.0)),
            Coupling::Octave => Some(2.0),
        }
    }
}

/// Everything needed to build a [`Voice`]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    pub sample_rate: f64,
    /// Samples per frame
    pub frame_size: usize,
    pub filter: FilterParams,
    /// Attack time (ms)
    pub attack: f64,
    /// Decay time (ms)
    pub decay: f64,
    pub sustain: f64,
    /// Release time (ms)
    pub release: f64,
    pub waveform: Waveform,
    pub coupling: Coupling,
    /// Oscillator loudness
    pub intensity: f64,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            frame_size: 7659,
            filter: FilterParams {
                fc: 400.0,
                q: 1.5,
                gain: 1.0,
            },
            attack: 25.0,
            decay: 15.0,
            sustain: 0.7,
            release: 10.0,
            waveform: Waveform::Saw,
            coupling: Coupling::Fifth,
            intensity: 0.6,
        }
    }
}

/// A monophonic synthesizer voice rendering fixed size frames
#[derive(Debug, Clone)]
pub struct Voice {
    sample_rate: f64,
    frame_size: usize,
    coupling: Coupling,
    frequency: f64,
    intensity: f64,

    primary: Oscillator,
    secondary: Option<Oscillator>,
    envelope: Envelope,
    filter: LowPassFilter,

    // Scratch, sized once
    gain: Vec<f64>,
    aux: Vec<Sample>,
    output: Vec<Sample>,
}

impl Voice {
    /// Create a new voice. Oscillators stay silent until a frequency is set.
    pub fn new(params: &VoiceParams) -> Result<Self> {
        if params.frame_size == 0 {
            return Err(SynthError::InvalidFrameSize(params.frame_size));
        }

        let fs = params.sample_rate;
        let primary = Oscillator::new(params.waveform, fs, 0.0, params.intensity)?;
        let secondary = match params.coupling.ratio() {
            Some(_) => Some(Oscillator::new(params.waveform, fs, 0.0, params.intensity)?),
            None => None,
        };
        let envelope = Envelope::new(&EnvelopeParams {
            sample_rate: fs,
            attack: params.attack,
            decay: params.decay,
            sustain: params.sustain,
            release: params.release,
        })?;
        let filter = LowPassFilter::new(params.filter, fs)?;

        let n = params.frame_size;
        Ok(Self {
            sample_rate: fs,
            frame_size: n,
            coupling: params.coupling,
            frequency: 0.0,
            intensity: params.intensity,
            primary,
            secondary,
            envelope,
            filter,
            gain: vec![0.0; n],
            aux: vec![0; n],
            output: vec![0; n],
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn coupling(&self) -> Coupling {
        self.coupling
    }

    /// Frequency of the primary oscillator (Hz)
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Frequency of the coupled oscillator, if any
    pub fn secondary_frequency(&self) -> Option<f64> {
        self.secondary.as_ref().map(Oscillator::frequency)
    }

    /// Set the note frequency (Hz, within ]0, fs/2[).
    ///
    /// A sine voice may answer `Busy` while an earlier transition is
    /// pending; calling again later completes the change.
    pub fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        let nyquist = self.sample_rate / 2.0;
        if !(frequency > 0.0 && frequency < nyquist) {
            return Err(SynthError::InvalidFrequency(frequency, nyquist));
        }

        self.primary.set_frequency(frequency)?;
        if let (Some(osc), Some(ratio)) = (self.secondary.as_mut(), self.coupling.ratio()) {
            osc.set_frequency(frequency * ratio)?;
        }
        self.frequency = frequency;
        Ok(())
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Set the oscillator loudness (within [0, 1])
    pub fn set_intensity(&mut self, intensity: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&intensity) {
            return Err(SynthError::InvalidIntensity(intensity));
        }
        self.primary.set_intensity(intensity)?;
        if let Some(osc) = self.secondary.as_mut() {
            osc.set_intensity(intensity)?;
        }
        self.intensity = intensity;
        Ok(())
    }

    /// Note ON or OFF
    pub fn toggle(&mut self, on: bool) -> Result<()> {
        self.envelope.toggle(on, self.intensity)
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn filter_parameters(&self) -> FilterParams {
        self.filter.params()
    }

    /// Blend the filter toward new parameters
    pub fn filter_update(&mut self, fc: f64, q: f64, gain: f64) -> Result<()> {
        self.filter.update(FilterParams { fc, q, gain })
    }

    /// Sweep the cutoff to `target_fc` over `nb_frames` frames
    pub fn filter_start_fc_sweep(&mut self, target_fc: f64, nb_frames: usize) -> Result<()> {
        self.filter
            .start_fc_sweep(target_fc, nb_frames.saturating_mul(self.frame_size))
    }

    /// Render the next frame
    pub fn process(&mut self) -> &[Sample] {
        self.render(self.frame_size);
        &self.output
    }

    /// Render `out.len()` samples into a caller owned buffer
    pub fn process_into(&mut self, out: &mut [Sample]) {
        for chunk in out.chunks_mut(self.frame_size) {
            self.render(chunk.len());
            chunk.copy_from_slice(&self.output[..chunk.len()]);
        }
    }

    fn render(&mut self, n: usize) {
        let gain = &mut self.gain[..n];
        let mix = &mut self.output[..n];

        self.envelope.process(gain);
        self.primary.process(mix);

        if let Some(osc) = self.secondary.as_mut() {
            let aux = &mut self.aux[..n];
            osc.process(aux);
            for (m, &a) in mix.iter_mut().zip(aux.iter()) {
                *m = saturate(*m as i64 + a as i64);
            }
        }

        for (m, &g) in mix.iter_mut().zip(gain.iter()) {
            *m = (g * *m as f64) as Sample;
        }

        self.filter.process_in_place(mix);
    }
}
