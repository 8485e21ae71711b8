//! Resonant low-pass biquad filter
//!
//! Coefficients are designed in double precision and run in Q3.28 with a
//! 64-bit accumulator. Parameter changes never swap coefficients at once:
//! they are blended over [`TRANSITION_LEN`] samples. A cutoff sweep chains
//! such blends until the target cutoff is reached.

use std::f64::consts::PI;

use tracing::{debug, warn};

use super::error::{BusyReason, Result, SynthError};
use super::fixed::{saturate, to_q3_28, Sample, COEFF_FRAC_BITS};

/// Length of a coefficient transition, in samples.
pub const TRANSITION_LEN: usize = 256;

const TABLE_SCALE: u32 = 16;

/// Monotonic [0, 1[ ramp in Q.16
static TRANSITION_TABLE: [u16; TRANSITION_LEN] = transition_table();

const fn transition_table() -> [u16; TRANSITION_LEN] {
    let mut table = [0u16; TRANSITION_LEN];
    let mut i = 0;
    while i < TRANSITION_LEN {
        table[i] = (i * ((1 << TABLE_SCALE) / TRANSITION_LEN)) as u16;
        i += 1;
    }
    table
}

/// User facing filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Cutoff frequency (Hz, ]0, fs/2[)
    pub fc: f64,
    /// Quality factor (> 0)
    pub q: f64,
    /// Gain (dB), carried along with the parameters
    pub gain: f64,
}

/// Normalized biquad coefficients
///
/// y[n] = b0.x[n] + b1.x[n-1] + b2.x[n-2] - a1.y[n-1] - a2.y[n-2]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Coefficients {
    /// Bilinear transform design of a resonant 2-pole low-pass
    pub fn design(params: &FilterParams, sample_rate: f64) -> Result<Self> {
        if !(params.q > 0.0) {
            return Err(SynthError::InvalidQuality(params.q));
        }
        if !(sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        if !(params.fc > 0.0 && params.fc < sample_rate / 2.0) {
            return Err(SynthError::InvalidCutoff(params.fc, sample_rate / 2.0));
        }

        let q = params.q;
        let k = (PI * params.fc / sample_rate).tan();
        let a0 = q + k + q * k * k;

        Ok(Self {
            b0: k * k * q / a0,
            b1: 2.0 * k * k * q / a0,
            b2: k * k * q / a0,
            a1: 2.0 * q * (k * k - 1.0) / a0,
            a2: (q - k + k * k * q) / a0,
        })
    }
}

/// Q3.28 coefficients used by the sample loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedCoefficients {
    pub b0: i32,
    pub b1: i32,
    pub b2: i32,
    pub a1: i32,
    pub a2: i32,
}

impl From<&Coefficients> for FixedCoefficients {
    fn from(c: &Coefficients) -> Self {
        Self {
            b0: to_q3_28(c.b0),
            b1: to_q3_28(c.b1),
            b2: to_q3_28(c.b2),
            a1: to_q3_28(c.a1),
            a2: to_q3_28(c.a2),
        }
    }
}

impl FixedCoefficients {
    /// Move each coefficient toward `target` by `scale` (Q.16) of the gap
    fn step_toward(&mut self, target: &Self, scale: u16) {
        let step = |current: &mut i32, target: i32| {
            let delta = target as i64 - *current as i64;
            *current += ((delta * scale as i64) >> TABLE_SCALE) as i32;
        };
        step(&mut self.b0, target.b0);
        step(&mut self.b1, target.b1);
        step(&mut self.b2, target.b2);
        step(&mut self.a1, target.a1);
        step(&mut self.a2, target.a2);
    }
}

#[derive(Debug, Clone, Copy)]
struct Sweep {
    target_fc: f64,
    index: usize,
    length: usize,
    step: f64,
}

/// Low-pass filter with glitch-free parameter updates
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    sample_rate: f64,
    params: FilterParams,

    coeffs: FixedCoefficients,
    target: FixedCoefficients,
    /// Progress of the running coefficient transition, if any
    transition: Option<usize>,
    sweep: Option<Sweep>,

    x1: Sample,
    x2: Sample,
    y1: Sample,
    y2: Sample,
}

impl LowPassFilter {
    /// Create a new filter
    pub fn new(params: FilterParams, sample_rate: f64) -> Result<Self> {
        let coeffs = FixedCoefficients::from(&Coefficients::design(&params, sample_rate)?);
        Ok(Self {
            sample_rate,
            params,
            coeffs,
            target: coeffs,
            transition: None,
            sweep: None,
            x1: 0,
            x2: 0,
            y1: 0,
            y2: 0,
        })
    }

    /// Parameters most recently applied (or being blended in)
    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// Get cutoff frequency
    pub fn cutoff(&self) -> f64 {
        self.params.fc
    }

    /// Coefficients used for the next sample
    pub fn coefficients(&self) -> FixedCoefficients {
        self.coeffs
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_some()
    }

    /// Blend toward new parameters over the next [`TRANSITION_LEN`] samples.
    ///
    /// Refused with `Busy` while a cutoff sweep is running.
    pub fn update(&mut self, params: FilterParams) -> Result<()> {
        if self.sweep.is_some() {
            return Err(SynthError::Busy(BusyReason::FilterSweep));
        }
        let coeffs = Coefficients::design(&params, self.sample_rate)?;
        self.begin_transition(params, &coeffs);
        Ok(())
    }

    /// Move the cutoff linearly to `target_fc` over `total_samples`.
    ///
    /// The sweep is cut in `total_samples / TRANSITION_LEN` steps (at least
    /// one), each one a coefficient transition.
    pub fn start_fc_sweep(&mut self, target_fc: f64, total_samples: usize) -> Result<()> {
        if !(target_fc > 0.0 && target_fc < self.sample_rate / 2.0) {
            return Err(SynthError::InvalidCutoff(target_fc, self.sample_rate / 2.0));
        }
        if total_samples == 0 {
            return Err(SynthError::InvalidDuration {
                name: "sweep",
                value: 0.0,
            });
        }
        if self.sweep.is_some() {
            return Err(SynthError::Busy(BusyReason::FilterSweep));
        }

        let length = (total_samples / TRANSITION_LEN).max(1);
        self.sweep = Some(Sweep {
            target_fc,
            index: 0,
            length,
            step: (target_fc - self.params.fc) / length as f64,
        });
        debug!(
            from = self.params.fc,
            to = target_fc,
            steps = length,
            "starting cutoff sweep"
        );
        self.sweep_step()
    }

    /// Filter `input` into `output` (same length)
    pub fn process(&mut self, input: &[Sample], output: &mut [Sample]) {
        debug_assert_eq!(input.len(), output.len());

        for (&x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.tick(x);
        }
    }

    /// Filter a buffer of samples in place
    pub fn process_in_place(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample);
        }
    }

    fn tick(&mut self, x: Sample) -> Sample {
        if self.transition.is_some() {
            self.advance_transition();
        }

        let c = &self.coeffs;
        let mut acc = c.b0 as i64 * x as i64
            + c.b1 as i64 * self.x1 as i64
            + c.b2 as i64 * self.x2 as i64
            - c.a1 as i64 * self.y1 as i64
            - c.a2 as i64 * self.y2 as i64;

        // Round toward zero on both signs
        if acc < 0 {
            acc += (1 << COEFF_FRAC_BITS) - 1;
        }
        let out = saturate(acc >> COEFF_FRAC_BITS);

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = out;
        out
    }

    /// Reset filter state (clear history)
    pub fn reset(&mut self) {
        self.x1 = 0;
        self.x2 = 0;
        self.y1 = 0;
        self.y2 = 0;
    }

    fn begin_transition(&mut self, params: FilterParams, coeffs: &Coefficients) {
        self.target = FixedCoefficients::from(coeffs);
        self.transition = Some(0);
        self.params = params;
    }

    fn advance_transition(&mut self) {
        let Some(index) = self.transition else {
            return;
        };

        self.coeffs.step_toward(&self.target, TRANSITION_TABLE[index]);

        if index + 1 < TRANSITION_LEN {
            self.transition = Some(index + 1);
            return;
        }

        self.coeffs = self.target;
        self.transition = None;
        if self.sweep.is_some() {
            if let Err(err) = self.sweep_step() {
                // Intermediate cutoffs lie between two valid ones
                warn!(%err, "cutoff sweep aborted");
                self.sweep = None;
            }
        }
    }

    /// Start the next sweep transition
    fn sweep_step(&mut self) -> Result<()> {
        let Some(mut sweep) = self.sweep else {
            return Ok(());
        };

        let mut params = self.params;
        sweep.index += 1;
        if sweep.index == sweep.length {
            params.fc = sweep.target_fc;
            self.sweep = None;
            debug!(fc = params.fc, "cutoff sweep reached its target");
        } else {
            params.fc += sweep.step;
            self.sweep = Some(sweep);
        }

        let coeffs = Coefficients::design(&params, self.sample_rate)?;
        self.begin_transition(params, &coeffs);
        Ok(())
    }
}
