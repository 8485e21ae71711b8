//! Errors reported by the synthesis core

use thiserror::Error;

/// Why a call was refused for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyReason {
    /// A cutoff sweep owns the filter coefficients.
    FilterSweep,
    /// An oscillator frequency transition is still pending.
    FrequencyTransition,
    /// The envelope is ramping (attack, decay or release).
    EnvelopeTransition,
}

/// Synthesis core error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("invalid frequency: {0} Hz (must be within ]0, {1}[)")]
    InvalidFrequency(f64, f64),
    #[error("invalid intensity: {0} (must be within [0, 1])")]
    InvalidIntensity(f64),
    #[error("invalid quality factor: {0} (must be > 0)")]
    InvalidQuality(f64),
    #[error("invalid cutoff frequency: {0} Hz (must be within ]0, {1}[)")]
    InvalidCutoff(f64, f64),
    #[error("invalid sampling rate: {0} Hz")]
    InvalidSampleRate(f64),
    #[error("invalid {name} duration: {value}")]
    InvalidDuration { name: &'static str, value: f64 },
    #[error("invalid sustain factor: {0} (must be within ]0, 1])")]
    InvalidSustain(f64),
    #[error("invalid frame size: {0}")]
    InvalidFrameSize(usize),
    #[error("busy: {0:?}, retry on a later frame")]
    Busy(BusyReason),
}

impl SynthError {
    /// Busy errors are expected; the caller may retry on a later frame.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SynthError::Busy(_))
    }
}

/// Result alias for the synthesis core
pub type Result<T> = std::result::Result<T, SynthError>;
