//! Synthesis core
//!
//! Oscillators, ADSR envelope and resonant low-pass filter, composed into a
//! monophonic [`Voice`]. Everything runs on Q8.23 fixed-point samples.

mod envelope;
mod error;
mod filter;
pub mod fixed;
mod oscillator;
mod saw;
mod sine;
mod square;
mod voice;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeStage};
pub use error::{BusyReason, Result, SynthError};
pub use filter::{Coefficients, FilterParams, FixedCoefficients, LowPassFilter, TRANSITION_LEN};
pub use fixed::Sample;
pub use oscillator::{Oscillator, Waveform};
pub use sine::TransitionPhase;
pub use voice::{Coupling, Voice, VoiceParams};
