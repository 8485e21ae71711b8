//! lilymoog - Moog-style synthesizer for lilypond-like note sequences
//!
//! Parses a note sequence, plays it on a monophonic subtractive voice
//! (oscillators, ADSR envelope, resonant low-pass filter) and writes the
//! result to a WAV file.

pub mod config;
pub mod engine;
pub mod sequence;
pub mod synth;

pub use config::SynthConfig;
pub use engine::{Engine, Recorder, SampleSink};
pub use sequence::{load_sequence, parse_sequence, Sequence};
pub use synth::{Voice, VoiceParams};
