//! Note sequences
//!
//! A lilypond-like text notation parsed into a list of [`Event`]s, and the
//! note name to frequency lookup used when playing them.

mod notes;
mod parser;

pub use notes::{note_frequency, Accidental, Letter, NoteName, C0, MAX_RANK};
pub use parser::{parse_sequence, ALLOWED_LENGTHS};

use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;

/// Sequence parsing and lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("unknown note name '{0}'")]
    InvalidNote(String),
    #[error("note rank {0} out of range (0..=8)")]
    InvalidRank(i32),
    #[error("unsupported note length '{0}' (expected 1, 2, 4, 8 or 16)")]
    InvalidLength(String),
    #[error("malformed directive '{0}'")]
    InvalidDirective(String),
    #[error("directive '{0}' is not followed by a note or rest")]
    DanglingDirective(String),
    #[error("unexpected characters '{rest}' in '{token}'")]
    TrailingCharacters { token: String, rest: String },
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<SequenceError>,
    },
}

/// What an event plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    Name(NoteName),
    Rest,
}

/// Filter changes applied when an event starts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterOverride {
    /// Cutoff frequency (Hz)
    pub fc: Option<f64>,
    /// Quality factor
    pub q: Option<f64>,
    /// Gain (dB)
    pub gain: Option<f64>,
    /// Cutoff reached at the end of the event (Hz)
    pub sweep: Option<f64>,
}

impl FilterOverride {
    pub fn is_empty(&self) -> bool {
        self.fc.is_none() && self.q.is_none() && self.gain.is_none() && self.sweep.is_none()
    }

    /// True when a discrete parameter update is requested
    pub fn has_update(&self) -> bool {
        self.fc.is_some() || self.q.is_some() || self.gain.is_some()
    }
}

/// A single note or rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub note: Note,
    /// Octave shift applied to the running rank before playing
    pub rank_update: i32,
    /// New running length, in sixteenth notes
    pub length: Option<u32>,
    pub filter: FilterOverride,
}

/// A parsed sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    pub events: Vec<Event>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Load a sequence from a file
pub fn load_sequence(path: &Path) -> Result<Sequence> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sequence file: {}", path.display()))?;
    let sequence = parse_sequence(&contents)
        .with_context(|| format!("Failed to parse sequence file: {}", path.display()))?;
    Ok(sequence)
}
