//! Note names and equal temperament frequencies

use std::fmt;
use std::str::FromStr;

use super::SequenceError;

/// C0, reference of the lowest rank
pub const C0: f64 = 16.351597831287414;

/// Highest supported rank
pub const MAX_RANK: i32 = 8;

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    fn semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'c' => Some(Letter::C),
            'd' => Some(Letter::D),
            'e' => Some(Letter::E),
            'f' => Some(Letter::F),
            'g' => Some(Letter::G),
            'a' => Some(Letter::A),
            'b' => Some(Letter::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}

/// A note name within one rank, e.g. `C`, `Fs`, `Bd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: Accidental,
}

impl NoteName {
    pub fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    /// Semitones above the C of the same rank.
    ///
    /// Accidentals wrap within the rank: `Bs` is that rank's C and `Cd` its B.
    pub fn semitone(&self) -> i32 {
        let shift = match self.accidental {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        };
        (self.letter.semitone() + shift).rem_euclid(12)
    }
}

impl FromStr for NoteName {
    type Err = SequenceError;

    /// Letter (any case) and an optional `s` (sharp), `d` or `b` (flat)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SequenceError::InvalidNote(s.to_string());
        let mut chars = s.chars();

        let letter = chars.next().and_then(Letter::from_char).ok_or_else(invalid)?;
        let accidental = match chars.next() {
            None => Accidental::Natural,
            Some('s') => Accidental::Sharp,
            Some('d') | Some('b') => Accidental::Flat,
            Some(_) => return Err(invalid()),
        };
        if chars.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { letter, accidental })
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.letter)?;
        match self.accidental {
            Accidental::Natural => Ok(()),
            Accidental::Sharp => write!(f, "s"),
            Accidental::Flat => write!(f, "d"),
        }
    }
}

/// Frequency (Hz) of `name` in octave `rank` (0..=8)
pub fn note_frequency(rank: i32, name: &NoteName) -> Result<f64, SequenceError> {
    if !(0..=MAX_RANK).contains(&rank) {
        return Err(SequenceError::InvalidRank(rank));
    }
    let base = C0 * 2f64.powi(rank);
    Ok(base * 2f64.powf(name.semitone() as f64 / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(rank: i32, name: &str) -> f64 {
        note_frequency(rank, &name.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_reference_pitches() {
        assert!((freq(4, "A") - 440.0).abs() < 1e-9);
        assert!((freq(4, "C") - 261.6255653005986).abs() < 1e-9);
        assert!((freq(0, "C") - C0).abs() < 1e-12);
        assert!((freq(8, "C") - 4186.009044809578).abs() < 1e-9);
    }

    #[test]
    fn test_enharmonics() {
        assert_eq!(freq(3, "Cs"), freq(3, "Dd"));
        assert_eq!(freq(3, "As"), freq(3, "Bb"));
        assert_eq!(freq(3, "Es"), freq(3, "F"));
        assert_eq!(freq(3, "Fd"), freq(3, "E"));
        assert_eq!(freq(3, "Bs"), freq(3, "C"));
        assert_eq!(freq(3, "Cd"), freq(3, "B"));
    }

    #[test]
    fn test_parse_note_names() {
        let n: NoteName = "fs".parse().unwrap();
        assert_eq!(n, NoteName::new(Letter::F, Accidental::Sharp));
        let n: NoteName = "Bb".parse().unwrap();
        assert_eq!(n, NoteName::new(Letter::B, Accidental::Flat));
        assert_eq!(n.to_string(), "Bd");

        assert!("h".parse::<NoteName>().is_err());
        assert!("cx".parse::<NoteName>().is_err());
        assert!("css".parse::<NoteName>().is_err());
        assert!("".parse::<NoteName>().is_err());
    }

    #[test]
    fn test_rank_out_of_range() {
        let a: NoteName = "A".parse().unwrap();
        assert_eq!(note_frequency(9, &a), Err(SequenceError::InvalidRank(9)));
        assert_eq!(note_frequency(-1, &a), Err(SequenceError::InvalidRank(-1)));
    }
}
