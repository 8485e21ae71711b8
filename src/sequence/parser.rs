//! Lilypond-like sequence parser
//!
//! ```text
//! % comment until end of line
//! \fc=800 \q=2 c'4 d e8 r4 \sweep=2000 g,16
//! ```
//!
//! A note token is a note name, optional octave marks (`'` up, `,` down)
//! and an optional length in sixteenth notes. `r` is a rest. Backslash
//! directives attach filter changes to the next note or rest.

use super::{Event, FilterOverride, Note, NoteName, Sequence, SequenceError};

/// Supported note lengths, in sixteenth notes
pub const ALLOWED_LENGTHS: [u32; 5] = [1, 2, 4, 8, 16];

/// Parse a whole sequence
pub fn parse_sequence(text: &str) -> Result<Sequence, SequenceError> {
    let mut events = Vec::new();
    let mut pending = FilterOverride::default();
    let mut last_directive: Option<(usize, String)> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let at_line = |source: SequenceError| SequenceError::AtLine {
            line: line_no,
            source: Box::new(source),
        };

        let code = line.split('%').next().unwrap_or_default();
        for token in code.split_whitespace() {
            if let Some(directive) = token.strip_prefix('\\') {
                parse_directive(directive, &mut pending)
                    .ok_or_else(|| at_line(SequenceError::InvalidDirective(token.to_string())))?;
                last_directive = Some((line_no, token.to_string()));
                continue;
            }

            let mut event = parse_event(token).map_err(at_line)?;
            event.filter = std::mem::take(&mut pending);
            last_directive = None;
            events.push(event);
        }
    }

    if let Some((line, token)) = last_directive {
        return Err(SequenceError::AtLine {
            line,
            source: Box::new(SequenceError::DanglingDirective(token)),
        });
    }

    Ok(Sequence { events })
}

/// `[NAME][OCTAVE MARKS][LENGTH]`
fn parse_event(token: &str) -> Result<Event, SequenceError> {
    let name_end = token
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(token.len());
    let (name, rest) = token.split_at(name_end);

    let note = if name.eq_ignore_ascii_case("r") {
        Note::Rest
    } else {
        Note::Name(name.parse::<NoteName>()?)
    };

    let marks_end = rest.find(|c: char| c != '\'' && c != ',').unwrap_or(rest.len());
    let (marks, rest) = rest.split_at(marks_end);
    let rank_update: i32 = marks
        .chars()
        .map(|c| if c == '\'' { 1 } else { -1 })
        .sum();

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, rest) = rest.split_at(digits_end);
    if !rest.is_empty() {
        return Err(SequenceError::TrailingCharacters {
            token: token.to_string(),
            rest: rest.to_string(),
        });
    }

    let length = if digits.is_empty() {
        None
    } else {
        match digits.parse::<u32>() {
            Ok(len) if ALLOWED_LENGTHS.contains(&len) => Some(len),
            _ => return Err(SequenceError::InvalidLength(digits.to_string())),
        }
    };

    Ok(Event {
        note,
        rank_update,
        length,
        filter: FilterOverride::default(),
    })
}

/// `name=value`, value being a finite number
fn parse_directive(directive: &str, pending: &mut FilterOverride) -> Option<()> {
    let (name, value) = directive.split_once('=')?;
    let value: f64 = value.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let slot = match name {
        "fc" => &mut pending.fc,
        "q" => &mut pending.q,
        "gain" => &mut pending.gain,
        "sweep" => &mut pending.sweep,
        _ => return None,
    };
    *slot = Some(value);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Accidental, Letter};

    fn note(letter: Letter, accidental: Accidental) -> Note {
        Note::Name(NoteName::new(letter, accidental))
    }

    #[test]
    fn test_parse_notes() {
        let seq = parse_sequence("c'4 ds,,8 bb r16 e").unwrap();
        assert_eq!(seq.len(), 5);

        assert_eq!(seq.events[0].note, note(Letter::C, Accidental::Natural));
        assert_eq!(seq.events[0].rank_update, 1);
        assert_eq!(seq.events[0].length, Some(4));

        assert_eq!(seq.events[1].note, note(Letter::D, Accidental::Sharp));
        assert_eq!(seq.events[1].rank_update, -2);
        assert_eq!(seq.events[1].length, Some(8));

        assert_eq!(seq.events[2].note, note(Letter::B, Accidental::Flat));
        assert_eq!(seq.events[2].length, None);

        assert_eq!(seq.events[3].note, Note::Rest);
        assert_eq!(seq.events[3].length, Some(16));

        assert_eq!(seq.events[4].rank_update, 0);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "% title\n\n  c d % trailing\n%e f\ng\n";
        let seq = parse_sequence(text).unwrap();
        assert_eq!(seq.len(), 3);
        assert!(parse_sequence("% only a comment").unwrap().is_empty());
    }

    #[test]
    fn test_directives_attach_to_next_event() {
        let seq = parse_sequence("\\fc=800 \\q=2.5\nc4 d \\gain=-3 \\sweep=1500 r").unwrap();
        assert_eq!(seq.events[0].filter.fc, Some(800.0));
        assert_eq!(seq.events[0].filter.q, Some(2.5));
        assert!(seq.events[1].filter.is_empty());
        assert_eq!(seq.events[2].filter.gain, Some(-3.0));
        assert_eq!(seq.events[2].filter.sweep, Some(1500.0));
    }

    #[test]
    fn test_dangling_directive() {
        let err = parse_sequence("c d\n\\fc=900").unwrap_err();
        assert_eq!(
            err,
            SequenceError::AtLine {
                line: 2,
                source: Box::new(SequenceError::DanglingDirective("\\fc=900".to_string())),
            }
        );
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(
            parse_sequence("c d\nh4"),
            Err(SequenceError::AtLine { line: 2, .. })
        ));
        assert!(parse_sequence("c3").is_err());
        assert!(parse_sequence("c32").is_err());
        assert!(parse_sequence("c4'").is_err());
        assert!(parse_sequence("cis").is_err());
        assert!(parse_sequence("\\fc").is_err());
        assert!(parse_sequence("\\fc=abc c").is_err());
        assert!(parse_sequence("\\cutoff=100 c").is_err());
    }

    #[test]
    fn test_invalid_length_message() {
        let err = parse_sequence("e5").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: unsupported note length '5' (expected 1, 2, 4, 8 or 16)"
        );
    }
}
