// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Phrase strings to playable tokens.
//!
//! A phrase is typed in scale degrees: `"1 3+5 _2-"`. Digits pick a degree of
//! the current scale, `+`/`-` after a note raise or lower its octave, a space
//! holds, and any other character is passed through as a duration or command
//! suffix. `q` ends the phrase early.

use tracing::warn;

use super::ring::Octave;
use super::scale::Note;

/// Highest octave the player accepts
const MAX_OCTAVE: Octave = 7;

/// Note rendered when a digit names a degree outside the scale
const FALLBACK_NOTE: &str = "C";

/// Compile a phrase against the degree names of a scale.
///
/// `degrees[0]` is degree 1. Octaves are `root_octave` plus the pending
/// shift, clamped to 0-7.
pub fn compile(text: &str, degrees: &[Note], root_octave: Octave) -> String {
    let octave = |shift: Octave| (root_octave + shift).clamp(0, MAX_OCTAVE).to_string();

    let mut out = String::new();
    // A note was written and still needs its octave
    let mut awaiting_octave = false;
    let mut shift: Octave = 0;

    for c in text.chars() {
        match c {
            'q' | 'Q' => break,
            '0'..='9' => {
                if awaiting_octave {
                    out.push_str(&octave(shift));
                }
                let degree = c.to_digit(10).unwrap_or(0) as usize;
                match degree.checked_sub(1).and_then(|i| degrees.get(i)) {
                    Some(note) => out.push_str(note.name()),
                    None => {
                        warn!(degree, "note not in scale, playing C instead");
                        out.push_str(FALLBACK_NOTE);
                    }
                }
                awaiting_octave = true;
                shift = 0;
            }
            '-' => shift -= 1,
            '+' => shift += 1,
            ' ' => {
                if awaiting_octave {
                    out.push_str(&octave(shift));
                }
                out.push('-');
                shift = 0;
                awaiting_octave = false;
            }
            other => {
                if awaiting_octave {
                    out.push_str(&octave(shift));
                }
                out.push(other);
                shift = 0;
                awaiting_octave = false;
            }
        }
    }

    if awaiting_octave {
        out.push_str(&octave(shift));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const C_MAJOR: [Note; 7] = [Note::C, Note::D, Note::E, Note::F, Note::G, Note::A, Note::B];

    #[test]
    fn test_single_notes() {
        assert_eq!(compile("1", &C_MAJOR, 4), "C4");
        assert_eq!(compile("123", &C_MAJOR, 4), "C4D4E4");
        assert_eq!(compile("", &C_MAJOR, 4), "");
    }

    #[test]
    fn test_space_holds() {
        assert_eq!(compile("1 5", &C_MAJOR, 4), "C4-G4");
        assert_eq!(compile("1  ", &C_MAJOR, 4), "C4--");
        assert_eq!(compile(" 1", &C_MAJOR, 4), "-C4");
    }

    #[test]
    fn test_octave_shift_follows_note() {
        assert_eq!(compile("1+", &C_MAJOR, 4), "C5");
        assert_eq!(compile("1++2", &C_MAJOR, 4), "C6D4");
        assert_eq!(compile("5- 1", &C_MAJOR, 4), "G3-C4");
        // A shift with no pending note is dropped by the next note
        assert_eq!(compile("+1", &C_MAJOR, 4), "C4");
    }

    #[test]
    fn test_octave_clamped() {
        assert_eq!(compile("1+++++", &C_MAJOR, 4), "C7");
        assert_eq!(compile("1-----", &C_MAJOR, 4), "C0");
        assert_eq!(compile("1", &C_MAJOR, 9), "C7");
    }

    #[test]
    fn test_literal_suffixes() {
        assert_eq!(compile("1_2.", &C_MAJOR, 4), "C4_D4.");
        assert_eq!(compile("_1", &C_MAJOR, 4), "_C4");
    }

    #[test]
    fn test_invalid_degree_falls_back() {
        assert_eq!(compile("8", &C_MAJOR, 4), "C4");
        assert_eq!(compile("0", &C_MAJOR, 4), "C4");
    }

    #[test]
    fn test_quit_stops_parsing() {
        assert_eq!(compile("12q345", &C_MAJOR, 4), "C4D4");
        assert_eq!(compile("Q1", &C_MAJOR, 4), "");
    }
}
