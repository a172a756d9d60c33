// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale and key system for musical operations.
//!
//! A scale is derived by walking the twelve-semitone ring from the key with a
//! mode rule of interval steps. Chords are read back as scale-degree offsets
//! from a temporarily relocated root of the derived interval ring, so octave
//! bookkeeping falls out of the ring arithmetic.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::phrase;
use super::ring::{Octave, Ring};
use crate::error::{Error, Result};
use crate::player::{compose_token, Player};
use crate::timing::Pacer;

/// Semitone number within an octave (1 = C ... 12 = B)
pub type Semitone = u8;

/// Octave used when rendering semitone pairs to letter notes
pub const DEFAULT_ROOT_OCTAVE: Octave = 4;

/// Suffix appended to each progression chord so it rings until the next one
pub const PROGRESSION_HOLD: &str = "--";

/// Chord offsets in scale degrees: root, third, fifth
const TRIAD: [i64; 3] = [0, 2, 4];

/// Triad plus root and fifth an octave below
const TRIAD_WITH_LOW_NOTES: [i64; 5] = [-7, -3, 0, 2, 4];

/// Built-in interval rules. Each step is the number of semitones skipped
/// before the next scale note.
const BUILTIN_RULES: [(&str, &[u8]); 4] = [
    ("major_scale", &[1, 1, 0, 1, 1, 1, 0]),
    ("minor_scale", &[1, 0, 1, 1, 0, 1, 1]),
    ("harmonic_scale", &[1, 0, 1, 1, 0, 2, 1]),
    ("melodic_minor", &[1, 0, 1, 1, 1, 1, 0]),
];

/// Look up a built-in mode rule by name
pub fn builtin_rule(name: &str) -> Option<&'static [u8]> {
    BUILTIN_RULES
        .iter()
        .find(|(mode, _)| *mode == name)
        .map(|(_, rule)| *rule)
}

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        match self {
            Note::C => 0,
            Note::Cs => 1,
            Note::D => 2,
            Note::Ds => 3,
            Note::E => 4,
            Note::F => 5,
            Note::Fs => 6,
            Note::G => 7,
            Note::Gs => 8,
            Note::A => 9,
            Note::As => 10,
            Note::B => 11,
        }
    }

    /// Get the semitone number (1-12) for this note
    pub fn semitone(self) -> Semitone {
        self.pitch_class() + 1
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Get note from a 1-based semitone number, wrapping outside 1-12
    pub fn from_semitone(semitone: Semitone) -> Self {
        Note::ALL[(semitone as i16 - 1).rem_euclid(12) as usize]
    }

    /// Parse note from string (e.g., "C", "c#", " Db ", "F#")
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" => Some(Note::C),
            "C#" | "DB" => Some(Note::Cs),
            "D" => Some(Note::D),
            "D#" | "EB" => Some(Note::Ds),
            "E" | "FB" => Some(Note::E),
            "F" | "E#" => Some(Note::F),
            "F#" | "GB" => Some(Note::Fs),
            "G" => Some(Note::G),
            "G#" | "AB" => Some(Note::Gs),
            "A" => Some(Note::A),
            "A#" | "BB" => Some(Note::As),
            "B" | "CB" => Some(Note::B),
            _ => None,
        }
    }

    /// Letter name with sharp spelling
    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key given either by letter name or by semitone number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    Name(String),
    Number(i64),
}

impl KeySpec {
    /// Validate and convert to a semitone number (1-12)
    pub fn resolve(&self) -> Result<Semitone> {
        match self {
            KeySpec::Name(name) => Note::from_name(name)
                .map(Note::semitone)
                .ok_or_else(|| Error::InvalidKey(name.clone())),
            KeySpec::Number(n) if (1..=12).contains(n) => Ok(*n as Semitone),
            KeySpec::Number(n) => Err(Error::InvalidKey(n.to_string())),
        }
    }
}

impl From<&str> for KeySpec {
    fn from(name: &str) -> Self {
        KeySpec::Name(name.to_string())
    }
}

impl From<String> for KeySpec {
    fn from(name: String) -> Self {
        KeySpec::Name(name)
    }
}

impl From<i64> for KeySpec {
    fn from(n: i64) -> Self {
        KeySpec::Number(n)
    }
}

impl From<i32> for KeySpec {
    fn from(n: i32) -> Self {
        KeySpec::Number(n as i64)
    }
}

impl From<u8> for KeySpec {
    fn from(n: u8) -> Self {
        KeySpec::Number(n as i64)
    }
}

impl From<Note> for KeySpec {
    fn from(note: Note) -> Self {
        KeySpec::Number(note.semitone() as i64)
    }
}

/// A semitone paired with its octave relative to the rendering root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub semitone: Semitone,
    pub octave: Octave,
}

impl Pitch {
    pub fn new(semitone: Semitone, octave: Octave) -> Self {
        Self { semitone, octave }
    }

    /// Render as `<Letter><root_octave + octave>`
    pub fn letter(&self, root_octave: Octave) -> String {
        format!("{}{}", Note::from_semitone(self.semitone), root_octave + self.octave)
    }
}

impl From<(Semitone, Octave)> for Pitch {
    fn from((semitone, octave): (Semitone, Octave)) -> Self {
        Pitch::new(semitone, octave)
    }
}

/// Render semitone pairs as letter notes, e.g. `(1, 0)` -> `"C4"` at root octave 4
pub fn semitones_to_letter_notes(pitches: &[Pitch], root_octave: Octave) -> Vec<String> {
    pitches.iter().map(|p| p.letter(root_octave)).collect()
}

/// Render MIDI note numbers as letter notes (60 -> `"C4"`)
pub fn midi_to_letter_notes(notes: &[u8]) -> Vec<String> {
    notes
        .iter()
        .map(|&m| {
            let octave = (m / 12) as Octave - 1;
            format!("{}{}", Note::from_pitch_class(m % 12), octave)
        })
        .collect()
}

/// Parse a letter note back into a semitone pair relative to `root_octave`
pub fn parse_letter_note(token: &str, root_octave: Octave) -> Result<Pitch> {
    let token = token.trim();
    let split = token
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .ok_or_else(|| Error::InvalidLetterNote(token.to_string()))?;
    let (name, octave) = token.split_at(split);
    let note = Note::from_name(name).ok_or_else(|| Error::InvalidLetterNote(token.to_string()))?;
    let octave: Octave = octave
        .parse()
        .map_err(|_| Error::InvalidLetterNote(token.to_string()))?;
    Ok(Pitch::new(note.semitone(), octave - root_octave))
}

/// Registry of mode rules: built-ins plus custom rules loaded from config
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    custom: HashMap<String, Vec<u8>>,
}

impl ModeRegistry {
    /// Create a registry with only the built-in modes
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom mode, replacing any previous rule with that name
    pub fn register(&mut self, name: &str, rule: Vec<u8>) -> Result<()> {
        if rule.is_empty() {
            return Err(Error::UnsupportedMode(name.to_string()));
        }
        self.custom.insert(name.to_string(), rule);
        Ok(())
    }

    /// Get a rule by name (checks custom first, then built-in)
    pub fn rule(&self, name: &str) -> Option<&[u8]> {
        self.custom
            .get(name)
            .map(Vec::as_slice)
            .or_else(|| builtin_rule(name))
    }

    /// Build a scale for a key and mode name
    pub fn scale(&self, key: impl Into<KeySpec>, name: &str) -> Result<Scale> {
        match self.rule(name) {
            Some(rule) => Scale::with_rule(key, name, rule.to_vec()),
            None => Scale::new(key, name),
        }
    }

    /// List all available mode names
    pub fn available_modes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.custom.keys().cloned().collect();
        names.extend(BUILTIN_RULES.iter().map(|(name, _)| name.to_string()));
        names.sort();
        names.dedup();
        names
    }
}

/// A key and mode with its derived interval ring
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    key: Semitone,
    name: String,
    rule: Option<Vec<u8>>,
    semitones: Ring<Semitone>,
    intervals: Option<Ring<Semitone>>,
}

impl Scale {
    /// Create a scale from a key and a built-in mode name.
    ///
    /// An unknown mode is accepted; intervals stay underived until a valid
    /// mode is set.
    pub fn new(key: impl Into<KeySpec>, name: &str) -> Result<Self> {
        Self::build(key.into(), name, builtin_rule(name).map(<[u8]>::to_vec))
    }

    /// Create a scale from a key and an explicit rule
    pub fn with_rule(key: impl Into<KeySpec>, name: &str, rule: Vec<u8>) -> Result<Self> {
        if rule.is_empty() {
            return Err(Error::UnsupportedMode(name.to_string()));
        }
        Self::build(key.into(), name, Some(rule))
    }

    fn build(key: KeySpec, name: &str, rule: Option<Vec<u8>>) -> Result<Self> {
        let mut scale = Self {
            key: key.resolve()?,
            name: name.to_string(),
            rule,
            semitones: Ring::new(1..=12),
            intervals: None,
        };
        scale.initialize()?;
        Ok(scale)
    }

    fn initialize(&mut self) -> Result<()> {
        self.semitones.set_root_idx(self.key as i64 - 1);
        self.intervals = match self.rule {
            Some(_) => Some(self.get_intervals()?),
            None => None,
        };
        if let Some(intervals) = &self.intervals {
            debug!(scale = %self.name, key = self.key, intervals = %intervals, "derived intervals");
        }
        Ok(())
    }

    /// Derive the interval ring by walking the semitone ring from the key
    pub fn get_intervals(&mut self) -> Result<Ring<Semitone>> {
        let rule = self
            .rule
            .clone()
            .ok_or_else(|| Error::UnsupportedMode(self.name.clone()))?;
        let Some((&last, steps)) = rule.split_last() else {
            return Err(Error::UnsupportedMode(self.name.clone()));
        };

        self.semitones.set_root_idx(self.key as i64 - 1);
        let mut notes = vec![self.key];
        for &step in steps {
            let mut current = self.key;
            for _ in 0..=step {
                current = self.semitones.advance()?.0;
            }
            notes.push(current);
        }
        // Close the octave so the semitone ring ends on the key again
        for _ in 0..=last {
            self.semitones.advance()?;
        }

        Ok(Ring::new(notes))
    }

    /// Get the key (1-12)
    pub fn key(&self) -> Semitone {
        self.key
    }

    /// Get the key as a note name
    pub fn key_note(&self) -> Note {
        Note::from_semitone(self.key)
    }

    /// Change the key and re-derive the intervals
    pub fn set_key(&mut self, key: impl Into<KeySpec>) -> Result<()> {
        self.key = key.into().resolve()?;
        self.initialize()
    }

    /// Get the mode name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the mode by built-in name and re-derive the intervals
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = name.to_string();
        self.rule = builtin_rule(name).map(<[u8]>::to_vec);
        self.initialize()
    }

    /// Change the mode name and rule together
    pub fn set_mode(&mut self, name: &str, rule: Vec<u8>) -> Result<()> {
        if rule.is_empty() {
            return Err(Error::UnsupportedMode(name.to_string()));
        }
        self.name = name.to_string();
        self.rule = Some(rule);
        self.initialize()
    }

    /// Get the mode rule, if the mode is known
    pub fn rule(&self) -> Option<&[u8]> {
        self.rule.as_deref()
    }

    /// Get the derived interval ring
    pub fn intervals(&self) -> Result<&Ring<Semitone>> {
        self.intervals
            .as_ref()
            .ok_or_else(|| Error::UnsupportedMode(self.name.clone()))
    }

    /// Number of scale degrees
    pub fn degrees(&self) -> Result<usize> {
        Ok(self.intervals()?.len())
    }

    /// Semitone and letter name for each scale degree, in degree order
    pub fn notes(&self) -> Result<Vec<(Semitone, Note)>> {
        Ok(self
            .intervals()?
            .iter()
            .map(|&s| (s, Note::from_semitone(s)))
            .collect())
    }

    /// Chord on a 1-based scale degree.
    ///
    /// Degrees past the scale length land in higher octaves. `inversion` is
    /// accepted but does not change the chord tones yet.
    pub fn chord(&mut self, num: i64, _inversion: u8, low_notes: bool) -> Result<Vec<Pitch>> {
        let root = num.checked_sub(1).ok_or(Error::OutOfBounds)?;
        let Some(intervals) = self.intervals.as_mut() else {
            return Err(Error::UnsupportedMode(self.name.clone()));
        };
        let offsets: &[i64] = if low_notes {
            &TRIAD_WITH_LOW_NOTES
        } else {
            &TRIAD
        };

        let saved = intervals.root_idx().unwrap_or(0);
        intervals.set_root_idx(root);
        let picked = intervals.at_many(offsets);
        intervals.set_root_idx(saved);

        Ok(picked?.into_iter().map(Pitch::from).collect())
    }

    /// Chords on every scale degree
    pub fn chord_table(&mut self, low_notes: bool) -> Result<Vec<Vec<Pitch>>> {
        let degrees = self.degrees()? as i64;
        (1..=degrees)
            .map(|degree| self.chord(degree, 0, low_notes))
            .collect()
    }

    /// Compile a phrase string of scale degrees into a playable token
    pub fn phrase(&self, text: &str, root_octave: Octave) -> Result<String> {
        let degrees: Vec<Note> = self.notes()?.into_iter().map(|(_, note)| note).collect();
        Ok(phrase::compile(text, &degrees, root_octave))
    }

    /// Play chords one after another, `delay` apart, rendered at `root_octave`
    pub fn chord_progression(
        &self,
        chords: &[Vec<Pitch>],
        delay: Duration,
        mute_prev: bool,
        root_octave: Octave,
        player: &mut dyn Player,
        pacer: &mut dyn Pacer,
    ) -> Result<()> {
        for (i, chord) in chords.iter().enumerate() {
            let notes = semitones_to_letter_notes(chord, root_octave);
            let mut token = compose_token(mute_prev && i == 0, &notes);
            token.push_str(PROGRESSION_HOLD);
            debug!(token = %token, "progression chord");
            player.play(&token)?;
            pacer.wait(delay);
        }
        Ok(())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: Vec<&str> = match &self.intervals {
            Some(intervals) => intervals
                .iter()
                .map(|&s| Note::from_semitone(s).name())
                .collect(),
            None => Vec::new(),
        };
        write!(
            f,
            "{} in Key of {} - ({})",
            self.name,
            self.key_note(),
            letters.join(", ")
        )
    }
}
