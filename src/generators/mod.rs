// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Generative engines for algorithmic music creation.
//!
//! A generator samples notes and chords from a scale, keeps what it produced
//! in capped history buffers and renders the history into playable events.

pub mod history;
pub mod stochastic;

pub use history::{History, HISTORY_LIMIT};
pub use stochastic::StochasticGenerator;

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::Result;
use crate::music::{Octave, Pitch};

/// A chord (or a single note) as semitone pairs; empty means silence
pub type Chord = Vec<Pitch>;

/// One playable step of a sequence; empty means silence
pub type Event = Vec<NoteToken>;

/// Octave that sequences and playback render semitones at by default
pub const DEFAULT_SEQUENCE_OCTAVE: Octave = 3;

/// A sequence entry, either still as semitones or already rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteToken {
    /// Semitone pair, rendered at playback time
    Semitone(Pitch),
    /// Letter note such as `"C#4"`
    Rendered(String),
}

impl NoteToken {
    /// Letter note for this token; `octave` only applies to semitone tokens
    pub fn render(&self, octave: Octave) -> String {
        match self {
            NoteToken::Semitone(pitch) => pitch.letter(octave),
            NoteToken::Rendered(letter) => letter.clone(),
        }
    }
}

/// Render a chord as an event, either raw or as letter notes at `octave`
pub fn chord_to_event(chord: &[Pitch], midi: bool, octave: Octave) -> Event {
    chord
        .iter()
        .map(|&pitch| {
            if midi {
                NoteToken::Semitone(pitch)
            } else {
                NoteToken::Rendered(pitch.letter(octave))
            }
        })
        .collect()
}

/// A generation parameter: a plain value or a draw from the generator's RNG
pub enum Policy<T> {
    Fixed(T),
    Drawn(Arc<dyn Fn(&mut StdRng) -> T + Send + Sync>),
}

impl<T: Copy> Policy<T> {
    /// Wrap a sampling function
    pub fn drawn(f: impl Fn(&mut StdRng) -> T + Send + Sync + 'static) -> Self {
        Policy::Drawn(Arc::new(f))
    }

    /// Value to use for one generation step
    pub fn resolve(&self, rng: &mut StdRng) -> T {
        match self {
            Policy::Fixed(value) => *value,
            Policy::Drawn(draw) => draw(rng),
        }
    }
}

impl<T> From<T> for Policy<T> {
    fn from(value: T) -> Self {
        Policy::Fixed(value)
    }
}

impl<T: Clone> Clone for Policy<T> {
    fn clone(&self) -> Self {
        match self {
            Policy::Fixed(value) => Policy::Fixed(value.clone()),
            Policy::Drawn(draw) => Policy::Drawn(Arc::clone(draw)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Policy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Policy::Drawn(_) => f.write_str("Drawn(..)"),
        }
    }
}

/// Parameters for `next_chord` / `next_note`
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Weight of the silent bucket (0.0 - 1.0)
    pub silence_ratio: Policy<f64>,
    /// Chord inversion; accepted but not applied yet
    pub inversion: Policy<u8>,
    /// Add root and fifth an octave below each chord
    pub low_notes: Policy<bool>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::fixed(0.25, 0, true)
    }
}

impl GenerationConfig {
    /// Plain values for every parameter
    pub fn fixed(silence_ratio: f64, inversion: u8, low_notes: bool) -> Self {
        Self {
            silence_ratio: Policy::Fixed(silence_ratio),
            inversion: Policy::Fixed(inversion),
            low_notes: Policy::Fixed(low_notes),
        }
    }

    /// Every parameter re-drawn on each step: any silence ratio, an
    /// inversion of 0-2 and low notes half the time
    pub fn randomized() -> Self {
        Self {
            silence_ratio: Policy::drawn(|rng| rng.gen::<f64>()),
            inversion: Policy::drawn(|rng| rng.gen_range(0..=2)),
            low_notes: Policy::drawn(|rng| rng.gen_bool(0.5)),
        }
    }

    pub fn with_silence_ratio(mut self, silence_ratio: impl Into<Policy<f64>>) -> Self {
        self.silence_ratio = silence_ratio.into();
        self
    }

    pub fn with_inversion(mut self, inversion: impl Into<Policy<u8>>) -> Self {
        self.inversion = inversion.into();
        self
    }

    pub fn with_low_notes(mut self, low_notes: impl Into<Policy<bool>>) -> Self {
        self.low_notes = low_notes.into();
        self
    }
}

/// Parameters for a batch sequence
#[derive(Debug, Clone)]
pub struct SequenceRequest {
    /// Total play time in seconds
    pub duration: f64,
    /// Octave letter notes are rendered at when `midi` is false
    pub octave: Octave,
    /// Keep raw semitone tokens instead of rendering letter notes
    pub midi: bool,
    pub generation: GenerationConfig,
}

impl Default for SequenceRequest {
    fn default() -> Self {
        Self {
            duration: 4.0,
            octave: DEFAULT_SEQUENCE_OCTAVE,
            midi: false,
            generation: GenerationConfig::default(),
        }
    }
}

impl SequenceRequest {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn midi(mut self, midi: bool) -> Self {
        self.midi = midi;
        self
    }

    pub fn octave(mut self, octave: Octave) -> Self {
        self.octave = octave;
        self
    }

    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

/// Options for playing a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOptions {
    /// Log each token (and a marker for rests) as it plays
    pub verbose: bool,
    /// Let notes ring into the next entry instead of muting first
    pub sustain: bool,
    /// Octave semitone tokens are rendered at
    pub octave: Octave,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            sustain: true,
            octave: DEFAULT_SEQUENCE_OCTAVE,
        }
    }
}

/// Trait for all generator implementations
pub trait SequenceGenerator {
    /// Get the generator type name
    fn name(&self) -> &'static str;

    /// Produce one chord and append it to the chord history
    fn next_chord(&mut self, config: &GenerationConfig) -> Result<Chord>;

    /// Produce one note (as a one-entry chord) and append it to the note history
    fn next_note(&mut self, config: &GenerationConfig) -> Result<Chord>;

    /// Clear the chord history and fill it with a sequence lasting
    /// `request.duration` seconds
    fn chord_sequence(&mut self, request: &SequenceRequest) -> Result<Vec<Event>>;

    /// Clear the note history and fill it with a sequence lasting
    /// `request.duration` seconds
    fn note_sequence(&mut self, request: &SequenceRequest) -> Result<Vec<Event>>;
}
