// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory model.
//!
//! This module provides the circular pitch ring, scale and chord derivation,
//! letter-note rendering and the phrase compiler.

pub mod phrase;
pub mod ring;
pub mod scale;

pub use ring::{Octave, Ring};
pub use scale::{
    builtin_rule, midi_to_letter_notes, parse_letter_note, semitones_to_letter_notes, KeySpec,
    ModeRegistry, Note, Pitch, Scale, Semitone, DEFAULT_ROOT_OCTAVE,
};
