// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types shared by the music model, the generators and the player layer.

use thiserror::Error;

use crate::player::PlayerError;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the scale model and the generators
#[derive(Debug, Error)]
pub enum Error {
    /// Key is neither a known letter name nor a number in 1-12
    #[error("invalid key {0:?}; valid keys are C, C#, D, D#, E, F, F#, G, G#, A, A#, B or 1-12")]
    InvalidKey(String),

    /// A configuration value had the wrong type
    #[error("expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: String,
    },

    /// Mode has no construction rule
    #[error("unsupported mode {0:?}")]
    UnsupportedMode(String),

    /// A generator was used before a scale was assigned
    #[error("no {0} configured")]
    NotConfigured(&'static str),

    /// Advancing a ring with no elements
    #[error("ring has no elements to advance through")]
    Empty,

    /// Indexing a ring with no elements
    #[error("ring is empty")]
    OutOfBounds,

    #[error("silence ratio must be within 0.0..=1.0, got {0}")]
    InvalidSilenceRatio(f64),

    #[error("delay must be a positive number of seconds, got {0}")]
    InvalidDelay(f64),

    #[error("duration must be a non-negative number of seconds, got {0}")]
    InvalidDuration(f64),

    /// Token is not of the form `<Letter>[#]<Octave>`
    #[error("invalid letter note {0:?}")]
    InvalidLetterNote(String),

    #[error(transparent)]
    Player(#[from] PlayerError),
}
