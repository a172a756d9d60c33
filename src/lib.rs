// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! scalegen - scales, chords and stochastic sequences for an external player.

pub mod config;
pub mod error;
pub mod generators;
pub mod music;
pub mod player;
pub mod timing;

pub use error::{Error, Result};
