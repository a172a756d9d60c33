// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Stochastic generator.
//!
//! Draws notes and chords from a scale by weighted pooling: one bucket for
//! silence weighted by the silence ratio, one bucket per scale degree sharing
//! the rest of the weight evenly. A sounding draw is shifted up by a random
//! whole number of octaves (0-2).

use std::time::Duration;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{
    chord_to_event, Chord, Event, GenerationConfig, History, PlayOptions, SequenceGenerator,
    SequenceRequest,
};
use crate::error::{Error, Result};
use crate::music::{Pitch, Scale};
use crate::player::{compose_token, Instrument, Player};
use crate::timing::Pacer;

/// Spacing between generated entries unless configured otherwise
pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

/// Octave shifts are drawn from `0..OCTAVE_SHIFTS`
const OCTAVE_SHIFTS: i64 = 3;

/// Most entries a batch sequence may ask for
pub const MAX_SEQUENCE_STEPS: usize = 1 << 20;

/// Program the rhythm plays on
const RHYTHM_PROGRAM: i64 = 115;

/// Times the rhythm pattern repeats
const RHYTHM_PASSES: usize = 4;

/// Token for the first hit of each pass, then for every later hit
const RHYTHM_ACCENT: &str = "mG4";
const RHYTHM_HIT: &str = "mC#5";

/// Generator that samples scale degrees at random
pub struct StochasticGenerator {
    scale: Option<Scale>,
    chord_history: History<Chord>,
    note_history: History<Chord>,
    delay: Duration,
    rng: StdRng,
}

impl StochasticGenerator {
    /// Create a generator with no scale assigned yet
    pub fn new() -> Self {
        Self {
            scale: None,
            chord_history: History::new(),
            note_history: History::new(),
            delay: DEFAULT_DELAY,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator drawing from `scale`
    pub fn with_scale(scale: Scale) -> Self {
        let mut generator = Self::new();
        generator.scale = Some(scale);
        generator
    }

    /// Reseed for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Get the scale, failing if none was assigned
    pub fn scale(&self) -> Result<&Scale> {
        self.scale.as_ref().ok_or(Error::NotConfigured("scale"))
    }

    pub fn scale_mut(&mut self) -> Result<&mut Scale> {
        self.scale.as_mut().ok_or(Error::NotConfigured("scale"))
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = Some(scale);
    }

    /// Time between entries
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Set the time between entries, in seconds
    pub fn set_delay(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(Error::InvalidDelay(seconds));
        }
        self.delay = Duration::from_secs_f64(seconds);
        Ok(())
    }

    pub fn chord_history(&self) -> &[Chord] {
        self.chord_history.as_slice()
    }

    pub fn set_chord_history(&mut self, history: Vec<Chord>) {
        self.chord_history.replace(history);
    }

    pub fn note_history(&self) -> &[Chord] {
        self.note_history.as_slice()
    }

    pub fn set_note_history(&mut self, history: Vec<Chord>) {
        self.note_history.replace(history);
    }

    pub fn clear_history(&mut self) {
        self.chord_history.clear();
        self.note_history.clear();
    }

    /// Fill the note history from a rhythm: a sounding note on every hit and
    /// a rest otherwise, `step_seconds` apart.
    pub fn follow_rhythm(&mut self, hits: &[bool], step_seconds: f64) -> Result<&[Chord]> {
        self.set_delay(step_seconds)?;
        self.clear_history();
        let always_sound = GenerationConfig::fixed(0.0, 0, false);
        for &hit in hits {
            if hit {
                self.next_note(&always_sound)?;
            } else {
                self.note_history.push(Vec::new());
            }
        }
        Ok(self.note_history())
    }

    /// Play a rhythm pattern on the percussion program.
    ///
    /// The pattern repeats four times. The first hit of each pass is
    /// accented; rests wait `step_seconds`. The player's previous instrument
    /// is selected again afterwards when it is known.
    pub fn play_rhythm(
        &self,
        hits: &[bool],
        step_seconds: f64,
        player: &mut dyn Player,
        pacer: &mut dyn Pacer,
    ) -> Result<()> {
        if !step_seconds.is_finite() || step_seconds <= 0.0 {
            return Err(Error::InvalidDelay(step_seconds));
        }
        let step = Duration::from_secs_f64(step_seconds);
        let previous = player.instrument();
        player.change_instrument(Instrument::new(RHYTHM_PROGRAM)?)?;

        for _ in 0..RHYTHM_PASSES {
            let mut accent = true;
            for &hit in hits {
                if hit {
                    player.play(if accent { RHYTHM_ACCENT } else { RHYTHM_HIT })?;
                    accent = false;
                } else {
                    pacer.wait(step);
                }
            }
            let pattern: String = hits.iter().map(|&h| if h { 'O' } else { '-' }).collect();
            debug!(%pattern, "rhythm pass");
        }

        if let Some(instrument) = previous {
            player.change_instrument(instrument)?;
        }
        Ok(())
    }

    /// Random progression of distinct scale degrees (1-based)
    pub fn sample_progression(&mut self, length: usize) -> Result<Vec<i64>> {
        let degrees = self.scale()?.degrees()?;
        let picked = index::sample(&mut self.rng, degrees, length.min(degrees));
        Ok(picked.into_iter().map(|i| i as i64 + 1).collect())
    }

    /// Send events to a player one delay apart.
    ///
    /// Silent events only wait. With `sustain` off every token starts with
    /// the mute marker.
    pub fn play(
        &self,
        events: &[Event],
        player: &mut dyn Player,
        pacer: &mut dyn Pacer,
        options: PlayOptions,
    ) -> Result<()> {
        for event in events {
            if event.is_empty() {
                if options.verbose {
                    info!("---{}---", self.delay.as_secs_f64());
                }
                pacer.wait(self.delay);
                continue;
            }

            let notes: Vec<String> = event.iter().map(|t| t.render(options.octave)).collect();
            let token = compose_token(!options.sustain, &notes);
            if options.verbose {
                info!("{}", token);
            }
            player.play(&token)?;
            pacer.wait(self.delay);
        }
        Ok(())
    }

    fn steps_for(&self, duration: f64) -> Result<usize> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::InvalidDuration(duration));
        }
        let steps = (duration / self.delay.as_secs_f64()).ceil();
        if steps > MAX_SEQUENCE_STEPS as f64 {
            return Err(Error::InvalidDuration(duration));
        }
        Ok(steps as usize)
    }
}

impl Default for StochasticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw bucket 0 (silence) or a scale degree `1..=degrees`
fn draw_bucket(rng: &mut StdRng, silence_ratio: f64, degrees: usize) -> Result<usize> {
    if !(0.0..=1.0).contains(&silence_ratio) {
        return Err(Error::InvalidSilenceRatio(silence_ratio));
    }
    let share = (1.0 - silence_ratio) / degrees as f64;
    let weights = std::iter::once(silence_ratio).chain(std::iter::repeat(share).take(degrees));
    let dist = WeightedIndex::new(weights).map_err(|_| Error::InvalidSilenceRatio(silence_ratio))?;
    Ok(dist.sample(rng))
}

impl SequenceGenerator for StochasticGenerator {
    fn name(&self) -> &'static str {
        "stochastic"
    }

    fn next_chord(&mut self, config: &GenerationConfig) -> Result<Chord> {
        let scale = self.scale.as_mut().ok_or(Error::NotConfigured("scale"))?;
        let silence_ratio = config.silence_ratio.resolve(&mut self.rng);
        let inversion = config.inversion.resolve(&mut self.rng);
        let low_notes = config.low_notes.resolve(&mut self.rng);

        let degrees = scale.degrees()?;
        let bucket = draw_bucket(&mut self.rng, silence_ratio, degrees)?;
        let chord = if bucket == 0 {
            Vec::new()
        } else {
            let shift = self.rng.gen_range(0..OCTAVE_SHIFTS);
            scale.chord(shift * degrees as i64 + bucket as i64, inversion, low_notes)?
        };

        debug!(bucket, tones = chord.len(), "next chord");
        Ok(self.chord_history.push(chord).clone())
    }

    fn next_note(&mut self, config: &GenerationConfig) -> Result<Chord> {
        let scale = self.scale.as_ref().ok_or(Error::NotConfigured("scale"))?;
        let silence_ratio = config.silence_ratio.resolve(&mut self.rng);

        let intervals = scale.intervals()?;
        let bucket = draw_bucket(&mut self.rng, silence_ratio, intervals.len())?;
        let note = if bucket == 0 {
            Vec::new()
        } else {
            let shift = self.rng.gen_range(0..OCTAVE_SHIFTS);
            vec![Pitch::from(intervals.at(shift + bucket as i64)?)]
        };

        debug!(bucket, "next note");
        Ok(self.note_history.push(note).clone())
    }

    fn chord_sequence(&mut self, request: &SequenceRequest) -> Result<Vec<Event>> {
        let steps = self.steps_for(request.duration)?;
        self.chord_history.clear();
        for _ in 0..steps {
            self.next_chord(&request.generation)?;
        }
        Ok(self
            .chord_history
            .iter()
            .map(|chord| chord_to_event(chord, request.midi, request.octave))
            .collect())
    }

    fn note_sequence(&mut self, request: &SequenceRequest) -> Result<Vec<Event>> {
        let steps = self.steps_for(request.duration)?;
        self.note_history.clear();
        for _ in 0..steps {
            self.next_note(&request.generation)?;
        }
        Ok(self
            .note_history
            .iter()
            .map(|note| chord_to_event(note, request.midi, request.octave))
            .collect())
    }
}
