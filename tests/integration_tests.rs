// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for scalegen
//!
//! These tests verify that multiple components work together correctly.

use std::time::Duration;

use scalegen::config::SessionFile;
use scalegen::generators::{
    GenerationConfig, NoteToken, PlayOptions, SequenceGenerator, SequenceRequest,
    StochasticGenerator, HISTORY_LIMIT,
};
use scalegen::music::{
    midi_to_letter_notes, parse_letter_note, semitones_to_letter_notes, ModeRegistry, Pitch, Ring,
    Scale,
};
use scalegen::player::{warm_up, ConsolePlayer, Instrument, Player, PlayerError};
use scalegen::timing::Pacer;
use scalegen::Error;

/// Records tokens instead of playing them
#[derive(Default)]
struct RecordingPlayer {
    running: bool,
    tokens: Vec<String>,
    instruments: Vec<u8>,
}

impl Player for RecordingPlayer {
    fn start(&mut self) -> Result<(), PlayerError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn play(&mut self, token: &str) -> Result<(), PlayerError> {
        if !self.running {
            return Err(PlayerError::NotStarted);
        }
        self.tokens.push(token.to_string());
        Ok(())
    }

    fn change_instrument(&mut self, instrument: Instrument) -> Result<(), PlayerError> {
        self.instruments.push(instrument.program());
        Ok(())
    }
}

/// Adds up waits without sleeping
#[derive(Default)]
struct TotalPacer {
    waits: usize,
    total: Duration,
}

impl Pacer for TotalPacer {
    fn wait(&mut self, duration: Duration) {
        self.waits += 1;
        self.total += duration;
    }
}

/// Ring indexing wraps with octave counts and leaves the root alone
#[test]
fn test_ring_octave_indexing() {
    let mut ring = Ring::new(1..=12u8);
    ring.set_root_idx(3);
    assert_eq!(ring.at(0).unwrap(), (4, 0));
    assert_eq!(ring.at(9).unwrap(), (1, 1));
    assert_eq!(ring.at(-4).unwrap(), (12, -1));
    assert_eq!(ring.root_idx(), Some(3));
}

/// C major derives C D E F G A B and a C E G tonic triad
#[test]
fn test_c_major_scale() {
    let mut scale = Scale::new("C", "major_scale").unwrap();
    let letters: Vec<String> = scale
        .notes()
        .unwrap()
        .into_iter()
        .map(|(_, note)| note.to_string())
        .collect();
    assert_eq!(letters, vec!["C", "D", "E", "F", "G", "A", "B"]);

    let chord = scale.chord(1, 0, false).unwrap();
    assert_eq!(semitones_to_letter_notes(&chord, 4), vec!["C4", "E4", "G4"]);
    assert_eq!(scale.to_string(), "major_scale in Key of C - (C, D, E, F, G, A, B)");
}

/// Every built-in mode yields one interval per rule step in every key
#[test]
fn test_all_modes_all_keys() {
    let registry = ModeRegistry::new();
    for mode in registry.available_modes() {
        let rule_len = registry.rule(&mode).unwrap().len();
        for key in 1..=12i64 {
            let mut scale = registry.scale(key, &mode).unwrap();
            assert_eq!(scale.degrees().unwrap(), rule_len);
            assert_eq!(scale.intervals().unwrap().root(), Some(&(key as u8)));

            let root = scale.intervals().unwrap().root_idx();
            scale.chord_table(true).unwrap();
            assert_eq!(scale.intervals().unwrap().root_idx(), root);
        }
    }
}

/// Letter notes survive a render and parse round trip
#[test]
fn test_letter_note_round_trip() {
    for semitone in 1..=12u8 {
        for octave in -1..=8 {
            let pitch = Pitch::new(semitone, octave);
            let letter = pitch.letter(0);
            assert_eq!(parse_letter_note(&letter, 0).unwrap(), pitch);
        }
    }
    assert_eq!(midi_to_letter_notes(&[60, 61, 69]), vec!["C4", "C#4", "A4"]);
}

/// Generated sequences run through playback with the expected pacing
#[test]
fn test_generate_and_play_notes() {
    let scale = Scale::new("C", "major_scale").unwrap();
    let mut generator = StochasticGenerator::with_scale(scale).with_seed(2024);
    let request = SequenceRequest::new(1.0).generation(GenerationConfig::fixed(0.0, 0, false));

    let events = generator.note_sequence(&request).unwrap();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.len() == 1));

    let mut player = RecordingPlayer::default();
    let mut pacer = TotalPacer::default();
    player.start().unwrap();
    generator
        .play(&events, &mut player, &mut pacer, PlayOptions::default())
        .unwrap();

    assert_eq!(player.tokens.len(), 4);
    for token in &player.tokens {
        let pitch = parse_letter_note(token, 3).unwrap();
        assert!(generator
            .scale()
            .unwrap()
            .intervals()
            .unwrap()
            .iter()
            .any(|&s| s == pitch.semitone));
    }
    assert_eq!(pacer.waits, 4);
    assert_eq!(pacer.total, Duration::from_secs(1));
}

/// Silence produces only waits
#[test]
fn test_silent_sequence_plays_nothing() {
    let scale = Scale::new("G", "minor_scale").unwrap();
    let mut generator = StochasticGenerator::with_scale(scale).with_seed(1);
    let request = SequenceRequest::new(2.0).generation(GenerationConfig::fixed(1.0, 0, true));

    let events = generator.chord_sequence(&request).unwrap();
    assert_eq!(events.len(), 8);
    assert!(events.iter().all(Vec::is_empty));

    let mut player = RecordingPlayer::default();
    let mut pacer = TotalPacer::default();
    player.start().unwrap();
    generator
        .play(&events, &mut player, &mut pacer, PlayOptions::default())
        .unwrap();
    assert!(player.tokens.is_empty());
    assert_eq!(pacer.waits, 8);
}

/// Long generation keeps histories bounded
#[test]
fn test_history_bounded_over_long_run() {
    let scale = Scale::new("E", "harmonic_scale").unwrap();
    let mut generator = StochasticGenerator::with_scale(scale).with_seed(3);
    let config = GenerationConfig::randomized();
    for _ in 0..1000 {
        generator.next_chord(&config).unwrap();
        generator.next_note(&config).unwrap();
        assert!(generator.chord_history().len() <= HISTORY_LIMIT);
        assert!(generator.note_history().len() <= HISTORY_LIMIT);
    }
}

/// Raw tokens keep semitones until playback renders them
#[test]
fn test_midi_tokens_render_at_play_octave() {
    let scale = Scale::new("C", "major_scale").unwrap();
    let mut generator = StochasticGenerator::with_scale(scale).with_seed(4);
    let request = SequenceRequest::new(0.5)
        .midi(true)
        .generation(GenerationConfig::fixed(0.0, 0, false));
    let events = generator.chord_sequence(&request).unwrap();
    assert!(events
        .iter()
        .flatten()
        .all(|t| matches!(t, NoteToken::Semitone(_))));

    let mut player = RecordingPlayer::default();
    let mut pacer = TotalPacer::default();
    player.start().unwrap();
    let options = PlayOptions {
        verbose: false,
        sustain: false,
        octave: 2,
    };
    generator.play(&events, &mut player, &mut pacer, options).unwrap();

    for (token, chord) in player.tokens.iter().zip(generator.chord_history()) {
        let expected: String = semitones_to_letter_notes(chord, 2).concat();
        assert_eq!(token, &format!("m{}", expected));
    }
}

/// Progressions carry the hold suffix and mute only the first chord
#[test]
fn test_progression_playback() {
    let mut scale = Scale::new("C", "major_scale").unwrap();
    let chords: Vec<_> = [1, 4, 5]
        .iter()
        .map(|&d| scale.chord(d, 0, false).unwrap())
        .collect();

    let mut player = RecordingPlayer::default();
    let mut pacer = TotalPacer::default();
    player.start().unwrap();
    scale
        .chord_progression(&chords, Duration::from_secs(1), true, 4, &mut player, &mut pacer)
        .unwrap();

    assert_eq!(player.tokens, vec!["mC4E4G4--", "F4A4C5--", "G4B4D5--"]);
    assert_eq!(pacer.total, Duration::from_secs(3));
}

/// Playing before start surfaces the player error
#[test]
fn test_play_requires_started_player() {
    let scale = Scale::new("C", "major_scale").unwrap();
    let mut generator = StochasticGenerator::with_scale(scale).with_seed(5);
    let request = SequenceRequest::new(1.0).generation(GenerationConfig::fixed(0.0, 0, false));
    let events = generator.note_sequence(&request).unwrap();

    let mut player = RecordingPlayer::default();
    let mut pacer = TotalPacer::default();
    let err = generator
        .play(&events, &mut player, &mut pacer, PlayOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Player(PlayerError::NotStarted)));

    player.change_instrument("19".parse().unwrap()).unwrap();
    assert_eq!(player.instruments, vec![19]);
}

/// A session file drives the generator end to end
#[test]
fn test_session_to_console() {
    let yaml = r#"
session:
  key: "A"
  mode: blues
  delay: 0.5
  duration: 2.0
  kind: notes
  sustain: false
generation:
  silence_ratio: 0.0
  seed: 11
modes:
  blues: [2, 1, 0, 0, 2, 1]
"#;
    let session = SessionFile::from_yaml(yaml).unwrap();
    let mut generator = session.generator().unwrap();
    assert_eq!(generator.scale().unwrap().degrees().unwrap(), 6);
    assert_eq!(generator.delay(), Duration::from_millis(500));

    let events = generator.note_sequence(&session.request(false)).unwrap();
    assert_eq!(events.len(), 4);

    let mut player = ConsolePlayer::with_writer(Vec::new());
    let mut pacer = TotalPacer::default();
    warm_up(&mut player, &mut pacer).unwrap();
    player.change_instrument(Instrument::new(51).unwrap()).unwrap();
    generator
        .play(&events, &mut player, &mut pacer, session.play_options(false))
        .unwrap();
    player.stop().unwrap();

    let out = String::from_utf8(player.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "C7---");
    assert_eq!(lines[1], "I<51>");
    assert!(lines[2..6].iter().all(|l| l.starts_with('m')));
    assert_eq!(lines[6], "q");
    assert_eq!(pacer.total, Duration::from_secs(5));
}

/// Phrases compile against the scale's degrees
#[test]
fn test_phrase_compilation() {
    let scale = Scale::new("C", "major_scale").unwrap();
    assert_eq!(scale.phrase("135", 4).unwrap(), "C4E4G4");
    assert_eq!(scale.phrase("1+ 5-", 4).unwrap(), "C5-G3");
}

/// Rhythm playback switches to percussion and back on a tracking player
#[test]
fn test_rhythm_restores_instrument() {
    let generator = StochasticGenerator::new();
    let mut player = ConsolePlayer::with_writer(Vec::new());
    let mut pacer = TotalPacer::default();
    player.start().unwrap();
    player.change_instrument(Instrument::new(51).unwrap()).unwrap();

    generator
        .play_rhythm(&[true, true, false], 0.25, &mut player, &mut pacer)
        .unwrap();
    assert_eq!(player.instrument().map(Instrument::program), Some(51));
    assert_eq!(pacer.total, Duration::from_secs(1));

    let out = String::from_utf8(player.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.first(), Some(&"I<51>"));
    assert_eq!(lines[1], "I<115>");
    assert_eq!(&lines[2..4], &["mG4", "mC#5"]);
    assert_eq!(lines.len(), 11);
    assert_eq!(lines.last(), Some(&"I<51>"));
}
