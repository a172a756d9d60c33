// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback adapter abstraction.
//!
//! The generators never produce sound themselves. They hand text tokens to a
//! `Player`, which forwards them to whatever realizes the sound (an external
//! program, a log, a test double).
//!
//! Token grammar: an optional leading `m` (mute the previous notes) followed
//! by concatenated letter notes such as `C4E4G4`, or `q` to stop the player.

pub mod subprocess;

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::timing::Pacer;

pub use subprocess::{SubprocessConfig, SubprocessPlayer};

/// Prefix that silences whatever is still sounding
pub const MUTE: &str = "m";

/// Token that tells the player to shut down
pub const STOP: &str = "q";

/// Token played by `warm_up` to check the player responds
const WARM_UP_TOKEN: &str = "C7---";

const WARM_UP_WAIT: Duration = Duration::from_secs(3);

/// Errors raised by player implementations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player not started; call start() first")]
    NotStarted,

    #[error("instrument must be between 0 and 127, got {0:?}")]
    InvalidInstrument(String),

    #[error("player process i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// General MIDI program number (0-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instrument(u8);

impl Instrument {
    /// Validate a program number
    pub fn new(program: i64) -> Result<Self, PlayerError> {
        u8::try_from(program)
            .ok()
            .filter(|p| *p <= 127)
            .map(Instrument)
            .ok_or_else(|| PlayerError::InvalidInstrument(program.to_string()))
    }

    /// Program number
    pub fn program(self) -> u8 {
        self.0
    }
}

impl FromStr for Instrument {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let program: i64 = s
            .trim()
            .parse()
            .map_err(|_| PlayerError::InvalidInstrument(s.to_string()))?;
        Instrument::new(program)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that turns tokens into sound
pub trait Player {
    /// Bring the player up. Starting a running player is a no-op.
    fn start(&mut self) -> Result<(), PlayerError>;

    /// Shut the player down. Stopping a stopped player is a no-op.
    fn stop(&mut self) -> Result<(), PlayerError>;

    fn is_running(&self) -> bool;

    /// Submit one token
    fn play(&mut self, token: &str) -> Result<(), PlayerError>;

    /// Switch the timbre used for following tokens
    fn change_instrument(&mut self, instrument: Instrument) -> Result<(), PlayerError>;

    /// Instrument last selected, if the player tracks it
    fn instrument(&self) -> Option<Instrument> {
        None
    }
}

/// Join letter notes into a token, optionally muting what came before
pub fn compose_token(mute: bool, notes: &[String]) -> String {
    let mut token = String::with_capacity(notes.iter().map(String::len).sum::<usize>() + 1);
    if mute {
        token.push_str(MUTE);
    }
    for note in notes {
        token.push_str(note);
    }
    token
}

/// Mute whatever is still sounding
pub fn release(player: &mut dyn Player) -> Result<(), PlayerError> {
    player.play(MUTE)
}

/// Start the player and sound a test note
pub fn warm_up(player: &mut dyn Player, pacer: &mut dyn Pacer) -> Result<(), PlayerError> {
    player.start()?;
    player.play(WARM_UP_TOKEN)?;
    pacer.wait(WARM_UP_WAIT);
    Ok(())
}

/// Player that writes each token on its own line
///
/// Used for dry runs from the command line.
pub struct ConsolePlayer<W: Write> {
    out: W,
    running: bool,
    instrument: Option<Instrument>,
}

impl ConsolePlayer<io::Stdout> {
    /// Console player on standard output
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> ConsolePlayer<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            running: false,
            instrument: None,
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Player for ConsolePlayer<W> {
    fn start(&mut self) -> Result<(), PlayerError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        if self.running {
            writeln!(self.out, "{}", STOP)?;
            self.out.flush()?;
            self.running = false;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn play(&mut self, token: &str) -> Result<(), PlayerError> {
        if !self.running {
            return Err(PlayerError::NotStarted);
        }
        writeln!(self.out, "{}", token)?;
        self.out.flush()?;
        Ok(())
    }

    fn change_instrument(&mut self, instrument: Instrument) -> Result<(), PlayerError> {
        if !self.running {
            return Err(PlayerError::NotStarted);
        }
        writeln!(self.out, "I<{}>", instrument)?;
        self.instrument = Some(instrument);
        Ok(())
    }

    fn instrument(&self) -> Option<Instrument> {
        self.instrument
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPacer {
        waits: Vec<Duration>,
    }

    impl Pacer for RecordingPacer {
        fn wait(&mut self, duration: Duration) {
            self.waits.push(duration);
        }
    }

    #[test]
    fn test_instrument_range() {
        assert_eq!(Instrument::new(0).unwrap().program(), 0);
        assert_eq!(Instrument::new(127).unwrap().program(), 127);
        assert!(matches!(Instrument::new(128), Err(PlayerError::InvalidInstrument(_))));
        assert!(matches!(Instrument::new(-1), Err(PlayerError::InvalidInstrument(_))));
    }

    #[test]
    fn test_instrument_from_str() {
        assert_eq!("51".parse::<Instrument>().unwrap().program(), 51);
        assert_eq!(" 7 ".parse::<Instrument>().unwrap().program(), 7);
        assert!("piano".parse::<Instrument>().is_err());
        assert!("300".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_compose_token() {
        let notes = vec!["C4".to_string(), "E4".to_string(), "G4".to_string()];
        assert_eq!(compose_token(false, &notes), "C4E4G4");
        assert_eq!(compose_token(true, &notes), "mC4E4G4");
        assert_eq!(compose_token(true, &[]), "m");
    }

    #[test]
    fn test_console_player_requires_start() {
        let mut player = ConsolePlayer::with_writer(Vec::new());
        assert!(matches!(player.play("C4"), Err(PlayerError::NotStarted)));
        assert!(!player.is_running());
    }

    #[test]
    fn test_console_player_writes_lines() {
        let mut player = ConsolePlayer::with_writer(Vec::new());
        player.start().unwrap();
        player.play("C4E4").unwrap();
        player.change_instrument(Instrument::new(51).unwrap()).unwrap();
        player.play("mD4").unwrap();
        player.stop().unwrap();
        player.stop().unwrap();

        let out = String::from_utf8(player.into_inner()).unwrap();
        assert_eq!(out, "C4E4\nI<51>\nmD4\nq\n");
    }

    #[test]
    fn test_console_player_tracks_instrument() {
        let mut player = ConsolePlayer::with_writer(Vec::new());
        player.start().unwrap();
        assert_eq!(player.instrument(), None);
        player.change_instrument(Instrument::new(51).unwrap()).unwrap();
        assert_eq!(player.instrument().map(Instrument::program), Some(51));
    }

    #[test]
    fn test_release_sends_mute() {
        let mut player = ConsolePlayer::with_writer(Vec::new());
        assert!(matches!(release(&mut player), Err(PlayerError::NotStarted)));
        player.start().unwrap();
        release(&mut player).unwrap();
        assert_eq!(String::from_utf8(player.into_inner()).unwrap(), "m\n");
    }

    #[test]
    fn test_warm_up() {
        let mut player = ConsolePlayer::with_writer(Vec::new());
        let mut pacer = RecordingPacer::default();
        warm_up(&mut player, &mut pacer).unwrap();
        assert!(player.is_running());
        assert_eq!(pacer.waits, vec![Duration::from_secs(3)]);
        let out = String::from_utf8(player.into_inner()).unwrap();
        assert_eq!(out, "C7---\n");
    }
}
