// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for scalegen.
//!
//! A session file names the scale to draw from, how the stochastic generator
//! behaves, any custom modes, and the external player to drive.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::generators::{
    GenerationConfig, PlayOptions, SequenceRequest, StochasticGenerator, DEFAULT_SEQUENCE_OCTAVE,
};
use crate::music::{KeySpec, ModeRegistry, Octave, Scale, DEFAULT_ROOT_OCTAVE};
use crate::player::{release, Instrument, Player, SubprocessConfig};
use crate::timing::Pacer;

/// Root configuration for a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionFile {
    /// Scale and timing settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Generator parameters
    #[serde(default)]
    pub generation: GenerationSettings,
    /// Custom modes by name, as interval rules
    #[serde(default)]
    pub modes: HashMap<String, Vec<u8>>,
    /// External player; sessions without one play to the console
    #[serde(default)]
    pub player: Option<PlayerSettings>,
}

impl SessionFile {
    /// Load a session from a YAML file, or TOML when the extension is `.toml`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {:?}", path))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Parse a session from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML session")
    }

    /// Parse a session from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML session")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize session to YAML")
    }

    /// Save the session to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write session file: {:?}", path.as_ref()))
    }

    /// Built-in modes plus the custom ones from this session
    pub fn registry(&self) -> Result<ModeRegistry> {
        let mut registry = ModeRegistry::new();
        for (name, rule) in &self.modes {
            registry
                .register(name, rule.clone())
                .with_context(|| format!("Invalid custom mode: {}", name))?;
        }
        Ok(registry)
    }

    /// Build the session's scale
    pub fn scale(&self) -> Result<Scale> {
        let key = self.session.key.key_spec()?;
        let scale = self.registry()?.scale(key, &self.session.mode)?;
        // Catch unknown modes here rather than on the first draw
        scale
            .intervals()
            .with_context(|| format!("Mode {:?} is not defined", self.session.mode))?;
        Ok(scale)
    }

    /// Stochastic generator on the session's scale, delay and seed
    pub fn generator(&self) -> Result<StochasticGenerator> {
        let mut generator = StochasticGenerator::with_scale(self.scale()?);
        if let Some(seed) = self.generation.seed {
            generator = generator.with_seed(seed);
        }
        generator
            .set_delay(self.session.delay)
            .context("Invalid session delay")?;
        Ok(generator)
    }

    /// Sequence request for the session's duration
    pub fn request(&self, midi: bool) -> SequenceRequest {
        SequenceRequest::new(self.session.duration)
            .midi(midi)
            .octave(self.session.sequence_octave)
            .generation(self.generation.to_config())
    }

    /// Play the session's progression on `scale`, then mute.
    ///
    /// Chords render at `root_octave`, `progression_delay` apart. Sessions
    /// without a progression play nothing.
    pub fn play_progression(
        &self,
        scale: &mut Scale,
        player: &mut dyn Player,
        pacer: &mut dyn Pacer,
    ) -> Result<()> {
        let session = &self.session;
        if session.progression.is_empty() {
            return Ok(());
        }
        let delay = Duration::try_from_secs_f64(session.progression_delay)
            .map_err(|_| anyhow!("Invalid progression delay: {}", session.progression_delay))?;
        let chords = session
            .progression
            .iter()
            .map(|&degree| scale.chord(degree, self.generation.inversion, self.generation.low_notes))
            .collect::<crate::error::Result<Vec<_>>>()
            .context("Invalid progression degree")?;

        scale.chord_progression(&chords, delay, true, session.root_octave, player, pacer)?;
        release(player)?;
        Ok(())
    }

    /// Playback options for the session
    pub fn play_options(&self, verbose: bool) -> PlayOptions {
        PlayOptions {
            verbose,
            sustain: self.session.sustain,
            octave: self.session.sequence_octave,
        }
    }
}

/// Key as written in a session file
///
/// Letter names and numbers are accepted when building a scale. Anything
/// else parses but fails at that point with a type error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KeyValue {
    Number(i64),
    Name(String),
    Other(serde_yaml::Value),
}

impl KeyValue {
    pub fn key_spec(&self) -> crate::error::Result<KeySpec> {
        match self {
            KeyValue::Number(n) => Ok(KeySpec::Number(*n)),
            KeyValue::Name(name) => Ok(KeySpec::Name(name.clone())),
            KeyValue::Other(value) => Err(Error::Type {
                expected: "string or integer key",
                found: value_kind(value).to_string(),
            }),
        }
    }
}

impl Default for KeyValue {
    fn default() -> Self {
        KeyValue::Name(default_key())
    }
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// What a session generates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SequenceKind {
    #[default]
    Chords,
    Notes,
}

/// Session-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Musical key (e.g., "C", "F#", or 1-12)
    #[serde(default)]
    pub key: KeyValue,
    /// Mode name, built-in or from `modes`
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Seconds between generated entries
    #[serde(default = "default_delay")]
    pub delay: f64,
    /// Octave phrases and progressions are rendered at
    #[serde(default = "default_root_octave")]
    pub root_octave: Octave,
    /// Octave generated sequences are rendered at
    #[serde(default = "default_sequence_octave")]
    pub sequence_octave: Octave,
    /// Seconds of material to generate
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub kind: SequenceKind,
    /// Scale degrees played as chords before the generated sequence
    #[serde(default)]
    pub progression: Vec<i64>,
    /// Seconds each progression chord rings
    #[serde(default = "default_progression_delay")]
    pub progression_delay: f64,
    /// Let notes ring into the next entry
    #[serde(default = "default_true")]
    pub sustain: bool,
}

fn default_key() -> String {
    "C".to_string()
}
fn default_mode() -> String {
    "major_scale".to_string()
}
fn default_delay() -> f64 {
    0.25
}
fn default_root_octave() -> Octave {
    DEFAULT_ROOT_OCTAVE
}
fn default_sequence_octave() -> Octave {
    DEFAULT_SEQUENCE_OCTAVE
}
fn default_duration() -> f64 {
    4.0
}
fn default_progression_delay() -> f64 {
    1.5
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key: KeyValue::default(),
            mode: default_mode(),
            delay: default_delay(),
            root_octave: default_root_octave(),
            sequence_octave: default_sequence_octave(),
            duration: default_duration(),
            kind: SequenceKind::default(),
            progression: Vec::new(),
            progression_delay: default_progression_delay(),
            sustain: true,
        }
    }
}

/// Generator parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    /// Weight of silence (0.0 - 1.0)
    #[serde(default = "default_silence_ratio")]
    pub silence_ratio: f64,
    #[serde(default)]
    pub inversion: u8,
    /// Add root and fifth an octave below chords
    #[serde(default = "default_true")]
    pub low_notes: bool,
    /// Seed for reproducible sessions
    #[serde(default)]
    pub seed: Option<u64>,
    /// Redraw every parameter on each step, ignoring the values above
    #[serde(default)]
    pub randomize: bool,
}

fn default_silence_ratio() -> f64 {
    0.25
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            silence_ratio: default_silence_ratio(),
            inversion: 0,
            low_notes: true,
            seed: None,
            randomize: false,
        }
    }
}

impl GenerationSettings {
    pub fn to_config(&self) -> GenerationConfig {
        if self.randomize {
            GenerationConfig::randomized()
        } else {
            GenerationConfig::fixed(self.silence_ratio, self.inversion, self.low_notes)
        }
    }
}

/// External player configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSettings {
    /// Program to launch
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// File that receives the player's stderr
    #[serde(default)]
    pub error_log: Option<PathBuf>,
    /// General MIDI program to select after start
    #[serde(default)]
    pub instrument: Option<i64>,
}

impl PlayerSettings {
    pub fn subprocess_config(&self) -> SubprocessConfig {
        SubprocessConfig {
            program: self.program.clone(),
            args: self.args.clone(),
            working_dir: self.working_dir.clone(),
            error_log: self.error_log.clone(),
        }
    }

    /// Validated instrument, if one is set
    pub fn instrument(&self) -> Result<Option<Instrument>> {
        self.instrument
            .map(|program| Instrument::new(program).context("Invalid player instrument"))
            .transpose()
    }
}
