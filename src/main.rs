// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, Level};

use scalegen::config::{SequenceKind, SessionFile};
use scalegen::generators::{
    Event, GenerationConfig, PlayOptions, SequenceGenerator, SequenceRequest, StochasticGenerator,
};
use scalegen::music::{semitones_to_letter_notes, KeySpec, ModeRegistry, Scale, DEFAULT_ROOT_OCTAVE};
use scalegen::player::{
    release, warm_up, ConsolePlayer, Player, SubprocessConfig, SubprocessPlayer,
};
use scalegen::timing::SleepPacer;

/// Time each progression chord rings
const PROGRESSION_DELAY: Duration = Duration::from_secs(1);

const PROGRESSION_LENGTH: usize = 4;

fn print_usage() {
    println!("scalegen - Scales, chords and stochastic sequences");
    println!();
    println!("Usage: scalegen [--verbose] [--player <PROGRAM>] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  --list-modes                          List built-in modes");
    println!("  --notes <KEY> <MODE>                  Show the notes of a scale");
    println!("  --chords <KEY> <MODE> [--low-notes]   Show the chord on every degree");
    println!("  --phrase <KEY> <MODE> <TEXT>          Compile a phrase of scale degrees");
    println!("  --progression <KEY> <MODE> <DEGREES>  Play a progression (e.g. 1,4,5,1 or random)");
    println!("  --random-chords <KEY> <MODE> [SECS]   Generate and play random chords");
    println!("  --random-notes <KEY> <MODE> [SECS]    Generate and play random notes");
    println!("  --session <FILE>                      Run a YAML or TOML session file");
    println!("  --help                                Show this help message");
    println!();
    println!("Without --player, tokens are written to standard output.");
}

/// Global options that may appear anywhere on the command line
struct Options {
    verbose: bool,
    player: Option<String>,
}

fn split_options(args: Vec<String>) -> Result<(Options, Vec<String>)> {
    let mut options = Options {
        verbose: false,
        player: None,
    };
    let mut rest = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" | "-v" => options.verbose = true,
            "--player" => {
                let program = iter
                    .next()
                    .ok_or_else(|| anyhow!("--player requires a program"))?;
                options.player = Some(program);
            }
            _ => rest.push(arg),
        }
    }
    Ok((options, rest))
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn key_arg(arg: &str) -> KeySpec {
    match arg.parse::<i64>() {
        Ok(n) => KeySpec::Number(n),
        Err(_) => KeySpec::Name(arg.to_string()),
    }
}

fn scale_arg(args: &[String], command: &str) -> Result<Scale> {
    if args.len() < 2 {
        bail!("{} requires <KEY> <MODE>; use --list-modes to see modes", command);
    }
    let scale = ModeRegistry::new()
        .scale(key_arg(&args[0]), &args[1])
        .with_context(|| format!("Invalid scale: {} {}", args[0], args[1]))?;
    scale
        .intervals()
        .with_context(|| format!("Unknown mode: {}", args[1]))?;
    Ok(scale)
}

fn seconds_arg(args: &[String], index: usize, default: f64) -> Result<f64> {
    match args.get(index) {
        Some(arg) => arg
            .parse()
            .map_err(|_| anyhow!("Invalid number of seconds: {}", arg)),
        None => Ok(default),
    }
}

/// Run `f` against the requested player, started and stopped around it
fn with_player<F>(options: &Options, f: F) -> Result<()>
where
    F: FnOnce(&mut dyn Player, &mut SleepPacer) -> Result<()>,
{
    let mut pacer = SleepPacer;
    match &options.player {
        Some(program) => {
            let mut player = SubprocessPlayer::new(SubprocessConfig::new(program));
            warm_up(&mut player, &mut pacer)?;
            f(&mut player, &mut pacer)?;
            player.stop()?;
        }
        None => {
            let mut player = ConsolePlayer::stdout();
            player.start()?;
            f(&mut player, &mut pacer)?;
            player.stop()?;
        }
    }
    Ok(())
}

fn list_modes() {
    for mode in ModeRegistry::new().available_modes() {
        println!("{}", mode);
    }
}

fn show_notes(args: &[String]) -> Result<()> {
    let scale = scale_arg(args, "--notes")?;
    println!("{}", scale);
    Ok(())
}

fn show_chords(args: &[String]) -> Result<()> {
    let mut scale = scale_arg(args, "--chords")?;
    let low_notes = args.iter().any(|a| a == "--low-notes");
    println!("{}", scale);
    for (degree, chord) in scale.chord_table(low_notes)?.iter().enumerate() {
        let letters = semitones_to_letter_notes(chord, DEFAULT_ROOT_OCTAVE);
        println!("{:>2}: {}", degree + 1, letters.join(" "));
    }
    Ok(())
}

fn compile_phrase(args: &[String], options: &Options) -> Result<()> {
    let scale = scale_arg(args, "--phrase")?;
    let text = args
        .get(2)
        .ok_or_else(|| anyhow!("--phrase requires <TEXT>"))?;
    let token = scale.phrase(text, DEFAULT_ROOT_OCTAVE)?;
    match options.player {
        Some(_) => with_player(options, |player, _| {
            player.play(&token)?;
            Ok(())
        }),
        None => {
            println!("{}", token);
            Ok(())
        }
    }
}

fn play_progression(args: &[String], options: &Options) -> Result<()> {
    let scale = scale_arg(args, "--progression")?;
    let degrees_arg = args
        .get(2)
        .ok_or_else(|| anyhow!("--progression requires <DEGREES>"))?;

    let degrees: Vec<i64> = if degrees_arg == "random" {
        StochasticGenerator::with_scale(scale.clone()).sample_progression(PROGRESSION_LENGTH)?
    } else {
        degrees_arg.split(',')
            .map(|d| {
                d.trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid scale degree: {}", d))
            })
            .collect::<Result<_>>()?
    };
    info!(?degrees, "progression");

    let mut scale = scale;
    let chords = degrees
        .iter()
        .map(|&d| scale.chord(d, 0, true))
        .collect::<scalegen::Result<Vec<_>>>()?;
    with_player(options, |player, pacer| {
        scale.chord_progression(&chords, PROGRESSION_DELAY, true, DEFAULT_ROOT_OCTAVE, player, pacer)?;
        release(player)?;
        Ok(())
    })
}

fn play_events(
    generator: &StochasticGenerator,
    events: &[Event],
    play: PlayOptions,
    options: &Options,
) -> Result<()> {
    info!(generator = generator.name(), events = events.len(), "generated sequence");
    with_player(options, |player, pacer| {
        generator.play(events, player, pacer, play)?;
        Ok(())
    })
}

fn random_sequence(args: &[String], options: &Options, kind: SequenceKind) -> Result<()> {
    let command = match kind {
        SequenceKind::Chords => "--random-chords",
        SequenceKind::Notes => "--random-notes",
    };
    let scale = scale_arg(args, command)?;
    let duration = seconds_arg(args, 2, SequenceRequest::default().duration)?;

    let mut generator = StochasticGenerator::with_scale(scale);
    let request = SequenceRequest::new(duration).generation(GenerationConfig::default());
    let events = match kind {
        SequenceKind::Chords => generator.chord_sequence(&request)?,
        SequenceKind::Notes => generator.note_sequence(&request)?,
    };
    let play = PlayOptions {
        verbose: options.verbose,
        ..PlayOptions::default()
    };
    play_events(&generator, &events, play, options)
}

fn run_session(args: &[String], options: &Options) -> Result<()> {
    let path = args
        .first()
        .ok_or_else(|| anyhow!("--session requires a file"))?;
    let session = SessionFile::load(path)?;
    let mut generator = session.generator()?;
    info!(scale = %generator.scale()?, "session loaded");

    let request = session.request(false);
    let events = match session.session.kind {
        SequenceKind::Chords => generator.chord_sequence(&request)?,
        SequenceKind::Notes => generator.note_sequence(&request)?,
    };
    let play = session.play_options(options.verbose);
    info!(generator = generator.name(), events = events.len(), "generated sequence");

    let Some(settings) = &session.player else {
        return with_player(options, |player, pacer| {
            session.play_progression(generator.scale_mut()?, player, pacer)?;
            generator.play(&events, player, pacer, play)?;
            Ok(())
        });
    };
    let mut pacer = SleepPacer;
    let mut player = SubprocessPlayer::new(settings.subprocess_config());
    warm_up(&mut player, &mut pacer)?;
    if let Some(instrument) = settings.instrument()? {
        player.change_instrument(instrument)?;
    }
    session.play_progression(generator.scale_mut()?, &mut player, &mut pacer)?;
    generator.play(&events, &mut player, &mut pacer, play)?;
    player.stop()?;
    Ok(())
}

fn main() -> Result<()> {
    let (options, args) = split_options(env::args().skip(1).collect())?;

    if args.is_empty() {
        println!("scalegen - Scales, chords and stochastic sequences");
        println!("Run with --help for usage information");
        return Ok(());
    }

    init_logging(options.verbose);
    let rest = &args[1..];

    match args[0].as_str() {
        "--list-modes" => list_modes(),
        "--notes" => show_notes(rest)?,
        "--chords" => show_chords(rest)?,
        "--phrase" => compile_phrase(rest, &options)?,
        "--progression" => play_progression(rest, &options)?,
        "--random-chords" => random_sequence(rest, &options, SequenceKind::Chords)?,
        "--random-notes" => random_sequence(rest, &options, SequenceKind::Notes)?,
        "--session" => run_session(rest, &options)?,
        "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown option: {}", args[0]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
