use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::{info, Level};

use musicbox_sim::{
    config::parse_script_config, trace::write_trace, wav::write_wav, PressScript, Session,
    TraceEvent,
};

/// Runs the music box firmware on a simulated board
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct SimArgs {
    /// Key presses, e.g. "B 3 *" or "*@0+50 *@2000+50"
    #[arg(short, long, conflicts_with = "script", required_unless_present = "script")]
    pub keys: Option<String>,

    /// Path to a TOML press script
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Virtual milliseconds to run for (defaults to 1s past the last press)
    #[arg(short, long)]
    pub until_ms: Option<u64>,

    /// Render the buzzer line to a WAV file
    #[arg(short, long)]
    pub wav: Option<PathBuf>,

    /// WAV sample rate
    #[arg(long, default_value_t = 44_100)]
    pub sample_rate: u32,

    /// Write a JSON-lines trace of key presses, playback and display changes
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let args = SimArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .init();

    ensure!(args.sample_rate > 0, "sample rate must be greater than zero");

    /* Load the press script */

    let (script, file_until_ms) = match (&args.keys, &args.script) {
        (Some(keys), _) => (PressScript::parse(keys).context("could not parse --keys")?, None),
        (None, Some(path)) => {
            let config = parse_script_config(path)?;
            let script = config
                .to_script()
                .with_context(|| format!("invalid press script `{}`", path.display()))?;
            (script, config.until_ms)
        }
        (None, None) => unreachable!("clap requires --keys or --script"),
    };

    let until_ms = script.run_length_ms(args.until_ms.or(file_until_ms))?;

    println!();
    println!("Press script");
    println!("============");
    for press in script.presses() {
        println!(
            "{:>8}ms  {}  (held {}ms)",
            press.at_ms,
            press.key.symbol(),
            press.hold_ms
        );
    }
    println!();

    /* Run the firmware */

    info!(until_ms, presses = script.presses().len(), "starting simulation");

    let mut session = Session::new(&script);
    session.run_until(until_ms);

    println!("Transcript");
    println!("==========");
    for event in session.trace() {
        print_event(event);
    }
    println!();

    let world = session.world();
    println!(
        "Simulated {:.3}s, {} buzzer cycles, {} songs started",
        world.now_us() as f64 / 1e6,
        world.rising_edges(),
        session.outcomes().len()
    );

    /* Write the outputs */

    if let Some(path) = &args.wav {
        let samples = session.render_wav(args.sample_rate);

        let file = File::create(path)
            .with_context(|| format!("could not create file `{}`", path.display()))?;
        let mut writer = BufWriter::new(file);

        write_wav(&mut writer, &samples, args.sample_rate)
            .and_then(|()| writer.flush())
            .with_context(|| format!("could not write file `{}`", path.display()))?;

        info!(path = %path.display(), samples = samples.len(), "wrote wav");
    }

    if let Some(path) = &args.trace {
        let file = File::create(path)
            .with_context(|| format!("could not create file `{}`", path.display()))?;
        let mut writer = BufWriter::new(file);

        write_trace(&mut writer, session.trace())
            .and_then(|()| Ok(writer.flush()?))
            .with_context(|| format!("could not write file `{}`", path.display()))?;

        info!(path = %path.display(), events = session.trace().len(), "wrote trace");
    }

    Ok(())
}

fn print_event(event: &TraceEvent) {
    match event {
        TraceEvent::Display { at_us, top, bottom } => {
            println!("{:>8}ms  display  [{:<16}] [{:<16}]", at_us / 1_000, top, bottom);
        }
        TraceEvent::Step {
            started_us,
            key,
            command,
            playback,
            ..
        } => {
            let key = key.map(String::from).unwrap_or_else(|| "-".into());
            let at_ms = started_us / 1_000;

            match command {
                Some(command) => println!("{:>8}ms  key {}    {:?}", at_ms, key, command),
                None => println!("{:>8}ms  key {}    (no action)", at_ms, key),
            }

            if let Some(outcome) = playback {
                println!("{:>8}   playback {:?}", "", outcome);
            }
        }
    }
}
