//! Rewind CLI entry point.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rewind_foundation::{Error, Result};
use rewind_language::InputProvider;
use rewind_runtime::{HostError, HostResult, Repl, Stepper, StepperConfig, snapshot};
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    file: Option<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    predict: bool,
    max_steps: Option<usize>,
    snapshot_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> HostResult<CliConfig> {
    let mut config = CliConfig::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--predict" => config.predict = true,
            "--max-steps" => {
                let value = args
                    .next()
                    .ok_or_else(|| HostError::Usage("--max-steps requires a value".into()))?;
                config.max_steps = Some(value.parse().map_err(|_| {
                    HostError::Usage(format!("invalid --max-steps value: {value}"))
                })?);
            }
            "--snapshot-out" => {
                let value = args
                    .next()
                    .ok_or_else(|| HostError::Usage("--snapshot-out requires a path".into()))?;
                config.snapshot_out = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => {
                return Err(HostError::Usage(format!("unknown option: {flag}")));
            }
            path => {
                if config.file.is_some() {
                    return Err(HostError::Usage("only one program file may be given".into()));
                }
                config.file = Some(PathBuf::from(path));
            }
        }
    }

    Ok(config)
}

fn run(args: Vec<String>) -> HostResult<ExitCode> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if cli.show_version {
        println!("rewind {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = StepperConfig::new().with_prediction_mode(cli.predict);
    if let Some(max_steps) = cli.max_steps {
        config = config.with_max_steps(max_steps);
    }

    if cli.batch_mode {
        let Some(path) = &cli.file else {
            return Err(HostError::Usage("--batch needs a program file".into()));
        };
        return run_batch(path, config.with_prediction_mode(false), cli.snapshot_out.as_ref());
    }

    let mut repl = Repl::new(config)?;
    if let Some(path) = &cli.file {
        repl.load_file(path)?;
        repl = repl.without_banner();
    }
    repl.run()?;

    if let Some(out) = &cli.snapshot_out {
        snapshot::save_to_file(&repl.snapshot(), out)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs a program to the end without stepping, printing its output.
fn run_batch(
    path: &Path,
    config: StepperConfig,
    snapshot_out: Option<&PathBuf>,
) -> HostResult<ExitCode> {
    let source = fs::read_to_string(path).map_err(|e| HostError::io("failed to read", path, e))?;
    let mut stepper = Stepper::with_input(config, StdinInput);
    stepper.load(&source)?;
    stepper.to_end();

    let mut stdout = io::stdout().lock();
    for line in stepper.state().outputs() {
        let _ = writeln!(stdout, "{line}");
    }

    if let Some(out) = snapshot_out {
        snapshot::save_to_file(&stepper.snapshot(), out)?;
    }

    match stepper.state().error() {
        Some(err) => {
            eprintln!("\x1b[31m{err}\x1b[0m");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Reads `input()` answers from standard input.
struct StdinInput;

impl InputProvider for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => Err(Error::runtime("EOF when reading a line")),
            Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => Err(Error::runtime(e.to_string())),
        }
    }
}

fn print_help() {
    println!(
        "\x1b[1mRewind\x1b[0m - Step through Python-like programs, forwards and backwards

\x1b[1mUSAGE:\x1b[0m
    rewind [OPTIONS] [FILE]

\x1b[1mARGUMENTS:\x1b[0m
    [FILE]    Program to load before starting the stepper

\x1b[1mOPTIONS:\x1b[0m
    -h, --help             Print help information
    -V, --version          Print version information
    -b, --batch            Run FILE to the end and print its output
    --predict              Start in prediction mode
    --max-steps N          Commands one run may execute (default 100000)
    --snapshot-out PATH    Write the final state as MessagePack on exit

\x1b[1mENVIRONMENT:\x1b[0m
    RUST_LOG               Log filter, e.g. rewind_runtime=debug (default warn)

\x1b[1mEXAMPLES:\x1b[0m
    rewind demo.py                  Load demo.py and step through it
    rewind --predict demo.py        Guess every assignment before it is shown
    rewind -b demo.py               Run demo.py and exit

\x1b[1mSTEPPER COMMANDS:\x1b[0m
    n / b                Step forward / back
    :end / :start        Jump to the end / beginning
    :predict on|off      Toggle prediction mode
    :guess VALUE         Answer a pending prediction
    :state               Show scopes, functions, and loops
    :program             List compiled commands
    :load FILE           Load another program
    Ctrl+D               Exit"
    );
}
