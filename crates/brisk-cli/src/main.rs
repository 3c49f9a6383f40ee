use anyhow::{Context, Result};
use brisk_core::{lower_program, LowerConfig, LowerError, UndefinedUsePolicy};
use brisk_emit::{BackendConfig, EmitError, IsaPurpose, OptLevel, OutputFormat};
use brisk_parser::ParseError;
use clap::{error::ErrorKind, ArgAction, Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const EXIT_USAGE: u8 = 1;
const EXIT_INPUT: u8 = 2;
const EXIT_PARSE: u8 = 3;
const EXIT_BACKEND: u8 = 4;
const EXIT_LOWERING: u8 = 5;

#[derive(Parser, Debug)]
#[command(name = "brisk")]
#[command(about = "Lower Bril programs to Cranelift IR", long_about = None)]
#[command(version)]
struct Cli {
    /// Bril program in JSON form
    input: PathBuf,

    /// Where to write the lowered program
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "clif")]
    emit: EmitFormat,

    /// JIT-compile the program afterwards and run the entry function
    #[arg(long)]
    run: bool,

    /// Function executed by --run
    #[arg(long, default_value = "main")]
    entry: String,

    /// Target triple for object output (defaults to the host)
    #[arg(long)]
    target: Option<String>,

    /// Cranelift optimization level
    #[arg(long, value_enum, default_value = "none")]
    opt_level: OptLevelArg,

    /// Fail when a variable is read before it is defined
    #[arg(long)]
    reject_undefined: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitFormat {
    /// Cranelift IR text
    Clif,
    /// Relocatable object file
    Object,
}

impl From<EmitFormat> for OutputFormat {
    fn from(format: EmitFormat) -> Self {
        match format {
            EmitFormat::Clif => OutputFormat::Clif,
            EmitFormat::Object => OutputFormat::Object,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OptLevelArg {
    None,
    Speed,
    #[value(name = "speed_and_size")]
    SpeedAndSize,
}

impl From<OptLevelArg> for OptLevel {
    fn from(level: OptLevelArg) -> Self {
        match level {
            OptLevelArg::None => OptLevel::None,
            OptLevelArg::Speed => OptLevel::Speed,
            OptLevelArg::SpeedAndSize => OptLevel::SpeedAndSize,
        }
    }
}

#[derive(Error, Debug)]
enum CliError {
    #[error("cannot read `{}`", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write `{}`", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Cli {
    fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::default()
            .with_opt_level(self.opt_level.into())
            .with_entry(self.entry.clone());
        if let Some(target) = &self.target {
            config = config.with_target(target.clone());
        }
        config
    }

    fn lower_config(&self, purpose: IsaPurpose, backend: &BackendConfig) -> Result<LowerConfig> {
        let call_conv = brisk_emit::target_call_conv(backend, purpose)?;
        let policy = if self.reject_undefined {
            UndefinedUsePolicy::Reject
        } else {
            UndefinedUsePolicy::DefaultBool
        };
        Ok(LowerConfig::default()
            .with_call_conv(call_conv)
            .with_undefined_use(policy))
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
            let _ = err.print();
            return code;
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let bytes = fs::read(&cli.input).map_err(|source| CliError::InputUnreadable {
        path: cli.input.clone(),
        source,
    })?;

    let program = brisk_parser::parse_slice(&bytes)
        .with_context(|| format!("failed to parse `{}`", cli.input.display()))?;
    info!(functions = program.functions.len(), "parsed program");

    let backend = cli.backend_config();
    let lower_config = cli.lower_config(IsaPurpose::Object, &backend)?;
    let lowered = lower_program(&program, &lower_config)?;

    let output = brisk_emit::emit(&lowered, cli.emit.into(), &backend)?;

    // Only touch the output path once everything above has succeeded.
    fs::write(&cli.output, &output).map_err(|source| CliError::OutputUnwritable {
        path: cli.output.clone(),
        source,
    })?;

    if cli.verbose > 0 {
        use colored::*;
        eprintln!(
            "{} lowered {} function(s) to {}",
            "SUCCESS:".bright_green().bold(),
            lowered.len(),
            cli.output.display()
        );
    }

    if cli.run {
        let host_config = cli.lower_config(IsaPurpose::Jit, &backend)?;
        let runnable = if host_config == lower_config {
            lowered
        } else {
            debug!("lowering again for the host calling convention");
            lower_program(&program, &host_config)?
        };
        let status = brisk_emit::run_program(&runnable, &backend)?;
        debug!(status, entry = %backend.entry, "program finished");
    }

    Ok(())
}

/// Maps the first recognized error in the chain to a process exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::InputUnreadable { .. } => EXIT_INPUT,
                CliError::OutputUnwritable { .. } => EXIT_BACKEND,
            };
        }
        if let Some(err) = cause.downcast_ref::<ParseError>() {
            return match err {
                ParseError::UnsupportedOperation { .. } => EXIT_LOWERING,
                _ => EXIT_PARSE,
            };
        }
        if cause.is::<LowerError>() {
            return EXIT_LOWERING;
        }
        if cause.is::<EmitError>() {
            return EXIT_BACKEND;
        }
    }
    EXIT_BACKEND
}

fn report(err: &anyhow::Error) {
    use colored::*;

    eprintln!("{} {}", "error:".bright_red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".yellow(), cause);
    }
}
