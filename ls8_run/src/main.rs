use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use env_logger::Env;
use ls8::{load_file, ProgramFormat, UnknownOpcodePolicy, CPU};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// Pick by extension: `.ls8` is binary, anything else is mnemonic.
    Auto,
    Mnemonic,
    Binary,
}

#[derive(Parser, Debug)]
#[command(name = "ls8_run", about = "Run an LS-8 program.")]
struct Args {
    /// Program file to load at address 0.
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// Abort on opcodes missing from the instruction table instead of skipping them.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Log every instruction cycle.
    #[arg(long, default_value_t = false)]
    trace: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if args.trace {
        logger.filter_level(log::LevelFilter::Trace);
    }
    logger.init();

    let format = match args.format {
        Format::Auto => ProgramFormat::from_path(&args.program),
        Format::Mnemonic => ProgramFormat::Mnemonic,
        Format::Binary => ProgramFormat::Binary,
    };

    let program = match load_file(&args.program, format) {
        Ok(program) => program,
        Err(e) => {
            log::error!("{}: {}", args.program.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let policy = if args.strict {
        UnknownOpcodePolicy::Strict
    } else {
        UnknownOpcodePolicy::Skip
    };
    let mut cpu = CPU::new().with_policy(policy);

    if let Err(e) = cpu.load_and_run(&program) {
        log::error!("{}", e);
        log::error!("{}", cpu.trace());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
