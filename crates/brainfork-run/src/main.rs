//! Brainfork Run - Executes a Brainfork program
//!
//! Loads program text from a file or standard input, then runs it with `,`
//! reading standard input and `.` writing standard output. Logs go to stderr.

mod source;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use brainfork_runtime::{Interpreter, Program, RuntimeConfig};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::source::ProgramSource;

#[derive(Parser, Debug)]
#[command(name = "brainfork")]
#[command(about = "Run a Brainfork program on parallel threads over a shared tape")]
struct Cli {
    /// Path to the program, or `-` to read it from standard input
    program: Option<PathBuf>,

    /// Initial number of tape cells (the tape grows on demand)
    #[arg(long, default_value_t = brainfork_runtime::config::DEFAULT_TAPE_LEN)]
    tape_size: usize,

    /// Duration of the `~` instruction in milliseconds
    #[arg(long, default_value = "100")]
    delay_ms: u64,

    /// Stop the remaining units of a parallel block as soon as one fails
    #[arg(long)]
    fail_fast: bool,
}

impl Cli {
    fn config(&self) -> RuntimeConfig {
        RuntimeConfig {
            initial_tape_len: self.tape_size,
            delay: Duration::from_millis(self.delay_ms),
            fail_fast: self.fail_fast,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brainfork=warn,brainfork_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let source = ProgramSource::from_arg(cli.program.as_deref());

    info!("Loading program from: {}", source);
    let text = match source.read() {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read {}: {}", source, e);
            return ExitCode::FAILURE;
        }
    };

    let program = match Program::load(&text) {
        Ok(program) => program,
        Err(e) => {
            error!("Syntax error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let interpreter = match Interpreter::new(cli.config(), source.console()) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = interpreter.run(program) {
        error!("Execution failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
