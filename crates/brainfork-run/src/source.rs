//! Where the program text comes from.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use brainfork_runtime::Console;

/// Program text location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    Stdin,
    File(PathBuf),
}

impl ProgramSource {
    /// No argument and `-` both mean standard input
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path != Path::new("-") => ProgramSource::File(path.to_path_buf()),
            _ => ProgramSource::Stdin,
        }
    }

    pub fn read(&self) -> io::Result<String> {
        match self {
            ProgramSource::File(path) => std::fs::read_to_string(path),
            ProgramSource::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }

    /// Console for `,` and `.`.
    ///
    /// A program read from standard input has already drained it, so its `,`
    /// instructions see end of input.
    pub fn console(&self) -> Console {
        match self {
            ProgramSource::File(_) => Console::stdio(),
            ProgramSource::Stdin => Console::new(io::empty(), io::stdout()),
        }
    }
}

impl fmt::Display for ProgramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramSource::Stdin => write!(f, "<stdin>"),
            ProgramSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
