//! Brainfork Runtime
//!
//! Loads Brainfork programs and executes them on parallel execution units
//! over one shared tape.

pub mod cancel;
pub mod config;
pub mod console;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod locks;
pub mod parallel;
pub mod program;
pub mod tape;
pub mod types;

pub use config::RuntimeConfig;
pub use console::{CapturedOutput, Console};
pub use error::{Error, Result, SyntaxError};
pub use interpreter::Interpreter;
pub use program::{JumpTable, Op, ParallelBlock, Program};
pub use types::*;
