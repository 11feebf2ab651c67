//! Integration test harness for Brainfork.
//!
//! This crate provides utilities for end-to-end testing of the full
//! pipeline: Clean → Load → Execute → Verify.

use std::time::Duration;

use brainfork_runtime::{CapturedOutput, Console, Error, Interpreter, RuntimeConfig};

/// Test harness for running Brainfork programs from source.
pub struct TestHarness {
    interpreter: Interpreter,
    output: CapturedOutput,
}

impl TestHarness {
    /// Harness with no input and a 1 ms delay instruction.
    pub fn new() -> Self {
        Self::with_input(Vec::<u8>::new())
    }

    /// Harness whose `,` instructions read from `input`.
    pub fn with_input(input: impl Into<Vec<u8>>) -> Self {
        Self::with_config(
            input,
            RuntimeConfig {
                delay: Duration::from_millis(1),
                ..RuntimeConfig::default()
            },
        )
    }

    /// Harness with an explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn with_config(input: impl Into<Vec<u8>>, config: RuntimeConfig) -> Self {
        let (console, output) = Console::captured(input);
        let interpreter = Interpreter::new(config, console).expect("invalid test configuration");
        Self {
            interpreter,
            output,
        }
    }

    /// Load and run a program.
    pub fn run(&self, source: &str) -> Result<(), Error> {
        self.interpreter.run_source(source)
    }

    /// Load and run a program that must succeed.
    ///
    /// # Panics
    ///
    /// Panics if loading or execution fails.
    pub fn run_ok(&self, source: &str) -> &Self {
        if let Err(e) = self.run(source) {
            panic!("program failed: {e}");
        }
        self
    }

    /// Value of one tape cell.
    pub fn cell(&self, index: usize) -> u8 {
        self.interpreter.tape().read(index)
    }

    /// Output decoded as UTF-8.
    pub fn output(&self) -> String {
        self.output.text()
    }

    /// Raw output bytes.
    pub fn output_bytes(&self) -> Vec<u8> {
        self.output.bytes()
    }

    /// Number of execution units created so far, including top-level units.
    pub fn units_spawned(&self) -> usize {
        self.interpreter.shared().units_spawned()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
