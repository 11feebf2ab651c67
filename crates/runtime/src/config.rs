//! Interpreter configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default initial tape length.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// Default duration of the `~` instruction.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Interpreter configuration.
///
/// None of these settings change what a well-formed, race-free program
/// computes; they only shape resources, pacing and failure handling.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of zeroed cells allocated up front. The tape grows past this on
    /// demand.
    pub initial_tape_len: usize,
    /// How long `~` suspends the executing unit.
    pub delay: Duration,
    /// Cancel the remaining siblings of a parallel block as soon as one of
    /// them fails. Off by default: every sibling runs to completion.
    pub fail_fast: bool,
}

impl RuntimeConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.initial_tape_len == 0 {
            return Err(Error::InvalidConfig(
                "initial_tape_len must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            initial_tape_len: DEFAULT_TAPE_LEN,
            delay: DEFAULT_DELAY,
            fail_fast: false,
        }
    }
}
