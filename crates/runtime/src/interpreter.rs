//! Interpreter entry point and shared state.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{error, info};

use crate::cancel::CancelToken;
use crate::config::RuntimeConfig;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::executor::{ExecutionUnit, spawn_unit};
use crate::locks::LockRegistry;
use crate::program::Program;
use crate::tape::Tape;
use crate::types::UnitId;

/// State shared by every execution unit of one interpreter
#[derive(Debug)]
pub struct Shared {
    tape: Tape,
    locks: LockRegistry,
    console: Console,
    config: RuntimeConfig,
    next_unit: AtomicUsize,
}

impl Shared {
    pub fn new(config: RuntimeConfig, console: Console) -> Self {
        Self {
            tape: Tape::new(config.initial_tape_len),
            locks: LockRegistry::new(),
            console,
            config,
            next_unit: AtomicUsize::new(0),
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Allocate the identifier for a new unit
    pub fn next_unit_id(&self) -> UnitId {
        UnitId(self.next_unit.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of units created so far
    pub fn units_spawned(&self) -> usize {
        self.next_unit.load(Ordering::Relaxed)
    }
}

/// Runs programs against one tape and lock registry
///
/// Consecutive runs on the same interpreter see each other's tape contents
/// and locks.
#[derive(Debug, Clone)]
pub struct Interpreter {
    shared: Arc<Shared>,
}

impl Interpreter {
    pub fn new(config: RuntimeConfig, console: Console) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config, console)),
        })
    }

    /// Run `program` on a fresh top-level unit and wait for it to finish
    pub fn run(&self, program: impl Into<Arc<Program>>) -> Result<()> {
        let program = program.into();
        let unit = ExecutionUnit::new(
            self.shared.next_unit_id(),
            program,
            Arc::clone(&self.shared),
            CancelToken::default(),
        );
        let (id, handle) = spawn_unit(unit)?;
        let result = handle.join().unwrap_or_else(|_| {
            error!(unit = %id, "execution unit panicked");
            Err(Error::UnitPanicked { unit: id })
        });
        if result.is_ok() {
            info!(
                units = self.shared.units_spawned(),
                locks = self.shared.locks().len(),
                "program finished"
            );
        }
        result
    }

    /// Load and run `source`
    pub fn run_source(&self, source: &str) -> Result<()> {
        let program = Program::load(source)?;
        self.run(program)
    }

    pub fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    pub fn tape(&self) -> &Tape {
        self.shared.tape()
    }

    pub fn locks(&self) -> &LockRegistry {
        self.shared.locks()
    }
}
