//! Execution unit
//!
//! One thread of control over one [`Program`]: an instruction pointer, a data
//! pointer and a stack of held cell locks, driven by a fetch-dispatch loop.
//!
//! Loop jumps use the pairing from the program's [`JumpTable`](crate::JumpTable):
//! a `[` on a zero cell continues just past its `]`, and a `]` on a non-zero
//! cell continues at its `[`, which tests the cell again.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, instrument, warn};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::interpreter::Shared;
use crate::locks::HeldLock;
use crate::parallel::run_block;
use crate::program::{Op, Program};
use crate::types::{CellIndex, UnitId};

/// A single logical thread executing one instruction string
#[derive(Debug)]
pub struct ExecutionUnit {
    id: UnitId,
    program: Arc<Program>,
    shared: Arc<Shared>,
    cancel: CancelToken,
    ip: usize,
    dp: CellIndex,
    /// Released strictly last-acquired-first
    held: Vec<HeldLock>,
}

impl ExecutionUnit {
    pub fn new(
        id: UnitId,
        program: Arc<Program>,
        shared: Arc<Shared>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            id,
            program,
            shared,
            cancel,
            ip: 0,
            dp: 0,
            held: Vec::new(),
        }
    }

    pub fn dp(&self) -> CellIndex {
        self.dp
    }

    /// Number of locks currently on the stack
    pub fn held_locks(&self) -> usize {
        self.held.len()
    }

    /// Run until the instruction string is exhausted.
    ///
    /// On failure every held lock is released before returning, and in
    /// fail-fast mode the unit's sibling scope is cancelled.
    #[instrument(name = "unit", skip_all, fields(unit = %self.id))]
    pub fn run(&mut self) -> Result<()> {
        debug!(instructions = self.program.len(), "unit started");
        let result = self.execute();
        match &result {
            Ok(()) => debug!("unit finished"),
            Err(e) => {
                if e.is_cancellation() {
                    debug!(error = %e, "unit cancelled");
                } else {
                    warn!(error = %e, "unit failed");
                }
                self.held.clear();
                if self.shared.config().fail_fast {
                    self.cancel.cancel();
                }
            }
        }
        result
    }

    fn execute(&mut self) -> Result<()> {
        while self.ip < self.program.len() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled { unit: self.id });
            }
            self.ip = self.step()?;
        }
        if !self.held.is_empty() {
            return Err(Error::LocksHeldAtExit {
                unit: self.id,
                held: self.held.len(),
            });
        }
        Ok(())
    }

    /// Execute the instruction at `ip` and return the next `ip`
    fn step(&mut self) -> Result<usize> {
        let shared = &self.shared;
        let tape = shared.tape();
        let mut next = self.ip + 1;

        let op = self.program.ops()[self.ip];
        match op {
            Op::Right => {
                self.dp += 1;
                tape.ensure_len(self.dp);
            }
            Op::Left => self.dp = self.dp.saturating_sub(1),
            Op::Inc => tape.write(self.dp, tape.read(self.dp).wrapping_add(1)),
            Op::Dec => tape.write(self.dp, tape.read(self.dp).wrapping_sub(1)),
            Op::Output => shared.console().write_char(tape.read(self.dp))?,
            Op::Input => {
                let value = shared.console().read_byte()?.unwrap_or(0);
                tape.write(self.dp, value);
            }
            Op::LoopOpen => {
                if tape.read(self.dp) == 0 {
                    next = self.partner() + 1;
                }
            }
            Op::LoopClose => {
                if tape.read(self.dp) != 0 {
                    next = self.partner();
                }
            }
            Op::Delay => thread::sleep(shared.config().delay),
            Op::Lock => {
                let lock = shared.locks().acquire_or_create(self.dp);
                let held = lock
                    .acquire(self.id, &self.cancel)
                    .map_err(|_| Error::Cancelled { unit: self.id })?;
                self.held.push(held);
            }
            Op::Unlock => {
                let held = self.held.pop().ok_or(Error::UnlockWithoutLock {
                    unit: self.id,
                    position: self.program.origin() + self.ip,
                })?;
                drop(held);
            }
            Op::BlockOpen => {
                let block = self
                    .program
                    .block(self.ip)
                    .expect("loader registers every depth-zero block");
                run_block(block, shared, &self.cancel)?;
                next = block.close + 1;
            }
            // Only reachable at depth zero outside any block; no effect
            Op::BlockClose | Op::Separator => {}
        }

        Ok(next)
    }

    fn partner(&self) -> usize {
        self.program
            .jumps()
            .partner(self.ip)
            .expect("loader pairs every loop bracket")
    }
}

/// Start `unit` on its own named thread.
pub(crate) fn spawn_unit(
    mut unit: ExecutionUnit,
) -> io::Result<(UnitId, JoinHandle<Result<()>>)> {
    let id = unit.id;
    let handle = thread::Builder::new()
        .name(id.to_string())
        .spawn(move || unit.run())?;
    Ok((id, handle))
}
