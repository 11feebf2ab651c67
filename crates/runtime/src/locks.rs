//! Per-cell reentrant locks
//!
//! The registry hands out one [`CellLock`] per cell index, created on first
//! request and kept for the interpreter's lifetime. Ownership is tracked by
//! [`UnitId`]: a unit may re-acquire a lock it already holds, and the lock is
//! free for others only after every nested acquisition has been released.
//!
//! An acquisition is represented by a [`HeldLock`]. Dropping it releases one
//! level, which is how a unit's lock stack unwinds on `)` and on failure.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::cancel::CancelToken;
use crate::types::{CellIndex, UnitId};

/// How often a waiting unit re-checks its cancellation scopes.
const CANCEL_POLL: Duration = Duration::from_millis(20);

/// Registry of cell locks
#[derive(Debug, Default)]
pub struct LockRegistry {
    /// Serializes creation so two units never get distinct locks for one cell
    locks: Mutex<IndexMap<CellIndex, Arc<CellLock>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `cell`, creating it if this is the first request
    pub fn acquire_or_create(&self, cell: CellIndex) -> Arc<CellLock> {
        self.locks
            .lock()
            .entry(cell)
            .or_insert_with(|| {
                trace!(cell, "cell lock created");
                Arc::new(CellLock::new(cell))
            })
            .clone()
    }

    /// Number of locks ever created
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells that have a lock, in creation order
    pub fn cells(&self) -> Vec<CellIndex> {
        self.locks.lock().keys().copied().collect()
    }
}

#[derive(Debug, Default)]
struct LockState {
    owner: Option<UnitId>,
    depth: usize,
}

/// Reentrant lock guarding one cell
#[derive(Debug)]
pub struct CellLock {
    cell: CellIndex,
    state: Mutex<LockState>,
    released: Condvar,
}

/// Cancellation observed while waiting for a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitCancelled;

impl CellLock {
    fn new(cell: CellIndex) -> Self {
        Self {
            cell,
            state: Mutex::new(LockState::default()),
            released: Condvar::new(),
        }
    }

    /// Acquire on behalf of `unit`, blocking while another unit owns the lock.
    ///
    /// With an active cancellation token the wait wakes periodically and
    /// gives up once the token is cancelled.
    pub fn acquire(
        self: &Arc<Self>,
        unit: UnitId,
        cancel: &CancelToken,
    ) -> Result<HeldLock, WaitCancelled> {
        let mut state = self.state.lock();
        loop {
            match state.owner {
                None => {
                    state.owner = Some(unit);
                    state.depth = 1;
                    break;
                }
                Some(owner) if owner == unit => {
                    state.depth += 1;
                    break;
                }
                Some(_) => {
                    if cancel.is_cancelled() {
                        return Err(WaitCancelled);
                    }
                    if cancel.is_active() {
                        self.released.wait_for(&mut state, CANCEL_POLL);
                    } else {
                        self.released.wait(&mut state);
                    }
                }
            }
        }
        trace!(cell = self.cell, %unit, depth = state.depth, "cell lock acquired");
        Ok(HeldLock {
            lock: Arc::clone(self),
            unit,
        })
    }

    fn release(&self, unit: UnitId) {
        let mut state = self.state.lock();
        debug_assert_eq!(state.owner, Some(unit), "lock released by non-owner");
        state.depth = state.depth.saturating_sub(1);
        trace!(cell = self.cell, %unit, depth = state.depth, "cell lock released");
        if state.depth == 0 {
            state.owner = None;
            self.released.notify_all();
        }
    }

    /// Current reentrancy depth (0 when free)
    pub fn depth(&self) -> usize {
        self.state.lock().depth
    }

    pub fn owner(&self) -> Option<UnitId> {
        self.state.lock().owner
    }

    pub fn is_free(&self) -> bool {
        self.owner().is_none()
    }
}

/// One level of ownership of a [`CellLock`]; released on drop
#[derive(Debug)]
pub struct HeldLock {
    lock: Arc<CellLock>,
    unit: UnitId,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        self.lock.release(self.unit);
    }
}
