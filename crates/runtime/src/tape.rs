//! Shared tape memory
//!
//! One tape per interpreter, shared by every execution unit through an `Arc`.
//!
//! Each cell is an individually atomic byte, so units never observe torn
//! memory. Read-modify-write sequences are NOT serialized: `+` is a read
//! followed by a write, and two units incrementing the same cell without a
//! lock can lose an update. Programs that need exclusive access bracket the
//! update with `(` and `)`.

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use crate::types::CellIndex;

/// Growable array of byte cells
#[derive(Debug)]
pub struct Tape {
    /// Growth takes the write lock; cell access only the read lock
    cells: RwLock<Vec<AtomicU8>>,
}

impl Tape {
    /// Create a tape of `len` zeroed cells
    pub fn new(len: usize) -> Self {
        Self {
            cells: RwLock::new(zeroed(len)),
        }
    }

    /// Current number of cells
    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a cell. Cells past the end read as zero.
    pub fn read(&self, index: CellIndex) -> u8 {
        self.cells
            .read()
            .get(index)
            .map_or(0, |cell| cell.load(Ordering::Relaxed))
    }

    /// Store a byte, growing the tape first if `index` is out of bounds
    pub fn write(&self, index: CellIndex, value: u8) {
        self.ensure_len(index);
        if let Some(cell) = self.cells.read().get(index) {
            cell.store(value, Ordering::Relaxed);
        }
    }

    /// Grow the tape so `index` is addressable. Never truncates.
    pub fn ensure_len(&self, index: CellIndex) {
        if index < self.cells.read().len() {
            return;
        }
        let mut cells = self.cells.write();
        // Another unit may have grown it between the two locks
        if index >= cells.len() {
            trace!(from = cells.len(), to = index + 1, "tape grown");
            cells.resize_with(index + 1, || AtomicU8::new(0));
        }
    }

    /// Copy of every cell
    pub fn snapshot(&self) -> Vec<u8> {
        self.cells
            .read()
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }
}

fn zeroed(len: usize) -> Vec<AtomicU8> {
    std::iter::repeat_with(|| AtomicU8::new(0))
        .take(len)
        .collect()
}
