//! Runtime errors for Brainfork execution.
//!
//! # Error Categories
//!
//! - **Structural errors**: [`SyntaxError`], raised by the loader before any
//!   instruction runs
//! - **Lock-discipline errors**: [`Error::UnlockWithoutLock`], [`Error::LocksHeldAtExit`]
//! - **Unit lifecycle errors**: [`Error::Cancelled`], [`Error::UnitPanicked`],
//!   [`Error::ParallelBlockFailed`]
//! - **Host errors**: [`Error::Io`], [`Error::InvalidConfig`]
//!
//! Runtime errors are fatal to the unit that raises them. They surface through
//! the join of the enclosing parallel block, and from there through every
//! ancestor unit up to the interpreter. Nothing is retried: a program is a
//! deterministic replay of its text.

use thiserror::Error;

use crate::types::UnitId;

/// Runtime result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Unbalanced structure found while loading a program.
///
/// Positions are indices into the top-level instruction string, also for
/// errors found inside nested parallel segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("']' at position {position} without matching '['")]
    UnmatchedLoopClose { position: usize },

    #[error("'[' at position {position} without matching ']'")]
    UnmatchedLoopOpen { position: usize },

    #[error("'{{' at position {position} without matching '}}'")]
    UnmatchedBlockOpen { position: usize },
}

impl SyntaxError {
    /// Position of the offending bracket.
    pub fn position(&self) -> usize {
        match self {
            SyntaxError::UnmatchedLoopClose { position }
            | SyntaxError::UnmatchedLoopOpen { position }
            | SyntaxError::UnmatchedBlockOpen { position } => *position,
        }
    }

    /// Shift the position by `offset`, used when a segment error is reported
    /// against its enclosing program.
    pub(crate) fn offset_by(self, offset: usize) -> Self {
        match self {
            SyntaxError::UnmatchedLoopClose { position } => SyntaxError::UnmatchedLoopClose {
                position: position + offset,
            },
            SyntaxError::UnmatchedLoopOpen { position } => SyntaxError::UnmatchedLoopOpen {
                position: position + offset,
            },
            SyntaxError::UnmatchedBlockOpen { position } => SyntaxError::UnmatchedBlockOpen {
                position: position + offset,
            },
        }
    }
}

/// Errors that can occur while running a Brainfork program.
#[derive(Debug, Error)]
pub enum Error {
    /// The program failed its structural check.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// `)` executed with nothing on the unit's lock stack.
    #[error("{unit}: unlock without lock at position {position}")]
    UnlockWithoutLock { unit: UnitId, position: usize },

    /// The unit reached the end of its instructions still holding locks.
    #[error("{unit}: {held} lock(s) not released before end")]
    LocksHeldAtExit { unit: UnitId, held: usize },

    /// The unit stopped because a sibling failed in fail-fast mode.
    #[error("{unit}: cancelled after a sibling unit failed")]
    Cancelled { unit: UnitId },

    /// The unit's thread panicked.
    #[error("{unit}: execution unit panicked")]
    UnitPanicked { unit: UnitId },

    /// One or more children of a parallel block failed.
    ///
    /// `first` is the earliest-joined failure that is not a cancellation, so
    /// the root cause is reported rather than its fallout.
    #[error("parallel block at position {position} failed ({failed} unit(s)): {first}")]
    ParallelBlockFailed {
        position: usize,
        failed: usize,
        first: Box<Error>,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The error at the bottom of a chain of parallel block failures.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::ParallelBlockFailed { first, .. } => first.root_cause(),
            other => other,
        }
    }

    /// Whether this is a lock-discipline violation (directly or at the root of
    /// a block failure).
    pub fn is_lock_discipline(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::UnlockWithoutLock { .. } | Error::LocksHeldAtExit { .. }
        )
    }

    pub(crate) fn is_cancellation(&self) -> bool {
        matches!(self.root_cause(), Error::Cancelled { .. })
    }
}
