//! Parallel block coordinator
//!
//! `{ a | b | c }` runs `a`, `b` and `c` as sibling execution units, each on
//! its own OS thread, and resumes the parent after all of them have finished.
//!
//! Children share the parent's tape, lock registry, console and configuration.
//! They do not share its position: every child starts at instruction 0 with
//! data pointer 0 and an empty lock stack, whatever the parent's state.
//!
//! Without fail-fast the join waits for every child, so one child that never
//! terminates stalls the block even after a sibling has failed. With fail-fast
//! the first failure cancels the block's scope and the remaining children stop
//! at their next instruction or lock wait.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cancel::CancelToken;
use crate::error::{Error, Result, SyntaxError};
use crate::executor::{ExecutionUnit, spawn_unit};
use crate::interpreter::Shared;
use crate::program::ParallelBlock;

/// Body and closing index of the block opened at `open`.
///
/// Scans forward from the `{` at `open` tracking nesting depth. Both the
/// position argument and the returned index are byte offsets into `code`,
/// which must be a cleaned instruction string.
pub fn extract_block(code: &str, open: usize) -> std::result::Result<(&str, usize), SyntaxError> {
    debug_assert_eq!(code.as_bytes().get(open), Some(&b'{'));
    let mut depth = 0usize;
    for (pos, byte) in code.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok((&code[open + 1..pos], pos));
                }
            }
            _ => {}
        }
    }
    Err(SyntaxError::UnmatchedBlockOpen { position: open })
}

/// Split a block body on its depth-zero separators.
///
/// Returns each segment with its offset in `body`. Separators inside nested
/// blocks belong to those blocks: `+{-|>}|<` splits into `+{-|>}` and `<`.
pub fn split_segments(body: &str) -> Vec<(usize, &str)> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, byte) in body.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'|' if depth == 0 => {
                segments.push((start, &body[start..pos]));
                start = pos + 1;
            }
            _ => {}
        }
    }
    segments.push((start, &body[start..]));
    segments
}

/// Fork one unit per segment and join them all.
pub(crate) fn run_block(
    block: &ParallelBlock,
    shared: &Arc<Shared>,
    cancel: &CancelToken,
) -> Result<()> {
    let scope = if shared.config().fail_fast {
        cancel.child()
    } else {
        cancel.clone()
    };

    debug!(
        position = block.origin,
        segments = block.segments.len(),
        "parallel block forking"
    );

    let mut failures = Vec::new();
    let mut handles = Vec::with_capacity(block.segments.len());
    for segment in &block.segments {
        let unit = ExecutionUnit::new(
            shared.next_unit_id(),
            Arc::clone(segment),
            Arc::clone(shared),
            scope.clone(),
        );
        match spawn_unit(unit) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                error!(position = block.origin, error = %e, "failed to spawn execution unit");
                failures.push(Error::Io(e));
                scope.cancel();
            }
        }
    }

    for (unit, handle) in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(e),
            Err(_) => {
                error!(%unit, "execution unit panicked");
                failures.push(Error::UnitPanicked { unit });
                scope.cancel();
            }
        }
    }

    debug!(
        position = block.origin,
        failed = failures.len(),
        "parallel block joined"
    );

    if failures.is_empty() {
        return Ok(());
    }
    let failed = failures.len();
    let first = match failures.iter().position(|e| !e.is_cancellation()) {
        Some(idx) => failures.swap_remove(idx),
        None => failures.swap_remove(0),
    };
    Err(Error::ParallelBlockFailed {
        position: block.origin,
        failed,
        first: Box::new(first),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_block() {
        let (body, close) = extract_block("+{-|>}<", 1).unwrap();
        assert_eq!(body, "-|>");
        assert_eq!(close, 5);
    }

    #[test]
    fn test_extract_nested_block() {
        let code = "{a{b}c}d";
        let (body, close) = extract_block(code, 0).unwrap();
        assert_eq!(body, "a{b}c");
        assert_eq!(close, 6);

        let (inner, inner_close) = extract_block(code, 2).unwrap();
        assert_eq!(inner, "b");
        assert_eq!(inner_close, 4);
    }

    #[test]
    fn test_extract_unmatched() {
        assert_eq!(
            extract_block("+{{}", 1),
            Err(SyntaxError::UnmatchedBlockOpen { position: 1 })
        );
    }

    #[test]
    fn test_split_respects_nesting() {
        let segments: Vec<&str> = split_segments("A{B|C}|D").into_iter().map(|(_, s)| s).collect();
        assert_eq!(segments, vec!["A{B|C}", "D"]);
    }

    #[test]
    fn test_split_offsets() {
        let segments = split_segments("+|{-|-}|>>");
        assert_eq!(segments, vec![(0, "+"), (2, "{-|-}"), (8, ">>")]);
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split_segments("+-"), vec![(0, "+-")]);
        assert_eq!(split_segments(""), vec![(0, "")]);
        assert_eq!(split_segments("|"), vec![(0, ""), (1, "")]);
    }
}
