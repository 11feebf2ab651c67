//! Program loader
//!
//! Turns source text into an immutable [`Program`]: the canonical instruction
//! string, its decoded instructions, the loop [`JumpTable`], and one
//! [`ParallelBlock`] per depth-zero `{`, each holding its segments already
//! loaded as programs of their own.
//!
//! Loading is the only place structural errors are raised. Every segment of
//! every nested block is checked before the first instruction runs, so a
//! malformed block deep inside a program can never fail mid-run.

use std::sync::Arc;

use brainfork_lexer::{Token, clean};
use indexmap::IndexMap;
use tracing::info;

use crate::error::SyntaxError;
use crate::parallel::{extract_block, split_segments};

/// Decoded instruction
///
/// Closed set, dispatched by a single `match` in the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Right,
    Left,
    Inc,
    Dec,
    Output,
    Input,
    LoopOpen,
    LoopClose,
    Delay,
    Lock,
    Unlock,
    BlockOpen,
    BlockClose,
    Separator,
}

impl From<Token> for Op {
    fn from(token: Token) -> Self {
        match token {
            Token::Right => Op::Right,
            Token::Left => Op::Left,
            Token::Inc => Op::Inc,
            Token::Dec => Op::Dec,
            Token::Output => Op::Output,
            Token::Input => Op::Input,
            Token::LoopOpen => Op::LoopOpen,
            Token::LoopClose => Op::LoopClose,
            Token::Delay => Op::Delay,
            Token::Lock => Op::Lock,
            Token::Unlock => Op::Unlock,
            Token::BlockOpen => Op::BlockOpen,
            Token::BlockClose => Op::BlockClose,
            Token::Separator => Op::Separator,
        }
    }
}

/// Pairing of every `[` with its matching `]`, in both directions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpTable {
    partners: Vec<Option<usize>>,
}

impl JumpTable {
    /// Pair loop brackets. Positions in errors are local to `ops`.
    pub fn build(ops: &[Op]) -> Result<Self, SyntaxError> {
        let mut partners = vec![None; ops.len()];
        let mut open = Vec::new();
        for (pos, op) in ops.iter().enumerate() {
            match op {
                Op::LoopOpen => open.push(pos),
                Op::LoopClose => {
                    let start = open
                        .pop()
                        .ok_or(SyntaxError::UnmatchedLoopClose { position: pos })?;
                    partners[start] = Some(pos);
                    partners[pos] = Some(start);
                }
                _ => {}
            }
        }
        if let Some(&position) = open.last() {
            return Err(SyntaxError::UnmatchedLoopOpen { position });
        }
        Ok(Self { partners })
    }

    /// The matching bracket of the bracket at `pos`
    pub fn partner(&self, pos: usize) -> Option<usize> {
        self.partners.get(pos).copied().flatten()
    }

    /// `(open, close)` pairs ordered by open position
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.partners
            .iter()
            .enumerate()
            .filter_map(|(pos, &partner)| partner.filter(|&p| p > pos).map(|p| (pos, p)))
    }
}

/// A `{ ... }` region and its segments
#[derive(Debug)]
pub struct ParallelBlock {
    /// Index of `{` in the owning program
    pub open: usize,
    /// Index of the matching `}` in the owning program
    pub close: usize,
    /// Index of `{` in the top-level instruction string
    pub origin: usize,
    /// One program per `|`-separated segment
    pub segments: Vec<Arc<Program>>,
}

/// A loaded, structurally valid instruction string
#[derive(Debug)]
pub struct Program {
    text: String,
    ops: Vec<Op>,
    jumps: JumpTable,
    blocks: IndexMap<usize, ParallelBlock>,
    /// Offset of `text` within the top-level instruction string
    origin: usize,
}

impl Program {
    /// Clean `source` and load it as a top-level program
    pub fn load(source: &str) -> Result<Self, SyntaxError> {
        let text = clean(source);
        let program = Self::compile_at(&text, 0)?;
        info!(
            instructions = program.len(),
            blocks = program.block_count(),
            "program loaded"
        );
        Ok(program)
    }

    fn compile_at(text: &str, origin: usize) -> Result<Self, SyntaxError> {
        let ops: Vec<Op> = text.chars().filter_map(Token::from_char).map(Op::from).collect();
        let jumps = JumpTable::build(&ops).map_err(|e| e.offset_by(origin))?;

        let mut blocks = IndexMap::new();
        let mut pos = 0;
        while pos < ops.len() {
            match ops[pos] {
                Op::BlockOpen => {
                    let (body, close) = extract_block(text, pos).map_err(|e| e.offset_by(origin))?;
                    let body_origin = origin + pos + 1;
                    let segments = split_segments(body)
                        .into_iter()
                        .map(|(offset, segment)| {
                            Self::compile_at(segment, body_origin + offset).map(Arc::new)
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    blocks.insert(
                        pos,
                        ParallelBlock {
                            open: pos,
                            close,
                            origin: origin + pos,
                            segments,
                        },
                    );
                    pos = close + 1;
                }
                _ => pos += 1,
            }
        }

        Ok(Self {
            text: text.to_string(),
            ops,
            jumps,
            blocks,
            origin,
        })
    }

    /// The canonical instruction string
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn jumps(&self) -> &JumpTable {
        &self.jumps
    }

    /// The block opened at `open`, if `open` is a depth-zero `{`
    pub fn block(&self, open: usize) -> Option<&ParallelBlock> {
        self.blocks.get(&open)
    }

    /// Depth-zero blocks in source order
    pub fn blocks(&self) -> impl Iterator<Item = &ParallelBlock> {
        self.blocks.values()
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Offset of this program within the top-level instruction string
    pub fn origin(&self) -> usize {
        self.origin
    }
}
