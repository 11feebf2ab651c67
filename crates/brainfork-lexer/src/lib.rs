// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for Brainfork source.
//!
//! This crate turns raw program text into the canonical instruction string
//! consumed by the runtime loader, using logos.
//!
//! # Design
//!
//! - `Token`: the fourteen Brainfork instructions, one character each
//! - Comments (`;` to end of line) are stripped during lexing (not tokens)
//! - Every other character is an unrecognized token and silently dropped
//! - Token characters defined once in `TOKEN_CHARS` (single source of truth for Display)
//!
//! # Examples
//!
//! ```
//! # use brainfork_lexer::*;
//! let cleaned = clean("+++ ; three\n>{.|.}");
//! assert_eq!(cleaned, "+++>{.|.}");
//! ```

use logos::Logos;

/// Brainfork token.
///
/// Base Brainfuck instructions plus the parallel extensions: delay, cell
/// lock/unlock, parallel block open/close and the segment separator.
///
/// # Layout
///
/// Uses `#[repr(u8)]` so the discriminant indexes `TOKEN_CHARS`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r";[^\n\r\x0B\x0C\x1C-\x1E\x{85}\x{2028}\x{2029}]*")] // Skip ; comments to any line break
pub enum Token {
    // === Pointer motion ===
    /// `>`: advance the data pointer
    #[token(">")]
    Right,
    /// `<`: retreat the data pointer (saturates at zero)
    #[token("<")]
    Left,

    // === Cell arithmetic ===
    /// `+`: increment the current cell
    #[token("+")]
    Inc,
    /// `-`: decrement the current cell
    #[token("-")]
    Dec,

    // === I/O ===
    /// `.`: write the current cell
    #[token(".")]
    Output,
    /// `,`: read into the current cell
    #[token(",")]
    Input,

    // === Loops ===
    /// `[`
    #[token("[")]
    LoopOpen,
    /// `]`
    #[token("]")]
    LoopClose,

    // === Extensions ===
    /// `~`: short sleep
    #[token("~")]
    Delay,
    /// `(`: acquire the current cell's lock
    #[token("(")]
    Lock,
    /// `)`: release the most recently acquired lock
    #[token(")")]
    Unlock,
    /// `{`: open a parallel block
    #[token("{")]
    BlockOpen,
    /// `}`: close a parallel block
    #[token("}")]
    BlockClose,
    /// `|`: separate parallel segments
    #[token("|")]
    Separator,
}

/// Token character lookup table.
///
/// Indexed by the enum discriminant. The `#[token("...")]` attributes above
/// must match these characters.
const TOKEN_CHARS: &[char] = &[
    '>', '<', // pointer
    '+', '-', // arithmetic
    '.', ',', // io
    '[', ']', // loops
    '~', '(', ')', '{', '}', '|', // extensions
];

impl Token {
    /// All tokens, in discriminant order.
    pub const ALL: [Token; 14] = [
        Token::Right,
        Token::Left,
        Token::Inc,
        Token::Dec,
        Token::Output,
        Token::Input,
        Token::LoopOpen,
        Token::LoopClose,
        Token::Delay,
        Token::Lock,
        Token::Unlock,
        Token::BlockOpen,
        Token::BlockClose,
        Token::Separator,
    ];

    /// The single source character of this token.
    pub fn as_char(self) -> char {
        TOKEN_CHARS[self as usize]
    }

    /// Decode one character of a cleaned instruction string.
    pub fn from_char(c: char) -> Option<Token> {
        TOKEN_CHARS
            .iter()
            .position(|&t| t == c)
            .map(|idx| Token::ALL[idx])
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Lex source into its supported tokens.
///
/// Unrecognized characters come back from logos as errors and are dropped
/// here; they are never a lexing failure in Brainfork.
pub fn tokenize(source: &str) -> Vec<Token> {
    Token::lexer(source).filter_map(Result::ok).collect()
}

/// Produce the canonical instruction string for `source`.
pub fn clean(source: &str) -> String {
    Token::lexer(source)
        .filter_map(Result::ok)
        .map(Token::as_char)
        .collect()
}
