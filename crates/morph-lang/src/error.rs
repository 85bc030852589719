//! Errors raised while turning recipe text into Instructions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexError {
    #[error("line {line}: tab-continuation has no previous line to extend")]
    DanglingContinuation { line: usize },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unknown opcode {opcode:?}")]
    UnknownOpcode { line: usize, opcode: String },

    #[error("line {line}: {opcode} expects {expected} but got {got} argument(s)")]
    WrongArgCount {
        line: usize,
        opcode: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("line {line}: a Part must carry at least one word")]
    EmptyPart { line: usize },
}
