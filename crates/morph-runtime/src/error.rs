//! Translation- and execution-time errors.

use thiserror::Error;

use morph_core::CastError;
use morph_lang::ParseError;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("{opcode} has no argument mapping to an action")]
    MissingArgs { opcode: &'static str },

    #[error("#nth argument {raw:?} is not an integer")]
    InvalidNthArgument { raw: String },

    #[error("^cast/^safe_cast/^default_cast argument {raw:?} is not a known final type")]
    UnknownFinalType { raw: String },

    #[error("!apply target function {name:?} is not registered")]
    UnknownFunction { name: String },

    #[error("!extract path {path:?} is not a valid JSONPath expression: {reason}")]
    InvalidJsonPath { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("{action} requires a {expected} register, found {found}")]
    WrongKind {
        action: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("!apply({name}) returned a shape morph cannot rewrap: {shape}")]
    UnsupportedApplyResult { name: String, shape: &'static str },

    #[error("morph() called before translate()")]
    NotTranslated,
}

#[derive(Debug, Error)]
pub enum MorphError {
    #[error(transparent)]
    Lex(#[from] morph_lang::LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
