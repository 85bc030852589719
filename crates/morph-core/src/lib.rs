//! Morph Core — value model and type lattice shared by the recipe lexer,
//! parser, and runtime.
//!
//! Provides the tagged [`Value`] wrapper, the `TempType`/`FinalType`
//! lattice, and the [`Caster`] that moves a runtime value from one to the
//! other.
#![warn(clippy::all)]

pub mod caster;
pub mod error;
pub mod types;
pub mod values;

pub use caster::Caster;
pub use error::CastError;
pub use types::{FinalType, TempType};
pub use values::{ScalarPayload, Value, ValueData};
