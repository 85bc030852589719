//! Casting and value errors shared across the workspace.

use thiserror::Error;

use crate::types::FinalType;

#[derive(Debug, Error)]
pub enum CastError {
    #[error("cannot cast {value} to {target}")]
    Unrepresentable { value: String, target: FinalType },

    #[error("{target} cast rejects non-finite floating point value")]
    NonFinite { target: FinalType },

    #[error("value of kind {kind} cannot be cast to {target} (only JSON accepts structural values)")]
    NotScalar { kind: &'static str, target: FinalType },
}
