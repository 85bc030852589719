//! The source-inferred (`TempType`) and target (`FinalType`) type lattices.

use std::fmt;

use serde::Serialize;

/// A kind inferred once at ingestion from a source JSON value, and again
/// whenever a Pointer/Transformation action reshapes the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TempType {
    String,
    Integer,
    Float,
    Bool,
    List,
    Object,
}

impl TempType {
    /// The type a source field finalizes into when no recipe instruction
    /// ever touches it and untouched fields are still kept in the output.
    pub fn default_final_type(self) -> FinalType {
        match self {
            TempType::String => FinalType::String,
            TempType::Bool => FinalType::Bool,
            TempType::Float => FinalType::Float,
            TempType::Integer => FinalType::Integer,
            TempType::List | TempType::Object => FinalType::Json,
        }
    }
}

impl fmt::Display for TempType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TempType::String => "STRING",
            TempType::Integer => "INTEGER",
            TempType::Float => "FLOAT",
            TempType::Bool => "BOOL",
            TempType::List => "LIST",
            TempType::Object => "OBJECT",
        };
        f.write_str(name)
    }
}

/// The target kind a Casting action commits the register to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FinalType {
    String,
    Integer,
    Decimal,
    Float,
    Timestamp,
    Unixtime,
    UnixtimeMs,
    Bool,
    Json,
    Date,
}

impl FinalType {
    /// Parses the recipe literal used after `^cast`/`^safe_cast`/`^default_cast`.
    pub fn from_literal(literal: &str) -> Option<Self> {
        Some(match literal {
            "string" => FinalType::String,
            "integer" => FinalType::Integer,
            "decimal" => FinalType::Decimal,
            "float" => FinalType::Float,
            "timestamp" => FinalType::Timestamp,
            "unixtime" => FinalType::Unixtime,
            "unixtime_ms" => FinalType::UnixtimeMs,
            "bool" => FinalType::Bool,
            "json" => FinalType::Json,
            "date" => FinalType::Date,
            _ => return None,
        })
    }

    /// The name reported in output metadata (`metadata[name].type`).
    pub fn name(self) -> &'static str {
        match self {
            FinalType::String => "STRING",
            FinalType::Integer => "INTEGER",
            FinalType::Decimal => "DECIMAL",
            FinalType::Float => "FLOAT",
            FinalType::Timestamp => "TIMESTAMP",
            FinalType::Unixtime => "UNIXTIME",
            FinalType::UnixtimeMs => "UNIXTIME_MS",
            FinalType::Bool => "BOOL",
            FinalType::Json => "JSON",
            FinalType::Date => "DATE",
        }
    }
}

impl fmt::Display for FinalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the register's `actual_type` holds: a `TempType` until a Casting
/// action commits it, then the `FinalType` it was cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActualType {
    Temp(TempType),
    Final(FinalType),
}

impl ActualType {
    pub fn name(self) -> String {
        match self {
            ActualType::Temp(t) => t.to_string(),
            ActualType::Final(t) => t.name().to_string(),
        }
    }
}

impl fmt::Display for ActualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
