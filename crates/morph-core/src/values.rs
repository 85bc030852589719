//! The tagged [`Value`] that flows through every Action, carrying
//! provenance (`original_name`/`original_type`) alongside whatever the
//! register currently holds.

use serde_json::{Map, Number, Value as Json};

use crate::types::{ActualType, TempType};

/// A scalar payload: the leaf kind every `Json` scalar maps to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarPayload {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl ScalarPayload {
    pub fn temp_type(&self) -> TempType {
        match self {
            ScalarPayload::Int(_) => TempType::Integer,
            ScalarPayload::Float(_) => TempType::Float,
            ScalarPayload::Bool(_) => TempType::Bool,
            ScalarPayload::String(_) => TempType::String,
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            ScalarPayload::Int(i) => Json::Number((*i).into()),
            ScalarPayload::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            ScalarPayload::Bool(b) => Json::Bool(*b),
            ScalarPayload::String(s) => Json::String(s.clone()),
        }
    }
}

/// What the register currently holds. List elements are fully-wrapped
/// `Value`s from ingestion onward, carrying their own provenance; Object
/// entries stay raw JSON, since only `Partial`/`Extract`/`Flatten` ever
/// read them and none need nested provenance.
#[derive(Debug, Clone)]
pub enum ValueData {
    Scalar(ScalarPayload),
    List(Vec<Value>),
    Object(Map<String, Json>),
    Null,
    Absent,
}

/// The register: a value plus the provenance it carries through the
/// pipeline.
#[derive(Debug, Clone)]
pub struct Value {
    pub original_name: String,
    pub actual_name: String,
    pub original_type: TempType,
    pub actual_type: ActualType,
    pub data: ValueData,
}

impl PartialEq for Value {
    /// Structural equality, used to detect whether a `final_fields` entry
    /// matches a `dropped_fields` snapshot for the same name.
    fn eq(&self, other: &Self) -> bool {
        self.original_name == other.original_name
            && self.actual_name == other.actual_name
            && self.original_type == other.original_type
            && self.actual_type == other.actual_type
            && json_data_eq(&self.data, &other.data)
    }
}

fn json_data_eq(a: &ValueData, b: &ValueData) -> bool {
    match (a, b) {
        (ValueData::Scalar(x), ValueData::Scalar(y)) => x == y,
        (ValueData::List(x), ValueData::List(y)) => x == y,
        (ValueData::Object(x), ValueData::Object(y)) => x == y,
        (ValueData::Null, ValueData::Null) => true,
        (ValueData::Absent, ValueData::Absent) => true,
        _ => false,
    }
}

impl Value {
    /// Ingests a top-level source field: infers `TempType` from the raw
    /// JSON and sets `original_name == actual_name`.
    pub fn from_source(name: &str, raw: &Json) -> Value {
        let (original_type, data) = infer(name, raw);
        Value {
            original_name: name.to_string(),
            actual_name: name.to_string(),
            original_type,
            actual_type: ActualType::Temp(original_type),
            data,
        }
    }

    /// A placeholder for a field that has no value in scope (`Take` miss,
    /// post-cast register reset, `Drop`).
    pub fn absent(name: &str) -> Value {
        Value {
            original_name: name.to_string(),
            actual_name: name.to_string(),
            original_type: TempType::String,
            actual_type: ActualType::Temp(TempType::String),
            data: ValueData::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.data, ValueData::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, ValueData::Null)
    }

    /// Re-infers the register from a raw JSON value, inheriting this
    /// value's provenance (`original_name`, `original_type`) the way
    /// `Value.create_value_from_previous` does in the original — used by
    /// `First`/`Last`/`Nth`/`Extract`/`Apply`.
    pub fn rewrap(&self, raw: Json) -> Value {
        let (temp_type, data) = infer(&self.actual_name, &raw);
        Value {
            original_name: self.original_name.clone(),
            actual_name: self.actual_name.clone(),
            original_type: self.original_type,
            actual_type: ActualType::Temp(temp_type),
            data,
        }
    }

    /// A Null register that keeps this value's provenance — navigation
    /// failures (empty list, zero jsonpath matches, out-of-range index).
    pub fn null_inherit(&self) -> Value {
        Value {
            original_name: self.original_name.clone(),
            actual_name: self.actual_name.clone(),
            original_type: self.original_type,
            actual_type: self.actual_type,
            data: ValueData::Null,
        }
    }

    /// Converts the current register back to a JSON value — the payload a
    /// Casting action reads, and what a committed final field reports
    /// through the output document.
    pub fn to_json(&self) -> Json {
        match &self.data {
            ValueData::Scalar(s) => s.to_json(),
            ValueData::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            ValueData::Object(map) => Json::Object(map.clone()),
            ValueData::Null | ValueData::Absent => Json::Null,
        }
    }

    /// A human-readable tag for type-mismatch error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.data {
            ValueData::Scalar(_) => "scalar",
            ValueData::List(_) => "list",
            ValueData::Object(_) => "object",
            ValueData::Null => "null",
            ValueData::Absent => "absent",
        }
    }
}

fn infer(name: &str, raw: &Json) -> (TempType, ValueData) {
    match raw {
        Json::Null => (TempType::String, ValueData::Null),
        Json::Bool(b) => (TempType::Bool, ValueData::Scalar(ScalarPayload::Bool(*b))),
        Json::Number(n) => {
            if n.is_i64() || n.is_u64() {
                let i = n.as_i64().unwrap_or_else(|| n.as_u64().unwrap_or(0) as i64);
                (TempType::Integer, ValueData::Scalar(ScalarPayload::Int(i)))
            } else {
                (
                    TempType::Float,
                    ValueData::Scalar(ScalarPayload::Float(n.as_f64().unwrap_or(0.0))),
                )
            }
        }
        Json::String(s) => (TempType::String, ValueData::Scalar(ScalarPayload::String(s.clone()))),
        Json::Array(items) => {
            let wrapped: Vec<Value> = items
                .iter()
                .map(|item| {
                    let (t, d) = infer(name, item);
                    Value {
                        original_name: name.to_string(),
                        actual_name: name.to_string(),
                        original_type: t,
                        actual_type: ActualType::Temp(t),
                        data: d,
                    }
                })
                .collect();
            (TempType::List, ValueData::List(wrapped))
        }
        Json::Object(map) => (TempType::Object, ValueData::Object(map.clone())),
    }
}
