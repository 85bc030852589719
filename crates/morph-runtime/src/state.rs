//! `MorphState` — the four field maps plus the register, threaded through
//! every Action in order.

use std::collections::HashMap;

use morph_core::Value;
use serde_json::{Map, Value as Json};

/// The mutable state a Recipe's Actions run against. One `MorphState` per
/// `morph()` call; never shared across concurrent runs.
pub struct MorphState {
    pub source_fields: HashMap<String, Value>,
    pub temp_fields: HashMap<String, Value>,
    pub final_fields: HashMap<String, Value>,
    pub dropped_fields: HashMap<String, Value>,
    pub value: Value,
}

impl MorphState {
    /// Builds a fresh state from the input document, inferring a `Value`
    /// for each top-level field. The register starts Absent.
    pub fn from_input(input: &Map<String, Json>) -> MorphState {
        let source_fields = input
            .iter()
            .map(|(name, raw)| (name.clone(), Value::from_source(name, raw)))
            .collect();
        MorphState {
            source_fields,
            temp_fields: HashMap::new(),
            final_fields: HashMap::new(),
            dropped_fields: HashMap::new(),
            value: Value::absent(""),
        }
    }

    /// `Take`'s fallback chain: exact `temp_fields`, exact `source_fields`,
    /// then a `temp_fields` key whose `$`-prefix matches `name` (the
    /// `@split` convention). Returns the resolved Value and, for the
    /// prefix-match case, the base name to reset `actual_name` to.
    pub fn resolve_take(&self, name: &str) -> Value {
        if let Some(v) = self.temp_fields.get(name) {
            return v.clone();
        }
        if let Some(v) = self.source_fields.get(name) {
            return v.clone();
        }
        for (key, v) in &self.temp_fields {
            if let Some((prefix, _suffix)) = key.split_once('$') {
                if prefix == name {
                    let mut resolved = v.clone();
                    resolved.actual_name = prefix.to_string();
                    return resolved;
                }
            }
        }
        Value::absent(name)
    }

    /// `Drop`'s bookkeeping: records the field as dropped if it exists
    /// among `source_fields` (idempotent — re-dropping overwrites with an
    /// equal snapshot).
    pub fn record_drop(&mut self, name: &str) {
        if let Some(v) = self.source_fields.get(name) {
            self.dropped_fields.insert(name.to_string(), v.clone());
        }
    }

    /// Naming actions snapshot the register here under its current
    /// `actual_name` after every rename.
    pub fn snapshot_temp(&mut self) {
        self.temp_fields.insert(self.value.actual_name.clone(), self.value.clone());
    }

    /// Commits the register to `final_fields` under its `actual_name` and
    /// clears it back to Absent — Casting is always terminal.
    pub fn commit_final(&mut self) {
        let name = self.value.actual_name.clone();
        self.final_fields.insert(name.clone(), self.value.clone());
        self.value = Value::absent(&name);
    }

    /// Builds the `(output, metadata)` pair the executor returns,
    /// excluding any `final_fields` entry that exactly matches the
    /// `dropped_fields` snapshot under the same name.
    pub fn to_output(&self) -> (Map<String, Json>, Map<String, Json>) {
        let mut output = Map::new();
        let mut metadata = Map::new();
        for (name, value) in &self.final_fields {
            if self.dropped_fields.get(name) == Some(value) {
                continue;
            }
            output.insert(name.clone(), value.to_json());
            metadata.insert(
                name.clone(),
                serde_json::json!({
                    "from_field": value.original_name,
                    "from_field_type": value.original_type.to_string(),
                    "type": value.actual_type.name(),
                }),
            );
        }
        (output, metadata)
    }
}
