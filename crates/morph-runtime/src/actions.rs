//! The executable form of a parsed Operation: one variant per opcode,
//! dispatched through a single `run` function against the shared
//! register-and-field-maps state.

use serde_json::{Map, Value as Json};
use serde_json_path::JsonPath;

use morph_core::types::{ActualType, FinalType, TempType};
use morph_core::{Caster, Value, ValueData};

use crate::error::{MorphError, RuntimeError, TypeError};
use crate::registry::MorphFn;
use crate::state::MorphState;

/// One executable verb. Holds whatever the translator resolved at
/// construction time (the compiled JSONPath, the looked-up function, the
/// parsed `FinalType`) so the executor never fails on malformed recipe
/// text — only on data that does not fit.
pub enum Action {
    Take(String),
    Drop(String),
    Full,
    Partial(Vec<String>),
    First,
    Last,
    Nth(i64),
    Id,
    Extract { path: JsonPath },
    Flatten,
    Apply { name: String, f: MorphFn },
    Lower,
    Upper,
    Alias(Option<String>),
    Prefix(String),
    Suffix(String),
    Split,
    Cast(FinalType),
    SafeCast(FinalType),
    DefaultCast(FinalType, Option<Json>),
}

fn short_circuits(value: &Value) -> bool {
    value.is_absent() || value.is_null()
}

fn wrong_kind(action: &'static str, expected: &'static str, value: &Value) -> MorphError {
    TypeError::WrongKind {
        action,
        expected,
        found: value.kind_name(),
    }
    .into()
}

fn require_object<'a>(action: &'static str, value: &'a Value) -> Result<&'a Map<String, Json>, MorphError> {
    match &value.data {
        ValueData::Object(map) => Ok(map),
        _ => Err(wrong_kind(action, "object", value)),
    }
}

fn require_list<'a>(action: &'static str, value: &'a Value) -> Result<&'a [Value], MorphError> {
    match &value.data {
        ValueData::List(items) => Ok(items),
        _ => Err(wrong_kind(action, "list", value)),
    }
}

fn pick_index(len: usize, i: i64) -> Option<usize> {
    if i.unsigned_abs() as usize >= len {
        return None;
    }
    let idx = if i >= 0 { i } else { len as i64 + i };
    usize::try_from(idx).ok()
}

fn wrap_apply_result(parent: &Value, result: Json) -> Result<Value, MorphError> {
    match result {
        Json::Array(items) => {
            let wrapped: Vec<Value> = items.into_iter().map(|item| parent.rewrap(item)).collect();
            Ok(Value {
                original_name: parent.original_name.clone(),
                actual_name: parent.actual_name.clone(),
                original_type: parent.original_type,
                actual_type: ActualType::Temp(TempType::List),
                data: ValueData::List(wrapped),
            })
        }
        Json::Object(map) => Ok(Value {
            original_name: parent.original_name.clone(),
            actual_name: parent.actual_name.clone(),
            original_type: parent.original_type,
            actual_type: ActualType::Temp(TempType::Object),
            data: ValueData::Object(map),
        }),
        Json::String(_) | Json::Number(_) | Json::Bool(_) => Ok(parent.rewrap(result)),
        Json::Null => Err(RuntimeError::UnsupportedApplyResult {
            name: parent.actual_name.clone(),
            shape: "null",
        }
        .into()),
    }
}

/// Runs one Action against `state`, mutating the register and field maps
/// in place.
pub fn run(action: &Action, state: &mut MorphState) -> Result<(), MorphError> {
    match action {
        Action::Take(name) => {
            state.value = state.resolve_take(name);
        }
        Action::Drop(name) => {
            state.record_drop(name);
            state.value = Value::absent(name);
        }
        Action::Full | Action::Id => {}
        Action::Partial(keys) => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let obj = require_object("#partial", &state.value)?.clone();
            let mut projected = Map::new();
            for key in keys {
                if let Some(v) = obj.get(key) {
                    projected.insert(key.clone(), v.clone());
                }
            }
            state.value.data = ValueData::Object(projected);
        }
        Action::First | Action::Last => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let action_name = if matches!(action, Action::First) { "#first" } else { "#last" };
            let items = require_list(action_name, &state.value)?;
            state.value = if items.is_empty() {
                state.value.null_inherit()
            } else if matches!(action, Action::First) {
                items.first().expect("checked non-empty").clone()
            } else {
                items.last().expect("checked non-empty").clone()
            };
        }
        Action::Nth(i) => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let items = require_list("#nth", &state.value)?;
            state.value = match pick_index(items.len(), *i) {
                Some(idx) => items[idx].clone(),
                None => state.value.null_inherit(),
            };
        }
        Action::Extract { path } => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let obj = require_object("!extract", &state.value)?.clone();
            let document = Json::Object(obj);
            let matches: Vec<Json> = path.query(&document).all().into_iter().cloned().collect();
            state.value = match matches.len() {
                0 => state.value.null_inherit(),
                1 => state.value.rewrap(matches.into_iter().next().expect("len == 1")),
                _ => {
                    let items: Vec<Value> = matches.into_iter().map(|m| state.value.rewrap(m)).collect();
                    Value {
                        original_name: state.value.original_name.clone(),
                        actual_name: state.value.actual_name.clone(),
                        original_type: state.value.original_type,
                        actual_type: ActualType::Temp(TempType::List),
                        data: ValueData::List(items),
                    }
                }
            };
        }
        Action::Flatten => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let obj = require_object("!flatten", &state.value)?.clone();
            let parent_actual = state.value.actual_name.clone();
            let items: Vec<Value> = obj
                .iter()
                .map(|(key, raw)| {
                    let mut item = state.value.rewrap(raw.clone());
                    item.actual_name = format!("{parent_actual}_{key}");
                    item
                })
                .collect();
            state.value = Value {
                original_name: state.value.original_name.clone(),
                actual_name: parent_actual,
                original_type: state.value.original_type,
                actual_type: ActualType::Temp(TempType::List),
                data: ValueData::List(items),
            };
        }
        Action::Apply { name: _, f } => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let raw = state.value.to_json();
            let result = f(&raw);
            state.value = wrap_apply_result(&state.value, result)?;
        }
        Action::Lower => {
            if let ValueData::Scalar(morph_core::ScalarPayload::String(s)) = &state.value.data {
                let lowered = s.to_lowercase();
                state.value.data = ValueData::Scalar(morph_core::ScalarPayload::String(lowered));
            }
        }
        Action::Upper => {
            if let ValueData::Scalar(morph_core::ScalarPayload::String(s)) = &state.value.data {
                let uppered = s.to_uppercase();
                state.value.data = ValueData::Scalar(morph_core::ScalarPayload::String(uppered));
            }
        }
        Action::Alias(new_name) => {
            state.value.actual_name = new_name.clone().unwrap_or_else(|| state.value.original_name.clone());
            state.snapshot_temp();
        }
        Action::Prefix(prefix) => {
            let base = base_name(&state.value);
            state.value.actual_name = format!("{prefix}{base}");
            state.snapshot_temp();
        }
        Action::Suffix(suffix) => {
            let base = base_name(&state.value);
            state.value.actual_name = format!("{base}{suffix}");
            state.snapshot_temp();
        }
        Action::Split => {
            if short_circuits(&state.value) {
                return Ok(());
            }
            let items = require_list("@split", &state.value)?.to_vec();
            for (i, item) in items.iter().enumerate() {
                state.temp_fields.insert(format!("{}${}", item.actual_name, i), item.clone());
            }
        }
        Action::Cast(target) => {
            state.value = Caster::cast(&state.value, *target)?;
            state.commit_final();
        }
        Action::SafeCast(target) => {
            state.value = Caster::safe_cast(&state.value, *target);
            state.commit_final();
        }
        Action::DefaultCast(target, default) => {
            state.value = Caster::default_cast(&state.value, *target, default.as_ref());
            state.commit_final();
        }
    }
    Ok(())
}

fn base_name(value: &Value) -> String {
    if value.actual_name.is_empty() {
        value.original_name.clone()
    } else {
        value.actual_name.clone()
    }
}
