//! Moves a register from its source-inferred `TempType` to a requested
//! `FinalType`, with one conversion helper per target type and `chrono`
//! backing the date/time targets.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value as Json;

use crate::error::CastError;
use crate::types::{ActualType, FinalType};
use crate::values::{ScalarPayload, Value, ValueData};

/// Stateless — cast is a pure function of `(value, target)`.
pub struct Caster;

impl Caster {
    /// Strict cast: `^cast` in the recipe grammar. Fails on any value the
    /// target type cannot represent.
    pub fn cast(value: &Value, target: FinalType) -> Result<Value, CastError> {
        if value.is_null() || value.is_absent() {
            return Ok(finalize(value, target, value.data.clone()));
        }

        let data = match target {
            FinalType::String => ValueData::Scalar(ScalarPayload::String(to_string(value, target)?)),
            FinalType::Integer => ValueData::Scalar(ScalarPayload::Int(to_integer(value, target)?)),
            FinalType::Decimal => ValueData::Scalar(ScalarPayload::String(to_decimal(value, target)?)),
            FinalType::Float => ValueData::Scalar(ScalarPayload::Float(to_float(value, target)?)),
            FinalType::Bool => ValueData::Scalar(ScalarPayload::Bool(to_bool(value, target)?)),
            FinalType::Json => ValueData::Scalar(ScalarPayload::String(to_json_text(value, target)?)),
            FinalType::Timestamp => ValueData::Scalar(ScalarPayload::String(
                to_datetime(value, target)?.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )),
            FinalType::Unixtime => {
                ValueData::Scalar(ScalarPayload::Int(to_datetime(value, target)?.timestamp()))
            }
            FinalType::UnixtimeMs => {
                ValueData::Scalar(ScalarPayload::Int(to_datetime(value, target)?.timestamp_millis()))
            }
            FinalType::Date => ValueData::Scalar(ScalarPayload::String(
                to_datetime(value, target)?.format("%Y-%m-%d").to_string(),
            )),
        };
        Ok(finalize(value, target, data))
    }

    /// `^safe_cast`: on failure, the register becomes Null but keeps the
    /// requested `FinalType` as its reported metadata type.
    pub fn safe_cast(value: &Value, target: FinalType) -> Value {
        Self::cast(value, target).unwrap_or_else(|_| finalize(value, target, ValueData::Null))
    }

    /// `^default_cast`: on failure, falls back to a configured default (a
    /// raw JSON literal from the recipe) or a type-appropriate zero value.
    pub fn default_cast(value: &Value, target: FinalType, default: Option<&Json>) -> Value {
        match Self::cast(value, target) {
            Ok(v) => v,
            Err(_) => {
                let raw = default.cloned().unwrap_or_else(|| zero_default(target));
                let defaulted = Value::from_source(&value.actual_name, &raw);
                finalize(value, target, defaulted.data)
            }
        }
    }
}

fn finalize(value: &Value, target: FinalType, data: ValueData) -> Value {
    Value {
        original_name: value.original_name.clone(),
        actual_name: value.actual_name.clone(),
        original_type: value.original_type,
        actual_type: ActualType::Final(target),
        data,
    }
}

fn unrepresentable(value: &Value, target: FinalType) -> CastError {
    CastError::Unrepresentable {
        value: debug_repr(value),
        target,
    }
}

fn not_scalar(value: &Value, target: FinalType) -> CastError {
    CastError::NotScalar {
        kind: value.kind_name(),
        target,
    }
}

fn debug_repr(value: &Value) -> String {
    match &value.data {
        ValueData::Scalar(ScalarPayload::String(s)) => s.clone(),
        ValueData::Scalar(ScalarPayload::Int(i)) => i.to_string(),
        ValueData::Scalar(ScalarPayload::Float(f)) => f.to_string(),
        ValueData::Scalar(ScalarPayload::Bool(b)) => b.to_string(),
        ValueData::List(_) | ValueData::Object(_) | ValueData::Null | ValueData::Absent => {
            value.kind_name().to_string()
        }
    }
}

fn require_scalar<'a>(value: &'a Value, target: FinalType) -> Result<&'a ScalarPayload, CastError> {
    match &value.data {
        ValueData::Scalar(s) => Ok(s),
        _ => Err(not_scalar(value, target)),
    }
}

fn to_string(value: &Value, target: FinalType) -> Result<String, CastError> {
    let scalar = require_scalar(value, target)?;
    Ok(match scalar {
        ScalarPayload::String(s) => s.clone(),
        ScalarPayload::Int(i) => i.to_string(),
        ScalarPayload::Float(f) => f.to_string(),
        ScalarPayload::Bool(b) => b.to_string(),
    })
}

fn to_integer(value: &Value, target: FinalType) -> Result<i64, CastError> {
    let scalar = require_scalar(value, target)?;
    Ok(match scalar {
        ScalarPayload::Int(i) => *i,
        ScalarPayload::Float(f) => f.trunc() as i64,
        ScalarPayload::Bool(b) => i64::from(*b),
        ScalarPayload::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| unrepresentable(value, target))?,
    })
}

fn to_decimal(value: &Value, target: FinalType) -> Result<String, CastError> {
    let scalar = require_scalar(value, target)?;
    Ok(match scalar {
        ScalarPayload::Int(i) => i.to_string(),
        ScalarPayload::Float(f) => {
            if !f.is_finite() {
                return Err(CastError::NonFinite { target });
            }
            f.to_string()
        }
        ScalarPayload::Bool(b) => i64::from(*b).to_string(),
        ScalarPayload::String(s) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| unrepresentable(value, target))?;
            s.trim().to_string()
        }
    })
}

fn to_float(value: &Value, target: FinalType) -> Result<f64, CastError> {
    let scalar = require_scalar(value, target)?;
    let f = match scalar {
        ScalarPayload::Int(i) => *i as f64,
        ScalarPayload::Float(f) => *f,
        ScalarPayload::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        ScalarPayload::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| unrepresentable(value, target))?,
    };
    if !f.is_finite() {
        return Err(CastError::NonFinite { target });
    }
    Ok(f)
}

fn to_bool(value: &Value, target: FinalType) -> Result<bool, CastError> {
    let scalar = require_scalar(value, target)?;
    Ok(match scalar {
        ScalarPayload::Bool(b) => *b,
        ScalarPayload::Int(1) => true,
        ScalarPayload::Int(0) => false,
        ScalarPayload::Int(_) => return Err(unrepresentable(value, target)),
        ScalarPayload::Float(f) if *f == 1.0 => true,
        ScalarPayload::Float(f) if *f == 0.0 => false,
        ScalarPayload::Float(_) => return Err(unrepresentable(value, target)),
        ScalarPayload::String(s) => match s.trim() {
            "true" | "TRUE" => true,
            "false" | "FALSE" => false,
            _ => return Err(unrepresentable(value, target)),
        },
    })
}

fn to_json_text(value: &Value, target: FinalType) -> Result<String, CastError> {
    let json = value.to_json();
    if !is_finite_json(&json) {
        return Err(CastError::NonFinite { target });
    }
    serde_json::to_string(&json).map_err(|_| unrepresentable(value, target))
}

fn is_finite_json(json: &Json) -> bool {
    match json {
        Json::Number(n) => n.as_f64().map(f64::is_finite).unwrap_or(true),
        Json::Array(items) => items.iter().all(is_finite_json),
        Json::Object(map) => map.values().all(is_finite_json),
        _ => true,
    }
}

fn to_datetime(value: &Value, target: FinalType) -> Result<DateTime<Utc>, CastError> {
    let scalar = require_scalar(value, target)?;
    match scalar {
        ScalarPayload::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map_err(|_| ())
                    .and_then(|d| {
                        d.and_hms_opt(0, 0, 0)
                            .map(|dt| Utc.from_utc_datetime(&dt))
                            .ok_or(())
                    })
            })
            .map_err(|_| unrepresentable(value, target)),
        ScalarPayload::Int(i) => Utc
            .timestamp_opt(*i, 0)
            .single()
            .ok_or_else(|| unrepresentable(value, target)),
        ScalarPayload::Float(f) => {
            if !f.is_finite() {
                return Err(CastError::NonFinite { target });
            }
            let secs = f.trunc() as i64;
            let nanos = (f.fract().abs() * 1_000_000_000.0) as u32;
            Utc.timestamp_opt(secs, nanos)
                .single()
                .ok_or_else(|| unrepresentable(value, target))
        }
        ScalarPayload::Bool(_) => Err(not_scalar(value, target)),
    }
}

fn zero_default(target: FinalType) -> Json {
    match target {
        FinalType::String => Json::String(String::new()),
        FinalType::Integer => Json::Number(0.into()),
        FinalType::Decimal | FinalType::Float => {
            Json::Number(serde_json::Number::from_f64(0.0).expect("0.0 is finite"))
        }
        FinalType::Unixtime | FinalType::UnixtimeMs => Json::Number(0.into()),
        FinalType::Json => Json::String("{}".to_string()),
        FinalType::Timestamp | FinalType::Bool | FinalType::Date => Json::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn casts_integer_string_to_integer() {
        let v = Value::from_source("age", &json!("42"));
        let cast = Caster::cast(&v, FinalType::Integer).unwrap();
        assert_eq!(cast.to_json(), json!(42));
        assert_eq!(cast.actual_type, ActualType::Final(FinalType::Integer));
    }

    #[test]
    fn strict_cast_fails_on_non_numeric_string() {
        let v = Value::from_source("age", &json!("not a number"));
        assert!(Caster::cast(&v, FinalType::Integer).is_err());
    }

    #[test]
    fn safe_cast_turns_failure_into_null_with_requested_type() {
        let v = Value::from_source("age", &json!("not a number"));
        let cast = Caster::safe_cast(&v, FinalType::Integer);
        assert!(cast.is_null());
        assert_eq!(cast.actual_type, ActualType::Final(FinalType::Integer));
    }

    #[test]
    fn default_cast_falls_back_to_zero_default() {
        let v = Value::from_source("age", &json!("not a number"));
        let cast = Caster::default_cast(&v, FinalType::Integer, None);
        assert_eq!(cast.to_json(), json!(0));
    }

    #[test]
    fn default_cast_uses_configured_default() {
        let v = Value::from_source("age", &json!("not a number"));
        let fallback = json!(99);
        let cast = Caster::default_cast(&v, FinalType::Integer, Some(&fallback));
        assert_eq!(cast.to_json(), json!(99));
    }

    #[test]
    fn cast_on_null_register_is_identity() {
        let v = Value::from_source("tags", &json!([])).null_inherit();
        let cast = Caster::cast(&v, FinalType::String).unwrap();
        assert!(cast.is_null());
    }

    #[test]
    fn list_cannot_cast_to_string() {
        let v = Value::from_source("tags", &json!(["a", "b"]));
        assert!(matches!(
            Caster::cast(&v, FinalType::String),
            Err(CastError::NotScalar { .. })
        ));
    }

    #[test]
    fn list_casts_to_json_as_serialized_text() {
        let v = Value::from_source("tags", &json!(["a", "b"]));
        let cast = Caster::cast(&v, FinalType::Json).unwrap();
        assert_eq!(cast.to_json(), json!("[\"a\",\"b\"]"));
    }

    #[test]
    fn unixtime_roundtrips_through_timestamp() {
        let v = Value::from_source("seen_at", &json!(1_700_000_000));
        let cast = Caster::cast(&v, FinalType::Unixtime).unwrap();
        assert_eq!(cast.to_json(), json!(1_700_000_000));
    }

    #[test]
    fn timestamp_string_casts_to_date() {
        let v = Value::from_source("seen_at", &json!("2024-01-15T10:30:00Z"));
        let cast = Caster::cast(&v, FinalType::Date).unwrap();
        assert_eq!(cast.to_json(), json!("2024-01-15"));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let v = Value::from_source("ratio", &json!(1));
        let nan = Value {
            data: ValueData::Scalar(ScalarPayload::Float(f64::NAN)),
            ..v
        };
        assert!(matches!(
            Caster::cast(&nan, FinalType::Float),
            Err(CastError::NonFinite { .. })
        ));
    }
}
