//! Recipe translation and the `morph()` executor: lowers parsed
//! Instructions into a flat Action list, then runs that list against an
//! input document to produce an output document and its field metadata.

use serde_json::{Map, Value as Json};
use serde_json_path::JsonPath;

use morph_core::types::FinalType;
use morph_core::Caster;
use morph_lang::{Instruction, Opcode, Operation};

use crate::actions::{self, Action};
use crate::error::{MorphError, TranslationError};
use crate::registry;
use crate::state::MorphState;

/// How source fields the recipe never explicitly touches are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFieldsStrategy {
    /// Untouched fields never reach `final_fields`.
    AutoDrop,
    /// Untouched fields get a synthesized `take NAME . #full . !id . @alias . ^cast <type>`.
    AutoFinalize,
}

impl Default for SourceFieldsStrategy {
    fn default() -> Self {
        SourceFieldsStrategy::AutoDrop
    }
}

/// Recipe options — the embedding API's `options` argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct MorphOptions {
    pub source_fields_strategy: SourceFieldsStrategy,
    pub with_source_fields_timestamp_cast: bool,
}

/// A translated, immutable recipe — ready to run against any number of
/// input documents.
pub struct Recipe {
    actions: Vec<Action>,
    options: MorphOptions,
}

impl Recipe {
    /// Lowers parsed Instructions into a flat Action list. Fails if an
    /// opcode's arguments don't resolve: an unknown `!apply` function, an
    /// unparseable `#nth` index, an invalid `!extract` JSONPath, or an
    /// unknown `^cast` target type.
    pub fn translate(instructions: &[Instruction], options: MorphOptions) -> Result<Recipe, TranslationError> {
        let mut actions = Vec::new();
        for instruction in instructions {
            for operation in instruction {
                actions.push(build_action(operation)?);
            }
        }
        log::debug!(
            "translated {} instruction(s) into {} action(s)",
            instructions.len(),
            actions.len()
        );
        Ok(Recipe { actions, options })
    }

    /// Runs the recipe against `input`, returning the output document,
    /// its per-field metadata, and the final `MorphState`.
    pub fn morph(&self, input: &Map<String, Json>) -> Result<(Map<String, Json>, Map<String, Json>, MorphState), MorphError> {
        let mut state = MorphState::from_input(input);

        let mut default_actions: Vec<Action> = Vec::new();
        if self.options.source_fields_strategy == SourceFieldsStrategy::AutoFinalize {
            for name in input.keys() {
                default_actions.extend(default_instruction_actions(
                    &state,
                    name,
                    self.options.with_source_fields_timestamp_cast,
                ));
            }
            log::trace!("AUTO_FINALIZE synthesized {} action(s)", default_actions.len());
        }

        for action in &default_actions {
            actions::run(action, &mut state)?;
        }
        for action in &self.actions {
            actions::run(action, &mut state)?;
        }

        let (output, metadata) = state.to_output();
        log::debug!("morph produced {} final field(s)", output.len());
        Ok((output, metadata, state))
    }
}

fn default_instruction_actions(state: &MorphState, name: &str, with_timestamp_cast: bool) -> Vec<Action> {
    let source_value = match state.source_fields.get(name) {
        Some(v) => v,
        None => return Vec::new(),
    };
    let mut final_type = source_value.original_type.default_final_type();
    if with_timestamp_cast
        && source_value.original_type == morph_core::TempType::String
        && Caster::cast(source_value, FinalType::Timestamp).is_ok()
    {
        final_type = FinalType::Timestamp;
    }
    vec![
        Action::Take(name.to_string()),
        Action::Full,
        Action::Id,
        Action::Alias(None),
        Action::Cast(final_type),
    ]
}

fn build_action(op: &Operation) -> Result<Action, TranslationError> {
    Ok(match &op.opcode {
        Opcode::Take => Action::Take(op.args[0].clone()),
        Opcode::Drop => Action::Drop(op.args[0].clone()),
        Opcode::Full => Action::Full,
        Opcode::Partial => Action::Partial(op.args.clone()),
        Opcode::First => Action::First,
        Opcode::Last => Action::Last,
        Opcode::Nth => {
            let raw = &op.args[0];
            let i: i64 = raw.parse().map_err(|_| TranslationError::InvalidNthArgument { raw: raw.clone() })?;
            Action::Nth(i)
        }
        Opcode::Id => Action::Id,
        Opcode::Extract => {
            let raw = op.args[0].clone();
            let path = JsonPath::parse(&raw).map_err(|e| TranslationError::InvalidJsonPath {
                path: raw.clone(),
                reason: e.to_string(),
            })?;
            Action::Extract { path }
        }
        Opcode::Flatten => Action::Flatten,
        Opcode::Apply => {
            let name = op.args[0].clone();
            let f = registry::lookup(&name).ok_or_else(|| TranslationError::UnknownFunction { name: name.clone() })?;
            Action::Apply { name, f }
        }
        Opcode::Lower => Action::Lower,
        Opcode::Upper => Action::Upper,
        Opcode::Alias => Action::Alias(op.args.first().cloned()),
        Opcode::Prefix => Action::Prefix(op.args.first().cloned().unwrap_or_default()),
        Opcode::Suffix => Action::Suffix(op.args.first().cloned().unwrap_or_default()),
        Opcode::Split => Action::Split,
        Opcode::Cast => Action::Cast(parse_final_type(&op.args[0])?),
        Opcode::SafeCast => Action::SafeCast(parse_final_type(&op.args[0])?),
        Opcode::DefaultCast => {
            let target = parse_final_type(&op.args[0])?;
            let default = op.args.get(1).map(|raw| parse_default_literal(raw));
            Action::DefaultCast(target, default)
        }
    })
}

fn parse_final_type(raw: &str) -> Result<FinalType, TranslationError> {
    FinalType::from_literal(raw).ok_or_else(|| TranslationError::UnknownFinalType { raw: raw.to_string() })
}

fn parse_default_literal(raw: &str) -> Json {
    serde_json::from_str(raw).unwrap_or_else(|_| Json::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_lang::{lex, parse};
    use serde_json::json;

    fn recipe(text: &str, options: MorphOptions) -> Recipe {
        let lines = lex(text).unwrap();
        let instructions = parse(&lines).unwrap();
        Recipe::translate(&instructions, options).unwrap()
    }

    #[test]
    fn s1_identity_cast_to_integer() {
        let r = recipe("take n . ^cast integer", MorphOptions::default());
        let input = serde_json::from_value::<Map<String, Json>>(json!({"n": 5})).unwrap();
        let (output, metadata, _state) = r.morph(&input).unwrap();
        assert_eq!(output.get("n"), Some(&json!(5)));
        assert_eq!(metadata["n"]["type"], json!("INTEGER"));
        assert_eq!(metadata["n"]["from_field_type"], json!("INTEGER"));
    }

    #[test]
    fn s2_rename_and_uppercase() {
        let r = recipe("take code . !upper . @alias CODE . ^cast string", MorphOptions::default());
        let input = serde_json::from_value::<Map<String, Json>>(json!({"code": "abc"})).unwrap();
        let (output, _metadata, _state) = r.morph(&input).unwrap();
        assert_eq!(output.get("CODE"), Some(&json!("ABC")));
    }

    #[test]
    fn s3_extract_and_safe_cast() {
        let r = recipe("take user . !extract $.age . ^safe_cast integer", MorphOptions::default());
        let input = serde_json::from_value::<Map<String, Json>>(json!({"user": {"age": "forty"}})).unwrap();
        let (output, _metadata, _state) = r.morph(&input).unwrap();
        assert_eq!(output.get("user"), Some(&Json::Null));
    }

    #[test]
    fn s4_flatten_and_prefix() {
        let r = recipe("take geo . !flatten . @prefix g_ . ^cast json", MorphOptions::default());
        let input = serde_json::from_value::<Map<String, Json>>(json!({"geo": {"lat": 1, "lon": 2}})).unwrap();
        let (output, _metadata, _state) = r.morph(&input).unwrap();
        assert!(output.contains_key("g_geo"));
        assert!(output["g_geo"].is_string());
    }

    #[test]
    fn s5_split_then_take_by_base_name() {
        registry::clear();
        registry::register_function("process_tags", |v: &Json| {
            let items = v.as_array().cloned().unwrap_or_default();
            let head = items.first().cloned().unwrap_or(Json::Null);
            json!([head, items.len()])
        });
        let r = recipe(
            "take tags . !apply process_tags . @split\n\ttake tags . !upper . @alias t . ^cast string",
            MorphOptions::default(),
        );
        let input = serde_json::from_value::<Map<String, Json>>(json!({"tags": ["A", "B"]})).unwrap();
        let (output, _metadata, _state) = r.morph(&input).unwrap();
        assert_eq!(output.get("t"), Some(&json!("A")));
        registry::clear();
    }

    #[test]
    fn s6_auto_finalize_timestamp_upgrade() {
        let options = MorphOptions {
            source_fields_strategy: SourceFieldsStrategy::AutoFinalize,
            with_source_fields_timestamp_cast: true,
        };
        let r = recipe("", options);
        let input =
            serde_json::from_value::<Map<String, Json>>(json!({"created": "2024-05-01T10:00:00Z", "n": 3}))
                .unwrap();
        let (output, metadata, _state) = r.morph(&input).unwrap();
        assert_eq!(output.get("n"), Some(&json!(3)));
        assert_eq!(metadata["created"]["type"], json!("TIMESTAMP"));
        assert_eq!(metadata["n"]["type"], json!("INTEGER"));
    }
}
