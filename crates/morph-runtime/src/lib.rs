//! Morph Runtime — recipe translation and the `morph()` executor.
//!
//! Wires [`morph_lang`]'s parsed Instructions to runnable [`Action`]s,
//! threads a [`MorphState`] through them, and exposes the embedding
//! surface: [`register_function`], [`Recipe::translate`], and
//! [`Recipe::morph`].
#![warn(clippy::all)]

pub mod actions;
pub mod error;
pub mod recipe;
pub mod registry;
pub mod state;

pub use actions::Action;
pub use error::{MorphError, RuntimeError, TranslationError, TypeError};
pub use recipe::{MorphOptions, Recipe, SourceFieldsStrategy};
pub use registry::register_function;
pub use state::MorphState;

use morph_lang::{lex, parse};
use serde_json::{Map, Value as Json};

/// Compiles recipe text straight into a translated [`Recipe`] — lexes,
/// parses, then translates in one call. Call this once and reuse the
/// returned `Recipe` across many input documents.
pub fn compile(recipe_text: &str, options: MorphOptions) -> Result<Recipe, MorphError> {
    let lines = lex(recipe_text)?;
    let instructions = parse(&lines)?;
    Ok(Recipe::translate(&instructions, options)?)
}

/// `morph(source, recipe, options)`: compiles `recipe_text` and runs it
/// against `source` in one call.
pub fn morph(
    source: &Map<String, Json>,
    recipe_text: &str,
    options: MorphOptions,
) -> Result<(Map<String, Json>, Map<String, Json>, MorphState), MorphError> {
    let recipe = compile(recipe_text, options)?;
    recipe.morph(source)
}
