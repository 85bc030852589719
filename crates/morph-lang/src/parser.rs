//! Lines of tokens → Instructions: assigns each bare opcode its fixed
//! Category, then fills in the categories a line skips by wrapping
//! forward from the previous line's last category.

use crate::error::ParseError;
use crate::tokens::{Line, Token};

/// The five fixed operation categories, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Input,
    Pointer,
    Transformation,
    Naming,
    Casting,
}

const CATEGORY_ORDER: [Category; 5] = [
    Category::Input,
    Category::Pointer,
    Category::Transformation,
    Category::Naming,
    Category::Casting,
];

impl Category {
    fn index(self) -> usize {
        CATEGORY_ORDER.iter().position(|c| *c == self).expect("category is in CATEGORY_ORDER")
    }

    /// Input and Casting are never auto-filled — they must be written
    /// explicitly (or synthesized by the translator for Casting).
    fn is_fillable(self) -> bool {
        !matches!(self, Category::Input | Category::Casting)
    }
}

/// One parsed verb. `Nth`'s argument stays a raw string here; the
/// translator parses it to an integer when constructing the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    Take,
    Drop,
    Full,
    Partial,
    First,
    Last,
    Nth,
    Id,
    Extract,
    Flatten,
    Apply,
    Lower,
    Upper,
    Alias,
    Prefix,
    Suffix,
    Split,
    Cast,
    SafeCast,
    DefaultCast,
}

impl Opcode {
    fn category(&self) -> Category {
        match self {
            Opcode::Take | Opcode::Drop => Category::Input,
            Opcode::Full | Opcode::Partial | Opcode::First | Opcode::Last | Opcode::Nth => Category::Pointer,
            Opcode::Id | Opcode::Extract | Opcode::Flatten | Opcode::Apply | Opcode::Lower | Opcode::Upper => {
                Category::Transformation
            }
            Opcode::Alias | Opcode::Prefix | Opcode::Suffix | Opcode::Split => Category::Naming,
            Opcode::Cast | Opcode::SafeCast | Opcode::DefaultCast => Category::Casting,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Opcode::Take => "take",
            Opcode::Drop => "drop",
            Opcode::Full => "#full",
            Opcode::Partial => "#partial",
            Opcode::First => "#first",
            Opcode::Last => "#last",
            Opcode::Nth => "#nth",
            Opcode::Id => "!id",
            Opcode::Extract => "!extract",
            Opcode::Flatten => "!flatten",
            Opcode::Apply => "!apply",
            Opcode::Lower => "!lower",
            Opcode::Upper => "!upper",
            Opcode::Alias => "@alias",
            Opcode::Prefix => "@prefix",
            Opcode::Suffix => "@suffix",
            Opcode::Split => "@split",
            Opcode::Cast => "^cast",
            Opcode::SafeCast => "^safe_cast",
            Opcode::DefaultCast => "^default_cast",
        }
    }

    /// Parses the first word of a Part into an opcode, resolving the bare
    /// `#`/`!`/`@`/`^` aliases to their category defaults.
    fn from_literal(literal: &str) -> Option<Opcode> {
        Some(match literal {
            "take" => Opcode::Take,
            "drop" => Opcode::Drop,
            "#" | "#full" => Opcode::Full,
            "#partial" => Opcode::Partial,
            "#first" => Opcode::First,
            "#last" => Opcode::Last,
            "#nth" => Opcode::Nth,
            "!" | "!id" => Opcode::Id,
            "!extract" => Opcode::Extract,
            "!flatten" => Opcode::Flatten,
            "!apply" => Opcode::Apply,
            "!lower" => Opcode::Lower,
            "!upper" => Opcode::Upper,
            "@" | "@alias" => Opcode::Alias,
            "@prefix" => Opcode::Prefix,
            "@suffix" => Opcode::Suffix,
            "@split" => Opcode::Split,
            "^" | "^cast" => Opcode::Cast,
            "^safe_cast" => Opcode::SafeCast,
            "^default_cast" => Opcode::DefaultCast,
            _ => return None,
        })
    }

    /// `(min, max)` argument count, `None` for unbounded.
    fn arg_arity(&self) -> (usize, Option<usize>) {
        match self {
            Opcode::Take | Opcode::Drop => (1, Some(1)),
            Opcode::Full | Opcode::Id | Opcode::Split => (0, Some(0)),
            Opcode::Partial => (1, None),
            Opcode::First | Opcode::Last => (0, Some(0)),
            Opcode::Nth => (1, Some(1)),
            Opcode::Extract => (1, Some(1)),
            Opcode::Flatten => (0, Some(0)),
            Opcode::Apply => (1, Some(1)),
            Opcode::Lower | Opcode::Upper => (0, Some(0)),
            Opcode::Alias | Opcode::Prefix | Opcode::Suffix => (0, Some(1)),
            Opcode::Cast | Opcode::SafeCast => (1, Some(1)),
            Opcode::DefaultCast => (1, Some(2)),
        }
    }
}

/// A single verb with its raw arguments, tagged with the category it was
/// resolved or defaulted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub category: Category,
    pub opcode: Opcode,
    pub args: Vec<String>,
}

/// One recipe line, fully auto-filled: an Operation sequence respecting
/// the canonical category order.
pub type Instruction = Vec<Operation>;

fn default_operation(category: Category) -> Operation {
    let opcode = match category {
        Category::Pointer => Opcode::Full,
        Category::Transformation => Opcode::Id,
        Category::Naming => Opcode::Alias,
        Category::Input | Category::Casting => unreachable!("Input/Casting are never auto-filled"),
    };
    Operation {
        category,
        opcode,
        args: Vec::new(),
    }
}

/// Indices to auto-fill between the previous and current category,
/// wrapping around the five-category order. An Input op (`curr_idx == 0`)
/// never triggers a fill — it is always a line's first token.
fn fill_indices(prev_idx: usize, curr_idx: usize) -> Vec<usize> {
    let mut out = Vec::new();
    if curr_idx == 0 {
        return out;
    }
    if curr_idx > prev_idx {
        out.extend((prev_idx + 1)..curr_idx);
    } else {
        out.extend((prev_idx + 1)..CATEGORY_ORDER.len());
        out.extend(0..curr_idx);
    }
    out
}

pub fn parse(lines: &[Line]) -> Result<Vec<Instruction>, ParseError> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

fn parse_line(line: &Line, line_no: usize) -> Result<Instruction, ParseError> {
    let mut instruction = Instruction::new();
    let mut prev_idx = Category::Input.index();

    for token in line {
        let words = match token {
            Token::Dot => continue,
            Token::Part(words) => words,
        };
        if words.is_empty() {
            return Err(ParseError::EmptyPart { line: line_no });
        }

        let literal = &words[0];
        let opcode = Opcode::from_literal(literal).ok_or_else(|| ParseError::UnknownOpcode {
            line: line_no,
            opcode: literal.clone(),
        })?;
        let args: Vec<String> = words[1..].to_vec();
        check_arity(&opcode, &args, line_no)?;

        let category = opcode.category();
        let curr_idx = category.index();
        for fill_idx in fill_indices(prev_idx, curr_idx) {
            let fill_category = CATEGORY_ORDER[fill_idx];
            if fill_category.is_fillable() {
                instruction.push(default_operation(fill_category));
            }
        }

        instruction.push(Operation { category, opcode, args });
        prev_idx = curr_idx;
    }

    Ok(instruction)
}

fn check_arity(opcode: &Opcode, args: &[String], line_no: usize) -> Result<(), ParseError> {
    let (min, max) = opcode.arg_arity();
    let got = args.len();
    let ok = got >= min && max.map(|m| got <= m).unwrap_or(true);
    if ok {
        return Ok(());
    }
    let expected = match (min, max) {
        (0, Some(0)) => "no arguments",
        (1, Some(1)) => "exactly one argument",
        (1, None) => "at least one argument",
        (0, Some(1)) => "zero or one argument",
        (1, Some(2)) => "one or two arguments",
        _ => "a different number of arguments",
    };
    Err(ParseError::WrongArgCount {
        line: line_no,
        opcode: opcode.name(),
        expected,
        got,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn instruction_of(recipe: &str) -> Instruction {
        let lines = lex(recipe).unwrap();
        parse(&lines).unwrap().remove(0)
    }

    #[test]
    fn explicit_cast_needs_no_fill() {
        let instr = instruction_of("take n . ^cast integer");
        let opcodes: Vec<&Opcode> = instr.iter().map(|op| &op.opcode).collect();
        assert_eq!(opcodes, vec![&Opcode::Take, &Opcode::Cast]);
    }

    #[test]
    fn forward_skip_fills_intermediate_categories() {
        let instr = instruction_of("take code . @alias CODE . ^cast string");
        let opcodes: Vec<&Opcode> = instr.iter().map(|op| &op.opcode).collect();
        assert_eq!(opcodes, vec![&Opcode::Take, &Opcode::Full, &Opcode::Id, &Opcode::Alias, &Opcode::Cast]);
    }

    #[test]
    fn two_pointers_in_a_row_fill_transformation_and_naming() {
        let instr = instruction_of("take n . #first . #last . ^cast integer");
        let opcodes: Vec<&Opcode> = instr.iter().map(|op| &op.opcode).collect();
        assert_eq!(
            opcodes,
            vec![&Opcode::Take, &Opcode::First, &Opcode::Id, &Opcode::Alias, &Opcode::Last, &Opcode::Cast]
        );
    }

    #[test]
    fn unknown_opcode_is_a_parse_error() {
        let lines = lex("take n . #bogus").unwrap();
        assert!(parse(&lines).is_err());
    }

    #[test]
    fn wrong_arity_is_a_parse_error() {
        let lines = lex("take n . #nth 1 2").unwrap();
        assert!(parse(&lines).is_err());
    }

    #[test]
    fn bare_aliases_resolve_to_category_defaults() {
        let instr = instruction_of("take n . # . ! . @ . ^ integer");
        let opcodes: Vec<&Opcode> = instr.iter().map(|op| &op.opcode).collect();
        assert_eq!(opcodes, vec![&Opcode::Take, &Opcode::Full, &Opcode::Id, &Opcode::Alias, &Opcode::Cast]);
    }
}
