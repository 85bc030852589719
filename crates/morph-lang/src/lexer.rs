//! Turns recipe text into lines of [`Token`]s: split by newline, drop
//! comments and blanks, splice tab-continuations into the previous line,
//! then split each line on the literal ` . ` separator.

use crate::error::LexError;
use crate::tokens::{Line, Token};

/// Lexes a full recipe body into its constituent lines.
pub fn lex(text: &str) -> Result<Vec<Line>, LexError> {
    let mut lines: Vec<Line> = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        if raw.trim_start().starts_with("--") {
            continue;
        }

        let tokens = tokenize_line(raw);

        if raw.starts_with('\t') {
            let mut previous = lines
                .pop()
                .ok_or(LexError::DanglingContinuation { line: line_no })?;
            if !matches!(previous.last(), Some(Token::Dot)) {
                previous.push(Token::Dot);
            }
            previous.extend(tokens);
            lines.push(previous);
        } else {
            lines.push(tokens);
        }
    }

    Ok(lines)
}

/// Splits one physical line into alternating `Part`/`Dot` tokens on the
/// literal ` . ` separator. Consecutive separators (empty parts) are
/// skipped, as the original does.
fn tokenize_line(raw: &str) -> Line {
    let mut tokens = Line::new();
    for piece in raw.split(" . ") {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        let words: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
        tokens.push(Token::Part(words));
        tokens.push(Token::Dot);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_part_line_ends_with_a_trailing_dot() {
        let lines = lex("take n . ^cast integer").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].last(), Some(&Token::Dot));
    }

    #[test]
    fn blank_and_comment_lines_are_discarded() {
        let lines = lex("take n . ^cast integer\n\n-- a comment\n   \n").unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn tab_continuation_merges_into_previous_line() {
        let lines = lex("take tags . !apply process_tags . @split\n\t!upper . @prefix TAG_").unwrap();
        assert_eq!(lines.len(), 1);
        let words: Vec<&[String]> = lines[0].iter().filter_map(Token::as_part).collect();
        assert_eq!(words.len(), 5);
        assert_eq!(words[3], ["!upper".to_string()]);
    }

    #[test]
    fn dangling_continuation_is_an_error() {
        assert!(lex("\t!upper").is_err());
    }

    #[test]
    fn consecutive_separators_skip_empty_parts() {
        let lines = lex("take n .  . ^cast integer").unwrap();
        let words: Vec<&[String]> = lines[0].iter().filter_map(Token::as_part).collect();
        assert_eq!(words.len(), 2);
    }
}
