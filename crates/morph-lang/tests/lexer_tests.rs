use morph_lang::{lex, Token};

#[test]
fn comments_and_blank_lines_do_not_affect_token_count() {
    let with_noise = lex(
        "-- header comment\n\ntake n . ^cast integer\n\n-- trailing comment",
    )
    .unwrap();
    let without_noise = lex("take n . ^cast integer").unwrap();
    assert_eq!(with_noise, without_noise);
}

#[test]
fn tab_continuation_matches_single_line_equivalent() {
    let continued = lex("take tags . !apply process_tags . @split\n\t!upper . @prefix TAG_").unwrap();
    let single_line = lex("take tags . !apply process_tags . @split . !upper . @prefix TAG_").unwrap();
    assert_eq!(continued, single_line);
}

#[test]
fn every_line_ends_on_a_dot_token() {
    let lines = lex("take n . ^cast integer\ntake m . ^cast string").unwrap();
    for line in &lines {
        assert_eq!(line.last(), Some(&Token::Dot));
    }
}
