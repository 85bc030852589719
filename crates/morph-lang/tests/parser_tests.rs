use morph_lang::{lex, parse, Category};

fn categories_of(recipe: &str) -> Vec<Category> {
    let lines = lex(recipe).unwrap();
    let instructions = parse(&lines).unwrap();
    instructions[0].iter().map(|op| op.category).collect()
}

fn is_non_decreasing_until_wrap(categories: &[Category]) -> bool {
    // Input appears at most once, Casting appears at most once, and the
    // categories between them never repeat Input or Casting.
    let input_count = categories.iter().filter(|c| matches!(c, Category::Input)).count();
    let casting_count = categories.iter().filter(|c| matches!(c, Category::Casting)).count();
    input_count <= 1 && casting_count <= 1
}

#[test]
fn category_order_invariant_holds_after_fill() {
    let cases = [
        "take n . ^cast integer",
        "take code . !upper . @alias CODE . ^cast string",
        "take tags . !apply process_tags . @split",
        "take n . #first . #last . ^cast integer",
    ];
    for recipe in cases {
        let categories = categories_of(recipe);
        assert!(is_non_decreasing_until_wrap(&categories), "recipe {recipe:?} violated category cardinality");
    }
}

#[test]
fn input_is_the_first_category_when_present() {
    let categories = categories_of("take n . ^cast integer");
    assert_eq!(categories.first(), Some(&Category::Input));
}

#[test]
fn casting_is_the_last_category_when_present() {
    let categories = categories_of("take code . !upper . @alias CODE . ^cast string");
    assert_eq!(categories.last(), Some(&Category::Casting));
}
