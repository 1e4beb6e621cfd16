//! Property-based tests for the compiler using proptest.

use proptest::prelude::*;
use serde_json::{Map, Value};
use smarty_tpl::runtime::isset;
use smarty_tpl::Compiler;

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    If { has_else: bool },
    Loop,
}

/// Builds a well-nested template from a list of choices.
///
/// Choices that would be invalid at the current nesting (an `else` outside
/// an `if`, a close with nothing open) emit a print tag instead. Every block
/// still open at the end is closed.
fn nested_template(choices: &[(u8, String)]) -> String {
    let mut stack: Vec<Block> = Vec::new();
    let mut out = String::new();

    for (choice, var) in choices {
        let tag = match (choice % 7, stack.last().copied()) {
            (0, _) => {
                stack.push(Block::If { has_else: false });
                format!("{{% if ${var} gt 1 %}}")
            }
            (1, _) => {
                stack.push(Block::Loop);
                format!("{{% foreach ${var} as $item %}}")
            }
            (2, _) => {
                stack.push(Block::Loop);
                format!("{{% section name=i loop=${var} %}}")
            }
            (3, Some(Block::If { has_else: false })) => format!("{{% elseif ${var}|empty %}}"),
            (4, Some(Block::If { has_else: false })) => {
                stack.pop();
                stack.push(Block::If { has_else: true });
                "{% else %}".to_string()
            }
            (5, Some(_)) => {
                stack.pop();
                "{% / %}".to_string()
            }
            _ => format!("{{% ${var}|count %}}"),
        };
        out.push_str(&tag);
        out.push_str(var);
    }
    for _ in stack {
        out.push_str("{% / %}");
    }
    out
}

fn braces(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn choices() -> impl Strategy<Value = Vec<(u8, String)>> {
    prop::collection::vec((any::<u8>(), identifier()), 0..40)
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Balanced control tags compile to balanced braces.
    #[test]
    fn balanced_tags_give_balanced_braces(choices in choices()) {
        let out = Compiler::default().compile(&nested_template(&choices));
        prop_assert_eq!(braces(&out), 0);
    }

    /// Compiled output holds no source tags, so compiling again is a no-op.
    #[test]
    fn compile_is_idempotent(choices in choices()) {
        let compiler = Compiler::default();
        let once = compiler.compile(&nested_template(&choices));
        let twice = compiler.compile(&once);
        prop_assert_eq!(once, twice);
    }

    /// Text without delimiters passes through unchanged.
    #[test]
    fn literal_text_is_preserved(text in "[a-zA-Z0-9 <>/.,=\n]{0,60}") {
        prop_assert_eq!(Compiler::default().compile(&text), text);
    }

    /// A `$` sigil never reaches the output.
    #[test]
    fn dollar_sigils_are_stripped(var in identifier(), field in identifier()) {
        let out = Compiler::default().compile(&format!("{{% ${var}.{field} %}}"));
        prop_assert!(!out.contains('$'));
        prop_assert_eq!(out, format!("<%={var}.{field}.stringify()%>"));
    }

    /// Every tag is replaced by exactly one target tag.
    #[test]
    fn one_fragment_per_tag(vars in prop::collection::vec(identifier(), 0..20)) {
        let source: String = vars.iter().map(|v| format!("{{% ${v} %}}-")).collect();
        let out = Compiler::default().compile(&source);
        prop_assert_eq!(out.matches("<%").count(), vars.len());
        prop_assert_eq!(out.matches("%>").count(), vars.len());
    }

    /// `isset` finds every key actually present below the root.
    #[test]
    fn isset_finds_present_keys(
        keys in prop::collection::vec(identifier(), 1..6),
        lookup in identifier(),
    ) {
        let mut map = Map::new();
        for key in &keys {
            map.insert(key.clone(), Value::Null);
        }
        let root = Value::Object(map);

        for key in &keys {
            let path = format!("root.{key}");
            prop_assert!(isset(&root, &path));
        }
        let lookup_path = format!("root.{lookup}");
        prop_assert_eq!(isset(&root, &lookup_path), keys.contains(&lookup));
    }
}
