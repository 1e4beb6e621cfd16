//! Expression compilation.
//!
//! Expressions are never parsed into a tree. An expression is either a pipe
//! chain (`operand|filter:arg|filter`) or contains direct calls
//! (`filter(operand, arg)`), and compiling it threads the operand text
//! through each filter's code generator in turn:
//!
//! ```text
//! list|escape|count      ->  list && list.stringify().length
//! count(list) > 0        ->  list.length > 0
//! ```
//!
//! Because every step is plain text substitution, adding a filter only
//! requires teaching [`Filter`](crate::Filter) how to wrap a string.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::filter::apply_filter;
use crate::util::{
    map_unquoted, quoted_spans, split_at_unquoted_whitespace, split_pipes, split_top_level,
};

/// Opening of `name(args)`, with a possibly empty name; an empty name is a
/// plain group.
static CALL_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9_]*)\s*\(").expect("valid regex"));

/// Word operators accepted in conditions and the symbols they stand for.
const OPERATORS: [(&str, &str); 12] = [
    ("eq", "=="),
    ("neq", "!="),
    ("ne", "!="),
    ("gte", ">="),
    ("ge", ">="),
    ("lte", "<="),
    ("le", "<="),
    ("gt", ">"),
    ("lt", "<"),
    ("and", "&&"),
    ("or", "||"),
    ("not", "!"),
];

static WORD_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    let words: Vec<&str> = OPERATORS.iter().map(|(word, _)| *word).collect();
    Regex::new(&format!(r"\b({})\b", words.join("|"))).expect("valid regex")
});

/// Compiles an expression into target-syntax code.
///
/// ```rust
/// use smarty_tpl::compile_expression;
///
/// assert_eq!(compile_expression("a|count"), "a.length");
/// assert_eq!(compile_expression("a|default"), "(a)");
/// assert_eq!(compile_expression("strpos(title, 'x')"), "((title + '').containsSubstring('x'))");
/// ```
pub fn compile_expression(expr: &str) -> String {
    let segments = split_pipes(expr);
    let (operand, filters) = match segments.split_first() {
        Some((operand, filters)) => (*operand, filters),
        None => return String::new(),
    };

    if let Some(code) = rewrite_calls(operand) {
        return code;
    }

    filters
        .iter()
        .fold(operand.to_string(), |operand, spec| apply_spec(&operand, spec))
}

/// Replaces every `name(args)` that starts outside a quoted literal.
///
/// Arguments run to the first `)` outside a literal, so they may contain
/// quoted parentheses. Returns `None` when the operand has no call.
fn rewrite_calls(operand: &str) -> Option<String> {
    let literals = quoted_spans(operand);
    let in_literal = |at: usize| literals.iter().any(|literal| literal.contains(&at));

    let mut out = String::with_capacity(operand.len());
    let mut copied = 0;
    let mut search = 0;
    let mut found = false;

    while let Some(caps) = CALL_OPEN.captures_at(operand, search) {
        let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if let Some(literal) = literals.iter().find(|l| l.contains(&open.start())) {
            search = literal.end;
            continue;
        }
        let args_start = open.end();
        let Some(close) = operand[args_start..]
            .char_indices()
            .map(|(i, c)| (args_start + i, c))
            .find(|&(i, c)| c == ')' && !in_literal(i))
            .map(|(i, _)| i)
        else {
            break;
        };

        let args = split_top_level(&operand[args_start..close], ',');
        let (first, rest) = match args.split_first() {
            Some((first, rest)) => (*first, rest),
            None => ("", &[][..]),
        };
        out.push_str(&operand[copied..open.start()]);
        out.push_str(&apply_filter(name.as_str(), first, rest));
        copied = close + 1;
        search = copied;
        found = true;
    }

    if !found {
        return None;
    }
    out.push_str(&operand[copied..]);
    Some(out)
}

/// Applies one `name:arg:arg` filter spec.
///
/// Anything after the first unquoted whitespace is not part of the filter
/// and is appended to its output, so `items|count > 0` compiles to
/// `items.length > 0`.
fn apply_spec(operand: &str, spec: &str) -> String {
    let (head, tail) = split_at_unquoted_whitespace(spec);
    let parts = split_top_level(head, ':');
    let (name, args) = match parts.split_first() {
        Some((name, args)) => (*name, args),
        None => ("", &[][..]),
    };
    let mut code = apply_filter(name, operand, args);
    code.push_str(tail);
    code
}

/// Rewrites word operators (`eq`, `and`, `not`, ...) to their symbols.
///
/// Only whole words outside quoted literals are rewritten.
pub fn rewrite_operators(expr: &str) -> String {
    map_unquoted(expr, |run| {
        WORD_OPERATOR
            .replace_all(run, |caps: &Captures<'_>| symbol_for(&caps[1]).to_string())
            .into_owned()
    })
}

fn symbol_for(word: &str) -> &str {
    OPERATORS
        .iter()
        .find(|(candidate, _)| *candidate == word)
        .map_or(word, |(_, symbol)| symbol)
}
