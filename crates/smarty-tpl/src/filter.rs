//! Filter registry.
//!
//! A filter is a code generator: it receives the operand as target-syntax
//! source text and returns new source text that applies the filter. Nothing
//! here evaluates data. `{% $title|escape %}` compiles the operand `title`
//! through [`Filter::Escape`] into `title && title.stringify()`.
//!
//! | Filter | Generated fragment |
//! |--------|--------------------|
//! | `escape`, `highlight` | `op && op.stringify()` |
//! | `strpos:needle` | `((op + '').containsSubstring(needle))` |
//! | `count` | `op.length` |
//! | `is_array` | `(typeOf(op) == "object")` |
//! | `isset` | inlined dotted-path existence check |
//! | `empty` | inlined emptiness check |
//! | anything else | `(op)` |
//!
//! The `isset` and `empty` helpers behave like
//! [`runtime::isset`](crate::runtime::isset) and
//! [`runtime::is_empty`](crate::runtime::is_empty).

use once_cell::sync::Lazy;
use regex::Regex;

/// Operands `isset` can walk segment by segment.
static DOTTED_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*(\.[\w$]+)*$").expect("valid regex"));

/// Built-in filters. Unknown names resolve to [`Filter::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Null-guarded stringification.
    Escape,
    /// Same output as `Escape`; highlighting is left to the renderer.
    Highlight,
    /// Substring test against the first argument.
    Strpos,
    /// Length of the operand.
    Count,
    /// Object-type test.
    IsArray,
    /// Dotted-path existence test.
    Isset,
    /// Emptiness test (`0`, `"0"`, `""`, null, undefined).
    Empty,
    /// Identity, parenthesized.
    Default,
}

impl Filter {
    /// All filters with a registered name.
    pub const ALL: [Filter; 8] = [
        Filter::Escape,
        Filter::Highlight,
        Filter::Strpos,
        Filter::Count,
        Filter::IsArray,
        Filter::Isset,
        Filter::Empty,
        Filter::Default,
    ];

    /// Resolves a filter name. Never fails.
    pub fn from_name(name: &str) -> Filter {
        match name.trim() {
            "escape" => Filter::Escape,
            "highlight" => Filter::Highlight,
            "strpos" => Filter::Strpos,
            "count" => Filter::Count,
            "is_array" => Filter::IsArray,
            "isset" => Filter::Isset,
            "empty" => Filter::Empty,
            _ => Filter::Default,
        }
    }

    /// The name this filter is registered under.
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::Escape => "escape",
            Filter::Highlight => "highlight",
            Filter::Strpos => "strpos",
            Filter::Count => "count",
            Filter::IsArray => "is_array",
            Filter::Isset => "isset",
            Filter::Empty => "empty",
            Filter::Default => "default",
        }
    }

    /// Wraps `operand` in the code this filter stands for.
    pub fn apply(self, operand: &str, args: &[&str]) -> String {
        match self {
            Filter::Escape | Filter::Highlight => {
                format!("{operand} && {operand}.stringify()")
            }
            Filter::Strpos => {
                let needle = args.first().copied().unwrap_or("undefined");
                format!("(({operand} + '').containsSubstring({needle}))")
            }
            Filter::Count => format!("{operand}.length"),
            Filter::IsArray => format!("(typeOf({operand}) == \"object\")"),
            Filter::Isset => isset_code(operand),
            Filter::Empty => format!(
                "(function (v) {{ return v === 0 || v === \"0\" || v === \"\" || v === null || v === undefined; }})({operand})"
            ),
            Filter::Default => format!("({operand})"),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Applies the filter registered under `name` (or `default`).
pub fn apply_filter(name: &str, operand: &str, args: &[&str]) -> String {
    Filter::from_name(name).apply(operand, args)
}

/// Builds the inlined `isset` check.
///
/// The first path segment is the root variable; the remaining segments are
/// walked as properties. Any missing or non-object intermediate makes the
/// check return false; the last segment must be an own property of its
/// parent. Operands that are not plain dotted paths fall back to a
/// null/undefined test.
fn isset_code(operand: &str) -> String {
    let operand = operand.trim();
    if !DOTTED_PATH.is_match(operand) {
        return format!("({operand} !== undefined && {operand} !== null)");
    }

    let segments: Vec<&str> = operand.split('.').collect();
    let root = segments[0];
    let path = segments
        .iter()
        .map(|segment| serde_json::Value::String((*segment).to_string()).to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "(function (node, path) {{ \
for (var i = 1; i < path.length; i++) {{ \
if (node === null || node === undefined || typeOf(node) != \"object\") {{ return false; }} \
if (i == path.length - 1) {{ return Object.prototype.hasOwnProperty.call(node, path[i]); }} \
node = node[path[i]]; \
}} \
return node !== null && node !== undefined; \
}})({root}, [{path}])"
    )
}
