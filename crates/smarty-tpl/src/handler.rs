//! Tag handlers.
//!
//! Each [`Identifier`] has one code generator that turns the tag's
//! expression (already sigil-normalized by the driver) into a fragment of
//! target syntax. Handlers do not track nesting: `end` always emits `}` and
//! it is up to the template author to balance opening and closing tags.
//!
//! | Tag | Fragment |
//! |-----|----------|
//! | `{% if a eq 1 %}` | `if (a == 1) {` |
//! | `{% elseif b %}` | `} else if (b) {` |
//! | `{% else %}` | `} else {` |
//! | `{% / %}` | `}` |
//! | `{% assign var="x" value=1 %}` | `var x = 1;` |
//! | `{% n = n + 1 %}` | `n = n + 1;` |
//! | `{% print $a %}` | `=a.stringify()` |
//! | `{% section name=i loop=$rows %}` | `for (var i = 0; i < rows.length; i++) {` |
//! | `{% foreach $rows as $row %}` | counting loop with metadata, see [`foreach`] |

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::attributes::parse_attributes;
use crate::config::CompilerConfig;
use crate::expression::{compile_expression, rewrite_operators};

/// `<collection> as <target>`
static FOREACH_AS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+as\s+(.+)$").expect("valid regex"));

/// `<key> ==> <item>`, also accepting `=>`.
static KEY_VALUE_ARROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*==?>\s*").expect("valid regex"));

/// Expressions `print` can suffix with `.stringify()` without parentheses.
static SIMPLE_OPERAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w$.\[\]]+$").expect("valid regex"));

/// Substituted for attributes a tag requires but does not provide.
const MISSING: &str = "undefined";

/// Keywords recognized as the first token of a tag body.
pub const KEYWORDS: [&str; 8] = [
    "if", "elseif", "else", "foreach", "section", "assign", "calc", "print",
];

/// The construct a tag compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identifier {
    If,
    ElseIf,
    Else,
    End,
    Foreach,
    Section,
    Assign,
    Calc,
    Print,
    /// Loop early exit, passed through as-is.
    Break,
}

impl Identifier {
    /// Resolves a leading keyword. Only words in [`KEYWORDS`] resolve.
    pub fn from_keyword(word: &str) -> Option<Identifier> {
        match word {
            "if" => Some(Identifier::If),
            "elseif" => Some(Identifier::ElseIf),
            "else" => Some(Identifier::Else),
            "foreach" => Some(Identifier::Foreach),
            "section" => Some(Identifier::Section),
            "assign" => Some(Identifier::Assign),
            "calc" => Some(Identifier::Calc),
            "print" => Some(Identifier::Print),
            _ => None,
        }
    }

    /// The tag's keyword, or `end`/`break` for the shorthand tags.
    pub fn as_str(self) -> &'static str {
        match self {
            Identifier::If => "if",
            Identifier::ElseIf => "elseif",
            Identifier::Else => "else",
            Identifier::End => "end",
            Identifier::Foreach => "foreach",
            Identifier::Section => "section",
            Identifier::Assign => "assign",
            Identifier::Calc => "calc",
            Identifier::Print => "print",
            Identifier::Break => "break",
        }
    }

    /// Generates the target fragment for this tag.
    pub fn handle(self, expr: &str, config: &CompilerConfig) -> String {
        match self {
            Identifier::If => format!("if ({}) {{", condition(expr)),
            Identifier::ElseIf => format!("}} else if ({}) {{", condition(expr)),
            Identifier::Else => "} else {".to_string(),
            Identifier::End => "}".to_string(),
            Identifier::Foreach => foreach(expr, &config.meta_prefix),
            Identifier::Section => section(expr),
            Identifier::Assign => assign(expr),
            Identifier::Calc => format!("{};", compile_expression(expr)),
            Identifier::Print => print(expr),
            Identifier::Break => "break;".to_string(),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn condition(expr: &str) -> String {
    compile_expression(&rewrite_operators(expr))
}

fn print(expr: &str) -> String {
    let code = compile_expression(expr);
    if code.is_empty() {
        String::new()
    } else if SIMPLE_OPERAND.is_match(&code) {
        format!("={code}.stringify()")
    } else {
        format!("=({code}).stringify()")
    }
}

fn assign(expr: &str) -> String {
    let attrs = parse_attributes(expr);
    let var = required(attrs.ident("var"), "assign", "var");
    let value = required(attrs.get("value"), "assign", "value");
    format!("var {var} = {value};")
}

fn section(expr: &str) -> String {
    let attrs = parse_attributes(expr);
    let name = required(attrs.ident("name"), "section", "name");
    let loop_over = required(attrs.ident("loop"), "section", "loop");
    format!("for (var {name} = 0; {name} < {loop_over}.length; {name}++) {{")
}

/// Loop variables of a `foreach` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeachSpec {
    pub from: String,
    pub item: String,
    pub key: Option<String>,
}

/// Reads either `<from> as <item>` / `<from> as <key> ==> <item>` or
/// `from=<from> item=<item> [key=<key>]`.
pub fn parse_foreach(expr: &str) -> ForeachSpec {
    if let Some(caps) = FOREACH_AS.captures(expr) {
        let from = caps.get(1).map_or(MISSING, |m| m.as_str().trim());
        let target = caps.get(2).map_or("", |m| m.as_str().trim());
        let mut sides = KEY_VALUE_ARROW.splitn(target, 2);
        let first = sides.next().unwrap_or(MISSING).to_string();
        let (item, key) = match sides.next() {
            Some(item) => (item.to_string(), Some(first)),
            None => (first, None),
        };
        return ForeachSpec {
            from: from.to_string(),
            item,
            key,
        };
    }

    let attrs = parse_attributes(expr);
    ForeachSpec {
        from: required(attrs.ident("from"), "foreach", "from").to_string(),
        item: required(attrs.ident("item"), "foreach", "item").to_string(),
        key: attrs.ident("key").map(str::to_string),
    }
}

/// Generates a `foreach` loop.
///
/// Every iteration advances `<item>Index`, rebinds `<item>` to the current
/// element, boxes scalars into an object whose `toString`/`valueOf` return
/// the original value, and attaches the index plus the collection's first
/// and last elements under the meta prefix. A key variable, if given,
/// counts alongside the index.
pub fn foreach(expr: &str, meta_prefix: &str) -> String {
    let ForeachSpec { from, item, key } = parse_foreach(expr);
    let index = format!("{item}Index");
    let (key_init, key_step) = match key.as_deref() {
        Some(key) => (format!(", {key} = 0"), format!(", {key}++")),
        None => (String::new(), String::new()),
    };

    format!(
        "for (let {index} = 0{key_init}, {item}; {index} < {from}.length; {index}++{key_step}) {{ \
{item} = {from}[{index}]; \
if (typeOf({item}) != \"object\" || {item} === null) {{ \
{item} = (function (value) {{ return {{ toString: function () {{ return String(value); }}, valueOf: function () {{ return value; }} }}; }})({item}); \
}} \
{item}.{meta_prefix}index = {index}; \
{item}.{meta_prefix}first = {from}[0]; \
{item}.{meta_prefix}last = {from}[{from}.length - 1];"
    )
}

fn required<'a>(value: Option<&'a str>, tag: &str, attr: &str) -> &'a str {
    match value {
        Some(value) => value,
        None => {
            warn!(tag, attr, "missing attribute, substituting undefined");
            MISSING
        }
    }
}
