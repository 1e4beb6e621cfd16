//! The compiler driver.
//!
//! [`Compiler::compile`] rewrites a whole template in three steps:
//!
//! 1. `{% strip %}...{% /strip %}` regions are replaced by their content.
//! 2. Every `{% body %}` tag is located by [`Compiler::scan`], which returns
//!    explicit [`TagMatch`] values (span and trimmed body).
//! 3. Each body is classified into an [`Identifier`] plus expression by
//!    [`Compiler::classify`], compiled by the identifier's handler, and
//!    spliced back between the target delimiters.
//!
//! Literal text between tags is copied through untouched, so the output has
//! the same shape as the input with each tag replaced by one fragment.
//!
//! # Classification
//!
//! A body whose first word is one of the
//! [`KEYWORDS`](crate::handler::KEYWORDS) uses that keyword; the remaining
//! words form the expression (`else if x` is read as `elseif x`).
//! Any other body is classified by shape, first match wins:
//!
//! | Shape | Identifier |
//! |-------|------------|
//! | only `$ . | ( )` and alphanumerics | `print` (`break` when the body is exactly `break`) |
//! | starts with `/` | `end` |
//! | contains `=` | `calc` |
//! | anything else | `print` |
//!
//! Sigils are normalized once per tag, before the handler runs.
//!
//! # Example
//!
//! ```rust
//! use smarty_tpl::Compiler;
//!
//! let compiler = Compiler::default();
//! let compiled = compiler.compile("Hello {% if $name %}{% print $name %}{% / %}");
//! assert_eq!(compiled, "Hello <%if (name) { %><%=name.stringify()%><% }%>");
//! ```

use std::borrow::Cow;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::config::CompilerConfig;
use crate::error::{Result, TplError};
use crate::handler::Identifier;
use crate::sigil::normalize_sigils;

/// Bodies that read as a bare output expression.
static OUTPUT_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[$.A-Za-z0-9|()]+$").expect("valid regex"));

/// A tag located in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch<'a> {
    /// Byte range of the whole tag, delimiters included.
    pub range: Range<usize>,
    /// Text between the delimiters, trimmed.
    pub body: &'a str,
}

/// A tag body resolved to its handler and expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub identifier: Identifier,
    /// Sigil-normalized expression handed to the handler.
    pub expression: String,
}

/// Compiles source templates into target templates.
///
/// A compiler is immutable once built and can be shared freely.
#[derive(Debug, Clone)]
pub struct Compiler {
    config: CompilerConfig,
    tag: Regex,
    strip: Regex,
}

impl Compiler {
    /// Builds a compiler for the given delimiters.
    pub fn new(config: CompilerConfig) -> Result<Self> {
        config.validate()?;
        let left = regex::escape(&config.left_token);
        let right = regex::escape(&config.right_token);

        let tag = Regex::new(&format!(r"{left}\s*(.*?)\s*{right}"))
            .map_err(|e| TplError::InvalidConfig(e.to_string()))?;
        let strip = Regex::new(&format!(
            r"(?s){left}\s*strip\s*{right}(.*?){left}\s*/strip\s*{right}"
        ))
        .map_err(|e| TplError::InvalidConfig(e.to_string()))?;

        Ok(Self { config, tag, strip })
    }

    /// The configuration this compiler was built with.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles a template.
    ///
    /// Never fails. Unbalanced control tags are not detected and produce
    /// unbalanced target code.
    pub fn compile(&self, source: &str) -> String {
        let source = self.strip_blocks(source);
        let tags = self.scan(&source);

        let mut out = String::with_capacity(source.len() + tags.len() * 16);
        let mut last = 0;
        for tag in &tags {
            out.push_str(&source[last..tag.range.start]);
            out.push_str(&self.wrap(&self.compile_tag(tag.body)));
            last = tag.range.end;
        }
        out.push_str(&source[last..]);

        debug!(tags = tags.len(), bytes = out.len(), "compiled template");
        out
    }

    /// Replaces every `strip` block with its inner content.
    pub fn strip_blocks<'a>(&self, source: &'a str) -> Cow<'a, str> {
        self.strip.replace_all(source, "$1")
    }

    /// Locates all tags, left to right.
    pub fn scan<'a>(&self, source: &'a str) -> Vec<TagMatch<'a>> {
        self.tag
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let body = caps.get(1).map_or("", |m| m.as_str().trim());
                Some(TagMatch {
                    range: whole.range(),
                    body,
                })
            })
            .collect()
    }

    /// Resolves a tag body to an identifier and normalized expression.
    pub fn classify(&self, body: &str) -> Classified {
        let body = body.trim();
        let mut words = body.split_whitespace();
        let first = words.next().unwrap_or("");

        let (identifier, expression) = match Identifier::from_keyword(first) {
            Some(keyword) => {
                let rest: Vec<&str> = words.collect();
                match (keyword, rest.split_first()) {
                    (Identifier::Else, Some((&"if", condition))) => {
                        (Identifier::ElseIf, condition.join(" "))
                    }
                    _ => (keyword, rest.join(" ")),
                }
            }
            None if OUTPUT_EXPRESSION.is_match(body) => {
                if body == "break" {
                    (Identifier::Break, body.to_string())
                } else {
                    (Identifier::Print, body.to_string())
                }
            }
            None if body.starts_with('/') => (Identifier::End, "}".to_string()),
            None if body.contains('=') => (Identifier::Calc, body.to_string()),
            None => (Identifier::Print, body.to_string()),
        };

        Classified {
            identifier,
            expression: normalize_sigils(&expression, &self.config.meta_prefix),
        }
    }

    /// Compiles one tag body into its fragment, without delimiters.
    pub fn compile_tag(&self, body: &str) -> String {
        let Classified {
            identifier,
            expression,
        } = self.classify(body);
        trace!(body, %identifier, "classified tag");
        identifier.handle(&expression, &self.config)
    }

    /// Wraps a fragment in the target delimiters.
    ///
    /// When a fragment's edge would merge with a target delimiter into a
    /// source delimiter (`if (a) {` + `%>` reads `{%`), a space is put
    /// between them so the output never contains source tags it did not
    /// already carry.
    fn wrap(&self, fragment: &str) -> String {
        let CompilerConfig {
            tpl_left_token: open,
            tpl_right_token: close,
            ..
        } = &self.config;
        let inner = self.source_tokens_in(fragment);
        let pad_open = self.source_tokens_in(&format!("{open}{fragment}")) > inner;
        let pad_close = self.source_tokens_in(&format!("{fragment}{close}")) > inner;

        let mut out = String::with_capacity(open.len() + fragment.len() + close.len() + 2);
        out.push_str(open);
        if pad_open {
            out.push(' ');
        }
        out.push_str(fragment);
        if pad_close {
            out.push(' ');
        }
        out.push_str(close);
        out
    }

    fn source_tokens_in(&self, text: &str) -> usize {
        text.matches(self.config.left_token.as_str()).count()
            + text.matches(self.config.right_token.as_str()).count()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default()).expect("default configuration is valid")
    }
}
