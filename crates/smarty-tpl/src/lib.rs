//! # smarty-tpl - Smarty-style Template Tag Compiler
//!
//! `smarty-tpl` rewrites templates written with Smarty-like `{% ... %}` tags
//! into templates for an embedded-code engine that uses `<% ... %>` tags.
//! Compilation is purely textual: every tag is located, classified and
//! replaced by a code fragment, and all literal text is copied through.
//!
//! ## Core Concepts
//!
//! - [`Compiler`]: locates tags and drives compilation for one delimiter set
//! - [`CompilerConfig`]: source/target delimiters and the metadata prefix
//! - [`Identifier`]: the closed set of tag kinds, each with its handler
//! - [`Filter`]: the closed set of pipe filters, with a pass-through fallback
//! - [`Engine`]: compile-once, render-many wrapper over a [`TemplateCache`]
//!
//! ## Quick Start
//!
//! ```rust
//! use smarty_tpl::Compiler;
//!
//! let compiler = Compiler::default();
//! let out = compiler.compile("{% if $rows|count gt 0 %}{% $rows|count %} rows{% / %}");
//! assert_eq!(out, "<%if (rows.length > 0) { %><%=rows.length.stringify()%> rows<% }%>");
//! ```
//!
//! ## Tag Syntax
//!
//! | Source | Compiled |
//! |--------|----------|
//! | `{% $a %}`, `{% print $a %}` | `<%=a.stringify()%>` |
//! | `{% if $a eq 1 %}` | `<%if (a == 1) { %>` |
//! | `{% else %}`, `{% elseif $b %}` | `<% } else { %>`, `<% } else if (b) { %>` |
//! | `{% / %}`, `{% /if %}` | `<% }%>` |
//! | `{% foreach $rows as $k => $row %}` | counting loop with `row@index`, `row@first`, `row@last` |
//! | `{% section name=i loop=$rows %}` | `<%for (var i = 0; i < rows.length; i++) { %>` |
//! | `{% assign var="x" value=1 %}` | `<%var x = 1;%>` |
//! | `{% $n = $n + 1 %}` | `<%n = n + 1;%>` |
//! | `{% strip %}...{% /strip %}` | the content, unchanged |
//!
//! Variables may carry a `$` sigil, which is dropped. `@name` reads loop
//! metadata and becomes `.__name` with the default prefix.
//!
//! ## Filters
//!
//! Filters are applied with pipes (`$title|escape`) or as calls
//! (`count($rows)`). Unknown filter names fall back to `default`, which
//! wraps the operand in parentheses. See [`Filter`] for the generated code.
//!
//! ## Configuration
//!
//! ```rust
//! use smarty_tpl::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig::from_yaml("leftToken: '[['\nrightToken: ']]'\n").unwrap();
//! let compiler = Compiler::new(config).unwrap();
//! assert_eq!(compiler.compile("[[ $a ]]"), "<%=a.stringify()%>");
//! ```

mod attributes;
pub mod cache;
mod compiler;
mod config;
pub mod engine;
mod error;
mod expression;
mod filter;
mod handler;
pub mod runtime;
mod sigil;
mod util;

// Error type
pub use error::{Result, TplError};

// Configuration
pub use config::{
    CompilerConfig, DEFAULT_LEFT_TOKEN, DEFAULT_META_PREFIX, DEFAULT_RIGHT_TOKEN,
    DEFAULT_TPL_LEFT_TOKEN, DEFAULT_TPL_RIGHT_TOKEN,
};

// Driver
pub use compiler::{Classified, Compiler, TagMatch};

// Tag handlers and their building blocks
pub use attributes::{parse_attributes, Attributes};
pub use expression::{compile_expression, rewrite_operators};
pub use filter::{apply_filter, Filter};
pub use handler::{foreach, parse_foreach, ForeachSpec, Identifier, KEYWORDS};
pub use sigil::{normalize_sigils, strip_dollars};

// Caching and rendering
pub use cache::{CompiledTemplate, MemoryCache, NoCache, TemplateCache};
pub use engine::{Engine, InlineSource, Renderer, TemplateDescriptor, TemplateSource};
