//! Compile-once, render-many template engine.
//!
//! The [`Engine`] ties three collaborators together:
//!
//! - a [`TemplateSource`] that loads source text by identifier,
//! - a [`TemplateCache`] that keeps each compiled template,
//! - a [`Renderer`] supplied per call that evaluates compiled text with data.
//!
//! Evaluating target-syntax code is outside this crate; a renderer is
//! whatever understands the `<% %>` dialect the compiler emits.
//!
//! ```rust
//! use serde_json::{json, Value};
//! use smarty_tpl::{Engine, InlineSource, MemoryCache, Result, TemplateDescriptor};
//!
//! let source = InlineSource::new().add("greeting", "Hi {% $name %}");
//! let engine = Engine::new(source, MemoryCache::new());
//!
//! fn echo(tpl: &TemplateDescriptor<'_>, _data: &Value) -> Result<String> {
//!     Ok(tpl.tpl.to_string())
//! }
//!
//! let out = engine.format("greeting", &json!({"name": "Ann"}), &echo).unwrap();
//! assert_eq!(out, "Hi <%=name.stringify()%>");
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CompiledTemplate, MemoryCache, TemplateCache};
use crate::compiler::Compiler;
use crate::config::CompilerConfig;
use crate::error::{Result, TplError};

/// Loads template source text by identifier.
pub trait TemplateSource: Send + Sync {
    /// Returns the source text of template `id`.
    fn load(&self, id: &str) -> Result<String>;
}

/// Templates held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    templates: HashMap<String, String>,
}

impl InlineSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, builder style.
    pub fn add(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(id, source);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(id.into(), source.into());
    }

    /// Returns `true` if a template is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }
}

impl TemplateSource for InlineSource {
    fn load(&self, id: &str) -> Result<String> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| TplError::TemplateNotFound(id.to_string()))
    }
}

/// What a renderer receives: the template identifier and compiled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDescriptor<'a> {
    /// Template identifier.
    pub id: &'a str,
    /// Compiled template text.
    pub tpl: &'a str,
}

/// Evaluates compiled template text against data.
pub trait Renderer {
    /// Renders the compiled template with `data`.
    fn render(&self, template: &TemplateDescriptor<'_>, data: &Value) -> Result<String>;
}

impl<F> Renderer for F
where
    F: Fn(&TemplateDescriptor<'_>, &Value) -> Result<String>,
{
    fn render(&self, template: &TemplateDescriptor<'_>, data: &Value) -> Result<String> {
        self(template, data)
    }
}

/// Compiles templates on first use and hands them to a renderer.
pub struct Engine<S, C = MemoryCache> {
    compiler: Compiler,
    source: S,
    cache: C,
}

impl<S: TemplateSource, C: TemplateCache> Engine<S, C> {
    /// Creates an engine with the default delimiters.
    pub fn new(source: S, cache: C) -> Self {
        Self {
            compiler: Compiler::default(),
            source,
            cache,
        }
    }

    /// Creates an engine with custom delimiters.
    pub fn with_config(config: CompilerConfig, source: S, cache: C) -> Result<Self> {
        Ok(Self {
            compiler: Compiler::new(config)?,
            source,
            cache,
        })
    }

    /// The compiler templates are compiled with.
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// The cache compiled templates are kept in.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the compiled template for `id`, compiling it on first use.
    pub fn compiled(&self, id: &str) -> Result<CompiledTemplate> {
        self.cache.get_or_compile(id, &mut || {
            debug!(id, "compiling template");
            let source = self.source.load(id)?;
            Ok(CompiledTemplate::new(id, self.compiler.compile(&source)))
        })
    }

    /// Renders template `id` with `data`.
    ///
    /// The data is converted to JSON before it reaches the renderer.
    pub fn format<T, R>(&self, id: &str, data: &T, renderer: &R) -> Result<String>
    where
        T: Serialize + ?Sized,
        R: Renderer + ?Sized,
    {
        let compiled = self.compiled(id)?;
        let data = serde_json::to_value(data)?;
        let descriptor = TemplateDescriptor {
            id: compiled.id(),
            tpl: compiled.as_str(),
        };
        renderer.render(&descriptor, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        inner: InlineSource,
        loads: Arc<AtomicUsize>,
    }

    impl TemplateSource for CountingSource {
        fn load(&self, id: &str) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(id)
        }
    }

    fn counting(id: &str, text: &str) -> (CountingSource, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: InlineSource::new().add(id, text),
            loads: Arc::clone(&loads),
        };
        (source, loads)
    }

    fn echo(tpl: &TemplateDescriptor<'_>, data: &Value) -> Result<String> {
        Ok(format!("{}|{}|{}", tpl.id, tpl.tpl, data))
    }

    #[test]
    fn test_inline_source_missing() {
        let source = InlineSource::new();
        assert!(!source.contains("nope"));
        assert!(matches!(
            source.load("nope"),
            Err(TplError::TemplateNotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_inline_source_insert_replaces() {
        let mut source = InlineSource::new().add("t", "old");
        assert!(source.contains("t"));
        source.insert("t", "new");
        assert_eq!(source.load("t").unwrap(), "new");
    }

    #[test]
    fn test_format_passes_compiled_text_and_data() {
        let engine = Engine::new(
            InlineSource::new().add("t", "{% $a %}"),
            MemoryCache::new(),
        );
        let out = engine.format("t", &json!({"a": 1}), &echo).unwrap();
        assert_eq!(out, r#"t|<%=a.stringify()%>|{"a":1}"#);
    }

    #[test]
    fn test_compiles_once_per_id() {
        let (source, loads) = counting("t", "{% if $a %}x{% / %}");
        let engine = Engine::new(source, MemoryCache::new());
        for _ in 0..3 {
            engine.format("t", &json!({}), &echo).unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_no_cache_recompiles() {
        let (source, loads) = counting("t", "x");
        let engine = Engine::new(source, NoCache);
        engine.compiled("t").unwrap();
        engine.compiled("t").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_template_propagates() {
        let engine = Engine::new(InlineSource::new(), MemoryCache::new());
        let err = engine.format("gone", &json!({}), &echo).unwrap_err();
        assert!(matches!(err, TplError::TemplateNotFound(_)));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_renderer_error_propagates() {
        let engine = Engine::new(InlineSource::new().add("t", "x"), MemoryCache::new());
        fn failing(_: &TemplateDescriptor<'_>, _: &Value) -> Result<String> {
            Err(TplError::Render("boom".to_string()))
        }
        let err = engine.format("t", &json!(null), &failing).unwrap_err();
        assert_eq!(err.to_string(), "render error: boom");
    }

    #[test]
    fn test_with_config_custom_tokens() {
        let config = CompilerConfig::new().source_tokens("[[", "]]");
        let engine =
            Engine::with_config(config, InlineSource::new().add("t", "[[ $a ]]"), NoCache)
                .unwrap();
        assert_eq!(engine.compiler().config().left_token, "[[");
        assert_eq!(engine.compiled("t").unwrap().as_str(), "<%=a.stringify()%>");
    }

    #[test]
    fn test_format_serializes_structs() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
        }
        let engine = Engine::new(InlineSource::new().add("t", "x"), NoCache);
        let out = engine.format("t", &Row { id: 4 }, &echo).unwrap();
        assert_eq!(out, r#"t|x|{"id":4}"#);
    }
}
