//! Compiled-template caching.
//!
//! A template identifier is compiled at most once per cache; entries live as
//! long as the cache and are never evicted. The cache is injected into the
//! [`Engine`](crate::Engine) rather than kept in a global, so tests and
//! independent template sets each get their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;

use crate::error::Result;

/// A compiled template and the identifier it was compiled from.
///
/// Cloning is cheap; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    id: Arc<str>,
    text: Arc<str>,
}

impl CompiledTemplate {
    /// Pairs compiled text with the identifier it was compiled from.
    pub fn new(id: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// The template identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The compiled template text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for CompiledTemplate {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Storage for compiled templates, keyed by template identifier.
pub trait TemplateCache: Send + Sync {
    /// Returns the cached template for `id`, if any.
    fn get(&self, id: &str) -> Option<CompiledTemplate>;

    /// Stores a compiled template under `id`.
    fn put(&self, id: &str, compiled: CompiledTemplate);

    /// Returns the cached template, compiling and storing it on a miss.
    ///
    /// The default implementation is a plain get-then-put and may compile
    /// twice if called concurrently for the same id. Implementations that
    /// are shared across threads should override it.
    ///
    /// `compile` may request other ids from the same cache but must not
    /// request `id` itself; single-flight implementations block on it.
    fn get_or_compile(
        &self,
        id: &str,
        compile: &mut dyn FnMut() -> Result<CompiledTemplate>,
    ) -> Result<CompiledTemplate> {
        if let Some(hit) = self.get(id) {
            return Ok(hit);
        }
        let compiled = compile()?;
        self.put(id, compiled.clone());
        Ok(compiled)
    }
}

type Slot = Arc<OnceCell<CompiledTemplate>>;

/// In-memory cache with single-flight compilation per identifier.
///
/// Each identifier owns a slot that is filled at most once. Concurrent
/// requests for the same identifier wait for the first compilation and then
/// see its result; requests for other identifiers proceed independently.
/// A failed compilation leaves the slot empty, so the next request retries.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    /// Returns `true` if no template has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &str) -> Slot {
        Arc::clone(self.lock().entry(id.to_string()).or_default())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // Slots are only ever inserted whole, so a poisoned map is intact.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TemplateCache for MemoryCache {
    fn get(&self, id: &str) -> Option<CompiledTemplate> {
        self.lock().get(id).and_then(|slot| slot.get().cloned())
    }

    fn put(&self, id: &str, compiled: CompiledTemplate) {
        self.lock()
            .insert(id.to_string(), Arc::new(OnceCell::with_value(compiled)));
    }

    fn get_or_compile(
        &self,
        id: &str,
        compile: &mut dyn FnMut() -> Result<CompiledTemplate>,
    ) -> Result<CompiledTemplate> {
        // The map lock is released before compiling; only this id's slot
        // is held while `compile` runs.
        let slot = self.slot(id);
        slot.get_or_try_init(|| compile()).cloned()
    }
}

/// A cache that stores nothing; every request compiles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl TemplateCache for NoCache {
    fn get(&self, _id: &str) -> Option<CompiledTemplate> {
        None
    }

    fn put(&self, _id: &str, _compiled: CompiledTemplate) {}
}
