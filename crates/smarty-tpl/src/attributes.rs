//! `key=value` attribute parsing for tag bodies.
//!
//! Tags such as `foreach`, `section` and `assign` take their arguments as
//! whitespace-separated `name=value` pairs:
//!
//! ```text
//! {% foreach from=$list item=row key=i %}
//! {% assign var="total" value=$a.b %}
//! ```
//!
//! Values may not contain whitespace, and there is no escaping of `=`.
//! A token without `=` is recorded with no value; callers decide what a
//! missing attribute means.

use std::collections::HashMap;

use crate::sigil::strip_dollars;
use crate::util::strip_quotes;

/// Attributes parsed from a tag body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: HashMap<String, Option<String>>,
}

impl Attributes {
    /// Returns the value of `name` with `$` sigils removed.
    ///
    /// `None` both when the attribute is absent and when it was written
    /// without a value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|value| value.as_deref())
    }

    /// Like [`get`](Self::get), with one pair of surrounding quotes removed.
    ///
    /// Used for positions that name a variable (`item="row"` and `item=row`
    /// both mean the variable `row`).
    pub fn ident(&self, name: &str) -> Option<&str> {
        self.get(name).map(strip_quotes)
    }

    /// Returns `true` if the attribute key appeared, with or without value.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no attributes were parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over keys and (possibly absent) values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }
}

/// Parses a `key=value key2=value2` body.
///
/// Each whitespace-separated token is split on its first `=`. Later tokens
/// with the same key overwrite earlier ones.
///
/// ```rust
/// use smarty_tpl::parse_attributes;
///
/// let attrs = parse_attributes("item=$row from=$list");
/// assert_eq!(attrs.get("item"), Some("row"));
/// assert_eq!(attrs.get("from"), Some("list"));
/// ```
pub fn parse_attributes(body: &str) -> Attributes {
    let mut entries = HashMap::new();
    for token in body.split_whitespace() {
        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, Some(strip_dollars(value))),
            None => (token, None),
        };
        entries.insert(key.to_string(), value);
    }
    Attributes { entries }
}
