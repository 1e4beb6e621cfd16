//! Compiler configuration.
//!
//! A [`CompilerConfig`] names the two delimiter pairs involved in a
//! compilation: the source tags being scanned (`{% ... %}` by default) and
//! the target tags wrapped around every generated fragment (`<% ... %>` by
//! default). Changing them only changes the scanning regex and the
//! substitution wrapper; tag semantics are unaffected.
//!
//! Configuration can be built in code or loaded from YAML/JSON with
//! camelCase keys:
//!
//! ```rust
//! use smarty_tpl::CompilerConfig;
//!
//! let config = CompilerConfig::from_yaml(r#"
//! leftToken: "{{"
//! rightToken: "}}"
//! "#).unwrap();
//!
//! assert_eq!(config.left_token, "{{");
//! assert_eq!(config.tpl_left_token, "<%");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TplError};

/// Default source tag opener.
pub const DEFAULT_LEFT_TOKEN: &str = "{%";
/// Default source tag closer.
pub const DEFAULT_RIGHT_TOKEN: &str = "%}";
/// Default target tag opener.
pub const DEFAULT_TPL_LEFT_TOKEN: &str = "<%";
/// Default target tag closer.
pub const DEFAULT_TPL_RIGHT_TOKEN: &str = "%>";
/// Default prefix for loop metadata properties (`@index` becomes `.__index`).
pub const DEFAULT_META_PREFIX: &str = "__";

/// Delimiters and naming used by the [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Opening delimiter of source tags.
    pub left_token: String,
    /// Closing delimiter of source tags.
    pub right_token: String,
    /// Opening delimiter wrapped around generated fragments.
    pub tpl_left_token: String,
    /// Closing delimiter wrapped around generated fragments.
    pub tpl_right_token: String,
    /// Property prefix that `@` expands to.
    pub meta_prefix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            left_token: DEFAULT_LEFT_TOKEN.to_string(),
            right_token: DEFAULT_RIGHT_TOKEN.to_string(),
            tpl_left_token: DEFAULT_TPL_LEFT_TOKEN.to_string(),
            tpl_right_token: DEFAULT_TPL_RIGHT_TOKEN.to_string(),
            meta_prefix: DEFAULT_META_PREFIX.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source delimiters.
    pub fn source_tokens(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_token = left.into();
        self.right_token = right.into();
        self
    }

    /// Sets the target delimiters.
    pub fn target_tokens(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.tpl_left_token = left.into();
        self.tpl_right_token = right.into();
        self
    }

    /// Sets the prefix `@` expands to.
    pub fn meta_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.meta_prefix = prefix.into();
        self
    }

    /// Parses a configuration from YAML. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a compilation.
    ///
    /// Source delimiters must be non-empty, otherwise the scanner would match
    /// at every position. The meta prefix must be usable as the start of a
    /// property name.
    pub fn validate(&self) -> Result<()> {
        if self.left_token.is_empty() || self.right_token.is_empty() {
            return Err(TplError::InvalidConfig(
                "source delimiters must not be empty".to_string(),
            ));
        }
        let prefix_ok = !self.meta_prefix.is_empty()
            && self
                .meta_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            && !self.meta_prefix.starts_with(|c: char| c.is_ascii_digit());
        if !prefix_ok {
            return Err(TplError::InvalidConfig(format!(
                "meta prefix '{}' is not a valid property name prefix",
                self.meta_prefix
            )));
        }
        if self.tpl_left_token.is_empty() || self.tpl_right_token.is_empty() {
            tracing::warn!("target delimiters are empty; generated fragments will not be delimited");
        }
        Ok(())
    }
}
