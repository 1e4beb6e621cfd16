//! Error types for the smarty-tpl crate.
//!
//! Compiling a template never fails: malformed tags degrade into whatever
//! fragment their handler produces. Errors only come from the edges of the
//! pipeline, i.e. loading configuration, looking up template sources and
//! calling the external renderer.

use thiserror::Error;

/// Errors raised around (never inside) template compilation.
#[derive(Debug, Error)]
pub enum TplError {
    /// The compiler configuration is unusable (e.g. an empty delimiter).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No template source is registered under the requested identifier.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The downstream renderer rejected the compiled template or the data.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration could not be read as YAML.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration or render data could not be converted.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for smarty-tpl operations.
pub type Result<T> = std::result::Result<T, TplError>;
