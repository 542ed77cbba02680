//! Engine configuration
//!
//! Settings can be built in code with the `with_*` methods or loaded from a
//! TOML file:
//!
//! ```toml
//! namespace = "dht"
//! max_depth = 32
//! pretty_print = true
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Default reserved namespace prefix for directives and reserved attributes
pub const DEFAULT_NAMESPACE: &str = "dht";

/// Default limit for nested `insert-snippet` directives
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration shared by the import pipeline and the production engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnippetsConfig {
    /// Reserved namespace prefix (`dht` makes `dht:snippet`, `dht:if`, ...)
    pub namespace: String,

    /// Maximum nesting of snippet insertions within one production call
    pub max_depth: usize,

    /// Whether produced trees are serialized with indentation
    pub pretty_print: bool,
}

impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            pretty_print: false,
        }
    }
}

impl SnippetsConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the reserved namespace prefix
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the insertion depth limit
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether to pretty-print serialized output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// The reserved namespace as a name matcher
    pub fn vocabulary(&self) -> Namespace {
        Namespace::new(self.namespace.clone())
    }
}

/// Matcher for qualified names in the reserved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the qualified name `prefix:local`
    pub fn qualify(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    /// Strip the prefix from a qualified name, if it belongs to this namespace
    pub fn local_name<'a>(&self, qualified: &'a str) -> Option<&'a str> {
        qualified
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
    }

    /// Check whether `qualified` is `prefix:local`
    pub fn is(&self, qualified: &str, local: &str) -> bool {
        self.local_name(qualified) == Some(local)
    }
}
