//! Backend configuration and the reserved container keys derived from it

/// Prefix used when none is configured
pub const DEFAULT_PREFIX: &str = "@";

/// Deepest element nesting accepted when reading or building a tree
pub const MAX_DEPTH: usize = 256;

/// Configuration for the XML backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Prefix of the reserved keys holding attributes, text and children
    pub prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Create a config with a custom key prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn keys(&self) -> SpecialKeys {
        SpecialKeys::new(&self.prefix)
    }
}

/// The three reserved keys of a node's container representation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialKeys {
    pub attrs: String,
    pub text: String,
    pub children: String,
}

impl SpecialKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            attrs: format!("{prefix}attrs"),
            text: format!("{prefix}text"),
            children: format!("{prefix}children"),
        }
    }
}

impl Default for SpecialKeys {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
