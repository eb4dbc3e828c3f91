//! `model[:version]` selectors

use std::fmt;

/// A model name with an optional version, as typed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub model: String,
    pub version: Option<String>,
}

impl ModelSpec {
    /// Parse `name` or `name:version`
    ///
    /// Splits on the first `:`. An empty version (`"llama3:"`) counts as no
    /// version.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((model, version)) if !version.is_empty() => Self {
                model: model.to_string(),
                version: Some(version.to_string()),
            },
            Some((model, _)) => Self {
                model: model.to_string(),
                version: None,
            },
            None => Self {
                model: spec.to_string(),
                version: None,
            },
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}", self.model, version),
            None => write!(f, "{}", self.model),
        }
    }
}
