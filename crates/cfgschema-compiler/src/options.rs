//! # Compile Options
//!
//! Knobs that change how a schema compiles. Options are plain data with
//! serde derives so a host application can keep them next to the rest of
//! its configuration, in YAML or JSON.
//!
//! ```yaml
//! pattern_properties: all_matches
//! unknown_formats: reject
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// How `patternProperties` applies to keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternPropertiesMode {
    /// Only keys not listed in `properties` are matched, and only the first
    /// matching pattern (in schema order) validates the value.
    #[default]
    FirstMatch,
    /// Every matching pattern validates every matching key, declared or not.
    AllMatches,
}

/// What to do with a `format` value outside the supported set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFormatPolicy {
    /// Treat the format as an annotation and log a warning.
    #[default]
    Ignore,
    /// Fail compilation with an unsupported-feature error.
    Reject,
}

/// Options accepted by [`compile_with_options`](crate::compile_with_options).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// `patternProperties` matching mode.
    pub pattern_properties: PatternPropertiesMode,
    /// Unknown `format` handling.
    pub unknown_formats: UnknownFormatPolicy,
}

/// Options document could not be parsed.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// YAML syntax or shape error.
    #[error("invalid compile options (yaml): {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON shape error.
    #[error("invalid compile options (json): {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileOptions {
    /// Parse options from a YAML document. Missing fields take defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self, OptionsError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse options from an already-loaded JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self, OptionsError> {
        Ok(Self::deserialize(value)?)
    }

    #[must_use]
    pub fn with_pattern_properties(mut self, mode: PatternPropertiesMode) -> Self {
        self.pattern_properties = mode;
        self
    }

    #[must_use]
    pub fn with_unknown_formats(mut self, policy: UnknownFormatPolicy) -> Self {
        self.unknown_formats = policy;
        self
    }
}
