//! # Configuration Template Protocol
//!
//! The narrow interface between compiled schemas and the configuration
//! layer that merges layered sources. The configuration layer never sees
//! schema keywords; it only asks a node to validate a candidate value,
//! for its default, and whether it must be present.
//!
//! ## Invariants
//!
//! Implementations are pure: validating the same value twice yields the
//! same result, and validation never mutates the template. The trait
//! requires `Send + Sync` so one compiled tree can serve concurrent loads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// A value accepted by a template, after coercion (integral floats become
/// integers, missing optional properties are filled from defaults).
pub type ValidatedValue = Value;

/// Whether a node must be present in its parent mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Absence is a validation failure.
    #[default]
    Required,
    /// Absence is allowed; the default, if any, stands in.
    Optional,
}

/// A compiled template node as seen by the configuration layer.
pub trait ConfigTemplate: Send + Sync {
    /// Validate and coerce a candidate value.
    fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError>;

    /// Literal default attached by the schema's `default` keyword.
    fn default_value(&self) -> Option<&Value>;

    /// Required/optional status within the parent mapping.
    fn presence(&self) -> Presence;

    /// Shorthand for `presence() == Presence::Required`.
    fn is_required(&self) -> bool {
        self.presence() == Presence::Required
    }

    /// Shorthand for `validate(value).is_ok()`.
    fn accepts(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}
