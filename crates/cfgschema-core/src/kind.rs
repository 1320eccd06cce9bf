//! # Node and Constraint Kinds
//!
//! Closed enums naming combinators, constraints and conditional branches.
//! Every `match` on them is exhaustive, so adding a kind forces every
//! consumer (compiler, validator, error rendering) to handle it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean composition of sub-schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinatorKind {
    /// `allOf`: every branch must accept.
    All,
    /// `anyOf`: at least one branch must accept.
    Any,
    /// `oneOf`: exactly one branch must accept.
    One,
    /// `not`: the single branch must reject.
    Not,
}

impl CombinatorKind {
    /// The schema keyword for this combinator.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::All => "allOf",
            Self::Any => "anyOf",
            Self::One => "oneOf",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for CombinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Named constraint predicates attached to scalar, sequence and mapping
/// templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// `minLength` / `maxLength`.
    Length,
    /// `pattern`.
    Pattern,
    /// `format`.
    Format,
    /// `minimum` / `maximum` / `exclusiveMinimum` / `exclusiveMaximum`.
    Range,
    /// `multipleOf`.
    MultipleOf,
    /// `minItems` / `maxItems`.
    ItemCount,
    /// `uniqueItems`.
    UniqueItems,
    /// `contains` / `minContains` / `maxContains`.
    Contains,
    /// `minProperties` / `maxProperties`.
    PropertyCount,
    /// `const` / `enum`.
    Membership,
}

impl ConstraintKind {
    /// Short stable name, used in logs and error rendering.
    pub fn name(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Pattern => "pattern",
            Self::Format => "format",
            Self::Range => "range",
            Self::MultipleOf => "multipleOf",
            Self::ItemCount => "itemCount",
            Self::UniqueItems => "uniqueItems",
            Self::Contains => "contains",
            Self::PropertyCount => "propertyCount",
            Self::Membership => "membership",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Branch of an `if`/`then`/`else` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalBranch {
    /// Taken when `if` accepts the value.
    Then,
    /// Taken when `if` rejects the value.
    Else,
}

impl fmt::Display for ConditionalBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Then => f.write_str("then"),
            Self::Else => f.write_str("else"),
        }
    }
}
