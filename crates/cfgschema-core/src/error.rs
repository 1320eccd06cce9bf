//! # Error Types — Compile-Time and Validation-Time Failures
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Compile-time errors halt the whole compilation. Every variant names
//!   the schema location (a `#/...` pointer) where the problem was found.
//! - Validation errors name the instance path of the offending value and
//!   the constraint kind that rejected it.
//! - Combinator failures aggregate every branch failure instead of
//!   surfacing only the first one.
//! - A reference cycle compiles to a deferred node. Following that node
//!   back to itself without descending into a child value is reported at
//!   validation time as a [`CycleError`].

use std::fmt;

use thiserror::Error;

use crate::json::JsonType;
use crate::kind::{CombinatorKind, ConditionalBranch, ConstraintKind};
use crate::path::{InstancePath, PathSegment};

/// Top-level error returned by schema compilation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The schema is malformed or self-contradictory.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A recognized but unimplemented feature was used in strict mode.
    #[error("unsupported feature: {0}")]
    Unsupported(#[from] UnsupportedFeatureError),
}

/// Malformed or self-contradictory schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A value in schema position is neither an object nor a boolean.
    #[error("{at}: expected a schema (object or boolean), found {found}")]
    NotASchema {
        /// Schema location.
        at: String,
        /// JSON type actually found.
        found: JsonType,
    },

    /// A keyword carries a value of the wrong shape.
    #[error("{at}: keyword '{keyword}' must be {expected}")]
    InvalidKeyword {
        /// Schema location of the keyword.
        at: String,
        /// Keyword name.
        keyword: String,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },

    /// `type` names something outside the JSON Schema type set.
    #[error("{at}: unknown type name '{name}'")]
    UnknownType {
        /// Schema location of the `type` keyword.
        at: String,
        /// The offending type name.
        name: String,
    },

    /// A `pattern` or `patternProperties` key is not a valid regex.
    #[error("{at}: invalid regular expression '{pattern}': {reason}")]
    InvalidPattern {
        /// Schema location.
        at: String,
        /// The pattern source.
        pattern: String,
        /// Regex engine diagnostic.
        reason: String,
    },

    /// Constraints on one node that no value can satisfy.
    #[error("{at}: contradictory constraints: {detail}")]
    Contradiction {
        /// Schema location.
        at: String,
        /// What contradicts what.
        detail: String,
    },

    /// `$ref` points to another document.
    #[error("{at}: reference '{reference}' leaves this document; only '#' fragments are supported")]
    ExternalReference {
        /// Schema location of the `$ref`.
        at: String,
        /// The reference string.
        reference: String,
    },

    /// `$ref` fragment is not a JSON pointer (e.g. a plain-name anchor).
    #[error("{at}: reference '{reference}' is not a JSON pointer fragment")]
    InvalidPointer {
        /// Schema location of the `$ref`.
        at: String,
        /// The reference string.
        reference: String,
    },

    /// `$ref` names a location that does not exist.
    #[error("{at}: reference '{reference}' does not resolve: {reason}")]
    UnresolvedReference {
        /// Schema location of the `$ref`.
        at: String,
        /// The reference string.
        reference: String,
        /// Which segment failed and why.
        reason: String,
    },
}

/// A deferred reference followed back to itself without consuming any
/// part of the value; the resolution never terminates in a concrete node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{pointer}' is reached again without descending into the value (chain: {})", .chain.join(" -> "))]
pub struct CycleError {
    /// The pointer reached twice.
    pub pointer: String,
    /// Deferred pointers followed since the last descent, ending with the
    /// repeated one.
    pub chain: Vec<String>,
}

/// A keyword recognized by JSON Schema but not implemented here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{at}: '{keyword}: {value}' is not supported")]
pub struct UnsupportedFeatureError {
    /// Schema location of the keyword.
    pub at: String,
    /// Keyword name.
    pub keyword: String,
    /// Keyword value.
    pub value: String,
}

/// A value rejected by a compiled template.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    /// Location of the offending value, outermost segment first.
    pub path: InstancePath,
    /// What went wrong.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Create an error at the root of the validated value.
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            path: InstancePath::root(),
            kind,
        }
    }

    /// Type mismatch between the template and the value.
    pub fn type_mismatch(expected: impl Into<String>, found: JsonType) -> Self {
        Self::new(ValidationErrorKind::TypeMismatch {
            expected: expected.into(),
            found,
        })
    }

    /// A named constraint rejected the value.
    pub fn constraint(constraint: ConstraintKind, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::Constraint {
            constraint,
            message: message.into(),
        })
    }

    /// Prefix the path with the segment of the enclosing container.
    ///
    /// Errors are raised at the innermost node and wrapped on the way out,
    /// so each container adds its own segment in front.
    #[must_use]
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.push_front(segment);
        self
    }

    /// The constraint kind, if a constraint rejected the value.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match &self.kind {
            ValidationErrorKind::Constraint { constraint, .. } => Some(*constraint),
            _ => None,
        }
    }
}

/// Categories of validation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// Value has the wrong JSON type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type description.
        expected: String,
        /// JSON type of the value.
        found: JsonType,
    },

    /// A constraint predicate rejected the value.
    #[error("{message}")]
    Constraint {
        /// Which constraint.
        constraint: ConstraintKind,
        /// Human-readable reason.
        message: String,
    },

    /// A required property is absent.
    #[error("missing required property '{name}'")]
    MissingProperty {
        /// Property name.
        name: String,
    },

    /// Properties outside `properties`/`patternProperties` with
    /// `additionalProperties: false`.
    #[error("additional properties not allowed: {}", .names.join(", "))]
    AdditionalProperties {
        /// Offending keys, sorted.
        names: Vec<String>,
    },

    /// Array element beyond the positional prefix with `items: false`.
    #[error("item {index} not allowed: only {prefix_len} positional items are permitted")]
    ItemNotAllowed {
        /// Index of the first offending element.
        index: usize,
        /// Number of positional templates.
        prefix_len: usize,
    },

    /// `dependentRequired` trigger present without its dependencies.
    #[error("property '{trigger}' requires properties: {}", .missing.join(", "))]
    DependentRequired {
        /// Trigger property.
        trigger: String,
        /// Missing dependencies, sorted.
        missing: Vec<String>,
    },

    /// `dependentSchemas` sub-schema rejected the object.
    #[error("dependent schema for property '{trigger}': {inner}")]
    DependentSchema {
        /// Trigger property.
        trigger: String,
        /// Failure reported by the dependent schema.
        inner: Box<ValidationError>,
    },

    /// `allOf` had failing branches, or `anyOf`/`oneOf` matched none.
    #[error("{}", branch_failure_message(.kind, .failures))]
    BranchesFailed {
        /// Which combinator.
        kind: CombinatorKind,
        /// Every failing branch.
        failures: Vec<BranchFailure>,
    },

    /// `oneOf` matched more than one branch.
    #[error("must match exactly one branch; branches {} all matched", join_indices(.matched))]
    MultipleBranchesMatched {
        /// Indices of the matching branches.
        matched: Vec<usize>,
    },

    /// The value matched the schema under `not`.
    #[error("must not match the negated schema")]
    NegationMatched,

    /// The branch selected by `if` rejected the value.
    #[error("{branch} branch: {inner}")]
    ConditionalBranch {
        /// Which branch was selected.
        branch: ConditionalBranch,
        /// Failure reported by the branch.
        inner: Box<ValidationError>,
    },

    /// A reference cycle that never descends into the value.
    #[error("reference cycle: {0}")]
    Cycle(CycleError),

    /// A deferred reference outlived the compiled schema that owns it.
    #[error("deferred reference '{pointer}' is no longer available")]
    UnresolvedDeferred {
        /// Pointer of the deferred target.
        pointer: String,
    },
}

/// One failing branch of a combinator.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchFailure {
    /// Position of the branch in the combinator keyword.
    pub index: usize,
    /// Why the branch rejected the value.
    pub error: ValidationError,
}

impl fmt::Display for BranchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch {}: {}", self.index, self.error)
    }
}

fn branch_failure_message(kind: &CombinatorKind, failures: &[BranchFailure]) -> String {
    let joined = failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    match kind {
        CombinatorKind::All => format!("must match all branches; failures: {joined}"),
        CombinatorKind::Any => format!("must match at least one branch; failures: {joined}"),
        CombinatorKind::One => {
            format!("must match exactly one branch; no branch matched: {joined}")
        }
        CombinatorKind::Not => "must not match the negated schema".to_string(),
    }
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
