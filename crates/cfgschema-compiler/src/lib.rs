//! # cfgschema-compiler — JSON Schema to Configuration Templates
//!
//! Compiles a JSON Schema document into a tree of [`Template`] nodes that
//! validate and coerce configuration values. The tree is what a layered
//! configuration loader consumes: each node answers `validate`, carries the
//! schema's literal `default`, and knows whether it must be present.
//!
//! ## Design
//!
//! - **One pass, one document.** Only in-document `$ref` fragments (`#`,
//!   `#/...`) resolve. The whole document compiles eagerly; compile errors
//!   surface before any value is validated.
//!
//! - **Cycles become deferred nodes.** A `$ref` to a pointer already being
//!   compiled yields a [`TemplateKind::Deferred`] node. Deferred nodes look
//!   up their target in a table owned by the [`CompiledSchema`], so
//!   recursive schemas (trees, linked lists) compile to finite templates.
//!   A value that follows a cycle back to itself without descending into a
//!   child value fails validation with a [`CycleError`].
//!
//! - **Keywords compose by conjunction.** A schema object with `$ref`,
//!   `if`, combinators and type keywords compiles each group separately and
//!   joins them under `allOf`.
//!
//! ## Usage
//!
//! ```
//! use cfgschema_compiler::compile;
//! use serde_json::json;
//!
//! let schema = compile(&json!({
//!     "type": "object",
//!     "properties": {
//!         "host": {"type": "string"},
//!         "port": {"type": "integer", "minimum": 1, "default": 8080}
//!     },
//!     "required": ["host"]
//! }))
//! .unwrap();
//!
//! let config = schema.validate(&json!({"host": "db.internal"})).unwrap();
//! assert_eq!(config, json!({"host": "db.internal", "port": 8080}));
//! ```
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Logging goes through `tracing`; the host installs the subscriber.

pub mod builder;
mod compile;
pub mod constraint;
pub mod format;
mod node;
pub mod options;
mod resolver;
pub mod template;

// Re-export primary types for ergonomic imports.
pub use builder::TemplateBuilder;
pub use cfgschema_core::{
    CompileError, ConfigTemplate, CycleError, Presence, SchemaError, UnsupportedFeatureError,
    ValidationError, ValidationErrorKind,
};
pub use compile::{compile, compile_with_options, CompiledSchema};
pub use constraint::{Constraint, NumericRange};
pub use format::{Format, FormatSupport};
pub use options::{CompileOptions, OptionsError, PatternPropertiesMode, UnknownFormatPolicy};
pub use template::{
    AdditionalPolicy, DeferredTable, ItemsPolicy, ScalarKind, Template, TemplateKind,
};
