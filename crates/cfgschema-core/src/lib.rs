//! # cfgschema-core — Foundational Types for Schema Templates
//!
//! This crate is the leaf of the cfgschema workspace. It defines the types
//! shared between the schema compiler and the configuration layer that
//! consumes compiled templates. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** Compile-time failures are [`SchemaError`]
//!    and [`UnsupportedFeatureError`], unified under [`CompileError`].
//!    Validation-time failures are [`ValidationError`], always carrying the
//!    instance path of the offending value; a reference cycle that never
//!    descends into the value surfaces there as a [`CycleError`].
//!
//! 2. **Newtypes for locations.** [`SchemaPointer`] addresses a location in
//!    the schema document; [`InstancePath`] addresses a location in the
//!    validated value. They are never interchangeable.
//!
//! 3. **A narrow node protocol.** [`ConfigTemplate`] is the only surface the
//!    downstream configuration library sees: `validate`, `default_value`,
//!    and required/optional status.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cfgschema-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod json;
pub mod kind;
pub mod path;
pub mod pointer;
pub mod protocol;

// Re-export primary types for ergonomic imports.
pub use error::{
    BranchFailure, CompileError, CycleError, SchemaError, UnsupportedFeatureError,
    ValidationError, ValidationErrorKind,
};
pub use json::{integral_value, json_equal, number_value, JsonType};
pub use kind::{CombinatorKind, ConditionalBranch, ConstraintKind};
pub use path::{InstancePath, PathSegment};
pub use pointer::SchemaPointer;
pub use protocol::{ConfigTemplate, Presence, ValidatedValue};
