//! # Template Tree — Compiled Validation/Coercion Nodes
//!
//! A [`Template`] is the compiled form of one schema node. It validates a
//! candidate value and returns the coerced value: integral floats become
//! integers under `integer`, and missing optional properties with a
//! default are filled in.
//!
//! ## Design
//!
//! - Scalar, sequence and mapping templates fail fast on the first
//!   offending value and prefix the error path as the error bubbles out.
//! - Combinators aggregate every failing branch.
//! - Type-specific keywords without a `type` keyword compile to a
//!   [`TypeSwitchTemplate`]: they constrain values of their own type and
//!   let every other value through, as JSON Schema prescribes.
//! - A [`TemplateKind::Deferred`] node stands in for a `$ref` that closed a
//!   cycle. It holds a `Weak` handle to the [`DeferredTable`] owned by the
//!   [`CompiledSchema`](crate::CompiledSchema), so recursive trees do not
//!   form reference-count cycles. Validation tracks the deferred pointers
//!   followed since it last descended into a child value; reaching one of
//!   them again is a [`CycleError`].
//!
//! ## Invariants
//!
//! - Templates are immutable after compilation. Validation never mutates
//!   the tree and is safe from any number of threads.
//! - A validated value always passes the same template again.

use std::collections::{HashMap, HashSet};
use std::sync::{OnceLock, Weak};

use cfgschema_core::{
    integral_value, BranchFailure, CombinatorKind, ConditionalBranch, ConfigTemplate, CycleError,
    JsonType, PathSegment, Presence, SchemaPointer, ValidatedValue, ValidationError,
    ValidationErrorKind,
};
use regex::Regex;
use serde_json::{Map, Value};

use crate::constraint::{check_all, Constraint};
use crate::options::PatternPropertiesMode;

/// One compiled schema node plus its default and presence.
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) kind: TemplateKind,
    pub(crate) default: Option<Value>,
    pub(crate) presence: Presence,
}

/// The node variants.
#[derive(Debug, Clone)]
pub enum TemplateKind {
    Scalar(ScalarTemplate),
    Sequence(SequenceTemplate),
    Mapping(MappingTemplate),
    Combinator(CombinatorTemplate),
    Conditional(ConditionalTemplate),
    TypeSwitch(TypeSwitchTemplate),
    Deferred(DeferredTemplate),
}

/// Leaf value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Accepts any JSON value unchanged.
    Any,
    Null,
    Boolean,
    /// Integral numbers; `15.0` is coerced to `15`.
    Integer,
    Number,
    String,
    /// A string tagged as a filesystem or URI path.
    Path,
}

impl ScalarKind {
    fn expected(self) -> &'static str {
        match self {
            Self::Any => "any value",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Path => "path string",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScalarTemplate {
    pub(crate) kind: ScalarKind,
    pub(crate) constraints: Vec<Constraint>,
}

/// Elements beyond the positional prefix.
#[derive(Debug, Clone)]
pub enum ItemsPolicy {
    /// Any value is accepted unchanged.
    Unconstrained,
    /// Every element is validated against the template.
    Template(Box<Template>),
    /// No elements allowed beyond the prefix.
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct SequenceTemplate {
    pub(crate) prefix: Vec<Template>,
    pub(crate) items: ItemsPolicy,
    pub(crate) constraints: Vec<Constraint>,
}

/// Keys matched by neither `properties` nor `patternProperties`.
#[derive(Debug, Clone)]
pub enum AdditionalPolicy {
    /// Copied through unchanged.
    Allow,
    /// Rejected; every offending key is reported at once.
    Forbid,
    /// Validated against the template.
    Template(Box<Template>),
}

/// One `patternProperties` entry.
#[derive(Debug, Clone)]
pub struct PatternProperty {
    pub(crate) regex: Regex,
    pub(crate) template: Template,
}

impl PatternProperty {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

#[derive(Debug, Clone)]
pub struct MappingTemplate {
    pub(crate) properties: Vec<(String, Template)>,
    pub(crate) required_only: Vec<String>,
    pub(crate) pattern_properties: Vec<PatternProperty>,
    pub(crate) pattern_mode: PatternPropertiesMode,
    pub(crate) additional: AdditionalPolicy,
    pub(crate) dependent_required: Vec<(String, Vec<String>)>,
    pub(crate) dependent_schemas: Vec<(String, Template)>,
    pub(crate) property_names: Option<Box<Template>>,
    pub(crate) constraints: Vec<Constraint>,
}

#[derive(Debug, Clone)]
pub struct CombinatorTemplate {
    pub(crate) kind: CombinatorKind,
    pub(crate) branches: Vec<Template>,
}

#[derive(Debug, Clone)]
pub struct ConditionalTemplate {
    pub(crate) condition: Box<Template>,
    pub(crate) then_branch: Option<Box<Template>>,
    pub(crate) else_branch: Option<Box<Template>>,
}

/// Per-type templates for a schema without `type`. Values of a listed type
/// go to that type's template, everything else to the fallback.
#[derive(Debug, Clone)]
pub struct TypeSwitchTemplate {
    pub(crate) arms: Vec<(JsonType, Template)>,
    pub(crate) fallback: Box<Template>,
}

#[derive(Debug, Clone)]
pub struct DeferredTemplate {
    pub(crate) pointer: SchemaPointer,
    pub(crate) table: Weak<DeferredTable>,
}

/// Compiled targets of every reference that closed a cycle, keyed by
/// pointer. Filled once, after the whole document has compiled.
#[derive(Debug, Default)]
pub struct DeferredTable {
    targets: OnceLock<HashMap<SchemaPointer, Template>>,
}

impl DeferredTable {
    pub(crate) fn install(&self, targets: HashMap<SchemaPointer, Template>) {
        if self.targets.set(targets).is_err() {
            tracing::warn!("deferred table installed twice; keeping the first");
        }
    }

    /// The compiled target of a deferred pointer.
    pub fn get(&self, pointer: &SchemaPointer) -> Option<&Template> {
        self.targets.get().and_then(|targets| targets.get(pointer))
    }

    pub fn len(&self) -> usize {
        self.targets.get().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Targeted pointers, sorted.
    pub fn pointers(&self) -> Vec<&SchemaPointer> {
        let mut pointers: Vec<_> = self
            .targets
            .get()
            .map(|targets| targets.keys().collect())
            .unwrap_or_default();
        pointers.sort();
        pointers
    }
}

impl Template {
    pub(crate) fn new(kind: TemplateKind) -> Self {
        Self {
            kind,
            default: None,
            presence: Presence::Required,
        }
    }

    /// Accepts every value unchanged (the `true` schema).
    pub fn any() -> Self {
        Self::scalar(ScalarKind::Any, Vec::new())
    }

    /// Rejects every value (the `false` schema).
    pub fn nothing() -> Self {
        Self::combinator(CombinatorKind::Not, vec![Self::any()])
    }

    pub fn scalar(kind: ScalarKind, constraints: Vec<Constraint>) -> Self {
        Self::new(TemplateKind::Scalar(ScalarTemplate { kind, constraints }))
    }

    pub fn combinator(kind: CombinatorKind, branches: Vec<Template>) -> Self {
        Self::new(TemplateKind::Combinator(CombinatorTemplate { kind, branches }))
    }

    pub(crate) fn deferred(pointer: SchemaPointer, table: Weak<DeferredTable>) -> Self {
        Self::new(TemplateKind::Deferred(DeferredTemplate { pointer, table }))
    }

    pub fn kind(&self) -> &TemplateKind {
        &self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Pointer of the deferred target, if this is a deferred node.
    pub fn deferred_pointer(&self) -> Option<&SchemaPointer> {
        match &self.kind {
            TemplateKind::Deferred(deferred) => Some(&deferred.pointer),
            _ => None,
        }
    }

    /// Constraints of a scalar, sequence or mapping node; empty otherwise.
    pub fn constraints(&self) -> &[Constraint] {
        match &self.kind {
            TemplateKind::Scalar(s) => &s.constraints,
            TemplateKind::Sequence(s) => &s.constraints,
            TemplateKind::Mapping(m) => &m.constraints,
            _ => &[],
        }
    }

    /// Add a constraint every accepted value must also satisfy.
    ///
    /// Nodes without a constraint list of their own are wrapped: the node
    /// becomes an `allOf` of its previous kind and an unconstrained scalar
    /// carrying the constraint.
    pub(crate) fn push_constraint(&mut self, constraint: Constraint) {
        match &mut self.kind {
            TemplateKind::Scalar(s) => s.constraints.push(constraint),
            TemplateKind::Sequence(s) => s.constraints.push(constraint),
            TemplateKind::Mapping(m) => m.constraints.push(constraint),
            TemplateKind::Combinator(c) if c.kind != CombinatorKind::Not => {
                for branch in &mut c.branches {
                    branch.push_constraint(constraint.clone());
                }
            }
            TemplateKind::TypeSwitch(t) => {
                for (_, arm) in &mut t.arms {
                    arm.push_constraint(constraint.clone());
                }
                t.fallback.push_constraint(constraint);
            }
            TemplateKind::Combinator(_)
            | TemplateKind::Conditional(_)
            | TemplateKind::Deferred(_) => {
                let previous = std::mem::replace(
                    &mut self.kind,
                    TemplateKind::Scalar(ScalarTemplate {
                        kind: ScalarKind::Any,
                        constraints: Vec::new(),
                    }),
                );
                self.kind = TemplateKind::Combinator(CombinatorTemplate {
                    kind: CombinatorKind::All,
                    branches: vec![
                        Template::new(previous),
                        Template::scalar(ScalarKind::Any, vec![constraint]),
                    ],
                });
            }
        }
    }

    /// Validate and coerce a value.
    pub fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        self.validate_in(value, &mut Vec::new())
    }

    /// Validate with the deferred pointers already followed on this value.
    ///
    /// Containers validate their children through [`Template::validate`],
    /// which starts a fresh list: descending into a child guards the cycle.
    fn validate_in(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        match &self.kind {
            TemplateKind::Scalar(s) => s.validate(value),
            TemplateKind::Sequence(s) => s.validate(value),
            TemplateKind::Mapping(m) => m.validate(value, followed),
            TemplateKind::Combinator(c) => c.validate(value, followed),
            TemplateKind::Conditional(c) => c.validate(value, followed),
            TemplateKind::TypeSwitch(t) => t.validate(value, followed),
            TemplateKind::Deferred(d) => d.validate(value, followed),
        }
    }

    /// True if validation could reach `pointer` again without descending
    /// into a child value. Such a cycle would never terminate.
    pub(crate) fn reaches_unguarded(
        &self,
        pointer: &SchemaPointer,
        targets: &HashMap<SchemaPointer, Template>,
        visited: &mut HashSet<SchemaPointer>,
    ) -> bool {
        match &self.kind {
            TemplateKind::Deferred(d) => {
                if &d.pointer == pointer {
                    return true;
                }
                if !visited.insert(d.pointer.clone()) {
                    return false;
                }
                targets
                    .get(&d.pointer)
                    .is_some_and(|target| target.reaches_unguarded(pointer, targets, visited))
            }
            TemplateKind::Combinator(c) => c
                .branches
                .iter()
                .any(|branch| branch.reaches_unguarded(pointer, targets, visited)),
            TemplateKind::Conditional(c) => [
                Some(&c.condition),
                c.then_branch.as_ref(),
                c.else_branch.as_ref(),
            ]
            .into_iter()
            .flatten()
            .any(|branch| branch.reaches_unguarded(pointer, targets, visited)),
            TemplateKind::TypeSwitch(t) => t
                .arms
                .iter()
                .map(|(_, arm)| arm)
                .chain(std::iter::once(t.fallback.as_ref()))
                .any(|arm| arm.reaches_unguarded(pointer, targets, visited)),
            TemplateKind::Mapping(m) => m
                .dependent_schemas
                .iter()
                .any(|(_, schema)| schema.reaches_unguarded(pointer, targets, visited)),
            TemplateKind::Scalar(_) | TemplateKind::Sequence(_) => false,
        }
    }
}

impl ConfigTemplate for Template {
    fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        Template::validate(self, value)
    }

    fn default_value(&self) -> Option<&Value> {
        Template::default_value(self)
    }

    fn presence(&self) -> Presence {
        Template::presence(self)
    }
}

impl ScalarTemplate {
    pub fn scalar_kind(&self) -> ScalarKind {
        self.kind
    }

    fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        let accepted = match (self.kind, value) {
            (ScalarKind::Any, _)
            | (ScalarKind::Null, Value::Null)
            | (ScalarKind::Boolean, Value::Bool(_))
            | (ScalarKind::Number, Value::Number(_))
            | (ScalarKind::String | ScalarKind::Path, Value::String(_)) => Some(value.clone()),
            (ScalarKind::Integer, _) => integral_value(value),
            _ => None,
        };
        let coerced = accepted.ok_or_else(|| {
            ValidationError::type_mismatch(self.kind.expected(), JsonType::of(value))
        })?;
        check_all(&self.constraints, &coerced)?;
        Ok(coerced)
    }
}

impl SequenceTemplate {
    pub fn prefix(&self) -> &[Template] {
        &self.prefix
    }

    pub fn items(&self) -> &ItemsPolicy {
        &self.items
    }

    fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        let Value::Array(elements) = value else {
            return Err(ValidationError::type_mismatch("array", JsonType::of(value)));
        };
        check_all(&self.constraints, value)?;
        let mut out = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let template = match (self.prefix.get(index), &self.items) {
                (Some(template), _) => template,
                (None, ItemsPolicy::Template(template)) => template.as_ref(),
                (None, ItemsPolicy::Unconstrained) => {
                    out.push(element.clone());
                    continue;
                }
                (None, ItemsPolicy::Forbidden) => {
                    return Err(ValidationError::new(ValidationErrorKind::ItemNotAllowed {
                        index,
                        prefix_len: self.prefix.len(),
                    }));
                }
            };
            let validated = template
                .validate(element)
                .map_err(|e| e.within(PathSegment::Index(index)))?;
            out.push(validated);
        }
        Ok(Value::Array(out))
    }
}

impl MappingTemplate {
    /// Declared properties in schema order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.properties.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn property(&self, name: &str) -> Option<&Template> {
        self.properties
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, t)| t)
    }

    /// Names listed in `required` without a `properties` entry.
    pub fn required_only(&self) -> &[String] {
        &self.required_only
    }

    pub fn pattern_properties(&self) -> &[PatternProperty] {
        &self.pattern_properties
    }

    pub fn additional(&self) -> &AdditionalPolicy {
        &self.additional
    }

    fn is_declared(&self, key: &str) -> bool {
        self.properties.iter().any(|(name, _)| name == key)
    }

    fn matching_patterns(&self, key: &str, declared: bool) -> Vec<&PatternProperty> {
        match self.pattern_mode {
            PatternPropertiesMode::FirstMatch if declared => Vec::new(),
            PatternPropertiesMode::FirstMatch => self
                .pattern_properties
                .iter()
                .find(|p| p.regex.is_match(key))
                .into_iter()
                .collect(),
            PatternPropertiesMode::AllMatches => self
                .pattern_properties
                .iter()
                .filter(|p| p.regex.is_match(key))
                .collect(),
        }
    }

    fn validate(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        let Value::Object(object) = value else {
            return Err(ValidationError::type_mismatch("object", JsonType::of(value)));
        };
        check_all(&self.constraints, value)?;

        if let Some(names) = &self.property_names {
            for key in object.keys() {
                names
                    .validate(&Value::String(key.clone()))
                    .map_err(|e| e.within(PathSegment::PropertyName(key.clone())))?;
            }
        }

        if let Some(name) = self.required_only.iter().find(|n| !object.contains_key(*n)) {
            return Err(missing(name));
        }

        let mut out = Map::new();
        for (name, template) in &self.properties {
            match object.get(name) {
                Some(raw) => {
                    let validated = template
                        .validate(raw)
                        .map_err(|e| e.within(PathSegment::Property(name.clone())))?;
                    out.insert(name.clone(), validated);
                }
                None if template.presence == Presence::Required => return Err(missing(name)),
                None => {
                    if let Some(default) = &template.default {
                        out.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        let mut rejected = Vec::new();
        for (key, raw) in object {
            let declared = self.is_declared(key);
            let patterns = self.matching_patterns(key, declared);
            if !patterns.is_empty() {
                let mut current = out.get(key).cloned().unwrap_or_else(|| raw.clone());
                for pattern in patterns {
                    current = pattern
                        .template
                        .validate(&current)
                        .map_err(|e| e.within(PathSegment::Property(key.clone())))?;
                }
                out.insert(key.clone(), current);
                continue;
            }
            if declared {
                continue;
            }
            match &self.additional {
                AdditionalPolicy::Allow => {
                    out.insert(key.clone(), raw.clone());
                }
                AdditionalPolicy::Forbid => rejected.push(key.clone()),
                AdditionalPolicy::Template(template) => {
                    let validated = template
                        .validate(raw)
                        .map_err(|e| e.within(PathSegment::Property(key.clone())))?;
                    out.insert(key.clone(), validated);
                }
            }
        }
        if !rejected.is_empty() {
            rejected.sort();
            return Err(ValidationError::new(
                ValidationErrorKind::AdditionalProperties { names: rejected },
            ));
        }

        for (trigger, dependencies) in &self.dependent_required {
            if !object.contains_key(trigger) {
                continue;
            }
            let mut absent: Vec<String> = dependencies
                .iter()
                .filter(|d| !object.contains_key(*d))
                .cloned()
                .collect();
            if !absent.is_empty() {
                absent.sort();
                return Err(ValidationError::new(
                    ValidationErrorKind::DependentRequired {
                        trigger: trigger.clone(),
                        missing: absent,
                    },
                ));
            }
        }

        for (trigger, schema) in &self.dependent_schemas {
            if object.contains_key(trigger) {
                schema.validate_in(value, followed).map_err(|inner| {
                    ValidationError::new(ValidationErrorKind::DependentSchema {
                        trigger: trigger.clone(),
                        inner: Box::new(inner),
                    })
                })?;
            }
        }

        Ok(Value::Object(out))
    }
}

fn missing(name: &str) -> ValidationError {
    ValidationError::new(ValidationErrorKind::MissingProperty {
        name: name.to_string(),
    })
}

impl CombinatorTemplate {
    pub fn combinator_kind(&self) -> CombinatorKind {
        self.kind
    }

    pub fn branches(&self) -> &[Template] {
        &self.branches
    }

    fn validate(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        match self.kind {
            CombinatorKind::All => self.validate_all(value, followed),
            CombinatorKind::Any => {
                let mut failures = Vec::new();
                for (index, branch) in self.branches.iter().enumerate() {
                    match branch.validate_in(value, followed) {
                        Ok(validated) => return Ok(validated),
                        Err(error) => failures.push(BranchFailure { index, error }),
                    }
                }
                Err(branches_failed(CombinatorKind::Any, failures))
            }
            CombinatorKind::One => {
                let mut matched = Vec::new();
                let mut failures = Vec::new();
                for (index, branch) in self.branches.iter().enumerate() {
                    match branch.validate_in(value, followed) {
                        Ok(validated) => matched.push((index, validated)),
                        Err(error) => failures.push(BranchFailure { index, error }),
                    }
                }
                match matched.len() {
                    0 => Err(branches_failed(CombinatorKind::One, failures)),
                    1 => Ok(matched.remove(0).1),
                    _ => Err(ValidationError::new(
                        ValidationErrorKind::MultipleBranchesMatched {
                            matched: matched.into_iter().map(|(index, _)| index).collect(),
                        },
                    )),
                }
            }
            CombinatorKind::Not => {
                if self
                    .branches
                    .iter()
                    .all(|b| b.validate_in(value, followed).is_err())
                {
                    Ok(value.clone())
                } else {
                    Err(ValidationError::new(ValidationErrorKind::NegationMatched))
                }
            }
        }
    }

    /// Every branch sees the original value. Outputs are merged so that a
    /// coercion made by any branch survives: objects key by key, other
    /// values by keeping the latest output that differs from the input.
    fn validate_all(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        let mut failures = Vec::new();
        let mut merged: Option<Value> = None;
        for (index, branch) in self.branches.iter().enumerate() {
            match branch.validate_in(value, followed) {
                Ok(validated) => {
                    merged = Some(match merged {
                        Some(acc) => merge_output(value, acc, validated),
                        None => validated,
                    });
                }
                Err(error) => failures.push(BranchFailure { index, error }),
            }
        }
        if !failures.is_empty() {
            return Err(branches_failed(CombinatorKind::All, failures));
        }
        Ok(merged.unwrap_or_else(|| value.clone()))
    }
}

fn merge_output(original: &Value, acc: Value, next: Value) -> Value {
    match (acc, next) {
        (Value::Object(mut acc), Value::Object(next)) => {
            for (key, item) in next {
                let unchanged = original.get(key.as_str()) == Some(&item);
                if !(unchanged && acc.contains_key(&key)) {
                    acc.insert(key, item);
                }
            }
            Value::Object(acc)
        }
        (acc, next) => {
            if &next == original {
                acc
            } else {
                next
            }
        }
    }
}

fn branches_failed(kind: CombinatorKind, failures: Vec<BranchFailure>) -> ValidationError {
    ValidationError::new(ValidationErrorKind::BranchesFailed { kind, failures })
}

impl ConditionalTemplate {
    pub fn condition(&self) -> &Template {
        &self.condition
    }

    pub fn then_branch(&self) -> Option<&Template> {
        self.then_branch.as_deref()
    }

    pub fn else_branch(&self) -> Option<&Template> {
        self.else_branch.as_deref()
    }

    fn validate(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        let (branch, selected) = if self.condition.validate_in(value, followed).is_ok() {
            (ConditionalBranch::Then, &self.then_branch)
        } else {
            (ConditionalBranch::Else, &self.else_branch)
        };
        match selected {
            Some(template) => template.validate_in(value, followed).map_err(|inner| {
                ValidationError::new(ValidationErrorKind::ConditionalBranch {
                    branch,
                    inner: Box::new(inner),
                })
            }),
            None => Ok(value.clone()),
        }
    }
}

impl TypeSwitchTemplate {
    /// The template applied to values of `ty`, if that type has keywords.
    /// Integers fall under a `number` arm.
    pub fn arm(&self, ty: JsonType) -> Option<&Template> {
        self.arms
            .iter()
            .find(|(arm, _)| {
                *arm == ty || (*arm == JsonType::Number && ty == JsonType::Integer)
            })
            .map(|(_, template)| template)
    }

    /// The template applied to values of every other type.
    pub fn fallback(&self) -> &Template {
        &self.fallback
    }

    fn validate(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        self.arm(JsonType::of(value))
            .unwrap_or(self.fallback.as_ref())
            .validate_in(value, followed)
    }
}

impl DeferredTemplate {
    pub fn pointer(&self) -> &SchemaPointer {
        &self.pointer
    }

    fn validate(
        &self,
        value: &Value,
        followed: &mut Vec<SchemaPointer>,
    ) -> Result<ValidatedValue, ValidationError> {
        if followed.contains(&self.pointer) {
            let chain = followed
                .iter()
                .chain(std::iter::once(&self.pointer))
                .map(ToString::to_string)
                .collect();
            return Err(ValidationError::new(ValidationErrorKind::Cycle(
                CycleError {
                    pointer: self.pointer.to_string(),
                    chain,
                },
            )));
        }
        let unresolved = || {
            ValidationError::new(ValidationErrorKind::UnresolvedDeferred {
                pointer: self.pointer.to_string(),
            })
        };
        let table = self.table.upgrade().ok_or_else(unresolved)?;
        let target = table.get(&self.pointer).ok_or_else(unresolved)?;
        followed.push(self.pointer.clone());
        let result = target.validate_in(value, followed);
        followed.pop();
        result
    }
}
