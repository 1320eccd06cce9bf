//! # Type Compiler — Schema Node to Template
//!
//! Recursive dispatch over one schema document. Each schema object
//! compiles to one or more parts, in a fixed order:
//!
//! 1. the `$ref` target,
//! 2. the `if`/`then`/`else` conditional,
//! 3. one combinator per `allOf`, `anyOf`, `oneOf`, `not`,
//! 4. the typed part.
//!
//! A single part is the node's template; several parts are joined under an
//! `allOf` combinator. The typed part is built only when a type keyword,
//! `const`, `enum` or a type-specific keyword is present, or when no other
//! part exists (an empty schema accepts anything).
//!
//! With `type`, the typed part accepts only the named types. Without it,
//! type-specific keywords constrain values of their own type and every
//! other value passes through: `{"minimum": 0}` accepts `"x"`.
//!
//! ## Invariants
//!
//! - Compilation is deterministic: the same document and options always
//!   produce an equivalent tree.
//! - Every [`SchemaError`] names the `#/...` location of the offending
//!   keyword.

mod array;
mod combinator;
mod conditional;
mod number;
mod object;
mod string;

use std::sync::Arc;

use cfgschema_core::{
    CombinatorKind, CompileError, ConfigTemplate, JsonType, Presence, SchemaError, SchemaPointer,
    ValidatedValue, ValidationError,
};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::builder;
use crate::constraint::Constraint;
use crate::node::SchemaNode;
use crate::options::CompileOptions;
use crate::resolver::{Resolution, ResolutionContext};
use crate::template::{DeferredTable, ScalarKind, Template, TemplateKind, TypeSwitchTemplate};

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
    "dependentRequired",
    "dependentSchemas",
    "dependencies",
    "propertyNames",
    "minProperties",
    "maxProperties",
];

const ARRAY_KEYWORDS: &[&str] = &[
    "items",
    "prefixItems",
    "additionalItems",
    "minItems",
    "maxItems",
    "uniqueItems",
    "contains",
    "minContains",
    "maxContains",
];

const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];

const NUMERIC_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// A compiled document: the root template plus the targets of every
/// deferred reference inside it.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    root: Template,
    table: Arc<DeferredTable>,
}

impl CompiledSchema {
    pub fn root(&self) -> &Template {
        &self.root
    }

    /// Targets of the deferred references in the tree.
    pub fn deferred_targets(&self) -> &DeferredTable {
        &self.table
    }

    /// Validate and coerce a value against the root template.
    pub fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        self.root.validate(value)
    }
}

impl ConfigTemplate for CompiledSchema {
    fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        self.root.validate(value)
    }

    fn default_value(&self) -> Option<&Value> {
        self.root.default_value()
    }

    fn presence(&self) -> Presence {
        self.root.presence()
    }
}

/// Compile a schema document with default options.
pub fn compile(schema: &Value) -> Result<CompiledSchema, CompileError> {
    compile_with_options(schema, &CompileOptions::default())
}

/// Compile a schema document.
///
/// The root is compiled with `#` on the active stack, so `{"$ref": "#"}`
/// anywhere in the document, the root included, becomes a deferred node
/// pointing back at the root.
#[instrument(skip_all, fields(
    pattern_properties = ?options.pattern_properties,
    unknown_formats = ?options.unknown_formats
))]
pub fn compile_with_options(
    schema: &Value,
    options: &CompileOptions,
) -> Result<CompiledSchema, CompileError> {
    let table = Arc::new(DeferredTable::default());
    let mut ctx = ResolutionContext::new(schema, *options, Arc::downgrade(&table));

    let root_pointer = SchemaPointer::root();
    ctx.enter(root_pointer.clone());
    let compiled = compile_node(schema, root_pointer.clone(), &mut ctx);
    ctx.exit();
    let root = compiled?;
    ctx.complete(&root_pointer, &root);

    let targets = ctx.into_targets();
    debug!(deferred_targets = targets.len(), "schema compiled");
    table.install(targets);
    Ok(CompiledSchema { root, table })
}

/// Compile the schema at `at`.
pub(crate) fn compile_node<'doc>(
    value: &'doc Value,
    at: SchemaPointer,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    let map = match value {
        Value::Bool(true) => return Ok(Template::any()),
        Value::Bool(false) => return Ok(Template::nothing()),
        Value::Object(map) => map,
        other => {
            return Err(SchemaError::NotASchema {
                at: at.to_string(),
                found: JsonType::of(other),
            }
            .into())
        }
    };
    let node = SchemaNode::new(map, at);
    trace!(at = %node.at(), "compiling schema node");

    let mut parts = Vec::new();
    if let Some(reference) = node.string("$ref")? {
        parts.push(compile_reference(reference, &node, ctx)?);
    }
    if node.has("if") {
        parts.push(conditional::compile(&node, ctx)?);
    }
    parts.extend(combinator::compile(&node, ctx)?);
    if parts.is_empty() || has_typed_keywords(&node) {
        parts.push(compile_typed(&node, ctx)?);
    }

    let template = match <[Template; 1]>::try_from(parts) {
        Ok([single]) => single,
        Err(parts) => Template::combinator(CombinatorKind::All, parts),
    };
    Ok(builder::annotate(template, &node))
}

fn compile_reference<'doc>(
    reference: &str,
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    match ctx.resolve(reference, &node.location("$ref"))? {
        Resolution::Deferred(template) | Resolution::Memoized(template) => Ok(template),
        Resolution::Target { pointer, node: target } => {
            ctx.enter(pointer.clone());
            let compiled = compile_node(target, pointer.clone(), ctx);
            ctx.exit();
            let template = compiled?;
            ctx.complete(&pointer, &template);
            Ok(template)
        }
    }
}

fn has_typed_keywords(node: &SchemaNode<'_>) -> bool {
    node.has_any(&["type", "const", "enum"])
        || node.has_any(OBJECT_KEYWORDS)
        || node.has_any(ARRAY_KEYWORDS)
        || node.has_any(STRING_KEYWORDS)
        || node.has_any(NUMERIC_KEYWORDS)
}

/// The typed part.
///
/// Declared types compile to one template each, joined under `anyOf` when
/// there are several. Without `type`, each keyword family present gets an
/// arm of a type switch whose fallback accepts every other type.
/// `const`/`enum` membership applies to whatever the part accepts.
fn compile_typed<'doc>(
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    let membership = membership(node)?;

    let mut template = match declared_types(node)? {
        Some(types) => {
            let templates = types
                .into_iter()
                .map(|ty| compile_for_type(ty, node, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            match <[Template; 1]>::try_from(templates) {
                Ok([single]) => single,
                Err(templates) => Template::combinator(CombinatorKind::Any, templates),
            }
        }
        None => {
            let families = keyword_families(node);
            if families.is_empty() {
                Template::any()
            } else {
                let arms = families
                    .into_iter()
                    .map(|ty| Ok((ty, compile_for_type(ty, node, ctx)?)))
                    .collect::<Result<Vec<_>, CompileError>>()?;
                Template::new(TemplateKind::TypeSwitch(TypeSwitchTemplate {
                    arms,
                    fallback: Box::new(Template::any()),
                }))
            }
        }
    };
    for constraint in membership {
        template.push_constraint(constraint);
    }
    Ok(template)
}

fn declared_types(node: &SchemaNode<'_>) -> Result<Option<Vec<JsonType>>, SchemaError> {
    let names: Vec<&str> = match node.get("type") {
        None => return Ok(None),
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) if !names.is_empty() => names
            .iter()
            .map(Value::as_str)
            .collect::<Option<_>>()
            .ok_or_else(|| node.invalid("type", "a type name or a non-empty array of type names"))?,
        Some(_) => {
            return Err(node.invalid("type", "a type name or a non-empty array of type names"))
        }
    };
    let mut types = Vec::with_capacity(names.len());
    for name in names {
        let ty = JsonType::from_name(name).ok_or_else(|| SchemaError::UnknownType {
            at: node.location("type").to_string(),
            name: name.to_string(),
        })?;
        if !types.contains(&ty) {
            types.push(ty);
        }
    }
    Ok(Some(types))
}

/// JSON types whose keywords appear on the node.
fn keyword_families(node: &SchemaNode<'_>) -> Vec<JsonType> {
    [
        (OBJECT_KEYWORDS, JsonType::Object),
        (ARRAY_KEYWORDS, JsonType::Array),
        (STRING_KEYWORDS, JsonType::String),
        (NUMERIC_KEYWORDS, JsonType::Number),
    ]
    .into_iter()
    .filter(|(keywords, _)| node.has_any(keywords))
    .map(|(_, ty)| ty)
    .collect()
}

fn membership(node: &SchemaNode<'_>) -> Result<Vec<Constraint>, SchemaError> {
    let mut constraints = Vec::new();
    if let Some(value) = node.get("const") {
        constraints.push(Constraint::Membership(vec![value.clone()]));
    }
    match node.get("enum") {
        None => {}
        Some(Value::Array(values)) if !values.is_empty() => {
            constraints.push(Constraint::Membership(values.clone()));
        }
        Some(_) => return Err(node.invalid("enum", "a non-empty array")),
    }
    Ok(constraints)
}

fn compile_for_type<'doc>(
    ty: JsonType,
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    match ty {
        JsonType::Null => Ok(Template::scalar(ScalarKind::Null, Vec::new())),
        JsonType::Boolean => Ok(Template::scalar(ScalarKind::Boolean, Vec::new())),
        JsonType::Integer => Ok(number::compile(node, ScalarKind::Integer)?),
        JsonType::Number => Ok(number::compile(node, ScalarKind::Number)?),
        JsonType::String => string::compile(node, ctx),
        JsonType::Array => array::compile(node, ctx),
        JsonType::Object => object::compile(node, ctx),
    }
}
