//! `array` nodes: positional prefix, tail items, counts, uniqueness and
//! `contains`.
//!
//! The prefix comes from `prefixItems`, or from `items` given as an array
//! (the pre-2020 tuple form, whose tail is then `additionalItems`).

use cfgschema_core::CompileError;
use serde_json::Value;

use super::compile_node;
use crate::constraint::Constraint;
use crate::node::SchemaNode;
use crate::resolver::ResolutionContext;
use crate::template::{ItemsPolicy, SequenceTemplate, Template, TemplateKind};

pub(super) fn compile<'doc>(
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    let (prefix_keyword, prefix_schemas, tail_keyword) =
        match (node.schema_list("prefixItems")?, node.get("items")) {
            (Some(_), Some(Value::Array(_))) => {
                return Err(node
                    .invalid("items", "a schema when prefixItems is present")
                    .into())
            }
            (Some(list), _) => ("prefixItems", list, "items"),
            (None, Some(Value::Array(list))) => ("items", list.as_slice(), "additionalItems"),
            (None, _) => ("prefixItems", &[][..], "items"),
        };

    let mut prefix = Vec::with_capacity(prefix_schemas.len());
    for (index, schema) in prefix_schemas.iter().enumerate() {
        prefix.push(compile_node(
            schema,
            node.location(prefix_keyword).index(index),
            ctx,
        )?);
    }

    let items = match node.get(tail_keyword) {
        None | Some(Value::Bool(true)) => ItemsPolicy::Unconstrained,
        Some(Value::Bool(false)) => ItemsPolicy::Forbidden,
        Some(schema) => ItemsPolicy::Template(Box::new(compile_node(
            schema,
            node.location(tail_keyword),
            ctx,
        )?)),
    };

    let mut constraints = Vec::new();
    let min = node.count("minItems")?;
    let max = node.count("maxItems")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(node
                .contradiction(format!("minItems ({min}) exceeds maxItems ({max})"))
                .into());
        }
    }
    if min.is_some() || max.is_some() {
        constraints.push(Constraint::ItemCount { min, max });
    }
    if node.boolean("uniqueItems")? == Some(true) {
        constraints.push(Constraint::UniqueItems);
    }
    if let Some(schema) = node.get("contains") {
        let template = compile_node(schema, node.location("contains"), ctx)?;
        let min = node.count("minContains")?.unwrap_or(1);
        let max = node.count("maxContains")?;
        if let Some(max) = max.filter(|max| min > *max) {
            return Err(node
                .contradiction(format!("minContains ({min}) exceeds maxContains ({max})"))
                .into());
        }
        constraints.push(Constraint::Contains {
            template: Box::new(template),
            min,
            max,
        });
    }

    Ok(Template::new(TemplateKind::Sequence(SequenceTemplate {
        prefix,
        items,
        constraints,
    })))
}
