//! `allOf`, `anyOf`, `oneOf` and `not`.

use cfgschema_core::{CombinatorKind, CompileError};

use super::compile_node;
use crate::node::SchemaNode;
use crate::resolver::ResolutionContext;
use crate::template::Template;

/// One combinator template per keyword present, in keyword order.
pub(super) fn compile<'doc>(
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Vec<Template>, CompileError> {
    let mut parts = Vec::new();
    for kind in [CombinatorKind::All, CombinatorKind::Any, CombinatorKind::One] {
        let keyword = kind.keyword();
        let Some(schemas) = node.schema_list(keyword)? else {
            continue;
        };
        let at = node.location(keyword);
        let branches = schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| compile_node(schema, at.index(index), ctx))
            .collect::<Result<Vec<_>, _>>()?;
        parts.push(Template::combinator(kind, branches));
    }
    if let Some(schema) = node.get("not") {
        let negated = compile_node(schema, node.location("not"), ctx)?;
        parts.push(Template::combinator(CombinatorKind::Not, vec![negated]));
    }
    Ok(parts)
}
