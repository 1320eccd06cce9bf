//! `if` / `then` / `else`.

use cfgschema_core::CompileError;

use super::compile_node;
use crate::node::SchemaNode;
use crate::resolver::ResolutionContext;
use crate::template::{ConditionalTemplate, Template, TemplateKind};

pub(super) fn compile<'doc>(
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    let mut branch = |keyword: &str| -> Result<Option<Box<Template>>, CompileError> {
        node.get(keyword)
            .map(|schema| compile_node(schema, node.location(keyword), ctx).map(Box::new))
            .transpose()
    };
    let condition = branch("if")?.unwrap_or_else(|| Box::new(Template::any()));
    let then_branch = branch("then")?;
    let else_branch = branch("else")?;
    Ok(Template::new(TemplateKind::Conditional(ConditionalTemplate {
        condition,
        then_branch,
        else_branch,
    })))
}
