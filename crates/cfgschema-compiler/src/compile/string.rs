//! `string` nodes: length bounds, `pattern`, `format`.

use cfgschema_core::{CompileError, SchemaError, UnsupportedFeatureError};
use regex::Regex;
use tracing::warn;

use crate::constraint::Constraint;
use crate::format::{self, FormatSupport};
use crate::node::SchemaNode;
use crate::options::UnknownFormatPolicy;
use crate::resolver::ResolutionContext;
use crate::template::{ScalarKind, Template};

pub(super) fn compile(
    node: &SchemaNode<'_>,
    ctx: &ResolutionContext<'_>,
) -> Result<Template, CompileError> {
    let mut kind = ScalarKind::String;
    let mut constraints = Vec::new();

    let min = node.count("minLength")?;
    let max = node.count("maxLength")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(node
                .contradiction(format!("minLength ({min}) exceeds maxLength ({max})"))
                .into());
        }
    }
    if min.is_some() || max.is_some() {
        constraints.push(Constraint::Length { min, max });
    }

    if let Some(pattern) = node.string("pattern")? {
        constraints.push(Constraint::Pattern(compile_pattern(
            pattern,
            &node.location("pattern").to_string(),
        )?));
    }

    if let Some(name) = node.string("format")? {
        match format::lookup(name) {
            FormatSupport::Validated(format) => constraints.push(Constraint::Format(format)),
            FormatSupport::PathKind => kind = ScalarKind::Path,
            FormatSupport::Unknown => match ctx.options().unknown_formats {
                UnknownFormatPolicy::Ignore => {
                    warn!(at = %node.location("format"), format = name, "unknown format ignored");
                }
                UnknownFormatPolicy::Reject => {
                    return Err(UnsupportedFeatureError {
                        at: node.location("format").to_string(),
                        keyword: "format".to_string(),
                        value: name.to_string(),
                    }
                    .into());
                }
            },
        }
    }

    Ok(Template::scalar(kind, constraints))
}

/// Compile a schema regex. Used for `pattern` and `patternProperties` keys.
pub(super) fn compile_pattern(pattern: &str, at: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
        at: at.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
