//! `integer` and `number` nodes.

use cfgschema_core::SchemaError;
use serde_json::Value;

use crate::constraint::{Constraint, NumericRange};
use crate::node::SchemaNode;
use crate::template::{ScalarKind, Template};

pub(super) fn compile(node: &SchemaNode<'_>, kind: ScalarKind) -> Result<Template, SchemaError> {
    let range = range(node)?;
    check_range(node, &range)?;

    let mut constraints = Vec::new();
    if !range.is_unbounded() {
        constraints.push(Constraint::Range(range));
    }
    if let Some(divisor) = node.number("multipleOf")? {
        if divisor <= 0.0 {
            return Err(node.contradiction(format!(
                "multipleOf must be strictly positive, got {divisor}"
            )));
        }
        constraints.push(Constraint::MultipleOf(divisor));
    }
    Ok(Template::scalar(kind, constraints))
}

/// Reads the bounds. Boolean `exclusiveMinimum` / `exclusiveMaximum`
/// (draft 4) turn the matching inclusive bound exclusive.
fn range(node: &SchemaNode<'_>) -> Result<NumericRange, SchemaError> {
    let mut range = NumericRange {
        minimum: node.number("minimum")?,
        maximum: node.number("maximum")?,
        ..NumericRange::default()
    };
    match node.get("exclusiveMinimum") {
        Some(Value::Bool(true)) => range.exclusive_minimum = range.minimum.take(),
        Some(Value::Bool(false)) | None => {}
        Some(_) => range.exclusive_minimum = node.number("exclusiveMinimum")?,
    }
    match node.get("exclusiveMaximum") {
        Some(Value::Bool(true)) => range.exclusive_maximum = range.maximum.take(),
        Some(Value::Bool(false)) | None => {}
        Some(_) => range.exclusive_maximum = node.number("exclusiveMaximum")?,
    }
    Ok(range)
}

fn check_range(node: &SchemaNode<'_>, range: &NumericRange) -> Result<(), SchemaError> {
    let lower = [
        ("minimum", range.minimum, false),
        ("exclusiveMinimum", range.exclusive_minimum, true),
    ];
    let upper = [
        ("maximum", range.maximum, false),
        ("exclusiveMaximum", range.exclusive_maximum, true),
    ];
    for (low_name, low, low_exclusive) in lower {
        let Some(low) = low else { continue };
        for (high_name, high, high_exclusive) in upper {
            let Some(high) = high else { continue };
            let empty = if low_exclusive || high_exclusive {
                low >= high
            } else {
                low > high
            };
            if empty {
                return Err(node.contradiction(format!(
                    "{low_name} ({low}) leaves no room below {high_name} ({high})"
                )));
            }
        }
    }
    Ok(())
}
