//! # Template Builder
//!
//! Final assembly of a template node: the literal `default` and the
//! required/optional status decided by the parent mapping's `required`
//! list. The compiler uses it for every node; host applications can use it
//! to wrap hand-built templates the same way.

use cfgschema_core::Presence;
use serde_json::Value;

use crate::node::SchemaNode;
use crate::template::Template;

/// Attaches a default and presence to a compiled node.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    template: Template,
}

impl TemplateBuilder {
    pub fn new(template: Template) -> Self {
        Self { template }
    }

    /// Literal default, stored verbatim.
    #[must_use]
    pub fn default_value(mut self, default: Value) -> Self {
        self.template.default = Some(default);
        self
    }

    #[must_use]
    pub fn presence(mut self, presence: Presence) -> Self {
        self.template.presence = presence;
        self
    }

    #[must_use]
    pub fn required(self, required: bool) -> Self {
        self.presence(if required {
            Presence::Required
        } else {
            Presence::Optional
        })
    }

    pub fn build(self) -> Template {
        self.template
    }
}

/// Attach the node's own `default`, if any.
pub(crate) fn annotate(template: Template, node: &SchemaNode<'_>) -> Template {
    match node.get("default") {
        Some(default) => TemplateBuilder::new(template)
            .default_value(default.clone())
            .build(),
        None => template,
    }
}

/// Mark a property template required or optional.
pub(crate) fn property(template: Template, required: bool) -> Template {
    TemplateBuilder::new(template).required(required).build()
}
