//! # Reference Resolver
//!
//! Resolves `$ref` fragments against the root document and tracks the
//! references currently being compiled. A reference to a pointer that is
//! already on the active stack closes a cycle: the compiler emits a
//! deferred node instead of recursing, and the target's compiled template
//! is recorded so the deferred node can reach it at validation time.
//!
//! ## Invariants
//!
//! - Only `#` and `#/...` fragments resolve. Anything else is a
//!   [`SchemaError`].
//! - The active stack is strictly nested: every `enter` is matched by an
//!   `exit` before the caller returns.
//! - Every cycle compiles, including `{"$ref": "#"}` at the root. A cycle
//!   that can revisit its start without descending into a child value is
//!   logged here and rejected per value at validation time with a
//!   [`CycleError`](cfgschema_core::CycleError).
//! - Every pointer compiles at most once; later references reuse the
//!   compiled template.

use std::collections::{HashMap, HashSet};
use std::sync::Weak;

use cfgschema_core::{SchemaError, SchemaPointer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::options::CompileOptions;
use crate::template::{DeferredTable, Template};

/// Outcome of resolving one `$ref`.
pub(crate) enum Resolution<'doc> {
    /// Compile `node` with `pointer` pushed on the active stack.
    Target {
        pointer: SchemaPointer,
        node: &'doc Value,
    },
    /// The pointer is being compiled further up the stack.
    Deferred(Template),
    /// The pointer compiled earlier.
    Memoized(Template),
}

/// Compilation state threaded through every node of one document.
pub(crate) struct ResolutionContext<'doc> {
    root: &'doc Value,
    options: CompileOptions,
    active: Vec<SchemaPointer>,
    cycle_chains: HashMap<SchemaPointer, Vec<String>>,
    compiled: HashMap<SchemaPointer, Template>,
    targets: HashMap<SchemaPointer, Template>,
    table: Weak<DeferredTable>,
}

impl<'doc> ResolutionContext<'doc> {
    pub(crate) fn new(root: &'doc Value, options: CompileOptions, table: Weak<DeferredTable>) -> Self {
        Self {
            root,
            options,
            active: Vec::new(),
            cycle_chains: HashMap::new(),
            compiled: HashMap::new(),
            targets: HashMap::new(),
            table,
        }
    }

    pub(crate) fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub(crate) fn is_active(&self, pointer: &SchemaPointer) -> bool {
        self.active.contains(pointer)
    }

    /// Resolve a `$ref` found at schema location `at`.
    pub(crate) fn resolve(
        &mut self,
        reference: &str,
        at: &SchemaPointer,
    ) -> Result<Resolution<'doc>, SchemaError> {
        if !reference.starts_with('#') {
            return Err(SchemaError::ExternalReference {
                at: at.to_string(),
                reference: reference.to_string(),
            });
        }
        let pointer = SchemaPointer::parse(reference).ok_or_else(|| SchemaError::InvalidPointer {
            at: at.to_string(),
            reference: reference.to_string(),
        })?;

        if self.is_active(&pointer) {
            debug!(pointer = %pointer, depth = self.active.len(), "reference closes a cycle; deferring");
            let chain = self
                .active
                .iter()
                .map(ToString::to_string)
                .chain(std::iter::once(pointer.to_string()))
                .collect();
            self.cycle_chains.entry(pointer.clone()).or_insert(chain);
            return Ok(Resolution::Deferred(Template::deferred(
                pointer,
                self.table.clone(),
            )));
        }

        if let Some(template) = self.compiled.get(&pointer) {
            debug!(pointer = %pointer, "reusing compiled reference target");
            return Ok(Resolution::Memoized(template.clone()));
        }

        let node = self.walk(&pointer).map_err(|reason| SchemaError::UnresolvedReference {
            at: at.to_string(),
            reference: reference.to_string(),
            reason,
        })?;
        Ok(Resolution::Target { pointer, node })
    }

    pub(crate) fn enter(&mut self, pointer: SchemaPointer) {
        self.active.push(pointer);
    }

    pub(crate) fn exit(&mut self) {
        self.active.pop();
    }

    /// Record the compiled template of a reference target.
    ///
    /// If some reference deferred to this pointer while it was active, the
    /// template becomes a deferred target.
    pub(crate) fn complete(&mut self, pointer: &SchemaPointer, template: &Template) {
        if let Some(chain) = self.cycle_chains.remove(pointer) {
            if template.reaches_unguarded(pointer, &self.targets, &mut HashSet::new()) {
                warn!(
                    pointer = %pointer,
                    chain = %chain.join(" -> "),
                    "reference cycle never descends into the value; values reaching it fail validation"
                );
            }
            self.targets.insert(pointer.clone(), template.clone());
        }
        self.compiled.insert(pointer.clone(), template.clone());
    }

    /// Hand over the deferred targets once the document has compiled.
    pub(crate) fn into_targets(self) -> HashMap<SchemaPointer, Template> {
        self.targets
    }

    fn walk(&self, pointer: &SchemaPointer) -> Result<&'doc Value, String> {
        let mut current = self.root;
        for token in pointer.tokens() {
            current = match current {
                Value::Object(map) => map
                    .get(&*token)
                    .ok_or_else(|| format!("no key '{token}'"))?,
                Value::Array(items) => token
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .ok_or_else(|| format!("no array element '{token}'"))?,
                _ => return Err(format!("cannot descend into a scalar at '{token}'")),
            };
        }
        Ok(current)
    }
}
