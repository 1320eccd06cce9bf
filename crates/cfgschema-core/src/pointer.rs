//! # Schema Pointers
//!
//! `SchemaPointer` addresses a location inside a schema document using the
//! URI-fragment form of an RFC 6901 JSON pointer: `#` for the document root,
//! `#/$defs/server/properties/port` for nested locations.
//!
//! The same type names `$ref` targets and the schema locations reported in
//! compile errors, so both read the same way.

use std::borrow::Cow;
use std::fmt;

use crate::path::escape;

/// A `#`-prefixed JSON pointer into a schema document.
///
/// # Invariants
///
/// The inner string is either `#` or starts with `#/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaPointer(String);

impl SchemaPointer {
    /// The document root, `#`.
    pub fn root() -> Self {
        Self("#".to_string())
    }

    /// Parse a fragment reference. Returns `None` unless the input is `#`
    /// or starts with `#/`.
    pub fn parse(reference: &str) -> Option<Self> {
        if reference == "#" || reference.starts_with("#/") {
            Some(Self(reference.to_string()))
        } else {
            None
        }
    }

    /// Extend the pointer by one unescaped reference token.
    #[must_use]
    pub fn child(&self, token: &str) -> Self {
        Self(format!("{}/{}", self.0, escape(token)))
    }

    /// Extend the pointer by an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}/{index}", self.0))
    }

    /// True for `#`.
    pub fn is_root(&self) -> bool {
        self.0 == "#"
    }

    /// The pointer as written, including the leading `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unescaped reference tokens, root first.
    pub fn tokens(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.0
            .strip_prefix("#/")
            .into_iter()
            .flat_map(|rest| rest.split('/'))
            .map(unescape)
    }
}

impl fmt::Display for SchemaPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SchemaPointer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn unescape(token: &str) -> Cow<'_, str> {
    if token.contains('~') {
        Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_and_nested() {
        assert!(SchemaPointer::parse("#").unwrap().is_root());
        let p = SchemaPointer::parse("#/$defs/node").unwrap();
        assert_eq!(p.tokens().collect::<Vec<_>>(), vec!["$defs", "node"]);
    }

    #[test]
    fn test_parse_rejects_non_pointer_fragments() {
        assert!(SchemaPointer::parse("#anchor").is_none());
        assert!(SchemaPointer::parse("other.json#/a").is_none());
        assert!(SchemaPointer::parse("").is_none());
    }

    #[test]
    fn test_root_has_no_tokens() {
        assert_eq!(SchemaPointer::root().tokens().count(), 0);
    }

    #[test]
    fn test_tokens_unescape_in_order() {
        let p = SchemaPointer::parse("#/a~1b/c~0d/~01").unwrap();
        assert_eq!(p.tokens().collect::<Vec<_>>(), vec!["a/b", "c~d", "~1"]);
    }

    #[test]
    fn test_child_escapes() {
        let p = SchemaPointer::root().child("properties").child("a/b").index(3);
        assert_eq!(p.as_str(), "#/properties/a~1b/3");
        assert_eq!(p.to_string(), "#/properties/a~1b/3");
    }
}
