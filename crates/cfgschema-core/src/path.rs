//! # Instance Paths
//!
//! Locations inside a validated value. Errors are raised at the innermost
//! template and each enclosing container prefixes its own segment, so the
//! stored order is outermost first.

use std::collections::VecDeque;
use std::fmt;

/// A step from a container into one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// The value of an object property.
    Property(String),
    /// An array element.
    Index(usize),
    /// The key itself, as checked by `propertyNames`.
    PropertyName(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(name) => write!(f, "/{}", escape(name)),
            PathSegment::Index(index) => write!(f, "/{index}"),
            PathSegment::PropertyName(name) => write!(f, "/{}[key]", escape(name)),
        }
    }
}

/// Path from the root of a validated value to a nested value.
///
/// Displays as a JSON pointer (`/servers/0/port`), or `(root)` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath(VecDeque<PathSegment>);

impl InstancePath {
    /// The empty path.
    pub fn root() -> Self {
        Self(VecDeque::new())
    }

    /// True when the path addresses the root value.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prepend an enclosing segment.
    pub fn push_front(&mut self, segment: PathSegment) {
        self.0.push_front(segment);
    }

    /// Segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl FromIterator<PathSegment> for InstancePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for segment in &self.0 {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// RFC 6901 escaping for a single reference token.
pub(crate) fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
