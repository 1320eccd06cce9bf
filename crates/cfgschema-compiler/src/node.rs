//! Typed keyword access over one schema object.
//!
//! Every accessor returns `Ok(None)` when the keyword is absent and a
//! [`SchemaError::InvalidKeyword`] carrying the keyword's location when it
//! has the wrong shape.

use cfgschema_core::{SchemaError, SchemaPointer};
use serde_json::{Map, Value};

pub(crate) struct SchemaNode<'doc> {
    map: &'doc Map<String, Value>,
    at: SchemaPointer,
}

impl<'doc> SchemaNode<'doc> {
    pub(crate) fn new(map: &'doc Map<String, Value>, at: SchemaPointer) -> Self {
        Self { map, at }
    }

    pub(crate) fn at(&self) -> &SchemaPointer {
        &self.at
    }

    /// Location of a keyword inside this node.
    pub(crate) fn location(&self, keyword: &str) -> SchemaPointer {
        self.at.child(keyword)
    }

    pub(crate) fn get(&self, keyword: &str) -> Option<&'doc Value> {
        self.map.get(keyword)
    }

    pub(crate) fn has(&self, keyword: &str) -> bool {
        self.map.contains_key(keyword)
    }

    pub(crate) fn has_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.has(keyword))
    }

    pub(crate) fn invalid(&self, keyword: &str, expected: &'static str) -> SchemaError {
        SchemaError::InvalidKeyword {
            at: self.location(keyword).to_string(),
            keyword: keyword.to_string(),
            expected,
        }
    }

    pub(crate) fn contradiction(&self, detail: impl Into<String>) -> SchemaError {
        SchemaError::Contradiction {
            at: self.at.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn string(&self, keyword: &str) -> Result<Option<&'doc str>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(keyword, "a string")),
        }
    }

    pub(crate) fn boolean(&self, keyword: &str) -> Result<Option<bool>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(keyword, "a boolean")),
        }
    }

    pub(crate) fn number(&self, keyword: &str) -> Result<Option<f64>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(keyword, "a finite number")),
            Some(_) => Err(self.invalid(keyword, "a number")),
        }
    }

    /// Non-negative integer; integral floats such as `3.0` are accepted.
    pub(crate) fn count(&self, keyword: &str) -> Result<Option<u64>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(u) = n.as_u64() {
                    return Ok(Some(u));
                }
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                        Ok(Some(f as u64))
                    }
                    _ => Err(self.invalid(keyword, "a non-negative integer")),
                }
            }
            Some(_) => Err(self.invalid(keyword, "a non-negative integer")),
        }
    }

    pub(crate) fn string_list(&self, keyword: &str) -> Result<Option<Vec<&'doc str>>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(value) => string_list(value)
                .map(Some)
                .ok_or_else(|| self.invalid(keyword, "an array of strings")),
        }
    }

    /// Non-empty array of sub-schemas.
    pub(crate) fn schema_list(&self, keyword: &str) -> Result<Option<&'doc [Value]>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Array(list)) if !list.is_empty() => Ok(Some(list.as_slice())),
            Some(_) => Err(self.invalid(keyword, "a non-empty array of schemas")),
        }
    }

    /// Object whose values are sub-schemas (or other per-key data).
    pub(crate) fn object(
        &self,
        keyword: &str,
    ) -> Result<Option<&'doc Map<String, Value>>, SchemaError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(self.invalid(keyword, "an object")),
        }
    }
}

pub(crate) fn string_list(value: &Value) -> Option<Vec<&str>> {
    match value {
        Value::Array(items) => items.iter().map(Value::as_str).collect(),
        _ => None,
    }
}
