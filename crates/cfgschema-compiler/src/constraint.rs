//! # Constraints
//!
//! Predicates attached to scalar, sequence and mapping templates. A
//! constraint only inspects values of the JSON type it applies to; the
//! template's own type check runs first, so a constraint never sees a value
//! of the wrong type in practice.
//!
//! ## Invariants
//!
//! - String length counts Unicode scalar values, not bytes.
//! - `pattern` is a search, not a full match: `"b"` matches `"abc"`.
//! - Numeric comparisons treat `1` and `1.0` as equal.

use cfgschema_core::{json_equal, number_value, ConstraintKind, ValidationError};
use regex::Regex;
use serde_json::Value;

use crate::format::Format;
use crate::template::Template;

/// Tolerance for floating-point `multipleOf`.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Numeric bounds from `minimum`, `maximum`, `exclusiveMinimum` and
/// `exclusiveMaximum`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericRange {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
}

impl NumericRange {
    pub fn is_unbounded(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.exclusive_minimum.is_none()
            && self.exclusive_maximum.is_none()
    }

    fn violation(&self, n: f64) -> Option<String> {
        if let Some(min) = self.minimum {
            if n < min {
                return Some(format!("must be at least {min}"));
            }
        }
        if let Some(max) = self.maximum {
            if n > max {
                return Some(format!("must be at most {max}"));
            }
        }
        if let Some(min) = self.exclusive_minimum {
            if n <= min {
                return Some(format!("must be greater than {min}"));
            }
        }
        if let Some(max) = self.exclusive_maximum {
            if n >= max {
                return Some(format!("must be less than {max}"));
            }
        }
        None
    }
}

/// A single constraint predicate.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// String length bounds, in characters.
    Length { min: Option<u64>, max: Option<u64> },
    /// Regex search over the string.
    Pattern(Regex),
    /// Named string format.
    Format(Format),
    /// Numeric bounds.
    Range(NumericRange),
    /// Value must be an exact multiple of the divisor.
    MultipleOf(f64),
    /// Array length bounds.
    ItemCount { min: Option<u64>, max: Option<u64> },
    /// No two array elements are equal.
    UniqueItems,
    /// Between `min` and `max` array elements satisfy `template`.
    Contains {
        template: Box<Template>,
        min: u64,
        max: Option<u64>,
    },
    /// Object property-count bounds.
    PropertyCount { min: Option<u64>, max: Option<u64> },
    /// Value must equal one of the listed values (`const` / `enum`).
    Membership(Vec<Value>),
}

impl Constraint {
    /// The kind reported when this constraint rejects a value.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Length { .. } => ConstraintKind::Length,
            Self::Pattern(_) => ConstraintKind::Pattern,
            Self::Format(_) => ConstraintKind::Format,
            Self::Range(_) => ConstraintKind::Range,
            Self::MultipleOf(_) => ConstraintKind::MultipleOf,
            Self::ItemCount { .. } => ConstraintKind::ItemCount,
            Self::UniqueItems => ConstraintKind::UniqueItems,
            Self::Contains { .. } => ConstraintKind::Contains,
            Self::PropertyCount { .. } => ConstraintKind::PropertyCount,
            Self::Membership(_) => ConstraintKind::Membership,
        }
    }

    /// Check the predicate against a value.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match self.violation(value) {
            Some(message) => Err(ValidationError::constraint(self.kind(), message)),
            None => Ok(()),
        }
    }

    fn violation(&self, value: &Value) -> Option<String> {
        match (self, value) {
            (Self::Length { min, max }, Value::String(s)) => {
                count_violation(s.chars().count(), *min, *max, "characters long", "be")
            }
            (Self::Pattern(regex), Value::String(s)) => {
                (!regex.is_match(s)).then(|| format!("must match pattern '{}'", regex.as_str()))
            }
            (Self::Format(format), Value::String(s)) => {
                (!format.is_valid(s)).then(|| format!("must be a valid {format}"))
            }
            (Self::Range(range), Value::Number(_)) => {
                number_value(value).and_then(|n| range.violation(n))
            }
            (Self::MultipleOf(divisor), Value::Number(_)) => (!is_multiple_of(value, *divisor))
                .then(|| format!("must be a multiple of {divisor}")),
            (Self::ItemCount { min, max }, Value::Array(items)) => {
                count_violation(items.len(), *min, *max, "items", "have")
            }
            (Self::UniqueItems, Value::Array(items)) => duplicate_pair(items)
                .map(|(i, j)| format!("all items must be unique; items {i} and {j} are equal")),
            (Self::Contains { template, min, max }, Value::Array(items)) => {
                let count = items
                    .iter()
                    .filter(|item| template.validate(item).is_ok())
                    .count() as u64;
                if count < *min {
                    Some(format!(
                        "must contain at least {min} matching items, found {count}"
                    ))
                } else {
                    max.filter(|max| count > *max).map(|max| {
                        format!("must contain at most {max} matching items, found {count}")
                    })
                }
            }
            (Self::PropertyCount { min, max }, Value::Object(map)) => {
                count_violation(map.len(), *min, *max, "properties", "have")
            }
            (Self::Membership(allowed), _) => {
                if allowed.iter().any(|candidate| json_equal(candidate, value)) {
                    None
                } else if let [only] = allowed.as_slice() {
                    Some(format!("must equal {only}"))
                } else {
                    let listed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                    Some(format!("must be one of [{}]", listed.join(", ")))
                }
            }
            _ => None,
        }
    }
}

/// Run every constraint in order; the first failure wins.
pub(crate) fn check_all(constraints: &[Constraint], value: &Value) -> Result<(), ValidationError> {
    constraints.iter().try_for_each(|c| c.check(value))
}

fn count_violation(
    count: usize,
    min: Option<u64>,
    max: Option<u64>,
    unit: &str,
    verb: &str,
) -> Option<String> {
    let count = count as u64;
    if let Some(min) = min.filter(|min| count < *min) {
        return Some(format!("must {verb} at least {min} {unit}"));
    }
    max.filter(|max| count > *max)
        .map(|max| format!("must {verb} at most {max} {unit}"))
}

fn duplicate_pair(items: &[Value]) -> Option<(usize, usize)> {
    items.iter().enumerate().find_map(|(i, a)| {
        items[i + 1..]
            .iter()
            .position(|b| json_equal(a, b))
            .map(|offset| (i, i + 1 + offset))
    })
}

fn is_multiple_of(value: &Value, divisor: f64) -> bool {
    if let Some(n) = value.as_i64() {
        if divisor.fract() == 0.0 && divisor.abs() <= i64::MAX as f64 {
            return n % (divisor as i64) == 0;
        }
    }
    let Some(n) = number_value(value) else {
        return false;
    };
    let remainder = (n % divisor).abs();
    remainder < MULTIPLE_OF_EPSILON || (divisor.abs() - remainder).abs() < MULTIPLE_OF_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{ScalarKind, Template};
    use serde_json::json;

    fn message(constraint: &Constraint, value: Value) -> String {
        match constraint.check(&value) {
            Err(err) => err.kind.to_string(),
            Ok(()) => panic!("expected {value} to be rejected"),
        }
    }

    #[test]
    fn test_length_counts_characters() {
        let c = Constraint::Length {
            min: Some(2),
            max: Some(3),
        };
        assert!(c.check(&json!("héé")).is_ok());
        assert_eq!(message(&c, json!("a")), "must be at least 2 characters long");
        assert_eq!(message(&c, json!("abcd")), "must be at most 3 characters long");
    }

    #[test]
    fn test_pattern_is_search() {
        let c = Constraint::Pattern(Regex::new("b").unwrap());
        assert!(c.check(&json!("abc")).is_ok());
        assert_eq!(message(&c, json!("xyz")), "must match pattern 'b'");
        assert_eq!(c.check(&json!("xyz")).unwrap_err().constraint_kind(), Some(ConstraintKind::Pattern));
    }

    #[test]
    fn test_range_bounds() {
        let c = Constraint::Range(NumericRange {
            minimum: Some(1.0),
            exclusive_maximum: Some(10.0),
            ..NumericRange::default()
        });
        assert!(c.check(&json!(1)).is_ok());
        assert!(c.check(&json!(9.5)).is_ok());
        assert_eq!(message(&c, json!(0)), "must be at least 1");
        assert_eq!(message(&c, json!(10)), "must be less than 10");
    }

    #[test]
    fn test_multiple_of_integer_and_float() {
        let c = Constraint::MultipleOf(5.0);
        assert!(c.check(&json!(15)).is_ok());
        assert!(c.check(&json!(-10)).is_ok());
        assert_eq!(message(&c, json!(7)), "must be a multiple of 5");

        let c = Constraint::MultipleOf(0.1);
        assert!(c.check(&json!(0.3)).is_ok());
        assert!(c.check(&json!(2)).is_ok());
        assert!(c.check(&json!(0.35)).is_err());
    }

    #[test]
    fn test_unique_items_reports_first_pair() {
        let c = Constraint::UniqueItems;
        assert!(c.check(&json!([1, 2, 3])).is_ok());
        assert_eq!(
            message(&c, json!([1, 2, 1.0])),
            "all items must be unique; items 0 and 2 are equal"
        );
    }

    #[test]
    fn test_contains_min_and_max() {
        let c = Constraint::Contains {
            template: Box::new(Template::scalar(ScalarKind::String, Vec::new())),
            min: 1,
            max: Some(2),
        };
        assert!(c.check(&json!([1, "a"])).is_ok());
        assert_eq!(message(&c, json!([1, 2])), "must contain at least 1 matching items, found 0");
        assert_eq!(
            message(&c, json!(["a", "b", "c"])),
            "must contain at most 2 matching items, found 3"
        );
    }

    #[test]
    fn test_membership_uses_numeric_equality() {
        let c = Constraint::Membership(vec![json!(1), json!("one")]);
        assert!(c.check(&json!(1.0)).is_ok());
        assert_eq!(message(&c, json!(2)), "must be one of [1, \"one\"]");
        let c = Constraint::Membership(vec![json!("prod")]);
        assert_eq!(message(&c, json!("dev")), "must equal \"prod\"");
    }

    #[test]
    fn test_property_and_item_counts() {
        let c = Constraint::PropertyCount {
            min: Some(1),
            max: None,
        };
        assert_eq!(message(&c, json!({})), "must have at least 1 properties");
        let c = Constraint::ItemCount {
            min: None,
            max: Some(1),
        };
        assert_eq!(message(&c, json!([1, 2])), "must have at most 1 items");
    }

    #[test]
    fn test_type_specific_constraints_ignore_other_types() {
        let c = Constraint::Length {
            min: Some(5),
            max: None,
        };
        assert!(c.check(&json!(3)).is_ok());
        assert!(Constraint::UniqueItems.check(&json!("aa")).is_ok());
    }
}
