//! Property tests over compiled templates.

use cfgschema_compiler::compile;
use proptest::prelude::*;
use serde_json::{json, Value};

fn config_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        (-1000i64..1000).prop_map(|n| json!(n as f64)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn settings_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": {"type": ["integer", "null"], "default": 0},
            "b": {"type": "string", "maxLength": 4, "default": "x"},
            "c": {"type": "array", "items": {"type": "number"}}
        }
    })
}

proptest! {
    /// Validating a validated value returns it unchanged.
    #[test]
    fn validated_output_is_a_fixed_point(value in config_value()) {
        let schema = compile(&settings_schema()).unwrap();
        if let Ok(first) = schema.validate(&value) {
            let second = schema.validate(&first);
            prop_assert_eq!(second.as_ref().ok(), Some(&first));
        }
    }

    /// Integral floats validate as integers and come back as integers.
    #[test]
    fn integral_floats_coerce(n in -1_000_000i64..1_000_000) {
        let schema = compile(&json!({"type": "integer"})).unwrap();
        prop_assert_eq!(schema.validate(&json!(n as f64)).unwrap(), json!(n));
    }

    /// Length bounds count characters.
    #[test]
    fn length_bounds_count_chars(s in "\\PC{0,12}", min in 0u64..6, extra in 0u64..6) {
        let max = min + extra;
        let schema = compile(&json!({"type": "string", "minLength": min, "maxLength": max})).unwrap();
        let len = s.chars().count() as u64;
        prop_assert_eq!(schema.validate(&json!(s)).is_ok(), (min..=max).contains(&len));
    }

    /// Compiling the same document twice yields the same tree.
    #[test]
    fn compilation_is_deterministic(min in 0i64..10, span in 0i64..10) {
        let doc = json!({"type": "integer", "minimum": min, "maximum": min + span});
        let a = compile(&doc).unwrap();
        let b = compile(&doc).unwrap();
        prop_assert_eq!(format!("{:?}", a.root()), format!("{:?}", b.root()));
    }
}
