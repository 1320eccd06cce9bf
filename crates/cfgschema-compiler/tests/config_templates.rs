//! Integration test: compiled templates as a configuration loader sees them.
//!
//! Covers the behavior a loader relies on: defaults for absent optional
//! keys, required keys, error paths into nested values, and idempotent
//! coercion.

use cfgschema_compiler::{
    compile, compile_with_options, CompileOptions, ConfigTemplate, PatternPropertiesMode,
    Presence, TemplateBuilder, TemplateKind, ValidationErrorKind,
};
use cfgschema_core::{CombinatorKind, ConstraintKind};
use serde_json::{json, Value};

fn service_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "listen": {
                "type": "object",
                "properties": {
                    "host": {"type": "string", "default": "0.0.0.0"},
                    "port": {"type": "integer", "minimum": 1, "maximum": 65535, "default": 8080}
                }
            },
            "log_level": {"enum": ["debug", "info", "warn", "error"], "default": "info"},
            "upstreams": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "url": {"type": "string", "format": "uri"},
                        "weight": {"type": "number", "exclusiveMinimum": 0, "default": 1}
                    },
                    "required": ["url"],
                    "additionalProperties": false
                },
                "minItems": 1
            }
        },
        "required": ["name", "upstreams"]
    })
}

#[test]
fn test_defaults_fill_absent_optional_keys() {
    let schema = compile(&service_schema()).unwrap();
    let out = schema
        .validate(&json!({
            "name": "edge",
            "listen": {},
            "upstreams": [{"url": "https://a.example.com"}]
        }))
        .unwrap();
    assert_eq!(
        out,
        json!({
            "name": "edge",
            "listen": {"host": "0.0.0.0", "port": 8080},
            "log_level": "info",
            "upstreams": [{"url": "https://a.example.com", "weight": 1}]
        })
    );
}

#[test]
fn test_absent_optional_object_without_default_stays_absent() {
    let schema = compile(&service_schema()).unwrap();
    let out = schema
        .validate(&json!({"name": "edge", "upstreams": [{"url": "https://a.example.com"}]}))
        .unwrap();
    assert!(out.get("listen").is_none());
}

#[test]
fn test_missing_required_key() {
    let schema = compile(&service_schema()).unwrap();
    let err = schema.validate(&json!({"name": "edge"})).unwrap_err();
    assert_eq!(err.to_string(), "(root): missing required property 'upstreams'");
}

#[test]
fn test_error_path_into_array_element() {
    let schema = compile(&service_schema()).unwrap();
    let err = schema
        .validate(&json!({
            "name": "edge",
            "upstreams": [{"url": "https://a.example.com"}, {"url": "not a uri"}]
        }))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/upstreams/1/url");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Format));
}

#[test]
fn test_closed_item_objects_reject_unknown_keys() {
    let schema = compile(&service_schema()).unwrap();
    let err = schema
        .validate(&json!({
            "name": "edge",
            "upstreams": [{"url": "https://a.example.com", "wieght": 2, "extra": 1}]
        }))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/upstreams/0");
    assert_eq!(
        err.kind,
        ValidationErrorKind::AdditionalProperties {
            names: vec!["extra".into(), "wieght".into()]
        }
    );
}

#[test]
fn test_enum_rejects_unlisted_value() {
    let schema = compile(&service_schema()).unwrap();
    let err = schema
        .validate(&json!({
            "name": "edge",
            "log_level": "trace",
            "upstreams": [{"url": "https://a.example.com"}]
        }))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/log_level");
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Membership));
}

#[test]
fn test_validated_output_revalidates_unchanged() {
    let schema = compile(&service_schema()).unwrap();
    let first = schema
        .validate(&json!({
            "name": "edge",
            "listen": {"port": 9000.0},
            "upstreams": [{"url": "https://a.example.com", "weight": 0.5}]
        }))
        .unwrap();
    assert_eq!(first["listen"]["port"], json!(9000));
    assert_eq!(schema.validate(&first).unwrap(), first);
}

#[test]
fn test_presence_and_defaults_through_protocol() {
    let schema = compile(&service_schema()).unwrap();
    let TemplateKind::Mapping(root) = schema.root().kind() else {
        panic!("expected a mapping");
    };
    let name: &dyn ConfigTemplate = root.property("name").unwrap();
    let level: &dyn ConfigTemplate = root.property("log_level").unwrap();
    assert!(name.is_required());
    assert_eq!(level.presence(), Presence::Optional);
    assert_eq!(level.default_value(), Some(&json!("info")));
    assert!(level.accepts(&json!("warn")));
    assert!(!level.accepts(&json!("loud")));
}

#[test]
fn test_pattern_properties_env_map() {
    let schema = json!({
        "type": "object",
        "properties": {
            "env": {
                "type": "object",
                "patternProperties": {
                    "^S_": {"type": "string"},
                    "^N_": {"type": "number"}
                },
                "additionalProperties": false
            }
        }
    });
    let compiled = compile(&schema).unwrap();
    assert!(compiled
        .validate(&json!({"env": {"S_name": "ok", "N_count": 5}}))
        .is_ok());
    let err = compiled
        .validate(&json!({"env": {"S_name": "ok", "S_count": 5}}))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/env/S_count");

    let options =
        CompileOptions::default().with_pattern_properties(PatternPropertiesMode::AllMatches);
    let compiled = compile_with_options(&schema, &options).unwrap();
    assert!(compiled.validate(&json!({"env": {"N_1": 1}})).is_ok());
}

#[test]
fn test_nullable_via_type_list_keeps_default() {
    let schema = compile(&json!({
        "type": "object",
        "properties": {"timeout": {"type": ["number", "null"], "default": null}}
    }))
    .unwrap();
    assert_eq!(schema.validate(&json!({})).unwrap(), json!({"timeout": null}));
    assert_eq!(
        schema.validate(&json!({"timeout": 2.5})).unwrap(),
        json!({"timeout": 2.5})
    );
    let err = schema.validate(&json!({"timeout": "2s"})).unwrap_err();
    assert!(matches!(
        err.kind,
        ValidationErrorKind::BranchesFailed {
            kind: CombinatorKind::Any,
            ..
        }
    ));
}

#[test]
fn test_compile_is_deterministic() {
    let a = compile(&service_schema()).unwrap();
    let b = compile(&service_schema()).unwrap();
    assert_eq!(format!("{:?}", a.root()), format!("{:?}", b.root()));
}

#[test]
fn test_builder_wraps_compiled_template() {
    let schema = compile(&json!({"type": "integer"})).unwrap();
    let port = TemplateBuilder::new(schema.root().clone())
        .default_value(json!(5432))
        .required(false)
        .build();
    assert_eq!(port.default_value(), Some(&json!(5432)));
    assert!(!port.is_required());
    assert_eq!(port.validate(&json!(6432.0)).unwrap(), json!(6432));
}

#[test]
fn test_integer_minimum_boundary() {
    let schema = compile(&json!({"type": "integer", "minimum": 5})).unwrap();
    assert!(schema.validate(&json!(3)).is_err());
    assert!(schema.validate(&json!(5)).is_ok());
    assert!(schema.validate(&json!(10)).is_ok());
}

#[test]
fn test_one_of_string_or_large_integer() {
    let schema = compile(&json!({
        "oneOf": [
            {"type": "string", "maxLength": 5},
            {"type": "integer", "minimum": 100}
        ]
    }))
    .unwrap();
    assert!(schema.validate(&json!("ab")).is_ok());
    assert!(schema.validate(&json!(150)).is_ok());
    assert!(schema.validate(&json!(50)).is_err());
    let err = schema.validate(&json!("toolongstring")).unwrap_err();
    assert!(matches!(err.kind, ValidationErrorKind::BranchesFailed { .. }));
}

#[test]
fn test_closed_tuple_rejects_extra_element() {
    let schema = compile(&json!({
        "prefixItems": [{"type": "string"}, {"type": "number"}],
        "items": false
    }))
    .unwrap();
    assert!(schema.validate(&json!(["a", 1])).is_ok());
    assert!(schema.validate(&json!(["a", 1, "extra"])).is_err());
}

#[test]
fn test_credit_card_requires_billing_address() {
    let schema = compile(&json!({
        "type": "object",
        "dependentRequired": {"credit_card": ["billing_address"]}
    }))
    .unwrap();
    let err = schema.validate(&json!({"credit_card": "4111"})).unwrap_err();
    assert_eq!(
        err.kind,
        ValidationErrorKind::DependentRequired {
            trigger: "credit_card".into(),
            missing: vec!["billing_address".into()]
        }
    );
    assert!(schema.validate(&json!({"name": "x"})).is_ok());
}
