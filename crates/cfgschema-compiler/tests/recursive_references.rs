//! Integration test: `$ref` resolution across a whole document.
//!
//! Recursive schemas must compile to finite trees whose deferred nodes
//! reach their targets at validation time; reference chains that never
//! descend into the value must fail when a value reaches them.

use cfgschema_compiler::{
    compile, CompileError, ConfigTemplate, CycleError, SchemaError, TemplateKind,
    ValidationErrorKind,
};
use serde_json::{json, Value};

fn tree_schema() -> Value {
    json!({
        "$defs": {
            "node": {
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "children": {"type": "array", "items": {"$ref": "#/$defs/node"}}
                },
                "required": ["value"]
            }
        },
        "$ref": "#/$defs/node"
    })
}

#[test]
fn test_recursive_tree_validates_at_depth() {
    let schema = compile(&tree_schema()).unwrap();
    let value = json!({
        "value": 1,
        "children": [
            {"value": 2, "children": [{"value": 3.0}]},
            {"value": 4}
        ]
    });
    let validated = schema.validate(&value).unwrap();
    assert_eq!(validated["children"][0]["children"][0]["value"], json!(3));

    let err = schema
        .validate(&json!({"value": 1, "children": [{"value": 2, "children": [{"value": "x"}]}]}))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/children/0/children/0/value");
}

#[test]
fn test_cycle_point_is_deferred() {
    let schema = compile(&tree_schema()).unwrap();
    let TemplateKind::Mapping(node) = schema.root().kind() else {
        panic!("expected the root to compile to a mapping");
    };
    let TemplateKind::Sequence(children) = node.property("children").unwrap().kind() else {
        panic!("expected children to compile to a sequence");
    };
    let cfgschema_compiler::ItemsPolicy::Template(item) = children.items() else {
        panic!("expected an item template");
    };
    assert_eq!(item.deferred_pointer().unwrap().as_str(), "#/$defs/node");

    let table = schema.deferred_targets();
    assert_eq!(table.len(), 1);
    assert_eq!(table.pointers()[0].as_str(), "#/$defs/node");
}

#[test]
fn test_root_self_reference_below_container() {
    let schema = compile(&json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "child": {"$ref": "#"}
        },
        "additionalProperties": false
    }))
    .unwrap();
    assert!(schema
        .validate(&json!({"name": "a", "child": {"name": "b", "child": {}}}))
        .is_ok());
    let err = schema
        .validate(&json!({"child": {"child": {"extra": 1}}}))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/child/child");
    assert_eq!(
        err.kind,
        ValidationErrorKind::AdditionalProperties {
            names: vec!["extra".into()]
        }
    );
}

#[test]
fn test_mutual_recursion_through_nullable_link() {
    let schema = compile(&json!({
        "$defs": {
            "list": {
                "type": "object",
                "properties": {
                    "head": {"type": "integer"},
                    "tail": {"$ref": "#/$defs/tail"}
                },
                "required": ["head", "tail"]
            },
            "tail": {"anyOf": [{"type": "null"}, {"$ref": "#/$defs/list"}]}
        },
        "$ref": "#/$defs/list"
    }))
    .unwrap();
    let list = json!({"head": 1, "tail": {"head": 2, "tail": {"head": 3, "tail": null}}});
    assert_eq!(schema.validate(&list).unwrap(), list);
    assert!(schema
        .validate(&json!({"head": 1, "tail": {"head": "two", "tail": null}}))
        .is_err());
}

#[test]
fn test_bare_root_self_reference_is_deferred() {
    let schema = compile(&json!({"$ref": "#"})).unwrap();
    assert_eq!(schema.root().deferred_pointer().unwrap().as_str(), "#");
    assert_eq!(schema.deferred_targets().pointers()[0].as_str(), "#");

    let err = schema.validate(&json!({"any": "value"})).unwrap_err();
    assert_eq!(
        err.kind,
        ValidationErrorKind::Cycle(CycleError {
            pointer: "#".into(),
            chain: vec!["#".into(), "#".into()],
        })
    );
}

#[test]
fn test_pure_reference_chain_fails_at_validation() {
    let schema = compile(&json!({
        "$defs": {
            "a": {"$ref": "#/$defs/b"},
            "b": {"$ref": "#/$defs/a"}
        },
        "$ref": "#/$defs/a"
    }))
    .unwrap();
    assert_eq!(schema.root().deferred_pointer().unwrap().as_str(), "#/$defs/a");
    match schema.validate(&json!(1)).unwrap_err().kind {
        ValidationErrorKind::Cycle(err) => {
            assert_eq!(err.pointer, "#/$defs/a");
            assert_eq!(err.chain, vec!["#/$defs/a", "#/$defs/a"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_cycle_through_combinator_rejects_only_values_reaching_it() {
    let schema = compile(&json!({
        "$defs": {"a": {"anyOf": [{"type": "string"}, {"$ref": "#/$defs/a"}]}},
        "$ref": "#/$defs/a"
    }))
    .unwrap();
    assert!(schema.validate(&json!("text")).is_ok());
    let err = schema.validate(&json!(5)).unwrap_err();
    assert!(err.to_string().contains("reference cycle"), "{err}");
}

#[test]
fn test_property_names_refer_to_untyped_root() {
    let schema = compile(&json!({
        "properties": {"name": {"type": "string"}},
        "propertyNames": {"$ref": "#"}
    }))
    .unwrap();
    assert!(schema.validate(&json!({"name": "a", "other": 1})).is_ok());
    assert!(schema.validate(&json!({"name": 1})).is_err());
    assert!(schema.validate(&json!(42)).is_ok());
}

#[test]
fn test_shared_definition_used_twice() {
    let schema = compile(&json!({
        "$defs": {"port": {"type": "integer", "minimum": 1, "maximum": 65535}},
        "type": "object",
        "properties": {
            "http": {"$ref": "#/$defs/port"},
            "https": {"$ref": "#/$defs/port", "default": 443}
        }
    }))
    .unwrap();
    assert_eq!(
        schema.validate(&json!({"http": 80})).unwrap(),
        json!({"http": 80, "https": 443})
    );
    assert_eq!(
        schema.validate(&json!({"https": 0})).unwrap_err().path.to_string(),
        "/https"
    );
    assert!(schema.deferred_targets().is_empty());
}

#[test]
fn test_escaped_pointer_tokens() {
    let schema = compile(&json!({
        "$defs": {"a/b": {"type": "string"}, "c~d": {"type": "integer"}},
        "type": "array",
        "prefixItems": [{"$ref": "#/$defs/a~1b"}, {"$ref": "#/$defs/c~0d"}]
    }))
    .unwrap();
    assert!(schema.validate(&json!(["x", 1])).is_ok());
    assert!(schema.validate(&json!([1, "x"])).is_err());
}

#[test]
fn test_reference_errors() {
    let cases = [
        (json!({"$ref": "other.json#/a"}), "external"),
        (json!({"$ref": "#anchor"}), "pointer"),
        (json!({"$ref": "#/$defs/missing"}), "unresolved"),
        (json!({"$ref": 5}), "keyword"),
    ];
    for (schema, case) in cases {
        let err = compile(&schema).unwrap_err();
        let matched = match (&err, case) {
            (CompileError::Schema(SchemaError::ExternalReference { at, .. }), "external")
            | (CompileError::Schema(SchemaError::InvalidPointer { at, .. }), "pointer")
            | (CompileError::Schema(SchemaError::UnresolvedReference { at, .. }), "unresolved")
            | (CompileError::Schema(SchemaError::InvalidKeyword { at, .. }), "keyword") => {
                at == "#/$ref"
            }
            _ => false,
        };
        assert!(matched, "case {case}: unexpected {err:?}");
    }
}

#[test]
fn test_deferred_nodes_outliving_schema_report_unresolved() {
    let schema = compile(&tree_schema()).unwrap();
    let root = schema.root().clone();
    drop(schema);

    assert!(root.validate(&json!({"value": 1})).is_ok());
    let err = root
        .validate(&json!({"value": 1, "children": [{"value": 2}]}))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "/children/0");
    assert_eq!(
        err.kind,
        ValidationErrorKind::UnresolvedDeferred {
            pointer: "#/$defs/node".into()
        }
    );
}

#[test]
fn test_compiled_schema_is_shareable_across_threads() {
    let schema = compile(&tree_schema()).unwrap();
    let value = json!({"value": 1, "children": [{"value": 2}]});
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert!(ConfigTemplate::accepts(&schema, &value));
            });
        }
    });
}
