//! `object` nodes.
//!
//! Declared properties keep schema order and carry their presence (from
//! `required`) and default. Draft 7 `dependencies` is split by value shape:
//! string arrays join `dependentRequired`, schemas join `dependentSchemas`.

use cfgschema_core::CompileError;
use serde_json::Value;

use super::compile_node;
use super::string::compile_pattern;
use crate::builder;
use crate::constraint::Constraint;
use crate::node::{string_list, SchemaNode};
use crate::resolver::ResolutionContext;
use crate::template::{
    AdditionalPolicy, MappingTemplate, PatternProperty, Template, TemplateKind,
};

pub(super) fn compile<'doc>(
    node: &SchemaNode<'doc>,
    ctx: &mut ResolutionContext<'doc>,
) -> Result<Template, CompileError> {
    let required = node.string_list("required")?.unwrap_or_default();

    let mut properties = Vec::new();
    if let Some(declared) = node.object("properties")? {
        let at = node.location("properties");
        for (name, schema) in declared {
            let template = compile_node(schema, at.child(name), ctx)?;
            let is_required = required.contains(&name.as_str());
            properties.push((name.clone(), builder::property(template, is_required)));
        }
    }
    let mut required_only: Vec<String> = Vec::new();
    for name in &required {
        let declared = properties.iter().any(|(declared, _)| declared == name);
        if !declared && !required_only.iter().any(|r| r == name) {
            required_only.push((*name).to_string());
        }
    }

    let mut pattern_properties = Vec::new();
    if let Some(patterns) = node.object("patternProperties")? {
        let at = node.location("patternProperties");
        for (source, schema) in patterns {
            let location = at.child(source);
            let regex = compile_pattern(source, location.as_str())?;
            let template = compile_node(schema, location, ctx)?;
            pattern_properties.push(PatternProperty { regex, template });
        }
    }

    let additional = match node.get("additionalProperties") {
        None | Some(Value::Bool(true)) => AdditionalPolicy::Allow,
        Some(Value::Bool(false)) => AdditionalPolicy::Forbid,
        Some(schema) => AdditionalPolicy::Template(Box::new(compile_node(
            schema,
            node.location("additionalProperties"),
            ctx,
        )?)),
    };

    let mut dependent_required = Vec::new();
    let mut dependent_schemas = Vec::new();
    if let Some(map) = node.object("dependentRequired")? {
        for (trigger, names) in map {
            let names = string_list(names)
                .ok_or_else(|| node.invalid("dependentRequired", "an object of string arrays"))?;
            dependent_required.push((trigger.clone(), owned(names)));
        }
    }
    if let Some(map) = node.object("dependentSchemas")? {
        let at = node.location("dependentSchemas");
        for (trigger, schema) in map {
            dependent_schemas.push((trigger.clone(), compile_node(schema, at.child(trigger), ctx)?));
        }
    }
    if let Some(map) = node.object("dependencies")? {
        let at = node.location("dependencies");
        for (trigger, value) in map {
            match string_list(value) {
                Some(names) => dependent_required.push((trigger.clone(), owned(names))),
                None => {
                    let template = compile_node(value, at.child(trigger), ctx)?;
                    dependent_schemas.push((trigger.clone(), template));
                }
            }
        }
    }

    let property_names = node
        .get("propertyNames")
        .map(|schema| compile_node(schema, node.location("propertyNames"), ctx))
        .transpose()?
        .map(Box::new);

    let mut constraints = Vec::new();
    let min = node.count("minProperties")?;
    let max = node.count("maxProperties")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(node
                .contradiction(format!(
                    "minProperties ({min}) exceeds maxProperties ({max})"
                ))
                .into());
        }
    }
    if min.is_some() || max.is_some() {
        constraints.push(Constraint::PropertyCount { min, max });
    }

    Ok(Template::new(TemplateKind::Mapping(MappingTemplate {
        properties,
        required_only,
        pattern_properties,
        pattern_mode: ctx.options().pattern_properties,
        additional,
        dependent_required,
        dependent_schemas,
        property_names,
        constraints,
    })))
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use crate::options::{CompileOptions, PatternPropertiesMode};
    use crate::template::TemplateKind;
    use crate::{compile, compile_with_options};
    use cfgschema_core::{CompileError, Presence, SchemaError, ValidationErrorKind};
    use serde_json::json;

    #[test]
    fn test_presence_follows_required() {
        let schema = compile(&json!({
            "type": "object",
            "properties": {"host": {"type": "string"}, "port": {"type": "integer", "default": 80}},
            "required": ["host"]
        }))
        .unwrap();
        let TemplateKind::Mapping(mapping) = schema.root().kind() else {
            panic!("expected a mapping");
        };
        assert_eq!(mapping.property("host").unwrap().presence(), Presence::Required);
        let port = mapping.property("port").unwrap();
        assert_eq!(port.presence(), Presence::Optional);
        assert_eq!(port.default_value(), Some(&json!(80)));
        assert_eq!(
            schema.validate(&json!({"host": "db"})).unwrap(),
            json!({"host": "db", "port": 80})
        );
    }

    #[test]
    fn test_required_without_declaration() {
        let schema = compile(&json!({"type": "object", "required": ["token"]})).unwrap();
        assert!(schema.validate(&json!({"token": 1})).is_ok());
        assert_eq!(
            schema.validate(&json!({})).unwrap_err().kind,
            ValidationErrorKind::MissingProperty {
                name: "token".into()
            }
        );
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = compile(&json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "additionalProperties": {"type": "integer"}
        }))
        .unwrap();
        assert!(schema.validate(&json!({"name": "x", "retries": 3})).is_ok());
        let err = schema.validate(&json!({"name": "x", "retries": "3"})).unwrap_err();
        assert_eq!(err.path.to_string(), "/retries");
    }

    #[test]
    fn test_pattern_properties_first_match() {
        let schema = compile(&json!({
            "type": "object",
            "patternProperties": {"^S_": {"type": "string"}, "^I_": {"type": "integer"}},
            "additionalProperties": false
        }))
        .unwrap();
        assert!(schema.validate(&json!({"S_name": "ok", "I_count": 5})).is_ok());
        let err = schema.validate(&json!({"S_name": "ok", "S_count": 5})).unwrap_err();
        assert_eq!(err.path.to_string(), "/S_count");
        let err = schema.validate(&json!({"other": 1})).unwrap_err();
        assert_eq!(
            err.kind,
            ValidationErrorKind::AdditionalProperties {
                names: vec!["other".into()]
            }
        );
    }

    #[test]
    fn test_pattern_properties_modes_on_declared_keys() {
        let schema = json!({
            "type": "object",
            "properties": {"S_fixed": {}},
            "patternProperties": {"^S_": {"type": "string"}}
        });
        let first = compile(&schema).unwrap();
        assert!(first.validate(&json!({"S_fixed": 1})).is_ok());

        let options =
            CompileOptions::default().with_pattern_properties(PatternPropertiesMode::AllMatches);
        let all = compile_with_options(&schema, &options).unwrap();
        assert!(all.validate(&json!({"S_fixed": 1})).is_err());
        assert!(all.validate(&json!({"S_fixed": "a"})).is_ok());
    }

    #[test]
    fn test_invalid_pattern_property_key() {
        let err = compile(&json!({"patternProperties": {"[": {}}})).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Schema(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_property_names() {
        let schema = compile(&json!({
            "type": "object",
            "propertyNames": {"pattern": "^[a-z_]+$"}
        }))
        .unwrap();
        assert!(schema.validate(&json!({"log_level": 1})).is_ok());
        let err = schema.validate(&json!({"LogLevel": 1})).unwrap_err();
        assert_eq!(err.path.to_string(), "/LogLevel[key]");
    }

    #[test]
    fn test_dependent_required_and_schemas() {
        let schema = compile(&json!({
            "type": "object",
            "dependentRequired": {"tls": ["cert", "key"]},
            "dependentSchemas": {"proxy": {"required": ["proxy_port"]}}
        }))
        .unwrap();
        assert!(schema.validate(&json!({"tls": true, "cert": "c", "key": "k"})).is_ok());
        assert_eq!(
            schema.validate(&json!({"tls": true})).unwrap_err().kind,
            ValidationErrorKind::DependentRequired {
                trigger: "tls".into(),
                missing: vec!["cert".into(), "key".into()]
            }
        );
        let err = schema.validate(&json!({"proxy": "p"})).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::DependentSchema { .. }));
    }

    #[test]
    fn test_legacy_dependencies_split_by_shape() {
        let schema = compile(&json!({
            "dependencies": {
                "a": ["b"],
                "c": {"properties": {"d": {"type": "integer"}}}
            }
        }))
        .unwrap();
        assert!(schema.validate(&json!({"a": 1})).is_err());
        assert!(schema.validate(&json!({"c": 1, "d": "x"})).is_err());
        assert!(schema.validate(&json!({"c": 1, "d": 2})).is_ok());
    }

    #[test]
    fn test_property_count_contradiction() {
        let err = compile(&json!({"minProperties": 2, "maxProperties": 1})).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Schema(SchemaError::Contradiction { .. })
        ));
    }
}
