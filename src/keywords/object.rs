//! Object keyword validation, including the open-schema case.
//!
//! Covers `properties`, `required`, `dependencies` (property-list and
//! schema forms), `patternProperties` and `additionalProperties`. A node
//! of the object kind with no declared `type` is an *open* schema: it
//! accepts any instance and applies whichever of its keywords bind the
//! instance's actual kind (so `{"minimum": 3}` still constrains numbers).
//!
//! Property names are data here: a property literally called `id` or
//! `$id` inside a `properties` map is looked up by name like any other
//! and never refines the resolution scope.

use regex::Regex;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::schema::SchemaNode;
use crate::scope::Scope;
use crate::validator::Validator;

use super::{array, finish, invalid_constraint, numeric, string};

/// The object keyword set.
///
/// Invoked for object instances (strict row) and for any instance when the
/// schema declares no type (open row).
pub fn validate(
    validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    match instance {
        Value::Object(members) => validate_members(validator, &node, members, instance, scope),
        _ => validate_open(validator, &node, instance, scope),
    }
}

/// Structural validation of an object instance.
fn validate_members(
    validator: &Validator,
    node: &SchemaNode<'_>,
    members: &Map<String, Value>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let path = scope.instance_path();
    let mut errors = Vec::new();

    if let Some(raw) = node.constraint("required") {
        match raw.as_array() {
            Some(names) => {
                for name in names.iter().filter_map(Value::as_str) {
                    if !members.contains_key(name) {
                        errors.push(
                            SchemaError::new(
                                path.clone(),
                                format!("Missing required property '{}'.", name),
                            )
                            .with_code("required")
                            .with_expected(format!("property '{}'", name)),
                        );
                    }
                }
            }
            None => errors.push(invalid_constraint(path, "required", "an array of names")),
        }
    }

    if let Some(dependencies) = node.constraint("dependencies").and_then(Value::as_object) {
        for (property, requirement) in dependencies {
            if !members.contains_key(property) {
                continue;
            }
            match requirement {
                Value::Array(names) => {
                    for name in names.iter().filter_map(Value::as_str) {
                        if !members.contains_key(name) {
                            errors.push(dependency_error(scope, property, name));
                        }
                    }
                }
                Value::String(name) => {
                    if !members.contains_key(name.as_str()) {
                        errors.push(dependency_error(scope, property, name));
                    }
                }
                Value::Object(_) => {
                    let child_scope = scope
                        .push_schema_field("dependencies")
                        .push_schema_field(property);
                    if let Validation::Failure(child_errors) =
                        validator.process(requirement, instance, &child_scope)
                    {
                        errors.extend(child_errors);
                    }
                }
                _ => errors.push(invalid_constraint(
                    path,
                    "dependencies",
                    "a name list or a schema per property",
                )),
            }
        }
    }

    let properties = node.constraint("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (name, subschema) in properties {
            if let Some(child) = members.get(name) {
                let child_scope = scope
                    .push_schema_field("properties")
                    .push_schema_field(name)
                    .push_instance_field(name);
                if let Validation::Failure(child_errors) =
                    validator.process(subschema, child, &child_scope)
                {
                    errors.extend(child_errors);
                }
            }
        }
    }

    let mut pattern_matched: Vec<&str> = Vec::new();
    if let Some(patterns) = node.constraint("patternProperties").and_then(Value::as_object) {
        for (pattern, subschema) in patterns {
            let regex = match Regex::new(pattern) {
                Ok(regex) => regex,
                Err(_) => {
                    errors.push(invalid_constraint(
                        path,
                        "patternProperties",
                        "a map of valid regular expressions",
                    ));
                    continue;
                }
            };
            for (name, child) in members {
                if regex.is_match(name) {
                    pattern_matched.push(name);
                    let child_scope = scope
                        .push_schema_field("patternProperties")
                        .push_schema_field(pattern)
                        .push_instance_field(name);
                    if let Validation::Failure(child_errors) =
                        validator.process(subschema, child, &child_scope)
                    {
                        errors.extend(child_errors);
                    }
                }
            }
        }
    }

    match node.constraint("additionalProperties") {
        Some(Value::Bool(false)) => {
            for name in members.keys() {
                let declared = properties.map_or(false, |p| p.contains_key(name));
                if !declared && !pattern_matched.contains(&name.as_str()) {
                    errors.push(
                        SchemaError::new(
                            path.push_field(name),
                            format!("Additional property '{}' is not allowed.", name),
                        )
                        .with_code("additional_properties")
                        .with_value(members[name].clone()),
                    );
                }
            }
        }
        Some(extra_schema) if extra_schema.is_object() => {
            for (name, child) in members {
                let declared = properties.map_or(false, |p| p.contains_key(name));
                if !declared && !pattern_matched.contains(&name.as_str()) {
                    let child_scope = scope
                        .push_schema_field("additionalProperties")
                        .push_instance_field(name);
                    if let Validation::Failure(child_errors) =
                        validator.process(extra_schema, child, &child_scope)
                    {
                        errors.extend(child_errors);
                    }
                }
            }
        }
        _ => {}
    }

    finish(instance, errors)
}

/// Validation of a non-object instance against an open schema.
///
/// Applies the keyword set matching the instance's kind; an instance whose
/// kind binds none of the node's keywords passes through.
fn validate_open(
    validator: &Validator,
    node: &SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    match instance {
        Value::Number(_) => finish(
            instance,
            numeric::check_constraints(node, instance, scope.instance_path()),
        ),
        Value::String(_) => finish(
            instance,
            string::check_constraints(node, instance, scope.instance_path()),
        ),
        Value::Array(_) => {
            if node.constraint("items").map_or(false, Value::is_array) {
                array::validate_tuple(validator, *node, instance, scope)
            } else {
                array::validate_array(validator, *node, instance, scope)
            }
        }
        _ => Validation::Success(instance.clone()),
    }
}

fn dependency_error(scope: &Scope, property: &str, missing: &str) -> SchemaError {
    SchemaError::new(
        scope.instance_path().clone(),
        format!(
            "Missing property '{}' required by dependency of '{}'.",
            missing, property
        ),
    )
    .with_code("dependency")
    .with_expected(format!("property '{}'", missing))
}
