//! Array and tuple keyword validation.
//!
//! The array set covers a single `items` schema plus `minItems`,
//! `maxItems` and `uniqueItems`; the tuple set covers positional `items`
//! schemas and `additionalItems`. Child items recurse through the
//! dispatcher with the item index pushed onto the instance path.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;
use crate::schema::SchemaNode;
use crate::scope::Scope;
use crate::validator::Validator;

use super::{finish, invalid_constraint};

/// The array keyword set. The dispatcher guarantees an array instance.
pub fn validate_array(
    validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let items = match instance.as_array() {
        Some(items) => items,
        None => return Validation::Success(instance.clone()),
    };

    let mut errors = check_length_and_uniqueness(&node, items, instance, scope.instance_path());

    if let Some(items_schema) = node.constraint("items") {
        if items_schema.is_object() {
            for (index, item) in items.iter().enumerate() {
                let child_scope = scope
                    .push_schema_field("items")
                    .push_instance_index(index);
                if let Validation::Failure(child_errors) =
                    validator.process(items_schema, item, &child_scope)
                {
                    errors.extend(child_errors);
                }
            }
        }
    }

    finish(instance, errors)
}

/// The tuple keyword set: positional `items` schemas.
pub fn validate_tuple(
    validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let items = match instance.as_array() {
        Some(items) => items,
        None => return Validation::Success(instance.clone()),
    };

    let mut errors = check_length_and_uniqueness(&node, items, instance, scope.instance_path());

    let positions = node
        .constraint("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for (index, item) in items.iter().enumerate() {
        match positions.get(index) {
            Some(position_schema) => {
                let child_scope = scope
                    .push_schema_field("items")
                    .push_schema_index(index)
                    .push_instance_index(index);
                if let Validation::Failure(child_errors) =
                    validator.process(position_schema, item, &child_scope)
                {
                    errors.extend(child_errors);
                }
            }
            None => match node.constraint("additionalItems") {
                Some(Value::Bool(false)) => {
                    errors.push(
                        SchemaError::new(
                            scope.instance_path().push_index(index),
                            format!(
                                "Array item {} exceeds the {} defined positions.",
                                index,
                                positions.len()
                            ),
                        )
                        .with_code("additional_items")
                        .with_value(item.clone()),
                    );
                }
                Some(extra_schema) if extra_schema.is_object() => {
                    let child_scope = scope
                        .push_schema_field("additionalItems")
                        .push_instance_index(index);
                    if let Validation::Failure(child_errors) =
                        validator.process(extra_schema, item, &child_scope)
                    {
                        errors.extend(child_errors);
                    }
                }
                _ => {}
            },
        }
    }

    finish(instance, errors)
}

/// Length and uniqueness checks, shared by both sets and by open schemas
/// binding an array instance.
pub(crate) fn check_length_and_uniqueness(
    node: &SchemaNode<'_>,
    items: &[Value],
    instance: &Value,
    path: &JsonPath,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if let Some(raw) = node.constraint("minItems") {
        match raw.as_u64() {
            Some(min) => {
                if (items.len() as u64) < min {
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("Array has fewer than {} items.", min),
                        )
                        .with_code("min_items")
                        .with_expected(format!("at least {} items", min))
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "minItems", "a non-negative integer")),
        }
    }

    if let Some(raw) = node.constraint("maxItems") {
        match raw.as_u64() {
            Some(max) => {
                if (items.len() as u64) > max {
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("Array has more than {} items.", max),
                        )
                        .with_code("max_items")
                        .with_expected(format!("at most {} items", max))
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "maxItems", "a non-negative integer")),
        }
    }

    if node
        .constraint("uniqueItems")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        let mut seen: Vec<&Value> = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if seen.contains(&item) {
                errors.push(
                    SchemaError::new(
                        path.push_index(index),
                        "Array items are not unique.".to_string(),
                    )
                    .with_code("unique_items")
                    .with_value(item.clone()),
                );
            } else {
                seen.push(item);
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(schema: &Value, instance: &Value) -> Vec<SchemaError> {
        let node = SchemaNode::classify(schema);
        check_length_and_uniqueness(
            &node,
            instance.as_array().unwrap(),
            instance,
            &JsonPath::root(),
        )
    }

    #[test]
    fn test_min_items() {
        let schema = json!({"minItems": 2});
        assert!(check(&schema, &json!([1, 2])).is_empty());
        assert_eq!(check(&schema, &json!([1]))[0].code, "min_items");
    }

    #[test]
    fn test_max_items() {
        let schema = json!({"maxItems": 2});
        assert!(check(&schema, &json!([1, 2])).is_empty());
        assert_eq!(check(&schema, &json!([1, 2, 3]))[0].code, "max_items");
    }

    #[test]
    fn test_unique_items() {
        let schema = json!({"uniqueItems": true});
        assert!(check(&schema, &json!([1, "1", [1]])).is_empty());

        let errors = check(&schema, &json!([1, 2, 1, 2]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path.to_string(), "[2]");
        assert_eq!(errors[1].path.to_string(), "[3]");
    }

    #[test]
    fn test_unique_items_false_allows_duplicates() {
        let schema = json!({"uniqueItems": false});
        assert!(check(&schema, &json!([1, 1])).is_empty());
    }

    #[test]
    fn test_invalid_length_keyword() {
        let schema = json!({"minItems": -1});
        assert_eq!(check(&schema, &json!([]))[0].code, "invalid_constraint");
    }
}
