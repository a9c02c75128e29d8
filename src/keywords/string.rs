//! String keyword validation.
//!
//! Covers `minLength`, `maxLength` (character counts, not bytes) and
//! `pattern`. An unparseable pattern is a keyword violation, not a panic.

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;
use crate::schema::SchemaNode;
use crate::scope::Scope;
use crate::validator::Validator;

use super::{finish, invalid_constraint};

/// The string keyword set. The dispatcher guarantees a string instance.
pub fn validate(
    _validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let errors = check_constraints(&node, instance, scope.instance_path());
    finish(instance, errors)
}

/// Length and pattern checks, shared with open schemas binding a string
/// instance.
pub(crate) fn check_constraints(
    node: &SchemaNode<'_>,
    instance: &Value,
    path: &JsonPath,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let s = match instance.as_str() {
        Some(s) => s,
        None => return errors,
    };

    if let Some(raw) = node.constraint("minLength") {
        match raw.as_u64() {
            Some(min) => {
                let len = s.chars().count() as u64;
                if len < min {
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("String is shorter than {} characters.", min),
                        )
                        .with_code("min_length")
                        .with_expected(format!("at least {} characters", min))
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "minLength", "a non-negative integer")),
        }
    }

    if let Some(raw) = node.constraint("maxLength") {
        match raw.as_u64() {
            Some(max) => {
                let len = s.chars().count() as u64;
                if len > max {
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("String is longer than {} characters.", max),
                        )
                        .with_code("max_length")
                        .with_expected(format!("at most {} characters", max))
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "maxLength", "a non-negative integer")),
        }
    }

    if let Some(raw) = node.constraint("pattern") {
        match raw.as_str() {
            Some(pattern) => match Regex::new(pattern) {
                Ok(regex) => {
                    if !regex.is_match(s) {
                        errors.push(
                            SchemaError::new(
                                path.clone(),
                                format!("String does not match pattern '{}'.", pattern),
                            )
                            .with_code("pattern")
                            .with_expected(format!("string matching '{}'", pattern))
                            .with_value(instance.clone()),
                        );
                    }
                }
                Err(_) => {
                    errors.push(invalid_constraint(path, "pattern", "a valid regular expression"))
                }
            },
            None => errors.push(invalid_constraint(path, "pattern", "a string")),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(schema: &Value, instance: &Value) -> Vec<SchemaError> {
        check_constraints(&SchemaNode::classify(schema), instance, &JsonPath::root())
    }

    #[test]
    fn test_min_length() {
        let schema = json!({"minLength": 3});
        assert!(check(&schema, &json!("abc")).is_empty());
        assert_eq!(check(&schema, &json!("ab"))[0].code, "min_length");
    }

    #[test]
    fn test_max_length() {
        let schema = json!({"maxLength": 3});
        assert!(check(&schema, &json!("abc")).is_empty());
        assert_eq!(check(&schema, &json!("abcd"))[0].code, "max_length");
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let schema = json!({"maxLength": 3});
        // Three characters, nine bytes.
        assert!(check(&schema, &json!("日本語")).is_empty());
    }

    #[test]
    fn test_pattern_match() {
        let schema = json!({"pattern": "^abc$"});
        assert!(check(&schema, &json!("abc")).is_empty());

        let errors = check(&schema, &json!("xyz"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "pattern");
    }

    #[test]
    fn test_pattern_error_embeds_pattern_verbatim() {
        let schema = json!({"pattern": r"^\d+\\s$"});
        let errors = check(&schema, &json!("xyz"));
        assert!(errors[0].message.contains(r"^\d+\\s$"));
    }

    #[test]
    fn test_invalid_pattern_is_a_violation() {
        let schema = json!({"pattern": "[unclosed"});
        assert_eq!(check(&schema, &json!("abc"))[0].code, "invalid_constraint");
    }

    #[test]
    fn test_length_errors_accumulate_with_pattern() {
        let schema = json!({"minLength": 5, "pattern": "^\\d+$"});
        let errors = check(&schema, &json!("abc"));
        assert_eq!(errors.len(), 2);
    }
}
