//! Combinator keyword validation (`allOf` / `anyOf` / `oneOf` / `not`).
//!
//! Every branch is evaluated before a combinator decides, so all child
//! errors are in hand when the aggregate verdict is formed. `allOf` folds
//! the failing branches' errors into the result; `anyOf` and `oneOf`
//! consume child errors and emit a single aggregated error of their own.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::schema::SchemaNode;
use crate::scope::Scope;
use crate::validator::Validator;

use super::{finish, invalid_constraint};

/// The combinator keyword set. Applies to any instance kind.
pub fn validate(
    validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let path = scope.instance_path();
    let mut errors = Vec::new();

    if let Some(raw) = node.constraint("allOf") {
        match raw.as_array() {
            Some(branches) => {
                for (index, branch) in branches.iter().enumerate() {
                    let branch_scope =
                        scope.push_schema_field("allOf").push_schema_index(index);
                    if let Validation::Failure(branch_errors) =
                        validator.process(branch, instance, &branch_scope)
                    {
                        errors.extend(branch_errors);
                    }
                }
            }
            None => errors.push(invalid_constraint(path, "allOf", "an array of schemas")),
        }
    }

    if let Some(raw) = node.constraint("anyOf") {
        match raw.as_array() {
            Some(branches) => {
                let outcomes = evaluate_branches(validator, "anyOf", branches, instance, scope);
                if !outcomes.iter().any(|passed| *passed) {
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!(
                                "Instance does not match any of the {} schemas in 'anyOf'.",
                                branches.len()
                            ),
                        )
                        .with_code("any_of")
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "anyOf", "an array of schemas")),
        }
    }

    if let Some(raw) = node.constraint("oneOf") {
        match raw.as_array() {
            Some(branches) => {
                let outcomes = evaluate_branches(validator, "oneOf", branches, instance, scope);
                let matched: Vec<usize> = outcomes
                    .iter()
                    .enumerate()
                    .filter_map(|(index, passed)| passed.then_some(index))
                    .collect();
                match matched.len() {
                    1 => {}
                    0 => errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!(
                                "Instance does not match any of the {} schemas in 'oneOf'.",
                                branches.len()
                            ),
                        )
                        .with_code("one_of")
                        .with_value(instance.clone()),
                    ),
                    n => errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!(
                                "Instance matches {} schemas in 'oneOf' (indices {:?}); exactly one must match.",
                                n, matched
                            ),
                        )
                        .with_code("one_of")
                        .with_value(instance.clone()),
                    ),
                }
            }
            None => errors.push(invalid_constraint(path, "oneOf", "an array of schemas")),
        }
    }

    if let Some(forbidden) = node.constraint("not") {
        let branch_scope = scope.push_schema_field("not");
        if validator
            .process(forbidden, instance, &branch_scope)
            .is_success()
        {
            errors.push(
                SchemaError::new(
                    path.clone(),
                    "Instance matches the schema it must not match.".to_string(),
                )
                .with_code("not")
                .with_value(instance.clone()),
            );
        }
    }

    finish(instance, errors)
}

/// Evaluates every branch, returning each branch's verdict.
fn evaluate_branches(
    validator: &Validator,
    keyword: &str,
    branches: &[Value],
    instance: &Value,
    scope: &Scope,
) -> Vec<bool> {
    branches
        .iter()
        .enumerate()
        .map(|(index, branch)| {
            let branch_scope = scope.push_schema_field(keyword).push_schema_index(index);
            validator.process(branch, instance, &branch_scope).is_success()
        })
        .collect()
}
