//! Numeric keyword validation.
//!
//! Covers `minimum`, `maximum`, their `exclusiveMinimum` /
//! `exclusiveMaximum` boolean modifiers, and `multipleOf`. The integer set
//! additionally requires the instance to be an integral value.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;
use crate::schema::SchemaNode;
use crate::scope::Scope;
use crate::validator::Validator;

use super::{finish, invalid_constraint};

/// Tolerance for `multipleOf` on floating-point quotients.
const MULTIPLE_EPSILON: f64 = 1e-9;

/// The number keyword set. The dispatcher guarantees a number instance.
pub fn validate_number(
    _validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let errors = check_constraints(&node, instance, scope.instance_path());
    finish(instance, errors)
}

/// Validates a number instance against the integer keywords.
///
/// Integral means a zero fractional part; `2.0` passes, `2.5` does not.
pub fn validate_integer(
    _validator: &Validator,
    node: SchemaNode<'_>,
    instance: &Value,
    scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    let mut errors = Vec::new();

    if !is_integral(instance) {
        errors.push(
            SchemaError::new(
                scope.instance_path().clone(),
                "Wrong type. Expected integer, was number.",
            )
            .with_code("invalid_type")
            .with_expected("integer")
            .with_value(instance.clone()),
        );
    }

    errors.extend(check_constraints(&node, instance, scope.instance_path()));
    finish(instance, errors)
}

/// True when the number carries no fractional part.
fn is_integral(value: &Value) -> bool {
    if value.as_i64().is_some() || value.as_u64().is_some() {
        return true;
    }
    value.as_f64().map_or(false, |n| n.fract() == 0.0)
}

/// Range and multiple checks shared by the number and integer sets (and by
/// open schemas binding a number instance).
pub(crate) fn check_constraints(
    node: &SchemaNode<'_>,
    instance: &Value,
    path: &JsonPath,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let n = match instance.as_f64() {
        Some(n) => n,
        None => return errors,
    };

    if let Some(raw) = node.constraint("minimum") {
        match raw.as_f64() {
            Some(minimum) => {
                let exclusive = node
                    .constraint("exclusiveMinimum")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if n < minimum || (exclusive && n == minimum) {
                    let relation = if exclusive { "greater than" } else { "at least" };
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("Number must be {} {}.", relation, minimum),
                        )
                        .with_code("minimum")
                        .with_expected(format!("{} {}", relation, minimum))
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "minimum", "a number")),
        }
    }

    if let Some(raw) = node.constraint("maximum") {
        match raw.as_f64() {
            Some(maximum) => {
                let exclusive = node
                    .constraint("exclusiveMaximum")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if n > maximum || (exclusive && n == maximum) {
                    let relation = if exclusive { "less than" } else { "at most" };
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("Number must be {} {}.", relation, maximum),
                        )
                        .with_code("maximum")
                        .with_expected(format!("{} {}", relation, maximum))
                        .with_value(instance.clone()),
                    );
                }
            }
            None => errors.push(invalid_constraint(path, "maximum", "a number")),
        }
    }

    if let Some(raw) = node.constraint("multipleOf") {
        match raw.as_f64() {
            Some(divisor) if divisor != 0.0 => {
                let quotient = n / divisor;
                if (quotient - quotient.round()).abs() > MULTIPLE_EPSILON {
                    errors.push(
                        SchemaError::new(
                            path.clone(),
                            format!("Number is not a multiple of {}.", divisor),
                        )
                        .with_code("multiple_of")
                        .with_expected(format!("a multiple of {}", divisor))
                        .with_value(instance.clone()),
                    );
                }
            }
            _ => errors.push(invalid_constraint(path, "multipleOf", "a non-zero number")),
        }
    }

    errors
}
