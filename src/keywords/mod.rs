//! Keyword-validator sets, one module per schema kind.
//!
//! Every set honors the same contract: it is invoked by the dispatcher
//! only when the instance kind is compatible with the schema kind, it
//! returns errors rather than panicking, and when it recurses into child
//! (schema, instance) pairs it goes back through the dispatcher with a
//! scope whose paths have been extended for the descent.
//!
//! The sets are plain functions, looked up as data by kind via
//! [`set_for`]; there is no trait object in the dispatch path.

pub mod array;
pub mod compound;
pub mod numeric;
pub mod object;
pub mod string;

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;
use crate::schema::{SchemaKind, SchemaNode};
use crate::scope::Scope;
use crate::validator::Validator;

/// A keyword-validator set.
///
/// `validator` re-enters the dispatcher for child nodes; `node` is the
/// classified schema position; the scope carries both paths.
pub type KeywordFn =
    fn(&Validator, SchemaNode<'_>, &Value, &Scope) -> Validation<Value, SchemaErrors>;

/// The keyword set applying to a schema kind.
///
/// `Ref` has no keyword set (the dispatcher resolves it away first);
/// `Boolean` and `Null` carry no kind-specific keywords beyond the common
/// ones, so their set is the trivial pass-through.
pub fn set_for(kind: SchemaKind) -> KeywordFn {
    match kind {
        SchemaKind::Object => object::validate,
        SchemaKind::Array => array::validate_array,
        SchemaKind::Tuple => array::validate_tuple,
        SchemaKind::Number => numeric::validate_number,
        SchemaKind::Integer => numeric::validate_integer,
        SchemaKind::String => string::validate,
        SchemaKind::Compound => compound::validate,
        SchemaKind::Boolean | SchemaKind::Null | SchemaKind::Ref => pass,
    }
}

/// The trivial keyword set: the instance passes through unchanged.
fn pass(
    _validator: &Validator,
    _node: SchemaNode<'_>,
    instance: &Value,
    _scope: &Scope,
) -> Validation<Value, SchemaErrors> {
    Validation::Success(instance.clone())
}

/// Checks the `enum` keyword, which applies to every kind.
pub(crate) fn check_enum(
    node: &SchemaNode<'_>,
    instance: &Value,
    path: &JsonPath,
) -> Option<SchemaError> {
    let candidates = node.constraint("enum")?.as_array()?;
    if candidates.contains(instance) {
        None
    } else {
        Some(
            SchemaError::new(
                path.clone(),
                format!(
                    "Value is not one of the {} allowed values.",
                    candidates.len()
                ),
            )
            .with_code("enum")
            .with_value(instance.clone()),
        )
    }
}

/// An error for a keyword whose own value is unusable.
pub(crate) fn invalid_constraint(
    path: &JsonPath,
    keyword: &str,
    expected: &str,
) -> SchemaError {
    SchemaError::new(
        path.clone(),
        format!("Keyword '{}' must be {}.", keyword, expected),
    )
    .with_code("invalid_constraint")
    .with_expected(expected.to_string())
}

/// Folds accumulated errors into a validation result.
pub(crate) fn finish(instance: &Value, errors: Vec<SchemaError>) -> Validation<Value, SchemaErrors> {
    match SchemaErrors::collect(errors) {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(instance.clone()),
    }
}
