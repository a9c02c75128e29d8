//! The validation dispatcher and entry points.
//!
//! [`Validator::process`] walks the schema tree and the instance tree in
//! lockstep, dispatching on the (instance kind, schema kind) pair. `$ref`
//! expansion always happens before any keyword on the node runs, and an
//! `id` met at a schema position refines the scope for everything below.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::keywords;
use crate::path::JsonPath;
use crate::resolver::Resolver;
use crate::schema::{type_name, RefNode, SchemaKind, SchemaNode};
use crate::scope::Scope;

/// Validates instances against one schema document.
///
/// All entry points share the same core path: build the initial scope
/// (empty paths, fresh visited set, the document's own id installed), then
/// recurse through [`Validator::process`]. The resolver — and with it the
/// cache of fetched documents — lives as long as the validator.
///
/// # Example
///
/// ```rust
/// use refract::Validator;
/// use serde_json::json;
///
/// let validator = Validator::new(json!({
///     "type": "object",
///     "properties": {"name": {"type": "string", "minLength": 1}},
///     "required": ["name"]
/// }));
///
/// assert!(validator.validate(&json!({"name": "Ada"})).is_success());
/// assert!(validator.validate(&json!({})).is_failure());
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Arc<Value>,
    resolver: Resolver,
}

impl Validator {
    /// Creates a validator with the stock resolver (file and, with the
    /// `remote` feature, http/https scheme handlers).
    pub fn new(schema: Value) -> Self {
        Self::with_resolver(schema, Resolver::new())
    }

    /// Creates a validator resolving references through `resolver`.
    pub fn with_resolver(schema: Value, resolver: Resolver) -> Self {
        Self {
            schema: Arc::new(schema),
            resolver,
        }
    }

    /// The schema document this validator checks against.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The resolver (and its document cache).
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Validates a raw JSON instance, returning it on success.
    pub fn validate(&self, instance: &Value) -> Validation<Value, SchemaErrors> {
        let scope = self.initial_scope();
        self.process(&self.schema, instance, &scope)
    }

    /// Validates a raw JSON instance and decodes the result.
    ///
    /// Decode failures after successful validation surface as a single
    /// `decode_error` at the root.
    pub fn validate_as<T: DeserializeOwned>(
        &self,
        instance: &Value,
    ) -> Validation<T, SchemaErrors> {
        match self.validate(instance) {
            Validation::Success(value) => match serde_json::from_value(value) {
                Ok(decoded) => Validation::Success(decoded),
                Err(err) => Validation::Failure(SchemaErrors::single(
                    SchemaError::new(
                        JsonPath::root(),
                        format!("Cannot decode validated value: {}.", err),
                    )
                    .with_code("decode_error"),
                )),
            },
            Validation::Failure(errors) => Validation::Failure(errors),
        }
    }

    /// Encodes a typed value to JSON and validates it.
    pub fn validate_from<T: Serialize>(&self, value: &T) -> Validation<Value, SchemaErrors> {
        match serde_json::to_value(value) {
            Ok(instance) => self.validate(&instance),
            Err(err) => Validation::Failure(SchemaErrors::single(
                SchemaError::new(
                    JsonPath::root(),
                    format!("Cannot encode value for validation: {}.", err),
                )
                .with_code("encode_error"),
            )),
        }
    }

    /// Encodes, validates, and decodes back into the same type.
    pub fn validate_roundtrip<T: Serialize + DeserializeOwned>(
        &self,
        value: &T,
    ) -> Validation<T, SchemaErrors> {
        match serde_json::to_value(value) {
            Ok(instance) => self.validate_as(&instance),
            Err(err) => Validation::Failure(SchemaErrors::single(
                SchemaError::new(
                    JsonPath::root(),
                    format!("Cannot encode value for validation: {}.", err),
                )
                .with_code("encode_error"),
            )),
        }
    }

    /// Builds the scope a validation call starts in.
    fn initial_scope(&self) -> Scope {
        let scope = Scope::new(Arc::clone(&self.schema));
        match self.schema.find_scope_refinement() {
            Some(id) => scope.with_root_id(id),
            None => scope,
        }
    }

    /// Validates one (schema node, instance node) pair.
    ///
    /// Keyword sets call back into this for children; the scope they pass
    /// must have its paths extended for the descent.
    pub fn process(
        &self,
        schema: &Value,
        instance: &Value,
        scope: &Scope,
    ) -> Validation<Value, SchemaErrors> {
        let node = SchemaNode::classify(schema);

        // $ref expansion precedes every keyword on the node.
        if node.kind() == SchemaKind::Ref {
            let reference = match schema.find_ref() {
                Some(reference) => reference,
                None => return Validation::Success(instance.clone()),
            };
            if scope.is_visited(reference) {
                // The chain already entered this reference; the node is
                // used as-is and constrains nothing further.
                return Validation::Success(instance.clone());
            }
            return match self.resolver.resolve(reference, schema, scope) {
                Ok((target, target_scope)) => self.process(&target, instance, &target_scope),
                Err(err) => Validation::Failure(SchemaErrors::single(
                    SchemaError::new(
                        scope.instance_path().clone(),
                        format!("Cannot resolve reference: {}.", err),
                    )
                    .with_code("resolution_error")
                    .with_value(instance.clone()),
                )),
            };
        }

        let refined;
        let scope = match schema.find_scope_refinement() {
            Some(id) => {
                refined = scope.refine_id(id);
                &refined
            }
            None => scope,
        };

        let enum_error = keywords::check_enum(&node, instance, scope.instance_path());
        let result = self.dispatch(node, instance, scope);

        match (enum_error, result) {
            (None, result) => result,
            (Some(error), Validation::Success(_)) => {
                Validation::Failure(SchemaErrors::single(error))
            }
            (Some(error), Validation::Failure(rest)) => {
                Validation::Failure(SchemaErrors::single(error).combine(rest))
            }
        }
    }

    /// The dispatch table, rows in priority order; the first match wins.
    fn dispatch(
        &self,
        node: SchemaNode<'_>,
        instance: &Value,
        scope: &Scope,
    ) -> Validation<Value, SchemaErrors> {
        match (instance, node.kind()) {
            // An object-shaped schema with no declared type is open: it
            // validates any instance, constrained only by whichever of its
            // keywords bind the instance's kind.
            (_, SchemaKind::Object) if !node.has_declared_type() => {
                keywords::set_for(SchemaKind::Object)(self, node, instance, scope)
            }
            (Value::Object(_), SchemaKind::Object) => {
                keywords::set_for(SchemaKind::Object)(self, node, instance, scope)
            }
            (_, SchemaKind::Compound) => {
                keywords::set_for(SchemaKind::Compound)(self, node, instance, scope)
            }
            (Value::Array(_), SchemaKind::Array) => {
                keywords::set_for(SchemaKind::Array)(self, node, instance, scope)
            }
            (Value::Array(_), SchemaKind::Tuple) => {
                keywords::set_for(SchemaKind::Tuple)(self, node, instance, scope)
            }
            (Value::Number(_), SchemaKind::Number) => {
                keywords::set_for(SchemaKind::Number)(self, node, instance, scope)
            }
            (Value::Number(_), SchemaKind::Integer) => {
                keywords::set_for(SchemaKind::Integer)(self, node, instance, scope)
            }
            (Value::Bool(_), SchemaKind::Boolean) => {
                keywords::set_for(SchemaKind::Boolean)(self, node, instance, scope)
            }
            (Value::String(_), SchemaKind::String) => {
                keywords::set_for(SchemaKind::String)(self, node, instance, scope)
            }
            (Value::Null, SchemaKind::Null) => {
                keywords::set_for(SchemaKind::Null)(self, node, instance, scope)
            }
            _ => {
                let expected = node.declared_type().unwrap_or_else(|| node.kind().name());
                Validation::Failure(SchemaErrors::single(
                    SchemaError::new(
                        scope.instance_path().clone(),
                        format!(
                            "Wrong type. Expected {}, was {}.",
                            expected,
                            type_name(instance)
                        ),
                    )
                    .with_code("invalid_type")
                    .with_expected(expected.to_string())
                    .with_value(instance.clone())
                    .with_schema_path(scope.schema_path().clone()),
                ))
            }
        }
    }
}
