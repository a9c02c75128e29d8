//! Validation error types.
//!
//! [`SchemaError`] is one validation failure with its full context;
//! [`SchemaErrors`] is the non-empty, ordered list of them a failed
//! validation returns.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single validation error with full context.
///
/// `SchemaError` captures everything relevant to one failure:
/// - **path**: the instance path at which the error occurred
/// - **message**: human-readable description of the failure
/// - **value**: the offending instance sub-value (optional)
/// - **expected**: what was expected instead (optional)
/// - **schema_path**: the schema location that rejected the value, set on
///   type mismatches (optional)
/// - **code**: machine-readable error code for programmatic handling
///
/// # Example
///
/// ```rust
/// use refract::{JsonPath, SchemaError};
/// use serde_json::json;
///
/// let error = SchemaError::new(
///     JsonPath::root().push_field("age"),
///     "Wrong type. Expected integer, was string.",
/// )
/// .with_code("invalid_type")
/// .with_value(json!("forty"))
/// .with_expected("integer");
///
/// assert_eq!(error.code, "invalid_type");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// The instance path to the value that failed validation.
    pub path: JsonPath,
    /// Human-readable error message.
    pub message: String,
    /// The offending instance sub-value.
    pub value: Option<Value>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// The schema path that produced the error, when it adds information
    /// beyond the instance path (type mismatches set this).
    pub schema_path: Option<JsonPath>,
    /// Machine-readable error code (e.g., `required`, `pattern`).
    pub code: String,
}

impl SchemaError {
    /// Creates a new validation error with the given instance path and message.
    ///
    /// The error code defaults to "validation_error". Use `with_code` to set
    /// a more specific code.
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            value: None,
            expected: None,
            schema_path: None,
            code: "validation_error".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the offending value and returns self for chaining.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the schema path and returns self for chaining.
    pub fn with_schema_path(mut self, schema_path: JsonPath) -> Self {
        self.schema_path = Some(schema_path);
        self
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }
        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref value) = self.value {
            write!(f, " (value: {})", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// The non-empty, ordered error list a failed validation returns.
///
/// Emptiness is ruled out at construction: [`SchemaErrors::collect`] turns
/// an accumulation buffer into `None` (success, nothing to report) or
/// `Some` (failure with evidence), so a `Validation::Failure` can never be
/// hollow. Merging appends, preserving encounter order.
///
/// # Example
///
/// ```rust
/// use refract::{JsonPath, SchemaError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// assert!(SchemaErrors::collect(vec![]).is_none());
///
/// let missing = SchemaError::new(JsonPath::root(), "Missing required property 'name'.")
///     .with_code("required");
/// let too_small = SchemaError::new(JsonPath::root().push_field("age"), "Number must be at least 0.")
///     .with_code("minimum");
///
/// let merged = SchemaErrors::single(missing).combine(SchemaErrors::single(too_small));
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged.first().code, "required");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors {
    errors: Vec<SchemaError>,
}

impl SchemaErrors {
    /// Creates a collection holding one error.
    pub fn single(error: SchemaError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Wraps an accumulation buffer, or `None` when nothing accumulated.
    ///
    /// Keyword sets push into a plain `Vec` while checking and call this
    /// once at the end; the `Option` maps directly onto success/failure.
    pub fn collect(errors: Vec<SchemaError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Number of errors; at least 1.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The first error in encounter order.
    pub fn first(&self) -> &SchemaError {
        // Construction guarantees at least one element.
        &self.errors[0]
    }

    /// Iterates the errors in encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaError> {
        self.errors.iter()
    }

    /// The errors reported at one instance path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&SchemaError> {
        self.errors.iter().filter(|e| &e.path == path).collect()
    }

    /// The errors carrying one error code.
    pub fn with_code(&self, code: &str) -> Vec<&SchemaError> {
        self.errors.iter().filter(|e| e.code == code).collect()
    }

    /// Unwraps into the underlying vector.
    pub fn into_vec(self) -> Vec<SchemaError> {
        self.errors
    }
}

impl Semigroup for SchemaErrors {
    fn combine(mut self, other: Self) -> Self {
        self.errors.extend(other.errors);
        self
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} validation error(s):", self.len())?;
        for error in &self.errors {
            writeln!(f, "- {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn error_at(field: &str, code: &str) -> SchemaError {
        SchemaError::new(
            JsonPath::root().push_field(field),
            format!("{} failed", field),
        )
        .with_code(code)
    }

    #[test]
    fn test_error_defaults_and_builders() {
        let bare = SchemaError::new(JsonPath::root(), "Wrong type. Expected object, was null.");
        assert_eq!(bare.code, "validation_error");
        assert!(bare.value.is_none());
        assert!(bare.expected.is_none());
        assert!(bare.schema_path.is_none());

        let full = error_at("age", "minimum")
            .with_value(json!(-3))
            .with_expected("at least 0")
            .with_schema_path(JsonPath::root().push_field("properties").push_field("age"));
        assert_eq!(full.value, Some(json!(-3)));
        assert_eq!(full.expected.as_deref(), Some("at least 0"));
        assert_eq!(
            full.schema_path.unwrap().to_string(),
            "properties.age"
        );
    }

    #[test]
    fn test_error_display_includes_context() {
        let error = error_at("kind", "enum")
            .with_expected("one of: a, b")
            .with_value(json!("c"));

        let rendered = error.to_string();
        assert!(rendered.starts_with("kind: kind failed"));
        assert!(rendered.contains("(expected: one of: a, b)"));
        assert!(rendered.contains("(value: \"c\")"));

        let at_root = SchemaError::new(JsonPath::root(), "Missing required property 'id'.");
        assert!(at_root.to_string().starts_with("(root):"));
    }

    #[test]
    fn test_collect_maps_emptiness_onto_option() {
        assert!(SchemaErrors::collect(Vec::new()).is_none());

        let collected =
            SchemaErrors::collect(vec![error_at("a", "required"), error_at("b", "pattern")])
                .unwrap();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected.first().code, "required");
    }

    #[test]
    fn test_combine_appends_in_encounter_order() {
        let left = SchemaErrors::collect(vec![error_at("a", "x"), error_at("b", "x")]).unwrap();
        let right = SchemaErrors::single(error_at("c", "x"));

        let merged = left.combine(right);
        let fields: Vec<String> = merged.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filtering_by_path_and_code() {
        let duplicate_path = JsonPath::root().push_field("n");
        let errors = SchemaErrors::collect(vec![
            SchemaError::new(duplicate_path.clone(), "too small").with_code("minimum"),
            SchemaError::new(duplicate_path.clone(), "not integral").with_code("invalid_type"),
            error_at("other", "minimum"),
        ])
        .unwrap();

        assert_eq!(errors.at_path(&duplicate_path).len(), 2);
        assert_eq!(errors.with_code("minimum").len(), 2);
        assert_eq!(errors.with_code("invalid_type").len(), 1);
        assert!(errors.with_code("missing").is_empty());
    }

    #[test]
    fn test_display_lists_every_error() {
        let errors =
            SchemaErrors::collect(vec![error_at("a", "required"), error_at("b", "pattern")])
                .unwrap();

        let rendered = errors.to_string();
        assert!(rendered.contains("2 validation error(s):"));
        assert!(rendered.contains("a: a failed"));
        assert!(rendered.contains("b: b failed"));
    }

    #[test]
    fn test_into_iter_drains_in_order() {
        let errors =
            SchemaErrors::collect(vec![error_at("a", "x"), error_at("b", "y")]).unwrap();

        let codes: Vec<String> = errors.into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["x", "y"]);
    }
}
