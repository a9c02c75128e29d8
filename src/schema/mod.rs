//! Schema-node classification and the reference-capability trait.
//!
//! Schema documents stay in their parsed `serde_json::Value` form; this
//! module provides the typed view over a node position: a [`SchemaKind`]
//! tag derived from the node's keywords, the [`SchemaNode`] constraint
//! accessor, and the [`RefNode`] capability trait the resolver is written
//! against.

use serde_json::Value;

/// The keywords that turn a node into a compound (combinator) schema.
pub const COMBINATOR_KEYWORDS: [&str; 4] = ["allOf", "anyOf", "oneOf", "not"];

/// The tag determining which keyword-validator set applies to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// An object-shaped schema. This is also the *open* kind: a node with
    /// no declared `type` validates any instance, constrained only by
    /// whichever of its keywords bind the instance's kind.
    Object,
    /// `type: array` with a single items schema.
    Array,
    /// `type: array` with positional items schemas.
    Tuple,
    /// `type: number`.
    Number,
    /// `type: integer`.
    Integer,
    /// `type: string`.
    String,
    /// `type: boolean`.
    Boolean,
    /// `type: null`.
    Null,
    /// A combinator node (`allOf` / `anyOf` / `oneOf` / `not`).
    Compound,
    /// An unresolved `$ref`.
    Ref,
}

impl SchemaKind {
    /// The name used in wrong-type messages.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::Tuple => "tuple",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::String => "string",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Compound => "compound",
            SchemaKind::Ref => "reference",
        }
    }
}

/// A classified view over one schema-node position.
///
/// Construction is cheap; the view borrows the underlying document. The
/// kind tag is derived once, in priority order: `$ref` wins, then any
/// combinator keyword, then the declared `type` (where the shape of
/// `items` splits arrays from tuples). A node declaring no type is the
/// open [`SchemaKind::Object`] kind.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    value: &'a Value,
    kind: SchemaKind,
}

impl<'a> SchemaNode<'a> {
    /// Classifies a node position.
    pub fn classify(value: &'a Value) -> Self {
        let kind = match value {
            Value::Object(object) => {
                if object.get("$ref").and_then(Value::as_str).is_some() {
                    SchemaKind::Ref
                } else if COMBINATOR_KEYWORDS.iter().any(|k| object.contains_key(*k)) {
                    SchemaKind::Compound
                } else {
                    match object.get("type").and_then(Value::as_str) {
                        Some("object") => SchemaKind::Object,
                        Some("array") => {
                            if object.get("items").map_or(false, Value::is_array) {
                                SchemaKind::Tuple
                            } else {
                                SchemaKind::Array
                            }
                        }
                        Some("number") => SchemaKind::Number,
                        Some("integer") => SchemaKind::Integer,
                        Some("string") => SchemaKind::String,
                        Some("boolean") => SchemaKind::Boolean,
                        Some("null") => SchemaKind::Null,
                        // No declared type (or one this keyword set does not
                        // know): the open kind.
                        _ => SchemaKind::Object,
                    }
                }
            }
            // A non-object at a schema position constrains nothing.
            _ => SchemaKind::Object,
        };
        Self { value, kind }
    }

    /// The kind tag.
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// The underlying node.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The keyword's raw value, if present on this node.
    pub fn constraint(&self, keyword: &str) -> Option<&'a Value> {
        self.value.as_object()?.get(keyword)
    }

    /// The declared `type` string, if any.
    pub fn declared_type(&self) -> Option<&'a str> {
        self.constraint("type")?.as_str()
    }

    /// True when the node explicitly declares a type.
    pub fn has_declared_type(&self) -> bool {
        self.declared_type().is_some()
    }
}

/// The capability the resolver requires of a node type.
///
/// The resolver knows nothing about the concrete node shape; it only asks
/// whether a node carries a reference, whether it refines the resolution
/// scope, and how to step into it by one fragment segment.
pub trait RefNode {
    /// The `$ref` string carried by this node, if any.
    fn find_ref(&self) -> Option<&str>;

    /// The scope-refinement (`id`) declared by this node, if any.
    ///
    /// Only consulted at schema-node positions; values inside a
    /// `properties` map are reached by name lookup and never asked.
    fn find_scope_refinement(&self) -> Option<&str>;

    /// Steps into the child named by one decoded fragment segment.
    fn resolve_fragment(&self, segment: &str) -> Option<&Self>;
}

impl RefNode for Value {
    fn find_ref(&self) -> Option<&str> {
        self.as_object()?.get("$ref")?.as_str()
    }

    fn find_scope_refinement(&self) -> Option<&str> {
        let object = self.as_object()?;
        object
            .get("id")
            .or_else(|| object.get("$id"))
            .and_then(Value::as_str)
    }

    fn resolve_fragment(&self, segment: &str) -> Option<&Self> {
        match self {
            Value::Object(object) => object.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }
}

/// The JSON kind name of an instance value, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
