//! # Refract
//!
//! A JSON Schema validation core built from two halves:
//!
//! - a **reference resolver** that follows `$ref` chains through a graph of
//!   schema nodes, tracking the dynamic resolution scope (`id` refinements,
//!   document roots, visited references), fetching and caching remote
//!   documents through a pluggable scheme-handler registry;
//! - a **validation dispatcher** that walks schema and instance in
//!   lockstep, dispatching on the (instance kind, schema kind) pair while
//!   threading two paths — schema path and instance path — through every
//!   frame.
//!
//! Validation accumulates: one call returns *all* errors it found, each
//! carrying the instance path, a human-readable message, and the offending
//! sub-value, via stillwater's `Validation` type.
//!
//! ## Example
//!
//! ```rust
//! use refract::Validator;
//! use serde_json::json;
//!
//! let validator = Validator::new(json!({
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string", "minLength": 1},
//!         "tags": {"type": "array", "items": {"$ref": "#/definitions/tag"}}
//!     },
//!     "required": ["name"],
//!     "definitions": {
//!         "tag": {"type": "string"}
//!     }
//! }));
//!
//! let result = validator.validate(&json!({"name": "", "tags": ["a", 1]}));
//! let errors = result.into_result().unwrap_err();
//! // Both failures are reported, each at its exact path.
//! assert_eq!(errors.len(), 2);
//! ```
//!
//! ## Remote references
//!
//! `$ref` targets with a scheme are fetched through the
//! [`SchemeRegistry`]: `file` is built in, `http`/`https` come with the
//! default-on `remote` feature, and callers can register their own
//! handlers (tests here register in-memory ones). Fetched documents are
//! cached for the lifetime of the [`Resolver`].

pub mod cache;
pub mod error;
pub mod fetch;
pub mod keywords;
pub mod path;
pub mod resolver;
pub mod schema;
pub mod scope;
pub mod uri;
pub mod validator;

pub use cache::DocumentCache;
pub use error::{ResolveError, SchemaError, SchemaErrors};
pub use fetch::{FetchHandler, SchemeRegistry};
pub use path::{JsonPath, PathSegment};
pub use resolver::Resolver;
pub use schema::{RefNode, SchemaKind, SchemaNode};
pub use scope::Scope;
pub use validator::Validator;

/// Type alias for validation results using SchemaErrors
pub type ValidationResult<T> = stillwater::Validation<T, SchemaErrors>;
