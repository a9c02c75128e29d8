//! Reference-resolution failures.

use thiserror::Error;

/// Errors produced while resolving a `$ref`.
///
/// Resolution errors abort the validation branch that required the
/// reference; the dispatcher converts them into a single `resolution_error`
/// [`SchemaError`](crate::SchemaError) keyed at the current instance path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A fragment segment named a property or index the target node lacks.
    #[error("cannot resolve fragment '{segment}' in reference '{reference}'")]
    UnresolvableFragment {
        reference: String,
        segment: String,
    },

    /// The referenced document could not be fetched.
    #[error("cannot fetch document '{uri}': {reason}")]
    UnknownDocument { uri: String, reason: String },

    /// The fetched document was not parseable JSON.
    #[error("document '{uri}' is not valid JSON: {source}")]
    InvalidDocument {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    /// The reference string itself was malformed.
    #[error("malformed reference '{reference}': {reason}")]
    MalformedRef { reference: String, reason: String },

    /// No handler is registered for the URI's scheme.
    #[error("no handler registered for scheme '{scheme}' in reference '{uri}'")]
    UnknownScheme { scheme: String, uri: String },
}

impl ResolveError {
    /// The reference or URI this error is about.
    pub fn subject(&self) -> &str {
        match self {
            ResolveError::UnresolvableFragment { reference, .. } => reference,
            ResolveError::UnknownDocument { uri, .. } => uri,
            ResolveError::InvalidDocument { uri, .. } => uri,
            ResolveError::MalformedRef { reference, .. } => reference,
            ResolveError::UnknownScheme { uri, .. } => uri,
        }
    }
}
