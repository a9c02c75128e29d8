//! Scheme handlers for fetching referenced documents.
//!
//! The resolver never talks to the network or the filesystem itself; it
//! asks the [`SchemeRegistry`] for the handler matching a URI's scheme.
//! Callers replace or extend the registry to control transport, timeouts,
//! retries, or to serve documents from memory in tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::ResolveError;
use crate::uri;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// A function that opens a URI, reads it fully, and returns the parsed
/// document. The fragment has already been stripped by the caller.
pub type FetchHandler = Arc<dyn Fn(&str) -> Result<Value, ResolveError> + Send + Sync>;

/// Maps URI schemes to document fetchers.
///
/// [`SchemeRegistry::new`] installs the stock handlers: `file`, plus
/// `http`/`https` when the `remote` feature is enabled. Registering a
/// handler for an existing scheme replaces it.
///
/// # Example
///
/// ```rust
/// use refract::SchemeRegistry;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let mut registry = SchemeRegistry::empty();
/// registry.register("mem", Arc::new(|uri: &str| {
///     Ok(json!({"fetched": uri}))
/// }));
///
/// let doc = registry.fetch("mem:docs/a#/x").unwrap();
/// assert_eq!(doc["fetched"], "mem:docs/a");
/// ```
#[derive(Clone)]
pub struct SchemeRegistry {
    handlers: HashMap<String, FetchHandler>,
}

impl SchemeRegistry {
    /// Creates a registry with the stock handlers installed.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("file", Arc::new(fetch_file));
        #[cfg(feature = "remote")]
        {
            registry.register("http", Arc::new(fetch_http));
            registry.register("https", Arc::new(fetch_http));
        }
        registry
    }

    /// Creates a registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Installs a handler for a scheme, replacing any existing one.
    pub fn register(&mut self, scheme: impl Into<String>, handler: FetchHandler) {
        self.handlers.insert(scheme.into(), handler);
    }

    /// True when a handler exists for the scheme.
    pub fn supports(&self, scheme: &str) -> bool {
        self.handlers.contains_key(scheme)
    }

    /// Fetches the document a URI names, routing by scheme.
    ///
    /// The fragment is stripped before the handler runs: handlers fetch
    /// whole documents, and the resolver walks fragments afterwards.
    pub fn fetch(&self, uri_str: &str) -> Result<Value, ResolveError> {
        let document_uri = match uri_str.find('#') {
            Some(idx) => &uri_str[..idx],
            None => uri_str,
        };

        let scheme = uri::scheme_of(document_uri).ok_or_else(|| ResolveError::MalformedRef {
            reference: uri_str.to_string(),
            reason: "no scheme in document URI".to_string(),
        })?;

        let handler = self
            .handlers
            .get(&scheme)
            .ok_or_else(|| ResolveError::UnknownScheme {
                scheme,
                uri: uri_str.to_string(),
            })?;

        handler(document_uri)
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<_> = self.handlers.keys().collect();
        schemes.sort();
        f.debug_struct("SchemeRegistry")
            .field("schemes", &schemes)
            .finish()
    }
}

/// Reads a `file:` URI from disk.
fn fetch_file(uri_str: &str) -> Result<Value, ResolveError> {
    let path: PathBuf = match Url::parse(uri_str) {
        Ok(url) => url
            .to_file_path()
            .map_err(|_| ResolveError::MalformedRef {
                reference: uri_str.to_string(),
                reason: "not a local file URL".to_string(),
            })?,
        Err(_) => PathBuf::from(uri_str.trim_start_matches("file://")),
    };

    let content =
        std::fs::read_to_string(&path).map_err(|source| ResolveError::UnknownDocument {
            uri: uri_str.to_string(),
            reason: source.to_string(),
        })?;

    serde_json::from_str(&content).map_err(|source| ResolveError::InvalidDocument {
        uri: uri_str.to_string(),
        source,
    })
}

/// Fetches an `http:`/`https:` URI with the blocking client.
#[cfg(feature = "remote")]
fn fetch_http(uri_str: &str) -> Result<Value, ResolveError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| ResolveError::UnknownDocument {
            uri: uri_str.to_string(),
            reason: source.to_string(),
        })?;

    let body = client
        .get(uri_str)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|source| ResolveError::UnknownDocument {
            uri: uri_str.to_string(),
            reason: source.to_string(),
        })?;

    serde_json::from_str(&body).map_err(|source| ResolveError::InvalidDocument {
        uri: uri_str.to_string(),
        source,
    })
}
