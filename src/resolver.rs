//! Reference resolution with dynamic scope tracking.
//!
//! [`Resolver::resolve`] turns a `$ref` string plus the scope it appears in
//! into the target node and the scope further resolution and validation
//! must proceed in. Remote documents are fetched through the scheme
//! registry and cached; fragments are walked with the [`RefNode`]
//! capability; reference chains are followed until a node without a `$ref`
//! is reached, with the scope's visited set breaking cycles.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::DocumentCache;
use crate::error::ResolveError;
use crate::fetch::SchemeRegistry;
use crate::schema::RefNode;
use crate::scope::Scope;
use crate::uri;

/// Resolves `$ref` strings against the current scope.
///
/// A resolver owns the document cache; sharing a resolver across
/// validation calls shares fetched documents. The scheme registry decides
/// how documents are actually obtained.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: SchemeRegistry,
    cache: DocumentCache,
}

impl Resolver {
    /// Creates a resolver with the stock scheme handlers.
    pub fn new() -> Self {
        Self::with_registry(SchemeRegistry::new())
    }

    /// Creates a resolver fetching through the given registry.
    pub fn with_registry(registry: SchemeRegistry) -> Self {
        Self {
            registry,
            cache: DocumentCache::new(),
        }
    }

    /// The document cache.
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Resolves a reference to its target node and updated scope.
    ///
    /// The returned scope carries the document root the target lives in
    /// (a fetched document for remote references), the id refinements
    /// picked up along the way, and the extended visited set. The caller's
    /// scope is untouched, which is what restores the outer root when the
    /// branch returns.
    ///
    /// If the resolved node itself carries a `$ref`, resolution continues
    /// until it does not. A reference already on the current chain is not
    /// an error: the node is returned as-is and the chain stops.
    pub fn resolve(
        &self,
        reference: &str,
        current: &Value,
        scope: &Scope,
    ) -> Result<(Value, Scope), ResolveError> {
        let (node, node_scope) = self.resolve_once(reference, current, scope)?;

        // Follow-through: keep resolving while the target is itself a ref.
        if let Some(next) = node.find_ref().map(str::to_string) {
            if !node_scope.is_visited(&next) {
                return self.resolve(&next, &node, &node_scope);
            }
        }
        Ok((node, node_scope))
    }

    /// One resolution step, dispatched on the shape of the reference.
    fn resolve_once(
        &self,
        reference: &str,
        current: &Value,
        scope: &Scope,
    ) -> Result<(Value, Scope), ResolveError> {
        if scope.is_visited(reference) {
            return Ok((current.clone(), scope.clone()));
        }
        let scope = scope.mark_visited(reference);

        if reference == "#" {
            let root = scope.document_root().as_ref().clone();
            return Ok((root, scope));
        }

        if reference.starts_with('#') {
            let root = Arc::clone(scope.document_root());
            return self.walk_segments(&root, reference, &scope);
        }

        if uri::is_absolute(reference) {
            return self.resolve_remote(reference, &scope);
        }

        // A bare fragment list resolves within the current node when it
        // can; otherwise the string names a relative document.
        if !reference.contains('#') {
            if let Ok(resolved) = self.walk_segments(current, reference, &scope) {
                return Ok(resolved);
            }
        }

        let normalized = uri::normalize(reference, scope.id(), scope.at_root());
        if uri::is_absolute(&normalized) {
            self.resolve_remote(&normalized, &scope)
        } else {
            Err(ResolveError::MalformedRef {
                reference: reference.to_string(),
                reason: "relative reference with no active base URI".to_string(),
            })
        }
    }

    /// Fetches a remote document and resolves the fragment within it.
    ///
    /// The fetched document replaces the scope's root for the duration of
    /// the sub-resolution, so `#`-anchored references inside it resolve
    /// against it. The caller's own scope still holds the outer root.
    fn resolve_remote(
        &self,
        reference: &str,
        scope: &Scope,
    ) -> Result<(Value, Scope), ResolveError> {
        let normalized = uri::normalize(reference, scope.id(), scope.at_root());
        let (stem, fragment) = match normalized.find('#') {
            Some(idx) => (&normalized[..idx], &normalized[idx..]),
            None => (normalized.as_str(), ""),
        };

        let document = self.fetch_document(stem, &normalized)?;

        let root_id = document
            .find_scope_refinement()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}#", stem));
        let fetched_scope = scope
            .with_document_root(Arc::clone(&document))
            .with_root_id(&root_id);

        if fragment.len() > 1 {
            self.walk_segments(&document, fragment, &fetched_scope)
        } else {
            Ok((document.as_ref().clone(), fetched_scope))
        }
    }

    /// Loads a document through the cache.
    fn fetch_document(&self, stem: &str, full_uri: &str) -> Result<Arc<Value>, ResolveError> {
        if let Some(document) = self.cache.get(stem) {
            return Ok(document);
        }
        let document = self.registry.fetch(full_uri)?;
        Ok(self.cache.put(stem, document))
    }

    /// Walks decoded fragment segments from a start node.
    ///
    /// The leading empty segment of a `#/...` fragment is skipped. An
    /// embedded reference met along the way is expanded before stepping
    /// through it; an id met along the way refines the scope. Each step
    /// extends the schema path.
    fn walk_segments(
        &self,
        start: &Value,
        reference: &str,
        scope: &Scope,
    ) -> Result<(Value, Scope), ResolveError> {
        let mut node = start.clone();
        let mut scope = scope.clone();

        for (i, segment) in uri::fragment_segments(reference).iter().enumerate() {
            if i == 0 && segment.is_empty() {
                continue;
            }

            if let Some(embedded) = node.find_ref().map(str::to_string) {
                if !scope.is_visited(&embedded) {
                    let (expanded, expanded_scope) = self.resolve(&embedded, &node, &scope)?;
                    node = expanded;
                    scope = expanded_scope;
                }
            }

            let child = node.resolve_fragment(segment).cloned().ok_or_else(|| {
                ResolveError::UnresolvableFragment {
                    reference: reference.to_string(),
                    segment: segment.clone(),
                }
            })?;

            scope = scope.push_schema_pointer(segment);
            if let Some(id) = child.find_scope_refinement() {
                scope = scope.refine_id(id);
            }
            node = child;
        }

        Ok((node, scope))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn resolver_with_documents(documents: &[(&str, Value)]) -> Resolver {
        let store: HashMap<String, Value> = documents
            .iter()
            .map(|(uri, doc)| (uri.to_string(), doc.clone()))
            .collect();
        let mut registry = SchemeRegistry::empty();
        registry.register(
            "mem",
            Arc::new(move |uri: &str| {
                store
                    .get(uri)
                    .cloned()
                    .ok_or_else(|| ResolveError::UnknownDocument {
                        uri: uri.to_string(),
                        reason: "no such document".to_string(),
                    })
            }),
        );
        Resolver::with_registry(registry)
    }

    #[test]
    fn test_hash_alone_returns_document_root() {
        let root = json!({"definitions": {"a": {"type": "string"}}});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (node, _) = resolver.resolve("#", &root, &scope).unwrap();
        assert_eq!(node, root);
    }

    #[test]
    fn test_pointer_walk() {
        let root = json!({"definitions": {"a": {"type": "string"}}});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (node, node_scope) = resolver
            .resolve("#/definitions/a", &root, &scope)
            .unwrap();
        assert_eq!(node, json!({"type": "string"}));
        assert_eq!(node_scope.schema_path().to_string(), "definitions.a");
    }

    #[test]
    fn test_pointer_walk_through_array_index() {
        let root = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (node, _) = resolver.resolve("#/anyOf/1", &root, &scope).unwrap();
        assert_eq!(node, json!({"type": "integer"}));
    }

    #[test]
    fn test_unresolvable_fragment() {
        let root = json!({"definitions": {}});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let result = resolver.resolve("#/definitions/missing", &root, &scope);
        assert!(matches!(
            result,
            Err(ResolveError::UnresolvableFragment { segment, .. }) if segment == "missing"
        ));
    }

    #[test]
    fn test_escaped_segments() {
        let root = json!({"definitions": {"a/b": {"type": "null"}}});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (node, _) = resolver.resolve("#/definitions/a~1b", &root, &scope).unwrap();
        assert_eq!(node, json!({"type": "null"}));
    }

    #[test]
    fn test_ref_to_ref_follow_through() {
        let root = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"type": "boolean"}
            }
        });
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (node, _) = resolver.resolve("#/definitions/a", &root, &scope).unwrap();
        assert_eq!(node, json!({"type": "boolean"}));
    }

    #[test]
    fn test_cycle_stops_without_error() {
        let root = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/a"}
            }
        });
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        // The chain a -> b stops when b points back at the already-visited
        // a; b's node is returned as-is.
        let (node, _) = resolver.resolve("#/definitions/a", &root, &scope).unwrap();
        assert_eq!(node, json!({"$ref": "#/definitions/a"}));
    }

    #[test]
    fn test_remote_fetch_replaces_root_for_sub_resolution() {
        let remote = json!({
            "definitions": {"x": {"type": "integer"}},
            "$ref_target": true
        });
        let resolver = resolver_with_documents(&[("mem:docs/b", remote)]);

        let local_root = json!({"$ref": "mem:docs/b#/definitions/x"});
        let scope = Scope::new(Arc::new(local_root.clone()));

        let (node, node_scope) = resolver
            .resolve("mem:docs/b#/definitions/x", &local_root, &scope)
            .unwrap();
        assert_eq!(node, json!({"type": "integer"}));
        // The returned scope is anchored in the fetched document...
        assert_eq!(
            node_scope.document_root().as_ref()["$ref_target"],
            json!(true)
        );
        // ...while the caller's scope still holds the outer root.
        assert_eq!(scope.document_root().as_ref(), &local_root);
    }

    #[test]
    fn test_remote_documents_are_cached() {
        let resolver = resolver_with_documents(&[("mem:docs/b", json!({"type": "string"}))]);
        let root = json!({});
        let scope = Scope::new(Arc::new(root.clone()));

        resolver.resolve("mem:docs/b#", &root, &scope).unwrap();
        resolver.resolve("mem:docs/b#", &root, &scope).unwrap();
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn test_bare_fragment_list_resolves_in_current_node() {
        let root = json!({"definitions": {"a": {"type": "string"}}});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (node, _) = resolver.resolve("definitions/a", &root, &scope).unwrap();
        assert_eq!(node, json!({"type": "string"}));
    }

    #[test]
    fn test_relative_document_resolves_against_scope_id() {
        let resolver = resolver_with_documents(&[("mem:docs/other", json!({"type": "null"}))]);
        let root = json!({});
        let scope = Scope::new(Arc::new(root.clone()))
            .with_root_id("mem:docs/")
            .refine_id("mem:docs/");

        let (node, _) = resolver.resolve("other", &root, &scope).unwrap();
        assert_eq!(node, json!({"type": "null"}));
    }

    #[test]
    fn test_relative_reference_without_base_fails() {
        let root = json!({});
        let scope = Scope::new(Arc::new(root.clone()));
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let result = resolver.resolve("other.json", &root, &scope);
        assert!(matches!(result, Err(ResolveError::MalformedRef { .. })));
    }

    #[test]
    fn test_walk_refines_id_on_entered_nodes() {
        let root = json!({
            "id": "mem:docs/root#",
            "definitions": {
                "inner": {
                    "id": "mem:docs/inner#",
                    "type": "object"
                }
            }
        });
        let scope = Scope::new(Arc::new(root.clone())).with_root_id("mem:docs/root#");
        let resolver = Resolver::with_registry(SchemeRegistry::empty());

        let (_, node_scope) = resolver
            .resolve("#/definitions/inner", &root, &scope)
            .unwrap();
        assert_eq!(node_scope.id(), Some("mem:docs/inner#"));
        assert!(!node_scope.at_root());
    }
}
