//! The resolution scope threaded through validation.
//!
//! A [`Scope`] is a value: every descent produces a modified copy, so the
//! caller's scope is untouched when a branch returns. This is what makes
//! restore-root-after-resolve fall out for free — a remote document replaces
//! `document_root` only in the copies handed to the sub-resolution.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::path::JsonPath;
use crate::uri;

/// The context one validation frame runs in.
///
/// Carries the document treated as root for `#`-anchored references, the
/// two paths (schema and instance), the active base URI established by the
/// nearest enclosing `id`, and the set of references already entered on the
/// current resolution chain.
#[derive(Debug, Clone)]
pub struct Scope {
    document_root: Arc<Value>,
    schema_path: JsonPath,
    instance_path: JsonPath,
    id: Option<String>,
    /// The raw id string `id` was derived from. Refining with the same raw
    /// id again is a no-op, so the resolver and the dispatcher can both
    /// refine on entry without compounding.
    id_source: Option<String>,
    at_root: bool,
    visited: HashSet<String>,
}

impl Scope {
    /// Creates the initial scope for a validation call.
    ///
    /// Paths are empty, no id is active, and the visited set starts fresh.
    pub fn new(document_root: Arc<Value>) -> Self {
        Self {
            document_root,
            schema_path: JsonPath::root(),
            instance_path: JsonPath::root(),
            id: None,
            id_source: None,
            at_root: true,
            visited: HashSet::new(),
        }
    }

    /// The schema node currently treated as the document root.
    pub fn document_root(&self) -> &Arc<Value> {
        &self.document_root
    }

    /// The current schema path.
    pub fn schema_path(&self) -> &JsonPath {
        &self.schema_path
    }

    /// The current instance path.
    pub fn instance_path(&self) -> &JsonPath {
        &self.instance_path
    }

    /// The active base URI, when an enclosing node declared one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True while the active id is the document root's own (no nested
    /// refinement has occurred). Relative references resolve differently
    /// against a root id (see [`uri::normalize`]).
    pub fn at_root(&self) -> bool {
        self.at_root
    }

    /// Returns a scope whose document root is `root`.
    ///
    /// Used when a remote fetch re-anchors `#`-references for the duration
    /// of a sub-resolution; the caller's scope still holds the outer root.
    pub fn with_document_root(&self, root: Arc<Value>) -> Self {
        let mut scope = self.clone();
        scope.document_root = root;
        scope
    }

    /// Returns a scope whose id is `raw_id` normalized against the current
    /// id. Entering any node that declares an id goes through here.
    ///
    /// Re-entering the node whose id produced the current refinement is a
    /// no-op.
    pub fn refine_id(&self, raw_id: &str) -> Self {
        if self.id_source.as_deref() == Some(raw_id) {
            return self.clone();
        }
        let mut scope = self.clone();
        scope.id = Some(uri::normalize(raw_id, self.id.as_deref(), self.at_root));
        scope.id_source = Some(raw_id.to_string());
        scope.at_root = false;
        scope
    }

    /// Returns a scope with an id installed as the document root's own id.
    pub fn with_root_id(&self, raw_id: &str) -> Self {
        let mut scope = self.clone();
        scope.id = Some(raw_id.to_string());
        scope.id_source = Some(raw_id.to_string());
        scope.at_root = true;
        scope
    }

    /// Extends the schema path by a field segment. The instance did not
    /// move, so the visited set is carried along.
    pub fn push_schema_field(&self, name: impl Into<String>) -> Self {
        let mut scope = self.clone();
        scope.schema_path = scope.schema_path.push_field(name);
        scope
    }

    /// Extends the schema path by an index segment.
    pub fn push_schema_index(&self, index: usize) -> Self {
        let mut scope = self.clone();
        scope.schema_path = scope.schema_path.push_index(index);
        scope
    }

    /// Extends the schema path by a pointer segment (resolver fragments).
    pub fn push_schema_pointer(&self, segment: &str) -> Self {
        let mut scope = self.clone();
        scope.schema_path = scope.schema_path.push_pointer_segment(segment);
        scope
    }

    /// Descends into an instance property.
    ///
    /// Instance progress restarts the resolution chain: the visited set is
    /// cleared so a recursive schema can be entered again one level deeper.
    pub fn push_instance_field(&self, name: impl Into<String>) -> Self {
        let mut scope = self.clone();
        scope.instance_path = scope.instance_path.push_field(name);
        scope.visited = HashSet::new();
        scope
    }

    /// Descends into an instance array element. Clears the visited set,
    /// like [`Scope::push_instance_field`].
    pub fn push_instance_index(&self, index: usize) -> Self {
        let mut scope = self.clone();
        scope.instance_path = scope.instance_path.push_index(index);
        scope.visited = HashSet::new();
        scope
    }

    /// Records a reference as entered on the current resolution chain.
    pub fn mark_visited(&self, reference: &str) -> Self {
        let mut scope = self.clone();
        scope.visited.insert(reference.to_string());
        scope
    }

    /// True when the reference was already entered on this chain.
    pub fn is_visited(&self, reference: &str) -> bool {
        self.visited.contains(reference)
    }
}
