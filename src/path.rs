//! Paths into schema and instance trees.
//!
//! A [`JsonPath`] locates one node in a nested JSON structure as an ordered
//! sequence of field and index segments. The same type serves both paths a
//! validation carries: the *instance path* (where we are in the value being
//! validated) and the *schema path* (where we are in the schema document).
//!
//! Paths are persistent: pushing a segment links a new head onto the
//! existing path, so the thousands of scope copies a deep validation makes
//! share their common prefixes instead of cloning them.

use std::fmt::{self, Display};
use std::sync::Arc;

/// One step of a path: a property name or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A field/property access (e.g., `user`, `email`)
    Field(String),
    /// An array index access (e.g., `[0]`, `[42]`)
    Index(usize),
}

/// A link in the shared path spine, holding the last segment and the path
/// it extends.
#[derive(Debug)]
struct Link {
    segment: PathSegment,
    parent: Option<Arc<Link>>,
    depth: usize,
}

/// A path to a node in a nested JSON-like structure.
///
/// Rendered like `users[0].email`. Pushing never mutates the receiver; it
/// returns a longer path whose prefix is shared with the original, which is
/// what lets validation frames hand paths down by value cheaply.
///
/// # Example
///
/// ```rust
/// use refract::JsonPath;
///
/// let users = JsonPath::root().push_field("users");
/// let first = users.push_index(0).push_field("email");
///
/// assert_eq!(users.to_string(), "users");
/// assert_eq!(first.to_string(), "users[0].email");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonPath {
    head: Option<Arc<Link>>,
}

impl JsonPath {
    /// The empty path, denoting the root node.
    pub fn root() -> Self {
        Self::default()
    }

    fn push(&self, segment: PathSegment) -> Self {
        Self {
            head: Some(Arc::new(Link {
                segment,
                parent: self.head.clone(),
                depth: self.depth() + 1,
            })),
        }
    }

    /// Returns this path extended by a field segment.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Field(name.into()))
    }

    /// Returns this path extended by an index segment.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    /// Returns this path extended by a pointer segment.
    ///
    /// Numeric segments become index segments, anything else a field
    /// segment. The resolver uses this when walking `$ref` fragments, where
    /// a segment's role depends on the node it lands on.
    pub fn push_pointer_segment(&self, segment: &str) -> Self {
        match segment.parse::<usize>() {
            Ok(index) => self.push_index(index),
            Err(_) => self.push_field(segment),
        }
    }

    /// True for the root path, which has no segments.
    pub fn is_root(&self) -> bool {
        self.head.is_none()
    }

    /// Number of segments between the root and this node.
    pub fn depth(&self) -> usize {
        self.head.as_deref().map_or(0, |link| link.depth)
    }

    /// The segments of this path, root-first.
    ///
    /// The spine is stored leaf-first, so this materializes and reverses;
    /// it is meant for error reporting and tests, not hot paths.
    pub fn segments(&self) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(self.depth());
        let mut cursor = self.head.as_deref();
        while let Some(link) = cursor {
            segments.push(link.segment.clone());
            cursor = link.parent.as_deref();
        }
        segments.reverse();
        segments
    }
}

impl PartialEq for JsonPath {
    fn eq(&self, other: &Self) -> bool {
        self.depth() == other.depth() && self.segments() == other.segments()
    }
}

impl Eq for JsonPath {}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in self.segments() {
            match segment {
                PathSegment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(&name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_segments() {
        let root = JsonPath::root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert!(root.segments().is_empty());
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn test_rendering() {
        let cases = [
            (JsonPath::root().push_field("user"), "user"),
            (JsonPath::root().push_index(3), "[3]"),
            (
                JsonPath::root().push_field("users").push_index(0),
                "users[0]",
            ),
            (
                JsonPath::root()
                    .push_index(1)
                    .push_field("tags")
                    .push_index(2)
                    .push_field("name"),
                "[1].tags[2].name",
            ),
        ];
        for (path, rendered) in cases {
            assert_eq!(path.to_string(), rendered);
        }
    }

    #[test]
    fn test_pushing_shares_the_prefix() {
        let base = JsonPath::root().push_field("items");
        let left = base.push_index(0);
        let right = base.push_index(1);

        // The base is untouched and both children extend it.
        assert_eq!(base.to_string(), "items");
        assert_eq!(base.depth(), 1);
        assert_eq!(left.to_string(), "items[0]");
        assert_eq!(right.to_string(), "items[1]");
        assert_eq!(left.depth(), 2);
    }

    #[test]
    fn test_pointer_segments_pick_index_or_field() {
        let path = JsonPath::root()
            .push_pointer_segment("definitions")
            .push_pointer_segment("2")
            .push_pointer_segment("a-b");

        assert_eq!(
            path.segments(),
            vec![
                PathSegment::Field("definitions".to_string()),
                PathSegment::Index(2),
                PathSegment::Field("a-b".to_string()),
            ]
        );
    }

    #[test]
    fn test_equality_is_structural() {
        let shared = JsonPath::root().push_field("a");
        let built_together = shared.push_index(0);
        let built_apart = JsonPath::root().push_field("a").push_index(0);

        // Same segment sequence compares equal regardless of sharing.
        assert_eq!(built_together, built_apart);
        assert_ne!(built_together, shared);
        assert_ne!(built_apart, JsonPath::root().push_field("a").push_index(1));
    }

    #[test]
    fn test_segments_come_back_root_first() {
        let path = JsonPath::root().push_field("a").push_field("b").push_index(9);
        let segments = path.segments();

        assert_eq!(segments.first(), Some(&PathSegment::Field("a".to_string())));
        assert_eq!(segments.last(), Some(&PathSegment::Index(9)));
    }
}
