//! URI composition for reference resolution.
//!
//! Pure functions only: merging a `$ref` pointer with the active resolution
//! scope into an absolute URI, deriving base URIs from `id` declarations,
//! and tokenizing JSON-Pointer fragments.

use url::Url;

/// Extracts the scheme from a URI, permissively.
///
/// The first `:`-delimited segment is taken and non-alphabetic characters
/// are stripped before lowercasing. Segments containing `/` or `#` before
/// the colon are not schemes.
pub fn scheme_of(uri: &str) -> Option<String> {
    let head = uri.split(':').next()?;
    if head.len() == uri.len() || head.contains('/') || head.contains('#') {
        return None;
    }
    let scheme: String = head
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    if scheme.is_empty() {
        None
    } else {
        Some(scheme)
    }
}

/// Returns true when the URI carries a scheme and is therefore absolute.
pub fn is_absolute(uri: &str) -> bool {
    scheme_of(uri).is_some()
}

/// Merges a `$ref` pointer with the active scope id into an absolute URI.
///
/// `id` is the scope's active base URI (absolute when present); `at_root`
/// marks a scope whose id came from the document root rather than a nested
/// refinement, in which case relative pointers resolve against the base
/// derived from the id instead of the id itself.
///
/// Rules, in priority order:
/// 1. A `#`-anchored pointer replaces the id's fragment.
/// 2. An already-absolute pointer is returned as-is, canonicalized with a
///    trailing `#` when it has neither fragment nor trailing `/`.
/// 3. Anything else is joined onto the base.
pub fn normalize(pointer: &str, id: Option<&str>, at_root: bool) -> String {
    if pointer.starts_with('#') {
        return match id {
            Some(id) => {
                let stem = match id.find('#') {
                    Some(idx) => &id[..idx],
                    None => id,
                };
                format!("{}{}", stem, pointer)
            }
            None => pointer.to_string(),
        };
    }

    if is_absolute(pointer) {
        return with_canonical_fragment(pointer.to_string(), pointer);
    }

    let base = match id {
        Some(id) if at_root => base_of(id),
        Some(id) => id.to_string(),
        None => return with_canonical_fragment(pointer.to_string(), pointer),
    };

    let joined = if base.ends_with('/') {
        format!("{}{}", base, pointer)
    } else {
        format!("{}/{}", base, pointer)
    };
    with_canonical_fragment(joined, pointer)
}

/// Appends `#` iff the original pointer has neither a fragment nor a
/// trailing `/`.
fn with_canonical_fragment(uri: String, pointer: &str) -> String {
    if pointer.contains('#') || pointer.ends_with('/') {
        uri
    } else {
        format!("{}#", uri)
    }
}

/// Derives the base URI to resolve relative documents against from an id.
///
/// With a host present the base is the authority (`scheme://host[:port]`);
/// without one (e.g. a `file:` URL) it is everything up to and including
/// the last `/` of the id.
pub fn base_of(id: &str) -> String {
    let stem = match id.find('#') {
        Some(idx) => &id[..idx],
        None => id,
    };

    if let Ok(url) = Url::parse(stem) {
        if let Some(host) = url.host_str().filter(|host| !host.is_empty()) {
            return match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            };
        }
    }

    match stem.rfind('/') {
        Some(idx) => stem[..=idx].to_string(),
        None => stem.to_string(),
    }
}

/// Splits a URI's fragment into decoded JSON-Pointer segments.
///
/// The portion after the first `#` (the whole string when there is none) is
/// split on `/`; each segment gets JSON-Pointer unescaping (`~1` then `~0`)
/// followed by percent-decoding. A leading `/` yields a leading empty
/// segment, preserved here and skipped by the resolver.
pub fn fragment_segments(uri: &str) -> Vec<String> {
    let fragment = match uri.find('#') {
        Some(idx) => &uri[idx + 1..],
        None => uri,
    };
    fragment
        .split('/')
        .map(|segment| percent_decode(&segment.replace("~1", "/").replace("~0", "~")))
        .collect()
}

/// Decodes `%XX` escapes, leaving malformed escapes untouched.
fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_extraction() {
        assert_eq!(scheme_of("http://example.com/s.json"), Some("http".into()));
        assert_eq!(scheme_of("file:///tmp/s.json"), Some("file".into()));
        assert_eq!(scheme_of("mem:docs/a"), Some("mem".into()));
        assert_eq!(scheme_of("#/definitions/a"), None);
        assert_eq!(scheme_of("other.json"), None);
        assert_eq!(scheme_of("a/b:c"), None);
    }

    #[test]
    fn test_scheme_extraction_is_permissive() {
        // Non-alphabetic characters are stripped rather than rejected.
        assert_eq!(scheme_of("ht+tp://example.com"), Some("http".into()));
    }

    #[test]
    fn test_normalize_fragment_pointer_replaces_id_fragment() {
        let id = Some("http://example.com/schema.json#");
        assert_eq!(
            normalize("#/definitions/a", id, true),
            "http://example.com/schema.json#/definitions/a"
        );
    }

    #[test]
    fn test_normalize_fragment_pointer_without_id() {
        assert_eq!(normalize("#/definitions/a", None, true), "#/definitions/a");
    }

    #[test]
    fn test_normalize_absolute_gets_trailing_hash() {
        assert_eq!(
            normalize("http://example.com/other.json", None, true),
            "http://example.com/other.json#"
        );
        assert_eq!(
            normalize("http://example.com/other.json#/a", None, true),
            "http://example.com/other.json#/a"
        );
        assert_eq!(
            normalize("http://example.com/dir/", None, true),
            "http://example.com/dir/"
        );
    }

    #[test]
    fn test_normalize_relative_against_root_scope() {
        // Root scope: the base is derived from the id (authority for hosted
        // URLs), not the id itself.
        let id = Some("http://example.com/schemas/main.json#");
        assert_eq!(
            normalize("other.json", id, true),
            "http://example.com/other.json#"
        );
    }

    #[test]
    fn test_normalize_relative_against_refined_scope() {
        let id = Some("http://example.com/schemas/nested/");
        assert_eq!(
            normalize("other.json", id, false),
            "http://example.com/schemas/nested/other.json#"
        );
    }

    #[test]
    fn test_base_of_hosted_url() {
        assert_eq!(
            base_of("http://example.com/schemas/main.json#"),
            "http://example.com"
        );
        assert_eq!(
            base_of("http://example.com:8080/main.json"),
            "http://example.com:8080"
        );
    }

    #[test]
    fn test_base_of_file_url() {
        assert_eq!(base_of("file:///tmp/schemas/main.json"), "file:///tmp/schemas/");
    }

    #[test]
    fn test_fragment_segments_basic() {
        assert_eq!(
            fragment_segments("#/definitions/user"),
            vec!["", "definitions", "user"]
        );
    }

    #[test]
    fn test_fragment_segments_without_hash() {
        assert_eq!(fragment_segments("definitions/user"), vec!["definitions", "user"]);
    }

    #[test]
    fn test_fragment_segments_unescaping() {
        // ~1 before ~0: "~01" must become "~1", not "/".
        assert_eq!(fragment_segments("#/a~1b/c~0d"), vec!["", "a/b", "c~d"]);
        assert_eq!(fragment_segments("#/x~01"), vec!["", "x~1"]);
    }

    #[test]
    fn test_fragment_segments_percent_decoding() {
        assert_eq!(fragment_segments("#/with%20space"), vec!["", "with space"]);
        // Malformed escapes stay as-is.
        assert_eq!(fragment_segments("#/50%"), vec!["", "50%"]);
    }
}
