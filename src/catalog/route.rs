//! Route path encoding
//!
//! A file's route is its data-root-relative path, percent-encoded as a single
//! URL path segment. Every byte outside `A-Z a-z 0-9 - _ . ~` is escaped, which
//! covers `/` as well as `!`, `'`, `(`, `)` and `*`. Percent-encoding is
//! injective, so distinct relative paths never share a route.

use std::path::{Component, Path};

/// Relative path of `file` under `root`, components joined with `/`.
///
/// Returns `None` when `file` is not under `root` or a component is not
/// valid UTF-8 (lossy conversion could make two files collide).
pub fn relative_key(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Encode a relative key as one path segment
pub fn encode_segment(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Full route for a relative key under `prefix` (which ends with `/`)
pub fn route_for(prefix: &str, key: &str) -> String {
    format!("{prefix}{}", encode_segment(key))
}

/// Turn a raw request suffix back into a relative key.
///
/// Accepts any equivalent encoding (`%2F` or `%2f`, escaped or literal
/// unreserved characters). Invalid UTF-8 after decoding yields `None`.
pub fn decode_segment(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(std::borrow::Cow::into_owned)
}
