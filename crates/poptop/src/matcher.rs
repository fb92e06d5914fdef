//! Path template normalization.
//!
//! Request paths and resource identifiers share one key space: every purely
//! numeric segment is replaced by the `:id` placeholder and its value is
//! collected, left to right. Identifiers may also be declared with named
//! placeholders (`/users/:user_id`), which collapse onto the same `:id` token.
//!
//! ```
//! use poptop::matcher::normalize;
//!
//! let normalized = normalize("/path/123/to/456");
//! assert_eq!(normalized.template.as_str(), "/path/:id/to/:id");
//! assert_eq!(normalized.ids, vec![123, 456]);
//! ```

use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Placeholder substituted for every numeric (or named) path segment.
pub const ID_PLACEHOLDER: &str = ":id";

const SEPARATOR: char = '/';

/// A normalized request path used as the registry key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Normalize `path` and keep only its template.
    pub fn parse(path: &str) -> Self {
        normalize(path).template
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the degenerate template produced by an empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathTemplate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PathTemplate {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Result of normalizing a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedPath {
    pub template: PathTemplate,
    /// Numeric segments in encounter order.
    pub ids: Vec<i64>,
    /// Set when the final segment is numeric: the request addresses one item.
    pub item_id: Option<i64>,
}

impl NormalizedPath {
    /// A collection request addresses no specific item.
    pub fn is_collection(&self) -> bool {
        self.item_id.is_none()
    }

    /// Template of the collection an item request belongs to:
    /// `/pets/:id` for `/pets/7` gives `/pets`. `None` for collection requests.
    pub fn collection_template(&self) -> Option<PathTemplate> {
        self.item_id?;
        let parent = self.template.0.strip_suffix(ID_PLACEHOLDER)?;
        let parent = parent.strip_suffix(SEPARATOR).unwrap_or(parent);
        if parent.is_empty() {
            Some(PathTemplate(SEPARATOR.to_string()))
        } else {
            Some(PathTemplate(parent.to_string()))
        }
    }
}

/// Normalize a request path or resource identifier.
///
/// Never fails: an empty (or whitespace-only) input yields an empty template
/// that matches no registered resource.
pub fn normalize(path: &str) -> NormalizedPath {
    if path.trim().is_empty() {
        return NormalizedPath::default();
    }

    let mut ids = Vec::new();
    let mut item_id = None;
    let mut segments: Vec<&str> = Vec::new();

    // Empty segments are dropped so "/a//b/" and "a/b" share a template
    for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
        if let Some(id) = parse_id(segment) {
            ids.push(id);
            item_id = Some(id);
            segments.push(ID_PLACEHOLDER);
        } else if segment.starts_with(':') {
            item_id = None;
            segments.push(ID_PLACEHOLDER);
        } else {
            item_id = None;
            segments.push(segment);
        }
    }

    let mut template = String::with_capacity(path.len() + 1);
    template.push(SEPARATOR);
    template.push_str(&segments.join("/"));

    NormalizedPath {
        template: PathTemplate(template),
        ids,
        item_id,
    }
}

/// Digits only: signs and overflowing values stay literal segments.
fn parse_id(segment: &str) -> Option<i64> {
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Split a raw request target into its path and query string.
///
/// Accepts origin-form targets (`/a/1?x=y`), absolute URLs
/// (`http://host/a/1?x=y`) and bare relative paths (`a/1`). Fragments are
/// discarded; an empty query is reported as `None`.
pub fn split_target(raw: &str) -> (String, Option<String>) {
    let without_fragment = raw.split('#').next().unwrap_or_default();

    if without_fragment.starts_with(SEPARATOR) || without_fragment.contains("://") {
        if let Ok(uri) = without_fragment.parse::<http::Uri>() {
            let query = uri.query().filter(|q| !q.is_empty()).map(str::to_string);
            return (uri.path().to_string(), query);
        }
    }

    match without_fragment.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path.to_string(), Some(query.to_string())),
        Some((path, _)) => (path.to_string(), None),
        None => (without_fragment.to_string(), None),
    }
}
