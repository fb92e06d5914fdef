//! Per-request data handed to resources.

use crate::matcher::{normalize, PathTemplate};
use crate::params::{parse_body, parse_params, Params};
use bytes::Bytes;
use std::fmt;

/// HTTP methods with REST semantics in the mock engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestMethod {
    Get,
    Post,
    Delete,
}

impl RestMethod {
    /// Parse a method token. Matching is exact: `get` is not `GET`.
    pub fn parse(method: &str) -> Option<Self> {
        let method = http::Method::from_bytes(method.as_bytes()).ok()?;
        Self::from_http(&method)
    }

    pub fn from_http(method: &http::Method) -> Option<Self> {
        match *method {
            http::Method::GET => Some(Self::Get),
            http::Method::POST => Some(Self::Post),
            http::Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Methods whose body is parsed as form data.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Post | Self::Delete)
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything extracted from one request.
#[derive(Debug, Clone)]
pub struct RequestArtifacts {
    pub method: RestMethod,
    /// Path as received, before normalization.
    pub path: String,
    pub template: PathTemplate,
    /// Numeric path segments, left to right.
    pub ids: Vec<i64>,
    /// Trailing numeric segment, when the request addresses one item.
    pub item_id: Option<i64>,
    pub query: Option<Params>,
    /// Form parameters, parsed for write methods only.
    pub body: Option<Params>,
    pub raw_body: Option<Bytes>,
}

impl RequestArtifacts {
    pub fn new(method: RestMethod, path: &str) -> Self {
        let normalized = normalize(path);
        Self {
            method,
            path: path.to_string(),
            template: normalized.template,
            ids: normalized.ids,
            item_id: normalized.item_id,
            query: None,
            body: None,
            raw_body: None,
        }
    }

    /// Key the request under the template of the resource that matched it.
    pub fn with_template(mut self, template: PathTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.and_then(parse_params);
        self
    }

    pub fn with_body(mut self, body: Option<&[u8]>) -> Self {
        let Some(body) = body.filter(|b| !b.is_empty()) else {
            return self;
        };
        if self.method.is_write() {
            self.body = parse_body(body);
        }
        self.raw_body = Some(Bytes::copy_from_slice(body));
        self
    }

    pub fn is_collection(&self) -> bool {
        self.item_id.is_none()
    }
}
