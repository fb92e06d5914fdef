//! Pluggable resource providers.
//!
//! A resource answers requests for one path template. It declares the
//! content type of its responses, whether those responses go through the
//! REST cache, and produces a payload for a given request.
//!
//! ## Module Structure
//!
//! - `json`: `CachedJsonResource` and collection splitting
//! - `passthrough`: `PassthroughResource` for images and static content
//! - `dynamic`: `FnResource`, a closure-backed provider

mod dynamic;
mod json;
mod passthrough;

use crate::request::RequestArtifacts;
use bytes::Bytes;

pub use dynamic::FnResource;
pub use json::{extract_id, split_collection, CachedJsonResource};
pub use passthrough::{ImageType, PassthroughResource};

/// Default content type for JSON resources.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Whether a resource's responses are routed through the REST cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// GET warms and reads the cache, POST and DELETE mutate it.
    #[default]
    Rest,
    /// Every request calls the provider; the cache is never touched.
    Passthrough,
}

/// Raw payload produced by a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub data: Bytes,
    /// Id of the item this payload represents, used as the cache key on POST.
    pub id: Option<i64>,
}

impl Payload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Errors raised while producing or interpreting a payload.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Collection item {index} has no numeric id")]
    MissingId { index: usize },
    #[error("Payload carries no id to cache it under")]
    NoId,
    #[error("Payload is neither a JSON array nor a JSON object")]
    NotACollection,
    #[error("{0}")]
    Failed(String),
}

/// A provider of canonical response payloads for one path template.
pub trait Resource: Send + Sync {
    /// Path the resource answers for, e.g. `/users/:id/pets`.
    fn resource_identifier(&self) -> &str;

    fn content_type(&self) -> &str;

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::Rest
    }

    /// Produce the payload for `request`.
    ///
    /// For REST resources a collection request expects a JSON array of
    /// objects carrying an `id` field; a POST expects a payload with an id.
    fn produce(&self, request: &RequestArtifacts) -> Result<Payload, ResourceError>;
}

impl std::fmt::Debug for dyn Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("identifier", &self.resource_identifier())
            .field("content_type", &self.content_type())
            .field("cache_policy", &self.cache_policy())
            .finish()
    }
}
