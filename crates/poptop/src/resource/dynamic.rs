use super::{CachePolicy, Payload, Resource, ResourceError, JSON_CONTENT_TYPE};
use crate::request::RequestArtifacts;

/// A resource whose payload is computed by a closure.
///
/// ```
/// use poptop::resource::{FnResource, Payload};
///
/// let pets = FnResource::new("/pets", |request| {
///     let name = request
///         .body
///         .as_ref()
///         .and_then(|body| body.get("name"))
///         .unwrap_or("unnamed");
///     Ok(Payload::new(format!(r#"{{"id":1,"name":"{name}"}}"#)).with_id(1))
/// });
/// # let _ = pets;
/// ```
pub struct FnResource<F> {
    identifier: String,
    content_type: String,
    cache_policy: CachePolicy,
    produce: F,
}

impl<F> FnResource<F> {
    pub fn new(identifier: impl Into<String>, produce: F) -> Self
    where
        F: Fn(&RequestArtifacts) -> Result<Payload, ResourceError> + Send + Sync,
    {
        Self {
            identifier: identifier.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            cache_policy: CachePolicy::Rest,
            produce,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }
}

impl<F> Resource for FnResource<F>
where
    F: Fn(&RequestArtifacts) -> Result<Payload, ResourceError> + Send + Sync,
{
    fn resource_identifier(&self) -> &str {
        &self.identifier
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    fn produce(&self, request: &RequestArtifacts) -> Result<Payload, ResourceError> {
        (self.produce)(request)
    }
}
