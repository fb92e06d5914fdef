//! Resources that bypass the REST cache.

use super::{CachePolicy, Payload, Resource, ResourceError};
use crate::request::RequestArtifacts;
use bytes::Bytes;

/// Supported image encodings for image payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpg",
            ImageType::Png => "png",
        }
    }

    /// Image type for a file extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            _ => None,
        }
    }
}

/// Static content returned verbatim for every request.
#[derive(Debug, Clone)]
pub struct PassthroughResource {
    identifier: String,
    content_type: String,
    data: Bytes,
}

impl PassthroughResource {
    pub fn new(
        identifier: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Already-encoded image bytes.
    pub fn image(
        identifier: impl Into<String>,
        image_type: ImageType,
        data: impl Into<Bytes>,
    ) -> Self {
        Self::new(identifier, image_type.content_type(), data)
    }

    pub fn text(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(identifier, "text/plain; charset=utf-8", Bytes::from(text.into()))
    }
}

impl Resource for PassthroughResource {
    fn resource_identifier(&self) -> &str {
        &self.identifier
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::Passthrough
    }

    fn produce(&self, _request: &RequestArtifacts) -> Result<Payload, ResourceError> {
        Ok(Payload::new(self.data.clone()))
    }
}
