//! JSON resources served through the REST cache.

use super::{Payload, Resource, ResourceError, JSON_CONTENT_TYPE};
use crate::request::{RequestArtifacts, RestMethod};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::value::RawValue;

/// A REST resource backed by a fixed JSON document.
///
/// The document is usually a collection (`[{"id": 1, ...}, ...]`). An
/// optional `created` document is returned for POST requests; without one,
/// POST returns the main document, which then has to be a single object
/// carrying an `id`.
#[derive(Debug, Clone)]
pub struct CachedJsonResource {
    identifier: String,
    content_type: String,
    document: Bytes,
    created: Option<Bytes>,
}

impl CachedJsonResource {
    pub fn new(identifier: impl Into<String>, document: &serde_json::Value) -> Self {
        Self {
            identifier: identifier.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            document: Bytes::from(document.to_string()),
            created: None,
        }
    }

    /// Build from raw JSON text, kept byte for byte.
    pub fn from_raw(
        identifier: impl Into<String>,
        raw: impl Into<Bytes>,
    ) -> Result<Self, ResourceError> {
        let document = raw.into();
        serde_json::from_slice::<&RawValue>(&document)?;
        Ok(Self {
            identifier: identifier.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            document,
            created: None,
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Document returned (and cached) by POST requests.
    pub fn with_created(mut self, created: &serde_json::Value) -> Self {
        self.created = Some(Bytes::from(created.to_string()));
        self
    }
}

impl Resource for CachedJsonResource {
    fn resource_identifier(&self) -> &str {
        &self.identifier
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn produce(&self, request: &RequestArtifacts) -> Result<Payload, ResourceError> {
        let data = match (request.method, &self.created) {
            (RestMethod::Post, Some(created)) => created.clone(),
            _ => self.document.clone(),
        };
        let id = extract_id(&data)?;
        Ok(Payload { data, id })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct IdProbe {
    #[serde(default)]
    id: Option<IdValue>,
}

/// Id of a single JSON object payload; `None` for arrays, scalars or
/// objects without a numeric (or numeric string) `id`.
pub fn extract_id(data: &[u8]) -> Result<Option<i64>, ResourceError> {
    let raw: &RawValue = serde_json::from_slice(data)?;
    Ok(object_id(raw))
}

fn object_id(raw: &RawValue) -> Option<i64> {
    let probe: IdProbe = serde_json::from_str(raw.get()).ok()?;
    match probe.id? {
        IdValue::Number(id) => Some(id),
        IdValue::Text(text) => text.trim().parse().ok(),
    }
}

/// Split a collection payload into `(id, item)` pairs.
///
/// Each item is the exact byte slice of the source document, so a cached
/// item is byte-identical to its position in the full response. A single
/// object with an id is treated as a one-item collection.
pub fn split_collection(data: &[u8]) -> Result<Vec<(i64, Bytes)>, ResourceError> {
    let first = data.iter().find(|b| !b.is_ascii_whitespace());

    match first {
        Some(b'[') => {
            let items: Vec<&RawValue> = serde_json::from_slice(data)?;
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    let id = object_id(item).ok_or(ResourceError::MissingId { index })?;
                    Ok((id, Bytes::copy_from_slice(item.get().as_bytes())))
                })
                .collect()
        }
        Some(b'{') => {
            let item: &RawValue = serde_json::from_slice(data)?;
            let id = object_id(item).ok_or(ResourceError::MissingId { index: 0 })?;
            Ok(vec![(id, Bytes::copy_from_slice(item.get().as_bytes()))])
        }
        _ => {
            serde_json::from_slice::<&RawValue>(data)?;
            Err(ResourceError::NotACollection)
        }
    }
}
