//! Per-method REST semantics.
//!
//! Runs with the registry lock held, so each request observes and leaves a
//! consistent cache.

use super::types::{DispatchError, MockResponse};
use crate::registry::{RegistryState, TemplateCache};
use crate::request::{RequestArtifacts, RestMethod};
use crate::resource::{split_collection, CachePolicy, Payload, Resource, ResourceError};
use bytes::Bytes;
use tracing::{debug, warn};

/// Serve a request for a matched resource.
pub(crate) fn serve(
    state: &mut RegistryState,
    resource: &dyn Resource,
    request: &RequestArtifacts,
) -> Result<MockResponse, DispatchError> {
    let content_type = resource.content_type();

    match (request.method, resource.cache_policy()) {
        (RestMethod::Get | RestMethod::Post, CachePolicy::Passthrough) => {
            let payload = produce(resource, request)?;
            Ok(MockResponse::ok(content_type, payload.data))
        }
        (RestMethod::Delete, CachePolicy::Passthrough) => {
            Ok(MockResponse::no_content(content_type))
        }
        (RestMethod::Get, CachePolicy::Rest) => {
            let cache = state.cache_mut(&request.template);
            let body = match request.item_id {
                None => get_collection(cache, resource, request)?,
                Some(id) => get_item(cache, resource, request, id)?,
            };
            Ok(MockResponse::ok(content_type, body))
        }
        (RestMethod::Post, CachePolicy::Rest) => {
            let body = post(state, resource, request)?;
            Ok(MockResponse::ok(content_type, body))
        }
        (RestMethod::Delete, CachePolicy::Rest) => {
            delete(state, request);
            Ok(MockResponse::no_content(content_type))
        }
    }
}

/// The provider's full payload on a cold cache, the cached items otherwise.
fn get_collection(
    cache: &mut TemplateCache,
    resource: &dyn Resource,
    request: &RequestArtifacts,
) -> Result<Bytes, DispatchError> {
    if cache.is_empty() {
        let payload = warm(cache, resource, request)?;
        // A single-object document is served in the joined shape from the
        // first GET on, so repeated GETs agree
        if first_byte(&payload) == Some(b'[') {
            return Ok(payload);
        }
        return Ok(cache.joined());
    }
    debug!(
        "Serving {} from cache ({} items)",
        request.template,
        cache.ids().len()
    );
    Ok(cache.joined())
}

fn get_item(
    cache: &mut TemplateCache,
    resource: &dyn Resource,
    request: &RequestArtifacts,
    id: i64,
) -> Result<Bytes, DispatchError> {
    if let Some(hit) = cache.get(id) {
        debug!("Cache hit for {} id {}", request.template, id);
        return Ok(hit.clone());
    }

    // Once warmed the cache is authoritative: a miss is a real miss
    if !cache.is_warmed() {
        warm(cache, resource, request)?;
    }

    cache.get(id).cloned().ok_or_else(|| {
        debug!("No item {} under {}", id, request.template);
        DispatchError::NotFound {
            template: request.template.clone(),
            id,
        }
    })
}

/// Replace the cache entry for the produced id with a fresh payload.
fn post(
    state: &mut RegistryState,
    resource: &dyn Resource,
    request: &RequestArtifacts,
) -> Result<Bytes, DispatchError> {
    let payload = produce(resource, request)?;
    let id = payload
        .id
        .or(request.item_id)
        .ok_or_else(|| provider_error(request, ResourceError::NoId))?;

    debug!("Storing {} id {}", request.template, id);
    state
        .cache_mut(&request.template)
        .put(id, payload.data.clone());
    Ok(payload.data)
}

fn delete(state: &mut RegistryState, request: &RequestArtifacts) {
    let cache = state.cache_mut(&request.template);
    match request.item_id {
        Some(id) => {
            if cache.remove(id).is_none() {
                debug!("Delete of absent {} id {}", request.template, id);
            }
        }
        None => {
            debug!("Clearing cache for {}", request.template);
            cache.clear();
        }
    }
}

/// Call the provider and split its collection into the cache.
fn warm(
    cache: &mut TemplateCache,
    resource: &dyn Resource,
    request: &RequestArtifacts,
) -> Result<Bytes, DispatchError> {
    let payload = produce(resource, request)?;
    let items = split_collection(&payload.data).map_err(|e| provider_error(request, e))?;
    debug!("Warming {} with {} items", request.template, items.len());
    cache.warm(items);
    Ok(payload.data)
}

fn first_byte(data: &[u8]) -> Option<u8> {
    data.iter().copied().find(|b| !b.is_ascii_whitespace())
}

fn produce(resource: &dyn Resource, request: &RequestArtifacts) -> Result<Payload, DispatchError> {
    resource
        .produce(request)
        .map_err(|e| provider_error(request, e))
}

fn provider_error(request: &RequestArtifacts, source: ResourceError) -> DispatchError {
    warn!(
        "Resource {} failed on {} {}: {}",
        request.template, request.method, request.path, source
    );
    DispatchError::Provider {
        template: request.template.clone(),
        source,
    }
}
