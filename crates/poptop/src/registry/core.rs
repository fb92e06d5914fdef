//! Core Registry struct and implementation.

use super::cache::TemplateCache;
use crate::matcher::{normalize, NormalizedPath, PathTemplate};
use crate::resource::Resource;
use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

struct Registered {
    template: PathTemplate,
    resource: Arc<dyn Resource>,
}

/// Providers and cache, guarded together by the registry lock.
#[derive(Default)]
pub(crate) struct RegistryState {
    providers: Vec<Registered>,
    caches: HashMap<PathTemplate, TemplateCache>,
}

impl RegistryState {
    /// Exact template match; the degenerate empty template never matches.
    pub fn lookup(&self, template: &PathTemplate) -> Option<Arc<dyn Resource>> {
        if template.is_empty() {
            return None;
        }
        self.providers
            .iter()
            .find(|entry| entry.template == *template)
            .map(|entry| Arc::clone(&entry.resource))
    }

    /// Resource for a request path, with the template it is registered under.
    ///
    /// An exact template match wins; an item request (`/pets/7`) otherwise
    /// falls back to the resource registered for its collection (`/pets`).
    pub fn resolve(&self, path: &NormalizedPath) -> Option<(PathTemplate, Arc<dyn Resource>)> {
        if let Some(resource) = self.lookup(&path.template) {
            return Some((path.template.clone(), resource));
        }
        let parent = path.collection_template()?;
        let resource = self.lookup(&parent)?;
        Some((parent, resource))
    }

    pub fn cache(&self, template: &PathTemplate) -> Option<&TemplateCache> {
        self.caches.get(template)
    }

    pub fn cache_mut(&mut self, template: &PathTemplate) -> &mut TemplateCache {
        self.caches.entry(template.clone()).or_default()
    }

    fn insert(&mut self, resource: Arc<dyn Resource>) -> (PathTemplate, bool) {
        let template = PathTemplate::parse(resource.resource_identifier());
        match self.providers.iter_mut().find(|e| e.template == template) {
            Some(existing) => {
                existing.resource = resource;
                (template, true)
            }
            None => {
                self.providers.push(Registered {
                    template: template.clone(),
                    resource,
                });
                (template, false)
            }
        }
    }

    fn remove(&mut self, template: &PathTemplate) -> bool {
        let before = self.providers.len();
        self.providers.retain(|entry| entry.template != *template);
        self.caches.remove(template);
        self.providers.len() != before
    }

    fn clear(&mut self) {
        self.providers.clear();
        self.caches.clear();
    }
}

/// Registered resources plus the REST cache keyed by (template, id).
///
/// Every operation takes the same lock, and the dispatcher holds it for a
/// whole request, so requests and registry mutations never interleave.
/// Resource identifiers and cache templates are normalized on the way in:
/// `/users/:user_id`, `users/42` and `/users/:id` all address one entry.
#[derive(Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide default registry.
    ///
    /// Convenient for embedding code that cannot thread a registry through;
    /// call [`Registry::reset`] between test cases.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Register a resource, replacing any resource with the same template.
    /// A replaced resource's cache entries are kept.
    pub fn add<R: Resource + 'static>(&self, resource: R) -> PathTemplate {
        self.add_shared(Arc::new(resource))
    }

    pub fn add_shared(&self, resource: Arc<dyn Resource>) -> PathTemplate {
        let (template, replaced) = self.state.lock().insert(resource);
        if replaced {
            info!("Resource {} replaced", template);
        } else {
            info!("Resource {} registered", template);
        }
        template
    }

    /// Register several resources at once. Returns how many were added.
    pub fn extend<I>(&self, resources: I) -> usize
    where
        I: IntoIterator<Item = Arc<dyn Resource>>,
    {
        resources
            .into_iter()
            .map(|resource| self.add_shared(resource))
            .count()
    }

    /// Remove a resource and every cache entry under its template.
    /// Returns false (and does nothing) when nothing was registered.
    pub fn remove(&self, identifier: &str) -> bool {
        let template = PathTemplate::parse(identifier);
        let removed = self.state.lock().remove(&template);
        if removed {
            info!("Resource {} removed", template);
        } else {
            debug!("Resource {} not registered, nothing to remove", template);
        }
        removed
    }

    /// Remove every resource and every cache entry.
    pub fn remove_all(&self) {
        self.state.lock().clear();
        info!("All resources removed");
    }

    /// Return to the freshly constructed state.
    pub fn reset(&self) {
        self.remove_all();
    }

    pub fn count(&self) -> usize {
        self.state.lock().providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Resource registered under exactly `template`, after normalization.
    pub fn lookup_template(&self, template: &str) -> Option<Arc<dyn Resource>> {
        self.state.lock().lookup(&PathTemplate::parse(template))
    }

    /// Resource that would serve a request for `path`, including item
    /// requests served by the collection resource.
    pub fn lookup(&self, path: &str) -> Option<Arc<dyn Resource>> {
        self.state
            .lock()
            .resolve(&normalize(path))
            .map(|(_, resource)| resource)
    }

    /// Route recognition: whether a request for `path` would be handled.
    pub fn can_handle(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Registered templates in registration order.
    pub fn identifiers(&self) -> Vec<PathTemplate> {
        self.state
            .lock()
            .providers
            .iter()
            .map(|entry| entry.template.clone())
            .collect()
    }

    pub fn cache_get(&self, template: &str, id: i64) -> Option<Bytes> {
        let template = PathTemplate::parse(template);
        self.state.lock().cache(&template)?.get(id).cloned()
    }

    pub fn cache_put(&self, template: &str, id: i64, payload: impl Into<Bytes>) {
        let template = PathTemplate::parse(template);
        self.state.lock().cache_mut(&template).put(id, payload.into());
    }

    pub fn cache_delete_one(&self, template: &str, id: i64) -> Option<Bytes> {
        let template = PathTemplate::parse(template);
        self.state.lock().caches.get_mut(&template)?.remove(id)
    }

    pub fn cache_delete_all(&self, template: &str) {
        let template = PathTemplate::parse(template);
        if let Some(cache) = self.state.lock().caches.get_mut(&template) {
            cache.clear();
        }
    }

    pub fn cache_is_empty(&self, template: &str) -> bool {
        let template = PathTemplate::parse(template);
        self.state
            .lock()
            .cache(&template)
            .map_or(true, TemplateCache::is_empty)
    }

    /// Cached ids under `template`, in response order.
    pub fn cached_ids(&self, template: &str) -> Vec<i64> {
        let template = PathTemplate::parse(template);
        self.state
            .lock()
            .cache(&template)
            .map(|cache| cache.ids().to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
