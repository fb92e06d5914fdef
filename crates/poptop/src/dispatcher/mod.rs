//! Request dispatch against the registry.
//!
//! This module provides:
//! - `Dispatcher`: matches a request to a registered resource and applies
//!   the method's REST semantics
//! - `Outcome`: handled response, or the reason the request was left alone
//! - `DispatchError`: recognized requests that could not be served
//!
//! ## Module Structure
//!
//! - `types`: result and error types
//! - `handler`: per-method cache semantics

mod handler;
mod types;


pub use types::{DispatchError, MockResponse, Outcome, UnhandledReason};

use crate::matcher::{normalize, split_target};
use crate::registry::Registry;
use crate::request::{RequestArtifacts, RestMethod};
use std::sync::Arc;
use tracing::{debug, trace};

/// Entry point for the interception hook.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Dispatcher over [`Registry::global`].
    pub fn global() -> Self {
        Self::new(Registry::global())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Whether a request for `path` would be handled.
    pub fn can_handle(&self, path: &str) -> bool {
        self.registry.can_handle(path)
    }

    /// Handle one request.
    ///
    /// `Ok(Outcome::Unhandled(_))` means the request belongs to someone else;
    /// `Err` means the route was recognized but could not be served.
    pub fn handle(
        &self,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Outcome, DispatchError> {
        let mut state = self.registry.lock();

        let normalized = normalize(path);
        let Some((template, resource)) = state.resolve(&normalized) else {
            trace!("No resource for {}", path);
            return Ok(Outcome::Unhandled(UnhandledReason::NoRoute));
        };

        let Some(method) = RestMethod::parse(method) else {
            debug!("Method {} not supported for {}", method, path);
            return Ok(Outcome::Unhandled(UnhandledReason::UnsupportedMethod));
        };

        let request = RequestArtifacts::new(method, path)
            .with_template(template)
            .with_query(query)
            .with_body(body);

        debug!("{} {} -> {}", method, path, request.template);
        handler::serve(&mut state, resource.as_ref(), &request).map(Outcome::Handled)
    }

    /// Handle a request given as a raw target (path or URL, query included).
    pub fn handle_target(
        &self,
        method: &str,
        target: &str,
        body: Option<&[u8]>,
    ) -> Result<Outcome, DispatchError> {
        let (path, query) = split_target(target);
        self.handle(method, &path, query.as_deref(), body)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(Registry::new()))
    }
}
