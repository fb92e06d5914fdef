//! In-process HTTP request interception and mock REST resources.
//!
//! PopTop recognizes requests whose path matches a registered resource and
//! answers them with deterministic payloads, emulating a small stateful REST
//! backend without any network.
//!
//! - `matcher`: path normalization into templates and ids
//! - `params`: query string and form body parsing
//! - `resource`: the `Resource` capability and its built-in variants
//! - `registry`: registered resources and the per-template REST cache
//! - `dispatcher`: per-request routing and REST semantics
//! - `config`: declarative mock definitions loaded from YAML or JSON
//! - `replay`: scripted request sequences, used by the `poptop` CLI
//!
//! # Example
//!
//! ```
//! use poptop::{CachedJsonResource, Dispatcher, Outcome};
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::default();
//! dispatcher.registry().add(CachedJsonResource::new(
//!     "/pets",
//!     &json!([{"id": 1, "name": "Rex"}, {"id": 2, "name": "Tom"}]),
//! ));
//!
//! let outcome = dispatcher.handle("GET", "/pets/2", None, None).unwrap();
//! let Outcome::Handled(response) = outcome else { panic!("unhandled") };
//! assert_eq!(response.text(), r#"{"id":2,"name":"Tom"}"#);
//! ```

pub mod config;
pub mod dispatcher;
pub mod matcher;
pub mod params;
pub mod registry;
pub mod replay;
pub mod request;
pub mod resource;

pub use dispatcher::{DispatchError, Dispatcher, MockResponse, Outcome, UnhandledReason};
pub use matcher::{normalize, split_target, NormalizedPath, PathTemplate};
pub use params::{is_blank, parse_params, Params};
pub use registry::Registry;
pub use request::{RequestArtifacts, RestMethod};
pub use resource::{
    CachePolicy, CachedJsonResource, FnResource, ImageType, PassthroughResource, Payload,
    Resource, ResourceError,
};
