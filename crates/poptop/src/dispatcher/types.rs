//! Dispatcher result and error types.

use crate::matcher::PathTemplate;
use crate::resource::ResourceError;
use bytes::Bytes;
use http::StatusCode;
use std::fmt;

/// A response produced by a matched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: StatusCode,
    /// Always the matched resource's declared content type.
    pub content_type: String,
    pub body: Bytes,
}

impl MockResponse {
    pub fn ok(content_type: &str, body: Bytes) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: content_type.to_string(),
            body,
        }
    }

    pub fn no_content(content_type: &str) -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            content_type: content_type.to_string(),
            body: Bytes::new(),
        }
    }

    /// Body as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Why a request was left to other handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledReason {
    /// No resource is registered for the request's template.
    NoRoute,
    /// The route is known but the method has no REST semantics here.
    UnsupportedMethod,
}

impl fmt::Display for UnhandledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnhandledReason::NoRoute => f.write_str("no registered resource"),
            UnhandledReason::UnsupportedMethod => f.write_str("unsupported method"),
        }
    }
}

/// Result of offering a request to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Handled(MockResponse),
    Unhandled(UnhandledReason),
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Outcome::Handled(_))
    }

    pub fn into_response(self) -> Option<MockResponse> {
        match self {
            Outcome::Handled(response) => Some(response),
            Outcome::Unhandled(_) => None,
        }
    }
}

/// A recognized request that could not be served.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No item {id} under {template}")]
    NotFound { template: PathTemplate, id: i64 },
    #[error("Resource {template} failed: {source}")]
    Provider {
        template: PathTemplate,
        source: ResourceError,
    },
}

impl DispatchError {
    /// Status an interception hook should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn template(&self) -> &PathTemplate {
        match self {
            DispatchError::NotFound { template, .. } => template,
            DispatchError::Provider { template, .. } => template,
        }
    }
}
