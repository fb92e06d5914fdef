//! Declarative mock definitions.
//!
//! A config file (YAML, or JSON since JSON is valid YAML) lists resources to
//! install into a [`Registry`]:
//!
//! ```yaml
//! log:
//!   level: debug
//! resources:
//!   - identifier: /pets
//!     body: [{"id": 1, "name": "Rex"}]
//!     created: {"id": 2, "name": "Tom"}
//!   - identifier: /avatar
//!     rest: false
//!     file: avatar.png
//! ```

use crate::matcher::PathTemplate;
use crate::registry::Registry;
use crate::resource::{
    extract_id, split_collection, CachedJsonResource, ImageType, PassthroughResource, Resource,
    JSON_CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MockConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
    /// Directory that relative `file` paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rest() -> bool {
    true
}

/// One resource to register.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceDefinition {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// REST resources go through the cache; others are served verbatim.
    #[serde(default = "default_rest")]
    pub rest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// File served verbatim (non-REST resources only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Document returned for POST requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<serde_json::Value>,
}

impl MockConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let config: MockConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut seen = HashSet::new();
        for definition in &self.resources {
            definition.validate()?;
            let template = definition.template();
            if !seen.insert(template.clone()) {
                anyhow::bail!(
                    "Duplicate resource '{}': template {} is already defined",
                    definition.identifier,
                    template
                );
            }
        }
        Ok(())
    }

    /// Build every resource, then register them all.
    ///
    /// Nothing is registered if any resource fails to build.
    pub fn install(&self, registry: &Registry) -> Result<usize, anyhow::Error> {
        let resources = self
            .resources
            .iter()
            .map(|definition| definition.into_resource(&self.base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        let installed = registry.extend(resources);
        info!("Installed {} resources from config", installed);
        Ok(installed)
    }
}

impl ResourceDefinition {
    pub fn template(&self) -> PathTemplate {
        PathTemplate::parse(&self.identifier)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.template().is_empty() {
            anyhow::bail!("Resource identifier must not be blank");
        }

        match (&self.body, &self.file) {
            (Some(_), Some(_)) => anyhow::bail!(
                "Resource '{}' defines both 'body' and 'file'",
                self.identifier
            ),
            (None, None) => anyhow::bail!(
                "Resource '{}' needs either 'body' or 'file'",
                self.identifier
            ),
            _ => {}
        }

        if !self.rest {
            if self.created.is_some() {
                anyhow::bail!(
                    "Resource '{}': 'created' only applies to REST resources",
                    self.identifier
                );
            }
            return Ok(());
        }

        let Some(body) = &self.body else {
            anyhow::bail!(
                "Resource '{}': REST resources need a JSON 'body', not a 'file'",
                self.identifier
            );
        };
        if !(body.is_array() || body.is_object()) {
            anyhow::bail!(
                "Resource '{}': REST body must be a JSON array or object",
                self.identifier
            );
        }
        split_collection(body.to_string().as_bytes()).map_err(|e| {
            anyhow::anyhow!("Resource '{}': invalid REST body: {}", self.identifier, e)
        })?;

        if let Some(created) = &self.created {
            let id = extract_id(created.to_string().as_bytes())?;
            if id.is_none() {
                anyhow::bail!(
                    "Resource '{}': 'created' must be an object with an id",
                    self.identifier
                );
            }
        }
        Ok(())
    }

    /// Build the resource, reading `file` relative to `base_dir`.
    pub fn into_resource(&self, base_dir: &Path) -> Result<Arc<dyn Resource>, anyhow::Error> {
        if self.rest {
            let body = self.body.clone().unwrap_or(serde_json::Value::Null);
            let mut resource = CachedJsonResource::new(&self.identifier, &body);
            if let Some(content_type) = &self.content_type {
                resource = resource.with_content_type(content_type);
            }
            if let Some(created) = &self.created {
                resource = resource.with_created(created);
            }
            debug!("Built REST resource {}", self.identifier);
            return Ok(Arc::new(resource));
        }

        let resource = match (&self.body, &self.file) {
            (_, Some(file)) => {
                let path = base_dir.join(file);
                let data = std::fs::read(&path).map_err(|e| {
                    anyhow::anyhow!(
                        "Resource '{}': cannot read {}: {}",
                        self.identifier,
                        path.display(),
                        e
                    )
                })?;
                let content_type = self
                    .content_type
                    .clone()
                    .unwrap_or_else(|| content_type_for(&path).to_string());
                PassthroughResource::new(&self.identifier, content_type, data)
            }
            (Some(serde_json::Value::String(text)), None) => PassthroughResource::new(
                &self.identifier,
                self.content_type.as_deref().unwrap_or(TEXT_CONTENT_TYPE),
                text.clone(),
            ),
            (Some(body), None) => PassthroughResource::new(
                &self.identifier,
                self.content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE),
                body.to_string(),
            ),
            (None, None) => anyhow::bail!(
                "Resource '{}' needs either 'body' or 'file'",
                self.identifier
            ),
        };
        debug!("Built passthrough resource {}", self.identifier);
        Ok(Arc::new(resource))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if let Some(image) = ImageType::from_extension(extension) {
        return image.content_type();
    }
    match extension.to_ascii_lowercase().as_str() {
        "json" => JSON_CONTENT_TYPE,
        "txt" => TEXT_CONTENT_TYPE,
        "html" | "htm" => "text/html; charset=utf-8",
        _ => OCTET_STREAM,
    }
}
