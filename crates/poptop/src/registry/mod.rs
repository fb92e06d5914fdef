//! Resource registry and REST cache.
//!
//! ## Module Structure
//!
//! - `core`: `Registry`, the lock-guarded provider list and cache map
//! - `cache`: `TemplateCache`, ordered per-template item storage

mod cache;
mod core;

pub use self::core::Registry;

pub(crate) use self::cache::TemplateCache;
pub(crate) use self::core::RegistryState;
