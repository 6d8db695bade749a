// Adapters layer: concrete implementations of the domain ports
// (key-value backends and filesystem storage).

pub mod fallback;
pub mod file;
pub mod local;
pub mod memory;
pub mod rest;

use crate::config::{StoreBackend, StoreConfig};
use crate::domain::ports::KvStore;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use std::sync::Arc;
use std::time::Duration;

pub use fallback::FallbackKv;
pub use file::FileKv;
pub use local::LocalStorage;
pub use memory::MemoryKv;
pub use rest::RestKv;

/// Builds the configured key-value backend.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost when the process exits");
            Arc::new(MemoryKv::new())
        }
        StoreBackend::File => {
            let directory = validate_required_field("store.directory", &config.directory)?;
            tracing::info!("Using file store at {}", directory);
            Arc::new(FileKv::new(directory))
        }
        StoreBackend::Rest => {
            let url = validate_required_field("store.url", &config.url)?;
            let rest = RestKv::new(
                url,
                config.token.clone(),
                Duration::from_secs(config.timeout_seconds),
            )?;
            tracing::info!("Using REST store at {}", url);
            if config.fallback {
                Arc::new(FallbackKv::new(Arc::new(rest)))
            } else {
                Arc::new(rest)
            }
        }
    };
    Ok(store)
}
