#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{
    AdminConfig, AppConfig, CompressionConfig, ExportConfig, ServerConfig, StoreBackend,
    StoreConfig, DEFAULT_CONFIG_FILE,
};
