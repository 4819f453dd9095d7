//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    AppConfig, CacheConfig, EngineConfig, ListConfig, LogLevel, ThumbnailConfig,
};
pub use args::CliArgs;
pub use storage::{ConfigError, ConfigStore};
