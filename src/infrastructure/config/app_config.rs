//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::infrastructure::media::memory_cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_COST_BYTES};
use crate::infrastructure::media::thumbnail::DEFAULT_MEDIUM_DIMENSION;

const APP_NAME: &str = "mediaview";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "linuxmobile";

/// Default number of rows around the viewport whose media is loaded.
pub const DEFAULT_LOAD_BUFFER: usize = 5;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Shared media cache bounds.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Thumbnail generation.
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    /// Media view behaviour.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Virtualized list buffers.
    #[serde(default)]
    pub list: ListConfig,
}

/// Shared media cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Maximum decoded bytes held.
    #[serde(default = "default_max_cost_bytes")]
    pub max_cost_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            max_cost_bytes: DEFAULT_MAX_COST_BYTES,
        }
    }
}

/// Thumbnail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Bounding box edge of medium thumbnails, in pixels.
    #[serde(default = "default_medium_dimension")]
    pub max_dimension: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MEDIUM_DIMENSION,
        }
    }
}

/// Media view configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Skip the producer while an asynchronous production is in flight.
    #[serde(default = "default_true")]
    pub dedupe_in_flight: bool,

    /// Maximum message width used to size overlays.
    #[serde(default = "default_max_message_width")]
    pub max_message_width: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dedupe_in_flight: true,
            max_message_width: default_max_message_width(),
        }
    }
}

/// Virtualized list configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Rows around the viewport whose media is loaded.
    #[serde(default = "default_load_buffer")]
    pub load_buffer: usize,

    /// Rows around the viewport whose media stays resident.
    /// Values below `load_buffer` are raised to it.
    #[serde(default = "default_memory_buffer")]
    pub memory_buffer: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            load_buffer: DEFAULT_LOAD_BUFFER,
            memory_buffer: default_memory_buffer(),
        }
    }
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

const fn default_max_cost_bytes() -> usize {
    DEFAULT_MAX_COST_BYTES
}

const fn default_medium_dimension() -> u32 {
    DEFAULT_MEDIUM_DIMENSION
}

const fn default_true() -> bool {
    true
}

const fn default_max_message_width() -> f32 {
    300.0
}

const fn default_load_buffer() -> usize {
    DEFAULT_LOAD_BUFFER
}

const fn default_memory_buffer() -> usize {
    DEFAULT_LOAD_BUFFER * 3
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(capacity) = args.cache_capacity {
            self.cache.capacity = capacity;
        }
        if let Some(max_cost) = args.cache_max_bytes {
            self.cache.max_cost_bytes = max_cost;
        }
        if let Some(dimension) = args.thumbnail_size {
            self.thumbnails.max_dimension = dimension;
        }
        if let Some(dedupe) = args.dedupe_in_flight {
            self.engine.dedupe_in_flight = dedupe;
        }
        if let Some(load_buffer) = args.load_buffer {
            self.list.load_buffer = load_buffer;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }
}
