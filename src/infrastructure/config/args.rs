use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mediaview",
    version,
    about = "Scrolls a directory of media through lazily loaded media views",
    long_about = None
)]
pub struct CliArgs {
    /// Directory containing the media to display.
    #[arg(value_name = "DIR")]
    pub media_dir: PathBuf,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Maximum number of cached media entries.
    #[arg(long)]
    pub cache_capacity: Option<usize>,

    /// Maximum decoded bytes held by the cache.
    #[arg(long)]
    pub cache_max_bytes: Option<usize>,

    /// Medium thumbnail bounding box, in pixels.
    #[arg(long)]
    pub thumbnail_size: Option<u32>,

    /// Skip producers while a thumbnail is already being generated.
    #[arg(long)]
    pub dedupe_in_flight: Option<bool>,

    /// Rows around the viewport whose media is loaded.
    #[arg(long)]
    pub load_buffer: Option<usize>,

    /// Number of rows visible at once.
    #[arg(long, default_value_t = 4)]
    pub viewport: usize,

    /// Rows scrolled per tick.
    #[arg(long, default_value_t = 2)]
    pub scroll_step: usize,

    /// Milliseconds between scroll ticks.
    #[arg(long, default_value_t = 50)]
    pub tick_ms: u64,

    /// Treat attachments as outgoing and not yet uploaded.
    #[arg(long)]
    pub outgoing: bool,
}
