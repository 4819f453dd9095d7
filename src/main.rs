use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mediaview::domain::{Attachment, CacheKey, UiContext};
use mediaview::infrastructure::media::{partial_target, probe_directory};
use mediaview::infrastructure::{
    AnimatedImageDecoder, AppConfig, CliArgs, ConfigStore, DownloadTracker, MemoryMediaCache,
    ThumbnailGenerator, UploadTracker,
};
use mediaview::presentation::{MediaCollaborators, MediaList, MediaView, MediaViewOptions};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let store = ConfigStore::new()?;
    let mut config = store.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn track_partial_download(downloads: &DownloadTracker, id: Option<&CacheKey>, path: &Path) {
    let Some(id) = id else {
        return;
    };
    let received = std::fs::metadata(path).map_or(0, |m| m.len());
    downloads.start(id.clone(), None);
    downloads.update(id, received);
    debug!(
        path = %path.display(),
        final_path = ?partial_target(path),
        received,
        "Download in progress"
    );
}

fn build_list(
    ctx: &UiContext,
    args: &CliArgs,
    config: &AppConfig,
    cache: &Arc<MemoryMediaCache>,
    collaborators: &MediaCollaborators,
    downloads: &DownloadTracker,
) -> Result<MediaList> {
    let probed = probe_directory(&args.media_dir)
        .wrap_err_with(|| format!("Failed to read {}", args.media_dir.display()))?;
    let options = MediaViewOptions::from_config(&config.engine, args.outgoing);

    let views = probed
        .into_iter()
        .map(|(path, attachment)| {
            if let Attachment::Pending(pointer) = &attachment {
                track_partial_download(downloads, pointer.unique_id(), &path);
            }
            MediaView::new(ctx, cache.clone(), Arc::new(attachment), options, collaborators)
        })
        .collect();

    Ok(MediaList::new(views, &config.list))
}

async fn run(args: &CliArgs, config: &AppConfig) -> Result<()> {
    let ctx = UiContext::current();
    let cache = Arc::new(MemoryMediaCache::from_config(&config.cache));
    let thumbnails = Rc::new(ThumbnailGenerator::new(&config.thumbnails));
    let downloads = Arc::new(DownloadTracker::new());
    let uploads = Rc::new(UploadTracker::new());

    let collaborators = MediaCollaborators {
        thumbnails: thumbnails.clone(),
        decoder: Arc::new(AnimatedImageDecoder),
        downloads: downloads.clone(),
        uploads: uploads.clone(),
    };

    let list = build_list(&ctx, args, config, &cache, &collaborators, &downloads)?;
    if list.is_empty() {
        warn!(dir = %args.media_dir.display(), "No attachments found");
        return Ok(());
    }
    info!(count = list.len(), "Attachments loaded");

    let viewport = args.viewport.max(1);
    let step = args.scroll_step.max(1);
    let tick = Duration::from_millis(args.tick_ms);
    let last = list.len() - 1;

    let mut start = 0;
    loop {
        let end = (start + viewport - 1).min(last);
        list.update_viewport(&ctx, start, end);
        thumbnails.dispatch_completed(&ctx);

        if end == last {
            break;
        }
        start = (start + step).min(last);
        tokio::time::sleep(tick).await;
    }

    match tokio::time::timeout(SETTLE_TIMEOUT, thumbnails.settle(&ctx, tick)).await {
        Ok(delivered) => debug!(delivered, "Thumbnails settled"),
        Err(_) => warn!(pending = thumbnails.pending_count(), "Timed out waiting for thumbnails"),
    }

    if args.outgoing {
        for view in list.iter() {
            if let Some(stream) = view.variant().stream() {
                uploads.mark_uploaded(&ctx, stream.key());
            }
        }
    }

    for (idx, view) in list.iter().enumerate() {
        info!(
            row = idx,
            variant = %view.variant().kind(),
            state = %view.load_state(),
            displaying = view.is_displaying(),
            play_icon = ?view.play_icon_visible(),
            "Media view"
        );
    }

    list.unload_all(&ctx);
    info!(stats = %cache.stats(), "Cache statistics");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = mediaview::VERSION, "Starting {}", mediaview::NAME);

    run(&args, &config).await
}
