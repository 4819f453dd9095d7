//! Port definitions for collaborators of the media engine.

mod media_cache_port;
mod producer_port;
mod transfer_port;

pub use media_cache_port::MediaCachePort;
pub use producer_port::{
    FailureCallback, FullFileDecoder, Production, SuccessCallback, ThumbnailProducer,
};
pub use transfer_port::{DownloadProgressPort, ReadyCallback, UploadProgressPort, UploadWatch};
