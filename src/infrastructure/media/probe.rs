//! Builds attachments from files on local storage.

use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use tracing::{debug, trace};

use crate::domain::entities::{Attachment, AttachmentPointer, AttachmentStream, CacheKey};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi", "3gp"];

/// Extension of files still being downloaded.
pub const PARTIAL_EXTENSION: &str = "part";

/// Classifies a local file into a stream attachment.
///
/// Images are validated by decoding their header. Videos are considered
/// valid when the file is non-empty. Files of any other type yield a stream
/// without kind flags. Missing files yield [`Attachment::InvalidOrMissing`].
/// A `.part` file is a download in progress, keyed by its final path.
#[must_use]
pub fn probe_file(path: &Path) -> Attachment {
    let Ok(metadata) = std::fs::metadata(path) else {
        debug!(path = %path.display(), "Attachment file missing");
        return Attachment::InvalidOrMissing;
    };
    if !metadata.is_file() {
        return Attachment::InvalidOrMissing;
    }

    if let Some(final_path) = partial_target(path) {
        return AttachmentPointer::new(CacheKey::from_path(&final_path)).into();
    }

    let stream = AttachmentStream::new(CacheKey::from_path(path)).with_original_file_path(path);

    if is_video_path(path) {
        return stream.as_video().with_validity(false, metadata.len() > 0).into();
    }

    let Some((format, valid)) = sniff_image(path) else {
        trace!(path = %path.display(), "Unrecognized attachment type");
        return stream.into();
    };

    let stream = if format == ImageFormat::Gif {
        stream.as_animated()
    } else {
        stream.as_image()
    };
    stream.with_validity(valid, false).into()
}

/// Probes every regular file in `dir`, sorted by file name.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn probe_directory(dir: &Path) -> std::io::Result<Vec<(PathBuf, Attachment)>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let attachment = probe_file(&path);
            (path, attachment)
        })
        .collect())
}

/// Returns the path a partial download will be renamed to.
#[must_use]
pub fn partial_target(path: &Path) -> Option<PathBuf> {
    let is_partial = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PARTIAL_EXTENSION));
    is_partial.then(|| path.with_extension(""))
}

fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|video| video.eq_ignore_ascii_case(ext))
        })
}

fn sniff_image(path: &Path) -> Option<(ImageFormat, bool)> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let format = reader.format()?;
    let valid = reader.into_dimensions().is_ok_and(|(w, h)| w > 0 && h > 0);
    Some((format, valid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_png() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("photo.png");
        image::RgbImage::new(3, 3).save(&path)?;

        let Attachment::Stream(stream) = probe_file(&path) else {
            panic!("expected stream");
        };
        assert!(stream.is_image());
        assert!(!stream.is_animated());
        assert!(stream.is_valid_image());
        assert_eq!(stream.unique_id(), Some(&CacheKey::from_path(&path)));
        assert_eq!(stream.original_file_path(), Some(path.as_path()));
        Ok(())
    }

    #[test]
    fn test_probe_gif_is_animated() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("loop.gif");
        image::RgbaImage::new(3, 3).save(&path)?;

        let Attachment::Stream(stream) = probe_file(&path) else {
            panic!("expected stream");
        };
        assert!(stream.is_animated());
        Ok(())
    }

    #[test]
    fn test_probe_video_by_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("clip.MP4");
        std::fs::write(&path, b"\0\0\0\x18ftypmp42")?;

        let Attachment::Stream(stream) = probe_file(&path) else {
            panic!("expected stream");
        };
        assert!(stream.is_video());
        assert!(stream.is_valid_video());
        Ok(())
    }

    #[test]
    fn test_probe_unknown_file_has_no_kind() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello")?;

        let Attachment::Stream(stream) = probe_file(&path) else {
            panic!("expected stream");
        };
        assert!(!stream.is_image() && !stream.is_video());
        Ok(())
    }

    #[test]
    fn test_probe_partial_download_is_pending() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("photo.png.part");
        std::fs::write(&path, b"\x89PNG")?;

        let final_key = CacheKey::from_path(&dir.path().join("photo.png"));
        assert_eq!(
            probe_file(&path),
            Attachment::from(AttachmentPointer::new(final_key))
        );
        Ok(())
    }

    #[test]
    fn test_probe_missing_file() {
        assert_eq!(
            probe_file(Path::new("/nonexistent/photo.png")),
            Attachment::InvalidOrMissing
        );
    }

    #[test]
    fn test_probe_directory_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        image::RgbImage::new(2, 2).save(dir.path().join("b.png"))?;
        image::RgbImage::new(2, 2).save(dir.path().join("a.png"))?;
        std::fs::create_dir(dir.path().join("nested"))?;

        let probed = probe_directory(dir.path())?;

        let names: Vec<_> = probed
            .iter()
            .filter_map(|(p, _)| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        Ok(())
    }
}
