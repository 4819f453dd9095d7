//! Full-file decoding of animated images.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, Frames, ImageFormat};
use tracing::{debug, warn};

use crate::domain::entities::{AnimatedImage, AnimationFrame, Media};
use crate::domain::errors::MediaError;
use crate::domain::ports::FullFileDecoder;

/// Fallback delay for frames that declare none.
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Decodes every frame of a GIF, APNG or animated WebP file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimatedImageDecoder;

impl AnimatedImageDecoder {
    /// Decodes the animation stored at `path`.
    ///
    /// # Errors
    /// Returns [`MediaError::Decode`] if the file is unreadable, is not an
    /// animated format, or holds no frames.
    pub fn decode_file(path: &Path) -> Result<AnimatedImage, MediaError> {
        let format = ImageFormat::from_path(path).map_err(|e| MediaError::decode(path, e))?;
        let file = File::open(path).map_err(|e| MediaError::decode(path, e))?;
        let reader = BufReader::new(file);

        let frames = match format {
            ImageFormat::Gif => {
                let decoder = GifDecoder::new(reader).map_err(|e| MediaError::decode(path, e))?;
                collect(path, decoder.into_frames())?
            }
            ImageFormat::Png => {
                let decoder = PngDecoder::new(reader).map_err(|e| MediaError::decode(path, e))?;
                if !decoder.is_apng().map_err(|e| MediaError::decode(path, e))? {
                    return Err(MediaError::decode(path, "PNG has no animation"));
                }
                let apng = decoder.apng().map_err(|e| MediaError::decode(path, e))?;
                collect(path, apng.into_frames())?
            }
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(reader).map_err(|e| MediaError::decode(path, e))?;
                collect(path, decoder.into_frames())?
            }
            other => {
                return Err(MediaError::decode(
                    path,
                    format!("{other:?} is not an animated format"),
                ));
            }
        };

        if frames.is_empty() {
            return Err(MediaError::decode(path, "animation has no frames"));
        }

        debug!(path = %path.display(), frames = frames.len(), "Decoded animation");
        Ok(AnimatedImage::new(frames))
    }
}

fn collect(path: &Path, frames: Frames<'_>) -> Result<Vec<AnimationFrame>, MediaError> {
    let frames = frames
        .collect_frames()
        .map_err(|e| MediaError::decode(path, e))?;

    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay = if numer == 0 || denom == 0 {
                DEFAULT_FRAME_DELAY
            } else {
                Duration::from_micros(u64::from(numer) * 1000 / u64::from(denom))
            };
            AnimationFrame {
                image: frame.into_buffer(),
                delay,
            }
        })
        .collect())
}

impl FullFileDecoder for AnimatedImageDecoder {
    fn decode(&self, path: &Path) -> Option<Media> {
        match Self::decode_file(path) {
            Ok(animated) => Some(Media::animated(animated)),
            Err(e) => {
                warn!(error = %e, "Failed to decode animated image");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, RgbaImage};

    fn write_gif(path: &Path, frame_count: u32) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(path)?;
        let mut encoder = GifEncoder::new(file);
        let frames = (0..frame_count).map(|i| {
            let image = RgbaImage::from_pixel(4, 3, image::Rgba([i as u8 * 40, 0, 0, 255]));
            Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(50, 1))
        });
        encoder.encode_frames(frames)?;
        Ok(())
    }

    #[test]
    fn test_decode_gif_frames() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("anim.gif");
        write_gif(&path, 3)?;

        let animated = AnimatedImageDecoder::decode_file(&path)?;

        assert_eq!(animated.frame_count(), 3);
        assert_eq!(animated.dimensions(), (4, 3));
        assert_eq!(animated.frames()[0].delay, Duration::from_millis(50));
        Ok(())
    }

    #[test]
    fn test_decode_via_port() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("anim.gif");
        write_gif(&path, 2)?;

        let media = AnimatedImageDecoder.decode(&path).expect("decoded");
        assert!(media.is_animated());
        Ok(())
    }

    #[test]
    fn test_still_format_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("still.png");
        image::RgbImage::new(2, 2).save(&path)?;

        assert!(AnimatedImageDecoder::decode_file(&path).is_err());
        assert!(AnimatedImageDecoder.decode(&path).is_none());
        Ok(())
    }

    #[test]
    fn test_corrupt_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("broken.gif");
        std::fs::write(&path, b"not a gif")?;

        assert!(AnimatedImageDecoder.decode(&path).is_none());
        Ok(())
    }
}
