//! Decoded media values held by the cache and by media views.

use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, RgbaImage};

/// One frame of an animated image.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    /// Frame pixels.
    pub image: RgbaImage,
    /// How long the frame stays on screen.
    pub delay: Duration,
}

/// A fully decoded animated image.
#[derive(Debug)]
pub struct AnimatedImage {
    frames: Vec<AnimationFrame>,
}

impl AnimatedImage {
    /// Creates an animated image from decoded frames.
    #[must_use]
    pub const fn new(frames: Vec<AnimationFrame>) -> Self {
        Self { frames }
    }

    /// Returns the decoded frames.
    #[must_use]
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns the sum of all frame delays.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(|f| f.delay).sum()
    }

    /// Dimensions of the first frame.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.frames
            .first()
            .map_or((0, 0), |f| f.image.dimensions())
    }

    fn cost_bytes(&self) -> usize {
        self.frames.iter().map(|f| f.image.as_raw().len()).sum()
    }
}

/// Decoded media ready for display.
///
/// Cloning is cheap and yields a handle to the same decoded object.
#[derive(Debug, Clone)]
pub enum Media {
    /// A still bitmap (image or video thumbnail).
    Still(Arc<DynamicImage>),
    /// An animated image with all frames decoded.
    Animated(Arc<AnimatedImage>),
}

impl Media {
    /// Wraps a still image.
    #[must_use]
    pub fn still(image: DynamicImage) -> Self {
        Self::Still(Arc::new(image))
    }

    /// Wraps an animated image.
    #[must_use]
    pub fn animated(image: AnimatedImage) -> Self {
        Self::Animated(Arc::new(image))
    }

    /// Returns true if both handles point at the same decoded object.
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Still(a), Self::Still(b)) => Arc::ptr_eq(a, b),
            (Self::Animated(a), Self::Animated(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Approximate memory held by the decoded pixels.
    #[must_use]
    pub fn cost_bytes(&self) -> usize {
        match self {
            Self::Still(image) => image.as_bytes().len(),
            Self::Animated(animated) => animated.cost_bytes(),
        }
    }

    /// Pixel dimensions (first frame for animations).
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Still(image) => (image.width(), image.height()),
            Self::Animated(animated) => animated.dimensions(),
        }
    }

    /// Returns true for animated media.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_object_tracks_identity() {
        let a = Media::still(DynamicImage::new_rgb8(4, 4));
        let b = a.clone();
        let c = Media::still(DynamicImage::new_rgb8(4, 4));

        assert!(a.same_object(&b));
        assert!(!a.same_object(&c));
    }

    #[test]
    fn test_cost_bytes() {
        let still = Media::still(DynamicImage::new_rgba8(10, 10));
        assert_eq!(still.cost_bytes(), 400);

        let frame = AnimationFrame {
            image: RgbaImage::new(2, 2),
            delay: Duration::from_millis(40),
        };
        let animated = Media::animated(AnimatedImage::new(vec![frame.clone(), frame]));
        assert_eq!(animated.cost_bytes(), 32);
        assert_eq!(animated.dimensions(), (2, 2));
        assert!(animated.is_animated());
    }

    #[test]
    fn test_total_duration() {
        let frames = (0..3)
            .map(|_| AnimationFrame {
                image: RgbaImage::new(1, 1),
                delay: Duration::from_millis(100),
            })
            .collect();
        let animated = AnimatedImage::new(frames);
        assert_eq!(animated.frame_count(), 3);
        assert_eq!(animated.total_duration(), Duration::from_millis(300));
    }
}
