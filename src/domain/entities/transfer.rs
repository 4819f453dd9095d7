//! Transfer progress reported by download trackers.

/// Snapshot of an in-progress download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressInfo {
    /// Bytes received so far.
    pub bytes_received: u64,
    /// Expected size, when the server announced one.
    pub total_bytes: Option<u64>,
}

impl ProgressInfo {
    /// Creates a progress snapshot.
    #[must_use]
    pub const fn new(bytes_received: u64, total_bytes: Option<u64>) -> Self {
        Self {
            bytes_received,
            total_bytes,
        }
    }

    /// Completed fraction in `0.0..=1.0`, or `None` when indeterminate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f32> {
        match self.total_bytes {
            Some(0) | None => None,
            Some(total) => Some((self.bytes_received.min(total) as f64 / total as f64) as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(ProgressInfo::new(50, Some(200)).fraction(), Some(0.25));
        assert_eq!(ProgressInfo::new(500, Some(200)).fraction(), Some(1.0));
        assert_eq!(ProgressInfo::new(50, None).fraction(), None);
        assert_eq!(ProgressInfo::new(0, Some(0)).fraction(), None);
    }
}
