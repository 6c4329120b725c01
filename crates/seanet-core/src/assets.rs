#![forbid(unsafe_code)]

//! Two-part font load barrier.
//!
//! The atlas image and its metrics are fetched independently and may land in
//! either order. The frame loop polls [`LoadBarrier::take_ready`] and gets
//! both parts exactly once, after the second one arrives.

use crate::error::AssetKind;

#[derive(Debug)]
pub struct LoadBarrier<I, M> {
    image: Option<I>,
    metrics: Option<M>,
    failed: Option<(AssetKind, String)>,
    released: bool,
}

impl<I, M> Default for LoadBarrier<I, M> {
    fn default() -> Self {
        Self {
            image: None,
            metrics: None,
            failed: None,
            released: false,
        }
    }
}

impl<I, M> LoadBarrier<I, M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide_image(&mut self, image: I) {
        if !self.released {
            self.image = Some(image);
        }
    }

    pub fn provide_metrics(&mut self, metrics: M) {
        if !self.released {
            self.metrics = Some(metrics);
        }
    }

    /// Record a failed part. The barrier then never releases.
    pub fn fail(&mut self, asset: AssetKind, reason: impl Into<String>) {
        if self.failed.is_none() {
            self.failed = Some((asset, reason.into()));
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<(AssetKind, &str)> {
        self.failed.as_ref().map(|(kind, reason)| (*kind, reason.as_str()))
    }

    /// Parts still outstanding.
    #[must_use]
    pub fn missing(&self) -> Vec<AssetKind> {
        let mut out = Vec::with_capacity(2);
        if self.image.is_none() && !self.released {
            out.push(AssetKind::AtlasImage);
        }
        if self.metrics.is_none() && !self.released {
            out.push(AssetKind::AtlasMetrics);
        }
        out
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Both parts, once. `None` before completion, after a failure, and on
    /// every call after the first success.
    pub fn take_ready(&mut self) -> Option<(I, M)> {
        if self.released || self.failed.is_some() {
            return None;
        }
        if self.image.is_none() || self.metrics.is_none() {
            return None;
        }
        let parts = self.image.take().zip(self.metrics.take());
        self.released = parts.is_some();
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_once_in_either_order() {
        let mut barrier: LoadBarrier<&str, u32> = LoadBarrier::new();
        barrier.provide_metrics(7);
        assert_eq!(barrier.take_ready(), None);
        assert_eq!(barrier.missing(), vec![AssetKind::AtlasImage]);
        barrier.provide_image("png");
        assert_eq!(barrier.take_ready(), Some(("png", 7)));
        assert_eq!(barrier.take_ready(), None);
        assert!(barrier.is_released());
        assert!(barrier.missing().is_empty());
    }

    #[test]
    fn failure_blocks_release() {
        let mut barrier: LoadBarrier<&str, u32> = LoadBarrier::new();
        barrier.provide_image("png");
        barrier.fail(AssetKind::AtlasMetrics, "404");
        barrier.provide_metrics(1);
        assert_eq!(barrier.take_ready(), None);
        assert_eq!(barrier.failure(), Some((AssetKind::AtlasMetrics, "404")));
    }
}
