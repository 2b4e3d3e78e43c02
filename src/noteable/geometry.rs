//! Image geometry lifecycle.
//!
//! Persisted image width/height are sticky: once populated they are never
//! recomputed from the natural image size. The renderer reports two kinds of
//! events, natural-size-known (image decoded) and externally-observed
//! resizes (user dragging a handle), and feeding both straight into the
//! persisted fields creates feedback loops. [`ImageSizing`] gates the writes
//! through an explicit state machine instead:
//!
//! ```text
//! Uninitialized --begin_hydration--> Hydrating --natural_size_known--> Settled
//! ```
//!
//! Resize events are ignored until `Settled`; persisted writes are the
//! `Some` return values and occur only in `Settled`. Width and height are
//! independent (no stored aspect ratio).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingState {
    Uninitialized,
    Hydrating,
    Settled,
}

/// Per-image-field sizing driver. Holds the dimensions as currently
/// persisted on the field; the field itself is updated by the caller with
/// whatever the transition methods return.
#[derive(Debug)]
pub struct ImageSizing {
    state: SizingState,
    width: Option<f64>,
    height: Option<f64>,
}

impl ImageSizing {
    pub fn new(width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            state: SizingState::Uninitialized,
            width,
            height,
        }
    }

    pub fn state(&self) -> SizingState {
        self.state
    }

    pub fn dimensions(&self) -> (Option<f64>, Option<f64>) {
        (self.width, self.height)
    }

    /// The renderer started loading the image.
    pub fn begin_hydration(&mut self) {
        if self.state == SizingState::Uninitialized {
            self.state = SizingState::Hydrating;
        }
    }

    /// The image decoded and its natural dimensions are known. Fills only
    /// the dimensions that were never persisted and settles the field.
    /// Returns dimensions to persist when either one was missing.
    pub fn natural_size_known(&mut self, natural_width: f64, natural_height: f64) -> Option<(f64, f64)> {
        if self.state != SizingState::Hydrating {
            return None;
        }
        let needs_write = self.width.is_none() || self.height.is_none();
        let width = self.width.unwrap_or(natural_width);
        let height = self.height.unwrap_or(natural_height);
        self.width = Some(width);
        self.height = Some(height);
        self.state = SizingState::Settled;
        if needs_write {
            Some((width, height))
        } else {
            None
        }
    }

    /// An external resize was observed. Ignored before the field settles.
    /// Returns the dimensions to persist.
    pub fn resized(&mut self, width: f64, height: f64) -> Option<(f64, f64)> {
        if self.state != SizingState::Settled {
            return None;
        }
        self.width = Some(width);
        self.height = Some(height);
        Some((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_image_adopts_natural_size() {
        let mut sizing = ImageSizing::new(None, None);
        assert_eq!(sizing.state(), SizingState::Uninitialized);

        sizing.begin_hydration();
        assert_eq!(sizing.state(), SizingState::Hydrating);

        let write = sizing.natural_size_known(640.0, 480.0);
        assert_eq!(write, Some((640.0, 480.0)));
        assert_eq!(sizing.state(), SizingState::Settled);
    }

    #[test]
    fn test_persisted_size_is_sticky() {
        let mut sizing = ImageSizing::new(Some(320.0), Some(200.0));
        sizing.begin_hydration();
        // Natural size differs but both dimensions are already persisted.
        assert_eq!(sizing.natural_size_known(640.0, 480.0), None);
        assert_eq!(sizing.dimensions(), (Some(320.0), Some(200.0)));
    }

    #[test]
    fn test_partial_size_fills_missing_dimension_only() {
        let mut sizing = ImageSizing::new(Some(320.0), None);
        sizing.begin_hydration();
        let write = sizing.natural_size_known(640.0, 480.0);
        assert_eq!(write, Some((320.0, 480.0)));
    }

    #[test]
    fn test_resize_ignored_until_settled() {
        let mut sizing = ImageSizing::new(None, None);
        assert_eq!(sizing.resized(100.0, 100.0), None);

        sizing.begin_hydration();
        assert_eq!(sizing.resized(100.0, 100.0), None);

        sizing.natural_size_known(640.0, 480.0);
        assert_eq!(sizing.resized(100.0, 100.0), Some((100.0, 100.0)));
        assert_eq!(sizing.dimensions(), (Some(100.0), Some(100.0)));
    }

    #[test]
    fn test_natural_size_ignored_outside_hydration() {
        let mut sizing = ImageSizing::new(None, None);
        // Not hydrating yet.
        assert_eq!(sizing.natural_size_known(640.0, 480.0), None);
        assert_eq!(sizing.state(), SizingState::Uninitialized);

        sizing.begin_hydration();
        sizing.natural_size_known(640.0, 480.0);
        // A second decode (e.g. re-render) must not rewrite anything.
        assert_eq!(sizing.natural_size_known(800.0, 600.0), None);
        assert_eq!(sizing.dimensions(), (Some(640.0), Some(480.0)));
    }
}
