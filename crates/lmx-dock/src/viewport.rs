#![forbid(unsafe_code)]

//! Mobile viewport classification.
//!
//! The host reports either a media-query match (preferred, reactive through
//! `MediaQueryList` change events) or, when media queries are unavailable,
//! the layout width. Until the first report the viewport is not mobile, so
//! the dock stays hidden before the host has classified anything.

use tracing::debug;

/// Where the current classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifySource {
    Unknown,
    MediaQuery,
    WidthFallback,
}

/// Reactive `is_mobile` flag.
#[derive(Debug, Clone)]
pub struct ViewportClassifier {
    max_width: f64,
    is_mobile: bool,
    source: ClassifySource,
}

impl ViewportClassifier {
    /// `max_width` is the inclusive width fallback.
    #[must_use]
    pub fn new(max_width: f64) -> Self {
        Self {
            max_width,
            is_mobile: false,
            source: ClassifySource::Unknown,
        }
    }

    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    #[must_use]
    pub const fn source(&self) -> ClassifySource {
        self.source
    }

    /// Apply a media-query match. Returns `true` if the classification changed.
    pub fn media_changed(&mut self, matches: bool) -> bool {
        self.source = ClassifySource::MediaQuery;
        self.set(matches)
    }

    /// Classify from a layout width.
    ///
    /// Ignored once a media query has reported, since the query is the
    /// authoritative signal. Returns `true` if the classification changed.
    pub fn width_changed(&mut self, width: f64) -> bool {
        if self.source == ClassifySource::MediaQuery || !width.is_finite() {
            return false;
        }
        self.source = ClassifySource::WidthFallback;
        self.set(width <= self.max_width)
    }

    fn set(&mut self, is_mobile: bool) -> bool {
        if self.is_mobile == is_mobile {
            return false;
        }
        debug!(is_mobile, source = ?self.source, "dock viewport classification changed");
        self.is_mobile = is_mobile;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unclassified_and_not_mobile() {
        let vc = ViewportClassifier::new(767.0);
        assert!(!vc.is_mobile());
        assert_eq!(vc.source(), ClassifySource::Unknown);
    }

    #[test]
    fn width_fallback_is_inclusive() {
        let mut vc = ViewportClassifier::new(767.0);
        assert!(vc.width_changed(767.0));
        assert!(vc.is_mobile());
        assert!(vc.width_changed(768.0));
        assert!(!vc.is_mobile());
        assert!(!vc.width_changed(1024.0));
    }

    #[test]
    fn media_query_wins_over_width() {
        let mut vc = ViewportClassifier::new(767.0);
        assert!(vc.media_changed(true));
        assert!(!vc.width_changed(1200.0));
        assert!(vc.is_mobile());
        assert!(vc.media_changed(false));
        assert!(!vc.is_mobile());
    }

    #[test]
    fn non_finite_width_is_ignored() {
        let mut vc = ViewportClassifier::new(767.0);
        assert!(!vc.width_changed(f64::NAN));
        assert_eq!(vc.source(), ClassifySource::Unknown);
    }
}
