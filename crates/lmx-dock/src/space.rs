#![forbid(unsafe_code)]

//! CSS custom-property publication.
//!
//! The page shell reserves bottom padding from
//! [`DOCK_SPACE_PROPERTY`](crate::config::DOCK_SPACE_PROPERTY) and pins the
//! dock above the keyboard with
//! [`VIEWPORT_BOTTOM_OFFSET_PROPERTY`](crate::config::VIEWPORT_BOTTOM_OFFSET_PROPERTY).
//! The controller writes both through a [`StyleSink`]; the web surface
//! implements it on `document.documentElement.style`.

use tracing::trace;

/// Destination for CSS custom properties.
pub trait StyleSink {
    fn set_property(&mut self, name: &str, value: &str);
}

/// Sink that keeps every write, for hosts that apply styles themselves and
/// for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingStyleSink {
    writes: Vec<(String, String)>,
}

impl RecordingStyleSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes in order.
    #[must_use]
    pub fn writes(&self) -> &[(String, String)] {
        &self.writes
    }

    /// Most recent value written for `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.writes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl StyleSink for RecordingStyleSink {
    fn set_property(&mut self, name: &str, value: &str) {
        self.writes.push((name.to_owned(), value.to_owned()));
    }
}

/// Format a pixel length the way the page shell expects it.
#[must_use]
pub fn px(value: u32) -> String {
    format!("{value}px")
}

/// Publishes one pixel-valued property, writing only on change.
#[derive(Debug, Clone)]
pub struct PropertyPublisher {
    name: &'static str,
    published: Option<u32>,
}

impl PropertyPublisher {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            published: None,
        }
    }

    #[must_use]
    pub const fn published(&self) -> Option<u32> {
        self.published
    }

    /// Write `value` unless it is already the published value.
    /// Returns `true` if the sink was written.
    pub fn publish(&mut self, sink: &mut dyn StyleSink, value: u32) -> bool {
        if self.published == Some(value) {
            return false;
        }
        trace!(property = self.name, value, "dock css publish");
        sink.set_property(self.name, &px(value));
        self.published = Some(value);
        true
    }
}

/// Reserved dock height.
///
/// The host reports measured heights (continuously from a resize observer,
/// or once per composition change when none exists). The reserved space is
/// the measured height while the dock occupies the screen, `0` otherwise.
#[derive(Debug, Clone)]
pub struct SpaceReporter {
    measured: u32,
    publisher: PropertyPublisher,
}

impl SpaceReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            measured: 0,
            publisher: PropertyPublisher::new(crate::config::DOCK_SPACE_PROPERTY),
        }
    }

    /// Record a measured dock row height in CSS pixels.
    pub fn measured(&mut self, height: f64) {
        self.measured = if height.is_finite() && height > 0.0 {
            height.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
    }

    #[must_use]
    pub const fn measured_height(&self) -> u32 {
        self.measured
    }

    /// Space that should be reserved right now.
    #[must_use]
    pub const fn reserved(&self, occupying: bool) -> u32 {
        if occupying { self.measured } else { 0 }
    }

    /// Publish the reserved space. Returns `true` if the sink was written.
    pub fn publish(&mut self, sink: &mut dyn StyleSink, occupying: bool) -> bool {
        let value = self.reserved(occupying);
        self.publisher.publish(sink, value)
    }

    #[must_use]
    pub const fn published(&self) -> Option<u32> {
        self.publisher.published()
    }
}

impl Default for SpaceReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DOCK_SPACE_PROPERTY;
    use pretty_assertions::assert_eq;

    #[test]
    fn publishes_only_on_change() {
        let mut sink = RecordingStyleSink::new();
        let mut p = PropertyPublisher::new("--x");
        assert!(p.publish(&mut sink, 4));
        assert!(!p.publish(&mut sink, 4));
        assert!(p.publish(&mut sink, 0));
        assert_eq!(
            sink.writes(),
            &[
                ("--x".to_owned(), "4px".to_owned()),
                ("--x".to_owned(), "0px".to_owned())
            ]
        );
    }

    #[test]
    fn reserved_space_is_zero_when_not_occupying() {
        let mut sink = RecordingStyleSink::new();
        let mut space = SpaceReporter::new();
        space.measured(63.6);
        assert_eq!(space.measured_height(), 64);

        space.publish(&mut sink, true);
        assert_eq!(sink.value(DOCK_SPACE_PROPERTY), Some("64px"));

        space.publish(&mut sink, false);
        assert_eq!(sink.value(DOCK_SPACE_PROPERTY), Some("0px"));
    }

    #[test]
    fn bogus_measurements_count_as_zero() {
        let mut space = SpaceReporter::new();
        space.measured(f64::INFINITY);
        assert_eq!(space.measured_height(), 0);
        space.measured(-4.0);
        assert_eq!(space.measured_height(), 0);
    }
}
