#![forbid(unsafe_code)]

//! Descriptors submitted by collaborators competing for dock space.
//!
//! The widget handle type `W` is opaque to the controller: it is whatever
//! the host renders with (a JS function on the web surface, a plain label
//! in tests). Entries are only ever read for selection and composition.

/// Something the selection policy can rank.
pub trait Candidate {
    fn enabled(&self) -> bool;
    fn priority(&self) -> i32;
    /// Logical stamp of the last upsert. Larger is more recent.
    fn updated_at(&self) -> u64;
}

/// Payload for [`crate::DockStore::upsert_nav`].
#[derive(Debug, Clone, PartialEq)]
pub struct NavPayload<W> {
    pub enabled: bool,
    pub priority: i32,
    /// Expanded navigation panel.
    pub render_full: W,
    /// Inline bar form used when no call-to-action shares the dock.
    pub render_compact: Option<W>,
}

impl<W> NavPayload<W> {
    /// Enabled payload with priority `0` and no compact form.
    #[must_use]
    pub fn new(render_full: W) -> Self {
        Self {
            enabled: true,
            priority: 0,
            render_full,
            render_compact: None,
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn compact(mut self, render_compact: W) -> Self {
        self.render_compact = Some(render_compact);
        self
    }
}

/// Payload for [`crate::DockStore::upsert_cta`].
#[derive(Debug, Clone, PartialEq)]
pub struct CtaPayload<W> {
    pub enabled: bool,
    pub priority: i32,
    pub render: W,
}

impl<W> CtaPayload<W> {
    /// Enabled payload with priority `0`.
    #[must_use]
    pub fn new(render: W) -> Self {
        Self {
            enabled: true,
            priority: 0,
            render,
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A registered navigation widget.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry<W> {
    pub id: String,
    pub enabled: bool,
    pub priority: i32,
    pub updated_at: u64,
    pub render_full: W,
    pub render_compact: Option<W>,
}

impl<W> NavEntry<W> {
    pub(crate) fn from_payload(id: String, payload: NavPayload<W>, updated_at: u64) -> Self {
        Self {
            id,
            enabled: payload.enabled,
            priority: payload.priority,
            updated_at,
            render_full: payload.render_full,
            render_compact: payload.render_compact,
        }
    }

    /// The form rendered inline when the nav owns the dock alone.
    #[must_use]
    pub fn inline_widget(&self) -> &W {
        self.render_compact.as_ref().unwrap_or(&self.render_full)
    }
}

impl<W> Candidate for NavEntry<W> {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn updated_at(&self) -> u64 {
        self.updated_at
    }
}

/// A registered call-to-action widget.
#[derive(Debug, Clone, PartialEq)]
pub struct CtaEntry<W> {
    pub id: String,
    pub enabled: bool,
    pub priority: i32,
    pub updated_at: u64,
    pub render: W,
}

impl<W> CtaEntry<W> {
    pub(crate) fn from_payload(id: String, payload: CtaPayload<W>, updated_at: u64) -> Self {
        Self {
            id,
            enabled: payload.enabled,
            priority: payload.priority,
            updated_at,
            render: payload.render,
        }
    }
}

impl<W> Candidate for CtaEntry<W> {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn updated_at(&self) -> u64 {
        self.updated_at
    }
}

/// Options for [`crate::DockStore::set_suspended`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuspendOptions {
    /// Let the navigation panel stay open while this request is active.
    pub keep_nav_open: bool,
}

impl SuspendOptions {
    #[must_use]
    pub const fn keep_nav_open() -> Self {
        Self {
            keep_nav_open: true,
        }
    }
}

/// An active manual suspension request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspendEntry {
    pub id: String,
    /// Logical stamp of the request, shared with `updated_at`.
    pub at: u64,
    pub keep_nav_open: bool,
}
