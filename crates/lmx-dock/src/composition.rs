#![forbid(unsafe_code)]

//! What the dock renderer should draw this frame.
//!
//! Presentation is the host's business; this module only fixes the input
//! contract: which widgets are active, the `collapsed` / `suspended` /
//! `nav_expanded` booleans, and transition timings that honor a
//! reduced-motion preference.

use core::time::Duration;

use crate::config::DockConfig;

/// How the navigation widget appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavSlot<W> {
    /// Nav owns the dock alone and renders inline.
    Inline(W),
    /// Nav shares the dock with a CTA and its panel is expanded.
    Panel(W),
}

/// Entrance/exit timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTimings {
    pub enter: Duration,
    pub exit: Duration,
    pub reduced: bool,
}

impl MotionTimings {
    /// Timings for the given preference. Reduced motion shortens every
    /// transition to a near-zero duration; transitions still run.
    #[must_use]
    pub fn for_preference(config: &DockConfig, reduced: bool) -> Self {
        let ms = if reduced {
            config.reduced_motion_ms
        } else {
            config.transition_ms
        };
        let duration = Duration::from_millis(ms);
        Self {
            enter: duration,
            exit: duration,
            reduced,
        }
    }
}

/// Render plan for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan<W> {
    /// Dock occupies the screen at all (ready, mobile, something active).
    pub visible: bool,
    pub collapsed: bool,
    pub suspended: bool,
    pub nav_expanded: bool,
    /// Dim backdrop behind the expanded nav panel.
    pub backdrop: bool,
    pub cta: Option<W>,
    /// Button that opens the nav panel.
    pub toggle: bool,
    pub nav: Option<NavSlot<W>>,
    pub motion: MotionTimings,
}

impl<W> CompositionPlan<W> {
    /// Whether the dock row takes up space on screen.
    #[must_use]
    pub const fn occupies_space(&self) -> bool {
        self.visible && !self.collapsed && !self.suspended
    }
}
