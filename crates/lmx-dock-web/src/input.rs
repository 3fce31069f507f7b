#![forbid(unsafe_code)]

//! JSON host events.
//!
//! Hosts without direct DOM bindings (server-driven shells, replay
//! harnesses, native tests) push signals as small JSON documents: a `kind`
//! tag plus the minimum fields needed to drive the controller. A pushed
//! event stands for the event *and* the frame that would follow it, so
//! frame-throttled signals are applied immediately.

use core::time::Duration;

use lmx_dock::{DockController, FocusTarget, StyleSink, ViewportMetrics};
use serde::{Deserialize, Serialize};

/// Shape of a focused element as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTargetJson {
    pub tag: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub content_editable: bool,
}

impl FocusTargetJson {
    #[must_use]
    pub fn classify(&self) -> FocusTarget {
        FocusTarget::classify(&self.tag, self.kind.as_deref(), self.content_editable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Up,
    Cancel,
}

/// A host-pushed signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    /// The host finished mounting.
    Ready,
    /// Mobile media query result.
    Media { mobile: bool },
    /// Layout width, for hosts without media queries.
    Width { px: f64 },
    ReducedMotion { enabled: bool },
    Scroll {
        y: f64,
        #[serde(default)]
        at_ms: f64,
    },
    /// Visual viewport geometry.
    Viewport {
        window_height: f64,
        viewport_height: f64,
        #[serde(default)]
        offset_top: f64,
    },
    /// The host has no visual-viewport API.
    ViewportUnavailable,
    FocusIn { target: FocusTargetJson },
    /// Focus left an element; `active` is what holds focus one frame later.
    FocusOut {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<FocusTargetJson>,
    },
    Pointer {
        phase: PointerPhase,
        #[serde(default)]
        at_ms: f64,
    },
    /// The interaction release timer fired.
    ReleaseTimer { at_ms: f64 },
    DockHeight { px: f64 },
}

/// Errors from decoding or applying a host event.
#[derive(Debug)]
pub enum HostEventError {
    /// The document does not match the event schema.
    Json(serde_json::Error),
    /// A timestamp was negative, not finite, or out of range.
    InvalidTime { at_ms: f64 },
}

impl std::fmt::Display for HostEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "host event JSON error: {e}"),
            Self::InvalidTime { at_ms } => write!(f, "invalid host timestamp: {at_ms}ms"),
        }
    }
}

impl std::error::Error for HostEventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::InvalidTime { .. } => None,
        }
    }
}

impl From<serde_json::Error> for HostEventError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Convert a host timestamp in milliseconds.
pub fn duration_from_ms(at_ms: f64) -> Result<Duration, HostEventError> {
    Duration::try_from_secs_f64(at_ms / 1_000.0).map_err(|_| HostEventError::InvalidTime { at_ms })
}

/// What applying one event did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// The render plan changed.
    pub plan_changed: bool,
    /// The host should push [`HostEvent::ReleaseTimer`] after this delay.
    pub release_after: Option<Duration>,
}

impl HostEvent {
    pub fn to_json_string(&self) -> Result<String, HostEventError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, HostEventError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Drive `dock` with this event.
    pub fn apply<W, S>(&self, dock: &mut DockController<W, S>) -> Result<Dispatch, HostEventError>
    where
        W: Clone + 'static,
        S: StyleSink,
    {
        let before = dock.revision();
        let mut release_after = None;
        match self {
            Self::Ready => dock.mark_ready(),
            Self::Media { mobile } => dock.media_changed(*mobile),
            Self::Width { px } => dock.width_changed(*px),
            Self::ReducedMotion { enabled } => dock.set_reduced_motion(*enabled),
            Self::Scroll { y, at_ms } => {
                let now = duration_from_ms(*at_ms)?;
                let _ = dock.scroll_event();
                dock.scroll_frame(now, *y);
            }
            Self::Viewport {
                window_height,
                viewport_height,
                offset_top,
            } => {
                let _ = dock.viewport_event();
                dock.viewport_frame(Some(ViewportMetrics {
                    window_height: *window_height,
                    viewport_height: *viewport_height,
                    offset_top: *offset_top,
                }));
            }
            Self::ViewportUnavailable => {
                let _ = dock.viewport_event();
                dock.viewport_frame(None);
            }
            Self::FocusIn { target } => dock.focus_in(&target.classify()),
            Self::FocusOut { active } => {
                let _ = dock.focus_out();
                let active = active.as_ref().map(FocusTargetJson::classify);
                dock.focus_frame(active.as_ref());
            }
            Self::Pointer { phase, at_ms } => match phase {
                PointerPhase::Down => dock.pointer_down(),
                PointerPhase::Up | PointerPhase::Cancel => {
                    release_after = dock.pointer_up(duration_from_ms(*at_ms)?);
                }
            },
            Self::ReleaseTimer { at_ms } => {
                dock.release_due(duration_from_ms(*at_ms)?);
            }
            Self::DockHeight { px } => dock.dock_measured(*px),
        }
        Ok(Dispatch {
            plan_changed: dock.revision() != before,
            release_after,
        })
    }
}
