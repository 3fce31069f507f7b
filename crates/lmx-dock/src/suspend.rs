#![forbid(unsafe_code)]

//! Environment signals that hide the dock without a collaborator asking.
//!
//! Two independent detectors feed auto-suspension:
//!
//! - [`TextInputDetector`]: a textual field has focus, so the user is typing
//!   and the dock would sit on top of what they type.
//! - [`KeyboardInsetDetector`]: the visual viewport has shrunk from the
//!   bottom far enough that a virtual keyboard must be showing.

/// What the host found on the focused element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    ContentEditable,
    TextArea,
    /// An `<input>`; `kind` is its `type` attribute as written.
    Input { kind: String },
    Other,
}

/// Input types that never raise a keyboard.
pub const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "checkbox",
    "radio",
    "button",
    "submit",
    "reset",
    "file",
    "range",
    "color",
    "date",
    "datetime-local",
    "month",
    "time",
    "week",
    "hidden",
];

impl FocusTarget {
    /// Build from a lower-level description: the element tag name, its
    /// `type` attribute and whether it is content-editable.
    #[must_use]
    pub fn classify(tag: &str, kind: Option<&str>, content_editable: bool) -> Self {
        if content_editable {
            return Self::ContentEditable;
        }
        if tag.eq_ignore_ascii_case("textarea") {
            Self::TextArea
        } else if tag.eq_ignore_ascii_case("input") {
            Self::Input {
                kind: kind.unwrap_or_default().to_owned(),
            }
        } else {
            Self::Other
        }
    }

    /// Whether focusing this element means the user is about to type.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        match self {
            Self::ContentEditable | Self::TextArea => true,
            Self::Input { kind } => {
                let kind = kind.trim();
                !NON_TEXT_INPUT_TYPES
                    .iter()
                    .any(|excluded| kind.eq_ignore_ascii_case(excluded))
            }
            Self::Other => false,
        }
    }
}

/// Tracks whether a textual element holds focus.
///
/// `focusin` is applied immediately. `focusout` is only a hint: focus may
/// be moving to another textual field, so the host re-reads the active
/// element on the next frame and calls [`resolve`](Self::resolve).
#[derive(Debug, Clone, Default)]
pub struct TextInputDetector {
    active: bool,
}

impl TextInputDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` if the flag changed.
    pub fn focus_in(&mut self, target: &FocusTarget) -> bool {
        self.set(target.is_textual())
    }

    /// Re-evaluate against the element focused after a `focusout` settled.
    /// Returns `true` if the flag changed.
    pub fn resolve(&mut self, active: Option<&FocusTarget>) -> bool {
        self.set(active.is_some_and(FocusTarget::is_textual))
    }

    /// Forget the focused field. Returns `true` if the flag changed.
    pub fn clear(&mut self) -> bool {
        self.set(false)
    }

    fn set(&mut self, active: bool) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }
}

/// Visual-viewport geometry reported by the host, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// `window.innerHeight`.
    pub window_height: f64,
    /// `visualViewport.height`.
    pub viewport_height: f64,
    /// `visualViewport.offsetTop`.
    pub offset_top: f64,
}

impl ViewportMetrics {
    /// Pixels of layout viewport hidden below the visual viewport.
    ///
    /// Negative insets (overscroll bounce, rounding) clamp to `0`.
    #[must_use]
    pub fn bottom_offset(&self) -> u32 {
        let raw = (self.window_height - (self.viewport_height + self.offset_top)).round();
        if raw.is_finite() && raw > 0.0 {
            raw.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }
}

/// Keyboard visibility from the visual-viewport bottom inset.
#[derive(Debug, Clone)]
pub struct KeyboardInsetDetector {
    threshold_px: f64,
    bottom_offset: u32,
    visible: bool,
}

/// Result of one keyboard-inset evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsetUpdate {
    pub bottom_offset: u32,
    pub offset_changed: bool,
    pub visibility_changed: bool,
}

impl KeyboardInsetDetector {
    #[must_use]
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            bottom_offset: 0,
            visible: false,
        }
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn bottom_offset(&self) -> u32 {
        self.bottom_offset
    }

    /// Evaluate one frame-throttled viewport reading.
    ///
    /// `None` means the visual-viewport API is absent: the inset is `0` and
    /// the keyboard is never considered visible.
    pub fn update(&mut self, metrics: Option<ViewportMetrics>, is_mobile: bool) -> InsetUpdate {
        let bottom_offset = metrics.map_or(0, |m| m.bottom_offset());
        let visible = is_mobile && f64::from(bottom_offset) > self.threshold_px;
        let update = InsetUpdate {
            bottom_offset,
            offset_changed: bottom_offset != self.bottom_offset,
            visibility_changed: visible != self.visible,
        };
        self.bottom_offset = bottom_offset;
        self.visible = visible;
        update
    }
}
