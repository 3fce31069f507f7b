#![forbid(unsafe_code)]

//! Tunable thresholds for the dock controller.
//!
//! Every pixel and timing threshold used by the detectors lives in
//! [`DockConfig`]. The defaults are empirically tuned values; hosts may
//! override any subset of them from TOML or JSON (behind the `config`
//! feature), and unspecified fields keep their defaults.
//!
//! ```toml
//! collapse_after_px = 120.0
//! lock_window_ms = 160
//! ```

use core::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// CSS custom property carrying the reserved bottom height of the dock.
pub const DOCK_SPACE_PROPERTY: &str = "--adaptive-mobile-dock-space";

/// CSS custom property carrying the virtual-keyboard inset.
pub const VIEWPORT_BOTTOM_OFFSET_PROPERTY: &str = "--lmx-mobile-viewport-bottom-offset";

/// Controller thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DockConfig {
    /// Media query that classifies the viewport as mobile.
    pub mobile_query: String,
    /// Width fallback used when media queries are unavailable (inclusive).
    pub mobile_max_width: f64,
    /// Scroll deltas smaller than this are noise.
    pub scroll_noise_px: f64,
    /// Scroll position the page must pass before the dock may collapse.
    pub collapse_after_px: f64,
    /// Downward travel required to collapse.
    pub collapse_accum_px: f64,
    /// Scroll position at or above which the dock always re-expands.
    pub expand_top_px: f64,
    /// Upward travel required to re-expand.
    pub expand_accum_px: f64,
    /// Settle window after any collapse transition.
    pub lock_window_ms: u64,
    /// Bottom inset above which the virtual keyboard counts as visible.
    pub keyboard_inset_px: f64,
    /// Delay between pointer release and the end of dock interaction.
    pub interaction_release_ms: u64,
    /// Entrance/exit transition duration.
    pub transition_ms: u64,
    /// Transition duration used when reduced motion is requested.
    pub reduced_motion_ms: u64,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            mobile_query: "(max-width: 767px)".to_owned(),
            mobile_max_width: 767.0,
            scroll_noise_px: 2.0,
            collapse_after_px: 108.0,
            collapse_accum_px: 42.0,
            expand_top_px: 26.0,
            expand_accum_px: 26.0,
            lock_window_ms: 140,
            keyboard_inset_px: 80.0,
            interaction_release_ms: 240,
            transition_ms: 220,
            reduced_motion_ms: 1,
        }
    }
}

impl DockConfig {
    /// Load from a TOML string. The result is validated.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.into_validated()
    }

    /// Load from a JSON string. The result is validated.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.into_validated()
    }

    /// Serialize as a compact single-line JSON document.
    #[cfg(feature = "config")]
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }

    /// Return `self` if [`validate`](Self::validate) reports nothing.
    pub fn into_validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Check every threshold for a usable value.
    ///
    /// Returns a list of validation errors; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.mobile_query.trim().is_empty() {
            errors.push("mobile_query must not be empty".to_owned());
        }
        let pixel_fields = [
            ("mobile_max_width", self.mobile_max_width),
            ("scroll_noise_px", self.scroll_noise_px),
            ("collapse_after_px", self.collapse_after_px),
            ("collapse_accum_px", self.collapse_accum_px),
            ("expand_top_px", self.expand_top_px),
            ("expand_accum_px", self.expand_accum_px),
            ("keyboard_inset_px", self.keyboard_inset_px),
        ];
        for (name, value) in pixel_fields {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be a finite non-negative number, got {value}"));
            }
        }
        if self.collapse_accum_px <= 0.0 {
            errors.push("collapse_accum_px must be > 0".to_owned());
        }
        if self.expand_accum_px <= 0.0 {
            errors.push("expand_accum_px must be > 0".to_owned());
        }
        if self.expand_top_px > self.collapse_after_px {
            errors.push(format!(
                "expand_top_px ({}) must not exceed collapse_after_px ({})",
                self.expand_top_px, self.collapse_after_px
            ));
        }
        if self.reduced_motion_ms > self.transition_ms {
            errors.push("reduced_motion_ms must not exceed transition_ms".to_owned());
        }

        errors
    }

    #[must_use]
    pub const fn lock_window(&self) -> Duration {
        Duration::from_millis(self.lock_window_ms)
    }

    #[must_use]
    pub const fn interaction_release(&self) -> Duration {
        Duration::from_millis(self.interaction_release_ms)
    }
}

/// Errors that can occur when loading a dock configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
