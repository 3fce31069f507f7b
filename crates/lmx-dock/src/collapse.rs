#![forbid(unsafe_code)]

//! Scroll-driven collapse hysteresis.
//!
//! The dock shrinks out of view while the user scrolls down through the
//! page and comes back when they scroll up or return to the top.
//!
//! # State Machine
//!
//! ```text
//!               y > collapse_after && down >= collapse_accum
//!   Expanded ─────────────────────────────────────────────────▶ Collapsed
//!       ▲                                                          │
//!       └──────────── y <= expand_top || up >= expand_accum ───────┘
//! ```
//!
//! `down` and `up` are unidirectional travel accumulated since the last
//! direction reversal. Every transition resets both and arms a settle
//! window during which no further transition may fire, except the top
//! snap: reaching `expand_top` while collapsed expands immediately, so a
//! fling that lands at the top inside the window never leaves the dock
//! hidden.
//!
//! # Invariants
//!
//! 1. Samples with `|dy| < noise` change nothing, not even the baseline.
//! 2. At most one of `down`/`up` is non-zero.
//! 3. No two transitions are closer in time than the lock window, unless
//!    the later one is a top-snap expansion.
//! 4. After [`reset`](CollapseDetector::reset) the state is `Expanded` and
//!    the next sample only establishes a baseline.

use core::time::Duration;

use tracing::{debug, trace};

use crate::config::DockConfig;

/// Binary collapse state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollapseState {
    #[default]
    Expanded,
    Collapsed,
}

impl CollapseState {
    #[must_use]
    pub const fn is_collapsed(self) -> bool {
        matches!(self, Self::Collapsed)
    }
}

/// A state change produced by one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseTransition {
    Collapsed,
    Expanded,
}

/// Thresholds for [`CollapseDetector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseConfig {
    pub noise_px: f64,
    pub collapse_after_px: f64,
    pub collapse_accum_px: f64,
    pub expand_top_px: f64,
    pub expand_accum_px: f64,
    pub lock_window: Duration,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self::from(&DockConfig::default())
    }
}

impl From<&DockConfig> for CollapseConfig {
    fn from(config: &DockConfig) -> Self {
        Self {
            noise_px: config.scroll_noise_px,
            collapse_after_px: config.collapse_after_px,
            collapse_accum_px: config.collapse_accum_px,
            expand_top_px: config.expand_top_px,
            expand_accum_px: config.expand_accum_px,
            lock_window: config.lock_window(),
        }
    }
}

/// Dual-accumulator scroll collapse detector.
#[derive(Debug, Clone)]
pub struct CollapseDetector {
    config: CollapseConfig,
    state: CollapseState,
    last_y: Option<f64>,
    down_accum: f64,
    up_accum: f64,
    lock_until: Duration,
}

impl CollapseDetector {
    #[must_use]
    pub fn new(config: CollapseConfig) -> Self {
        Self {
            config,
            state: CollapseState::Expanded,
            last_y: None,
            down_accum: 0.0,
            up_accum: 0.0,
            lock_until: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CollapseState {
        self.state
    }

    /// Feed one frame-throttled scroll sample taken at host time `now`.
    pub fn sample(&mut self, now: Duration, y: f64) -> Option<CollapseTransition> {
        if !y.is_finite() {
            return None;
        }
        let Some(last_y) = self.last_y else {
            self.last_y = Some(y);
            return None;
        };
        let dy = y - last_y;
        if dy.abs() < self.config.noise_px {
            return None;
        }
        self.last_y = Some(y);

        if dy > 0.0 {
            self.down_accum += dy;
            self.up_accum = 0.0;
        } else {
            self.up_accum += -dy;
            self.down_accum = 0.0;
        }
        trace!(
            y,
            dy,
            down = self.down_accum,
            up = self.up_accum,
            "dock scroll sample"
        );

        let top_snap = self.state.is_collapsed() && y <= self.config.expand_top_px;
        if now < self.lock_until && !top_snap {
            return None;
        }

        let transition = match self.state {
            CollapseState::Expanded
                if y > self.config.collapse_after_px
                    && self.down_accum >= self.config.collapse_accum_px =>
            {
                Some(CollapseTransition::Collapsed)
            }
            CollapseState::Collapsed
                if y <= self.config.expand_top_px
                    || self.up_accum >= self.config.expand_accum_px =>
            {
                Some(CollapseTransition::Expanded)
            }
            _ => None,
        }?;

        self.state = match transition {
            CollapseTransition::Collapsed => CollapseState::Collapsed,
            CollapseTransition::Expanded => CollapseState::Expanded,
        };
        self.down_accum = 0.0;
        self.up_accum = 0.0;
        self.lock_until = now.saturating_add(self.config.lock_window);
        debug!(?transition, y, "dock collapse transition");
        Some(transition)
    }

    /// Force `Expanded` and forget all scroll history.
    ///
    /// Returns `true` if the dock was collapsed.
    pub fn reset(&mut self) -> bool {
        let was_collapsed = self.state.is_collapsed();
        self.state = CollapseState::Expanded;
        self.last_y = None;
        self.down_accum = 0.0;
        self.up_accum = 0.0;
        self.lock_until = Duration::ZERO;
        was_collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn detector() -> CollapseDetector {
        CollapseDetector::new(CollapseConfig::default())
    }

    /// Scroll from `from` to `to` in `step` increments, one frame each.
    fn sweep(
        d: &mut CollapseDetector,
        t: &mut u64,
        from: f64,
        to: f64,
        step: f64,
    ) -> Vec<CollapseTransition> {
        let mut out = Vec::new();
        let mut y = from;
        let dir = if to >= from { 1.0 } else { -1.0 };
        loop {
            if let Some(tr) = d.sample(ms(*t), y) {
                out.push(tr);
            }
            *t += 16;
            if (dir > 0.0 && y >= to) || (dir < 0.0 && y <= to) {
                break;
            }
            y = (y + dir * step).clamp(from.min(to), from.max(to));
        }
        out
    }

    #[test]
    fn first_sample_only_sets_baseline() {
        let mut d = detector();
        assert_eq!(d.sample(ms(0), 500.0), None);
        assert_eq!(d.state(), CollapseState::Expanded);
    }

    #[test]
    fn collapses_after_threshold_and_travel() {
        let mut d = detector();
        d.sample(ms(0), 100.0);
        // 100 → 130: past 108 but only 30px of travel.
        assert_eq!(d.sample(ms(16), 130.0), None);
        // 130 → 145: 45px accumulated.
        assert_eq!(d.sample(ms(32), 145.0), Some(CollapseTransition::Collapsed));
        assert_eq!(d.state(), CollapseState::Collapsed);
    }

    #[test]
    fn downward_travel_near_top_never_collapses() {
        let mut d = detector();
        let mut t = 0;
        let transitions = sweep(&mut d, &mut t, 0.0, 108.0, 10.0);
        assert!(transitions.is_empty(), "{transitions:?}");
        assert_eq!(d.state(), CollapseState::Expanded);
    }

    #[test]
    fn noise_samples_do_not_move_baseline() {
        let mut d = detector();
        d.sample(ms(0), 200.0);
        for i in 1..=30 {
            // 1px wiggles are below the floor.
            let y = if i % 2 == 0 { 200.0 } else { 201.0 };
            assert_eq!(d.sample(ms(i * 16), y), None);
        }
        assert_eq!(d.state(), CollapseState::Expanded);
    }

    #[test]
    fn slow_creep_is_measured_against_last_accepted_sample() {
        let mut d = detector();
        d.sample(ms(0), 300.0);
        let mut y = 300.0;
        let mut first = None;
        for i in 1..=40u64 {
            y += 1.5;
            if d.sample(ms(i * 16), y).is_some() && first.is_none() {
                first = Some(i);
            }
        }
        // Every other 1.5px step is accepted as a 3px delta; 14 of them reach 42px.
        assert_eq!(first, Some(28));
    }

    #[test]
    fn upward_travel_reexpands() {
        let mut d = detector();
        d.sample(ms(0), 400.0);
        assert_eq!(d.sample(ms(16), 450.0), Some(CollapseTransition::Collapsed));
        assert_eq!(d.sample(ms(200), 440.0), None);
        assert_eq!(d.sample(ms(216), 423.0), Some(CollapseTransition::Expanded));
    }

    #[test]
    fn reversal_resets_opposite_accumulator() {
        let mut d = detector();
        d.sample(ms(0), 400.0);
        d.sample(ms(16), 430.0); // down 30
        d.sample(ms(32), 420.0); // up 10, down reset
        assert_eq!(d.sample(ms(48), 450.0), None); // down 30 again
        assert_eq!(d.sample(ms(64), 465.0), Some(CollapseTransition::Collapsed));
    }

    #[test]
    fn lock_window_blocks_immediate_reversal() {
        let mut d = detector();
        d.sample(ms(0), 400.0);
        assert_eq!(d.sample(ms(16), 450.0), Some(CollapseTransition::Collapsed));
        // Big upward flick inside the 140ms window.
        assert_eq!(d.sample(ms(60), 400.0), None);
        assert_eq!(d.state(), CollapseState::Collapsed);
        // Still accumulating up; the first sample after the window fires.
        assert_eq!(d.sample(ms(160), 396.0), Some(CollapseTransition::Expanded));
    }

    #[test]
    fn top_snap_forces_expand_regardless_of_accumulators() {
        let mut d = detector();
        d.sample(ms(0), 300.0);
        assert_eq!(d.sample(ms(16), 350.0), Some(CollapseTransition::Collapsed));
        // Direct jump to the top (e.g. scroll-to-top button).
        assert_eq!(d.sample(ms(400), 20.0), Some(CollapseTransition::Expanded));
    }

    #[test]
    fn top_snap_boundary_is_inclusive() {
        let config = CollapseConfig {
            expand_accum_px: 10_000.0,
            ..CollapseConfig::default()
        };
        let mut d = CollapseDetector::new(config);
        d.sample(ms(0), 300.0);
        assert_eq!(d.sample(ms(16), 350.0), Some(CollapseTransition::Collapsed));
        assert_eq!(d.sample(ms(400), 27.0), None);
        assert_eq!(d.sample(ms(416), 24.0), Some(CollapseTransition::Expanded));

        let mut d = CollapseDetector::new(config);
        d.sample(ms(0), 300.0);
        d.sample(ms(16), 350.0);
        assert_eq!(d.sample(ms(400), 26.0), Some(CollapseTransition::Expanded));
    }

    #[test]
    fn top_snap_bypasses_lock_window() {
        let mut d = detector();
        d.sample(ms(0), 300.0);
        assert_eq!(d.sample(ms(16), 350.0), Some(CollapseTransition::Collapsed));
        // Fling back to the top 48ms later; no further sample follows.
        assert_eq!(d.sample(ms(64), 10.0), Some(CollapseTransition::Expanded));
        assert_eq!(d.state(), CollapseState::Expanded);
    }

    #[test]
    fn reset_forces_expanded_and_clears_history() {
        let mut d = detector();
        d.sample(ms(0), 300.0);
        d.sample(ms(16), 350.0);
        assert!(d.reset());
        assert_eq!(d.state(), CollapseState::Expanded);
        // The next sample is a fresh baseline, not a 350 → 600 jump.
        assert_eq!(d.sample(ms(32), 600.0), None);
        assert!(!d.reset());
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut d = detector();
        d.sample(ms(0), 300.0);
        assert_eq!(d.sample(ms(16), f64::NAN), None);
        assert_eq!(d.sample(ms(32), 350.0), Some(CollapseTransition::Collapsed));
    }
}
