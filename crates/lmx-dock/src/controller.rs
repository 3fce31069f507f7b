#![forbid(unsafe_code)]

//! The dock controller.
//!
//! [`DockController`] owns the detectors and derives, from the store and
//! the host-reported signals, one verdict per frame:
//!
//! - `show_dock`: ready, mobile, and some nav or CTA entry is active;
//! - `suspended`: a collaborator asked (manual) or a text field / virtual
//!   keyboard demands it (auto);
//! - `collapsed`: the scroll detector says the dock should shrink away;
//! - `nav_expanded`: the user opened the nav panel.
//!
//! The controller is host-driven: it never reads the clock or the DOM.
//! The host pushes events, answers [`FrameRequest`]s with animation frames,
//! and supplies the time (`now`) as a monotonic [`Duration`].
//!
//! Collaborators may mutate the store through cloned handles. The
//! controller then stays stale until the host calls
//! [`refresh`](DockController::refresh); install a
//! [`refresh hook`](DockController::set_refresh_hook) to learn when one is
//! due.
//!
//! # Invariants
//!
//! 1. The dock is never shown while not ready or not mobile.
//! 2. `collapsed` is false whenever `nav_expanded` is true.
//! 3. Collapse is forced to `Expanded` (and its history dropped) whenever
//!    the dock is hidden, suspended, nav-expanded, or under interaction.
//! 4. Auto-suspension always closes the nav panel; manual suspension keeps
//!    it open only when some request set `keep_nav_open`.

use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace_span};

use crate::collapse::{CollapseConfig, CollapseDetector, CollapseState};
use crate::composition::{CompositionPlan, MotionTimings, NavSlot};
use crate::config::{DockConfig, VIEWPORT_BOTTOM_OFFSET_PROPERTY};
use crate::entry::{CtaEntry, CtaPayload, NavEntry, NavPayload, SuspendOptions};
use crate::frame::{FrameCoalescer, FrameRequest};
use crate::space::{PropertyPublisher, SpaceReporter, StyleSink};
use crate::store::{DockStatus, DockStore, Subscription};
use crate::suspend::{FocusTarget, KeyboardInsetDetector, TextInputDetector, ViewportMetrics};
use crate::viewport::ViewportClassifier;

/// Everything that changes what the renderer draws.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlanKey {
    show: bool,
    collapsed: bool,
    suspended: bool,
    nav_expanded: bool,
    nav: Option<(String, u64)>,
    cta: Option<(String, u64)>,
    reduced_motion: bool,
}

/// Store-change bookkeeping shared with the store subscription.
#[derive(Default)]
struct StoreWatch {
    dirty: Cell<bool>,
    /// Set while the controller itself touches the store.
    quiet: Cell<bool>,
    hook: RefCell<Option<Box<dyn Fn()>>>,
}

impl StoreWatch {
    fn changed(&self) {
        if self.dirty.replace(true) || self.quiet.get() {
            return;
        }
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook();
        }
    }
}

/// Host-driven dock coordinator.
pub struct DockController<W, S: StyleSink> {
    config: DockConfig,
    store: DockStore<W>,
    sink: S,
    watch: Rc<StoreWatch>,
    store_sub: Option<Subscription>,

    ready: bool,
    viewport: ViewportClassifier,
    collapse: CollapseDetector,
    text_input: TextInputDetector,
    keyboard: KeyboardInsetDetector,
    last_metrics: Option<ViewportMetrics>,
    inset: PropertyPublisher,
    space: SpaceReporter,
    reduced_motion: bool,

    nav_expanded: bool,
    interacting: bool,
    release_at: Option<Duration>,

    scroll_frame: FrameCoalescer,
    viewport_frame: FrameCoalescer,
    focus_frame: FrameCoalescer,

    last_plan: Option<PlanKey>,
    last_suspension: (bool, bool),
    revision: u64,
    torn_down: bool,
}

impl<W, S: StyleSink> std::fmt::Debug for DockController<W, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockController")
            .field("ready", &self.ready)
            .field("is_mobile", &self.viewport.is_mobile())
            .field("collapse", &self.collapse.state())
            .field("nav_expanded", &self.nav_expanded)
            .field("interacting", &self.interacting)
            .field("revision", &self.revision)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl<W: Clone + 'static, S: StyleSink> DockController<W, S> {
    /// Controller with default thresholds.
    pub fn new(store: DockStore<W>, sink: S) -> Self {
        Self::with_config(DockConfig::default(), store, sink)
    }

    pub fn with_config(config: DockConfig, store: DockStore<W>, sink: S) -> Self {
        let watch = Rc::new(StoreWatch::default());
        watch.dirty.set(true);
        let watched = Rc::clone(&watch);
        let store_sub = store.subscribe(move |_| watched.changed());

        let mut controller = Self {
            collapse: CollapseDetector::new(CollapseConfig::from(&config)),
            viewport: ViewportClassifier::new(config.mobile_max_width),
            keyboard: KeyboardInsetDetector::new(config.keyboard_inset_px),
            config,
            store,
            sink,
            watch,
            store_sub: Some(store_sub),
            ready: false,
            text_input: TextInputDetector::new(),
            last_metrics: None,
            inset: PropertyPublisher::new(VIEWPORT_BOTTOM_OFFSET_PROPERTY),
            space: SpaceReporter::new(),
            reduced_motion: false,
            nav_expanded: false,
            interacting: false,
            release_at: None,
            scroll_frame: FrameCoalescer::new(),
            viewport_frame: FrameCoalescer::new(),
            focus_frame: FrameCoalescer::new(),
            last_plan: None,
            last_suspension: (false, false),
            revision: 0,
            torn_down: false,
        };
        controller.inset.publish(&mut controller.sink, 0);
        controller.reconcile();
        controller
    }

    // --- accessors -------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    /// Collaborator-facing context handle. Clone it freely.
    #[must_use]
    pub fn store(&self) -> &DockStore<W> {
        &self.store
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Bumped every time the render plan changes.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    // --- context API -------------------------------------------------------

    pub fn upsert_nav(&mut self, id: &str, payload: NavPayload<W>) {
        self.quietly(|store| store.upsert_nav(id, payload));
        self.reconcile();
    }

    pub fn remove_nav(&mut self, id: &str) {
        self.quietly(|store| store.remove_nav(id));
        self.reconcile();
    }

    pub fn upsert_cta(&mut self, id: &str, payload: CtaPayload<W>) {
        self.quietly(|store| store.upsert_cta(id, payload));
        self.reconcile();
    }

    pub fn remove_cta(&mut self, id: &str) {
        self.quietly(|store| store.remove_cta(id));
        self.reconcile();
    }

    pub fn set_suspended(&mut self, id: &str, suspended: bool, options: SuspendOptions) {
        self.quietly(|store| store.set_suspended(id, suspended, options));
        self.reconcile();
    }

    pub fn clear_suspended(&mut self, id: &str) {
        self.quietly(|store| store.clear_suspended(id));
        self.reconcile();
    }

    /// Collapse the navigation panel.
    pub fn close_nav(&mut self) {
        self.nav_expanded = false;
        self.reconcile();
    }

    /// Flip the navigation panel. Returns the new expansion state.
    ///
    /// Only effective while the toggle button is on screen (nav and CTA both
    /// active) and the panel is allowed open.
    pub fn toggle_nav(&mut self) -> bool {
        self.refresh();
        if self.nav_expanded {
            self.nav_expanded = false;
        } else if self.toggle_available() && self.nav_may_stay_open() {
            self.nav_expanded = true;
        }
        self.reconcile();
        self.nav_expanded
    }

    /// Call `hook` when a store change arrives from another handle while the
    /// controller is up to date. The host should answer with
    /// [`refresh`](Self::refresh) on its next frame. At most one call per
    /// refresh.
    pub fn set_refresh_hook(&mut self, hook: impl Fn() + 'static) {
        *self.watch.hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn clear_refresh_hook(&mut self) {
        self.watch.hook.borrow_mut().take();
    }

    /// Whether a store change is waiting for [`refresh`](Self::refresh).
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        !self.torn_down && self.watch.dirty.get()
    }

    fn quietly<R>(&self, f: impl FnOnce(&DockStore<W>) -> R) -> R {
        let was_quiet = self.watch.quiet.replace(true);
        let out = f(&self.store);
        self.watch.quiet.set(was_quiet);
        out
    }

    // --- derived state -----------------------------------------------------

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.viewport.is_mobile()
    }

    #[must_use]
    pub fn active_nav(&self) -> Option<NavEntry<W>> {
        self.store.active_nav()
    }

    #[must_use]
    pub fn active_cta(&self) -> Option<CtaEntry<W>> {
        self.store.active_cta()
    }

    #[must_use]
    pub fn is_manually_suspended(&self) -> bool {
        self.store.is_manually_suspended()
    }

    #[must_use]
    pub const fn is_auto_suspended(&self) -> bool {
        self.text_input.is_active() || self.keyboard.is_visible()
    }

    #[must_use]
    pub const fn is_text_input_active(&self) -> bool {
        self.text_input.is_active()
    }

    #[must_use]
    pub const fn is_keyboard_visible(&self) -> bool {
        self.keyboard.is_visible()
    }

    /// Effective suspension: manual OR auto.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.is_manually_suspended() || self.is_auto_suspended()
    }

    #[must_use]
    pub fn show_dock(&self) -> bool {
        self.ready
            && self.viewport.is_mobile()
            && (self.store.active_nav().is_some() || self.store.active_cta().is_some())
    }

    #[must_use]
    pub const fn collapse_state(&self) -> CollapseState {
        self.collapse.state()
    }

    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapse.state().is_collapsed()
    }

    #[must_use]
    pub const fn is_nav_expanded(&self) -> bool {
        self.nav_expanded
    }

    #[must_use]
    pub const fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Published virtual-keyboard inset.
    #[must_use]
    pub const fn bottom_offset(&self) -> u32 {
        self.keyboard.bottom_offset()
    }

    /// Published reserved dock space, if any has been published.
    #[must_use]
    pub const fn reserved_space(&self) -> Option<u32> {
        self.space.published()
    }

    fn toggle_available(&self) -> bool {
        self.show_dock() && self.store.active_nav().is_some() && self.store.active_cta().is_some()
    }

    fn nav_may_stay_open(&self) -> bool {
        if self.is_auto_suspended() {
            return false;
        }
        !self.is_manually_suspended() || self.store.keep_nav_open()
    }

    fn collapse_enabled(&self) -> bool {
        self.show_dock() && !self.is_suspended() && !self.nav_expanded && !self.interacting
    }

    // --- environment signals ---------------------------------------------

    /// Mark the host as mounted; the dock may show from now on.
    pub fn mark_ready(&mut self) {
        if self.torn_down {
            return;
        }
        self.ready = true;
        self.reconcile();
    }

    /// Apply a mobile media-query match.
    pub fn media_changed(&mut self, matches: bool) {
        if self.viewport.media_changed(matches) {
            self.reapply_keyboard();
        }
        self.reconcile();
    }

    /// Classify from layout width when media queries are unavailable.
    pub fn width_changed(&mut self, width: f64) {
        if self.viewport.width_changed(width) {
            self.reapply_keyboard();
        }
        self.reconcile();
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        self.reconcile();
    }

    /// A scroll event arrived.
    pub fn scroll_event(&mut self) -> FrameRequest {
        self.scroll_frame.request()
    }

    /// Frame callback for scroll: `y` is the current vertical scroll offset.
    pub fn scroll_frame(&mut self, now: Duration, y: f64) {
        if !self.scroll_frame.fire() {
            return;
        }
        self.refresh();
        if !self.collapse_enabled() {
            self.collapse.reset();
            return;
        }
        if self.collapse.sample(now, y).is_some() {
            self.reconcile();
        }
    }

    /// A visual-viewport resize/scroll event arrived.
    pub fn viewport_event(&mut self) -> FrameRequest {
        self.viewport_frame.request()
    }

    /// Frame callback for the visual viewport. `None` when the API is absent.
    pub fn viewport_frame(&mut self, metrics: Option<ViewportMetrics>) {
        if !self.viewport_frame.fire() {
            return;
        }
        self.last_metrics = metrics;
        self.reapply_keyboard();
        self.reconcile();
    }

    fn reapply_keyboard(&mut self) {
        let update = self
            .keyboard
            .update(self.last_metrics, self.viewport.is_mobile());
        self.inset.publish(&mut self.sink, update.bottom_offset);
    }

    /// `focusin` on `target`.
    pub fn focus_in(&mut self, target: &FocusTarget) {
        self.focus_frame.cancel();
        if self.text_input.focus_in(target) {
            self.reconcile();
        }
    }

    /// `focusout`: the host must call [`focus_frame`](Self::focus_frame) on
    /// the next animation frame if asked to schedule one.
    pub fn focus_out(&mut self) -> FrameRequest {
        self.focus_frame.request()
    }

    /// Deferred focus re-evaluation with the element focused now.
    pub fn focus_frame(&mut self, active: Option<&FocusTarget>) {
        if !self.focus_frame.fire() {
            return;
        }
        if self.text_input.resolve(active) {
            self.reconcile();
        }
    }

    /// Pointer went down anywhere on the dock.
    pub fn pointer_down(&mut self) {
        self.interacting = true;
        self.release_at = None;
        self.reconcile();
    }

    /// Pointer released or cancelled. Returns the delay after which the host
    /// should call [`release_due`](Self::release_due), or `None` if no
    /// interaction was in progress. Any earlier pending release is replaced.
    pub fn pointer_up(&mut self, now: Duration) -> Option<Duration> {
        if !self.interacting {
            return None;
        }
        let delay = self.config.interaction_release();
        self.release_at = Some(now.saturating_add(delay));
        Some(delay)
    }

    /// End the interaction if its release deadline has passed.
    pub fn release_due(&mut self, now: Duration) -> bool {
        match self.release_at {
            Some(at) if now >= at => {
                self.release_at = None;
                self.interacting = false;
                self.reconcile();
                true
            }
            _ => false,
        }
    }

    /// Record a measured dock row height (CSS pixels).
    pub fn dock_measured(&mut self, height: f64) {
        self.space.measured(height);
        self.reconcile();
    }

    // --- derivation --------------------------------------------------------

    /// Reconcile only if the store changed since the last reconcile.
    pub fn refresh(&mut self) -> bool {
        if self.watch.dirty.get() {
            self.reconcile()
        } else {
            false
        }
    }

    /// Re-derive every verdict, publish side effects, and report whether
    /// the render plan changed.
    pub fn reconcile(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let _span = trace_span!("dock.reconcile", revision = self.revision).entered();
        self.watch.dirty.set(false);

        if self.store.take_close_nav_request() {
            self.nav_expanded = false;
        }

        let nav = self.store.active_nav();
        let cta = self.store.active_cta();
        let show = self.show_dock();
        let manual = self.is_manually_suspended();
        let auto = self.is_auto_suspended();

        if self.nav_expanded && (!show || nav.is_none() || cta.is_none() || !self.nav_may_stay_open())
        {
            debug!(show, manual, auto, "dock nav panel closed by state change");
            self.nav_expanded = false;
        }
        if !self.collapse_enabled() && self.collapse.reset() {
            debug!("dock collapse reset to expanded");
        }
        if (manual, auto) != self.last_suspension {
            debug!(manual, auto, "dock suspension changed");
            self.last_suspension = (manual, auto);
        }

        let suspended = manual || auto;
        let occupying = show && !suspended && !self.collapse.state().is_collapsed();
        self.space.publish(&mut self.sink, occupying);
        let status = DockStatus {
            ready: self.ready,
            is_mobile: self.viewport.is_mobile(),
            is_suspended: suspended,
        };
        self.quietly(|store| store.publish_status(status));
        // Status publication notifies our own subscription.
        self.watch.dirty.set(false);

        let key = PlanKey {
            show,
            collapsed: self.collapse.state().is_collapsed(),
            suspended,
            nav_expanded: self.nav_expanded,
            nav: nav.map(|e| (e.id, e.updated_at)),
            cta: cta.map(|e| (e.id, e.updated_at)),
            reduced_motion: self.reduced_motion,
        };
        if self.last_plan.as_ref() == Some(&key) {
            return false;
        }
        if self.last_plan.as_ref().map(|p| (&p.nav, &p.cta)) != Some((&key.nav, &key.cta)) {
            debug!(nav = ?key.nav, cta = ?key.cta, "dock active selection changed");
        }
        self.last_plan = Some(key);
        self.revision += 1;
        true
    }

    /// Render plan for the current state.
    #[must_use]
    pub fn composition(&self) -> CompositionPlan<W> {
        let nav = self.store.active_nav();
        let cta = self.store.active_cta();
        let show = self.show_dock();
        let both = nav.is_some() && cta.is_some();

        let nav_slot = match (&nav, &cta) {
            (Some(nav), None) if show => Some(NavSlot::Inline(nav.inline_widget().clone())),
            (Some(nav), Some(_)) if show && self.nav_expanded => {
                Some(NavSlot::Panel(nav.render_full.clone()))
            }
            _ => None,
        };

        CompositionPlan {
            visible: show,
            collapsed: self.collapse.state().is_collapsed(),
            suspended: self.is_suspended(),
            nav_expanded: self.nav_expanded,
            backdrop: show && both && self.nav_expanded,
            cta: cta.filter(|_| show).map(|entry| entry.render),
            toggle: show && both,
            nav: nav_slot,
            motion: MotionTimings::for_preference(&self.config, self.reduced_motion),
        }
    }

    // --- teardown ------------------------------------------------------------

    /// Stop reacting: drop the store subscription, cancel pending frames and
    /// the release timer, and zero both published properties.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.store_sub = None;
        self.clear_refresh_hook();
        self.scroll_frame.cancel();
        self.viewport_frame.cancel();
        self.focus_frame.cancel();
        self.release_at = None;
        self.interacting = false;
        self.nav_expanded = false;
        self.ready = false;
        self.text_input.clear();
        self.collapse.reset();
        self.space.publish(&mut self.sink, false);
        self.inset.publish(&mut self.sink, 0);
        let status = DockStatus {
            ready: false,
            is_mobile: self.viewport.is_mobile(),
            is_suspended: false,
        };
        self.quietly(|store| store.publish_status(status));
        self.torn_down = true;
        debug!("dock controller torn down");
    }

    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DOCK_SPACE_PROPERTY;
    use crate::space::RecordingStyleSink;
    use pretty_assertions::assert_eq;

    type Controller = DockController<&'static str, RecordingStyleSink>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn mobile_controller() -> Controller {
        let mut c = DockController::new(DockStore::new(), RecordingStyleSink::new());
        c.media_changed(true);
        c.mark_ready();
        c
    }

    /// Drive one scroll frame.
    fn scroll(c: &mut Controller, t: u64, y: f64) {
        let _ = c.scroll_event();
        c.scroll_frame(ms(t), y);
    }

    fn collapse(c: &mut Controller) {
        scroll(c, 0, 300.0);
        scroll(c, 16, 360.0);
    }

    #[test]
    fn hidden_until_ready_and_mobile() {
        let mut c: Controller = DockController::new(DockStore::new(), RecordingStyleSink::new());
        c.upsert_cta("chat", CtaPayload::new("send"));
        assert!(!c.show_dock());

        c.mark_ready();
        assert!(!c.show_dock(), "not classified as mobile yet");

        c.media_changed(true);
        assert!(c.show_dock());
    }

    #[test]
    fn initial_properties_are_zeroed() {
        let c: Controller = DockController::new(DockStore::new(), RecordingStyleSink::new());
        assert_eq!(c.sink().value(DOCK_SPACE_PROPERTY), Some("0px"));
        assert_eq!(c.sink().value(VIEWPORT_BOTTOM_OFFSET_PROPERTY), Some("0px"));
    }

    #[test]
    fn store_mutations_from_other_handles_mark_dirty() {
        let mut c = mobile_controller();
        let handle = c.store().clone();
        handle.upsert_cta("chat", CtaPayload::new("send"));

        assert!(c.refresh());
        assert!(!c.refresh());
        assert!(handle.is_mobile());
        assert!(handle.ready());
    }

    #[test]
    fn refresh_hook_ignores_own_calls_and_teardown() {
        let mut c = mobile_controller();
        let wakes = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&wakes);
        c.set_refresh_hook(move || counter.set(counter.get() + 1));

        c.upsert_cta("chat", CtaPayload::new("send"));
        c.set_suspended("sheet", true, SuspendOptions::default());
        c.close_nav();
        assert_eq!(wakes.get(), 0);

        let handle = c.store().clone();
        handle.close_nav();
        assert_eq!(wakes.get(), 1);
        assert!(c.needs_refresh());
        c.refresh();

        c.teardown();
        handle.remove_cta("chat");
        assert_eq!(wakes.get(), 1);
        assert!(!c.needs_refresh());
    }

    #[test]
    fn collapse_gated_while_nav_expanded() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        c.upsert_nav("menu", NavPayload::new("menu-full"));
        assert!(c.toggle_nav());

        collapse(&mut c);
        assert!(!c.is_collapsed());
        assert!(c.is_nav_expanded());
    }

    #[test]
    fn opening_nav_resets_collapse() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        c.upsert_nav("menu", NavPayload::new("menu-full"));
        collapse(&mut c);
        assert!(c.is_collapsed());

        assert!(c.toggle_nav());
        assert!(!c.is_collapsed());
    }

    #[test]
    fn pointer_interaction_blocks_collapse_until_released() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        c.pointer_down();
        collapse(&mut c);
        assert!(!c.is_collapsed());

        let delay = c.pointer_up(ms(100)).expect("interaction in progress");
        assert_eq!(delay, ms(240));
        assert!(!c.release_due(ms(200)));
        assert!(c.is_interacting());
        assert!(c.release_due(ms(340)));
        assert!(!c.is_interacting());

        scroll(&mut c, 400, 300.0);
        scroll(&mut c, 416, 360.0);
        assert!(c.is_collapsed());
    }

    #[test]
    fn pointer_up_reschedules_release() {
        let mut c = mobile_controller();
        c.pointer_down();
        c.pointer_up(ms(0));
        c.pointer_up(ms(200));
        assert!(!c.release_due(ms(300)), "first deadline was replaced");
        assert!(c.release_due(ms(440)));
        assert_eq!(c.pointer_up(ms(500)), None);
    }

    #[test]
    fn pointer_down_cancels_pending_release() {
        let mut c = mobile_controller();
        c.pointer_down();
        c.pointer_up(ms(0));
        c.pointer_down();
        assert!(!c.release_due(ms(1_000)));
        assert!(c.is_interacting());
    }

    #[test]
    fn space_follows_collapse_and_suspension() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        c.dock_measured(72.0);
        assert_eq!(c.reserved_space(), Some(72));

        collapse(&mut c);
        assert_eq!(c.reserved_space(), Some(0));

        scroll(&mut c, 400, 10.0);
        assert_eq!(c.reserved_space(), Some(72));

        c.set_suspended("modal", true, SuspendOptions::default());
        assert_eq!(c.reserved_space(), Some(0));
        assert_eq!(c.sink().value(DOCK_SPACE_PROPERTY), Some("0px"));
    }

    #[test]
    fn suspension_drops_collapse_history() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        collapse(&mut c);
        c.set_suspended("sheet", true, SuspendOptions::default());
        assert!(!c.is_collapsed());
        c.clear_suspended("sheet");
        assert!(!c.is_collapsed());
    }

    #[test]
    fn keyboard_inset_published_and_suspends() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        let _ = c.viewport_event();
        c.viewport_frame(Some(ViewportMetrics {
            window_height: 800.0,
            viewport_height: 460.0,
            offset_top: 0.0,
        }));
        assert_eq!(c.bottom_offset(), 340);
        assert_eq!(
            c.sink().value(VIEWPORT_BOTTOM_OFFSET_PROPERTY),
            Some("340px")
        );
        assert!(c.is_keyboard_visible());
        assert!(c.is_suspended());
        assert!(c.store().is_suspended());
    }

    #[test]
    fn leaving_mobile_clears_keyboard_flag() {
        let mut c = mobile_controller();
        let _ = c.viewport_event();
        c.viewport_frame(Some(ViewportMetrics {
            window_height: 800.0,
            viewport_height: 400.0,
            offset_top: 0.0,
        }));
        assert!(c.is_keyboard_visible());
        c.media_changed(false);
        assert!(!c.is_keyboard_visible());
    }

    #[test]
    fn viewport_frame_without_request_is_skipped() {
        let mut c = mobile_controller();
        c.viewport_frame(Some(ViewportMetrics {
            window_height: 800.0,
            viewport_height: 400.0,
            offset_top: 0.0,
        }));
        assert_eq!(c.bottom_offset(), 0);
    }

    #[test]
    fn revision_tracks_plan_changes() {
        let mut c = mobile_controller();
        let before = c.revision();
        c.upsert_cta("chat", CtaPayload::new("send"));
        assert!(c.revision() > before);

        let before = c.revision();
        c.remove_nav("missing");
        assert_eq!(c.revision(), before);
    }

    #[test]
    fn reduced_motion_shortens_timings() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        assert_eq!(c.composition().motion.enter, ms(220));
        c.set_reduced_motion(true);
        let plan = c.composition();
        assert_eq!(plan.motion.enter, ms(1));
        assert!(plan.motion.reduced);
    }

    #[test]
    fn teardown_zeroes_properties_and_ignores_store() {
        let mut c = mobile_controller();
        c.upsert_cta("chat", CtaPayload::new("send"));
        c.dock_measured(64.0);
        c.focus_in(&FocusTarget::TextArea);
        let handle = c.store().clone();
        c.teardown();
        assert!(!c.is_text_input_active());

        assert_eq!(c.sink().value(DOCK_SPACE_PROPERTY), Some("0px"));
        assert!(!handle.ready());
        // The final status publication pruned the controller's dead callback.
        assert_eq!(handle.subscriber_count(), 0);
        handle.upsert_nav("late", NavPayload::new("x"));
        assert!(!c.refresh());
        assert!(c.is_torn_down());
    }
}
