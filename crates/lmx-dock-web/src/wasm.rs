#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for [`AdaptiveDock`].
//!
//! Wires browser signals into [`lmx_dock::DockController`]. Every browser
//! capability is probed once at construction; missing ones fall back to a
//! no-op variant so the controller never branches on capability:
//!
//! - `matchMedia` → width fallback from `innerWidth` on `resize`;
//! - `visualViewport` → `ViewportInsetSource::Absent` (inset `0`);
//! - `ResizeObserver` → `HeightTracker::OneShot` (measure once after each
//!   composition change);
//! - `requestAnimationFrame` → the frame work runs synchronously.
//!
//! Only compiled on `wasm32` targets.

use core::time::Duration;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Object, Reflect};
use lmx_dock::{
    CompositionPlan, CtaPayload, DockConfig, DockController, DockStore, FocusTarget, NavPayload,
    NavSlot, StyleSink, SuspendOptions, ViewportMetrics,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CssStyleDeclaration, Element, Event, EventTarget, HtmlElement,
    MediaQueryList, ResizeObserver, VisualViewport, Window,
};

use crate::input::HostEvent;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type Controller = DockController<Function, DocumentRootStyle>;

/// `console.error(msg)`, if the global has a console.
fn console_error(msg: &str) {
    let global = js_sys::global();
    let error = Reflect::get(&global, &JsValue::from_str("console"))
        .and_then(|console| {
            let error = Reflect::get(&console, &JsValue::from_str("error"))?;
            Ok((console, error))
        })
        .ok()
        .and_then(|(console, error)| Some((console, error.dyn_into::<Function>().ok()?)));
    if let Some((console, error)) = error {
        let _ = error.call1(&console, &JsValue::from_str(msg));
    }
}

/// Route Rust panics to `console.error` once per module instance.
fn install_panic_hook() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let at = info.location().map_or_else(String::new, |loc| {
                format!(" at {}:{}", loc.file(), loc.line())
            });
            console_error(&format!("adaptive dock panicked{at}: {info}"));
        }));
    });
}

fn set_field(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

// ---------------------------------------------------------------------------
// Payload field helpers
// ---------------------------------------------------------------------------

fn get_field(obj: &JsValue, key: &str) -> Result<Option<JsValue>, JsValue> {
    if obj.is_null() || obj.is_undefined() {
        return Ok(None);
    }
    let v = Reflect::get(obj, &JsValue::from_str(key))?;
    if v.is_null() || v.is_undefined() {
        return Ok(None);
    }
    Ok(Some(v))
}

fn get_bool(obj: &JsValue, key: &str) -> Result<Option<bool>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            v.as_bool()
                .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a boolean")))
        })
        .transpose()
}

fn get_i32(obj: &JsValue, key: &str) -> Result<Option<i32>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            let n = v
                .as_f64()
                .ok_or_else(|| JsValue::from_str(&format!("field {key} must be a number")))?;
            if !n.is_finite() || n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX)
            {
                return Err(JsValue::from_str(&format!(
                    "field {key} must be an integer, got {n}"
                )));
            }
            Ok(n as i32)
        })
        .transpose()
}

fn get_function_opt(obj: &JsValue, key: &str) -> Result<Option<Function>, JsValue> {
    get_field(obj, key)?
        .map(|v| {
            v.dyn_into::<Function>()
                .map_err(|_| JsValue::from_str(&format!("field {key} must be a function")))
        })
        .transpose()
}

fn get_function(obj: &JsValue, key: &str) -> Result<Function, JsValue> {
    get_function_opt(obj, key)?
        .ok_or_else(|| JsValue::from_str(&format!("missing required function field: {key}")))
}

fn parse_nav_payload(payload: &JsValue) -> Result<NavPayload<Function>, JsValue> {
    let mut nav = NavPayload::new(get_function(payload, "renderFull")?);
    nav.render_compact = get_function_opt(payload, "renderCompact")?;
    if let Some(enabled) = get_bool(payload, "enabled")? {
        nav.enabled = enabled;
    }
    if let Some(priority) = get_i32(payload, "priority")? {
        nav.priority = priority;
    }
    Ok(nav)
}

fn parse_cta_payload(payload: &JsValue) -> Result<CtaPayload<Function>, JsValue> {
    let mut cta = CtaPayload::new(get_function(payload, "render")?);
    if let Some(enabled) = get_bool(payload, "enabled")? {
        cta.enabled = enabled;
    }
    if let Some(priority) = get_i32(payload, "priority")? {
        cta.priority = priority;
    }
    Ok(cta)
}

fn plan_to_js(plan: &CompositionPlan<Function>) -> JsValue {
    let obj = Object::new();
    set_field(&obj, "visible", JsValue::from_bool(plan.visible));
    set_field(&obj, "collapsed", JsValue::from_bool(plan.collapsed));
    set_field(&obj, "suspended", JsValue::from_bool(plan.suspended));
    set_field(&obj, "navExpanded", JsValue::from_bool(plan.nav_expanded));
    set_field(&obj, "backdrop", JsValue::from_bool(plan.backdrop));
    set_field(&obj, "toggle", JsValue::from_bool(plan.toggle));
    set_field(
        &obj,
        "cta",
        plan.cta.as_ref().map_or(JsValue::NULL, |f| f.clone().into()),
    );
    let nav = match &plan.nav {
        Some(slot) => {
            let (mode, render) = match slot {
                NavSlot::Inline(f) => ("inline", f),
                NavSlot::Panel(f) => ("panel", f),
            };
            let nav = Object::new();
            set_field(&nav, "mode", JsValue::from_str(mode));
            set_field(&nav, "render", render.clone().into());
            nav.into()
        }
        None => JsValue::NULL,
    };
    set_field(&obj, "nav", nav);
    let motion = &plan.motion;
    set_field(
        &obj,
        "enterMs",
        JsValue::from_f64(motion.enter.as_secs_f64() * 1_000.0),
    );
    set_field(
        &obj,
        "exitMs",
        JsValue::from_f64(motion.exit.as_secs_f64() * 1_000.0),
    );
    set_field(&obj, "reducedMotion", JsValue::from_bool(motion.reduced));
    obj.into()
}

// ---------------------------------------------------------------------------
// Browser adapters
// ---------------------------------------------------------------------------

/// `document.documentElement.style`.
pub struct DocumentRootStyle {
    style: Option<CssStyleDeclaration>,
}

impl DocumentRootStyle {
    fn from_window(window: &Window) -> Self {
        let style = window
            .document()
            .and_then(|doc| doc.document_element())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .map(|el| el.style());
        Self { style }
    }
}

impl StyleSink for DocumentRootStyle {
    fn set_property(&mut self, name: &str, value: &str) {
        if let Some(style) = &self.style {
            let _ = style.set_property(name, value);
        }
    }
}

/// Where keyboard-inset readings come from.
enum ViewportInsetSource {
    Visual(VisualViewport),
    Absent,
}

impl ViewportInsetSource {
    fn probe(window: &Window) -> Self {
        window
            .visual_viewport()
            .map_or(Self::Absent, Self::Visual)
    }

    fn metrics(&self, window: &Window) -> Option<ViewportMetrics> {
        let Self::Visual(vv) = self else {
            return None;
        };
        let window_height = window.inner_height().ok()?.as_f64()?;
        Some(ViewportMetrics {
            window_height,
            viewport_height: vv.height(),
            offset_top: vv.offset_top(),
        })
    }
}

/// How the dock row height is kept current.
enum HeightTracker {
    Observer(ResizeObserver),
    OneShot,
}

fn has_global(window: &Window, name: &str) -> bool {
    Reflect::has(window, &JsValue::from_str(name)).unwrap_or(false)
}

fn measure(element: Option<&HtmlElement>) -> Option<f64> {
    element.map(|el| el.get_bounding_client_rect().height())
}

fn now(window: &Window) -> Duration {
    let ms = window.performance().map_or(0.0, |p| p.now());
    crate::input::duration_from_ms(ms).unwrap_or_default()
}

fn classify_element(el: &Element) -> FocusTarget {
    let editable = el
        .dyn_ref::<HtmlElement>()
        .is_some_and(HtmlElement::is_content_editable);
    let kind = el.get_attribute("type");
    FocusTarget::classify(&el.tag_name(), kind.as_deref(), editable)
}

/// One `requestAnimationFrame` slot: at most one pending callback.
struct NextFrame {
    callback: Closure<dyn FnMut(f64)>,
    handle: Option<i32>,
}

impl NextFrame {
    fn new(callback: Closure<dyn FnMut(f64)>) -> Self {
        Self {
            callback,
            handle: None,
        }
    }

    /// Returns `false` if the frame could not be scheduled; the caller must
    /// then do the work itself.
    fn schedule(&mut self, window: &Window) -> bool {
        if self.handle.is_some() {
            return true;
        }
        match window.request_animation_frame(self.callback.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(_) => false,
        }
    }

    fn fired(&mut self) {
        self.handle = None;
    }

    fn cancel(&mut self, window: &Window) {
        if let Some(handle) = self.handle.take() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

/// An attached DOM listener, detached on teardown.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Frames {
    scroll: NextFrame,
    viewport: NextFrame,
    focus: NextFrame,
    measure: NextFrame,
    refresh: NextFrame,
}

struct Shared {
    window: Window,
    controller: Controller,
    dock_element: Option<HtmlElement>,
    inset: ViewportInsetSource,
    height: HeightTracker,
    media: Option<MediaQueryList>,
    frames: Frames,
    release_callback: Closure<dyn FnMut()>,
    release_timer: Option<i32>,
    resize_callback: Option<Closure<dyn FnMut(js_sys::Array)>>,
    listeners: Vec<Listener>,
    subscribers: Vec<(u32, Function)>,
    next_subscriber: u32,
    notified_revision: u64,
}

/// Work to run once the shared borrow is released.
#[must_use]
struct Notify(Vec<Function>);

impl Notify {
    fn run(self) {
        for callback in self.0 {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                console_error(&format!("dock subscriber threw: {err:?}"));
            }
        }
    }
}

impl Shared {
    /// Compare revisions and collect JS subscribers to call.
    fn after_change(&mut self) -> Notify {
        if self.controller.revision() == self.notified_revision {
            return Notify(Vec::new());
        }
        self.notified_revision = self.controller.revision();
        if matches!(self.height, HeightTracker::OneShot)
            && !self.frames.measure.schedule(&self.window)
        {
            self.measure_now();
        }
        Notify(self.subscribers.iter().map(|(_, f)| f.clone()).collect())
    }

    fn measure_now(&mut self) {
        if let Some(height) = measure(self.dock_element.as_ref()) {
            self.controller.dock_measured(height);
        }
    }

    fn run_scroll_frame(&mut self, now: Duration) {
        let y = self.window.scroll_y().unwrap_or(0.0);
        self.controller.scroll_frame(now, y);
    }

    fn run_viewport_frame(&mut self) {
        let metrics = self.inset.metrics(&self.window);
        self.controller.viewport_frame(metrics);
    }

    fn run_focus_frame(&mut self) {
        let active = self
            .window
            .document()
            .and_then(|doc| doc.active_element())
            .map(|el| classify_element(&el));
        self.controller.focus_frame(active.as_ref());
    }

    fn schedule_release(&mut self, delay: Duration) {
        self.clear_release();
        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.release_callback.as_ref().unchecked_ref(),
                ms,
            ) {
            Ok(handle) => self.release_timer = Some(handle),
            Err(_) => {
                let at = now(&self.window).saturating_add(delay);
                self.controller.release_due(at);
            }
        }
    }

    fn clear_release(&mut self) {
        if let Some(handle) = self.release_timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn teardown(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let HeightTracker::Observer(observer) = &self.height {
            observer.disconnect();
        }
        self.height = HeightTracker::OneShot;
        self.resize_callback = None;
        let window = self.window.clone();
        self.frames.scroll.cancel(&window);
        self.frames.viewport.cancel(&window);
        self.frames.focus.cancel(&window);
        self.frames.measure.cancel(&window);
        self.frames.refresh.cancel(&window);
        self.clear_release();
        self.subscribers.clear();
        self.controller.teardown();
        tracing::debug!("adaptive dock destroyed");
    }
}

/// Run `f` against the shared state if it still exists, then notify.
fn with_shared(weak: &Weak<RefCell<Shared>>, f: impl FnOnce(&mut Shared)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let notify = {
        let Ok(mut state) = shared.try_borrow_mut() else {
            console_error("adaptive dock: re-entrant browser callback ignored");
            return;
        };
        if state.controller.is_torn_down() {
            return;
        }
        f(&mut state);
        state.after_change()
    };
    notify.run();
}

fn frame_callback(
    weak: &Weak<RefCell<Shared>>,
    run: fn(&mut Shared, Duration),
    slot: fn(&mut Frames) -> &mut NextFrame,
) -> Closure<dyn FnMut(f64)> {
    let weak = weak.clone();
    Closure::new(move |timestamp: f64| {
        with_shared(&weak, |state| {
            slot(&mut state.frames).fired();
            let now = crate::input::duration_from_ms(timestamp).unwrap_or_default();
            run(state, now);
        });
    })
}

/// Store changes from other handles: refresh on the next frame.
fn refresh_hook(weak: &Weak<RefCell<Shared>>) -> impl Fn() + 'static {
    let weak = weak.clone();
    move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let notify = {
            let Ok(mut state) = shared.try_borrow_mut() else {
                return;
            };
            let window = state.window.clone();
            if state.frames.refresh.schedule(&window) {
                return;
            }
            state.controller.refresh();
            state.after_change()
        };
        notify.run();
    }
}

fn listen(
    listeners: &mut Vec<Listener>,
    target: &EventTarget,
    kind: &'static str,
    passive: bool,
    callback: Closure<dyn FnMut(Event)>,
) {
    let result = if passive {
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )
    } else {
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
    };
    if result.is_err() {
        console_error(&format!("adaptive dock: could not listen for {kind}"));
        return;
    }
    listeners.push(Listener {
        target: target.clone(),
        kind,
        callback,
    });
}

fn event_callback(
    weak: &Weak<RefCell<Shared>>,
    f: impl Fn(&mut Shared, &Event) + 'static,
) -> Closure<dyn FnMut(Event)> {
    let weak = weak.clone();
    Closure::new(move |event: Event| with_shared(&weak, |state| f(state, &event)))
}

// ---------------------------------------------------------------------------
// JS API
// ---------------------------------------------------------------------------

/// The adaptive mobile bottom dock, bound to the current window.
#[wasm_bindgen]
pub struct AdaptiveDock {
    shared: Rc<RefCell<Shared>>,
}

#[wasm_bindgen]
impl AdaptiveDock {
    /// Wire the dock. `dock_element` is the dock row (measured and watched
    /// for pointer interaction); `config_json` optionally overrides
    /// thresholds.
    #[wasm_bindgen(constructor)]
    pub fn new(
        dock_element: Option<HtmlElement>,
        config_json: Option<String>,
    ) -> Result<AdaptiveDock, JsValue> {
        install_panic_hook();
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let config = match config_json.as_deref() {
            Some(json) => {
                DockConfig::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => DockConfig::default(),
        };

        let sink = DocumentRootStyle::from_window(&window);
        let shared = Rc::new_cyclic(|weak: &Weak<RefCell<Shared>>| {
            let release_weak = weak.clone();
            let release_callback = Closure::new(move || {
                with_shared(&release_weak, |state| {
                    state.release_timer = None;
                    let at = now(&state.window);
                    state.controller.release_due(at);
                });
            });
            let mut controller = DockController::with_config(config, DockStore::new(), sink);
            controller.set_refresh_hook(refresh_hook(weak));
            RefCell::new(Shared {
                controller,
                inset: ViewportInsetSource::probe(&window),
                height: HeightTracker::OneShot,
                media: None,
                frames: Frames {
                    scroll: NextFrame::new(frame_callback(
                        weak,
                        Shared::run_scroll_frame,
                        |f| &mut f.scroll,
                    )),
                    viewport: NextFrame::new(frame_callback(
                        weak,
                        |s, _| s.run_viewport_frame(),
                        |f| &mut f.viewport,
                    )),
                    focus: NextFrame::new(frame_callback(
                        weak,
                        |s, _| s.run_focus_frame(),
                        |f| &mut f.focus,
                    )),
                    measure: NextFrame::new(frame_callback(
                        weak,
                        |s, _| s.measure_now(),
                        |f| &mut f.measure,
                    )),
                    refresh: NextFrame::new(frame_callback(
                        weak,
                        |s, _| {
                            s.controller.refresh();
                        },
                        |f| &mut f.refresh,
                    )),
                },
                release_callback,
                release_timer: None,
                resize_callback: None,
                listeners: Vec::new(),
                subscribers: Vec::new(),
                next_subscriber: 0,
                notified_revision: 0,
                dock_element,
                window,
            })
        });

        Self::wire(&shared);
        Ok(Self { shared })
    }

    #[wasm_bindgen(js_name = upsertNav)]
    pub fn upsert_nav(&self, id: &str, payload: JsValue) -> Result<(), JsValue> {
        let payload = parse_nav_payload(&payload)?;
        self.update(|s| s.controller.upsert_nav(id, payload));
        Ok(())
    }

    #[wasm_bindgen(js_name = removeNav)]
    pub fn remove_nav(&self, id: &str) {
        self.update(|s| s.controller.remove_nav(id));
    }

    #[wasm_bindgen(js_name = upsertCta)]
    pub fn upsert_cta(&self, id: &str, payload: JsValue) -> Result<(), JsValue> {
        let payload = parse_cta_payload(&payload)?;
        self.update(|s| s.controller.upsert_cta(id, payload));
        Ok(())
    }

    #[wasm_bindgen(js_name = removeCta)]
    pub fn remove_cta(&self, id: &str) {
        self.update(|s| s.controller.remove_cta(id));
    }

    /// `options` may carry `{ keepNavOpen: true }`.
    #[wasm_bindgen(js_name = setSuspended)]
    pub fn set_suspended(&self, id: &str, suspended: bool, options: JsValue) -> Result<(), JsValue> {
        let options = SuspendOptions {
            keep_nav_open: get_bool(&options, "keepNavOpen")?.unwrap_or(false),
        };
        self.update(|s| s.controller.set_suspended(id, suspended, options));
        Ok(())
    }

    #[wasm_bindgen(js_name = clearSuspended)]
    pub fn clear_suspended(&self, id: &str) {
        self.update(|s| s.controller.clear_suspended(id));
    }

    #[wasm_bindgen(js_name = closeNav)]
    pub fn close_nav(&self) {
        self.update(|s| s.controller.close_nav());
    }

    /// Flip the nav panel; returns whether it is now expanded.
    #[wasm_bindgen(js_name = toggleNav)]
    pub fn toggle_nav(&self) -> bool {
        self.update(|s| s.controller.toggle_nav())
    }

    pub fn ready(&self) -> bool {
        self.shared.borrow().controller.is_ready()
    }

    #[wasm_bindgen(js_name = isMobile)]
    pub fn is_mobile(&self) -> bool {
        self.shared.borrow().controller.is_mobile()
    }

    #[wasm_bindgen(js_name = isSuspended)]
    pub fn is_suspended(&self) -> bool {
        self.shared.borrow().controller.is_suspended()
    }

    #[wasm_bindgen(js_name = isCollapsed)]
    pub fn is_collapsed(&self) -> bool {
        self.shared.borrow().controller.is_collapsed()
    }

    #[wasm_bindgen(js_name = isNavExpanded)]
    pub fn is_nav_expanded(&self) -> bool {
        self.shared.borrow().controller.is_nav_expanded()
    }

    /// Render plan:
    /// `{ visible, collapsed, suspended, navExpanded, backdrop, toggle, cta,
    /// nav: { mode, render } | null, enterMs, exitMs, reducedMotion }`.
    pub fn composition(&self) -> JsValue {
        plan_to_js(&self.shared.borrow().controller.composition())
    }

    /// Bumped whenever the render plan changes.
    pub fn revision(&self) -> f64 {
        self.shared.borrow().controller.revision() as f64
    }

    /// Call `callback` (no arguments) after every render-plan change.
    /// Returns an id for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&self, callback: Function) -> u32 {
        let mut state = self.shared.borrow_mut();
        let id = state.next_subscriber;
        state.next_subscriber = state.next_subscriber.wrapping_add(1);
        state.subscribers.push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: u32) -> bool {
        let mut state = self.shared.borrow_mut();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sub, _)| *sub != id);
        state.subscribers.len() != before
    }

    /// Push one JSON-encoded [`HostEvent`]. Returns whether the render plan
    /// changed.
    #[wasm_bindgen(js_name = pushEncodedEvent)]
    pub fn push_encoded_event(&self, json: &str) -> Result<bool, JsValue> {
        let event = HostEvent::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.update(|s| {
            let dispatch = event
                .apply(&mut s.controller)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            if let Some(delay) = dispatch.release_after {
                s.schedule_release(delay);
            }
            Ok(dispatch.plan_changed)
        })
    }

    /// Remove every listener, cancel pending frames and timers, and zero the
    /// published CSS properties.
    pub fn destroy(&self) {
        if let Ok(mut state) = self.shared.try_borrow_mut() {
            if !state.controller.is_torn_down() {
                state.teardown();
            }
        }
    }
}

impl AdaptiveDock {
    fn wire(shared: &Rc<RefCell<Shared>>) {
        let weak = Rc::downgrade(shared);
        let mut state = shared.borrow_mut();
        let window = state.window.clone();
        let window_target: &EventTarget = window.as_ref();
        let mut listeners = Vec::new();

        // Viewport classification.
        let query = state.controller.config().mobile_query.clone();
        match window.match_media(&query) {
            Ok(Some(mql)) => {
                state.controller.media_changed(mql.matches());
                let watched = mql.clone();
                listen(
                    &mut listeners,
                    mql.as_ref(),
                    "change",
                    false,
                    event_callback(&weak, move |s, _| s.controller.media_changed(watched.matches())),
                );
                state.media = Some(mql);
            }
            _ => {
                if let Some(width) = window.inner_width().ok().and_then(|v| v.as_f64()) {
                    state.controller.width_changed(width);
                }
                listen(
                    &mut listeners,
                    window_target,
                    "resize",
                    true,
                    event_callback(&weak, |s, _| {
                        if let Some(width) = s.window.inner_width().ok().and_then(|v| v.as_f64()) {
                            s.controller.width_changed(width);
                        }
                    }),
                );
            }
        }
        if let Ok(Some(reduced)) = window.match_media(REDUCED_MOTION_QUERY) {
            state.controller.set_reduced_motion(reduced.matches());
            let watched = reduced.clone();
            listen(
                &mut listeners,
                reduced.as_ref(),
                "change",
                false,
                event_callback(&weak, move |s, _| {
                    s.controller.set_reduced_motion(watched.matches());
                }),
            );
        }

        // Scroll collapse.
        listen(
            &mut listeners,
            window_target,
            "scroll",
            true,
            event_callback(&weak, |s, _| {
                if s.controller.scroll_event().should_schedule()
                    && !s.frames.scroll.schedule(&s.window)
                {
                    let at = now(&s.window);
                    s.run_scroll_frame(at);
                }
            }),
        );

        // Keyboard inset.
        if let ViewportInsetSource::Visual(vv) = &state.inset {
            let vv_target: EventTarget = vv.clone().into();
            for kind in ["resize", "scroll"] {
                listen(
                    &mut listeners,
                    &vv_target,
                    kind,
                    true,
                    event_callback(&weak, |s, _| {
                        if s.controller.viewport_event().should_schedule()
                            && !s.frames.viewport.schedule(&s.window)
                        {
                            s.run_viewport_frame();
                        }
                    }),
                );
            }
        }
        let _ = state.controller.viewport_event();
        state.run_viewport_frame();

        // Text input focus.
        if let Some(document) = window.document() {
            let doc_target: &EventTarget = document.as_ref();
            listen(
                &mut listeners,
                doc_target,
                "focusin",
                false,
                event_callback(&weak, |s, event| {
                    if let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                        s.controller.focus_in(&classify_element(&el));
                    }
                }),
            );
            listen(
                &mut listeners,
                doc_target,
                "focusout",
                false,
                event_callback(&weak, |s, _| {
                    if s.controller.focus_out().should_schedule()
                        && !s.frames.focus.schedule(&s.window)
                    {
                        s.run_focus_frame();
                    }
                }),
            );
        }

        // Pointer interaction.
        if let Some(element) = state.dock_element.clone() {
            let element_target: &EventTarget = element.as_ref();
            listen(
                &mut listeners,
                element_target,
                "pointerdown",
                true,
                event_callback(&weak, |s, _| {
                    s.clear_release();
                    s.controller.pointer_down();
                }),
            );
            for kind in ["pointerup", "pointercancel"] {
                listen(
                    &mut listeners,
                    window_target,
                    kind,
                    true,
                    event_callback(&weak, |s, _| {
                        let at = now(&s.window);
                        if let Some(delay) = s.controller.pointer_up(at) {
                            s.schedule_release(delay);
                        }
                    }),
                );
            }

            // Dock height.
            if has_global(&window, "ResizeObserver") {
                let resize_weak = weak.clone();
                let callback: Closure<dyn FnMut(js_sys::Array)> =
                    Closure::new(move |_entries: js_sys::Array| {
                        with_shared(&resize_weak, Shared::measure_now);
                    });
                match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
                    Ok(observer) => {
                        observer.observe(&element);
                        state.height = HeightTracker::Observer(observer);
                        state.resize_callback = Some(callback);
                    }
                    Err(err) => console_error(&format!("ResizeObserver unavailable: {err:?}")),
                }
            }
            state.measure_now();
        }

        state.listeners = listeners;
        state.controller.mark_ready();
        tracing::debug!(
            media = state.media.is_some(),
            visual_viewport = matches!(state.inset, ViewportInsetSource::Visual(_)),
            resize_observer = matches!(state.height, HeightTracker::Observer(_)),
            "adaptive dock wired"
        );
        let notify = state.after_change();
        drop(state);
        notify.run();
    }

    /// Run `f` on the shared state and notify subscribers afterwards.
    fn update<T>(&self, f: impl FnOnce(&mut Shared) -> T) -> T {
        let (value, notify) = {
            let mut state = self.shared.borrow_mut();
            let value = f(&mut state);
            (value, state.after_change())
        };
        notify.run();
        value
    }
}

impl Drop for AdaptiveDock {
    fn drop(&mut self) {
        self.destroy();
    }
}
