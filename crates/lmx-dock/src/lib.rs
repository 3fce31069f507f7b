#![forbid(unsafe_code)]

//! `lmx-dock` coordinates the adaptive mobile bottom dock.
//!
//! Many unrelated page regions want the floating bottom bar: a listing
//! wizard's primary button, a chat composer's send action, the site menu.
//! None of them know about each other. They register descriptors in a
//! shared [`DockStore`]; the [`DockController`] picks one navigation widget
//! and one call-to-action, and decides every frame whether the dock is
//! shown, collapsed out of the way of scrolling, or suspended because a
//! text field or the virtual keyboard needs the space.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes scroll, focus,
//!   viewport and pointer signals and answers animation-frame requests.
//! - **Deterministic time**: the host supplies monotonic timestamps.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The `lmx-dock-web` crate wraps this with DOM listeners and a JS API.

pub mod collapse;
pub mod composition;
pub mod config;
pub mod controller;
pub mod entry;
pub mod frame;
pub mod selection;
pub mod space;
pub mod store;
pub mod suspend;
pub mod viewport;

pub use collapse::{CollapseConfig, CollapseDetector, CollapseState, CollapseTransition};
pub use composition::{CompositionPlan, MotionTimings, NavSlot};
pub use config::{
    ConfigError, DOCK_SPACE_PROPERTY, DockConfig, VIEWPORT_BOTTOM_OFFSET_PROPERTY,
};
pub use controller::DockController;
pub use entry::{
    Candidate, CtaEntry, CtaPayload, NavEntry, NavPayload, SuspendEntry, SuspendOptions,
};
pub use frame::{FrameCoalescer, FrameRequest};
pub use selection::select_active;
pub use space::{RecordingStyleSink, StyleSink};
pub use store::{DockStatus, DockStore, StoreChange, Subscription};
pub use suspend::{FocusTarget, ViewportMetrics};
pub use viewport::ViewportClassifier;
