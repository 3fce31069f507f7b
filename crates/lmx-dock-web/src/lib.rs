#![forbid(unsafe_code)]

//! Browser surface for the `lmx-dock` controller.
//!
//! [`AdaptiveDock`] (wasm32 only) is the JS-facing class: it installs the
//! DOM listeners, answers frame requests with `requestAnimationFrame`,
//! publishes the dock CSS variables on the document root and exposes the
//! registry API to page code. [`input`] is the JSON host-event schema for
//! hosts that drive the controller without DOM bindings.

pub mod input;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::AdaptiveDock;

pub use input::{Dispatch, FocusTargetJson, HostEvent, HostEventError, PointerPhase};
