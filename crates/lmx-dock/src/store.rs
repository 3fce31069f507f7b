#![forbid(unsafe_code)]

//! Shared registry store for dock entries and suspension requests.
//!
//! # Design
//!
//! [`DockStore<W>`] wraps the navigation, call-to-action and suspend
//! registries in shared, reference-counted storage (`Rc<RefCell<..>>`).
//! Cloning a store yields another handle to the **same** registries, so it
//! can be handed to independent UI trees without a global singleton.
//!
//! Every effective mutation bumps [`DockStore::version`] and notifies live
//! subscribers in registration order with a [`StoreChange`] describing
//! which registry moved.
//!
//! The store is also the collaborator-facing context: the controller
//! mirrors its derived [`DockStatus`] into it, and `close_nav()` requests
//! are parked here until the controller consumes them.
//!
//! # Invariants
//!
//! 1. Ids are unique per registry; `upsert_*` overwrites.
//! 2. Every upsert receives a stamp strictly larger than all earlier ones.
//! 3. Removing an unknown id is a no-op and does not notify.
//! 4. Blank ids are ignored.
//! 5. Callbacks run after the interior borrow is released, so they may
//!    read or mutate the store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::entry::{CtaEntry, CtaPayload, NavEntry, NavPayload, SuspendEntry, SuspendOptions};
use crate::selection::select_active;

type CallbackRc = Rc<dyn Fn(StoreChange)>;
type CallbackWeak = Weak<dyn Fn(StoreChange)>;

/// Which part of the store changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreChange {
    Nav,
    Cta,
    Suspend,
    CloseNav,
    Status,
}

/// Derived controller state mirrored for collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DockStatus {
    pub ready: bool,
    pub is_mobile: bool,
    pub is_suspended: bool,
}

struct StoreInner<W> {
    nav: HashMap<String, NavEntry<W>>,
    cta: HashMap<String, CtaEntry<W>>,
    suspends: HashMap<String, SuspendEntry>,
    status: DockStatus,
    close_nav_requested: bool,
    stamp: u64,
    version: u64,
    subscribers: Vec<CallbackWeak>,
}

impl<W> StoreInner<W> {
    fn next_stamp(&mut self) -> u64 {
        self.stamp += 1;
        self.stamp
    }
}

/// Shared dock registries with change notification.
pub struct DockStore<W> {
    inner: Rc<RefCell<StoreInner<W>>>,
}

impl<W> Clone for DockStore<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<W> std::fmt::Debug for DockStore<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("DockStore")
            .field("nav", &inner.nav.len())
            .field("cta", &inner.cta.len())
            .field("suspends", &inner.suspends.len())
            .field("status", &inner.status)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<W> Default for DockStore<W> {
    fn default() -> Self {
        Self::new()
    }
}

fn accept_id(id: &str, op: &'static str) -> bool {
    if id.trim().is_empty() {
        debug!(op, "ignoring dock registry call with blank id");
        return false;
    }
    true
}

impl<W> DockStore<W> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                nav: HashMap::new(),
                cta: HashMap::new(),
                suspends: HashMap::new(),
                status: DockStatus::default(),
                close_nav_requested: false,
                stamp: 0,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Create or overwrite the navigation entry for `id`.
    pub fn upsert_nav(&self, id: &str, payload: NavPayload<W>) {
        if !accept_id(id, "upsert_nav") {
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            let stamp = inner.next_stamp();
            inner
                .nav
                .insert(id.to_owned(), NavEntry::from_payload(id.to_owned(), payload, stamp));
            inner.version += 1;
        }
        self.notify(StoreChange::Nav);
    }

    /// Remove the navigation entry for `id`, if any.
    pub fn remove_nav(&self, id: &str) {
        let removed = self.inner.borrow_mut().nav.remove(id).is_some();
        if removed {
            self.inner.borrow_mut().version += 1;
            self.notify(StoreChange::Nav);
        }
    }

    /// Create or overwrite the call-to-action entry for `id`.
    pub fn upsert_cta(&self, id: &str, payload: CtaPayload<W>) {
        if !accept_id(id, "upsert_cta") {
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            let stamp = inner.next_stamp();
            inner
                .cta
                .insert(id.to_owned(), CtaEntry::from_payload(id.to_owned(), payload, stamp));
            inner.version += 1;
        }
        self.notify(StoreChange::Cta);
    }

    /// Remove the call-to-action entry for `id`, if any.
    pub fn remove_cta(&self, id: &str) {
        let removed = self.inner.borrow_mut().cta.remove(id).is_some();
        if removed {
            self.inner.borrow_mut().version += 1;
            self.notify(StoreChange::Cta);
        }
    }

    /// Add (`suspended = true`) or clear a manual suspension request.
    pub fn set_suspended(&self, id: &str, suspended: bool, options: SuspendOptions) {
        if !accept_id(id, "set_suspended") {
            return;
        }
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if suspended {
                let at = inner.next_stamp();
                inner.suspends.insert(
                    id.to_owned(),
                    SuspendEntry {
                        id: id.to_owned(),
                        at,
                        keep_nav_open: options.keep_nav_open,
                    },
                );
                true
            } else {
                inner.suspends.remove(id).is_some()
            }
        };
        if changed {
            self.inner.borrow_mut().version += 1;
            self.notify(StoreChange::Suspend);
        }
    }

    /// Equivalent to `set_suspended(id, false, SuspendOptions::default())`.
    pub fn clear_suspended(&self, id: &str) {
        self.set_suspended(id, false, SuspendOptions::default());
    }

    /// Ask the controller to collapse the navigation panel.
    pub fn close_nav(&self) {
        self.inner.borrow_mut().close_nav_requested = true;
        self.notify(StoreChange::CloseNav);
    }

    pub(crate) fn take_close_nav_request(&self) -> bool {
        std::mem::take(&mut self.inner.borrow_mut().close_nav_requested)
    }

    pub(crate) fn publish_status(&self, status: DockStatus) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.status == status {
                return;
            }
            inner.status = status;
        }
        self.notify(StoreChange::Status);
    }

    /// Last status published by the controller.
    #[must_use]
    pub fn status(&self) -> DockStatus {
        self.inner.borrow().status
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.status().ready
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.status().is_mobile
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.status().is_suspended
    }

    /// Whether any manual suspension request is active.
    #[must_use]
    pub fn is_manually_suspended(&self) -> bool {
        !self.inner.borrow().suspends.is_empty()
    }

    /// Whether some active suspension request lets the nav panel stay open.
    #[must_use]
    pub fn keep_nav_open(&self) -> bool {
        self.inner
            .borrow()
            .suspends
            .values()
            .any(|entry| entry.keep_nav_open)
    }

    /// Active suspension requests, oldest first.
    #[must_use]
    pub fn suspend_entries(&self) -> Vec<SuspendEntry> {
        let mut entries: Vec<SuspendEntry> =
            self.inner.borrow().suspends.values().cloned().collect();
        entries.sort_by_key(|entry| entry.at);
        entries
    }

    /// Number of effective mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Subscribe to store changes.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes the callback.
    pub fn subscribe(&self, callback: impl Fn(StoreChange) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self, change: StoreChange) {
        let callbacks: Vec<CallbackRc> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &callbacks {
            cb(change);
        }
    }
}

impl<W: Clone> DockStore<W> {
    /// Winning navigation entry.
    #[must_use]
    pub fn active_nav(&self) -> Option<NavEntry<W>> {
        select_active(self.inner.borrow().nav.values()).cloned()
    }

    /// Winning call-to-action entry.
    #[must_use]
    pub fn active_cta(&self) -> Option<CtaEntry<W>> {
        select_active(self.inner.borrow().cta.values()).cloned()
    }

    /// All navigation entries, most recently upserted first.
    #[must_use]
    pub fn nav_entries(&self) -> Vec<NavEntry<W>> {
        let mut entries: Vec<NavEntry<W>> = self.inner.borrow().nav.values().cloned().collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        entries
    }
}

/// RAII guard for a store subscriber.
///
/// Dropping it makes the callback unreachable; the dead weak reference is
/// pruned on the next notification.
pub struct Subscription {
    _guard: CallbackRc,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
