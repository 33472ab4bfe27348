#![forbid(unsafe_code)]

//! Connectivity signals and scoped notifier subscriptions.
//!
//! A [`ConnectivityNotifier`] emits [`SyncTransition`]s (previous/current
//! state pairs) to registered listeners. Consumers hold a
//! [`ConnectivitySubscription`] guard for as long as they want to receive
//! transitions; dropping the guard unsubscribes.
//!
//! # Invariants
//!
//! 1. A transition is a reconnection iff `current` is not [`SyncState::Error`]
//!    and `current != previous`.
//! 2. A subscription guard unsubscribes exactly once, on explicit
//!    [`release`](ConnectivitySubscription::release) or on drop, whichever
//!    comes first (including unwinding).
//! 3. Listeners may unsubscribe while a transition is being delivered. A
//!    listener removed mid-delivery receives nothing further, including the
//!    transition in flight.
//!
//! Everything here is single-threaded: listeners are `Rc`, not `Send`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Sync state reported by the connectivity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    /// Initial sync finished; the client is usable.
    Prepared,
    /// Steady-state syncing.
    Syncing,
    /// Catching up after a gap.
    Catchup,
    /// Connection dropped, retrying.
    Reconnecting,
    /// Sync was stopped deliberately.
    Stopped,
    /// Sync failed.
    Error,
}

impl SyncState {
    /// Whether this is the error state.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepared => "prepared",
            Self::Syncing => "syncing",
            Self::Catchup => "catchup",
            Self::Reconnecting => "reconnecting",
            Self::Stopped => "stopped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(previous, current)` pair emitted by a notifier.
///
/// `previous` is `None` for the first emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncTransition {
    pub previous: Option<SyncState>,
    pub current: SyncState,
}

impl SyncTransition {
    #[must_use]
    pub const fn new(previous: Option<SyncState>, current: SyncState) -> Self {
        Self { previous, current }
    }

    /// First emission with no prior state.
    #[must_use]
    pub const fn initial(current: SyncState) -> Self {
        Self::new(None, current)
    }

    /// Whether this transition should trigger a retry from the top.
    #[must_use]
    pub fn is_reconnection(&self) -> bool {
        !self.current.is_error() && self.previous != Some(self.current)
    }
}

/// Callback invoked for each transition.
pub type SyncListener = Rc<dyn Fn(SyncTransition)>;

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Source of connectivity transitions.
pub trait ConnectivityNotifier {
    /// Register `listener`; it receives every transition until unsubscribed.
    fn subscribe(&self, listener: SyncListener) -> ListenerId;

    /// Remove a listener. Returns `false` if `id` was not registered.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

/// Scoped notifier subscription.
///
/// Holds the notifier alive and unsubscribes when released or dropped.
pub struct ConnectivitySubscription {
    notifier: Rc<dyn ConnectivityNotifier>,
    id: Option<ListenerId>,
}

impl ConnectivitySubscription {
    /// Subscribe `listener` to `notifier`.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn acquire(notifier: Rc<dyn ConnectivityNotifier>, listener: SyncListener) -> Self {
        let id = notifier.subscribe(listener);
        crate::debug!(listener = id.get(), "connectivity subscription acquired");
        Self {
            notifier,
            id: Some(id),
        }
    }

    /// Listener id while subscribed.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Unsubscribe now. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        let Some(id) = self.id.take() else {
            return false;
        };
        self.notifier.unsubscribe(id);
        crate::debug!(listener = id.get(), "connectivity subscription released");
        true
    }
}

impl fmt::Debug for ConnectivitySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivitySubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Drop for ConnectivitySubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// In-process notifier that remembers the last state it emitted.
///
/// Every [`set_state`](LocalNotifier::set_state) call is delivered, even if
/// the state did not change; receivers decide what counts as a reconnection.
#[derive(Default)]
pub struct LocalNotifier {
    state: Cell<Option<SyncState>>,
    listeners: RefCell<Vec<(ListenerId, SyncListener)>>,
    next_id: Cell<u64>,
}

impl LocalNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last emitted state.
    #[must_use]
    pub fn state(&self) -> Option<SyncState> {
        self.state.get()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Move to `state` and notify every listener of the transition.
    pub fn set_state(&self, state: SyncState) -> SyncTransition {
        let previous = self.state.replace(Some(state));
        let transition = SyncTransition::new(previous, state);
        crate::trace!(
            previous = ?previous,
            current = %state,
            listeners = self.listener_count(),
            "sync transition"
        );

        // Snapshot so listeners can (un)subscribe during delivery.
        let snapshot: Vec<(ListenerId, SyncListener)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();
        for (id, listener) in snapshot {
            // Skip listeners removed by an earlier one in this delivery.
            if self.is_subscribed(id) {
                listener(transition);
            }
        }
        transition
    }

    fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|(registered, _)| *registered == id)
    }
}

impl ConnectivityNotifier for LocalNotifier {
    fn subscribe(&self, listener: SyncListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }
}

impl fmt::Debug for LocalNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalNotifier")
            .field("state", &self.state.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (SyncListener, Rc<RefCell<Vec<SyncTransition>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let listener: SyncListener = Rc::new(move |t: SyncTransition| sink.borrow_mut().push(t));
        (listener, seen)
    }

    #[test]
    fn error_to_syncing_is_reconnection() {
        let t = SyncTransition::new(Some(SyncState::Error), SyncState::Syncing);
        assert!(t.is_reconnection());
    }

    #[test]
    fn same_state_is_not_reconnection() {
        let t = SyncTransition::new(Some(SyncState::Syncing), SyncState::Syncing);
        assert!(!t.is_reconnection());
    }

    #[test]
    fn into_error_is_not_reconnection() {
        let t = SyncTransition::new(Some(SyncState::Syncing), SyncState::Error);
        assert!(!t.is_reconnection());
        let t = SyncTransition::initial(SyncState::Error);
        assert!(!t.is_reconnection());
    }

    #[test]
    fn first_non_error_emission_is_reconnection() {
        assert!(SyncTransition::initial(SyncState::Prepared).is_reconnection());
    }

    #[test]
    fn any_other_change_counts() {
        // Reconnecting and Stopped are not errors, so entering them counts.
        let t = SyncTransition::new(Some(SyncState::Syncing), SyncState::Reconnecting);
        assert!(t.is_reconnection());
        let t = SyncTransition::new(Some(SyncState::Syncing), SyncState::Stopped);
        assert!(t.is_reconnection());
    }

    #[test]
    fn notifier_delivers_previous_and_current() {
        let notifier = LocalNotifier::new();
        let (listener, seen) = recorder();
        notifier.subscribe(listener);

        notifier.set_state(SyncState::Syncing);
        notifier.set_state(SyncState::Error);

        assert_eq!(
            *seen.borrow(),
            vec![
                SyncTransition::initial(SyncState::Syncing),
                SyncTransition::new(Some(SyncState::Syncing), SyncState::Error),
            ]
        );
        assert_eq!(notifier.state(), Some(SyncState::Error));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let notifier = LocalNotifier::new();
        let (listener, seen) = recorder();
        let id = notifier.subscribe(listener);
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));

        notifier.set_state(SyncState::Syncing);
        assert!(seen.borrow().is_empty());
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn listener_ids_are_unique() {
        let notifier = LocalNotifier::new();
        let (a, _) = recorder();
        let (b, _) = recorder();
        assert_ne!(notifier.subscribe(a), notifier.subscribe(b));
    }

    #[test]
    fn guard_unsubscribes_on_drop() {
        let notifier = Rc::new(LocalNotifier::new());
        let (listener, seen) = recorder();
        {
            let sub = ConnectivitySubscription::acquire(notifier.clone(), listener);
            assert!(sub.is_active());
            assert_eq!(notifier.listener_count(), 1);
            notifier.set_state(SyncState::Syncing);
        }
        assert_eq!(notifier.listener_count(), 0);
        notifier.set_state(SyncState::Error);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn release_is_idempotent() {
        let notifier = Rc::new(LocalNotifier::new());
        let (listener, _) = recorder();
        let mut sub = ConnectivitySubscription::acquire(notifier.clone(), listener);
        assert!(sub.release());
        assert!(!sub.release());
        assert_eq!(sub.id(), None);
        drop(sub);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn guard_released_during_unwind() {
        let notifier = Rc::new(LocalNotifier::new());
        let (listener, _) = recorder();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _sub = ConnectivitySubscription::acquire(notifier.clone(), listener);
            panic!("teardown");
        }));
        assert!(result.is_err());
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_during_delivery() {
        let notifier = Rc::new(LocalNotifier::new());
        let slot: Rc<RefCell<Option<ConnectivitySubscription>>> = Rc::new(RefCell::new(None));
        let inner = Rc::clone(&slot);
        let listener: SyncListener = Rc::new(move |_: SyncTransition| {
            inner.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(ConnectivitySubscription::acquire(
            notifier.clone(),
            listener,
        ));

        notifier.set_state(SyncState::Syncing);
        assert_eq!(notifier.listener_count(), 0);
        assert!(slot.borrow().is_none());
    }

    #[test]
    fn peer_released_during_delivery_is_skipped() {
        let notifier = Rc::new(LocalNotifier::new());
        let (victim, seen) = recorder();
        let peer: Rc<RefCell<Option<ConnectivitySubscription>>> = Rc::new(RefCell::new(None));

        let target = Rc::clone(&peer);
        let releaser: SyncListener = Rc::new(move |_: SyncTransition| {
            target.borrow_mut().take();
        });
        let _first = ConnectivitySubscription::acquire(notifier.clone(), releaser);
        *peer.borrow_mut() = Some(ConnectivitySubscription::acquire(notifier.clone(), victim));

        notifier.set_state(SyncState::Syncing);
        assert!(seen.borrow().is_empty());
        assert_eq!(notifier.listener_count(), 1);
    }

    #[test]
    fn listener_added_during_delivery_waits_for_next_transition() {
        let notifier = Rc::new(LocalNotifier::new());
        let (late, seen) = recorder();
        let pending = RefCell::new(Some(late));
        let registrar_notifier = Rc::clone(&notifier);
        let registrar: SyncListener = Rc::new(move |_: SyncTransition| {
            if let Some(listener) = pending.borrow_mut().take() {
                registrar_notifier.subscribe(listener);
            }
        });
        notifier.subscribe(registrar);

        notifier.set_state(SyncState::Syncing);
        assert!(seen.borrow().is_empty());
        notifier.set_state(SyncState::Error);
        assert_eq!(seen.borrow().len(), 1);
    }
}
