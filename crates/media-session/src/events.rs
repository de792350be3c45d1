//! Session events and the listener registry
//!
//! Transport callbacks are translated into the internal [`SessionEvent`]
//! tagged enum before redistribution, so consumers never depend on the
//! engine's exact callback shapes. Distribution goes through a typed
//! observer registry: listeners register per event kind, receive events
//! in registration order, and get back an explicit [`EventSubscription`]
//! token so teardown is deterministic.
//!
//! A panicking listener is caught and logged; it never blocks delivery
//! to listeners registered after it.
//!
//! # Usage
//!
//! ```rust
//! use liveclass_media_session::events::{ListenerRegistry, SessionEvent, SessionEventKind};
//! use liveclass_media_session::types::ParticipantId;
//!
//! let registry = ListenerRegistry::new();
//! let subscription = registry.subscribe(SessionEventKind::ParticipantLeft, |event| {
//!     if let SessionEvent::ParticipantLeft { participant_id } = event {
//!         println!("{} left", participant_id);
//!     }
//! });
//!
//! registry.dispatch(&SessionEvent::ParticipantLeft {
//!     participant_id: ParticipantId::new("student-7"),
//! });
//!
//! registry.unsubscribe(&subscription);
//! assert_eq!(registry.listener_count(SessionEventKind::ParticipantLeft), 0);
//! ```

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::types::{ConnectionState, MediaKind, NetworkQualityInfo, ParticipantId, RemoteParticipant};

/// Event re-emitted by the coordinator to registered listeners
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A remote participant joined the room
    ParticipantJoined {
        /// The participant's projection at join time
        participant: RemoteParticipant,
    },
    /// A remote participant left the room
    ParticipantLeft {
        /// Identifier of the departed participant
        participant_id: ParticipantId,
    },
    /// A remote participant published a track
    TrackPublished {
        /// Identifier of the publishing participant
        participant_id: ParticipantId,
        /// Kind of media published
        kind: MediaKind,
    },
    /// A remote participant unpublished a track
    TrackUnpublished {
        /// Identifier of the unpublishing participant
        participant_id: ParticipantId,
        /// Kind of media unpublished
        kind: MediaKind,
    },
    /// The coordinator's connection state changed
    ConnectionStateChanged {
        /// State before the transition
        previous: ConnectionState,
        /// State after the transition
        current: ConnectionState,
    },
    /// A network quality report was relayed
    NetworkQuality(NetworkQualityInfo),
}

impl SessionEvent {
    /// The registration kind of this event
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::ParticipantJoined { .. } => SessionEventKind::ParticipantJoined,
            SessionEvent::ParticipantLeft { .. } => SessionEventKind::ParticipantLeft,
            SessionEvent::TrackPublished { .. } => SessionEventKind::TrackPublished,
            SessionEvent::TrackUnpublished { .. } => SessionEventKind::TrackUnpublished,
            SessionEvent::ConnectionStateChanged { .. } => SessionEventKind::ConnectionStateChanged,
            SessionEvent::NetworkQuality(_) => SessionEventKind::NetworkQuality,
        }
    }
}

/// Discriminant used to register listeners for a specific event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    /// `participant-joined`
    ParticipantJoined,
    /// `participant-left`
    ParticipantLeft,
    /// `track-published`
    TrackPublished,
    /// `track-unpublished`
    TrackUnpublished,
    /// `connection-state-change`
    ConnectionStateChanged,
    /// `network-quality`
    NetworkQuality,
}

/// Callback invoked for each dispatched event of the subscribed kind
pub type SessionEventListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Token returned at registration time; pass to
/// [`ListenerRegistry::unsubscribe`] to deregister deterministically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSubscription {
    id: u64,
    kind: SessionEventKind,
}

impl EventSubscription {
    /// The unique id of this subscription
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The event kind this subscription listens to
    pub fn kind(&self) -> SessionEventKind {
        self.kind
    }
}

/// Ordered, typed observer registry for session events
///
/// Listeners for a given kind are invoked in registration order. Dispatch
/// never holds the registry lock while running listeners, so a listener
/// may subscribe or unsubscribe others without deadlocking.
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<SessionEventKind, Vec<(u64, SessionEventListener)>>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Register a listener for the given event kind
    ///
    /// Returns a subscription token. Any number of listeners may be
    /// registered for the same kind.
    pub fn subscribe<F>(&self, kind: SessionEventKind, listener: F) -> EventSubscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.lock().unwrap();
        listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        EventSubscription { id, kind }
    }

    /// Deregister a listener; returns whether it was still registered
    pub fn unsubscribe(&self, subscription: &EventSubscription) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        if let Some(entries) = listeners.get_mut(&subscription.kind) {
            let before = entries.len();
            entries.retain(|(id, _)| *id != subscription.id);
            return entries.len() != before;
        }
        false
    }

    /// Number of listeners currently registered for a kind
    pub fn listener_count(&self, kind: SessionEventKind) -> usize {
        let listeners = self.listeners.lock().unwrap();
        listeners.get(&kind).map(|v| v.len()).unwrap_or(0)
    }

    /// Dispatch an event to every listener registered for its kind
    ///
    /// Delivery order is registration order. A panicking listener is
    /// caught and logged; delivery continues with the next listener.
    pub fn dispatch(&self, event: &SessionEvent) {
        let snapshot: Vec<SessionEventListener> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .get(&event.kind())
                .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default()
        };

        for listener in snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| listener(event)));
            if result.is_err() {
                tracing::warn!(
                    "Event listener panicked while handling {:?}; continuing delivery",
                    event.kind()
                );
            }
        }
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.listeners.lock().unwrap().clear();
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_event(id: &str) -> SessionEvent {
        SessionEvent::ParticipantLeft {
            participant_id: ParticipantId::new(id),
        }
    }

    #[test]
    fn listeners_receive_events_in_registration_order() {
        let registry = ListenerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            registry.subscribe(SessionEventKind::ParticipantLeft, move |_| {
                order.lock().unwrap().push(tag);
            });
        }

        registry.dispatch(&left_event("p1"));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn panicking_listener_does_not_block_later_listeners() {
        let registry = ListenerRegistry::new();
        let delivered = Arc::new(Mutex::new(0u32));

        registry.subscribe(SessionEventKind::ParticipantLeft, |_| {
            panic!("listener failure");
        });
        let delivered_clone = delivered.clone();
        registry.subscribe(SessionEventKind::ParticipantLeft, move |_| {
            *delivered_clone.lock().unwrap() += 1;
        });

        registry.dispatch(&left_event("p1"));
        assert_eq!(*delivered.lock().unwrap(), 1);
    }

    #[test]
    fn subscription_tokens_are_unique_and_typed() {
        let registry = ListenerRegistry::new();
        let left = registry.subscribe(SessionEventKind::ParticipantLeft, |_| {});
        let quality = registry.subscribe(SessionEventKind::NetworkQuality, |_| {});

        assert_ne!(left.id(), quality.id());
        assert_eq!(left.kind(), SessionEventKind::ParticipantLeft);
        assert_eq!(quality.kind(), SessionEventKind::NetworkQuality);
    }

    #[test]
    fn unsubscribe_removes_only_the_target_listener() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let hits_a = hits.clone();
        let sub_a = registry.subscribe(SessionEventKind::ParticipantLeft, move |_| {
            hits_a.lock().unwrap().push("a");
        });
        let hits_b = hits.clone();
        registry.subscribe(SessionEventKind::ParticipantLeft, move |_| {
            hits_b.lock().unwrap().push("b");
        });

        assert!(registry.unsubscribe(&sub_a));
        assert!(!registry.unsubscribe(&sub_a), "double unsubscribe is a no-op");

        registry.dispatch(&left_event("p1"));
        assert_eq!(*hits.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn dispatch_only_reaches_listeners_of_matching_kind() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(Mutex::new(0u32));

        let hits_clone = hits.clone();
        registry.subscribe(SessionEventKind::TrackPublished, move |_| {
            *hits_clone.lock().unwrap() += 1;
        });

        registry.dispatch(&left_event("p1"));
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn clear_drops_all_registrations() {
        let registry = ListenerRegistry::new();
        registry.subscribe(SessionEventKind::ParticipantLeft, |_| {});
        registry.subscribe(SessionEventKind::NetworkQuality, |_| {});

        registry.clear();
        assert_eq!(registry.listener_count(SessionEventKind::ParticipantLeft), 0);
        assert_eq!(registry.listener_count(SessionEventKind::NetworkQuality), 0);
    }
}
