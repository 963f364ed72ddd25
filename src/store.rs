//! Session-scoped store of observed page events.
//!
//! Events are appended in arrival order and never removed. Readers can look
//! up the most recent accountable payment or subscribe to arrival
//! notifications, which are sent only after the appended event is visible.

use crate::event::{is_accountable, PageEvent, PaymentEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the arrival notification channel.
pub(crate) const ARRIVAL_CAPACITY: usize = 64;

/// Append-only, in-memory event history.
#[derive(Clone)]
pub struct EventStore {
    events: Arc<RwLock<Vec<PageEvent>>>,
    arrivals: broadcast::Sender<PageEvent>,
}

/// Receiver of store arrival notifications.
pub type ArrivalReceiver = broadcast::Receiver<PageEvent>;

impl EventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (arrivals, _) = broadcast::channel(ARRIVAL_CAPACITY);
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            arrivals,
        }
    }

    /// Append an event and notify subscribers.
    pub fn push(&self, event: PageEvent) {
        let mut events = self.events.write();
        events.push(event.clone());
        // Notify while the write lock is held so notification order matches
        // store order. No receivers is not an error.
        let _ = self.arrivals.send(event);
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether no events were recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Copy of the recorded events, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PageEvent> {
        self.events.read().clone()
    }

    /// Most recently recorded accountable payment, if any.
    ///
    /// Scans newest-first, so a later accountable event wins over earlier
    /// ones and trailing non-accountable events are skipped.
    #[must_use]
    pub fn latest_accountable(&self) -> Option<PaymentEvent> {
        self.events
            .read()
            .iter()
            .rev()
            .find(|event| is_accountable(event))
            .and_then(PageEvent::as_payment)
            .cloned()
    }

    /// Subscribe to events appended from now on.
    #[must_use]
    pub fn subscribe(&self) -> ArrivalReceiver {
        self.arrivals.subscribe()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn payment(value: &str, incoming: &str) -> PaymentEvent {
        PaymentEvent::new(value, "USD", "$wallet.example/alice", incoming)
    }

    #[test]
    fn test_store_basic_operations() {
        let store = EventStore::new();
        assert!(store.is_empty());
        assert!(store.latest_accountable().is_none());

        store.push(payment("1", "a").into());
        store.push(PageEvent::Other {
            kind: "noise".to_string(),
        });

        assert_eq!(store.len(), 2);
        let snapshot = store.snapshot();
        assert!(matches!(snapshot[0], PageEvent::Monetization(_)));
        assert!(matches!(snapshot[1], PageEvent::Other { .. }));
    }

    #[test]
    fn test_latest_accountable_prefers_newest() {
        let store = EventStore::new();
        store.push(payment("1", "first").into());
        store.push(payment("2", "second").into());

        let latest = store.latest_accountable().expect("accountable event");
        assert_eq!(latest.incoming_payment, "second");
    }

    #[test]
    fn test_latest_accountable_skips_trailing_noise() {
        let store = EventStore::new();
        store.push(payment("0.5", "paid").into());
        store.push(payment("0", "zero").into());
        store.push(payment("oops", "garbage").into());

        let latest = store.latest_accountable().expect("accountable event");
        assert_eq!(latest.incoming_payment, "paid");
    }

    #[test]
    fn test_latest_accountable_none_when_all_noise() {
        let store = EventStore::new();
        store.push(payment("0", "zero").into());
        store.push(PageEvent::Other {
            kind: "noise".to_string(),
        });
        assert!(store.latest_accountable().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_event_after_it_is_stored() {
        let store = EventStore::new();
        let mut arrivals = store.subscribe();

        store.push(payment("3", "x").into());

        let event = arrivals.recv().await.expect("arrival");
        assert!(is_accountable(&event));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_history() {
        let store = EventStore::new();
        let reader = store.clone();
        store.push(payment("1", "shared").into());
        assert_eq!(reader.len(), 1);
    }
}
