//! The Web Monetization custom choice registered with the offerwall.
//!
//! The offerwall calls [`CustomChoice::initialize`] once per page load to
//! learn whether the choice is usable and whether access is already granted,
//! then [`CustomChoice::show`] when it decides the gate should render.

use crate::config::RetryPolicy;
use crate::event::PageEventsChannel;
use crate::payment::PaymentVerifier;
use crate::probe::CapabilityProbe;
use crate::prompt::{PromptView, RetryPrompt};
use crate::store::EventStore;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Initialization outcome reported back to the offerwall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeResponse {
    /// The page cannot receive monetization; the offerwall hides this choice.
    CustomChoiceDisabled,
    /// A verified payment already exists; the offerwall does not render.
    AccessGranted,
    /// No verified payment yet; the offerwall may render.
    AccessNotGranted,
}

/// Parameters the offerwall passes to `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializeParams {
    /// Language the offerwall renders in, if known.
    pub offerwall_language_code: Option<String>,
}

/// Custom choice granting access in exchange for Web Monetization payments.
pub struct CustomChoice {
    store: EventStore,
    verifier: Arc<dyn PaymentVerifier>,
    probe: Box<dyn CapabilityProbe>,
    policy: RetryPolicy,
    subscription: Option<JoinHandle<()>>,
}

impl CustomChoice {
    /// Create a choice with an empty event history.
    #[must_use]
    pub fn new(
        verifier: Arc<dyn PaymentVerifier>,
        probe: Box<dyn CapabilityProbe>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store: EventStore::new(),
            verifier,
            probe,
            policy,
            subscription: None,
        }
    }

    /// Event history observed during this session.
    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Record page events from `events` into the store.
    ///
    /// Events already queued on the receiver are recorded before this
    /// returns; later ones are recorded by a background task. Replaces any
    /// previous subscription.
    pub fn subscribe(&mut self, mut events: PageEventsChannel) {
        loop {
            match events.try_recv() {
                Ok(event) => self.store.push(event),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Dropped {missed} page events before subscribing");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        let store = self.store.clone();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        debug!("Recorded page event #{}", store.len() + 1);
                        store.push(event);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Dropped {missed} page events");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Page event source closed");
                        break;
                    }
                }
            }
        });

        if let Some(previous) = self.subscription.replace(task) {
            previous.abort();
        }
    }

    /// Decide whether this choice applies and whether access is granted.
    ///
    /// Starts recording page events first, so events keep accumulating even
    /// when the choice reports itself disabled.
    pub async fn initialize(
        &mut self,
        params: &InitializeParams,
        events: PageEventsChannel,
    ) -> InitializeResponse {
        debug!(
            "Initializing custom choice (language={:?})",
            params.offerwall_language_code
        );
        self.subscribe(events);

        if !self.probe.supports_monetization() {
            info!("Page has no monetization link - custom choice disabled");
            return InitializeResponse::CustomChoiceDisabled;
        }

        if self.should_grant_access().await {
            info!("Verified payment found - access granted");
            InitializeResponse::AccessGranted
        } else {
            info!("No verified payment yet - access not granted");
            InitializeResponse::AccessNotGranted
        }
    }

    /// Verify the most recent accountable payment, if there is one.
    pub async fn should_grant_access(&self) -> bool {
        match self.store.latest_accountable() {
            Some(event) => self.verifier.verify(&event).await,
            None => {
                debug!("No accountable payment recorded");
                false
            }
        }
    }

    /// Start a new prompt invocation over this choice's history.
    #[must_use]
    pub fn prompt(&self) -> RetryPrompt {
        RetryPrompt::new(self.store.clone(), Arc::clone(&self.verifier), self.policy)
    }

    /// Show the payment prompt and wait for it to finish.
    ///
    /// With `events`, the choice subscribes to that channel before the
    /// prompt starts, replacing the subscription taken by
    /// [`initialize`](Self::initialize). Without it, the existing
    /// subscription must already be in place or the prompt sees no new
    /// events. Returns `true` only when a payment was verified.
    pub async fn show<V: PromptView + ?Sized>(
        &mut self,
        view: &mut V,
        events: Option<PageEventsChannel>,
    ) -> bool {
        if let Some(events) = events {
            self.subscribe(events);
        } else if self.subscription.is_none() {
            warn!("Showing prompt without a page event subscription");
        }
        self.prompt().run(view).await.is_granted()
    }
}

impl Drop for CustomChoice {
    fn drop(&mut self) {
        if let Some(task) = self.subscription.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::event::{create_event_channel, PageEvent, PaymentEvent};
    use crate::prompt::TracingView;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Verifier that accepts a fixed set of incoming payment references.
    #[derive(Default)]
    struct AllowList {
        allowed: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    impl AllowList {
        fn new(allowed: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                allowed: allowed.iter().map(ToString::to_string).collect(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().clone()
        }
    }

    #[async_trait]
    impl PaymentVerifier for AllowList {
        async fn verify(&self, event: &PaymentEvent) -> bool {
            self.seen.lock().push(event.incoming_payment.clone());
            self.allowed.contains(&event.incoming_payment)
        }
    }

    fn payment(value: &str, incoming: &str) -> PageEvent {
        PaymentEvent::new(value, "USD", "$wallet.example/alice", incoming).into()
    }

    fn choice(verifier: Arc<AllowList>, supported: bool) -> CustomChoice {
        CustomChoice::new(verifier, Box::new(supported), RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_disabled_without_monetization_link() {
        let verifier = AllowList::new(&["https://wallet.example/ip/1"]);
        let mut choice = choice(Arc::clone(&verifier), false);
        let (tx, rx) = create_event_channel();
        tx.send(payment("1", "https://wallet.example/ip/1"))
            .expect("send");

        let response = choice.initialize(&InitializeParams::default(), rx).await;

        assert_eq!(response, InitializeResponse::CustomChoiceDisabled);
        assert!(verifier.seen().is_empty());
        // Events are still recorded.
        assert_eq!(choice.store().len(), 1);
    }

    #[tokio::test]
    async fn test_granted_with_verified_payment() {
        let verifier = AllowList::new(&["https://wallet.example/ip/1"]);
        let mut choice = choice(Arc::clone(&verifier), true);
        let (tx, rx) = create_event_channel();
        tx.send(payment("1", "https://wallet.example/ip/1"))
            .expect("send");

        let response = choice.initialize(&InitializeParams::default(), rx).await;
        assert_eq!(response, InitializeResponse::AccessGranted);
    }

    #[tokio::test]
    async fn test_not_granted_without_events() {
        let verifier = AllowList::new(&[]);
        let mut choice = choice(Arc::clone(&verifier), true);
        let (_tx, rx) = create_event_channel();

        let response = choice.initialize(&InitializeParams::default(), rx).await;

        assert_eq!(response, InitializeResponse::AccessNotGranted);
        assert!(verifier.seen().is_empty());
    }

    #[tokio::test]
    async fn test_access_decision_uses_latest_accountable_event() {
        let verifier = AllowList::new(&["https://wallet.example/ip/2"]);
        let choice = choice(Arc::clone(&verifier), true);
        choice.store().push(payment("1", "https://wallet.example/ip/1"));
        choice.store().push(payment("2", "https://wallet.example/ip/2"));
        choice.store().push(payment("0", "https://wallet.example/ip/3"));

        assert!(choice.should_grant_access().await);
        assert_eq!(verifier.seen(), vec!["https://wallet.example/ip/2"]);
    }

    #[tokio::test]
    async fn test_access_decision_is_not_cached() {
        let verifier = AllowList::new(&[]);
        let choice = choice(Arc::clone(&verifier), true);
        choice.store().push(payment("1", "https://wallet.example/ip/1"));

        assert!(!choice.should_grant_access().await);
        assert!(!choice.should_grant_access().await);
        assert_eq!(verifier.seen().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_subscribes_to_given_channel() {
        let verifier = AllowList::new(&["https://wallet.example/ip/5"]);
        let mut choice = choice(Arc::clone(&verifier), true);
        let (tx, rx) = create_event_channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let _ = tx.send(payment("1", "https://wallet.example/ip/5"));
        });

        let granted = choice.show(&mut TracingView::new(), Some(rx)).await;

        assert!(granted);
        assert_eq!(verifier.seen(), vec!["https://wallet.example/ip/5"]);
    }

    #[tokio::test]
    async fn test_subscription_records_later_events() {
        let verifier = AllowList::new(&[]);
        let mut choice = choice(verifier, true);
        let (tx, rx) = create_event_channel();
        choice.subscribe(rx);

        let mut arrivals = choice.store().subscribe();
        tx.send(payment("1", "https://wallet.example/ip/9"))
            .expect("send");
        arrivals.recv().await.expect("arrival");

        assert_eq!(choice.store().len(), 1);
    }
}
