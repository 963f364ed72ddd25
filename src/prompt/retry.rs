//! The retry loop behind the payment prompt.

use super::view::{PromptMessage, PromptView};
use crate::config::RetryPolicy;
use crate::event::PaymentEvent;
use crate::payment::PaymentVerifier;
use crate::store::{ArrivalReceiver, EventStore};
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How a prompt invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// A payment was verified.
    Granted,
    /// Every attempt was used without a verified payment.
    Exhausted,
    /// The visitor cancelled the prompt.
    Cancelled,
}

impl PromptOutcome {
    /// Returns true if access should be granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Cancels the prompt invocation it was taken from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Outcome of one wait step.
#[derive(Debug)]
enum Wait {
    Cancelled,
    TimedOut,
    Arrived,
    Failed(String),
}

/// Per-invocation loop state.
struct RetryState {
    attempt: u32,
    cancel: watch::Receiver<bool>,
    status: Option<PromptMessage>,
}

impl RetryState {
    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    fn show<V: PromptView + ?Sized>(&mut self, view: &mut V, message: PromptMessage) {
        view.set_status(&message);
        self.status = Some(message);
    }

    /// Resolves once cancellation is requested.
    async fn cancelled(&mut self) {
        let raised = self.cancel.wait_for(|cancelled| *cancelled).await.is_ok();
        if !raised {
            // Sender gone without cancelling: never resolves.
            std::future::pending::<()>().await;
        }
    }
}

/// One invocation of the payment prompt.
///
/// Create with [`RetryPrompt::new`], take a [`CancelHandle`] if something
/// besides the view needs to cancel, then drive it with [`RetryPrompt::run`].
pub struct RetryPrompt {
    store: EventStore,
    verifier: Arc<dyn PaymentVerifier>,
    policy: RetryPolicy,
    cancel: CancelHandle,
}

impl RetryPrompt {
    /// Create a prompt over the given store and verifier.
    #[must_use]
    pub fn new(
        store: EventStore,
        verifier: Arc<dyn PaymentVerifier>,
        policy: RetryPolicy,
    ) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            store,
            verifier,
            policy,
            cancel: CancelHandle { tx: Arc::new(tx) },
        }
    }

    /// Handle that cancels this invocation.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the prompt to completion.
    ///
    /// Always resolves; failures along the way are shown in the view and
    /// folded into the outcome.
    pub async fn run<V: PromptView + ?Sized>(self, view: &mut V) -> PromptOutcome {
        let max_attempts = self.policy.max_attempts;
        let mut arrivals = self.store.subscribe();
        let mut state = RetryState {
            attempt: 0,
            cancel: self.cancel.tx.subscribe(),
            status: None,
        };

        view.open(max_attempts, self.cancel_handle());
        view.set_remaining(max_attempts);
        info!("Payment prompt started ({max_attempts} attempts)");

        while state.attempt < max_attempts {
            if state.is_cancelled() {
                return Self::cancelled(view, &mut state);
            }

            state.attempt += 1;
            view.set_remaining(max_attempts - state.attempt);
            state.show(view, PromptMessage::Waiting);
            debug!("Attempt {}/{}", state.attempt, max_attempts);

            // Anything queued so far is already visible in the store.
            drain(&mut arrivals);

            let event = match self.store.latest_accountable() {
                Some(event) => event,
                None => match self.wait(&mut state, &mut arrivals).await {
                    Wait::Cancelled => return Self::cancelled(view, &mut state),
                    Wait::TimedOut => {
                        debug!("Attempt {} timed out", state.attempt);
                        continue;
                    }
                    Wait::Failed(message) => {
                        warn!("Waiting for monetization event failed: {message}");
                        state.show(view, PromptMessage::Error(message));
                        continue;
                    }
                    Wait::Arrived => match self.store.latest_accountable() {
                        Some(event) => event,
                        None => {
                            debug!("Arrived event is not accountable");
                            continue;
                        }
                    },
                },
            };

            state.show(view, PromptMessage::Verifying);
            let verified = tokio::select! {
                biased;
                () = state.cancelled() => return Self::cancelled(view, &mut state),
                verified = self.verifier.verify(&event) => verified,
            };
            if state.is_cancelled() {
                return Self::cancelled(view, &mut state);
            }

            if verified {
                info!(
                    "Payment from {} verified on attempt {}",
                    event.payment_pointer, state.attempt
                );
                view.close();
                return PromptOutcome::Granted;
            }

            state.show(view, PromptMessage::VerificationFailed);
            if self.pause(&mut state, &event).await {
                return Self::cancelled(view, &mut state);
            }
        }

        info!("Payment prompt exhausted after {} attempts", state.attempt);
        state.show(view, PromptMessage::TimedOut);
        view.set_remaining(0);
        view.relabel_dismiss();
        PromptOutcome::Exhausted
    }

    /// Race cancellation, the next stored event and the attempt timeout.
    async fn wait(&self, state: &mut RetryState, arrivals: &mut ArrivalReceiver) -> Wait {
        let timeout = tokio::time::sleep(self.policy.attempt_timeout());

        let result = tokio::select! {
            biased;
            () = state.cancelled() => Wait::Cancelled,
            received = arrivals.recv() => match received {
                Ok(_) => Wait::Arrived,
                Err(RecvError::Lagged(missed)) => {
                    Wait::Failed(format!("Missed {missed} monetization events"))
                }
                Err(RecvError::Closed) => {
                    Wait::Failed("Monetization event source closed".to_string())
                }
            },
            () = timeout => Wait::TimedOut,
        };

        // A stale arrival must not win over a cancellation raised meanwhile.
        if state.is_cancelled() {
            Wait::Cancelled
        } else {
            result
        }
    }

    /// Pause after a failed verification. Returns true if cancelled.
    async fn pause(&self, state: &mut RetryState, event: &PaymentEvent) -> bool {
        debug!(
            "Verification of {} failed, pausing {:?}",
            event.incoming_payment,
            self.policy.failure_pause()
        );
        tokio::select! {
            biased;
            () = state.cancelled() => true,
            () = tokio::time::sleep(self.policy.failure_pause()) => state.is_cancelled(),
        }
    }

    fn cancelled<V: PromptView + ?Sized>(
        view: &mut V,
        state: &mut RetryState,
    ) -> PromptOutcome {
        info!("Payment prompt cancelled on attempt {}", state.attempt);
        state.show(view, PromptMessage::Aborted);
        view.close();
        PromptOutcome::Cancelled
    }
}

fn drain(arrivals: &mut ArrivalReceiver) {
    loop {
        match arrivals.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
