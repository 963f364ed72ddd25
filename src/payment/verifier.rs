//! Payment verifier trait and its HTTP implementation.

use crate::config::VerifierConfig;
use crate::error::Result;
use crate::event::PaymentEvent;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Confirms that a payment event references a live payment record.
///
/// Implementations must not fail: any problem reaching the record maps to
/// `false`.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Check a single payment event.
    async fn verify(&self, event: &PaymentEvent) -> bool;
}

/// Verifies payments by fetching the event's incoming payment reference.
#[derive(Debug, Clone)]
pub struct HttpPaymentVerifier {
    client: reqwest::Client,
}

impl HttpPaymentVerifier {
    /// Create a verifier with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("wm-offerwall/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        info!(
            "Payment verifier initialized (request_timeout_secs={:?})",
            config.request_timeout_secs
        );

        Ok(Self { client })
    }

    /// Create a verifier around an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentVerifier for HttpPaymentVerifier {
    async fn verify(&self, event: &PaymentEvent) -> bool {
        if event.incoming_payment.is_empty() {
            debug!(
                "Event from {} has no incoming payment reference",
                event.payment_pointer
            );
            return false;
        }

        match self.client.get(&event.incoming_payment).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Incoming payment {} verified", event.incoming_payment);
                true
            }
            Ok(response) => {
                debug!(
                    "Incoming payment {} rejected with status {}",
                    event.incoming_payment,
                    response.status()
                );
                false
            }
            Err(e) => {
                warn!(
                    "Incoming payment lookup failed for {}: {}",
                    event.incoming_payment, e
                );
                false
            }
        }
    }
}
