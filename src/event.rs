//! Page event types, the accountable-event classifier and the page event
//! channel.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Amount reported as sent by a monetization event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Decimal amount as reported by the browser, e.g. `"0.01"`.
    pub value: String,
    /// Currency code, e.g. `"USD"`.
    pub currency: String,
}

/// One observed Web Monetization payment signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    /// Amount sent by the payer for this event.
    pub amount_sent: Amount,
    /// Payment pointer of the payer.
    pub payment_pointer: String,
    /// Reference to the incoming payment record. May be empty.
    #[serde(default)]
    pub incoming_payment: String,
}

impl PaymentEvent {
    /// Build an event from its parts.
    #[must_use]
    pub fn new(
        value: impl Into<String>,
        currency: impl Into<String>,
        payment_pointer: impl Into<String>,
        incoming_payment: impl Into<String>,
    ) -> Self {
        Self {
            amount_sent: Amount {
                value: value.into(),
                currency: currency.into(),
            },
            payment_pointer: payment_pointer.into(),
            incoming_payment: incoming_payment.into(),
        }
    }

    /// Sent amount as a number, if it parses as a decimal literal.
    ///
    /// Only plain decimal notation with an optional exponent is accepted.
    /// The spelled-out `Infinity` forms are the one exception; spellings like
    /// `inf` or `NaN` are rejected.
    #[must_use]
    pub fn sent_value(&self) -> Option<f64> {
        let value = self.amount_sent.value.trim();
        match value {
            "" => None,
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ if value
                .bytes()
                .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) =>
            {
                None
            }
            _ => value.parse::<f64>().ok().filter(|v| !v.is_nan()),
        }
    }
}

/// Anything delivered on the page's monetization event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A well-formed monetization event.
    Monetization(PaymentEvent),
    /// An event of some other shape.
    Other {
        /// Short description of what was received.
        kind: String,
    },
}

impl PageEvent {
    /// Decode a page event from a JSON payload.
    ///
    /// Payloads that do not have the monetization shape become
    /// [`PageEvent::Other`] rather than errors.
    #[must_use]
    pub fn from_json(payload: &str) -> Self {
        match serde_json::from_str::<PaymentEvent>(payload) {
            Ok(event) => Self::Monetization(event),
            Err(e) => Self::Other {
                kind: format!("unrecognized payload ({e})"),
            },
        }
    }

    /// The payment event, if this is one.
    #[must_use]
    pub fn as_payment(&self) -> Option<&PaymentEvent> {
        match self {
            Self::Monetization(event) => Some(event),
            Self::Other { .. } => None,
        }
    }
}

impl From<PaymentEvent> for PageEvent {
    fn from(event: PaymentEvent) -> Self {
        Self::Monetization(event)
    }
}

/// Whether an event counts towards granting access.
///
/// Only monetization events whose sent amount parses to a number strictly
/// greater than zero are accountable.
#[must_use]
pub fn is_accountable(event: &PageEvent) -> bool {
    event
        .as_payment()
        .and_then(PaymentEvent::sent_value)
        .is_some_and(|value| value > 0.0)
}

/// Receiving half of the page event stream.
pub type PageEventsChannel = broadcast::Receiver<PageEvent>;

/// Sending half of the page event stream.
pub type PageEventsSender = broadcast::Sender<PageEvent>;

/// Create a new page event channel pair.
#[must_use]
pub fn create_event_channel() -> (PageEventsSender, PageEventsChannel) {
    broadcast::channel(256)
}
