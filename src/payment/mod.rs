//! Payment verification for monetization events.
//!
//! A payment event is considered verified when its incoming payment
//! reference can be fetched successfully:
//!
//! ```text
//! PaymentEvent
//!      │
//!      ▼
//! ┌──────────────────────────┐
//! │ incoming_payment empty?  │──yes──▶ false (no request)
//! └────────────┬─────────────┘
//!              │ no
//!              ▼
//!      GET incoming_payment
//!              │
//!       ┌──────┴──────┐
//!       │             │
//!      2xx      non-2xx / error
//!       │             │
//!       ▼             ▼
//!     true          false
//! ```
//!
//! Verification results are never cached, so an event that failed earlier
//! is fetched again on the next call.

mod verifier;

pub use verifier::{HttpPaymentVerifier, PaymentVerifier};
