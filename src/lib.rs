//! # wm-offerwall
//!
//! A Web Monetization "custom choice" for offerwall gating.
//!
//! The choice records the page's monetization events, grants access when the
//! most recent accountable payment can be verified, and otherwise drives a
//! bounded, cancellable prompt that waits for a qualifying payment.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wm_offerwall::{
//!     create_event_channel, CustomChoice, HttpPaymentVerifier, InitializeParams,
//!     LinkRelations, OfferwallConfig, TracingView,
//! };
//!
//! let config = OfferwallConfig::default();
//! let verifier = Arc::new(HttpPaymentVerifier::new(&config.verifier)?);
//! let probe = Box::new(LinkRelations::new(["monetization"]));
//! let mut choice = CustomChoice::new(verifier, probe, config.retry);
//!
//! let (events_tx, events_rx) = create_event_channel();
//! let response = choice.initialize(&InitializeParams::default(), events_rx).await;
//! let granted = choice.show(&mut TracingView::new(), None).await;
//! ```
//!
//! The crate also ships the publisher preview tool (see [`tool`]), a small
//! axum service that renders a configuration form embedding the offerwall
//! script.

pub mod choice;
pub mod config;
pub mod error;
pub mod event;
pub mod payment;
pub mod probe;
pub mod prompt;
pub mod store;
pub mod tool;

pub use choice::{CustomChoice, InitializeParams, InitializeResponse};
pub use config::{OfferwallConfig, RetryPolicy, ToolConfig, VerifierConfig};
pub use error::{Error, Result};
pub use event::{
    create_event_channel, is_accountable, Amount, PageEvent, PageEventsChannel,
    PageEventsSender, PaymentEvent,
};
pub use payment::{HttpPaymentVerifier, PaymentVerifier};
pub use probe::{CapabilityProbe, LinkRelations};
pub use prompt::{CancelHandle, PromptMessage, PromptOutcome, PromptView, RetryPrompt, TracingView};
pub use store::EventStore;
