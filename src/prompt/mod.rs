//! Retry-gated payment prompt.
//!
//! The prompt polls the event store for a qualifying payment, verifying the
//! most recent accountable event, for a bounded number of attempts:
//!
//! ```text
//!   open ──▶ attempt n ──▶ accountable event stored? ──yes──┐
//!               ▲                  │ no                     │
//!               │                  ▼                        ▼
//!               │       race: cancel > arrival > timeout   verify
//!               │          │        │          │        ┌───┴───┐
//!               │      Cancelled    └──────────┼───────▶ ok    fail
//!               │                              │        │       │
//!               ├──────────── attempts left ◀──┘    Granted   pause
//!               │                                               │
//!               └───────────────────────────────────────────────┘
//! ```
//!
//! Once all attempts are used the prompt ends `Exhausted`. Cancellation is
//! checked after every suspension point, so no verification starts once it
//! has been observed.

mod retry;
mod view;

pub use retry::{CancelHandle, PromptOutcome, RetryPrompt};
pub use view::{PromptMessage, PromptView, TracingView};
