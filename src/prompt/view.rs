//! The modal surface driven by the retry prompt.

use super::CancelHandle;
use std::fmt;
use tracing::info;

/// Status line shown inside the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptMessage {
    /// Waiting for a monetization event to arrive.
    Waiting,
    /// A payment is being verified.
    Verifying,
    /// The last verification did not succeed.
    VerificationFailed,
    /// All attempts were used up.
    TimedOut,
    /// The visitor cancelled the prompt.
    Aborted,
    /// Something unexpected happened while waiting; the prompt keeps going.
    Error(String),
}

impl PromptMessage {
    /// Whether the message is markup rather than plain text.
    #[must_use]
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Waiting | Self::TimedOut)
    }
}

impl fmt::Display for PromptMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("Waiting for a <code>MonetizationEvent</code>..."),
            Self::Verifying => f.write_str("Verifying payment..."),
            Self::VerificationFailed => f.write_str("Verification failed"),
            Self::TimedOut => {
                f.write_str("Timed out waiting for a <code>MonetizationEvent</code>")
            }
            Self::Aborted => f.write_str("Aborted by user"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

/// A modal that can render the prompt's progress.
///
/// The prompt calls [`PromptView::open`] once, then updates the remaining
/// attempts and status line as it runs. The view owns the cancel control and
/// wires it to the [`CancelHandle`] it receives.
pub trait PromptView: Send {
    /// Show the modal with the attempt indicator at `max_attempts`.
    fn open(&mut self, max_attempts: u32, cancel: CancelHandle);

    /// Update the remaining-attempts indicator.
    fn set_remaining(&mut self, remaining: u32);

    /// Replace the status line.
    fn set_status(&mut self, message: &PromptMessage);

    /// Turn the cancel control into a dismiss control.
    fn relabel_dismiss(&mut self);

    /// Close the modal.
    fn close(&mut self);
}

/// Headless view that reports prompt progress through `tracing`.
#[derive(Debug, Default)]
pub struct TracingView {
    max_attempts: u32,
}

impl TracingView {
    /// Create a new tracing view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PromptView for TracingView {
    fn open(&mut self, max_attempts: u32, _cancel: CancelHandle) {
        self.max_attempts = max_attempts;
        info!("Payment prompt opened ({max_attempts} attempts)");
    }

    fn set_remaining(&mut self, remaining: u32) {
        info!("Attempts remaining: {remaining}/{}", self.max_attempts);
    }

    fn set_status(&mut self, message: &PromptMessage) {
        info!("{message}");
    }

    fn relabel_dismiss(&mut self) {
        info!("Prompt can now be dismissed");
    }

    fn close(&mut self) {
        info!("Payment prompt closed");
    }
}
