//! End-to-end custom choice flows over a page event channel and a local
//! incoming payment endpoint.

#![allow(clippy::expect_used)]

mod common;

use common::{payment, PaymentServer};
use std::sync::Arc;
use std::time::Duration;
use wm_offerwall::{
    create_event_channel, CustomChoice, HttpPaymentVerifier, InitializeParams,
    InitializeResponse, LinkRelations, PageEvent, RetryPolicy, TracingView, VerifierConfig,
};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout_ms: 500,
        failure_pause_ms: 50,
    }
}

fn choice(links: &[&str]) -> CustomChoice {
    let verifier = HttpPaymentVerifier::new(&VerifierConfig {
        request_timeout_secs: Some(5),
    })
    .expect("verifier");
    CustomChoice::new(
        Arc::new(verifier),
        Box::new(LinkRelations::new(links.iter().copied())),
        fast_policy(),
    )
}

#[tokio::test]
async fn test_disabled_page_never_contacts_wallet() {
    let server = PaymentServer::start().await;
    let mut choice = choice(&["stylesheet"]);
    let (tx, rx) = create_event_channel();
    tx.send(payment("1", &server.url("ok-1")).into()).expect("send");

    let response = choice.initialize(&InitializeParams::default(), rx).await;

    assert_eq!(response, InitializeResponse::CustomChoiceDisabled);
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_earlier_verified_payment_grants_access_on_load() {
    let server = PaymentServer::start().await;
    let mut choice = choice(&["monetization"]);
    let (tx, rx) = create_event_channel();
    tx.send(payment("0.01", &server.url("ok-earlier")).into())
        .expect("send");
    tx.send(PageEvent::Other {
        kind: "unrelated".to_string(),
    })
    .expect("send");

    let response = choice.initialize(&InitializeParams::default(), rx).await;

    assert_eq!(response, InitializeResponse::AccessGranted);
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_prompt_grants_after_payment_arrives() {
    let server = PaymentServer::start().await;
    let mut choice = choice(&["monetization"]);
    let (tx, rx) = create_event_channel();

    let response = choice.initialize(&InitializeParams::default(), rx).await;
    assert_eq!(response, InitializeResponse::AccessNotGranted);

    let incoming = server.url("ok-live");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(payment("0.05", &incoming).into());
    });

    assert!(choice.show(&mut TracingView::new(), None).await);
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_prompt_gives_up_when_payment_never_verifies() {
    let server = PaymentServer::start().await;
    let mut choice = choice(&["monetization"]);
    let (tx, rx) = create_event_channel();
    tx.send(payment("0.05", &server.url("rejected")).into())
        .expect("send");

    let response = choice.initialize(&InitializeParams::default(), rx).await;
    assert_eq!(response, InitializeResponse::AccessNotGranted);

    assert!(!choice.show(&mut TracingView::new(), None).await);
    // One lookup at initialization, then one per prompt attempt.
    assert_eq!(server.hits(), 4);
}

#[tokio::test]
async fn test_show_without_initialize_uses_given_channel() {
    let server = PaymentServer::start().await;
    let mut choice = choice(&["monetization"]);
    let (tx, rx) = create_event_channel();

    let incoming = server.url("ok-direct");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(payment("0.05", &incoming).into());
    });

    assert!(choice.show(&mut TracingView::new(), Some(rx)).await);
    assert_eq!(server.hits(), 1);
}
