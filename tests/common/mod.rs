//! Shared helpers for integration tests.

#![allow(dead_code, clippy::expect_used)]

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wm_offerwall::PaymentEvent;

/// A local stand-in for a wallet's incoming payment endpoint.
///
/// `GET /incoming-payments/ok-*` answers 200, anything else under
/// `/incoming-payments/` answers 404.
pub struct PaymentServer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl PaymentServer {
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/incoming-payments/{id}",
            get(move |Path(id): Path<String>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if id.starts_with("ok-") {
                        StatusCode::OK
                    } else {
                        StatusCode::NOT_FOUND
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind payment server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, hits }
    }

    pub fn url(&self, id: &str) -> String {
        format!("http://{}/incoming-payments/{id}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn payment(value: &str, incoming_payment: &str) -> PaymentEvent {
    PaymentEvent::new(value, "USD", "https://wallet.example/alice", incoming_payment)
}
