//! Preview tool: a single-page form that embeds the offerwall script.
//!
//! `GET /tool?src=..&wa=..&profile=..` renders the form and, when all three
//! parameters are valid, the `offerwall.js` init script. Every other path
//! answers 404.

mod markup;
mod params;

pub use markup::{render_form, render_init_script, render_page};
pub use params::{Profile, ScriptSource, ToolParams};

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Path the tool is served on.
pub const TOOL_PATH: &str = "/tool";

#[derive(Clone)]
struct ToolState {
    cdn_host: Arc<str>,
}

/// Build the tool's router.
pub fn router(config: &ToolConfig) -> Router {
    let state = ToolState {
        cdn_host: Arc::from(config.cdn_host.as_str()),
    };

    Router::new()
        .route(TOOL_PATH, any(tool_page))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn tool_page(
    State(state): State<ToolState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let params = ToolParams::from_query(query.as_deref().unwrap_or_default());
    debug!("Rendering tool page for {params:?}");
    (
        [(header::CONTENT_TYPE, "text/html;charset=UTF-8")],
        render_page(&params, &state.cdn_host),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Serve the tool until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listen address cannot be bound or the server
/// fails.
pub async fn serve<F>(config: &ToolConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .map_err(|source| Error::Bind {
            addr: config.listen,
            source,
        })?;

    info!(
        "Preview tool listening on http://{}{TOOL_PATH}",
        listener.local_addr()?
    );

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Preview tool stopped");
    Ok(())
}
