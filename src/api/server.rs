use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::core::AppConfig;

pub fn app(shared_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

/// Install the global subscriber. `RUST_LOG` wins over
/// `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    // axum logs rejections from built-in extractors with the `axum::rejection`
    // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
    init_tracing(&format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    ));

    if config.is_missing_api_key() {
        tracing::warn!("GROQ_API_KEY is not set, upstream requests will be rejected");
    }

    let shared_state = Arc::new(AppState::new(config));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
