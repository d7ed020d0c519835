//! The axum application: pages, the JSON API and its documentation.
//!
//! # Examples
//!
//! Adding an item and checking it out.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use stockroom::api::inventory::{item::Item, memory_store::MemoryStore};
//! # tokio_test::block_on(async {
//! # let url = stockroom::app::spawn_app_with_store(Arc::new(MemoryStore::default())).await.unwrap();
//! let client = reqwest::Client::new();
//! let response = client
//!     .post(format!("{url}/api/inventory"))
//!     .json(&serde_json::json!({"barcode": "A1", "name": "Widget", "quantity": 10, "price": 2.5}))
//!     .send()
//!     .await
//!     .unwrap();
//! assert_eq!(201, response.status());
//!
//! let response = client
//!     .post(format!("{url}/api/checkout"))
//!     .json(&serde_json::json!({"checkoutItems": [{"barcode": "A1", "quantity": 3}]}))
//!     .send()
//!     .await
//!     .unwrap();
//! assert_eq!(200, response.status());
//!
//! let item: Item = reqwest::get(format!("{url}/api/inventory/A1")).await.unwrap().json().await.unwrap();
//! assert_eq!(7, item.quantity);
//! # });
//! ```

use crate::api::inventory::item_store::SharedStore;
use crate::infra::config::{Config, ServerConfig};
use crate::infra::error::{InternalError, PanicHandler};
use crate::infra::middleware::MakeRequestIdSpan;
use crate::infra::openapi::ApiDoc;
use crate::infra::shutdown::shutdown_signal;
use crate::infra::state::AppState;
use axum::error_handling::HandleErrorLayer;
use axum::response::IntoResponse;
use axum::Router;
use http::header::{AUTHORIZATION, COOKIE};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

/// The largest request body accepted.
const MAX_REQUEST_BODY: usize = 1024 * 1024;

/// Constructs the full axum application.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e| async move {
            InternalError::Other(format!("Tower middleware failed: {e}")).into_response()
        }))
        .concurrency_limit(config.concurrency_limit);

    // The full application with views and a JSON API.
    Router::new()
        .merge(crate::views::views(state.clone()))
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/api/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api/openapi.json").path("/api/rapidoc"))
        .nest("/api", crate::api::api(state))
        // Layers
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(axum::middleware::from_fn(
            crate::infra::middleware::log_request_response,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION, COOKIE]))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY))
        .layer(tower_middleware)
        .layer(CatchPanicLayer::custom(PanicHandler))
}

/// Serves the application until a shutdown signal arrives.
pub async fn run_app(
    listener: TcpListener,
    store: SharedStore,
    config: Config,
) -> std::io::Result<()> {
    let state = AppState::new(store);
    let app = app(state, &config.server);

    tracing::info!("Starting axum on {}", listener.local_addr()?);
    let exit_result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match &exit_result {
        Ok(_) => tracing::info!("Successfully shut down"),
        Err(e) => tracing::error!("Shutdown failed: {}", e),
    }

    exit_result
}

/// Spawn a server on a random port with the given store, returning its base url.
pub async fn spawn_app_with_store(store: SharedStore) -> color_eyre::Result<String> {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await?;
    let port = listener.local_addr()?.port();
    let config = crate::infra::config::load_config()?;
    tokio::spawn(run_app(listener, store, config));
    Ok(format!("http://{address}:{port}"))
}
