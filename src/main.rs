//! Datepoll
//!
//! A small scheduling poll: a host creates an event and adds dates, participants
//! answer yes/maybe/no per date, and everyone sees the tallied table. State lives
//! in flat CSV and text files under one data directory.

mod api;
mod config;
mod errors;
mod ledger;
mod models;
mod store;
mod views;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use store::EventStore;
use views::Views;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub views: Arc<Views>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Starting Datepoll");
    let store = Arc::new(EventStore::open(&config.data_dir).await?);

    tracing::info!("Data directory: {:?}", store.layout().root());
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Public URL: {}", config.public_url);

    let views = Arc::new(Views::new()?);

    // Create application state
    let state = AppState {
        store,
        views,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(api::index))
        .route("/create", post(api::create_event))
        .route("/host/{event_id}", get(api::host_view).post(api::host_action))
        .route("/host/{event_id}/sort", get(api::sort_page))
        .route("/host/{event_id}/reorder", post(api::save_order))
        .route("/event/{event_id}", get(api::member_view))
        .route(
            "/edit/{event_id}/",
            get(api::edit_blank_form).post(api::submit_blank_edit),
        )
        .route(
            "/edit/{event_id}/{name}",
            get(api::edit_form).post(api::submit_edit),
        );

    let api_routes = Router::new().route("/events/{event_id}", get(api::event_json));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(page_routes)
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
