//! HTTP read API for the order ledger.
//!
//! Serves per-customer order listings and totals, wires the order-created
//! listener to the order service, and exposes structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use domain::OrderService;
use listener::{ListenerStats, OrderCreatedListener};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route(
            "/api/orders/customer/{customer_id}",
            get(routes::orders::list_by_customer::<S>),
        )
        .route("/api/orders/{order_id}", get(routes::orders::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around `store`.
pub fn create_state<S: OrderStore + 'static>(store: S, config: &Config) -> Arc<AppState<S>> {
    let order_service = OrderService::with_policy(store, config.duplicate_policy);

    Arc::new(AppState {
        order_service: Arc::new(order_service),
        default_page_size: config.default_page_size,
    })
}

/// Starts the order-created listener on the state's order service.
///
/// Notification transports feed the returned sender. The listener stops once
/// every clone of it has been dropped.
pub fn start_listener<S: OrderStore + 'static>(
    state: &AppState<S>,
    config: &Config,
) -> (mpsc::Sender<Vec<u8>>, JoinHandle<ListenerStats>) {
    let (sender, receiver) = listener::channel(config.listener_capacity);
    let handle = OrderCreatedListener::new(state.order_service.clone(), receiver).spawn();
    (sender, handle)
}
