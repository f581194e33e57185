//! HTTP API server for the order backend.
//!
//! Exposes the domain services over REST with structured logging (tracing)
//! and Prometheus metrics. Callers are identified by headers set upstream;
//! see [`auth`].

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use cache::CacheGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    use routes::{addresses, inventories, orders, payments, products, users};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(users::create::<S>).get(users::list::<S>))
        .route(
            "/users/{id}",
            get(users::get::<S>)
                .put(users::update::<S>)
                .delete(users::delete::<S>),
        )
        .route("/users/{id}/addresses", get(users::addresses::<S>))
        .route("/users/email/{email}", get(users::get_by_email::<S>))
        .route(
            "/addresses",
            post(addresses::create::<S>).get(addresses::list::<S>),
        )
        .route(
            "/addresses/{id}",
            put(addresses::update::<S>).delete(addresses::delete::<S>),
        )
        .route(
            "/inventories",
            post(inventories::create::<S>).get(inventories::list::<S>),
        )
        .route(
            "/inventories/{id}",
            get(inventories::get::<S>)
                .put(inventories::update::<S>)
                .delete(inventories::delete::<S>),
        )
        .route(
            "/products",
            get(products::list::<S>).post(products::create::<S>),
        )
        .route(
            "/products/{id}",
            get(products::get::<S>)
                .put(products::update::<S>)
                .delete(products::delete::<S>),
        )
        .route("/products/{id}/stock/add", put(products::add_stock::<S>))
        .route(
            "/products/{id}/stock/reduce",
            put(products::reduce_stock::<S>),
        )
        .route("/products/{id}/image", put(products::set_image::<S>))
        .route("/orders", post(orders::create::<S>).get(orders::list::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>).delete(orders::delete::<S>),
        )
        .route("/orders/{id}/address", put(orders::update_address::<S>))
        .route("/orders/{id}/status", put(orders::update_status::<S>))
        .route("/orders/{id}/payment", get(orders::payment::<S>))
        .route(
            "/orders/{id}/payment/status",
            put(orders::update_payment_status::<S>),
        )
        .route(
            "/payments",
            post(payments::upload::<S>).get(payments::list::<S>),
        )
        .route(
            "/payments/{id}",
            get(payments::get::<S>).delete(payments::delete::<S>),
        )
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

/// Creates the application state with every service sharing one store and cache.
pub fn create_state<S: Store>(
    store: S,
    cache: Arc<dyn CacheGateway>,
    cache_ttl: Duration,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, cache, cache_ttl))
}
