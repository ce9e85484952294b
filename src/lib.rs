// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

/// Router completo do módulo, já com o estado.
pub fn app(app_state: AppState) -> Router {
    // Rotas de clientes (protegidas: token + permissão por handler)
    let customer_routes = Router::new()
        .route("/api/customers"
               ,get(handlers::customers::list_customers)
               .post(handlers::customers::create_customer)
        )
        .route("/api/customers/summary"
               ,get(handlers::customers::customer_summary)
        )
        .route("/api/customers/{id}"
               ,get(handlers::customers::get_customer)
               .put(handlers::customers::update_customer)
               .delete(handlers::customers::deactivate_customer)
        )
        .route("/api/customers/{id}/reactivate"
               ,post(handlers::customers::reactivate_customer)
        )
        .route("/api/customers/{id}/refresh-stats"
               ,post(handlers::customers::refresh_customer_stats)
        )
        .route("/api/modules/customers"
               ,get(handlers::module::get_manifest)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(handlers::module::health))
        .route("/api/openapi.json", get(handlers::module::openapi_json));

    Router::new()
        .merge(public_routes)
        .merge(customer_routes)
        .with_state(app_state)
}
