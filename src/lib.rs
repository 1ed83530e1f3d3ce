// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{middleware as axum_middleware, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use utoipa::OpenApi;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Konty API está online!" }))
}

async fn openapi_json() -> impl IntoResponse {
    Json(docs::ApiDoc::openapi())
}

/// Monta o router completo da aplicação.
pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/clients",
            get(handlers::clients::list_clients)
                .post(handlers::clients::add_client)
                .delete(handlers::clients::clear_clients),
        )
        .route(
            "/clients/{id}",
            axum::routing::put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/charges",
            get(handlers::charges::list_charges)
                .post(handlers::charges::add_charge)
                .delete(handlers::charges::clear_charges),
        )
        .route(
            "/charges/{id}",
            axum::routing::put(handlers::charges::update_charge)
                .delete(handlers::charges::delete_charge),
        )
        .route(
            "/logs",
            get(handlers::logs::list_logs)
                .post(handlers::logs::add_log)
                .delete(handlers::logs::clear_logs),
        )
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/recurring_charges",
            get(handlers::recurrences::list_recurring_charges)
                .post(handlers::recurrences::add_recurring_charge)
                .delete(handlers::recurrences::clear_recurring_charges),
        )
        .route(
            "/recurring_charges/{id}",
            axum::routing::put(handlers::recurrences::update_recurring_charge)
                .delete(handlers::recurrences::delete_recurring_charge),
        )
        .route(
            "/process_recurring_charges",
            axum::routing::post(handlers::recurrences::process_recurring_charges),
        )
        .route(
            "/sync_charges_with_clients",
            axum::routing::post(handlers::charges::sync_charges_with_clients),
        )
        .route(
            "/send_whatsapp",
            axum::routing::post(handlers::messaging::send_whatsapp),
        )
        .route(
            "/clear_all_data",
            axum::routing::post(handlers::settings::clear_all_data),
        );

    // Área autenticada do painel
    let painel_routes = Router::new()
        .route("/painel", get(handlers::painel::painel))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/", get(root))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api_routes)
        .merge(painel_routes)
        .with_state(app_state)
}
