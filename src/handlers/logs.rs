// src/handlers/logs.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{common::error::AppError, config::AppState, models::LogEntry};

// GET /api/logs
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    responses(
        (status = 200, description = "Log de auditoria de envios", body = Vec<LogEntry>)
    )
)]
pub async fn list_logs(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let logs = app_state.logs.list().await?;
    Ok(Json(logs))
}

// POST /api/logs
#[utoipa::path(
    post,
    path = "/api/logs",
    tag = "Logs",
    request_body = LogEntry,
    responses((status = 201, description = "Entrada registrada", body = LogEntry))
)]
pub async fn add_log(
    State(app_state): State<AppState>,
    Json(payload): Json<LogEntry>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state.logs.append(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// DELETE /api/logs
#[utoipa::path(
    delete,
    path = "/api/logs",
    tag = "Logs",
    responses((status = 200, description = "Log esvaziado"))
)]
pub async fn clear_logs(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    app_state.logs.clear().await?;
    Ok(Json(json!({ "message": "All logs cleared successfully" })))
}
