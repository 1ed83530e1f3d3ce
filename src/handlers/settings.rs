// src/handlers/settings.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{Settings, UpdateSettingsPayload},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses((status = 200, description = "Configurações atuais", body = Settings))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings.get().await?;
    Ok(Json(settings))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Configurações",
    request_body = UpdateSettingsPayload,
    responses((status = 200, description = "Configurações atualizadas", body = Settings))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings.update(payload).await?;
    Ok(Json(settings))
}

// POST /api/clear_all_data
#[utoipa::path(
    post,
    path = "/api/clear_all_data",
    tag = "Configurações",
    responses((status = 200, description = "Todos os dados apagados e configurações restauradas"))
)]
pub async fn clear_all_data(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.clients.clear().await?;
    app_state.charges.clear().await?;
    app_state.logs.clear().await?;
    app_state.recurrence_service.clear().await?;
    app_state.settings.reset().await?;
    Ok(Json(json!({
        "message": "All data cleared and settings reset successfully"
    })))
}
