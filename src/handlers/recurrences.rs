// src/handlers/recurrences.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{RecurringCharge, UpdateRecurringChargePayload},
};

// GET /api/recurring_charges
#[utoipa::path(
    get,
    path = "/api/recurring_charges",
    tag = "Recorrências",
    responses(
        (status = 200, description = "Lista com nextSendDate recalculado", body = Vec<RecurringCharge>)
    )
)]
pub async fn list_recurring_charges(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let now = Local::now().naive_local();
    let items = app_state.recurrence_service.list_recomputed(now).await?;
    Ok(Json(items))
}

// POST /api/recurring_charges
#[utoipa::path(
    post,
    path = "/api/recurring_charges",
    tag = "Recorrências",
    request_body = RecurringCharge,
    responses(
        (status = 201, description = "Recorrência criada", body = RecurringCharge),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn add_recurring_charge(
    State(app_state): State<AppState>,
    Json(payload): Json<RecurringCharge>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let now = Local::now().naive_local();
    let created = app_state.recurrence_service.add(payload, now).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/recurring_charges/{id}
#[utoipa::path(
    put,
    path = "/api/recurring_charges/{id}",
    tag = "Recorrências",
    request_body = UpdateRecurringChargePayload,
    params(("id" = String, Path, description = "ID da recorrência")),
    responses(
        (status = 200, description = "Recorrência atualizada", body = RecurringCharge),
        (status = 400, description = "Dados inválidos ou recorrência concluída"),
        (status = 404, description = "Recorrência não encontrada")
    )
)]
pub async fn update_recurring_charge(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRecurringChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let now = Local::now().naive_local();
    let updated = app_state.recurrence_service.update(&id, payload, now).await?;
    Ok(Json(updated))
}

// DELETE /api/recurring_charges/{id}
#[utoipa::path(
    delete,
    path = "/api/recurring_charges/{id}",
    tag = "Recorrências",
    params(("id" = String, Path, description = "ID da recorrência")),
    responses((status = 200, description = "Resultado da exclusão"))
)]
pub async fn delete_recurring_charge(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = app_state.recurrence_service.delete(&id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

// DELETE /api/recurring_charges
#[utoipa::path(
    delete,
    path = "/api/recurring_charges",
    tag = "Recorrências",
    responses((status = 200, description = "Todas as recorrências removidas"))
)]
pub async fn clear_recurring_charges(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.recurrence_service.clear().await?;
    Ok(Json(json!({ "message": "All recurring charges cleared successfully" })))
}

// POST /api/process_recurring_charges
#[utoipa::path(
    post,
    path = "/api/process_recurring_charges",
    tag = "Recorrências",
    responses((status = 200, description = "Varredura executada"))
)]
pub async fn process_recurring_charges(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let now = Local::now().naive_local();
    let count = app_state.recurrence_service.process_recurrents(now).await?;
    Ok(Json(json!({
        "message": format!("Processamento concluído. {} cobranças recorrentes processadas.", count),
        "processedCount": count
    })))
}
