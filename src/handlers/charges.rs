// src/handlers/charges.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{Charge, UpdateChargePayload},
};

// GET /api/charges
#[utoipa::path(
    get,
    path = "/api/charges",
    tag = "Cobranças",
    responses(
        (status = 200, description = "Lista de cobranças", body = Vec<Charge>)
    )
)]
pub async fn list_charges(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let charges = app_state.charges.list().await?;
    Ok(Json(charges))
}

// POST /api/charges
#[utoipa::path(
    post,
    path = "/api/charges",
    tag = "Cobranças",
    request_body = Charge,
    responses(
        (status = 201, description = "Cobrança criada", body = Charge),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn add_charge(
    State(app_state): State<AppState>,
    Json(payload): Json<Charge>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let charge = app_state.charges.add(payload).await?;
    Ok((StatusCode::CREATED, Json(charge)))
}

// PUT /api/charges/{id}
#[utoipa::path(
    put,
    path = "/api/charges/{id}",
    tag = "Cobranças",
    request_body = UpdateChargePayload,
    params(("id" = String, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Cobrança atualizada", body = Charge),
        (status = 404, description = "Cobrança não encontrada")
    )
)]
pub async fn update_charge(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let charge = app_state
        .charges
        .update(&id, payload)
        .await?
        .ok_or(AppError::ChargeNotFound)?;
    Ok(Json(charge))
}

// DELETE /api/charges/{id}
#[utoipa::path(
    delete,
    path = "/api/charges/{id}",
    tag = "Cobranças",
    params(("id" = String, Path, description = "ID da cobrança")),
    responses((status = 200, description = "Resultado da exclusão"))
)]
pub async fn delete_charge(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = app_state.charges.delete(&id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

// DELETE /api/charges
#[utoipa::path(
    delete,
    path = "/api/charges",
    tag = "Cobranças",
    responses((status = 200, description = "Todas as cobranças removidas"))
)]
pub async fn clear_charges(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.charges.clear().await?;
    Ok(Json(json!({ "message": "All monthly charges cleared successfully" })))
}

// POST /api/sync_charges_with_clients
#[utoipa::path(
    post,
    path = "/api/sync_charges_with_clients",
    tag = "Cobranças",
    responses((status = 200, description = "Sincronização executada"))
)]
pub async fn sync_charges_with_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state.charge_service.sync_charges_with_clients().await?;
    Ok(Json(json!({
        "message": format!("Sincronização concluída. {} cobranças atualizadas.", updated)
    })))
}
