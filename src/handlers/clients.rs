// src/handlers/clients.rs

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
    models::{Client, UpdateClientPayload},
};

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Client>)
    )
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.clients.list().await?;
    Ok(Json(clients))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = Client,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn add_client(
    State(app_state): State<AppState>,
    Json(payload): Json<Client>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let client = app_state.clients.add(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    request_body = UpdateClientPayload,
    params(("id" = String, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let client = app_state
        .clients
        .update(&id, payload)
        .await?
        .ok_or(AppError::ClientNotFound)?;
    Ok(Json(client))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do cliente")),
    responses((status = 200, description = "Resultado da exclusão"))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = app_state.clients.delete(&id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

// DELETE /api/clients
#[utoipa::path(
    delete,
    path = "/api/clients",
    tag = "Clientes",
    responses((status = 200, description = "Todos os clientes removidos"))
)]
pub async fn clear_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.clients.clear().await?;
    Ok(Json(json!({ "message": "All clients cleared successfully" })))
}
