// src/handlers/messaging.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, validation::is_valid_phone_number},
    config::AppState,
    gateway::DispatchOutcome,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendWhatsappPayload {
    #[schema(example = "5511999998888")]
    pub phone: String,
    #[schema(example = "Olá! Seu boleto vence amanhã.")]
    pub message: String,
}

// POST /api/send_whatsapp: envio manual, fora do motor de recorrência
#[utoipa::path(
    post,
    path = "/api/send_whatsapp",
    tag = "Mensagens",
    request_body = SendWhatsappPayload,
    responses(
        (status = 200, description = "Resultado do envio", body = DispatchOutcome),
        (status = 400, description = "Número de telefone inválido")
    )
)]
pub async fn send_whatsapp(
    State(app_state): State<AppState>,
    Json(payload): Json<SendWhatsappPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_phone_number(&payload.phone) {
        let body = Json(json!({
            "status": "Erro",
            "error": "Número de telefone inválido."
        }));
        return Ok((StatusCode::BAD_REQUEST, body).into_response());
    }

    let outcome = app_state.gateway.send(&payload.phone, &payload.message).await;
    Ok(Json(outcome).into_response())
}
