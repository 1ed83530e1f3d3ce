// src/handlers/painel.rs

use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser};

// GET /painel: resumo do painel, atrás do guard de JWT
#[utoipa::path(
    get,
    path = "/painel",
    tag = "Painel",
    responses(
        (status = 200, description = "Resumo do painel do usuário autenticado"),
        (status = 401, description = "Token inválido ou ausente")
    ),
    security(("painel_jwt" = []))
)]
pub async fn painel(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let display = user.email.unwrap_or_else(|| user.id.clone());
    Ok(Json(json!({
        "message": format!("Bem-vindo(a), {}!", display),
        "acessos": [
            { "recurso": "clientes", "permissao": "leitura/escrita" },
            { "recurso": "cobranças", "permissao": "leitura/escrita" },
            { "recurso": "configurações", "permissao": "leitura/escrita" }
        ]
    })))
}
