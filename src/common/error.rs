use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Cobrança não encontrada")]
    ChargeNotFound,

    #[error("Cobrança recorrente não encontrada")]
    RecurrenceNotFound,

    #[error("Número de telefone inválido")]
    InvalidPhoneNumber,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Recorrência concluída é terminal")]
    CompletedIsTerminal,

    // Falhas de leitura/escrita dos arquivos de dados
    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ClientNotFound => (StatusCode::NOT_FOUND, "Cliente não encontrado."),
            AppError::ChargeNotFound => (StatusCode::NOT_FOUND, "Cobrança não encontrada."),
            AppError::RecurrenceNotFound => {
                (StatusCode::NOT_FOUND, "Cobrança recorrente não encontrada.")
            }
            AppError::InvalidPhoneNumber => {
                (StatusCode::BAD_REQUEST, "Número de telefone inválido.")
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::CompletedIsTerminal => (
                StatusCode::BAD_REQUEST,
                "Uma recorrência concluída não pode ser reativada.",
            ),

            // Todos os outros erros (StorageError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
