// src/gateway.rs

pub mod zapi;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

pub use zapi::ZapiGateway;

/// Resultado de uma tentativa de envio, nos três estados que o resto do
/// sistema entende.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Sent,
    Error,
    ConfigError,
}

impl DispatchStatus {
    /// Rótulo persistido em logs e no histórico das cobranças.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "Enviado",
            Self::Error => "Erro",
            Self::ConfigError => "Erro de Configuração",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchOutcome {
    #[schema(example = "Enviado")]
    pub status: String,
    #[schema(example = "Mensagem enviada com sucesso via Z-API.")]
    pub message: String,
}

impl DispatchOutcome {
    pub fn new(status: DispatchStatus, message: impl Into<String>) -> Self {
        Self {
            status: status.as_str().to_string(),
            message: message.into(),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DispatchStatus::Sent.as_str()
    }
}

/// Canal de saída de mensagens. Falhas viram um `DispatchOutcome` de erro,
/// nunca `Err`: o dispatcher registra e segue para o próximo item.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> DispatchOutcome;
}
