// src/gateway/zapi.rs
//
// Integração com a Z-API (WhatsApp). As credenciais são relidas das
// settings a cada envio, para que uma alteração via painel valha
// imediatamente, sem reiniciar o serviço.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    db::SettingsRepository,
    gateway::{DispatchOutcome, DispatchStatus, MessageGateway},
};

pub struct ZapiGateway {
    settings: Arc<dyn SettingsRepository>,
    http: reqwest::Client,
}

impl ZapiGateway {
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { settings, http }
    }

    /// Mantém só os dígitos e descarta um único zero de operadora à esquerda.
    fn normalize_phone(phone: &str) -> String {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.strip_prefix('0').unwrap_or(&digits).to_string()
    }
}

#[async_trait]
impl MessageGateway for ZapiGateway {
    async fn send(&self, phone: &str, message: &str) -> DispatchOutcome {
        let settings = match self.settings.get().await {
            Ok(s) => s,
            Err(e) => {
                return DispatchOutcome::new(
                    DispatchStatus::ConfigError,
                    format!("Falha ao carregar configurações: {e}"),
                )
            }
        };

        if settings.zapi_instance_id.trim().is_empty()
            || settings.zapi_token.trim().is_empty()
            || settings.zapi_security_token.trim().is_empty()
        {
            return DispatchOutcome::new(
                DispatchStatus::ConfigError,
                "Credenciais Z-API ausentes no backend.",
            );
        }

        let url = format!(
            "https://api.z-api.io/instances/{}/token/{}/send-text",
            settings.zapi_instance_id, settings.zapi_token
        );
        let payload = json!({
            "phone": Self::normalize_phone(phone),
            "message": message,
        });

        let response = self
            .http
            .post(&url)
            .header("Client-Token", &settings.zapi_security_token)
            .json(&payload)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!("⏱️ Z-API: tempo limite excedido");
                return DispatchOutcome::new(
                    DispatchStatus::Error,
                    "Erro Z-API: Tempo limite excedido.",
                );
            }
            Err(e) if e.is_connect() => {
                return DispatchOutcome::new(
                    DispatchStatus::Error,
                    format!("Erro Z-API (conexão): {e}"),
                )
            }
            Err(e) => {
                return DispatchOutcome::new(DispatchStatus::Error, format!("Erro geral Z-API: {e}"))
            }
        };

        let status = response.status();
        let body: Result<Value, _> = response.json().await;

        if status.is_success() {
            match body {
                Ok(data) => {
                    let accepted = data.get("messageId").is_some()
                        || data.get("id").is_some()
                        || data.get("success").and_then(Value::as_bool) == Some(true);
                    if accepted {
                        info!("✅ Z-API aceitou a mensagem");
                        DispatchOutcome::new(
                            DispatchStatus::Sent,
                            "Mensagem enviada com sucesso via Z-API.",
                        )
                    } else {
                        let detail = extract_error(&data)
                            .unwrap_or_else(|| "Falha lógica".to_string());
                        DispatchOutcome::new(
                            DispatchStatus::Error,
                            format!("Erro Z-API (2xx): {detail}"),
                        )
                    }
                }
                Err(_) => DispatchOutcome::new(
                    DispatchStatus::Error,
                    format!("Erro Z-API: Resposta inválida. Status {status}"),
                ),
            }
        } else {
            let detail = match body {
                Ok(data) => extract_error(&data)
                    .unwrap_or_else(|| format!("Erro HTTP {}", status.as_u16())),
                Err(_) => format!("Erro HTTP {} sem JSON.", status.as_u16()),
            };
            DispatchOutcome::new(DispatchStatus::Error, format!("Erro Z-API: {detail}"))
        }
    }
}

fn extract_error(data: &Value) -> Option<String> {
    data.get("message")
        .or_else(|| data.get("error"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}
