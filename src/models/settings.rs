// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_MESSAGE: &str = "Prezado(a) (nome), \\n\\nLembramos que o boleto referente à competência (competencia), no valor de (valor), \\nvence em (vencimento). \\n\\nPor favor, regularize sua situação para evitar juros e multas. \\n\\nAtenciosamente, \\nSua Empresa";

/// Configurações globais: credenciais Z-API, template padrão e formatos
/// de data/moeda usados na renderização das mensagens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub zapi_instance_id: String,

    #[serde(default)]
    pub zapi_token: String,

    #[serde(default)]
    pub zapi_security_token: String,

    #[serde(default = "default_message")]
    pub default_message: String,

    #[serde(default = "default_date_format")]
    #[schema(example = "DD/MM/YYYY")]
    pub date_format: String,

    #[serde(default = "default_currency_format")]
    #[schema(example = "BRL")]
    pub currency_format: String,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

fn default_date_format() -> String {
    "DD/MM/YYYY".to_string()
}

fn default_currency_format() -> String {
    "BRL".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zapi_instance_id: String::new(),
            zapi_token: String::new(),
            zapi_security_token: String::new(),
            default_message: default_message(),
            date_format: default_date_format(),
            currency_format: default_currency_format(),
        }
    }
}

/// Atualização parcial: apenas os campos presentes são sobrescritos.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    pub zapi_instance_id: Option<String>,
    pub zapi_token: Option<String>,
    pub zapi_security_token: Option<String>,
    pub default_message: Option<String>,
    pub date_format: Option<String>,
    pub currency_format: Option<String>,
}

impl UpdateSettingsPayload {
    pub fn apply_to(self, settings: &mut Settings) {
        if let Some(v) = self.zapi_instance_id {
            settings.zapi_instance_id = v;
        }
        if let Some(v) = self.zapi_token {
            settings.zapi_token = v;
        }
        if let Some(v) = self.zapi_security_token {
            settings.zapi_security_token = v;
        }
        if let Some(v) = self.default_message {
            settings.default_message = v;
        }
        if let Some(v) = self.date_format {
            settings.date_format = v;
        }
        if let Some(v) = self.currency_format {
            settings.currency_format = v;
        }
    }
}
