// src/models/log.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::models::dates;

/// Entrada do log de auditoria de envios. O dispatcher grava uma
/// entrada por tentativa (sucesso ou falha) com `origin = "Recorrente"`;
/// envios manuais entram com o origin padrão.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub id: String,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub timestamp: Option<NaiveDateTime>,

    #[serde(default)]
    pub client_name: Option<String>,

    #[serde(default)]
    pub whatsapp: Option<String>,

    #[serde(default)]
    #[schema(example = "Enviado")]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default = "default_origin")]
    #[schema(example = "Manual")]
    pub origin: Option<String>,

    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

fn default_origin() -> Option<String> {
    Some("Manual".to_string())
}
