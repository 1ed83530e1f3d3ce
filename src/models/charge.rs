// src/models/charge.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::dates;

/// Cobrança avulsa (mensalidade importada ou lançada à mão).
/// Os campos de status espelham o fluxo de importação/sincronização
/// do frontend e são mantidos como texto livre.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    #[serde(default)]
    pub id: String,

    #[validate(length(min = 1, message = "O nome do cliente é obrigatório"))]
    #[schema(example = "Maria da Silva")]
    pub client_name: String,

    #[serde(default)]
    pub client_phone: String,

    #[serde(default)]
    pub client_email: String,

    #[serde(default)]
    #[schema(example = "01/2025")]
    pub competence: Option<String>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime, example = "2025-01-10T00:00:00")]
    pub due_date: Option<NaiveDateTime>,

    #[serde(default)]
    #[schema(example = "150.00")]
    pub value: Option<Decimal>,

    #[serde(default)]
    #[schema(example = "Pendente")]
    pub send_status: Option<String>,

    #[serde(default)]
    #[schema(example = "Aguardando Envio")]
    pub whatsapp_status: Option<String>,

    #[serde(default)]
    pub import_error: Option<String>,

    #[serde(default = "default_client_found")]
    pub client_found: Option<bool>,

    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

fn default_client_found() -> Option<bool> {
    Some(true)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChargePayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório"))]
    pub client_name: String,

    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub competence: Option<String>,

    #[serde(default, with = "dates::flex_opt")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<NaiveDateTime>,

    pub value: Option<Decimal>,
    pub send_status: Option<String>,
    pub whatsapp_status: Option<String>,
    pub import_error: Option<String>,
    pub client_found: Option<bool>,

    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

impl UpdateChargePayload {
    pub fn apply_to(self, charge: &mut Charge) {
        charge.client_name = self.client_name;
        if let Some(phone) = self.client_phone {
            charge.client_phone = phone;
        }
        if let Some(email) = self.client_email {
            charge.client_email = email;
        }
        if let Some(competence) = self.competence {
            charge.competence = Some(competence);
        }
        if let Some(due_date) = self.due_date {
            charge.due_date = Some(due_date);
        }
        if let Some(value) = self.value {
            charge.value = Some(value);
        }
        if let Some(send_status) = self.send_status {
            charge.send_status = Some(send_status);
        }
        if let Some(whatsapp_status) = self.whatsapp_status {
            charge.whatsapp_status = Some(whatsapp_status);
        }
        if let Some(import_error) = self.import_error {
            charge.import_error = Some(import_error);
        }
        if let Some(client_found) = self.client_found {
            charge.client_found = Some(client_found);
        }
        for (key, value) in self.extra {
            charge.extra.insert(key, value);
        }
    }
}
