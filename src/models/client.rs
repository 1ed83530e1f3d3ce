// src/models/client.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

/// Cliente da base de cobrança. A resolução das recorrências é feita
/// pelo `name` (não por id), comportamento herdado que preservamos.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,

    #[validate(length(min = 1, message = "O nome do cliente é obrigatório"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[serde(default)]
    #[schema(example = "5511999998888")]
    pub phone: String,

    #[serde(default)]
    #[schema(example = "maria@email.com")]
    pub email: String,

    // Campos adicionais livres enviados pelo frontend são preservados.
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    pub phone: Option<String>,
    pub email: Option<String>,

    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

impl UpdateClientPayload {
    pub fn apply_to(self, client: &mut Client) {
        client.name = self.name;
        if let Some(phone) = self.phone {
            client.phone = phone;
        }
        if let Some(email) = self.email {
            client.email = email;
        }
        for (key, value) in self.extra {
            client.extra.insert(key, value);
        }
    }
}
